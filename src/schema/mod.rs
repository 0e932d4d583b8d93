//! Unified trial.raw_row.v1 schema
//!
//! This module defines the input schema for exported study tables and the
//! adapter that turns raw rows into participant records.

mod adapter;
mod raw_row;

pub use adapter::*;
pub use raw_row::*;
