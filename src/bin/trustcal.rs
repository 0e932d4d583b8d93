//! trustcal CLI - Command-line interface for trust-calibration
//!
//! Commands:
//! - derive: Annotate a study export with derived trial metrics
//! - summary: Per-condition (or per-factor-level) descriptives for one measure
//! - compare: Independent-samples t-test between two conditions or factor levels
//! - correlate: Pearson correlation between two measures
//! - validate: Check every row of an export
//! - layout: Print the reference tables of a study configuration
//! - doctor: Diagnose configuration and environment

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use trust_calibration::analysis::{self, GroupSummary, Grouping, Measure, Metric};
use trust_calibration::encoder::MetricsEncoder;
use trust_calibration::schema::{self, RecordAdapter, SCHEMA_VERSION};
use trust_calibration::stats::Variance;
use trust_calibration::types::AnnotatedRecord;
use trust_calibration::{derive_metrics, ComputeError, StudyConfig, PRODUCER_NAME, VERSION};

/// trustcal - Trial metrics for human-agent navigation studies
#[derive(Parser)]
#[command(name = "trustcal")]
#[command(version = VERSION)]
#[command(about = "Derive and compare trust calibration metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate a study export with derived metrics
    Derive {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "csv")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "csv")]
        output_format: OutputFormat,

        /// Study configuration JSON (defaults to Study 1)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Per-condition descriptives for one measure
    Summary {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "csv")]
        input_format: InputFormat,

        /// Study configuration JSON (defaults to Study 1)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Derived metric, trust_pre/trust_post or a configured covariate
        #[arg(long)]
        metric: String,

        /// Group by the levels of a configured factor instead of condition
        #[arg(long)]
        factor: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare a measure between two conditions or factor levels
    Compare {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "csv")]
        input_format: InputFormat,

        /// Study configuration JSON (defaults to Study 1)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Derived metric, trust_pre/trust_post or a configured covariate
        #[arg(long)]
        metric: String,

        /// Compare levels of a configured factor, e.g. memory_function
        #[arg(long)]
        factor: Option<String>,

        /// First condition label (or factor level)
        #[arg(long = "a")]
        group_a: String,

        /// Second condition label (or factor level)
        #[arg(long = "b")]
        group_b: String,

        /// Use Welch's unequal-variance test
        #[arg(long)]
        welch: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Correlate two measures across participants
    Correlate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "csv")]
        input_format: InputFormat,

        /// Study configuration JSON (defaults to Study 1)
        #[arg(long)]
        config: Option<PathBuf>,

        /// First measure
        #[arg(long)]
        x: String,

        /// Second measure
        #[arg(long)]
        y: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate every row of a study export
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "csv")]
        input_format: InputFormat,

        /// Study configuration JSON (defaults to Study 1)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print reference tables, phase split and error corners
    Layout {
        /// Study configuration JSON (defaults to Study 1)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Study configuration JSON to check
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum InputFormat {
    /// Comma-separated values with a header row
    Csv,
    /// JSON array of row objects
    Json,
    /// Newline-delimited JSON (one row per line)
    Ndjson,
}

impl From<InputFormat> for schema::InputFormat {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Csv => schema::InputFormat::Csv,
            InputFormat::Json => schema::InputFormat::Json,
            InputFormat::Ndjson => schema::InputFormat::Ndjson,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One row per participant
    Csv,
    /// Compact JSON report
    Json,
    /// Pretty-printed JSON report
    JsonPretty,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), TrustcalCliError> {
    match cli.command {
        Commands::Derive {
            input,
            output,
            input_format,
            output_format,
            config,
        } => cmd_derive(&input, &output, input_format, output_format, config.as_deref()),

        Commands::Summary {
            input,
            input_format,
            config,
            metric,
            factor,
            json,
        } => cmd_summary(
            &input,
            input_format,
            config.as_deref(),
            &metric,
            factor.as_deref(),
            json,
        ),

        Commands::Compare {
            input,
            input_format,
            config,
            metric,
            factor,
            group_a,
            group_b,
            welch,
            json,
        } => {
            let variance = if welch {
                Variance::Welch
            } else {
                Variance::Pooled
            };
            cmd_compare(
                &input,
                input_format,
                config.as_deref(),
                &metric,
                factor.as_deref(),
                &group_a,
                &group_b,
                variance,
                json,
            )
        }

        Commands::Correlate {
            input,
            input_format,
            config,
            x,
            y,
            json,
        } => cmd_correlate(&input, input_format, config.as_deref(), &x, &y, json),

        Commands::Validate {
            input,
            input_format,
            config,
            json,
        } => cmd_validate(&input, input_format, config.as_deref(), json),

        Commands::Layout { config, json } => cmd_layout(config.as_deref(), json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_derive(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: Option<&Path>,
) -> Result<(), TrustcalCliError> {
    let config = load_config(config)?;
    let records = load_records(input, input_format, &config)?;

    let encoder = MetricsEncoder::new();
    let output_data = match output_format {
        OutputFormat::Csv => encoder.encode_csv(&records),
        OutputFormat::Json => serde_json::to_string(&encoder.encode(&records, &config))? + "\n",
        OutputFormat::JsonPretty => encoder.encode_to_json(&records, &config)? + "\n",
    };

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_summary(
    input: &Path,
    input_format: InputFormat,
    config: Option<&Path>,
    metric: &str,
    factor: Option<&str>,
    json: bool,
) -> Result<(), TrustcalCliError> {
    let config = load_config(config)?;
    let measure = Measure::resolve(metric, &config)?;
    let grouping = resolve_grouping(&config, factor)?;
    let records = load_records(input, input_format, &config)?;

    let summaries = analysis::summarize_by(&records, measure.clone(), grouping);
    let initial_trust = (measure == Measure::Derived(Metric::InitialTrust))
        .then(|| analysis::initial_trust_by(&records, grouping));

    if json {
        let report = SummaryReport {
            metric: measure,
            grouping: grouping.name().to_string(),
            groups: summaries,
            initial_trust,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let title = format!("Summary: {} by {}", measure, grouping.name());
    println!("{}", title);
    println!("{}", "=".repeat(title.len()));
    for s in &summaries {
        print_group_summary(s);
    }

    if let Some(trust) = initial_trust {
        println!("\nInitial trust (corner 1):");
        for c in &trust.counts {
            println!(
                "  {:<24} complied {:>3}  not complied {:>3}",
                c.group, c.complied, c.not_complied
            );
        }
        match trust.test {
            Some(test) => println!(
                "  chi2({}) = {:.3}, p = {:.4} {}",
                test.dof,
                test.chi2,
                test.p_value,
                trust_calibration::stats::significance_marker(test.p_value)
            ),
            None => println!("  chi-square not computable (degenerate table)"),
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_compare(
    input: &Path,
    input_format: InputFormat,
    config: Option<&Path>,
    metric: &str,
    factor: Option<&str>,
    group_a: &str,
    group_b: &str,
    variance: Variance,
    json: bool,
) -> Result<(), TrustcalCliError> {
    let config = load_config(config)?;
    let measure = Measure::resolve(metric, &config)?;
    let grouping = resolve_grouping(&config, factor)?;
    let records = load_records(input, input_format, &config)?;

    let comparison =
        analysis::compare_groups(&records, measure, grouping, group_a, group_b, variance)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
        return Ok(());
    }

    println!(
        "Comparison: {} by {} ({} vs {})",
        comparison.metric, comparison.grouping, group_a, group_b
    );
    print_group_summary(&comparison.group_a);
    print_group_summary(&comparison.group_b);

    let test = &comparison.test;
    println!(
        "\n  t({:.1}) = {:.3}, p = {:.4} {}",
        test.df, test.t, test.p_value, comparison.significance
    );
    println!("  mean difference = {:.3}", test.mean_difference);
    if let Some(d) = test.cohens_d {
        println!("  Cohen's d = {:.3}", d);
    }

    Ok(())
}

fn cmd_correlate(
    input: &Path,
    input_format: InputFormat,
    config: Option<&Path>,
    x: &str,
    y: &str,
    json: bool,
) -> Result<(), TrustcalCliError> {
    let config = load_config(config)?;
    let x = Measure::resolve(x, &config)?;
    let y = Measure::resolve(y, &config)?;
    let records = load_records(input, input_format, &config)?;

    let result = analysis::correlate(&records, x, y)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "{} vs {}: r({}) = {:.3}, p = {:.4} {}",
            result.x,
            result.y,
            result.correlation.n.saturating_sub(2),
            result.correlation.r,
            result.correlation.p_value,
            result.significance
        );
    }

    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    config: Option<&Path>,
    json: bool,
) -> Result<(), TrustcalCliError> {
    let config = load_config(config)?;
    let input_data = read_input(input)?;
    let rows = RecordAdapter::parse(&input_data, input_format.into())?;

    let results = RecordAdapter::validate_rows(&rows, &config);

    let report = ValidationReport {
        total_rows: rows.len(),
        valid_rows: rows.len() - results.len(),
        invalid_rows: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                participant_id: r.participant_id.clone(),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total rows:   {}", report.total_rows);
        println!("Valid rows:   {}", report.valid_rows);
        println!("Invalid rows: {}", report.invalid_rows);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Participant {} (row {}): {}",
                    err.participant_id.as_deref().unwrap_or("unknown"),
                    err.index,
                    err.error
                );
            }
        }
    }

    if report.invalid_rows > 0 {
        Err(TrustcalCliError::ValidationFailed(report.invalid_rows))
    } else {
        Ok(())
    }
}

fn cmd_layout(config: Option<&Path>, json: bool) -> Result<(), TrustcalCliError> {
    let config = load_config(config)?;
    let layout = &config.layout;

    if json {
        let report = LayoutReport {
            study: config.name.clone(),
            corner_count: layout.corner_count(),
            phase1_end: layout.phases.phase1_end,
            phase2_end: layout.phases.phase2_end,
            error_corners: layout.error_corners(),
            agent_recommendation: layout
                .agent_recommendation
                .iter()
                .map(|(c, d)| (*c, d.as_str().to_string()))
                .collect(),
            correct_direction: layout
                .correct_direction
                .iter()
                .map(|(c, d)| (*c, d.as_str().to_string()))
                .collect(),
            factors: config.factors.clone(),
            covariates: config.covariates.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Study: {}", config.name);
    println!(
        "Phases: 1..={} | {}..={}",
        layout.phases.phase1_end,
        layout.phases.phase1_end + 1,
        layout.phases.phase2_end
    );
    println!("\n  corner  agent    correct");
    for corner in 1..=layout.corner_count() {
        let agent = layout.agent_recommendation.get(&corner);
        let correct = layout.correct_direction.get(&corner);
        let flag = match (agent, correct) {
            (Some(a), Some(c)) if a != c => "  <- error",
            _ => "",
        };
        println!(
            "  {:>6}  {:<7}  {:<7}{}",
            corner,
            agent.map(|d| d.as_str()).unwrap_or("-"),
            correct.map(|d| d.as_str()).unwrap_or("-"),
            flag
        );
    }
    println!("\nError corners: {:?}", layout.error_corners());

    if !config.factors.is_empty() {
        println!("\nFactors:");
        for factor in &config.factors {
            println!("  {}", factor.name);
            for (level, conditions) in &factor.levels {
                println!("    {:<12} {}", level, conditions.join(", "));
            }
        }
    }
    if !config.covariates.is_empty() {
        println!("\nCovariates: {}", config.covariates.join(", "));
    }

    Ok(())
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), TrustcalCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("trustcal version {}", VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {}", SCHEMA_VERSION),
    });

    match config {
        Some(path) if !path.exists() => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Error,
            message: format!("Config file {} does not exist", path.display()),
        }),
        Some(path) => match StudyConfig::load(path) {
            Ok(config) => checks.push(config_check(&config)),
            Err(e) => checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: format!("Invalid config: {}", e),
            }),
        },
        None => {
            let mut check = config_check(&StudyConfig::default());
            check.message = format!("No config given, using built-in preset. {}", check.message);
            checks.push(check);
        }
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (use -i <file>)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (-i - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("trustcal Doctor Report");
        println!("======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(TrustcalCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn config_check(config: &StudyConfig) -> DoctorCheck {
    let layout = &config.layout;
    let gaps: Vec<u8> = (1..=layout.corner_count())
        .filter(|c| layout.reference(*c).is_err())
        .collect();

    if gaps.is_empty() {
        DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "Study '{}': {} corners, error corners {:?}",
                config.name,
                layout.corner_count(),
                layout.error_corners()
            ),
        }
    } else {
        DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: format!(
                "Study '{}': no reference entry for corners {:?}; responses there will be rejected",
                config.name, gaps
            ),
        }
    }
}

fn resolve_grouping<'c>(
    config: &'c StudyConfig,
    factor: Option<&str>,
) -> Result<Grouping<'c>, ComputeError> {
    match factor {
        Some(name) => Ok(Grouping::Factor(config.factor(name)?)),
        None => Ok(Grouping::Condition),
    }
}

fn load_config(path: Option<&Path>) -> Result<StudyConfig, TrustcalCliError> {
    match path {
        Some(path) => Ok(StudyConfig::load(path)?),
        None => Ok(StudyConfig::default()),
    }
}

fn read_input(input: &Path) -> Result<String, TrustcalCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn load_records(
    input: &Path,
    input_format: InputFormat,
    config: &StudyConfig,
) -> Result<Vec<AnnotatedRecord>, TrustcalCliError> {
    let input_data = read_input(input)?;
    let records = derive_metrics(&input_data, input_format.into(), config)?;

    if records.is_empty() {
        return Err(TrustcalCliError::NoRecords);
    }

    Ok(records)
}

fn print_group_summary(s: &GroupSummary) {
    match &s.summary {
        Some(summary) => println!(
            "  {:<24} n = {:>3}  M = {:>8.3}  SD = {:>8}  (excluded {})",
            s.group,
            summary.n,
            summary.mean,
            summary
                .sd
                .map(|sd| format!("{:.3}", sd))
                .unwrap_or_else(|| "-".to_string()),
            s.undefined
        ),
        None => println!(
            "  {:<24} no defined values ({} participants)",
            s.group, s.participants
        ),
    }
}

// Error handling

#[derive(Debug)]
enum TrustcalCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    NoRecords,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for TrustcalCliError {
    fn from(e: io::Error) -> Self {
        TrustcalCliError::Io(e)
    }
}

impl From<ComputeError> for TrustcalCliError {
    fn from(e: ComputeError) -> Self {
        TrustcalCliError::Compute(e)
    }
}

impl From<serde_json::Error> for TrustcalCliError {
    fn from(e: serde_json::Error) -> Self {
        TrustcalCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<TrustcalCliError> for CliError {
    fn from(e: TrustcalCliError) -> Self {
        match e {
            TrustcalCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            TrustcalCliError::Compute(e) => compute_error(e),
            TrustcalCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            TrustcalCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No participant records found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            TrustcalCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} rows failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            TrustcalCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

fn compute_error(e: ComputeError) -> CliError {
    let (code, hint) = match &e {
        ComputeError::ConfigurationError { .. }
        | ComputeError::InvalidLayout(_)
        | ComputeError::InvalidConfig(_) => (
            "CONFIGURATION_ERROR",
            "Run 'trustcal layout' to inspect the reference tables",
        ),
        ComputeError::UnknownCondition(_) => (
            "UNKNOWN_CONDITION",
            "Check the condition labels listed in the study configuration",
        ),
        ComputeError::UnknownMetric(_) => (
            "UNKNOWN_METRIC",
            "Use a derived field name such as compliance_rate, trust_post, or a configured covariate",
        ),
        ComputeError::UnknownFactor(_) => (
            "UNKNOWN_FACTOR",
            "Run 'trustcal layout' to list the configured factors and levels",
        ),
        ComputeError::DuplicateParticipant(_) => (
            "DUPLICATE_PARTICIPANT",
            "Run 'trustcal validate' for details",
        ),
        ComputeError::InsufficientData(_) => (
            "INSUFFICIENT_DATA",
            "Each group needs enough defined values for the test",
        ),
        ComputeError::Io(_) => ("IO_ERROR", "Check file paths and permissions"),
        ComputeError::JsonError(_) => ("JSON_ERROR", "Check JSON syntax"),
        ComputeError::ParseError(_) | ComputeError::MissingField(_) => (
            "PARSE_ERROR",
            "Ensure input matches the trial.raw_row.v1 column layout",
        ),
    };

    CliError {
        code: code.to_string(),
        message: e.to_string(),
        hint: Some(hint.to_string()),
    }
}

// Report types

#[derive(serde::Serialize)]
struct SummaryReport {
    metric: Measure,
    grouping: String,
    groups: Vec<GroupSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    initial_trust: Option<analysis::InitialTrustAnalysis>,
}

#[derive(serde::Serialize)]
struct ValidationReport {
    total_rows: usize,
    valid_rows: usize,
    invalid_rows: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    participant_id: Option<String>,
    error: String,
}

#[derive(serde::Serialize)]
struct LayoutReport {
    study: String,
    corner_count: u8,
    phase1_end: u8,
    phase2_end: u8,
    error_corners: Vec<u8>,
    agent_recommendation: std::collections::BTreeMap<u8, String>,
    correct_direction: std::collections::BTreeMap<u8, String>,
    factors: Vec<trust_calibration::config::Factor>,
    covariates: Vec<String>,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
