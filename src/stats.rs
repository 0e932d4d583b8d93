//! Descriptive statistics and independent-samples tests
//!
//! Everything here operates on already-filtered observations: callers drop
//! undefined metrics before handing values in. Functions return `None` instead
//! of a number whenever the result would rest on too few observations.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, StudentsT};

/// Arithmetic mean; `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance (n - 1 denominator); needs at least two values
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    Some(ss / (values.len() - 1) as f64)
}

/// Sample standard deviation
pub fn std_dev(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Descriptive summary of one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub n: usize,
    pub mean: f64,
    pub sd: Option<f64>,
    pub sem: Option<f64>,
}

pub fn describe(values: &[f64]) -> Option<Summary> {
    let mean = mean(values)?;
    let sd = std_dev(values);
    let sem = sd.map(|s| s / (values.len() as f64).sqrt());
    Some(Summary {
        n: values.len(),
        mean,
        sd,
        sem,
    })
}

/// Variance assumption for the two-sample t-test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variance {
    /// Student's t-test with pooled variance
    #[default]
    Pooled,
    /// Welch's t-test with Welch-Satterthwaite degrees of freedom
    Welch,
}

/// Result of an independent-samples t-test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TTest {
    pub t: f64,
    pub df: f64,
    pub p_value: f64,
    /// Mean of the first group minus mean of the second
    pub mean_difference: f64,
    /// Cohen's d with the average-variance denominator
    pub cohens_d: Option<f64>,
    pub variance: Variance,
}

/// Two-sided independent-samples t-test of `a` against `b`.
///
/// Needs at least two observations per group and a non-zero standard error.
pub fn independent_t_test(a: &[f64], b: &[f64], variance: Variance) -> Option<TTest> {
    let (m1, m2) = (mean(a)?, mean(b)?);
    let (v1, v2) = (sample_variance(a)?, sample_variance(b)?);
    let (n1, n2) = (a.len() as f64, b.len() as f64);

    let (se, df) = match variance {
        Variance::Pooled => {
            let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / (n1 + n2 - 2.0);
            ((pooled * (1.0 / n1 + 1.0 / n2)).sqrt(), n1 + n2 - 2.0)
        }
        Variance::Welch => {
            let (se1, se2) = (v1 / n1, v2 / n2);
            let df = (se1 + se2).powi(2)
                / (se1.powi(2) / (n1 - 1.0) + se2.powi(2) / (n2 - 1.0));
            ((se1 + se2).sqrt(), df)
        }
    };

    if se.is_nan() || se <= 0.0 || !df.is_finite() {
        return None;
    }

    let mean_difference = m1 - m2;
    let t = mean_difference / se;
    let p_value = two_sided_t_p(t, df)?;

    let d_denominator = ((v1 + v2) / 2.0).sqrt();
    let cohens_d = (d_denominator > 0.0).then(|| mean_difference / d_denominator);

    Some(TTest {
        t,
        df,
        p_value,
        mean_difference,
        cohens_d,
        variance,
    })
}

fn two_sided_t_p(t: f64, df: f64) -> Option<f64> {
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}

/// Result of a chi-square test of independence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChiSquare {
    pub chi2: f64,
    pub dof: usize,
    pub p_value: f64,
}

/// Chi-square test of independence on a contingency table of counts.
///
/// All-zero rows and columns are dropped first. With one degree of freedom
/// the Yates continuity correction is applied, capped at the absolute
/// deviation of each cell.
pub fn chi_square_independence(table: &[Vec<f64>]) -> Option<ChiSquare> {
    let cols = table.iter().map(Vec::len).max().unwrap_or(0);
    let cell = |r: &Vec<f64>, c: usize| r.get(c).copied().unwrap_or(0.0);

    let keep_cols: Vec<usize> = (0..cols)
        .filter(|&c| table.iter().map(|r| cell(r, c)).sum::<f64>() > 0.0)
        .collect();
    let rows: Vec<Vec<f64>> = table
        .iter()
        .map(|r| keep_cols.iter().map(|&c| cell(r, c)).collect::<Vec<f64>>())
        .filter(|r| r.iter().sum::<f64>() > 0.0)
        .collect();

    if rows.len() < 2 || keep_cols.len() < 2 {
        return None;
    }

    let row_totals: Vec<f64> = rows.iter().map(|r| r.iter().sum()).collect();
    let col_totals: Vec<f64> = (0..keep_cols.len())
        .map(|c| rows.iter().map(|r| r[c]).sum())
        .collect();
    let grand: f64 = row_totals.iter().sum();

    let dof = (rows.len() - 1) * (keep_cols.len() - 1);
    let yates = dof == 1;

    let mut chi2 = 0.0;
    for (i, row) in rows.iter().enumerate() {
        for (j, &observed) in row.iter().enumerate() {
            let expected = row_totals[i] * col_totals[j] / grand;
            let mut deviation = (observed - expected).abs();
            if yates {
                deviation -= deviation.min(0.5);
            }
            chi2 += deviation.powi(2) / expected;
        }
    }

    let dist = ChiSquared::new(dof as f64).ok()?;
    let p_value = (1.0 - dist.cdf(chi2)).clamp(0.0, 1.0);

    Some(ChiSquare { chi2, dof, p_value })
}

/// Result of a Pearson correlation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub r: f64,
    pub p_value: f64,
    pub n: usize,
}

/// Pearson product-moment correlation with a two-sided p-value.
///
/// Needs equal-length inputs of at least three pairs with non-zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<Correlation> {
    if x.len() != y.len() || x.len() < 3 {
        return None;
    }
    let (mx, my) = (mean(x)?, mean(y)?);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx).powi(2);
        syy += (b - my).powi(2);
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }

    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    let n = x.len();
    let df = (n - 2) as f64;

    let p_value = if (1.0 - r.abs()) < f64::EPSILON {
        0.0
    } else {
        let t = r * (df / (1.0 - r * r)).sqrt();
        two_sided_t_p(t, df)?
    };

    Some(Correlation { r, p_value, n })
}

/// Conventional significance marker for a p-value
pub fn significance_marker(p_value: f64) -> &'static str {
    if p_value < 0.001 {
        "***"
    } else if p_value < 0.01 {
        "**"
    } else if p_value < 0.05 {
        "*"
    } else if p_value < 0.10 {
        "†"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_mean_and_variance() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
        assert_eq!(sample_variance(&[5.0]), None);
        assert!(close(sample_variance(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap(), 2.5, 1e-12));
    }

    #[test]
    fn test_describe() {
        let summary = describe(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(summary.n, 5);
        assert_eq!(summary.mean, 3.0);
        assert!(close(summary.sd.unwrap(), 2.5f64.sqrt(), 1e-12));
        assert!(close(summary.sem.unwrap(), 0.5f64.sqrt(), 1e-12));

        let single = describe(&[7.0]).unwrap();
        assert_eq!(single.sd, None);
        assert_eq!(single.sem, None);
        assert!(describe(&[]).is_none());
    }

    #[test]
    fn test_pooled_t_test() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [3.0, 4.0, 5.0, 6.0, 7.0];
        let result = independent_t_test(&a, &b, Variance::Pooled).unwrap();

        assert!(close(result.t, -2.0, 1e-12));
        assert!(close(result.df, 8.0, 1e-12));
        assert!(close(result.p_value, 0.0805, 0.001));
        assert!(close(result.mean_difference, -2.0, 1e-12));
        assert!(close(result.cohens_d.unwrap(), -2.0 / 2.5f64.sqrt(), 1e-9));
    }

    #[test]
    fn test_welch_t_test() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [3.0, 4.0, 5.0, 6.0, 7.0];
        let result = independent_t_test(&a, &b, Variance::Welch).unwrap();
        // Equal sizes and variances: Welch matches Student
        assert!(close(result.t, -2.0, 1e-12));
        assert!(close(result.df, 8.0, 1e-9));

        let c = [10.0, 10.5, 9.5, 10.2];
        let d = [1.0, 30.0, 15.0, 22.0, 8.0, 3.0];
        let welch = independent_t_test(&c, &d, Variance::Welch).unwrap();
        let pooled = independent_t_test(&c, &d, Variance::Pooled).unwrap();
        assert!(welch.df < pooled.df);
    }

    #[test]
    fn test_t_test_insufficient_data() {
        assert!(independent_t_test(&[1.0], &[2.0, 3.0], Variance::Pooled).is_none());
        // Zero variance in both groups gives a zero standard error
        assert!(independent_t_test(&[2.0, 2.0], &[2.0, 2.0], Variance::Pooled).is_none());
    }

    #[test]
    fn test_chi_square_with_yates() {
        let table = vec![vec![10.0, 20.0], vec![20.0, 10.0]];
        let result = chi_square_independence(&table).unwrap();
        assert_eq!(result.dof, 1);
        assert!(close(result.chi2, 5.4, 1e-9));
        assert!(close(result.p_value, 0.0201, 0.001));
    }

    #[test]
    fn test_chi_square_larger_table() {
        let table = vec![
            vec![12.0, 3.0],
            vec![10.0, 5.0],
            vec![8.0, 7.0],
            vec![14.0, 1.0],
        ];
        let result = chi_square_independence(&table).unwrap();
        assert_eq!(result.dof, 3);
        assert!(result.chi2 > 0.0);
        assert!(result.p_value > 0.0 && result.p_value < 1.0);
    }

    #[test]
    fn test_chi_square_degenerate() {
        // Every participant complied: single non-empty column
        let table = vec![vec![0.0, 9.0], vec![0.0, 11.0]];
        assert!(chi_square_independence(&table).is_none());
        assert!(chi_square_independence(&[vec![3.0, 4.0]]).is_none());
    }

    #[test]
    fn test_pearson() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let perfect: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let result = pearson(&x, &perfect).unwrap();
        assert!(close(result.r, 1.0, 1e-12));
        assert_eq!(result.p_value, 0.0);

        let y = [2.0, 1.0, 4.0, 3.0, 5.0];
        let result = pearson(&x, &y).unwrap();
        assert!(close(result.r, 0.8, 1e-12));
        assert!(result.p_value > 0.10 && result.p_value < 0.11);
        assert_eq!(result.n, 5);
    }

    #[test]
    fn test_pearson_degenerate() {
        assert!(pearson(&[1.0, 2.0], &[1.0, 2.0]).is_none());
        assert!(pearson(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]).is_none());
        assert!(pearson(&[1.0, 2.0, 3.0], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_significance_marker() {
        assert_eq!(significance_marker(0.0004), "***");
        assert_eq!(significance_marker(0.004), "**");
        assert_eq!(significance_marker(0.04), "*");
        assert_eq!(significance_marker(0.07), "†");
        assert_eq!(significance_marker(0.2), "");
    }
}
