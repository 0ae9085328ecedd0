//! # Scoring of period estimates
//!
//! Folded light curves are inspected outside of this crate and every (object, method) pair
//! receives a **grade**: the index of a criterion in an ordered criteria list, or `Null` when
//! no verdict was given. This module turns those grades into comparable summary tables.
//!
//! ## Overview
//! -----------------
//! * [`ScoreLabel`] – the usual verdicts `Wrong` (0), `Right` (1), `Multiply` (2) and `Null`.
//! * [`Grade`] – a generic sheet cell: `Criterion(index)` or `Null`.
//! * [`ScoreSheet`] – ordered grade columns (`PDM1_g`, `MHAOV_g`, `catalog`, …) over ordered
//!   object ids.
//! * [`summarize_hit_rate`] – per column criterion rates and null fractions (Contract A).
//! * [`source::summarize_by_source`] – catalog accuracy per source across classes.
//! * [`samples::summarize_across_samples`] – stack summaries of several sample-size tiers.
//!
//! ## Normalisation
//! -----------------
//! For a column with `n` grades of which `k` are non-null:
//!
//! ```text
//! Null      = (n - k) / n
//! Non-Nulls = k / n
//! rate(c)   = count(c) / k
//! ```
//!
//! Rates of a column with `k = 0` and null fractions of a column with `n = 0` are **missing**
//! (`None`), never `NaN` or infinite.
//!
//! Grades are supplied by the caller; nothing here derives them from the estimates.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ppem_errors::PpemError;

pub mod samples;
pub mod score_sheet;
pub mod source;
pub mod table;

pub use score_sheet::ScoreSheet;
pub use table::{StackedSummary, SummaryTable};

/// Label of the null-fraction row.
pub const NULL_ROW: &str = "Null";
/// Label of the non-null-fraction row.
pub const NON_NULL_ROW: &str = "Non-Nulls";

/// Verdict of a folded-curve inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScoreLabel {
    Wrong,
    Right,
    /// The estimate is a multiple (or fraction) of the true period.
    Multiply,
    Null,
}

impl ScoreLabel {
    /// Outcomes in ordinal order 0, 1, 2.
    pub const OUTCOMES: [ScoreLabel; 3] =
        [ScoreLabel::Wrong, ScoreLabel::Right, ScoreLabel::Multiply];

    pub fn name(self) -> &'static str {
        match self {
            ScoreLabel::Wrong => "Wrong",
            ScoreLabel::Right => "Right",
            ScoreLabel::Multiply => "Multiply",
            ScoreLabel::Null => "Null",
        }
    }

    /// Ordinal code, `None` for `Null`.
    pub fn code(self) -> Option<usize> {
        ScoreLabel::OUTCOMES.iter().position(|&l| l == self)
    }

    pub fn from_code(code: usize) -> Option<ScoreLabel> {
        ScoreLabel::OUTCOMES.get(code).copied()
    }

    pub fn is_null(self) -> bool {
        self == ScoreLabel::Null
    }
}

impl fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScoreLabel {
    type Err = PpemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            ScoreLabel::Wrong,
            ScoreLabel::Right,
            ScoreLabel::Multiply,
            ScoreLabel::Null,
        ]
        .into_iter()
        .find(|l| l.name().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| PpemError::UnknownLabel(s.to_string()))
    }
}

/// One cell of a [`ScoreSheet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grade {
    /// Index into the criteria list the sheet is summarized with.
    Criterion(usize),
    Null,
}

impl Grade {
    /// Grade of a label against an ordered criteria list (`Null` maps to `Null`).
    ///
    /// Return
    /// ----------
    /// * `Err(PpemError::UnknownLabel)` if the label is not one of the criteria.
    pub fn from_label<S: AsRef<str>>(
        label: ScoreLabel,
        criteria: &[S],
    ) -> Result<Grade, PpemError> {
        if label.is_null() {
            return Ok(Grade::Null);
        }
        criteria
            .iter()
            .position(|c| c.as_ref() == label.name())
            .map(Grade::Criterion)
            .ok_or_else(|| PpemError::UnknownLabel(label.name().to_string()))
    }

    /// Parse a sheet cell.
    ///
    /// Accepted forms
    /// -----------------
    /// * empty, `Null`, `NaN` → [`Grade::Null`]
    /// * an integer code `i` (`"2"` or `"2.0"`): `i < n` is `Criterion(i)`, `i == n` is `Null`
    ///   (`n` = number of criteria), larger codes are rejected with `UnknownGrade`
    /// * a criterion name → `Criterion(position)`
    pub fn parse<S: AsRef<str>>(
        raw: &str,
        criteria: &[S],
        column: &str,
    ) -> Result<Grade, PpemError> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("null") || raw.eq_ignore_ascii_case("nan") {
            return Ok(Grade::Null);
        }

        let n = criteria.len();
        let code = raw.parse::<usize>().ok().or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.fract() == 0.0 && *v >= 0.0)
                .map(|v| v as usize)
        });
        if let Some(code) = code {
            return match code {
                c if c < n => Ok(Grade::Criterion(c)),
                c if c == n => Ok(Grade::Null),
                c => Err(PpemError::UnknownGrade {
                    column: column.to_string(),
                    code: c,
                    n_criteria: n,
                }),
            };
        }

        criteria
            .iter()
            .position(|c| c.as_ref() == raw)
            .map(Grade::Criterion)
            .ok_or_else(|| PpemError::UnknownLabel(raw.to_string()))
    }

    pub fn is_null(self) -> bool {
        self == Grade::Null
    }
}

/// Criterion rates and null fractions of every column of a sheet.
///
/// Arguments
/// -----------------
/// * `sheet` – grades per column.
/// * `criteria` – ordered criteria names; `Criterion(i)` counts towards `criteria[i]`.
///
/// Return
/// ----------
/// * `(rates, nulls)`:
///   - `rates`: one row per criterion, one column per sheet column, `count / non_null`.
///   - `nulls`: rows [`NULL_ROW`] and [`NON_NULL_ROW`], fractions of the column total.
/// * `Err(PpemError::UnknownGrade)` if a grade index is outside `criteria`.
///
/// See also
/// ------------
/// * [`samples::summarize_across_samples`] – Stack several `(rates, nulls)` pairs.
pub fn summarize_hit_rate<S: AsRef<str>>(
    sheet: &ScoreSheet,
    criteria: &[S],
) -> Result<(SummaryTable, SummaryTable), PpemError> {
    let criteria_names: Vec<String> = criteria.iter().map(|c| c.as_ref().to_string()).collect();
    let columns = sheet.column_names().to_vec();

    let mut rates = SummaryTable::new(criteria_names.clone(), columns.clone());
    let mut nulls = SummaryTable::new(
        vec![NULL_ROW.to_string(), NON_NULL_ROW.to_string()],
        columns.clone(),
    );

    for (col, name) in columns.iter().enumerate() {
        let grades = sheet.column_at(col);
        let mut counts = vec![0usize; criteria_names.len()];
        let mut n_null = 0usize;
        for grade in grades {
            match *grade {
                Grade::Null => n_null += 1,
                Grade::Criterion(i) if i < counts.len() => counts[i] += 1,
                Grade::Criterion(i) => {
                    return Err(PpemError::UnknownGrade {
                        column: name.clone(),
                        code: i,
                        n_criteria: criteria_names.len(),
                    })
                }
            }
        }

        let total = grades.len();
        let non_null = total - n_null;
        if total > 0 {
            nulls.set(0, col, Some(n_null as f64 / total as f64));
            nulls.set(1, col, Some(non_null as f64 / total as f64));
        }
        if non_null > 0 {
            for (row, count) in counts.into_iter().enumerate() {
                rates.set(row, col, Some(count as f64 / non_null as f64));
            }
        }
    }

    Ok((rates, nulls))
}

#[cfg(test)]
mod scoring_test {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_label_codes() {
        assert_eq!(ScoreLabel::Wrong.code(), Some(0));
        assert_eq!(ScoreLabel::Multiply.code(), Some(2));
        assert_eq!(ScoreLabel::Null.code(), None);
        assert_eq!(ScoreLabel::from_code(1), Some(ScoreLabel::Right));
        assert_eq!(ScoreLabel::from_code(3), None);
        assert_eq!("right".parse::<ScoreLabel>().unwrap(), ScoreLabel::Right);
        assert!("Maybe".parse::<ScoreLabel>().is_err());
    }

    #[test]
    fn test_grade_parse_forms() {
        let criteria = ["Wrong", "Right", "Multiply"];
        assert_eq!(Grade::parse("", &criteria, "c").unwrap(), Grade::Null);
        assert_eq!(Grade::parse("NaN", &criteria, "c").unwrap(), Grade::Null);
        assert_eq!(Grade::parse("1", &criteria, "c").unwrap(), Grade::Criterion(1));
        assert_eq!(Grade::parse("2.0", &criteria, "c").unwrap(), Grade::Criterion(2));
        assert_eq!(Grade::parse("3", &criteria, "c").unwrap(), Grade::Null);
        assert_eq!(Grade::parse("Multiply", &criteria, "c").unwrap(), Grade::Criterion(2));
        assert!(matches!(
            Grade::parse("4", &criteria, "c"),
            Err(PpemError::UnknownGrade { code: 4, n_criteria: 3, .. })
        ));
        assert!(matches!(
            Grade::parse("Half", &criteria, "c"),
            Err(PpemError::UnknownLabel(_))
        ));
    }

    #[test]
    fn test_rates_sum_to_one() {
        let criteria = ["0", "1", "2", "3"];
        let mut sheet = ScoreSheet::new(vec![
            "a".into(),
            "b".into(),
            "c".into(),
            "d".into(),
            "e".into(),
        ]);
        sheet
            .push_column(
                "PDM1_g",
                vec![
                    Grade::Criterion(0),
                    Grade::Criterion(3),
                    Grade::Criterion(3),
                    Grade::Null,
                    Grade::Criterion(1),
                ],
            )
            .unwrap();
        let (rates, nulls) = summarize_hit_rate(&sheet, &criteria).unwrap();
        let sum: f64 = criteria
            .iter()
            .map(|c| rates.get(c, "PDM1_g").unwrap())
            .sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        assert_relative_eq!(nulls.get(NULL_ROW, "PDM1_g").unwrap(), 0.2);
        assert_relative_eq!(nulls.get(NON_NULL_ROW, "PDM1_g").unwrap(), 0.8);
        assert_relative_eq!(rates.get("3", "PDM1_g").unwrap(), 0.5);
        assert_relative_eq!(rates.get("2", "PDM1_g").unwrap(), 0.0);
    }

    #[test]
    fn test_all_null_column_is_missing() {
        let mut sheet = ScoreSheet::new(vec!["a".into(), "b".into()]);
        sheet.push_column("AOV_g", vec![Grade::Null, Grade::Null]).unwrap();
        let (rates, nulls) = summarize_hit_rate(&sheet, &["Wrong", "Right"]).unwrap();
        assert_eq!(rates.get("Wrong", "AOV_g"), None);
        assert_eq!(rates.get("Right", "AOV_g"), None);
        assert_eq!(nulls.get(NULL_ROW, "AOV_g"), Some(1.0));
        assert_eq!(nulls.get(NON_NULL_ROW, "AOV_g"), Some(0.0));
    }

    #[test]
    fn test_empty_sheet_has_missing_cells() {
        let mut sheet = ScoreSheet::new(Vec::new());
        sheet.push_column("AOV_g", Vec::new()).unwrap();
        let (rates, nulls) = summarize_hit_rate(&sheet, &["Wrong", "Right"]).unwrap();
        assert_eq!(rates.columns(), ["AOV_g".to_string()]);
        assert_eq!(rates.get("Right", "AOV_g"), None);
        assert_eq!(nulls.get(NULL_ROW, "AOV_g"), None);
        assert_eq!(nulls.get(NON_NULL_ROW, "AOV_g"), None);
    }

    #[test]
    fn test_grade_outside_criteria() {
        let mut sheet = ScoreSheet::new(vec!["a".into()]);
        sheet.push_column("AOV_g", vec![Grade::Criterion(5)]).unwrap();
        assert!(matches!(
            summarize_hit_rate(&sheet, &["Wrong", "Right"]),
            Err(PpemError::UnknownGrade { code: 5, .. })
        ));
    }
}
