//! Accuracy of catalog periods, broken down by the catalog they come from.
//!
//! For each class the catalog-column verdicts are joined with the class tags on the object
//! id and cross-tabulated by `(source, outcome)`. The accuracy of a source in a class is
//! `Right / (Wrong + Right + Multiply)` rounded to two decimals; the summary of a source is
//! the mean of its accuracies over the classes where it appears.
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;

use camino::Utf8Path;

use super::ScoreLabel;
use crate::constants::ObjectId;
use crate::ppem_errors::PpemError;
use crate::tags::TagSet;

/// Per-source accuracy, per class and averaged over classes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceSummary {
    classes: Vec<String>,
    /// `source → accuracy per class` (aligned with `classes`); sorted by source.
    per_class: BTreeMap<String, Vec<Option<f64>>>,
}

impl SourceSummary {
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Sources in sorted order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.per_class.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.per_class.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_class.is_empty()
    }

    /// Rounded accuracy of `source` within `class`.
    pub fn accuracy(&self, source: &str, class: &str) -> Option<f64> {
        let c = self.classes.iter().position(|n| n == class)?;
        self.per_class.get(source)?[c]
    }

    /// Mean accuracy of `source` over the classes where it appears.
    pub fn mean(&self, source: &str) -> Option<f64> {
        let values: Vec<f64> = self.per_class.get(source)?.iter().flatten().copied().collect();
        (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
    }

    /// `(source, mean accuracy)` pairs in sorted source order.
    pub fn means(&self) -> Vec<(&str, f64)> {
        self.sources()
            .filter_map(|s| self.mean(s).map(|m| (s, m)))
            .collect()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), PpemError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let mut header = vec!["source".to_string()];
        header.extend(self.classes.iter().cloned());
        header.push("mean".into());
        csv_writer.write_record(&header)?;

        for (source, values) in &self.per_class {
            let mut record = vec![source.clone()];
            record.extend(values.iter().map(|v| v.map(|x| x.to_string()).unwrap_or_default()));
            record.push(self.mean(source).map(|m| m.to_string()).unwrap_or_default());
            csv_writer.write_record(&record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn save_csv(&self, path: &Utf8Path) -> Result<(), PpemError> {
        self.write_csv(File::create(path)?)
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Catalog accuracy per source across classes.
///
/// Arguments
/// -----------------
/// * `labels_by_class` – per class, the verdicts on the catalog periods (`oid → label`), as
///   returned by [`ScoreSheet::labels`](super::ScoreSheet::labels).
/// * `tags_by_class` – per class, the tags carrying the `source` of each object.
/// * `class_names` – name of each class.
///
/// Return
/// ----------
/// * A [`SourceSummary`]. Objects without a tag and `Null` verdicts are ignored.
/// * `Err(PpemError::ClassCountMismatch)` if the three slices differ in length.
pub fn summarize_by_source<S: AsRef<str>>(
    labels_by_class: &[Vec<(ObjectId, ScoreLabel)>],
    tags_by_class: &[TagSet],
    class_names: &[S],
) -> Result<SourceSummary, PpemError> {
    if labels_by_class.len() != class_names.len() || tags_by_class.len() != class_names.len() {
        return Err(PpemError::ClassCountMismatch {
            classes: class_names.len(),
            labels: labels_by_class.len(),
            tags: tags_by_class.len(),
        });
    }

    let n_classes = class_names.len();
    let mut summary = SourceSummary {
        classes: class_names.iter().map(|c| c.as_ref().to_string()).collect(),
        per_class: BTreeMap::new(),
    };

    for (class, (labels, tags)) in labels_by_class.iter().zip(tags_by_class).enumerate() {
        // source → [Wrong, Right, Multiply]
        let mut crosstab: BTreeMap<&str, [usize; 3]> = BTreeMap::new();
        for (oid, label) in labels {
            let (Some(tag), Some(code)) = (tags.get(oid), label.code()) else {
                continue;
            };
            crosstab.entry(tag.source.as_str()).or_default()[code] += 1;
        }

        for (source, counts) in crosstab {
            let total: usize = counts.iter().sum();
            let right = counts[1];
            summary
                .per_class
                .entry(source.to_string())
                .or_insert_with(|| vec![None; n_classes])[class] =
                Some(round2(right as f64 / total as f64));
        }
    }

    Ok(summary)
}
