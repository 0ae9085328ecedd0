//! # Tabular exchange of batch results
//!
//! A [`ResultsTable`] is exported as one CSV file with an `oid` index column. When catalog
//! tags are attached, `period` and `source` (and `class` when any tag carries one) follow.
//! Each method then contributes a fixed group of columns:
//!
//! | mode | columns |
//! |---|---|
//! | single-band | `{m}_samples_g`, `{m}_samples_r`, `{m}_time_g`, `{m}_time_r`, `{m}_T_g`, `{m}_T_r` |
//! | multiband | `{m}_samples_g`, `{m}_samples_r`, `{m}_time`, `{m}_T` |
//!
//! `T` is the best period (days), `time` the engine time (seconds). Missing values are empty
//! fields. On load, methods are recovered from the `{m}_samples_g` headers and the mode from
//! the presence of `{m}_time`.
use std::fs::File;
use std::io::{Read, Write};

use camino::Utf8Path;
use csv::StringRecord;

use super::batch::ResultsTable;
use super::{BandEstimates, PeriodEstimate, PeriodFit};
use crate::constants::{Band, FastHashMap};
use crate::periodogram::Method;
use crate::ppem_errors::PpemError;
use crate::tags::{Tag, TagSet};

const SAMPLES_G_SUFFIX: &str = "_samples_g";

/// Header names of one method group.
pub fn column_names(method: Method, multiband: bool) -> Vec<String> {
    let mut names = vec![
        format!("{method}_samples_g"),
        format!("{method}_samples_r"),
    ];
    if multiband {
        names.push(format!("{method}_time"));
        names.push(format!("{method}_T"));
    } else {
        for band in Band::ALL {
            names.push(format!("{method}_time_{band}"));
        }
        for band in Band::ALL {
            names.push(format!("{method}_T_{band}"));
        }
    }
    names
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn method_cells(est: &PeriodEstimate) -> Vec<String> {
    let mut cells = vec![est.samples_g.to_string(), est.samples_r.to_string()];
    match &est.bands {
        BandEstimates::SingleBand { g, r } => {
            cells.push(fmt_opt(g.map(|f| f.compute_time)));
            cells.push(fmt_opt(r.map(|f| f.compute_time)));
            cells.push(fmt_opt(g.map(|f| f.period)));
            cells.push(fmt_opt(r.map(|f| f.period)));
        }
        BandEstimates::MultiBand(fit) => {
            cells.push(fmt_opt(fit.map(|f| f.compute_time)));
            cells.push(fmt_opt(fit.map(|f| f.period)));
        }
    }
    cells
}

/// Header lookup of a CSV file.
struct Columns {
    positions: FastHashMap<String, usize>,
}

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        Columns {
            positions: headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.to_string(), i))
                .collect(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    fn require(&self, name: &str) -> Result<usize, PpemError> {
        self.position(name)
            .ok_or_else(|| PpemError::MissingColumn(name.to_string()))
    }
}

fn invalid(column: &str, value: &str) -> PpemError {
    PpemError::InvalidCell {
        column: column.to_string(),
        value: value.to_string(),
    }
}

fn parse_opt_f64(
    record: &StringRecord,
    pos: usize,
    column: &str,
) -> Result<Option<f64>, PpemError> {
    let raw = record.get(pos).unwrap_or("").trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| invalid(column, raw))
}

fn parse_count(record: &StringRecord, pos: usize, column: &str) -> Result<usize, PpemError> {
    let raw = record.get(pos).unwrap_or("").trim();
    // counts written by dataframe exports may carry a trailing ".0"
    raw.parse::<usize>()
        .or_else(|_| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.fract() == 0.0 && *v >= 0.0)
                .map(|v| v as usize)
                .ok_or(())
        })
        .map_err(|_| invalid(column, raw))
}

/// A slot is either fully present or fully missing; half a slot is rejected.
fn fit_from(
    (period, period_column): (Option<f64>, &str),
    (time, time_column): (Option<f64>, &str),
) -> Result<Option<PeriodFit>, PpemError> {
    match (period, time) {
        (Some(period), Some(compute_time)) => Ok(Some(PeriodFit {
            period,
            compute_time,
        })),
        (None, None) => Ok(None),
        (Some(_), None) => Err(invalid(time_column, "")),
        (None, Some(_)) => Err(invalid(period_column, "")),
    }
}

/// Positions of the columns of one method group.
struct MethodGroup {
    method: Method,
    names: Vec<String>,
    positions: Vec<usize>,
}

impl MethodGroup {
    fn locate(columns: &Columns, method: Method, multiband: bool) -> Result<Self, PpemError> {
        let names = column_names(method, multiband);
        let positions = names
            .iter()
            .map(|n| columns.require(n))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MethodGroup {
            method,
            names,
            positions,
        })
    }

    fn parse(&self, record: &StringRecord, multiband: bool) -> Result<PeriodEstimate, PpemError> {
        let count = |k: usize| parse_count(record, self.positions[k], &self.names[k]);
        let float = |k: usize| {
            parse_opt_f64(record, self.positions[k], &self.names[k])
                .map(|v| (v, self.names[k].as_str()))
        };

        let bands = if multiband {
            BandEstimates::MultiBand(fit_from(float(3)?, float(2)?)?)
        } else {
            BandEstimates::SingleBand {
                g: fit_from(float(4)?, float(2)?)?,
                r: fit_from(float(5)?, float(3)?)?,
            }
        };
        Ok(PeriodEstimate {
            samples_g: count(0)?,
            samples_r: count(1)?,
            bands,
        })
    }
}

impl ResultsTable {
    /// Write the table as CSV.
    ///
    /// See also
    /// ------------
    /// * [`column_names`] – Header names of each method group.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), PpemError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let with_class = self
            .tags
            .as_ref()
            .is_some_and(|t| t.iter().any(|tag| tag.class.is_some()));

        let mut header = vec!["oid".to_string()];
        if self.tags.is_some() {
            header.push("period".into());
            header.push("source".into());
            if with_class {
                header.push("class".into());
            }
        }
        for &method in &self.methods {
            header.extend(column_names(method, self.multiband));
        }
        csv_writer.write_record(&header)?;

        for (row, oid) in self.object_ids.iter().enumerate() {
            let mut record = vec![oid.clone()];
            if let Some(tags) = &self.tags {
                let tag = tags
                    .get(oid)
                    .ok_or_else(|| PpemError::MissingTag(oid.clone()))?;
                record.push(fmt_opt(tag.period));
                record.push(tag.source.clone());
                if with_class {
                    record.push(tag.class.clone().unwrap_or_default());
                }
            }
            for column in &self.columns {
                record.extend(method_cells(&column[row]));
            }
            csv_writer.write_record(&record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn save_csv(&self, path: &Utf8Path) -> Result<(), PpemError> {
        self.write_csv(File::create(path)?)
    }

    /// Read a table written by [`ResultsTable::write_csv`] or by earlier runs.
    ///
    /// Return
    /// ----------
    /// * `Err(PpemError::MissingColumn)` if `oid` or a column of a detected method group is
    ///   absent, or if the method groups disagree on the search mode.
    /// * `Err(PpemError::InvalidCell)` for unparsable values.
    pub fn read_csv<R: Read>(reader: R) -> Result<ResultsTable, PpemError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let columns = Columns::new(&headers);
        let oid_pos = columns.require("oid")?;

        let methods = headers
            .iter()
            .filter_map(|h| h.strip_suffix(SAMPLES_G_SUFFIX))
            .map(str::parse::<Method>)
            .collect::<Result<Vec<_>, _>>()?;

        let multiband = methods
            .first()
            .is_some_and(|m| columns.position(&format!("{m}_time")).is_some());
        let groups = methods
            .iter()
            .map(|&m| MethodGroup::locate(&columns, m, multiband))
            .collect::<Result<Vec<_>, _>>()?;

        let tag_columns = match (columns.position("period"), columns.position("source")) {
            (Some(p), Some(s)) => Some((p, s, columns.position("class"))),
            _ => None,
        };

        let mut object_ids = Vec::new();
        let mut cells: Vec<Vec<PeriodEstimate>> = vec![Vec::new(); groups.len()];
        let mut tags = TagSet::new();

        for record in csv_reader.records() {
            let record = record?;
            let oid = record.get(oid_pos).unwrap_or("").to_string();

            if let Some((p, s, c)) = tag_columns {
                tags.push(Tag {
                    oid: oid.clone(),
                    period: parse_opt_f64(&record, p, "period")?,
                    source: record.get(s).unwrap_or("").to_string(),
                    class: c
                        .and_then(|c| record.get(c))
                        .filter(|v| !v.is_empty())
                        .map(str::to_string),
                });
            }
            for (group, column) in groups.iter().zip(cells.iter_mut()) {
                column.push(group.parse(&record, multiband)?);
            }
            object_ids.push(oid);
        }

        let mut table = ResultsTable::with_capacity(object_ids, multiband);
        for (group, column) in groups.into_iter().zip(cells) {
            table.push_column(group.method, column);
        }
        if tag_columns.is_some() {
            table.tags = Some(tags);
        }
        Ok(table)
    }

    pub fn load_csv(path: &Utf8Path) -> Result<ResultsTable, PpemError> {
        ResultsTable::read_csv(File::open(path)?)
    }
}
