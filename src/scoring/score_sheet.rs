use std::fs::File;
use std::io::{Read, Write};

use camino::Utf8Path;

use super::{Grade, ScoreLabel};
use crate::constants::ObjectId;
use crate::ppem_errors::PpemError;

/// Grade columns over an ordered list of objects.
///
/// A sheet is the tabular result of a folded-curve inspection, one column per scored series
/// (`PDM1_g`, `MHAOV_g`, …) and possibly a `catalog` column grading the catalog period
/// itself.
///
/// ```text
/// oid,PDM1_g,PDM1_r,catalog
/// ZTF18aaiopei,1,1,1
/// ZTF18abcdefg,0,,2
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreSheet {
    object_ids: Vec<ObjectId>,
    columns: Vec<String>,
    grades: Vec<Vec<Grade>>,
}

impl ScoreSheet {
    pub fn new(object_ids: Vec<ObjectId>) -> Self {
        ScoreSheet {
            object_ids,
            columns: Vec::new(),
            grades: Vec::new(),
        }
    }

    /// Add (or replace) a column.
    ///
    /// Return
    /// ----------
    /// * `Err(PpemError::InvalidParameter)` if the column length differs from the number of
    ///   objects.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        grades: Vec<Grade>,
    ) -> Result<(), PpemError> {
        let name = name.into();
        if grades.len() != self.object_ids.len() {
            return Err(PpemError::InvalidParameter(format!(
                "column {name} has {} grades for {} objects",
                grades.len(),
                self.object_ids.len()
            )));
        }
        match self.columns.iter().position(|c| *c == name) {
            Some(pos) => self.grades[pos] = grades,
            None => {
                self.columns.push(name);
                self.grades.push(grades);
            }
        }
        Ok(())
    }

    /// Add a column of labels, graded against `criteria`.
    pub fn push_labels<S: AsRef<str>>(
        &mut self,
        name: impl Into<String>,
        labels: &[ScoreLabel],
        criteria: &[S],
    ) -> Result<(), PpemError> {
        let grades = labels
            .iter()
            .map(|&l| Grade::from_label(l, criteria))
            .collect::<Result<Vec<_>, _>>()?;
        self.push_column(name, grades)
    }

    pub fn object_ids(&self) -> &[ObjectId] {
        &self.object_ids
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[Grade]> {
        let pos = self.columns.iter().position(|c| c == name)?;
        Some(&self.grades[pos])
    }

    pub(crate) fn column_at(&self, pos: usize) -> &[Grade] {
        &self.grades[pos]
    }

    /// Verdicts of one column, paired with their object ids.
    ///
    /// `Criterion(i)` is read as the label named `criteria[i]`.
    ///
    /// Return
    /// ----------
    /// * `Err(PpemError::MissingColumn)` for an unknown column.
    /// * `Err(PpemError::UnknownGrade)` for an index outside `criteria`.
    /// * `Err(PpemError::UnknownLabel)` if a criterion name is not a [`ScoreLabel`].
    pub fn labels<S: AsRef<str>>(
        &self,
        column: &str,
        criteria: &[S],
    ) -> Result<Vec<(ObjectId, ScoreLabel)>, PpemError> {
        let grades = self
            .column(column)
            .ok_or_else(|| PpemError::MissingColumn(column.to_string()))?;

        self.object_ids
            .iter()
            .zip(grades)
            .map(|(oid, grade)| -> Result<(ObjectId, ScoreLabel), PpemError> {
                let label: ScoreLabel = match *grade {
                    Grade::Null => ScoreLabel::Null,
                    Grade::Criterion(i) => criteria
                        .get(i)
                        .ok_or_else(|| PpemError::UnknownGrade {
                            column: column.to_string(),
                            code: i,
                            n_criteria: criteria.len(),
                        })?
                        .as_ref()
                        .parse()?,
                };
                Ok((oid.clone(), label))
            })
            .collect()
    }

    /// Read a sheet with an `oid` column; every other column is a grade column.
    ///
    /// See [`Grade::parse`] for the accepted cell forms.
    pub fn read_csv<R: Read, S: AsRef<str>>(
        reader: R,
        criteria: &[S],
    ) -> Result<ScoreSheet, PpemError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let oid_pos = headers
            .iter()
            .position(|h| h == "oid")
            .ok_or_else(|| PpemError::MissingColumn("oid".into()))?;
        let grade_columns: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != oid_pos)
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        let mut object_ids = Vec::new();
        let mut grades: Vec<Vec<Grade>> = vec![Vec::new(); grade_columns.len()];
        for record in csv_reader.records() {
            let record = record?;
            object_ids.push(record.get(oid_pos).unwrap_or("").to_string());
            for ((pos, name), column) in grade_columns.iter().zip(grades.iter_mut()) {
                column.push(Grade::parse(record.get(*pos).unwrap_or(""), criteria, name)?);
            }
        }

        let mut sheet = ScoreSheet::new(object_ids);
        for ((_, name), column) in grade_columns.into_iter().zip(grades) {
            sheet.push_column(name, column)?;
        }
        Ok(sheet)
    }

    pub fn load_csv<S: AsRef<str>>(
        path: &Utf8Path,
        criteria: &[S],
    ) -> Result<ScoreSheet, PpemError> {
        ScoreSheet::read_csv(File::open(path)?, criteria)
    }

    /// Write integer codes; `Null` is written as the code `criteria.len()`.
    pub fn write_csv<W: Write>(&self, writer: W, n_criteria: usize) -> Result<(), PpemError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let mut header = vec!["oid".to_string()];
        header.extend(self.columns.iter().cloned());
        csv_writer.write_record(&header)?;

        for (row, oid) in self.object_ids.iter().enumerate() {
            let mut record = vec![oid.clone()];
            for column in &self.grades {
                record.push(match column[row] {
                    Grade::Criterion(i) => i.to_string(),
                    Grade::Null => n_criteria.to_string(),
                });
            }
            csv_writer.write_record(&record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod score_sheet_test {
    use super::*;

    const OUTCOMES: [&str; 3] = ["Wrong", "Right", "Multiply"];

    #[test]
    fn test_read_codes_and_names() {
        let data = "oid,PDM1_g,catalog\nA,1,Right\nB,3,\nC,0.0,Multiply\n";
        let sheet = ScoreSheet::read_csv(data.as_bytes(), &OUTCOMES).unwrap();
        assert_eq!(sheet.object_ids(), &["A", "B", "C"]);
        assert_eq!(sheet.column_names(), &["PDM1_g", "catalog"]);
        assert_eq!(
            sheet.column("PDM1_g").unwrap(),
            &[Grade::Criterion(1), Grade::Null, Grade::Criterion(0)]
        );

        let labels = sheet.labels("catalog", &OUTCOMES).unwrap();
        assert_eq!(
            labels,
            vec![
                ("A".to_string(), ScoreLabel::Right),
                ("B".to_string(), ScoreLabel::Null),
                ("C".to_string(), ScoreLabel::Multiply),
            ]
        );
    }

    #[test]
    fn test_length_mismatch() {
        let mut sheet = ScoreSheet::new(vec!["A".into()]);
        assert!(sheet.push_column("x", vec![Grade::Null, Grade::Null]).is_err());
    }

    #[test]
    fn test_write_then_read() {
        let mut sheet = ScoreSheet::new(vec!["A".into(), "B".into()]);
        sheet
            .push_labels("AOV_g", &[ScoreLabel::Multiply, ScoreLabel::Null], &OUTCOMES)
            .unwrap();
        let mut buffer = Vec::new();
        sheet.write_csv(&mut buffer, OUTCOMES.len()).unwrap();
        assert_eq!(String::from_utf8(buffer.clone()).unwrap(), "oid,AOV_g\nA,2\nB,3\n");
        assert_eq!(ScoreSheet::read_csv(buffer.as_slice(), &OUTCOMES).unwrap(), sheet);
    }

    #[test]
    fn test_missing_column() {
        let sheet = ScoreSheet::new(vec!["A".into()]);
        assert!(matches!(
            sheet.labels("catalog", &OUTCOMES),
            Err(PpemError::MissingColumn(_))
        ));
    }
}
