//! Longitudinal dataset storage.
//!
//! A [`Dataset`] holds one record per (subject, visit) measurement. Subject and
//! visit identities are categorical labels; they are interned to dense codes in
//! first-appearance order so grouping never has to compare strings. All numeric
//! columns (features and covariates alike) live in a single row-major
//! `Array2<f64>`, with `NaN` marking a missing value.

use crate::error::{IoiError, IoiResult};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Columnar table of longitudinal measurements.
#[derive(Debug, Clone)]
pub struct Dataset {
    subject_codes: Vec<usize>,
    subject_labels: Vec<String>,
    visit_codes: Vec<usize>,
    visit_labels: Vec<String>,
    column_names: Vec<String>,
    values: Array2<f64>,
}

impl Dataset {
    /// Starts building a dataset column by column.
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::default()
    }

    pub fn n_rows(&self) -> usize {
        self.subject_codes.len()
    }

    /// Number of distinct subjects across all rows.
    pub fn n_subjects(&self) -> usize {
        self.subject_labels.len()
    }

    /// Number of distinct visits across all rows.
    pub fn n_visits(&self) -> usize {
        self.visit_labels.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// The numeric block, one column per entry of [`Dataset::column_names`].
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c == name)
    }

    /// Resolves a list of column names, failing on the first unknown one.
    pub fn column_indices<I>(&self, names: I) -> IoiResult<Vec<usize>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                self.column_index(name)
                    .ok_or_else(|| IoiError::UnknownColumn(name.to_string()))
            })
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.column_index(name).map(|j| self.values.column(j))
    }

    pub fn subject_id(&self, row: usize) -> &str {
        &self.subject_labels[self.subject_codes[row]]
    }

    pub fn visit_number(&self, row: usize) -> &str {
        &self.visit_labels[self.visit_codes[row]]
    }

    pub(crate) fn subject_code(&self, row: usize) -> usize {
        self.subject_codes[row]
    }

    pub(crate) fn visit_code(&self, row: usize) -> usize {
        self.visit_codes[row]
    }

    /// Borrowed view of a single record.
    pub fn row(&self, row: usize) -> Row<'_> {
        Row { data: self, row }
    }

    /// View over every row.
    pub fn all(&self) -> Subset<'_> {
        Subset {
            data: self,
            rows: (0..self.n_rows()).collect(),
        }
    }

    /// View over the given rows.
    pub fn subset(&self, rows: Vec<usize>) -> Subset<'_> {
        Subset { data: self, rows }
    }

    /// Copies the given rows into a standalone dataset.
    ///
    /// Subject and visit codes are re-interned, so the result only knows
    /// about the identities that appear in `rows`.
    pub fn select(&self, rows: &[usize]) -> Dataset {
        let (subject_codes, subject_labels) =
            intern(rows.iter().map(|&r| self.subject_id(r).to_string()).collect());
        let (visit_codes, visit_labels) =
            intern(rows.iter().map(|&r| self.visit_number(r).to_string()).collect());
        Dataset {
            subject_codes,
            subject_labels,
            visit_codes,
            visit_labels,
            column_names: self.column_names.clone(),
            values: self.values.select(Axis(0), rows),
        }
    }
}

/// Incremental constructor for [`Dataset`].
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    subject_ids: Option<Vec<String>>,
    visit_numbers: Option<Vec<String>>,
    columns: Vec<(String, Array1<f64>)>,
}

impl DatasetBuilder {
    pub fn subject_ids<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.subject_ids = Some(ids.into_iter().map(|id| id.to_string()).collect());
        self
    }

    pub fn visit_numbers<I, T>(mut self, visits: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.visit_numbers = Some(visits.into_iter().map(|v| v.to_string()).collect());
        self
    }

    /// Adds a numeric column. Use `f64::NAN` for missing values.
    pub fn column(mut self, name: impl Into<String>, values: impl Into<Array1<f64>>) -> Self {
        self.columns.push((name.into(), values.into()));
        self
    }

    pub fn build(self) -> IoiResult<Dataset> {
        let subject_ids = self
            .subject_ids
            .ok_or_else(|| IoiError::Configuration("dataset has no subject_id column".into()))?;
        let visit_numbers = self
            .visit_numbers
            .ok_or_else(|| IoiError::Configuration("dataset has no visit_number column".into()))?;

        let n_rows = subject_ids.len();
        if visit_numbers.len() != n_rows {
            return Err(IoiError::LengthMismatch {
                column: "visit_number".into(),
                expected: n_rows,
                found: visit_numbers.len(),
            });
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for (name, values) in &self.columns {
            if name == "subject_id" || name == "visit_number" || !seen.insert(name) {
                return Err(IoiError::DuplicateColumn(name.clone()));
            }
            if values.len() != n_rows {
                return Err(IoiError::LengthMismatch {
                    column: name.clone(),
                    expected: n_rows,
                    found: values.len(),
                });
            }
        }

        let (subject_codes, subject_labels) = intern(subject_ids);
        let (visit_codes, visit_labels) = intern(visit_numbers);

        let mut values = Array2::from_elem((n_rows, self.columns.len()), f64::NAN);
        let mut column_names = Vec::with_capacity(self.columns.len());
        for (j, (name, column)) in self.columns.into_iter().enumerate() {
            values.column_mut(j).assign(&column);
            column_names.push(name);
        }

        Ok(Dataset {
            subject_codes,
            subject_labels,
            visit_codes,
            visit_labels,
            column_names,
            values,
        })
    }
}

/// Maps labels to dense codes in first-appearance order.
fn intern(labels: Vec<String>) -> (Vec<usize>, Vec<String>) {
    let mut lookup: HashMap<String, usize> = HashMap::new();
    let mut distinct = Vec::new();
    let codes = labels
        .into_iter()
        .map(|label| {
            if let Some(&code) = lookup.get(&label) {
                return code;
            }
            let code = distinct.len();
            distinct.push(label.clone());
            lookup.insert(label, code);
            code
        })
        .collect();
    (codes, distinct)
}

/// A set of rows of a [`Dataset`], borrowed rather than copied.
///
/// Row indices refer to the parent dataset, so subsets produced by splitting
/// can be checked for disjointness and completeness directly.
#[derive(Debug, Clone)]
pub struct Subset<'a> {
    data: &'a Dataset,
    rows: Vec<usize>,
}

impl<'a> Subset<'a> {
    pub fn data(&self) -> &'a Dataset {
        self.data
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<usize> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct subjects among the rows.
    pub fn unique_subjects(&self) -> usize {
        count_distinct(self.rows.iter().map(|&r| self.data.subject_code(r)), self.data.n_subjects())
    }

    pub(crate) fn value(&self, row: usize, column: usize) -> f64 {
        self.data.values[[row, column]]
    }

    /// Groups the rows by subject code, keyed in code order.
    pub(crate) fn group_by_subject(&self) -> BTreeMap<usize, Vec<usize>> {
        self.group_by(|r| self.data.subject_code(r))
    }

    /// Groups the rows by visit code, keyed in code order.
    pub(crate) fn group_by_visit(&self) -> BTreeMap<usize, Vec<usize>> {
        self.group_by(|r| self.data.visit_code(r))
    }

    fn group_by<F>(&self, key: F) -> BTreeMap<usize, Vec<usize>>
    where
        F: Fn(usize) -> usize,
    {
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for &row in &self.rows {
            groups.entry(key(row)).or_default().push(row);
        }
        groups
    }

    /// Materializes the rows into a standalone dataset.
    pub fn to_dataset(&self) -> Dataset {
        self.data.select(&self.rows)
    }
}

/// Counts distinct codes drawn from `0..n_codes`.
pub(crate) fn count_distinct<I>(codes: I, n_codes: usize) -> usize
where
    I: IntoIterator<Item = usize>,
{
    let mut seen = vec![false; n_codes];
    let mut count = 0;
    for code in codes {
        if !seen[code] {
            seen[code] = true;
            count += 1;
        }
    }
    count
}

/// Anything a record's covariate values can be read from.
///
/// `None` means the column is absent; routing treats it like a missing value.
pub trait Record {
    fn value(&self, column: &str) -> Option<f64>;
}

/// A single record of a [`Dataset`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    data: &'a Dataset,
    row: usize,
}

impl Row<'_> {
    pub fn index(&self) -> usize {
        self.row
    }

    pub fn subject_id(&self) -> &str {
        self.data.subject_id(self.row)
    }

    pub fn visit_number(&self) -> &str {
        self.data.visit_number(self.row)
    }
}

impl Record for Row<'_> {
    fn value(&self, column: &str) -> Option<f64> {
        self.data
            .column_index(column)
            .map(|j| self.data.values[[self.row, j]])
    }
}

impl Record for HashMap<String, f64> {
    fn value(&self, column: &str) -> Option<f64> {
        self.get(column).copied()
    }
}

impl Record for BTreeMap<String, f64> {
    fn value(&self, column: &str) -> Option<f64> {
        self.get(column).copied()
    }
}
