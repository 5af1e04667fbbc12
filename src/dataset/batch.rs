//! Columnar grouping of records.

use crate::dataset::record::Record;
use crate::error::{PhonorateError, Result};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Structure-of-arrays view of N records.
///
/// Every column holds exactly `len` cells. Records that lack a column
/// contribute `null` at their position; those cells are left out again when
/// the batch is turned back into records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    columns: BTreeMap<String, Vec<Value>>,
    /// Cells null-filled by [`Batch::from_records`], as (column, row).
    filled: BTreeSet<(String, usize)>,
    len: usize,
}

impl Batch {
    /// Transpose rows into columns, preserving row order.
    pub fn from_records(records: Vec<Record>) -> Self {
        let len = records.len();
        let mut columns: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        let mut present: BTreeSet<(String, usize)> = BTreeSet::new();

        for (row, record) in records.into_iter().enumerate() {
            for (name, value) in record.into_map() {
                present.insert((name.clone(), row));
                let cells = columns
                    .entry(name)
                    .or_insert_with(|| vec![Value::Null; len]);
                cells[row] = value;
            }
        }

        let filled = columns
            .keys()
            .flat_map(|name| (0..len).map(move |row| (name.clone(), row)))
            .filter(|cell| !present.contains(cell))
            .collect();

        Self {
            columns,
            filled,
            len,
        }
    }

    /// Build from explicit columns. All columns must have the same length.
    pub fn from_columns(columns: BTreeMap<String, Vec<Value>>) -> Result<Self> {
        let len = columns.values().next().map_or(0, Vec::len);
        for (name, cells) in &columns {
            if cells.len() != len {
                return Err(PhonorateError::ColumnLengthMismatch {
                    column: name.clone(),
                    expected: len,
                    actual: cells.len(),
                });
            }
        }
        Ok(Self {
            columns,
            filled: BTreeSet::new(),
            len,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Non-null cell at `row`, or `None` when the column is absent or the cell is null.
    pub fn cell(&self, name: &str, row: usize) -> Option<&Value> {
        self.columns
            .get(name)
            .and_then(|cells| cells.get(row))
            .filter(|v| !v.is_null())
    }

    /// Assign (or replace) a whole column. Every cell of it counts as present.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.len {
            return Err(PhonorateError::ColumnLengthMismatch {
                column: name.to_string(),
                expected: self.len,
                actual: values.len(),
            });
        }
        self.filled.retain(|(column, _)| column != name);
        self.columns.insert(name.to_string(), values);
        Ok(())
    }

    fn is_filled(&self, name: &str, row: usize) -> bool {
        self.filled.contains(&(name.to_string(), row))
    }

    /// Materialize one row.
    pub fn row(&self, row: usize) -> Option<Record> {
        if row >= self.len {
            return None;
        }
        let map: Map<String, Value> = self
            .columns
            .iter()
            .filter(|(name, _)| !self.is_filled(name, row))
            .map(|(name, cells)| (name.clone(), cells[row].clone()))
            .collect();
        Some(Record::from(map))
    }

    /// Transpose back into rows, preserving row order.
    pub fn into_records(self) -> Vec<Record> {
        let mut rows: Vec<Map<String, Value>> = (0..self.len).map(|_| Map::new()).collect();
        for (name, cells) in self.columns {
            for (row, value) in cells.into_iter().enumerate() {
                if !self.filled.contains(&(name.clone(), row)) {
                    rows[row].insert(name.clone(), value);
                }
            }
        }
        rows.into_iter().map(Record::from).collect()
    }
}
