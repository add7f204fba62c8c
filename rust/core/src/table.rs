// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Attribute tables and the [`Data`] shape accepted by proration.

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::id::Id;
use crate::series::Series;

/// Values of one table column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Text(Vec<String>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Int(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the values as floats, or `None` for a non-numeric column.
    pub fn as_f64(&self) -> Option<Vec<f64>> {
        match self {
            ColumnValues::Float(v) => Some(v.clone()),
            ColumnValues::Int(v) => Some(v.iter().map(|&x| x as f64).collect()),
            ColumnValues::Text(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, ColumnValues::Text(_))
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn float(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Float(values),
        }
    }

    pub fn int(name: impl Into<String>, values: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Int(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Text(values),
        }
    }
}

/// A row-indexed table of named columns.
#[derive(Debug, Clone)]
pub struct Table<I> {
    index: Vec<I>,
    columns: Vec<Column>,
}

impl<I: Id> Table<I> {
    /// Creates a table with the given row index and no columns.
    pub fn new(index: Vec<I>) -> Result<Self> {
        let mut seen = FxHashMap::default();
        for (pos, key) in index.iter().enumerate() {
            if seen.insert(key, pos).is_some() {
                return Err(Error::DuplicateId(format!("{key:?}")));
            }
        }
        Ok(Self {
            index,
            columns: Vec::new(),
        })
    }

    /// Adds a column. Its length must match the row index.
    pub fn with_column(mut self, column: Column) -> Result<Self> {
        if column.values.len() != self.index.len() {
            return Err(Error::UnsupportedDataShape(format!(
                "column '{}' has {} values for {} rows",
                column.name,
                column.values.len(),
                self.index.len()
            )));
        }
        self.columns.push(column);
        Ok(self)
    }

    pub fn index(&self) -> &[I] {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    /// Returns one numeric column as a series, or `None` if the column is
    /// missing or not numeric.
    pub fn numeric_series(&self, name: &str) -> Option<Series<I>> {
        let values = self.column(name)?.values.as_f64()?;
        Some(self.index.iter().cloned().zip(values).collect())
    }

    /// Assembles a float table from named series sharing one row index.
    pub fn from_series(index: Vec<I>, columns: Vec<(String, Series<I>)>) -> Result<Self> {
        let mut table = Self::new(index)?;
        for (name, series) in columns {
            let values = table
                .index
                .iter()
                .map(|key| series.get(key).copied().unwrap_or(f64::NAN))
                .collect();
            table.columns.push(Column::float(name, values));
        }
        Ok(table)
    }
}

/// Attribute data handed to proration: a single numeric series or a table
/// of numeric columns.
#[derive(Debug, Clone)]
pub enum Data<I> {
    Series(Series<I>),
    Table(Table<I>),
}

impl<I: Id> Data<I> {
    /// Splits the data into named numeric columns.
    ///
    /// Fails with [`Error::UnsupportedDataShape`] when a table column is not
    /// numeric. A bare series yields one unnamed column.
    pub fn numeric_columns(&self) -> Result<Vec<(String, Series<I>)>> {
        match self {
            Data::Series(series) => Ok(vec![(String::new(), series.clone())]),
            Data::Table(table) => table
                .columns
                .iter()
                .map(|column| {
                    let values = column.values.as_f64().ok_or_else(|| {
                        Error::UnsupportedDataShape(format!(
                            "column '{}' is not numeric",
                            column.name
                        ))
                    })?;
                    Ok((
                        column.name.clone(),
                        table.index.iter().cloned().zip(values).collect(),
                    ))
                })
                .collect(),
        }
    }

    /// Returns the series, if this is series data.
    pub fn as_series(&self) -> Option<&Series<I>> {
        match self {
            Data::Series(series) => Some(series),
            Data::Table(_) => None,
        }
    }

    /// Returns the table, if this is table data.
    pub fn as_table(&self) -> Option<&Table<I>> {
        match self {
            Data::Table(table) => Some(table),
            Data::Series(_) => None,
        }
    }
}

impl<I: Id> From<Series<I>> for Data<I> {
    fn from(series: Series<I>) -> Self {
        Data::Series(series)
    }
}

impl<I: Id> From<Table<I>> for Data<I> {
    fn from(table: Table<I>) -> Self {
        Data::Table(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_columns_are_numeric() {
        let table = Table::new(vec!["a", "b"])
            .unwrap()
            .with_column(Column::int("pop", vec![10, 20]))
            .unwrap();
        let pop = table.numeric_series("pop").unwrap();
        assert_eq!(pop.get(&"b"), Some(&20.0));
    }

    #[test]
    fn test_text_column_is_unsupported() {
        let table = Table::new(vec![1u32])
            .unwrap()
            .with_column(Column::text("name", vec!["x".to_string()]))
            .unwrap();
        let err = Data::from(table).numeric_columns().unwrap_err();
        assert!(matches!(err, Error::UnsupportedDataShape(_)));
    }

    #[test]
    fn test_column_length_must_match() {
        let err = Table::new(vec![1u32, 2])
            .unwrap()
            .with_column(Column::float("x", vec![1.0]))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedDataShape(_)));
    }

    #[test]
    fn test_duplicate_rows_rejected() {
        assert!(matches!(
            Table::new(vec![1u32, 1]).unwrap_err(),
            Error::DuplicateId(_)
        ));
    }
}
