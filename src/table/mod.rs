//! Dynamically typed table model.
//!
//! Aggregators return strongly typed rows; golden-file checks need something
//! looser: values whose shape is only known at runtime (a fixture entry may be
//! a scalar, a column, a whole table, or the raw dataset). This module is that
//! common currency:
//!
//! - `Scalar`: one typed cell
//! - `Column`: a named, indexed, homogeneously typed vector
//! - `Table`: ordered, equal-length columns sharing one row index
//! - `Datum`: any of the above (plus a raw dataset), as stored in fixtures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Record;
use crate::error::AppError;

pub mod float_repr;

/// One typed cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Scalar {
    Float(#[serde(with = "float_repr")] f64),
    Int(i64),
    Str(String),
    Date(NaiveDate),
}

/// Column values; the variant is the column's declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum ColumnData {
    Float(#[serde(with = "float_repr::vec")] Vec<f64>),
    Int(Vec<i64>),
    Str(Vec<String>),
    Date(Vec<NaiveDate>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Float(v) => v.len(),
            ColumnData::Int(v) => v.len(),
            ColumnData::Str(v) => v.len(),
            ColumnData::Date(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnData::Float(_) => "float",
            ColumnData::Int(_) => "int",
            ColumnData::Str(_) => "str",
            ColumnData::Date(_) => "date",
        }
    }

    pub fn get(&self, pos: usize) -> Option<Scalar> {
        match self {
            ColumnData::Float(v) => v.get(pos).map(|&x| Scalar::Float(x)),
            ColumnData::Int(v) => v.get(pos).map(|&x| Scalar::Int(x)),
            ColumnData::Str(v) => v.get(pos).map(|x| Scalar::Str(x.clone())),
            ColumnData::Date(v) => v.get(pos).map(|&x| Scalar::Date(x)),
        }
    }
}

/// A named column with its own row index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub index: Vec<i64>,
    pub data: ColumnData,
}

impl Column {
    /// Build a column indexed `0..len`.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        let index = range_index(data.len());
        Self {
            name: name.into(),
            index,
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Ordered collection of equal-length named columns sharing a row index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct Table {
    index: Vec<i64>,
    columns: Vec<Column>,
}

/// Unchecked table as it appears on disk; goes through `Table::new`.
#[derive(Deserialize)]
struct RawTable {
    index: Vec<i64>,
    columns: Vec<Column>,
}

impl TryFrom<RawTable> for Table {
    type Error = AppError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        Table::new(raw.index, raw.columns)
    }
}

impl Table {
    /// Build a table indexed `0..n` from `(name, data)` pairs.
    pub fn from_columns<N: Into<String>>(columns: Vec<(N, ColumnData)>) -> Result<Self, AppError> {
        let n_rows = columns.first().map(|(_, data)| data.len()).unwrap_or(0);
        let index = range_index(n_rows);
        let columns = columns
            .into_iter()
            .map(|(name, data)| Column {
                name: name.into(),
                index: index.clone(),
                data,
            })
            .collect();
        Self::new(index, columns)
    }

    /// Build a table from an explicit index and columns.
    ///
    /// Every column must match the index length and carry the same index;
    /// column names must be unique.
    pub fn new(index: Vec<i64>, columns: Vec<Column>) -> Result<Self, AppError> {
        for (pos, col) in columns.iter().enumerate() {
            if col.len() != index.len() {
                return Err(AppError::new(
                    3,
                    format!(
                        "Column '{}' has {} values but the table has {} rows.",
                        col.name,
                        col.len(),
                        index.len()
                    ),
                ));
            }
            if col.index != index {
                return Err(AppError::new(
                    3,
                    format!("Column '{}' index differs from the table index.", col.name),
                ));
            }
            if columns[..pos].iter().any(|c| c.name == col.name) {
                return Err(AppError::new(3, format!("Duplicate column name '{}'.", col.name)));
            }
        }
        Ok(Self { index, columns })
    }

    /// Empty table with the given column names and types.
    pub fn empty(schema: &[(&str, ColumnData)]) -> Self {
        let columns = schema
            .iter()
            .map(|(name, data)| Column {
                name: (*name).to_string(),
                index: Vec::new(),
                data: empty_like(data),
            })
            .collect();
        Self {
            index: Vec::new(),
            columns,
        }
    }

    pub fn index(&self) -> &[i64] {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.index.len(), self.columns.len())
    }
}

/// Anything a fixture store can hold or a comparator can be handed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Datum {
    Scalar(Scalar),
    Column(Column),
    Table(Table),
    Dataset(Vec<Record>),
}

impl Datum {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Datum::Scalar(_) => "scalar",
            Datum::Column(_) => "column",
            Datum::Table(_) => "table",
            Datum::Dataset(_) => "dataset",
        }
    }
}

impl From<Scalar> for Datum {
    fn from(value: Scalar) -> Self {
        Datum::Scalar(value)
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Datum::Scalar(Scalar::Float(value))
    }
}

impl From<Column> for Datum {
    fn from(value: Column) -> Self {
        Datum::Column(value)
    }
}

impl From<Table> for Datum {
    fn from(value: Table) -> Self {
        Datum::Table(value)
    }
}

impl From<Vec<Record>> for Datum {
    fn from(value: Vec<Record>) -> Self {
        Datum::Dataset(value)
    }
}

fn range_index(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn empty_like(data: &ColumnData) -> ColumnData {
    match data {
        ColumnData::Float(_) => ColumnData::Float(Vec::new()),
        ColumnData::Int(_) => ColumnData::Int(Vec::new()),
        ColumnData::Str(_) => ColumnData::Str(Vec::new()),
        ColumnData::Date(_) => ColumnData::Date(Vec::new()),
    }
}
