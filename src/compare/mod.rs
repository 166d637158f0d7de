//! Tolerant structural comparison for golden-file checks.
//!
//! Exact equality is unsafe for rolling means: sums of integers divided by a
//! window length can differ in the last bit between platforms. These checks
//! treat floats as equal within an absolute tolerance and treat NaN as equal
//! to NaN.
//!
//! Every entry point returns a three-valued `Comparison`. `Incomparable`
//! means the arguments were not of the expected kind (e.g. a column handed to
//! the table check), which is different from "compared and found different".

use crate::table::{Column, ColumnData, Datum, Scalar, Table};

/// Default absolute tolerance for scalar float checks.
pub const SCALAR_ATOL: f64 = 1e-5;

/// Default absolute tolerance for float columns (and tables).
pub const COLUMN_ATOL: f64 = 1e-6;

/// Outcome of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    /// At least one argument is not of the kind this check handles.
    Incomparable,
}

impl Comparison {
    pub fn is_equal(self) -> bool {
        self == Comparison::Equal
    }

    fn from_bool(equal: bool) -> Self {
        if equal {
            Comparison::Equal
        } else {
            Comparison::NotEqual
        }
    }
}

/// How two infinities are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfinityMatch {
    /// Any two infinities are equal, including `+inf` vs `-inf`.
    ///
    /// This is what existing golden fixtures were produced against. It is
    /// almost certainly looser than intended; prefer `SameSign` for new checks.
    AnySign,
    /// Infinities are equal only when their signs agree.
    SameSign,
}

/// Float matching rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatPolicy {
    pub atol: f64,
    pub infinities: InfinityMatch,
}

impl FloatPolicy {
    pub fn legacy(atol: f64) -> Self {
        Self {
            atol,
            infinities: InfinityMatch::AnySign,
        }
    }

    pub fn strict(atol: f64) -> Self {
        Self {
            atol,
            infinities: InfinityMatch::SameSign,
        }
    }

    /// Whether `expected` and `actual` match under this policy.
    pub fn floats_match(&self, expected: f64, actual: f64) -> bool {
        if expected.is_nan() && actual.is_nan() {
            return true;
        }
        if expected.is_infinite() && actual.is_infinite() {
            return match self.infinities {
                InfinityMatch::AnySign => true,
                InfinityMatch::SameSign => expected.signum() == actual.signum(),
            };
        }
        // NaN or a lone infinity on either side fails here.
        (expected - actual).abs() <= self.atol
    }
}

impl Default for FloatPolicy {
    fn default() -> Self {
        Self::legacy(COLUMN_ATOL)
    }
}

/// Compare two float scalars with the legacy infinity rule.
pub fn compare_float(expected: &Datum, actual: &Datum, atol: f64) -> Comparison {
    compare_float_with(expected, actual, &FloatPolicy::legacy(atol))
}

pub fn compare_float_with(expected: &Datum, actual: &Datum, policy: &FloatPolicy) -> Comparison {
    match (expected, actual) {
        (Datum::Scalar(Scalar::Float(e)), Datum::Scalar(Scalar::Float(a))) => {
            Comparison::from_bool(policy.floats_match(*e, *a))
        }
        _ => Comparison::Incomparable,
    }
}

/// Compare two columns: name, length, index, declared type, then values.
pub fn compare_column(expected: &Datum, actual: &Datum, atol: f64) -> Comparison {
    compare_column_with(expected, actual, &FloatPolicy::legacy(atol))
}

pub fn compare_column_with(expected: &Datum, actual: &Datum, policy: &FloatPolicy) -> Comparison {
    match (expected, actual) {
        (Datum::Column(e), Datum::Column(a)) => Comparison::from_bool(column_diff(e, a, policy).is_ok()),
        _ => Comparison::Incomparable,
    }
}

/// Compare two tables: shape, column names, index, then every column.
pub fn compare_table(expected: &Datum, actual: &Datum) -> Comparison {
    compare_table_with(expected, actual, &FloatPolicy::default())
}

pub fn compare_table_with(expected: &Datum, actual: &Datum, policy: &FloatPolicy) -> Comparison {
    match (expected, actual) {
        (Datum::Table(e), Datum::Table(a)) => Comparison::from_bool(table_diff(e, a, policy).is_ok()),
        _ => Comparison::Incomparable,
    }
}

/// Describe the first difference between two tables, or `None` if they match.
pub fn explain_table_mismatch(expected: &Table, actual: &Table, policy: &FloatPolicy) -> Option<String> {
    table_diff(expected, actual, policy).err()
}

fn table_diff(expected: &Table, actual: &Table, policy: &FloatPolicy) -> Result<(), String> {
    if expected.shape() != actual.shape() {
        return Err(format!(
            "shape mismatch: expected={:?}, actual={:?}",
            expected.shape(),
            actual.shape()
        ));
    }

    let expected_names = expected.column_names();
    let actual_names = actual.column_names();
    if expected_names != actual_names {
        return Err(format!(
            "column mismatch: expected={expected_names:?}, actual={actual_names:?}"
        ));
    }

    if expected.index() != actual.index() {
        return Err(format!(
            "index mismatch: expected={:?}, actual={:?}",
            expected.index(),
            actual.index()
        ));
    }

    for (e, a) in expected.columns().iter().zip(actual.columns()) {
        column_diff(e, a, policy).map_err(|msg| format!("column '{}': {msg}", e.name))?;
    }
    Ok(())
}

fn column_diff(expected: &Column, actual: &Column, policy: &FloatPolicy) -> Result<(), String> {
    if expected.len() != actual.len() {
        return Err(format!(
            "length mismatch: expected={}, actual={}",
            expected.len(),
            actual.len()
        ));
    }
    if expected.name != actual.name {
        return Err(format!(
            "name mismatch: expected={:?}, actual={:?}",
            expected.name, actual.name
        ));
    }
    if expected.index != actual.index {
        return Err(format!(
            "index mismatch: expected={:?}, actual={:?}",
            expected.index, actual.index
        ));
    }

    match (&expected.data, &actual.data) {
        (ColumnData::Float(e), ColumnData::Float(a)) => {
            match e.iter().zip(a).position(|(&x, &y)| !policy.floats_match(x, y)) {
                Some(pos) => Err(format!(
                    "value mismatch at idx={pos}: expected={}, actual={}",
                    e[pos], a[pos]
                )),
                None => Ok(()),
            }
        }
        (e, a) if e.type_name() != a.type_name() => Err(format!(
            "type mismatch: expected={}, actual={}",
            e.type_name(),
            a.type_name()
        )),
        (e, a) => match (0..e.len()).find(|&pos| e.get(pos) != a.get(pos)) {
            Some(pos) => Err(format!(
                "value mismatch at idx={pos}: expected={:?}, actual={:?}",
                e.get(pos),
                a.get(pos)
            )),
            None => Ok(()),
        },
    }
}
