use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a cell value in a sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl CellValue {
    /// Check if the value is null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Check if the value is a number (int or float)
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Int(_) | CellValue::Float(_))
    }

    /// Canonical string cast used whenever a table leaves the process as text.
    ///
    /// `Null` becomes the empty string and floats use the shortest decimal that
    /// round-trips, so `2.0` renders as `"2"`.
    #[must_use]
    pub fn as_str(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::String(s) => s.clone(),
        }
    }

    /// String-cast the cell, keeping `Null` as `Null`.
    #[must_use]
    pub fn to_string_cell(&self) -> CellValue {
        match self {
            CellValue::Null => CellValue::Null,
            CellValue::String(s) => CellValue::String(s.clone()),
            other => CellValue::String(other.as_str()),
        }
    }

    /// Wrap raw text read from a remote source: empty text is `Null`,
    /// anything else is kept verbatim as a string.
    #[must_use]
    pub fn text(s: &str) -> CellValue {
        if s.is_empty() {
            CellValue::Null
        } else {
            CellValue::String(s.to_string())
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Null
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, ""),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(fl) => write!(f, "{fl}"),
            CellValue::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str() {
        assert_eq!(CellValue::Null.as_str(), "");
        assert_eq!(CellValue::Bool(true).as_str(), "true");
        assert_eq!(CellValue::Int(-7).as_str(), "-7");
        assert_eq!(CellValue::Float(2.0).as_str(), "2");
        assert_eq!(CellValue::Float(2.5).as_str(), "2.5");
        assert_eq!(CellValue::from("x").as_str(), "x");
    }

    #[test]
    fn test_to_string_cell_keeps_null() {
        assert_eq!(CellValue::Null.to_string_cell(), CellValue::Null);
        assert_eq!(
            CellValue::Int(42).to_string_cell(),
            CellValue::String("42".to_string())
        );
    }

    #[test]
    fn test_text() {
        assert_eq!(CellValue::text(""), CellValue::Null);
        assert_eq!(CellValue::text(" "), CellValue::String(" ".to_string()));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(CellValue::from(None::<i64>), CellValue::Null);
        assert_eq!(CellValue::from(Some(7_i64)), CellValue::Int(7));
    }
}
