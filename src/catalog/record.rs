//! Parameter records and their row form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::{CatalogError, CatalogResult};

/// Primitive type of a namelist parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    Bool,
    Str,
    Int,
    Float,
}

impl Dtype {
    pub fn tag(self) -> &'static str {
        match self {
            Dtype::Bool => "bool",
            Dtype::Str => "str",
            Dtype::Int => "int",
            Dtype::Float => "float",
        }
    }

    /// Placeholder default used until the defaults file provides a real one
    pub fn bare_default(self) -> ParamValue {
        match self {
            Dtype::Bool => ParamValue::Bool(false),
            Dtype::Str => ParamValue::Str(String::new()),
            Dtype::Int => ParamValue::Int(0),
            Dtype::Float => ParamValue::Float(0.0),
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Dtype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bool" => Ok(Dtype::Bool),
            "str" => Ok(Dtype::Str),
            "int" => Ok(Dtype::Int),
            "float" => Ok(Dtype::Float),
            other => Err(format!("unknown dtype tag '{}'", other)),
        }
    }
}

/// A typed default value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Str(String),
    Int(i64),
    Float(f64),
}

impl ParamValue {
    pub fn dtype(&self) -> Dtype {
        match self {
            ParamValue::Bool(_) => Dtype::Bool,
            ParamValue::Str(_) => Dtype::Str,
            ParamValue::Int(_) => Dtype::Int,
            ParamValue::Float(_) => Dtype::Float,
        }
    }

    /// Text stored in the catalog; parses back with [`ParamValue::parse_tagged`]
    pub fn to_default_string(&self) -> String {
        match self {
            ParamValue::Bool(true) => "True".to_string(),
            ParamValue::Bool(false) => "False".to_string(),
            ParamValue::Str(s) => s.clone(),
            ParamValue::Int(i) => i.to_string(),
            // Debug keeps the fractional part and round-trips exactly
            ParamValue::Float(x) => format!("{:?}", x),
        }
    }

    /// Casts catalog text back into a value of the given type
    pub fn parse_tagged(dtype: Dtype, text: &str) -> Result<Self, String> {
        match dtype {
            Dtype::Bool => match text.to_lowercase().as_str() {
                "true" => Ok(ParamValue::Bool(true)),
                "false" => Ok(ParamValue::Bool(false)),
                _ => Err(format!("'{}' is not a boolean", text)),
            },
            Dtype::Str => Ok(ParamValue::Str(text.to_string())),
            Dtype::Int => text
                .parse::<i64>()
                .map(ParamValue::Int)
                .map_err(|e| format!("'{}' is not an integer: {}", text, e)),
            Dtype::Float => text
                .parse::<f64>()
                .map(ParamValue::Float)
                .map_err(|e| format!("'{}' is not a float: {}", text, e)),
        }
    }

    /// Fortran literal spelling, as it would appear in an inlist
    pub fn to_fortran(&self) -> String {
        match self {
            ParamValue::Bool(true) => ".true.".to_string(),
            ParamValue::Bool(false) => ".false.".to_string(),
            ParamValue::Str(s) if s.is_empty() => "''".to_string(),
            ParamValue::Str(s) => s.clone(),
            ParamValue::Int(i) => i.to_string(),
            ParamValue::Float(x) => {
                let text = format!("{:?}", x);
                if text.contains('e') {
                    text.replace('e', "d")
                } else if x.is_finite() {
                    format!("{}d0", text)
                } else {
                    text
                }
            }
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_default_string())
    }
}

/// One configuration parameter of a namelist group
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRecord {
    name: String,
    lower_name: String,
    pub default: ParamValue,
    pub dim: usize,
    pub order: i64,
    pub group: String,
    pub doc: String,
}

/// Order of a parameter that never received a default
pub const UNORDERED: i64 = -1;

impl ParameterRecord {
    pub fn new(
        name: impl Into<String>,
        default: ParamValue,
        dim: usize,
        order: i64,
        group: impl Into<String>,
        doc: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let lower_name = name.to_lowercase();
        Self {
            name,
            lower_name,
            default,
            dim,
            order,
            group: group.into(),
            doc: doc.into(),
        }
    }

    /// Record as produced by a declaration: bare default, no order, no doc
    pub fn declared(name: impl Into<String>, dtype: Dtype, dim: usize, group: impl Into<String>) -> Self {
        Self::new(name, dtype.bare_default(), dim, UNORDERED, group, String::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lower_name(&self) -> &str {
        &self.lower_name
    }

    pub fn dtype(&self) -> Dtype {
        self.default.dtype()
    }

    pub fn has_default(&self) -> bool {
        self.order != UNORDERED
    }

    pub fn to_row(&self) -> CatalogRow {
        CatalogRow {
            name: self.name.clone(),
            lower_name: self.lower_name.clone(),
            dtype: self.dtype().tag().to_string(),
            default: self.default.to_default_string(),
            dim: self.dim,
            order: self.order,
            group: self.group.clone(),
            doc: self.doc.clone(),
        }
    }

    /// Rebuilds a record from its row, re-casting the default by its tag
    pub fn from_row(row: CatalogRow) -> CatalogResult<Self> {
        let invalid = |reason: String| CatalogError::InvalidRow {
            name: row.name.clone(),
            reason,
        };
        let dtype = Dtype::from_str(&row.dtype).map_err(invalid)?;
        let default = ParamValue::parse_tagged(dtype, &row.default).map_err(invalid)?;
        Ok(Self::new(row.name, default, row.dim, row.order, row.group, row.doc))
    }

    pub fn to_dict(&self) -> RecordDict {
        RecordDict {
            name: self.name.clone(),
            lower_name: self.lower_name.clone(),
            dtype: self.dtype(),
            default: self.default.clone(),
            dim: self.dim,
            order: self.order,
            namelist: self.group.clone(),
            doc: self.doc.clone(),
        }
    }
}

impl Serialize for ParameterRecord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_dict().serialize(serializer)
    }
}

/// Keyed form of a record for JSON output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDict {
    pub name: String,
    pub lower_name: String,
    pub dtype: Dtype,
    pub default: ParamValue,
    pub dim: usize,
    pub order: i64,
    pub namelist: String,
    pub doc: String,
}

/// Positional form handed to the catalog store
pub type RowTuple = (String, String, String, String, usize, i64, String, String);

/// Flat catalog row: `(name, lower_name, dtype_tag, default, dim, order, group, doc)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub name: String,
    pub lower_name: String,
    pub dtype: String,
    pub default: String,
    pub dim: usize,
    pub order: i64,
    pub group: String,
    pub doc: String,
}

impl From<CatalogRow> for RowTuple {
    fn from(row: CatalogRow) -> Self {
        (
            row.name,
            row.lower_name,
            row.dtype,
            row.default,
            row.dim,
            row.order,
            row.group,
            row.doc,
        )
    }
}

impl From<RowTuple> for CatalogRow {
    fn from(t: RowTuple) -> Self {
        CatalogRow {
            name: t.0,
            lower_name: t.1,
            dtype: t.2,
            default: t.3,
            dim: t.4,
            order: t.5,
            group: t.6,
            doc: t.7,
        }
    }
}
