use crate::error::{Error, Result};

use serde_derive::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display};

/// A datatype
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    Float,
    String,
}

impl DataType {
    /// Returns true for the numeric types, which compare with each other.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    /// Returns true if values of the two types can be compared.
    pub fn comparable(&self, other: &DataType) -> bool {
        self == other || (self.is_numeric() && other.is_numeric())
    }

    /// The fixed byte length of the type, if it has one.
    pub fn fixed_length(&self) -> Option<usize> {
        match self {
            Self::Integer | Self::Float => Some(4),
            Self::String => None,
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Integer => "INTEGER",
            Self::Float => "FLOAT",
            Self::String => "STRING",
        })
    }
}

/// A specific value of a data type
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Value {
    Integer(i32),
    Float(f32),
    String(String),
}

impl Value {
    /// Returns the value's datatype
    pub fn datatype(&self) -> DataType {
        match self {
            Self::Integer(_) => DataType::Integer,
            Self::Float(_) => DataType::Float,
            Self::String(_) => DataType::String,
        }
    }

    /// Compares two values. Integers and floats compare numerically, strings
    /// lexicographically; any other pairing is an error.
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Ok(a.cmp(b)),
            (Self::Integer(a), Self::Float(b)) => Ok((*a as f64).total_cmp(&(*b as f64))),
            (Self::Float(a), Self::Integer(b)) => Ok((*a as f64).total_cmp(&(*b as f64))),
            (Self::Float(a), Self::Float(b)) => Ok(a.total_cmp(b)),
            (Self::String(a), Self::String(b)) => Ok(a.cmp(b)),
            (a, b) => Err(Error::Value(format!(
                "Can't compare {} and {}",
                a.datatype(),
                b.datatype()
            ))),
        }
    }

    /// Encodes the value as a hash index search key.
    pub fn search_key(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        matches!(self.compare(other), Ok(Ordering::Equal))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}
