use super::types::{DataType, Value};
use crate::error::{Error, Result};

use lazy_static::lazy_static;
use regex::Regex;
use serde_derive::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{self, Display};

/// The catalog stores table schemas, index descriptors and per-table row
/// counts. Planning only ever reads it; inserts bump the row counts.
pub trait Catalog {
    /// Reads a table, if it exists
    fn read_table(&self, table: &str) -> Result<Option<Table>>;

    /// Lists the indexes defined on a table
    fn indexes(&self, table: &str) -> Result<Vec<IndexDesc>>;

    /// Returns the recorded number of rows in a table
    fn row_count(&self, table: &str) -> Result<u64>;

    /// Increments the recorded number of rows in a table by one
    fn increment_row_count(&mut self, table: &str) -> Result<()>;

    /// Reads a table, and errors if it does not exist
    fn must_read_table(&self, table: &str) -> Result<Table> {
        self.read_table(table)?
            .ok_or_else(|| Error::Value(format!("Table {} does not exist", table)))
    }
}

/// A table schema
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Table {
    pub name: String,
    pub schema: Schema,
}

impl Table {
    /// Creates a new table schema
    pub fn new(name: &str, fields: Vec<Field>) -> Result<Self> {
        let table = Self { name: name.to_owned(), schema: Schema::new(fields) };
        table.validate()?;
        Ok(table)
    }

    /// Validates the table schema
    pub fn validate(&self) -> Result<()> {
        if self.schema.fields.is_empty() {
            return Err(Error::Value(format!("Table {} has no columns", self.name)));
        }
        let mut names = HashSet::new();
        for field in &self.schema.fields {
            if !names.insert(field.name.as_str()) {
                return Err(Error::Value(format!(
                    "Duplicate column {} in table {}",
                    field.name, self.name
                )));
            }
            if field.length == 0 {
                return Err(Error::Value(format!("Column {} has zero length", field.name)));
            }
        }
        Ok(())
    }

    /// Validates a row
    pub fn validate_row(&self, row: &[Value]) -> Result<()> {
        if row.len() != self.schema.len() {
            return Err(Error::Value(format!(
                "Invalid row size {} for table {}, expected {}",
                row.len(),
                self.name,
                self.schema.len()
            )));
        }
        for (field, value) in self.schema.fields.iter().zip(row.iter()) {
            field.validate_value(value)?;
        }
        Ok(())
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CREATE TABLE {} (\n{}\n)",
            format_ident(&self.name),
            self.schema
                .fields
                .iter()
                .map(|c| format!("  {}", c))
                .collect::<Vec<String>>()
                .join(",\n")
        )
    }
}

/// An ordered list of fields. Field order is significant: joins concatenate
/// the outer schema with the inner one.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Concatenates two schemas, left fields first.
    pub fn join(left: &Schema, right: &Schema) -> Schema {
        Schema { fields: left.fields.iter().chain(right.fields.iter()).cloned().collect() }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fetches a field by position
    pub fn field(&self, index: usize) -> Result<&Field> {
        self.fields.get(index).ok_or_else(|| {
            Error::Value(format!("Field number {} out of range for {} fields", index, self.len()))
        })
    }

    /// Resolves a field name to its position. Joined schemas may repeat a
    /// name, in which case the leftmost field wins.
    pub fn field_number(&self, name: &str) -> Result<usize> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| Error::Value(format!("Column {} not found", name)))
    }

    /// Returns the field names, in order.
    pub fn names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({})",
            self.fields.iter().map(|c| c.to_string()).collect::<Vec<String>>().join(", ")
        )
    }
}

/// A table column schema
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Field {
    /// Column name
    pub name: String,
    /// Column datatype
    pub datatype: DataType,
    /// Length in bytes; the maximum length for strings
    pub length: usize,
}

impl Field {
    /// Creates a fixed-width field.
    pub fn new(name: &str, datatype: DataType) -> Self {
        Self { name: name.to_owned(), datatype, length: datatype.fixed_length().unwrap_or(32) }
    }

    /// Creates a string field of the given maximum length.
    pub fn string(name: &str, length: usize) -> Self {
        Self { name: name.to_owned(), datatype: DataType::String, length }
    }

    /// Validates a column value
    pub fn validate_value(&self, value: &Value) -> Result<()> {
        if value.datatype() != self.datatype {
            return Err(Error::Value(format!(
                "Invalid datatype {} for {} column {}",
                value.datatype(),
                self.datatype,
                self.name
            )));
        }
        match value {
            Value::String(s) if s.len() > self.length => Err(Error::Value(format!(
                "String of {} bytes too long for column {} of length {}",
                s.len(),
                self.name,
                self.length
            ))),
            _ => Ok(()),
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.datatype {
            DataType::String => {
                write!(f, "{} {}({})", format_ident(&self.name), self.datatype, self.length)
            }
            _ => write!(f, "{} {}", format_ident(&self.name), self.datatype),
        }
    }
}

/// An index descriptor: a named hash index over one column of a table.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct IndexDesc {
    pub name: String,
    pub table: String,
    pub column: String,
}

impl Display for IndexDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CREATE INDEX {} ON {} ({})",
            format_ident(&self.name),
            format_ident(&self.table),
            format_ident(&self.column)
        )
    }
}

lazy_static! {
    static ref RE_IDENT: Regex = Regex::new(r"^\w[\w_]*$").unwrap();
}

/// Formats an identifier, quoting it if it isn't a plain word.
pub fn format_ident(ident: &str) -> String {
    if RE_IDENT.is_match(ident) {
        ident.to_string()
    } else {
        format!("\"{}\"", ident.replace('\"', "\"\""))
    }
}
