use super::schema::Schema;
use super::types::Value;
use crate::error::{Error, Result};

use std::fmt::{self, Display};
use std::sync::Arc;

/// A row of values bound to a schema. Fields are addressed by position, or
/// by name through the schema.
#[derive(Clone, Debug, PartialEq)]
pub struct Tuple {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl Tuple {
    /// Creates a tuple, checking the values against the schema.
    pub fn new(schema: Arc<Schema>, values: Vec<Value>) -> Result<Self> {
        if values.len() != schema.len() {
            return Err(Error::Value(format!(
                "Expected {} values, got {}",
                schema.len(),
                values.len()
            )));
        }
        for (field, value) in schema.fields.iter().zip(values.iter()) {
            field.validate_value(value)?;
        }
        Ok(Self { schema, values })
    }

    /// Decodes a stored record against a schema.
    pub fn decode(schema: Arc<Schema>, record: &[u8]) -> Result<Self> {
        let values: Vec<Value> = bincode::deserialize(record)?;
        if values.len() != schema.len() {
            return Err(Error::Serialization);
        }
        Ok(Self { schema, values })
    }

    /// Encodes the tuple's values as a record.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&self.values)?)
    }

    /// Concatenates two tuples under the given (joined) schema.
    pub fn join(schema: Arc<Schema>, outer: &Tuple, inner: &Tuple) -> Self {
        let values = outer.values.iter().chain(inner.values.iter()).cloned().collect();
        Self { schema, values }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Fetches a field value by position.
    pub fn get(&self, index: usize) -> Result<&Value> {
        self.values.get(index).ok_or_else(|| {
            Error::Value(format!(
                "Field number {} out of range for {} fields",
                index,
                self.values.len()
            ))
        })
    }

    /// Fetches a field value by name.
    pub fn get_by_name(&self, name: &str) -> Result<&Value> {
        self.get(self.schema.field_number(name)?)
    }

    /// Replaces a field value in place.
    pub fn set(&mut self, index: usize, value: Value) -> Result<()> {
        self.schema.field(index)?.validate_value(&value)?;
        self.values[index] = value;
        Ok(())
    }

    /// Replaces a field value in place, by name.
    pub fn set_by_name(&mut self, name: &str, value: Value) -> Result<()> {
        let index = self.schema.field_number(name)?;
        self.set(index, value)
    }
}

impl Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" | ")
        )
    }
}
