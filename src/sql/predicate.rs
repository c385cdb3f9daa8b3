use super::schema::{format_ident, Schema};
use super::tuple::Tuple;
use super::types::{DataType, Value};
use crate::error::{Error, Result};

use serde_derive::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display};

/// A comparison operator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl Operator {
    fn matches(&self, ordering: Ordering) -> bool {
        match self {
            Self::Equal => ordering == Ordering::Equal,
            Self::NotEqual => ordering != Ordering::Equal,
            Self::LessThan => ordering == Ordering::Less,
            Self::LessThanOrEqual => ordering != Ordering::Greater,
            Self::GreaterThan => ordering == Ordering::Greater,
            Self::GreaterThanOrEqual => ordering != Ordering::Less,
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
        })
    }
}

/// A predicate operand: a column reference by name, a field reference by
/// zero-based position, or a literal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    Column(String),
    Field(usize),
    Value(Value),
}

impl Operand {
    /// Shorthand for a column reference.
    pub fn column(name: &str) -> Self {
        Self::Column(name.to_owned())
    }

    /// Returns true if the operand refers to a tuple field.
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Column(_) | Self::Field(_))
    }

    /// Resolves the operand's datatype against a schema.
    fn datatype(&self, schema: &Schema) -> Result<DataType> {
        Ok(match self {
            Self::Column(name) => schema.field(schema.field_number(name)?)?.datatype,
            Self::Field(index) => schema.field(*index)?.datatype,
            Self::Value(value) => value.datatype(),
        })
    }

    /// Resolves the operand's value against a tuple.
    fn resolve<'a>(&'a self, tuple: &'a Tuple) -> Result<&'a Value> {
        match self {
            Self::Column(name) => tuple.get_by_name(name),
            Self::Field(index) => tuple.get(*index),
            Self::Value(value) => Ok(value),
        }
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(name) => write!(f, "{}", format_ident(name)),
            Self::Field(index) => write!(f, "#{}", index),
            Self::Value(value) => write!(f, "{}", value),
        }
    }
}

/// A comparison between two operands, evaluated against one tuple at a time.
/// Predicates are immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub left: Operand,
    pub operator: Operator,
    pub right: Operand,
}

impl Predicate {
    pub fn new(left: Operand, operator: Operator, right: Operand) -> Self {
        Self { left, operator, right }
    }

    /// Compares a column with a literal.
    pub fn column(name: &str, operator: Operator, value: impl Into<Value>) -> Self {
        Self::new(Operand::column(name), operator, Operand::Value(value.into()))
    }

    /// Compares two columns.
    pub fn columns(left: &str, operator: Operator, right: &str) -> Self {
        Self::new(Operand::column(left), operator, Operand::column(right))
    }

    /// Returns true if the predicate compares a column with a literal, making
    /// it answerable from a single table.
    pub fn is_sargable(&self) -> bool {
        self.left.is_reference() && !self.right.is_reference()
    }

    /// Returns the indexable column and search key, if the predicate is an
    /// equality between a named column and a literal.
    pub fn index_key(&self) -> Option<(&str, &Value)> {
        match (&self.left, self.operator, &self.right) {
            (Operand::Column(column), Operator::Equal, Operand::Value(value)) => {
                Some((column.as_str(), value))
            }
            _ => None,
        }
    }

    /// Checks that every reference resolves against the schema and that the
    /// operand types can be compared.
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        let left = self.left.datatype(schema)?;
        let right = self.right.datatype(schema)?;
        if !left.comparable(&right) {
            return Err(Error::Value(format!(
                "Can't compare {} and {} in predicate {}",
                left, right, self
            )));
        }
        Ok(())
    }

    /// Evaluates the predicate against a tuple.
    pub fn evaluate(&self, tuple: &Tuple) -> Result<bool> {
        let left = self.left.resolve(tuple)?;
        let right = self.right.resolve(tuple)?;
        Ok(self.operator.matches(left.compare(right)?))
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::super::schema::Field;
    use super::*;
    use std::sync::Arc;

    fn tuple() -> Result<Tuple> {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Integer),
            Field::new("score", DataType::Float),
            Field::string("name", 8),
        ]));
        Tuple::new(schema, vec![2.into(), Value::Float(2.5), "bob".into()])
    }

    #[test]
    fn evaluate() -> Result<()> {
        let t = tuple()?;
        assert!(Predicate::column("id", Operator::Equal, 2).evaluate(&t)?);
        assert!(!Predicate::column("id", Operator::NotEqual, 2).evaluate(&t)?);
        assert!(Predicate::column("id", Operator::LessThan, 2.5_f32).evaluate(&t)?);
        assert!(Predicate::column("score", Operator::GreaterThanOrEqual, 2.5_f32).evaluate(&t)?);
        assert!(Predicate::column("name", Operator::LessThanOrEqual, "bob").evaluate(&t)?);
        assert!(!Predicate::column("name", Operator::GreaterThan, "bob").evaluate(&t)?);
        assert!(Predicate::columns("id", Operator::LessThan, "score").evaluate(&t)?);
        let same = Predicate::new(Operand::Field(0), Operator::Equal, Operand::Field(0));
        assert!(same.evaluate(&t)?);
        assert!(Predicate::column("salary", Operator::Equal, 1).evaluate(&t).is_err());
        Ok(())
    }

    #[test]
    fn validate() -> Result<()> {
        let t = tuple()?;
        Predicate::column("id", Operator::Equal, 1.5_f32).validate(t.schema())?;
        Predicate::columns("id", Operator::Equal, "score").validate(t.schema())?;
        assert!(Predicate::column("name", Operator::Equal, 1).validate(t.schema()).is_err());
        assert!(Predicate::columns("id", Operator::Equal, "name").validate(t.schema()).is_err());
        assert!(Predicate::column("salary", Operator::Equal, 1).validate(t.schema()).is_err());
        assert!(Predicate::new(Operand::Field(3), Operator::Equal, Operand::Value(1.into()))
            .validate(t.schema())
            .is_err());
        Ok(())
    }

    #[test]
    fn classify() {
        let p = Predicate::column("id", Operator::Equal, 1);
        assert!(p.is_sargable());
        assert_eq!(Some(("id", &Value::Integer(1))), p.index_key());

        let p = Predicate::column("id", Operator::LessThan, 1);
        assert!(p.is_sargable());
        assert_eq!(None, p.index_key());

        let p = Predicate::columns("a", Operator::Equal, "b");
        assert!(!p.is_sargable());
        assert_eq!(None, p.index_key());
        assert_eq!("a = b", p.to_string());
    }
}
