use super::{closed, exhausted, Executor};
use crate::error::Result;
use crate::sql::predicate::Predicate;
use crate::sql::schema::Schema;
use crate::sql::tuple::Tuple;

use std::sync::Arc;

/// A filter executor. A tuple passes only if every predicate holds; with no
/// predicates every tuple passes.
pub struct Filter<'a> {
    source: Box<dyn Executor + 'a>,
    predicates: Vec<Predicate>,
    /// A passing tuple found by has_next, not yet returned.
    lookahead: Option<Tuple>,
    open: bool,
}

impl<'a> Filter<'a> {
    pub fn new(source: Box<dyn Executor + 'a>, predicates: Vec<Predicate>) -> Self {
        Self { source, predicates, lookahead: None, open: true }
    }

    fn matches(&self, tuple: &Tuple) -> Result<bool> {
        for predicate in &self.predicates {
            if !predicate.evaluate(tuple)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<'a> Executor for Filter<'a> {
    fn schema(&self) -> &Arc<Schema> {
        self.source.schema()
    }

    fn has_next(&mut self) -> Result<bool> {
        if !self.open {
            return Ok(false);
        }
        if self.lookahead.is_some() {
            return Ok(true);
        }
        while self.source.has_next()? {
            let tuple = self.source.next()?;
            if self.matches(&tuple)? {
                self.lookahead = Some(tuple);
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn next(&mut self) -> Result<Tuple> {
        if !self.open {
            return Err(closed());
        }
        if !self.has_next()? {
            return Err(exhausted());
        }
        self.lookahead.take().ok_or_else(exhausted)
    }

    fn restart(&mut self) -> Result<()> {
        self.source.restart()?;
        self.lookahead = None;
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.source.close();
        self.lookahead = None;
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

/// A projection executor, mapping each input tuple to the listed source
/// fields in the given order. Fields may repeat; rows are not de-duplicated.
pub struct Projection<'a> {
    source: Box<dyn Executor + 'a>,
    fields: Vec<usize>,
    schema: Arc<Schema>,
    open: bool,
}

impl<'a> Projection<'a> {
    pub fn new(source: Box<dyn Executor + 'a>, fields: Vec<usize>) -> Result<Self> {
        let schema = Arc::new(Schema::new(
            fields
                .iter()
                .map(|i| source.schema().field(*i).cloned())
                .collect::<Result<Vec<_>>>()?,
        ));
        Ok(Self { source, fields, schema, open: true })
    }
}

impl<'a> Executor for Projection<'a> {
    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn has_next(&mut self) -> Result<bool> {
        if !self.open {
            return Ok(false);
        }
        self.source.has_next()
    }

    fn next(&mut self) -> Result<Tuple> {
        if !self.open {
            return Err(closed());
        }
        let tuple = self.source.next()?;
        let values =
            self.fields.iter().map(|i| tuple.get(*i).cloned()).collect::<Result<Vec<_>>>()?;
        Tuple::new(self.schema.clone(), values)
    }

    fn restart(&mut self) -> Result<()> {
        self.source.restart()?;
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.source.close();
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::super::TableScan;
    use super::*;
    use crate::error::Error;
    use crate::sql::predicate::Operator;
    use crate::sql::schema::Field;
    use crate::sql::types::{DataType, Value};
    use crate::storage::heap::{self, Heap};

    use rand::Rng;

    fn schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("a", DataType::Integer),
            Field::new("b", DataType::Integer),
            Field::string("c", 8),
        ]))
    }

    fn store(rows: &[(i32, i32)]) -> Result<heap::Memory> {
        let mut heap = heap::Memory::new();
        for (a, b) in rows {
            let tuple = Tuple::new(schema(), vec![(*a).into(), (*b).into(), "x".into()])?;
            heap.insert(tuple.encode()?)?;
        }
        Ok(heap)
    }

    fn random_rows(n: usize) -> Vec<(i32, i32)> {
        let mut rng = rand::thread_rng();
        (0..n).map(|_| (rng.gen_range(0..10), rng.gen_range(0..10))).collect()
    }

    fn drain(executor: &mut dyn Executor) -> Result<Vec<Vec<Value>>> {
        let mut rows = Vec::new();
        while executor.has_next()? {
            rows.push(executor.next()?.into_values());
        }
        Ok(rows)
    }

    #[test]
    fn filter_is_conjunction() -> Result<()> {
        let rows = random_rows(200);
        let heap = store(&rows)?;
        let predicates = vec![
            Predicate::column("a", Operator::GreaterThanOrEqual, 3),
            Predicate::column("b", Operator::LessThan, 5),
        ];
        let mut filter = Filter::new(Box::new(TableScan::new(&heap, schema())), predicates);

        let expect = rows
            .iter()
            .filter(|(a, b)| *a >= 3 && *b < 5)
            .map(|(a, b)| vec![Value::Integer(*a), Value::Integer(*b), "x".into()])
            .collect::<Vec<_>>();
        assert_eq!(expect, drain(&mut filter)?);
        Ok(())
    }

    #[test]
    fn filter_without_predicates_passes_all() -> Result<()> {
        let heap = store(&random_rows(50))?;
        let mut filter = Filter::new(Box::new(TableScan::new(&heap, schema())), vec![]);
        let mut scan = TableScan::new(&heap, schema());
        assert_eq!(drain(&mut scan)?, drain(&mut filter)?);
        Ok(())
    }

    #[test]
    fn filter_lookahead() -> Result<()> {
        let heap = store(&[(1, 0), (5, 0), (2, 0), (6, 0)])?;
        let mut filter = Filter::new(
            Box::new(TableScan::new(&heap, schema())),
            vec![Predicate::column("a", Operator::GreaterThan, 4)],
        );

        // Repeated has_next calls must not skip tuples.
        assert!(filter.has_next()?);
        assert!(filter.has_next()?);
        assert_eq!(&Value::Integer(5), filter.next()?.get(0)?);
        // next without has_next searches on its own.
        assert_eq!(&Value::Integer(6), filter.next()?.get(0)?);
        assert!(!filter.has_next()?);
        assert!(matches!(filter.next(), Err(Error::Internal(_))));
        Ok(())
    }

    #[test]
    fn filter_restart_and_close() -> Result<()> {
        let heap = store(&random_rows(30))?;
        let mut filter = Filter::new(
            Box::new(TableScan::new(&heap, schema())),
            vec![Predicate::column("a", Operator::NotEqual, 4)],
        );
        let expect = drain(&mut filter)?;

        filter.restart()?;
        filter.has_next()?;
        filter.restart()?;
        assert_eq!(expect, drain(&mut filter)?);

        filter.close();
        filter.close();
        assert!(!filter.is_open());
        assert!(!filter.has_next()?);
        filter.restart()?;
        assert!(filter.is_open());
        assert_eq!(expect, drain(&mut filter)?);
        Ok(())
    }

    #[test]
    fn projection() -> Result<()> {
        let rows = random_rows(40);
        let heap = store(&rows)?;
        let mut projection =
            Projection::new(Box::new(TableScan::new(&heap, schema())), vec![2, 0, 0])?;
        assert_eq!(vec!["c", "a", "a"], projection.schema().names());
        assert_eq!(DataType::String, projection.schema().fields[0].datatype);

        let result = drain(&mut projection)?;
        assert_eq!(rows.len(), result.len());
        for ((a, _), row) in rows.iter().zip(&result) {
            assert_eq!(&vec![Value::from("x"), Value::Integer(*a), Value::Integer(*a)], row);
        }

        projection.restart()?;
        assert_eq!(result, drain(&mut projection)?);
        projection.close();
        assert!(!projection.is_open());
        Ok(())
    }

    #[test]
    fn projection_out_of_range() -> Result<()> {
        let heap = store(&[])?;
        assert!(Projection::new(Box::new(TableScan::new(&heap, schema())), vec![3]).is_err());
        Ok(())
    }
}
