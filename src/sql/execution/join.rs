use super::{closed, exhausted, Executor};
use crate::error::Result;
use crate::sql::schema::Schema;
use crate::sql::tuple::Tuple;

use std::sync::Arc;

/// A nested loop join, emitting every outer/inner pair. The inner source is
/// restarted for each outer tuple, and outer fields precede inner fields.
pub struct NestedLoopJoin<'a> {
    outer: Box<dyn Executor + 'a>,
    inner: Box<dyn Executor + 'a>,
    schema: Arc<Schema>,
    /// The outer tuple currently paired with the inner rows.
    current: Option<Tuple>,
    open: bool,
}

impl<'a> NestedLoopJoin<'a> {
    pub fn new(outer: Box<dyn Executor + 'a>, inner: Box<dyn Executor + 'a>) -> Self {
        let schema = Arc::new(Schema::join(outer.schema(), inner.schema()));
        Self { outer, inner, schema, current: None, open: true }
    }
}

impl<'a> Executor for NestedLoopJoin<'a> {
    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn has_next(&mut self) -> Result<bool> {
        if !self.open {
            return Ok(false);
        }
        loop {
            if self.current.is_some() && self.inner.has_next()? {
                return Ok(true);
            }
            if !self.outer.has_next()? {
                self.current = None;
                return Ok(false);
            }
            self.current = Some(self.outer.next()?);
            self.inner.restart()?;
        }
    }

    fn next(&mut self) -> Result<Tuple> {
        if !self.open {
            return Err(closed());
        }
        if !self.has_next()? {
            return Err(exhausted());
        }
        let inner = self.inner.next()?;
        let outer = self.current.as_ref().ok_or_else(exhausted)?;
        Ok(Tuple::join(self.schema.clone(), outer, &inner))
    }

    fn restart(&mut self) -> Result<()> {
        self.outer.restart()?;
        self.inner.restart()?;
        self.current = None;
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.outer.close();
        self.inner.close();
        self.current = None;
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
