use super::optimizer::{self, Relation};
use super::{Node, Plan};
use crate::error::{Error, Result};
use crate::sql::ast::Statement;
use crate::sql::predicate::Predicate;
use crate::sql::schema::Catalog;
use crate::sql::types::Value;

use log::debug;
use std::collections::HashMap;

/// A query planner
pub struct Planner<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    index_lookups: bool,
}

impl<'a, C: Catalog + ?Sized> Planner<'a, C> {
    /// Creates a new planner.
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog, index_lookups: true }
    }

    /// Allows or forbids answering equality predicates through indexes.
    pub fn with_index_lookups(mut self, enabled: bool) -> Self {
        self.index_lookups = enabled;
        self
    }

    /// Builds a plan for an AST statement.
    pub fn build(&mut self, statement: Statement) -> Result<Plan> {
        let plan = Plan(self.build_statement(statement)?);
        debug!("Compiled plan:\n{}", plan);
        Ok(plan)
    }

    /// Builds a plan node for a statement.
    fn build_statement(&self, statement: Statement) -> Result<Node> {
        match statement {
            Statement::Select { tables, columns, predicates } => {
                self.build_select(tables, columns, predicates)
            }
            Statement::Insert { table, values } => self.build_insert(table, values),
        }
    }

    /// Builds a SELECT plan: scans or index lookups per table with pushed
    /// down filters, joined pairwise, with the remaining predicates applied
    /// above the join and a projection at the root.
    fn build_select(
        &self,
        tables: Vec<String>,
        columns: Vec<String>,
        predicates: Vec<Vec<Predicate>>,
    ) -> Result<Node> {
        let tables =
            tables.iter().map(|t| self.catalog.must_read_table(t)).collect::<Result<Vec<_>>>()?;

        // Later tables' indexes shadow earlier ones on the same column name.
        let mut indexes = HashMap::new();
        for table in &tables {
            for index in self.catalog.indexes(&table.name)? {
                indexes.insert(index.column.clone(), index);
            }
        }

        for predicate in predicates.iter().flatten().filter(|p| p.is_sargable()) {
            if !tables.iter().any(|t| predicate.validate(&t.schema).is_ok()) {
                return Err(Error::Value(format!(
                    "Predicate {} does not apply to any table",
                    predicate
                )));
            }
        }

        let (nodes, remaining) =
            optimizer::push_down(&tables, &indexes, &predicates, self.index_lookups);

        let mut relations = tables.into_iter().zip(nodes).map(|(table, node)| -> Result<_> {
            let cardinality = self.catalog.row_count(&table.name)?;
            Ok(Relation { table, node, cardinality })
        });
        let first = match relations.next() {
            Some(relation) => relation?,
            None => return Err(Error::Value("SELECT requires at least one table".into())),
        };
        let (mut node, schema) =
            optimizer::join_order(first, relations.collect::<Result<Vec<_>>>()?);

        // Column comparisons run above the join, against its reordered schema.
        let remaining = remaining.into_iter().filter(|p| !p.is_empty()).collect::<Vec<_>>();
        for predicate in remaining.iter().flatten() {
            predicate.validate(&schema)?;
        }
        if remaining.is_empty() {
            node = Node::Filter { source: Box::new(node), predicates: Vec::new() };
        }
        for predicates in remaining {
            node = Node::Filter { source: Box::new(node), predicates };
        }

        let fields = if columns.is_empty() {
            (0..schema.len()).collect()
        } else {
            columns.iter().map(|c| schema.field_number(c)).collect::<Result<Vec<_>>>()?
        };
        Ok(Node::Projection { source: Box::new(node), fields })
    }

    /// Builds an INSERT plan, checking the values against the table schema.
    fn build_insert(&self, table: String, values: Vec<Value>) -> Result<Node> {
        self.catalog.must_read_table(&table)?.validate_row(&values)?;
        Ok(Node::Insert { table, values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sql::engine::Database;
    use crate::sql::execution::ResultSet;
    use crate::sql::predicate::{Operand, Operator};
    use crate::sql::schema::{Field, Table};
    use crate::sql::types::DataType;

    fn setup() -> Result<Database> {
        let mut db = Database::new(Config::default())?;
        db.create_table(Table::new(
            "emp",
            vec![
                Field::new("id", DataType::Integer),
                Field::string("name", 16),
                Field::string("dept", 16),
            ],
        )?)?;
        db.create_table(Table::new(
            "dept",
            vec![Field::string("title", 16), Field::new("floor", DataType::Integer)],
        )?)?;
        db.create_index("emp_id", "emp", "id")?;
        Ok(db)
    }

    fn select(tables: &[&str], columns: &[&str], predicates: Vec<Vec<Predicate>>) -> Statement {
        Statement::Select {
            tables: tables.iter().map(|t| t.to_string()).collect(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            predicates,
        }
    }

    #[test]
    fn select_index_lookup() -> Result<()> {
        let db = setup()?;
        let plan = db.plan(select(
            &["emp"],
            &["name"],
            vec![vec![Predicate::column("id", Operator::Equal, 2)]],
        ))?;
        assert_eq!(
            "Projection: #1\n  Filter: true\n    IndexLookup: emp.id = 2 (emp_id)\n",
            plan.to_string()
        );
        Ok(())
    }

    #[test]
    fn select_filter_without_index() -> Result<()> {
        let db = setup()?;
        let plan = db.plan(select(
            &["emp"],
            &[],
            vec![vec![Predicate::column("dept", Operator::Equal, "eng")]],
        ))?;
        assert_eq!(
            "Projection: #0, #1, #2\n  Filter: true\n    Filter: dept = 'eng'\n      Scan: emp\n",
            plan.to_string()
        );

        let plan = Planner::new(&db).with_index_lookups(false).build(select(
            &["emp"],
            &["id"],
            vec![vec![Predicate::column("id", Operator::Equal, 2)]],
        ))?;
        assert_eq!(
            "Projection: #0\n  Filter: true\n    Filter: id = 2\n      Scan: emp\n",
            plan.to_string()
        );
        Ok(())
    }

    #[test]
    fn select_join_keeps_column_predicates_above_join() -> Result<()> {
        let db = setup()?;
        let plan = db.plan(select(
            &["emp", "dept"],
            &["name", "floor"],
            vec![
                vec![Predicate::columns("dept", Operator::Equal, "title")],
                vec![Predicate::column("floor", Operator::GreaterThan, 1)],
            ],
        ))?;
        // Both tables are empty, so dept (0 <= 0) becomes the outer side.
        assert_eq!(
            concat!(
                "Projection: #3, #1\n",
                "  Filter: dept = title\n",
                "    NestedLoopJoin\n",
                "      Filter: floor > 1\n",
                "        Scan: dept\n",
                "      Scan: emp\n",
            ),
            plan.to_string()
        );
        Ok(())
    }

    #[test]
    fn select_checks_column_predicates_against_join_order() -> Result<()> {
        let mut db = Database::new(Config::default())?;
        db.create_table(Table::new("a", vec![Field::new("a", DataType::Integer)])?)?;
        db.create_table(Table::new("b", vec![Field::string("s", 8)])?)?;
        for values in [vec![Value::Integer(1)], vec![Value::Integer(2)]] {
            db.execute(Statement::Insert { table: "a".into(), values })?;
        }
        db.execute(Statement::Insert { table: "b".into(), values: vec!["x".into()] })?;

        // b has fewer rows and moves to the outer side, so field #0 is s.
        let compare = |column: &str| {
            select(
                &["a", "b"],
                &[],
                vec![vec![Predicate::new(
                    Operand::Field(0),
                    Operator::Equal,
                    Operand::column(column),
                )]],
            )
        };
        assert!(matches!(db.plan(compare("a")), Err(Error::Value(_))));

        let plan = db.plan(compare("s"))?;
        assert_eq!(
            concat!(
                "Projection: #0, #1\n",
                "  Filter: #0 = s\n",
                "    NestedLoopJoin\n",
                "      Scan: b\n",
                "      Scan: a\n",
            ),
            plan.to_string()
        );
        assert_eq!(
            ResultSet::Query {
                columns: vec!["s".into(), "a".into()],
                rows: vec![
                    vec![Value::from("x"), Value::Integer(1)],
                    vec![Value::from("x"), Value::Integer(2)],
                ],
            },
            db.execute(compare("s"))?
        );
        Ok(())
    }

    #[test]
    fn select_errors() -> Result<()> {
        let db = setup()?;
        let err = |statement| matches!(db.plan(statement), Err(Error::Value(_)));

        assert!(err(select(&[], &[], vec![])));
        assert!(err(select(&["nope"], &[], vec![])));
        assert!(err(select(&["emp"], &["salary"], vec![])));
        assert!(err(select(
            &["emp"],
            &[],
            vec![vec![Predicate::column("salary", Operator::Equal, 1)]]
        )));
        assert!(err(select(
            &["emp"],
            &[],
            vec![vec![Predicate::column("id", Operator::Equal, "x")]]
        )));
        assert!(err(select(
            &["emp", "dept"],
            &[],
            vec![vec![Predicate::columns("id", Operator::Equal, "title")]]
        )));
        Ok(())
    }

    #[test]
    fn insert() -> Result<()> {
        let db = setup()?;
        let plan = db.plan(Statement::Insert {
            table: "dept".into(),
            values: vec!["eng".into(), 3.into()],
        })?;
        assert_eq!(
            Node::Insert { table: "dept".into(), values: vec!["eng".into(), 3.into()] },
            plan.0
        );
        assert_eq!("Insert: dept ('eng', 3)\n", plan.to_string());

        assert!(db
            .plan(Statement::Insert { table: "dept".into(), values: vec![3.into(), "eng".into()] })
            .is_err());
        assert!(db.plan(Statement::Insert { table: "nope".into(), values: vec![] }).is_err());
        Ok(())
    }
}
