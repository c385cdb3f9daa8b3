use super::Node;
use crate::sql::predicate::Predicate;
use crate::sql::schema::{IndexDesc, Schema, Table};

use log::debug;
use std::collections::{HashMap, HashSet};

/// A source relation of a query, as planned so far.
pub struct Relation {
    pub table: Table,
    pub node: Node,
    pub cardinality: u64,
}

/// Pushes single-table predicates down to the relations they apply to.
///
/// Tables are visited in statement order, and every not yet consumed predicate
/// comparing a column with a literal that type-checks against the table is
/// consumed by it: an equality on a column indexed for that table turns the
/// table's scan into an index lookup, anything else becomes a single-predicate
/// filter. Column-to-column predicates are never pushed down. Returns the
/// per-table nodes and the unconsumed predicates, still grouped by slot.
pub fn push_down(
    tables: &[Table],
    indexes: &HashMap<String, IndexDesc>,
    predicates: &[Vec<Predicate>],
    index_lookups: bool,
) -> (Vec<Node>, Vec<Vec<Predicate>>) {
    let mut consumed = HashSet::new();
    let mut nodes = Vec::with_capacity(tables.len());

    for table in tables {
        let mut leaf = Node::Scan { table: table.name.clone() };
        let mut filters = Vec::new();

        for (slot, group) in predicates.iter().enumerate() {
            for (position, predicate) in group.iter().enumerate() {
                if !predicate.is_sargable()
                    || consumed.contains(&(slot, position))
                    || predicate.validate(&table.schema).is_err()
                {
                    continue;
                }
                let lookup = match (&leaf, index_lookups) {
                    (Node::Scan { .. }, true) => index_lookup(table, indexes, predicate),
                    _ => None,
                };
                match lookup {
                    Some(node) => {
                        debug!("Pushing {} down to {} as index lookup", predicate, table.name);
                        leaf = node;
                    }
                    None => {
                        debug!("Pushing {} down to {} as filter", predicate, table.name);
                        filters.push(predicate.clone());
                    }
                }
                consumed.insert((slot, position));
            }
        }

        nodes.push(filters.into_iter().fold(leaf, |source, predicate| Node::Filter {
            source: Box::new(source),
            predicates: vec![predicate],
        }));
    }

    let remaining = predicates
        .iter()
        .enumerate()
        .map(|(slot, group)| {
            group
                .iter()
                .enumerate()
                .filter(|(position, _)| !consumed.contains(&(slot, *position)))
                .map(|(_, p)| p.clone())
                .collect()
        })
        .collect();
    (nodes, remaining)
}

/// Builds an index lookup for an equality predicate, if the column has a hash
/// index on this table and the key has the column's type.
fn index_lookup(
    table: &Table,
    indexes: &HashMap<String, IndexDesc>,
    predicate: &Predicate,
) -> Option<Node> {
    let (column, key) = predicate.index_key()?;
    let index = indexes.get(column).filter(|i| i.table == table.name)?;
    let field = table.schema.field(table.schema.field_number(column).ok()?).ok()?;
    if field.datatype != key.datatype() {
        return None;
    }
    Some(Node::IndexLookup {
        table: table.name.clone(),
        index: index.name.clone(),
        column: column.to_owned(),
        key: key.clone(),
    })
}

/// Joins the relations left to right. For each adjacent pair in statement
/// order, the relation with the smaller (or equal) cardinality estimate of the
/// later one wins the outer side: if table i is no larger than table i-1, it
/// becomes the outer child against the running join, otherwise the running
/// join stays outer. Returns the join tree and its output schema.
pub fn join_order(first: Relation, rest: Vec<Relation>) -> (Node, Schema) {
    let mut previous = first.cardinality;
    let mut node = first.node;
    let mut schema = first.table.schema;

    for relation in rest {
        if relation.cardinality <= previous {
            debug!(
                "Joining {} ({} rows) as outer, previous table has {} rows",
                relation.table.name, relation.cardinality, previous
            );
            schema = Schema::join(&relation.table.schema, &schema);
            node = Node::NestedLoopJoin { outer: Box::new(relation.node), inner: Box::new(node) };
        } else {
            debug!(
                "Joining {} ({} rows) as inner, previous table has {} rows",
                relation.table.name, relation.cardinality, previous
            );
            schema = Schema::join(&schema, &relation.table.schema);
            node = Node::NestedLoopJoin { outer: Box::new(node), inner: Box::new(relation.node) };
        }
        previous = relation.cardinality;
    }
    (node, schema)
}
