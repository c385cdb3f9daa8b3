pub mod ast;
pub mod engine;
pub mod execution;
pub mod plan;
pub mod predicate;
pub mod schema;
pub mod tuple;
pub mod types;
