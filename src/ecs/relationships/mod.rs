pub mod graph;

pub use graph::{Relationship, RelationshipGraph};
