//! Node tree module

mod names;
mod node;
mod path;

pub use names::NameTable;
pub use node::{Attribute, Element, Node};
pub use path::{
    NodePath, PathStep, Predicate, child_matching_index, select_all, select_single,
    select_single_mut,
};
