//! Patch engine: primitive node operations, diffing helpers, application

mod apply;
mod diff;
mod op;

pub use apply::{ApplyOutcome, apply};
pub use diff::diff_items;
pub use op::{NodeOperation, Patch};
