//! Typed edit records and their mappers
//!
//! Records are plain data: the UI/CLI layer receives and returns them
//! without ever holding a reference into the live tree. All mutation flows
//! back through a [`crate::patch::Patch`] or a whole-element replacement.

mod layouts;
mod looknfeel;
mod mapper;
mod presence;
mod validate;

pub use layouts::{
    ColumnRecord, InsertionDefinitionRecord, LayoutRecord, LayoutsMapper, LayoutsRecord,
};
pub use looknfeel::{LooknfeelMapper, LooknfeelRecord, MeshRecord, MeshesRecord, WidgetRecord};
pub use mapper::{FieldSpec, RecordMapper};
pub use presence::Presence;
pub use validate::ValidationResult;
