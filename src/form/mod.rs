//! Field type dispatch and HTML rendering
//!
//! - `registry`: the type -> rule table (control, value shape, default, options)
//! - `render`: turns descriptors plus the current value store into HTML

pub mod registry;
pub mod render;

pub use registry::{ControlKind, FieldRegistry, FieldRule, OptionSource, ValueShape, WeekdaySet};
pub use render::HtmlRenderer;
