// Typed Tracker resources returned in `OutputShape::Struct` mode.
// Provider fields not modelled here are kept in each type's `extra` map.

pub mod common;
pub mod person;
pub mod project;
pub mod story;
pub mod task;

pub use common::*;
pub use person::*;
pub use project::*;
pub use story::*;
pub use task::*;
