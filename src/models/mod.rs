//! Evergreen API model types.

mod build;
mod manifest;
mod patch;
mod project;
mod task;
mod test_result;
mod version;

pub use build::*;
pub use manifest::*;
pub use patch::*;
pub use project::*;
pub use task::*;
pub use test_result::*;
pub use version::*;
