//! CLI command handlers, one file per command.

mod classify;
mod completions;
mod decompose;
mod domains;
mod relations;

pub use classify::run_classify;
pub use completions::{run_completions, run_man};
pub use decompose::run_decompose;
pub use domains::run_domains;
pub use relations::run_relations;
