pub mod config;
pub mod logging;

pub mod context;
pub mod decompose;
pub mod dispatch;
pub mod feed;
pub mod memo;
pub mod retry;
pub mod rules;
pub mod session;
pub mod sites;
pub mod variant;

pub use context::Context;
pub use dispatch::{Classification, ClassifyError, Dispatcher, MatchOutcome, SiteAdapter};
pub use variant::{UrlVariant, VariantKind};
