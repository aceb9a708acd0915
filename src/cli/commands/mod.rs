//! CLI command implementations.

pub mod catalog;
pub mod classify;
pub mod replay;

pub use catalog::CatalogArgs;
pub use classify::ClassifyArgs;
pub use replay::ReplayArgs;
