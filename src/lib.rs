//! layer-filter - Container build plan layer filter
//!
//! Moves or deletes individual files of a container build plan according
//! to ordered glob rules, and optionally splits a parent module's
//! dependencies into dedicated `-parent` layers.

pub mod cli;
pub mod config;
pub mod error;
pub mod extension;
pub mod filter;
pub mod parent;
pub mod plan;
pub mod ui;

pub use error::{LayerFilterError, LayerFilterResult};
pub use extension::{LayerFilterExtension, ProjectContext};
pub use plan::{BuildPlan, FileEntry, Layer};
