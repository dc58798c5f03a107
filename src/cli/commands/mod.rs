//! CLI command implementations

pub mod apply;
pub mod config;
pub mod explain;

pub use apply::execute as apply;
pub use config::execute as config;
pub use explain::execute as explain;
