//! Core types shared by the rest of the crate.
//!
//! Currently this is the configuration layer.

mod config;

pub use config::{BoardConfig, Config, DescriptionConfig, RepositoryConfig};
