//! guidecheck: style-guide grounded pull request reviews (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod config;
pub mod constants;
pub mod corpus;
pub mod env;
pub mod github;
pub mod models;
pub mod orchestrator;
pub mod output;
pub mod prompt;
pub mod providers;
