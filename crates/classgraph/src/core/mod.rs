//! Core abstractions for diagram generation
//!
//! This module holds the pieces every stage shares: the declaration source
//! model, configuration, filtering, alias canonicalization, errors, logging,
//! and the database/renderer traits.

mod alias;
mod config;
mod database;
mod declaration;
mod error;
mod filter;
pub mod logging;
mod renderer;

pub use alias::*;
pub use config::*;
pub use database::*;
pub use declaration::*;
pub use error::*;
pub use filter::*;
pub use logging::*;
pub use renderer::*;
