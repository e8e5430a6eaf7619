//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands are
//! routed by [`CommandDispatcher`] and open the file-backed plan store
//! themselves.

pub mod cancel;
pub mod completions;
pub mod dispatcher;
pub mod display;
pub mod list;
pub mod plan;
pub mod retry;
pub mod schema;
pub mod show;
pub mod step;

pub use dispatcher::{open_world, Command, CommandDispatcher, CommandResult};
