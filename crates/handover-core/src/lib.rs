pub mod config;
pub mod edits;
pub mod error;
pub mod io;
pub mod jira;
pub mod ordered;
pub mod paths;
pub mod schedule;
pub mod slack;
pub mod store;
pub mod workflow;

pub use error::{HandoverError, Result};
