//! VerseDeck Application
//!
//! Command-line shell around the composition engine: configuration, the
//! HTTP slide backend, session inspection and verse layout.

mod cli;
mod commands;
mod config;
mod error;
mod http;

pub use cli::{Cli, Commands};
pub use commands::{PushReport, push_slides, run, summarize};
pub use config::AppConfig;
pub use error::AppError;
pub use http::HttpBackend;
