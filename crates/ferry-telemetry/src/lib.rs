#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Logging setup shared by the ferry binaries.
//!
//! Library crates only emit `tracing` events; installing the subscriber is the
//! job of the process entrypoint through [`init_logging`].

pub mod error;
pub mod init;

pub use error::{Result, TelemetryError};
pub use init::{LogFormat, LoggingConfig, init_logging};
