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

//! Typed inputs for a ferry transfer run.
//!
//! Layout: `model.rs` (operation, mode, and the immutable transfer request),
//! `source.rs` (source specification classification), `settings.rs`
//! (environment-backed runtime settings), `error.rs` (`ConfigError`).

pub mod error;
pub mod model;
pub mod settings;
pub mod source;

pub use error::{ConfigError, ConfigResult};
pub use model::{Operation, TransferMode, TransferRequest};
pub use settings::{
    DEFAULT_LOG_FILE, DEFAULT_LOG_LEVEL, DEFAULT_THROTTLE, RuntimeSettings,
};
pub use source::{ClassifiedSource, SourceSpec, classify};
