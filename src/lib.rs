//! A concurrent HTTP/HTTPS load-generation client.
//!
//! The core of this crate is a single-threaded, cooperatively concurrent
//! [`engine::Engine`] that drives up to [`config::MAX_CONNECTIONS`]
//! [`connection::ConnectionSm`]s over one `tokio` runtime, each repeating a
//! connect → (proxy tunnel →)? (TLS →)? send → (receive →)? cycle until the
//! configured duration elapses. A simpler thread-per-client alternative
//! driver is available via [`threaded::run`] for contrast.

pub mod bitmap;
pub mod cli;
pub mod config;
pub mod connection;
pub mod engine;
pub mod error;
pub mod net;
pub mod reporter;
pub mod request;
pub mod threaded;
pub mod url;

pub use config::Config;
pub use engine::{Engine, EngineTotals};
pub use error::{Error, Result};
pub use request::Request;
