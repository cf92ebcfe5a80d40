//! Structured logging for the dialer.
//!
//! Handles subscriber setup, phone-number redaction and the live log stream
//! served to websocket clients.

pub mod logger;
pub mod redact;
pub mod stream;

pub use logger::{LoggerConfig, init_logger};
pub use redact::redact_sensitive_data;
pub use stream::{BroadcastLayer, LogStream};
