//! Utility modules
//!
//! - [`logging`]: tracing-based logging initialization with startup rotation

pub mod logging;
