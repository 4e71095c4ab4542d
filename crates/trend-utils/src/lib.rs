//! Shared utilities for stock-trend
//!
//! Logging setup and environment loading used by the binary and the
//! client constructors.

pub mod env;
pub mod logging;

pub use env::{load_dotenv, var_opt, var_or, var_or_empty};
pub use logging::init_tracing;
