//! Environment loading helpers

use std::path::PathBuf;
use tracing::debug;

/// Load variables from a `.env` file in the working directory or its parents.
///
/// Returns the path that was loaded, if any. A missing file is not an error:
/// credentials may come from the process environment instead.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            debug!(path = %path.display(), "loaded .env");
            Some(path)
        }
        Err(e) => {
            debug!("no .env loaded: {e}");
            None
        }
    }
}

/// Read an environment variable, falling back to `default` when unset or not unicode.
pub fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Read an optional override; unset, blank or non-unicode values are `None`.
pub fn var_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read an environment variable, falling back to an empty string.
///
/// Used for credentials: an absent key is only discovered when the upstream
/// service rejects the request.
pub fn var_or_empty(name: &str) -> String {
    var_or(name, "")
}
