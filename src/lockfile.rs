//! Per-build lock-file naming.

use std::env;
use std::sync::OnceLock;

/// Environment variable overriding the lock-file name.
const LOCK_ENV: &str = "WAFLOCK";

static LOCK_NAME: OnceLock<String> = OnceLock::new();

/// The name used for the per-build lock file: the `WAFLOCK` override when
/// set and non-empty, a platform-qualified default otherwise. Computed
/// once and constant for the process lifetime.
pub fn lock_name() -> &'static str {
    LOCK_NAME.get_or_init(|| match env::var(LOCK_ENV) {
        Ok(name) if !name.is_empty() => name,
        _ => format!(".lock-mason_{}_build", env::consts::OS),
    })
}
