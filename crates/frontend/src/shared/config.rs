//! Service address configuration
//!
//! The address is baked in at build time. `ASSISTANT_API_BASE` may be set in
//! the build environment (e.g. `ASSISTANT_API_BASE=https://clinic.local trunk build`)
//! to point the client at another host.

/// Address of the assistant service when no override is given
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";

/// Get the base URL for API requests
pub fn api_base() -> &'static str {
    resolve_base(option_env!("ASSISTANT_API_BASE"))
}

fn resolve_base(override_base: Option<&'static str>) -> &'static str {
    match override_base {
        Some(base) if !base.trim().is_empty() => base.trim(),
        _ => DEFAULT_API_BASE,
    }
}
