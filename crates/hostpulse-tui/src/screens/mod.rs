//! Screen implementations. Each screen is a top-level Component.

pub mod host_detail;
pub mod overview;

/// `12s` / `3m 4s`: whole seconds, no sub-second noise.
pub(crate) fn fmt_age(age: std::time::Duration) -> String {
    humantime::format_duration(std::time::Duration::from_secs(age.as_secs())).to_string()
}
