//! Usage threshold classification shared by every surface.

use strum::Display;

/// Usage at or above this is [`UsageLevel::Elevated`].
pub const ELEVATED_THRESHOLD: f64 = 75.0;
/// Usage at or above this is [`UsageLevel::Critical`].
pub const CRITICAL_THRESHOLD: f64 = 90.0;

/// Severity band for a utilization percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum UsageLevel {
    /// Green.
    Normal,
    /// Yellow.
    Elevated,
    /// Red.
    Critical,
}

/// Classify a percentage. Total over all inputs; NaN is `Normal`.
pub fn classify_usage(pct: f64) -> UsageLevel {
    if pct >= CRITICAL_THRESHOLD {
        UsageLevel::Critical
    } else if pct >= ELEVATED_THRESHOLD {
        UsageLevel::Elevated
    } else {
        UsageLevel::Normal
    }
}
