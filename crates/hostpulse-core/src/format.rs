//! Human-readable formatting for rates, percentages, and sizes.

const KIB: f64 = 1024.0;

/// Format a byte rate with 1024-based units: `B/s`, `KB/s`, `MB/s`.
///
/// `None` and non-finite inputs render as `N/A`.
pub fn format_network_speed(bytes_per_sec: Option<f64>) -> String {
    let Some(bps) = bytes_per_sec.filter(|v| v.is_finite()) else {
        return "N/A".into();
    };
    if bps < KIB {
        return format!("{bps:.1} B/s");
    }
    let kbps = bps / KIB;
    if kbps < KIB {
        return format!("{kbps:.1} KB/s");
    }
    format!("{:.1} MB/s", kbps / KIB)
}

/// `"42.0%"`
pub fn format_percent(pct: f64) -> String {
    format!("{pct:.1}%")
}

/// `"15.5 GB"`
pub fn format_gb(gb: f64) -> String {
    format!("{gb:.1} GB")
}

/// Fill level of a progress bar: `value / max` as a percentage, capped at 100.
/// A non-positive `max` yields 0.
pub fn bar_fill_pct(value: f64, max: f64) -> f64 {
    if max <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    (value / max * 100.0).clamp(0.0, 100.0)
}

/// `"1 host found"` / `"3 hosts found"`
pub fn host_count_label(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} host{plural} found")
}

/// Substitute `N/A` for a missing or blank text field.
pub fn or_na(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("N/A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_speed_examples() {
        assert_eq!(format_network_speed(Some(500.0)), "500.0 B/s");
        assert_eq!(format_network_speed(Some(2048.0)), "2.0 KB/s");
        assert_eq!(format_network_speed(Some(3.0 * 1024.0 * 1024.0)), "3.0 MB/s");
    }

    #[test]
    fn network_speed_unit_edges() {
        assert_eq!(format_network_speed(Some(0.0)), "0.0 B/s");
        assert_eq!(format_network_speed(Some(1023.0)), "1023.0 B/s");
        assert_eq!(format_network_speed(Some(1024.0)), "1.0 KB/s");
        assert_eq!(format_network_speed(Some(1024.0 * 1024.0)), "1.0 MB/s");
        assert_eq!(format_network_speed(None), "N/A");
        assert_eq!(format_network_speed(Some(f64::NAN)), "N/A");
    }

    #[test]
    fn percent_and_gb() {
        assert_eq!(format_percent(50.0), "50.0%");
        assert_eq!(format_percent(33.333), "33.3%");
        assert_eq!(format_gb(15.56), "15.6 GB");
    }

    #[test]
    fn bar_fill_is_capped() {
        assert_eq!(bar_fill_pct(50.0, 100.0), 50.0);
        assert_eq!(bar_fill_pct(150.0, 100.0), 100.0);
        assert_eq!(bar_fill_pct(3.0, 12.0), 25.0);
        assert_eq!(bar_fill_pct(10.0, 0.0), 0.0);
    }

    #[test]
    fn host_count_pluralizes() {
        assert_eq!(host_count_label(0), "0 hosts found");
        assert_eq!(host_count_label(1), "1 host found");
        assert_eq!(host_count_label(3), "3 hosts found");
    }

    #[test]
    fn missing_text_is_na() {
        assert_eq!(or_na(None), "N/A");
        assert_eq!(or_na(Some("  ")), "N/A");
        assert_eq!(or_na(Some("Debian")), "Debian");
    }
}
