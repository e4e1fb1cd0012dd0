//! Horizontal utilisation bars colored by usage level.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use hostpulse_core::format::{bar_fill_pct, format_percent};

use crate::theme;

/// Filled and empty segments of a percentage bar spanning `width` cells.
/// Caller applies styling per segment.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub fn fmt_pct_bar(pct: f64, width: u16) -> (String, String) {
    let clamped = bar_fill_pct(pct, 100.0);
    let filled_count = ((clamped / 100.0) * f64::from(width)).round() as u16;
    let empty_count = width.saturating_sub(filled_count);
    (
        "█".repeat(usize::from(filled_count)),
        "░".repeat(usize::from(empty_count)),
    )
}

/// `███░░░░ 42.0%`, filled part colored by `classify_usage`.
pub fn usage_bar(pct: f64, width: u16) -> Line<'static> {
    let (filled, empty) = fmt_pct_bar(pct, width);
    Line::from(vec![
        Span::styled(filled, Style::default().fg(theme::usage_color(pct))),
        Span::styled(empty, Style::default().fg(theme::BORDER_GRAY)),
        Span::styled(
            format!(" {:>6}", format_percent(pct)),
            Style::default().fg(theme::DIM_WHITE),
        ),
    ])
}
