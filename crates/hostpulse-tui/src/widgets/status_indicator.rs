//! Host status dot: ●/◐/○ with color mapping.

use ratatui::style::Style;
use ratatui::text::Span;

use hostpulse_core::HostStatus;

use crate::theme;

pub fn status_char(status: HostStatus) -> &'static str {
    match status {
        HostStatus::Online => "●",
        HostStatus::Warning => "◐",
        HostStatus::Offline => "○",
    }
}

/// Styled dot followed by the status word, e.g. `● online`.
pub fn status_span(status: HostStatus) -> Span<'static> {
    Span::styled(
        format!("{} {status}", status_char(status)),
        Style::default().fg(theme::status_color(status)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_status_has_its_own_dot() {
        assert_eq!(status_char(HostStatus::Online), "●");
        assert_eq!(status_char(HostStatus::Warning), "◐");
        assert_eq!(status_char(HostStatus::Offline), "○");
    }

    #[test]
    fn span_carries_status_word_and_color() {
        let span = status_span(HostStatus::Warning);
        assert_eq!(span.content, "◐ warning");
        assert_eq!(span.style.fg, Some(theme::ELECTRIC_YELLOW));
    }
}
