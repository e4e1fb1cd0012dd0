//! Braille line chart for one metric series.
//!
//! Stateless: callers pass the series on every frame.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, BorderType, Borders, Chart, Dataset, GraphType, Paragraph};

use hostpulse_core::MetricSample;
use hostpulse_core::format::{format_network_speed, format_percent};

use crate::theme;

/// How values on the y axis are scaled and labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// Fixed 0..100 axis.
    Percent,
    /// Bytes per second, axis headroom above the peak.
    Rate,
}

/// Upper y bound for `points` under `scale`.
pub fn y_max(points: &[(f64, f64)], scale: Scale) -> f64 {
    match scale {
        Scale::Percent => 100.0,
        Scale::Rate => {
            let peak = points
                .iter()
                .map(|&(_, v)| v)
                .filter(|v| v.is_finite())
                .fold(0.0_f64, f64::max);
            if peak <= 0.0 { 1.0 } else { peak * 1.2 }
        }
    }
}

/// Samples as (index, value) chart points.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn to_points(series: &[MetricSample]) -> Vec<(f64, f64)> {
    series
        .iter()
        .enumerate()
        .map(|(i, s)| (i as f64, s.value))
        .collect()
}

fn axis_label(value: f64, scale: Scale) -> String {
    match scale {
        Scale::Percent => format_percent(value),
        Scale::Rate => format_network_speed(Some(value)),
    }
}

/// Render `series` as a titled line chart, or a placeholder when empty.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    series: &[MetricSample],
    scale: Scale,
    color: Color,
) {
    let block = Block::default()
        .title(format!(" {title} "))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_default());

    if series.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new("  No data available.").style(Style::default().fg(theme::BORDER_GRAY)),
            inner,
        );
        return;
    }

    let points = to_points(series);
    let x_max = points.last().map_or(1.0, |&(x, _)| x.max(1.0));
    let y_max = y_max(&points, scale);
    let label_style = Style::default().fg(theme::BORDER_GRAY);

    let x_labels = match (series.first(), series.last()) {
        (Some(first), Some(last)) => vec![
            Span::styled(first.timestamp.clone(), label_style),
            Span::styled(last.timestamp.clone(), label_style),
        ],
        _ => Vec::new(),
    };
    let y_labels = vec![
        Span::styled(axis_label(0.0, scale), label_style),
        Span::styled(axis_label(y_max / 2.0, scale), label_style),
        Span::styled(axis_label(y_max, scale), label_style),
    ];

    let dataset = Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .labels(x_labels)
                .style(label_style),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, y_max])
                .labels(y_labels)
                .style(label_style),
        );
    frame.render_widget(chart, area);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::test_support::buffer_text;

    fn sample(ts: &str, value: f64) -> MetricSample {
        MetricSample {
            timestamp: ts.into(),
            value,
        }
    }

    #[test]
    fn percent_axis_is_fixed() {
        assert_eq!(y_max(&[(0.0, 12.0)], Scale::Percent), 100.0);
    }

    #[test]
    fn rate_axis_leaves_headroom() {
        let points = [(0.0, 100.0), (1.0, 500.0)];
        assert!((y_max(&points, Scale::Rate) - 600.0).abs() < f64::EPSILON);
        assert_eq!(y_max(&[(0.0, 0.0)], Scale::Rate), 1.0);
    }

    #[test]
    fn points_are_indexed_in_order() {
        let pts = to_points(&[sample("10:00", 1.0), sample("10:01", 3.0)]);
        assert_eq!(pts, vec![(0.0, 1.0), (1.0, 3.0)]);
    }

    #[test]
    fn empty_series_shows_placeholder() {
        let mut terminal = Terminal::new(TestBackend::new(40, 6)).unwrap();
        terminal
            .draw(|f| {
                render(
                    f,
                    f.area(),
                    "CPU Usage History (Last Hour)",
                    &[],
                    Scale::Percent,
                    theme::NEON_CYAN,
                );
            })
            .unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("CPU Usage History (Last Hour)"));
        assert!(text.contains("No data available."));
    }

    #[test]
    fn populated_series_shows_time_labels() {
        let series = [sample("10:00", 20.0), sample("10:30", 40.0), sample("11:00", 30.0)];
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal
            .draw(|f| render(f, f.area(), "CPU", &series, Scale::Percent, theme::NEON_CYAN))
            .unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("10:00"));
        assert!(text.contains("11:00"));
        assert!(!text.contains("No data available."));
    }
}
