//! Host detail screen: info cards, metric history charts, top processes.
//!
//! Bound to one host id for its lifetime; the app builds a fresh screen
//! (and feed) for every host opened.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table};

use hostpulse_core::format::{bar_fill_pct, format_gb, format_network_speed, format_percent, or_na};
use hostpulse_core::{HostDetail, HostSnapshot, MetricName, ViewPhase, ViewState};

use crate::action::Action;
use crate::component::Component;
use crate::screens::fmt_age;
use crate::theme;
use crate::widgets::metric_chart::{self, Scale};
use crate::widgets::{pct_bar, status_indicator};

const BAR_WIDTH: u16 = 12;

/// Chart title, series, and color for each of the four history panels.
const CHARTS: [(&str, MetricName, Color); 4] = [
    ("CPU Usage History (Last Hour)", MetricName::CpuUsagePercent, theme::NEON_CYAN),
    ("Memory Usage History (Last Hour)", MetricName::MemUsagePercent, theme::ELECTRIC_PURPLE),
    ("Network Upload History (Last Hour)", MetricName::NetUploadBytesSec, theme::CORAL),
    ("Network Download History (Last Hour)", MetricName::NetDownloadBytesSec, theme::LIGHT_BLUE),
];

pub struct HostDetailScreen {
    host_id: String,
    state: ViewState<HostSnapshot>,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

impl HostDetailScreen {
    pub fn new(host_id: impl Into<String>) -> Self {
        Self {
            host_id: host_id.into(),
            state: ViewState::new(),
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    pub fn host_id(&self) -> &str {
        &self.host_id
    }

    pub fn phase(&self) -> ViewPhase {
        self.state.phase()
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_loading(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

        let throbber = throbber_widgets_tui::Throbber::default()
            .label(format!("  Loading host {}...", self.host_id))
            .style(Style::default().fg(theme::NEON_CYAN))
            .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
        frame.render_stateful_widget(throbber, layout[1], &mut self.throbber_state.clone());
    }

    fn render_error(&self, frame: &mut Frame, area: Rect) {
        let message = self.state.error.as_deref().unwrap_or("Unknown error");
        let block = Block::default()
            .title(format!(" {} ", self.host_id))
            .title_style(theme::error_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::ERROR_RED));

        let text = vec![
            Line::from(""),
            Line::from(Span::styled("Failed to load host", theme::error_style())),
            Line::from(""),
            Line::from(Span::styled(message.to_owned(), theme::table_row())),
            Line::from(""),
            Line::from(vec![
                Span::styled("r", theme::key_hint_key()),
                Span::styled(" retry  ", theme::key_hint()),
                Span::styled("Esc", theme::key_hint_key()),
                Span::styled(" back", theme::key_hint()),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(text).alignment(Alignment::Center).block(block),
            area,
        );
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, d: &HostDetail) {
        let mut spans = vec![
            Span::styled(format!(" {} ", d.hostname), theme::title_style()),
            status_indicator::status_span(d.status),
            Span::styled(format!("  last seen {}", or_na(Some(d.last_seen.as_str()))), theme::key_hint()),
        ];
        if let Some(age) = self.state.data_age() {
            spans.push(Span::styled(
                format!("  · updated {} ago", fmt_age(age)),
                theme::key_hint(),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_stale_note(&self, frame: &mut Frame, area: Rect) {
        let err = self.state.error.as_deref().unwrap_or_default();
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" Last update failed. Showing stale data. Error: {err}"),
                theme::warning_style(),
            )),
            area,
        );
    }

    fn card(frame: &mut Frame, area: Rect, title: &str, body: Vec<Line<'static>>) {
        let block = Block::default()
            .title(format!(" {title} "))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        frame.render_widget(Paragraph::new(body).block(block), area);
    }

    fn render_cards(frame: &mut Frame, area: Rect, d: &HostDetail) {
        let cols = Layout::horizontal([Constraint::Ratio(1, 5); 5]).split(area);
        let label = |s: &str| Span::styled(s.to_owned(), theme::key_hint());
        let value = |s: String| Span::styled(s, theme::table_row());

        let os = &d.os;
        let os_name = match (os.name.as_deref(), os.version.as_deref()) {
            (Some(n), Some(v)) if !v.trim().is_empty() => format!("{n} {v}"),
            (n, _) => or_na(n).to_owned(),
        };
        Self::card(
            frame,
            cols[0],
            "OS",
            vec![
                Line::from(value(os_name)),
                Line::from(vec![label("Kernel "), value(or_na(os.kernel.as_deref()).to_owned())]),
                Line::from(vec![
                    label("Arch   "),
                    value(or_na(os.architecture.as_deref()).to_owned()),
                ]),
            ],
        );

        Self::card(
            frame,
            cols[1],
            "CPU",
            vec![
                Line::from(vec![label("Cores "), value(d.cpu.cores.to_string())]),
                Line::from(value(or_na(Some(d.cpu.model_name.as_str())).to_owned())),
                pct_bar::usage_bar(d.cpu_usage, BAR_WIDTH),
            ],
        );

        let mem = &d.memory;
        Self::card(
            frame,
            cols[2],
            "Memory",
            vec![
                Line::from(vec![
                    label("Used "),
                    value(format!("{} / {}", format_gb(mem.used), format_gb(mem.total))),
                ]),
                Line::from(vec![label("Free "), value(format_gb(mem.free))]),
                pct_bar::usage_bar(bar_fill_pct(mem.used, mem.total), BAR_WIDTH),
            ],
        );

        let disk = &d.disk;
        Self::card(
            frame,
            cols[3],
            "Disk",
            vec![
                Line::from(vec![label("Path "), value(or_na(Some(disk.path.as_str())).to_owned())]),
                Line::from(vec![
                    label("Used "),
                    value(format!("{} / {}", format_gb(disk.used_gb), format_gb(disk.total_gb))),
                ]),
                pct_bar::usage_bar(disk.usage_percent, BAR_WIDTH),
            ],
        );

        Self::card(
            frame,
            cols[4],
            "Network",
            vec![
                Line::from(vec![
                    label("↑ "),
                    Span::styled(
                        format_network_speed(Some(d.network_upload)),
                        Style::default().fg(theme::CORAL),
                    ),
                ]),
                Line::from(vec![
                    label("↓ "),
                    Span::styled(
                        format_network_speed(Some(d.network_download)),
                        Style::default().fg(theme::LIGHT_BLUE),
                    ),
                ]),
            ],
        );
    }

    fn render_charts(frame: &mut Frame, area: Rect, snapshot: &HostSnapshot) {
        let rows = Layout::vertical([Constraint::Ratio(1, 2); 2]).split(area);
        let cells: Vec<Rect> = rows
            .iter()
            .flat_map(|row| Layout::horizontal([Constraint::Ratio(1, 2); 2]).split(*row).to_vec())
            .collect();

        for ((title, metric, color), cell) in CHARTS.iter().zip(cells) {
            let scale = if metric.is_rate() { Scale::Rate } else { Scale::Percent };
            metric_chart::render(frame, cell, title, snapshot.series(metric), scale, *color);
        }
    }

    fn render_processes(frame: &mut Frame, area: Rect, d: &HostDetail) {
        let block = Block::default()
            .title(" Top Processes ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());

        let processes = d.processes();
        if processes.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new("No high-usage processes reported recently.")
                    .style(Style::default().fg(theme::BORDER_GRAY)),
                inner,
            );
            return;
        }

        let header = Row::new(
            ["PID", "Name", "CPU %", "Mem %"]
                .into_iter()
                .map(|h| Cell::from(h).style(theme::table_header())),
        );
        let rows = processes.iter().map(|p| {
            Row::new(vec![
                Cell::from(p.pid.to_string()).style(theme::key_hint()),
                Cell::from(p.name.clone()).style(theme::table_row()),
                Cell::from(format_percent(p.cpu_usage))
                    .style(Style::default().fg(theme::usage_color(p.cpu_usage))),
                Cell::from(format_percent(p.memory_usage))
                    .style(Style::default().fg(theme::usage_color(p.memory_usage))),
            ])
        });
        let widths = [
            Constraint::Length(8),
            Constraint::Min(20),
            Constraint::Length(8),
            Constraint::Length(8),
        ];
        frame.render_widget(Table::new(rows, widths).header(header).block(block), area);
    }

    fn render_ready(&self, frame: &mut Frame, area: Rect, snapshot: &HostSnapshot) {
        let d = &snapshot.details;
        let stale_rows = u16::from(self.state.is_stale());
        let process_rows = u16::try_from(d.processes().len()).unwrap_or(u16::MAX);
        let process_height = process_rows.saturating_add(3).clamp(3, 10);

        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(stale_rows),
            Constraint::Length(5),
            Constraint::Min(8),
            Constraint::Length(process_height),
        ])
        .split(area);

        self.render_header(frame, layout[0], d);
        if self.state.is_stale() {
            self.render_stale_note(frame, layout[1]);
        }
        Self::render_cards(frame, layout[2], d);
        Self::render_charts(frame, layout[3], snapshot);
        Self::render_processes(frame, layout[4], d);
    }
}

impl Component for HostDetailScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => {
                Ok(Some(Action::GoBack))
            }
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::HostUpdated { host_id, state } if *host_id == self.host_id => {
                self.state = state.clone();
            }
            Action::Tick if self.state.phase() == ViewPhase::Initializing => {
                self.throbber_state.calc_next();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        match (self.state.phase(), self.state.data.as_ref()) {
            (ViewPhase::ErrorNoData, _) => self.render_error(frame, area),
            (_, Some(snapshot)) => self.render_ready(frame, area, snapshot),
            (_, None) => self.render_loading(frame, area),
        }
    }

    fn id(&self) -> &str {
        "host-detail"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::KeyModifiers;
    use hostpulse_core::{MetricSample, RequestError};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::test_support::buffer_text;

    fn details(json: &str) -> HostDetail {
        serde_json::from_str(json).unwrap()
    }

    fn snapshot(d: HostDetail, cpu: Vec<MetricSample>) -> HostSnapshot {
        HostSnapshot {
            details: d,
            cpu,
            memory: Vec::new(),
            net_upload: Vec::new(),
            net_download: Vec::new(),
        }
    }

    fn applied(result: Result<HostSnapshot, RequestError>) -> ViewState<HostSnapshot> {
        let mut state = ViewState::new();
        let ticket = state.begin();
        state.apply(ticket, result);
        state
    }

    fn screen_with(id: &str, state: ViewState<HostSnapshot>) -> HostDetailScreen {
        let mut screen = HostDetailScreen::new(id);
        screen
            .update(&Action::HostUpdated {
                host_id: id.into(),
                state,
            })
            .unwrap();
        screen
    }

    fn draw(screen: &HostDetailScreen) -> String {
        let mut terminal = Terminal::new(TestBackend::new(200, 40)).unwrap();
        terminal.draw(|f| screen.render(f, f.area())).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    const FULL: &str = r#"{
        "id": "h1", "hostname": "web-1.lan", "status": "online",
        "lastSeen": "2026-01-01T10:00:00Z",
        "cpu": { "cores": 8, "model_name": "EPYC 7302" },
        "memory": { "total": 16.0, "used": 8.0, "free": 8.0 },
        "disk": { "path": "/", "total_gb": 100.0, "used_gb": 40.0, "free_gb": 60.0, "usage_percent": 40.0 },
        "os": { "name": "Debian", "version": "12", "kernel": "6.1.0", "kernelArch": "x86_64" },
        "processes": [ { "pid": 4242, "name": "postgres", "cpuUsage": 33.3, "memoryUsage": 12.5 } ],
        "cpuUsage": 42.0, "ramUsage": 50.0, "networkUpload": 2048.0, "networkDownload": 1048576.0
    }"#;

    #[test]
    fn ready_state_renders_cards_charts_and_processes() {
        let cpu = vec![
            MetricSample { timestamp: "10:00".into(), value: 20.0 },
            MetricSample { timestamp: "10:30".into(), value: 35.0 },
        ];
        let screen = screen_with("h1", applied(Ok(snapshot(details(FULL), cpu))));
        let text = draw(&screen);

        assert!(text.contains("web-1.lan"));
        assert!(text.contains("Debian 12"));
        assert!(text.contains("x86_64"));
        assert!(text.contains("EPYC 7302"));
        assert!(text.contains("8.0 GB / 16.0 GB"));
        assert!(text.contains("2.0 KB/s"));
        assert!(text.contains("1.0 MB/s"));
        assert!(text.contains("CPU Usage History (Last Hour)"));
        assert!(text.contains("Network Download History (Last Hour)"));
        assert!(text.contains("No data available."));
        assert!(text.contains("postgres"));
        assert!(text.contains("33.3%"));
    }

    #[test]
    fn sparse_host_falls_back_to_na() {
        let d = details(r#"{ "id": "h2", "hostname": "bare" }"#);
        let screen = screen_with("h2", applied(Ok(snapshot(d, Vec::new()))));
        let text = draw(&screen);

        assert!(text.contains("N/A"));
        assert!(text.contains("No high-usage processes reported recently."));
    }

    #[test]
    fn failed_refresh_shows_stale_note() {
        let mut state = applied(Ok(snapshot(details(FULL), Vec::new())));
        let ticket = state.begin();
        state.apply(ticket, Err(RequestError::new("HTTP error 502")));
        let screen = screen_with("h1", state);
        let text = draw(&screen);

        assert!(text.contains("Last update failed. Showing stale data. Error: HTTP error 502"));
        assert!(text.contains("web-1.lan"));
    }

    #[test]
    fn error_without_data_shows_message() {
        let screen = screen_with("h9", applied(Err(RequestError::new("host not found"))));
        let text = draw(&screen);
        assert!(text.contains("Failed to load host"));
        assert!(text.contains("host not found"));
    }

    #[test]
    fn updates_for_other_hosts_are_ignored() {
        let mut screen = HostDetailScreen::new("h1");
        screen
            .update(&Action::HostUpdated {
                host_id: "h2".into(),
                state: applied(Err(RequestError::new("nope"))),
            })
            .unwrap();
        assert!(draw(&screen).contains("Loading host h1..."));
    }

    #[test]
    fn escape_goes_back() {
        let mut screen = HostDetailScreen::new("h1");
        let action = screen
            .handle_key_event(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))
            .unwrap();
        assert!(matches!(action, Some(Action::GoBack)));
        assert_eq!(screen.host_id(), "h1");
    }
}
