//! Overview screen: fleet stat cards and the host table.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use hostpulse_core::format::{format_network_speed, format_percent, host_count_label};
use hostpulse_core::{DashboardAggregate, HostSummary, ViewPhase, ViewState};

use crate::action::Action;
use crate::component::Component;
use crate::screens::fmt_age;
use crate::theme;
use crate::widgets::{pct_bar, status_indicator};

const BAR_WIDTH: u16 = 10;

pub struct OverviewScreen {
    state: ViewState<Vec<HostSummary>>,
    table_state: TableState,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

impl Default for OverviewScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl OverviewScreen {
    pub fn new() -> Self {
        Self {
            state: ViewState::new(),
            table_state: TableState::default().with_selected(Some(0)),
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    pub fn phase(&self) -> ViewPhase {
        self.state.phase()
    }

    fn hosts(&self) -> &[HostSummary] {
        self.state.data.as_deref().unwrap_or_default()
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    pub fn selected_host(&self) -> Option<&HostSummary> {
        self.hosts().get(self.selected_index())
    }

    fn select(&mut self, idx: usize) {
        let len = self.hosts().len();
        let clamped = if len == 0 { 0 } else { idx.min(len - 1) };
        self.table_state.select(Some(clamped));
    }

    fn move_selection(&mut self, delta: isize) {
        let next = self.selected_index().saturating_add_signed(delta);
        self.select(next);
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
            .label("  Loading hosts...")
            .style(Style::default().fg(theme::NEON_CYAN))
            .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
        frame.render_stateful_widget(throbber, layout[1], &mut self.throbber_state.clone());
    }

    fn render_error(&self, frame: &mut Frame, area: Rect) {
        let message = self.state.error.as_deref().unwrap_or("Unknown error");
        let block = Block::default()
            .title(" Connection Error ")
            .title_style(theme::error_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::ERROR_RED));

        let text = vec![
            Line::from(""),
            Line::from(Span::styled("Connection Error", theme::error_style())),
            Line::from(""),
            Line::from(Span::styled(message.to_owned(), theme::table_row())),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", theme::key_hint()),
                Span::styled("r", theme::key_hint_key()),
                Span::styled(" to retry", theme::key_hint()),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(text).alignment(Alignment::Center).block(block),
            area,
        );
    }

    fn render_cards(frame: &mut Frame, area: Rect, agg: &DashboardAggregate) {
        let cols = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(area);

        let cards: [(&str, String, Line<'static>); 4] = [
            (
                "Total Hosts",
                agg.total.to_string(),
                Line::from(Span::styled("monitored", theme::key_hint())),
            ),
            (
                "Online",
                agg.online.to_string(),
                Line::from(Span::styled(
                    format!("{:.1}% availability", agg.availability_pct()),
                    Style::default().fg(theme::SUCCESS_GREEN),
                )),
            ),
            (
                "Avg CPU",
                format_percent(agg.avg_cpu),
                pct_bar::usage_bar(agg.avg_cpu, BAR_WIDTH),
            ),
            (
                "Avg Memory",
                format_percent(agg.avg_memory),
                pct_bar::usage_bar(agg.avg_memory, BAR_WIDTH),
            ),
        ];

        for ((title, value, footer), col) in cards.into_iter().zip(cols.iter()) {
            let block = Block::default()
                .title(format!(" {title} "))
                .title_style(theme::title_style())
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(theme::border_default());
            let body = vec![Line::from(Span::styled(value, theme::stat_value())), footer];
            frame.render_widget(Paragraph::new(body).block(block), *col);
        }
    }

    fn render_banner(&self, frame: &mut Frame, area: Rect) {
        let line = if self.state.is_stale() {
            let err = self.state.error.as_deref().unwrap_or_default();
            Line::from(Span::styled(
                format!(" Update failed - showing cached data ({err})"),
                theme::warning_style(),
            ))
        } else {
            let age = self
                .state
                .data_age()
                .map_or_else(|| "just now".to_owned(), |a| format!("{} ago", fmt_age(a)));
            Line::from(Span::styled(format!(" Last updated {age}"), theme::key_hint()))
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let hosts = self.hosts();
        let block = Block::default()
            .title(format!(" Hosts · {} ", host_count_label(hosts.len())))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        if hosts.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new("No hosts found")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(theme::BORDER_GRAY)),
                inner,
            );
            return;
        }

        let header = Row::new(
            ["Status", "Hostname", "CPU", "RAM", "Disk", "↑ Up", "↓ Down", "Last Seen"]
                .into_iter()
                .map(|h| Cell::from(h).style(theme::table_header())),
        );

        let rows = hosts.iter().map(|h| {
            Row::new(vec![
                Cell::from(status_indicator::status_span(h.status)),
                Cell::from(h.hostname.clone()).style(theme::table_row()),
                Cell::from(pct_bar::usage_bar(h.cpu_usage, BAR_WIDTH)),
                Cell::from(pct_bar::usage_bar(h.ram_usage, BAR_WIDTH)),
                Cell::from(pct_bar::usage_bar(h.disk_usage, BAR_WIDTH)),
                Cell::from(format_network_speed(Some(h.network_upload)))
                    .style(Style::default().fg(theme::CORAL)),
                Cell::from(format_network_speed(Some(h.network_download)))
                    .style(Style::default().fg(theme::LIGHT_BLUE)),
                Cell::from(h.last_seen.clone()).style(theme::key_hint()),
            ])
        });

        let bar = BAR_WIDTH + 7;
        let widths = [
            Constraint::Length(10),
            Constraint::Min(16),
            Constraint::Length(bar),
            Constraint::Length(bar),
            Constraint::Length(bar),
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Length(22),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state;
        frame.render_stateful_widget(table, area, &mut state);
    }
}

impl Component for OverviewScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                Ok(None)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                Ok(None)
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.select(0);
                Ok(None)
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.select(usize::MAX);
                Ok(None)
            }
            KeyCode::Enter => Ok(self.selected_host().map(|h| Action::OpenHost(h.id.clone()))),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::OverviewUpdated(state) => {
                self.state = state.clone();
                self.select(self.selected_index());
            }
            Action::Tick if self.state.phase() == ViewPhase::Initializing => {
                self.throbber_state.calc_next();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        match self.state.phase() {
            ViewPhase::Initializing => self.render_loading(frame, area),
            ViewPhase::ErrorNoData => self.render_error(frame, area),
            ViewPhase::Ready | ViewPhase::ReadyStale => {
                let layout = Layout::vertical([
                    Constraint::Length(4),
                    Constraint::Length(1),
                    Constraint::Min(3),
                ])
                .split(area);

                let agg = DashboardAggregate::from_hosts(self.hosts());
                Self::render_cards(frame, layout[0], &agg);
                self.render_banner(frame, layout[1]);
                self.render_table(frame, layout[2]);
            }
        }
    }

    fn id(&self) -> &str {
        "overview"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::KeyModifiers;
    use hostpulse_core::{HostStatus, RequestError};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::test_support::buffer_text;

    fn host(id: &str, status: HostStatus, cpu: f64) -> HostSummary {
        HostSummary {
            id: id.into(),
            hostname: format!("{id}.lan"),
            status,
            cpu_usage: cpu,
            ram_usage: 40.0,
            disk_usage: 55.0,
            network_upload: 2048.0,
            network_download: 512.0,
            last_seen: "2026-01-01T10:00:00Z".into(),
        }
    }

    fn with_result(result: Result<Vec<HostSummary>, RequestError>) -> ViewState<Vec<HostSummary>> {
        let mut state = ViewState::new();
        let ticket = state.begin();
        state.apply(ticket, result);
        state
    }

    fn screen_with(state: ViewState<Vec<HostSummary>>) -> OverviewScreen {
        let mut screen = OverviewScreen::new();
        screen.update(&Action::OverviewUpdated(state)).unwrap();
        screen
    }

    fn draw(screen: &OverviewScreen, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| screen.render(f, f.area())).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn fleet() -> Vec<HostSummary> {
        vec![
            host("web-1", HostStatus::Online, 10.0),
            host("web-2", HostStatus::Warning, 50.0),
            host("db-1", HostStatus::Offline, 90.0),
        ]
    }

    #[test]
    fn loading_state_shows_throbber_label() {
        let text = draw(&OverviewScreen::new(), 80, 10);
        assert!(text.contains("Loading hosts..."));
    }

    #[test]
    fn error_without_data_offers_retry() {
        let screen = screen_with(with_result(Err(RequestError::new("database unavailable"))));
        let text = draw(&screen, 80, 12);
        assert!(text.contains("Connection Error"));
        assert!(text.contains("database unavailable"));
        assert!(text.contains("to retry"));
    }

    #[test]
    fn ready_state_shows_cards_and_hosts() {
        let screen = screen_with(with_result(Ok(fleet())));
        let text = draw(&screen, 160, 16);
        assert!(text.contains("Total Hosts"));
        assert!(text.contains("33.3% availability"));
        assert!(text.contains("50.0%"));
        assert!(text.contains("3 hosts found"));
        assert!(text.contains("web-2.lan"));
        assert!(text.contains("2.0 KB/s"));
        assert!(text.contains("Last updated"));
    }

    #[test]
    fn empty_fleet_says_no_hosts() {
        let screen = screen_with(with_result(Ok(Vec::new())));
        let text = draw(&screen, 120, 14);
        assert!(text.contains("No hosts found"));
        assert!(text.contains("0 hosts found"));
    }

    #[test]
    fn failed_refresh_keeps_rows_with_banner() {
        let mut state = with_result(Ok(fleet()));
        let ticket = state.begin();
        state.apply(ticket, Err(RequestError::new("HTTP error 503")));
        let screen = screen_with(state);

        let text = draw(&screen, 160, 16);
        assert!(text.contains("Update failed - showing cached data (HTTP error 503)"));
        assert!(text.contains("db-1.lan"));
    }

    #[test]
    fn navigation_and_enter_open_selected_host() {
        let mut screen = screen_with(with_result(Ok(fleet())));

        screen.handle_key_event(key(KeyCode::Char('j'))).unwrap();
        let action = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(matches!(action, Some(Action::OpenHost(ref id)) if id == "web-2"));

        screen.handle_key_event(key(KeyCode::Char('G'))).unwrap();
        assert_eq!(screen.selected_host().unwrap().id, "db-1");

        screen.handle_key_event(key(KeyCode::Char('j'))).unwrap();
        assert_eq!(screen.selected_host().unwrap().id, "db-1");

        screen.handle_key_event(key(KeyCode::Char('g'))).unwrap();
        screen.handle_key_event(key(KeyCode::Char('k'))).unwrap();
        assert_eq!(screen.selected_host().unwrap().id, "web-1");
    }

    #[test]
    fn enter_without_hosts_does_nothing() {
        let mut screen = screen_with(with_result(Ok(Vec::new())));
        assert!(screen.handle_key_event(key(KeyCode::Enter)).unwrap().is_none());
    }

    #[test]
    fn selection_clamps_when_list_shrinks() {
        let mut screen = screen_with(with_result(Ok(fleet())));
        screen.handle_key_event(key(KeyCode::Char('G'))).unwrap();

        screen
            .update(&Action::OverviewUpdated(with_result(Ok(vec![host(
                "solo",
                HostStatus::Online,
                1.0,
            )]))))
            .unwrap();
        assert_eq!(screen.selected_host().unwrap().id, "solo");
    }
}
