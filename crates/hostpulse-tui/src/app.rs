//! Application core: owns the screens and feeds, runs the event loop.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use hostpulse_core::{
    DashboardClient, DashboardConfig, Feed, HostSnapshot, HostSummary, ViewPhase, host_feed,
    overview_feed,
};

use crate::action::Action;
use crate::component::Component;
use crate::data_bridge;
use crate::event::{Event, EventReader, RENDER_RATE, TICK_RATE};
use crate::screen::ScreenId;
use crate::screens::host_detail::HostDetailScreen;
use crate::screens::overview::OverviewScreen;
use crate::theme;
use crate::tui::Tui;

/// The open host detail view: its screen, feed, and bridge.
struct HostView {
    screen: HostDetailScreen,
    feed: Feed<HostSnapshot>,
    bridge: CancellationToken,
}

pub struct App {
    client: DashboardClient,
    config: DashboardConfig,
    running: bool,
    active_screen: ScreenId,
    help_visible: bool,
    overview: OverviewScreen,
    overview_feed: Option<Feed<Vec<HostSummary>>>,
    host: Option<HostView>,
    /// Parent of every bridge token.
    data_cancel: CancellationToken,
    /// True while the active screen waits on its first fetch.
    spinning: watch::Sender<bool>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(client: DashboardClient, config: DashboardConfig) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            client,
            config,
            running: true,
            active_screen: ScreenId::Overview,
            help_visible: false,
            overview: OverviewScreen::new(),
            overview_feed: None,
            host: None,
            data_cancel: CancellationToken::new(),
            spinning: watch::Sender::new(true),
            action_tx,
            action_rx,
        }
    }

    /// Start polling the overview and bridge it into the action channel.
    fn start_overview(&mut self) -> Result<()> {
        let feed = overview_feed(self.client.clone(), &self.config)?;
        data_bridge::spawn_overview(
            feed.subscribe(),
            self.action_tx.clone(),
            self.data_cancel.child_token(),
        );
        self.overview_feed = Some(feed);
        Ok(())
    }

    /// Run the main event loop until quit.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.start_overview()?;

        let mut events = EventReader::new(TICK_RATE, RENDER_RATE, self.spinning.subscribe());

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::FocusGained => {
                    debug!("terminal focused, refreshing");
                    self.action_tx.send(Action::Refresh)?;
                }
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.shutdown();
        events.stop();
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    fn shutdown(&mut self) {
        self.close_host();
        if let Some(mut feed) = self.overview_feed.take() {
            feed.stop();
        }
        self.data_cancel.cancel();
    }

    /// Global keys first, then the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                KeyCode::Char('q') => Some(Action::Quit),
                _ => None,
            });
        }

        match key.code {
            KeyCode::Char('q') => Ok(Some(Action::Quit)),
            KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
            KeyCode::Char('r') => Ok(Some(Action::Refresh)),
            _ => match (self.active_screen, self.host.as_mut()) {
                (ScreenId::HostDetail, Some(view)) => view.screen.handle_key_event(key),
                _ => self.overview.handle_key_event(key),
            },
        }
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::Refresh => self.refresh_active(),
            Action::OpenHost(host_id) => self.open_host(host_id)?,
            Action::GoBack => self.close_host(),
            Action::OverviewUpdated(_) => {
                self.overview.update(action)?;
            }
            Action::HostUpdated { .. } => {
                if let Some(view) = self.host.as_mut() {
                    view.screen.update(action)?;
                }
            }
            Action::Tick => {
                self.overview.update(action)?;
                if let Some(view) = self.host.as_mut() {
                    view.screen.update(action)?;
                }
            }
            Action::Resize(width, height) => debug!(width, height, "terminal resized"),
            Action::Render => {}
        }
        self.sync_spinner();
        Ok(())
    }

    /// Keep the event reader's tick gate in step with the active screen.
    fn sync_spinner(&self) {
        let loading = self.active_phase() == ViewPhase::Initializing;
        self.spinning.send_if_modified(|spinning| {
            let changed = *spinning != loading;
            *spinning = loading;
            changed
        });
    }

    fn refresh_active(&self) {
        match (self.active_screen, self.host.as_ref()) {
            (ScreenId::HostDetail, Some(view)) => {
                debug!(feed = view.feed.name(), "manual refresh");
                drop(view.feed.spawn_refresh());
            }
            _ => {
                if let Some(feed) = self.overview_feed.as_ref() {
                    debug!(feed = feed.name(), "manual refresh");
                    drop(feed.spawn_refresh());
                }
            }
        }
    }

    /// Replace any open detail view with one for `host_id`.
    fn open_host(&mut self, host_id: &str) -> Result<()> {
        self.close_host();

        let feed = host_feed(self.client.clone(), host_id, &self.config)?;
        let bridge = self.data_cancel.child_token();
        data_bridge::spawn_host(
            host_id.to_owned(),
            feed.subscribe(),
            self.action_tx.clone(),
            bridge.clone(),
        );

        info!(host_id, "opened host detail");
        self.host = Some(HostView {
            screen: HostDetailScreen::new(host_id),
            feed,
            bridge,
        });
        self.active_screen = ScreenId::HostDetail;
        Ok(())
    }

    /// Stop the detail feed and return to the overview.
    fn close_host(&mut self) {
        if let Some(mut view) = self.host.take() {
            view.feed.stop();
            view.bridge.cancel();
            debug!(
                screen = view.screen.id(),
                host_id = view.screen.host_id(),
                "closed host detail"
            );
        }
        self.active_screen = ScreenId::Overview;
    }

    fn active_phase(&self) -> ViewPhase {
        match (self.active_screen, self.host.as_ref()) {
            (ScreenId::HostDetail, Some(view)) => view.screen.phase(),
            _ => self.overview.phase(),
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);

        match (self.active_screen, self.host.as_ref()) {
            (ScreenId::HostDetail, Some(view)) => view.screen.render(frame, layout[0]),
            _ => self.overview.render(frame, layout[0]),
        }
        self.render_status_bar(frame, layout[1]);

        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let feed_indicator = match self.active_phase() {
            ViewPhase::Initializing => Span::styled("◐ loading", theme::warning_style()),
            ViewPhase::Ready => Span::styled("● live", Style::default().fg(theme::SUCCESS_GREEN)),
            ViewPhase::ReadyStale => Span::styled("◐ stale", theme::warning_style()),
            ViewPhase::ErrorNoData => Span::styled("○ error", theme::error_style()),
        };

        let mut spans = vec![
            Span::styled(" hostpulse ", theme::title_style()),
            Span::styled(format!("{} ", self.active_screen.label()), theme::table_row()),
            feed_indicator,
            Span::styled(format!("  {}  ", self.config.base_url), theme::key_hint()),
        ];
        if self.active_screen == ScreenId::HostDetail {
            spans.push(Span::styled("Esc ", theme::key_hint_key()));
            spans.push(Span::styled("back  ", theme::key_hint()));
        } else {
            spans.push(Span::styled("Enter ", theme::key_hint_key()));
            spans.push(Span::styled("open  ", theme::key_hint()));
        }
        spans.extend([
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("refresh  ", theme::key_hint()),
            Span::styled("? ", theme::key_hint_key()),
            Span::styled("help  ", theme::key_hint()),
            Span::styled("q ", theme::key_hint_key()),
            Span::styled("quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let help_width = 44u16.min(area.width.saturating_sub(4));
        let help_height = 14u16.min(area.height.saturating_sub(2));

        let x = (area.width.saturating_sub(help_width)) / 2;
        let y = (area.height.saturating_sub(help_height)) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        frame.render_widget(Clear, help_area);
        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));

        let entry = |key: &'static str, desc: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
                Span::styled(desc, theme::key_hint()),
            ])
        };
        let help_text = vec![
            Line::from(""),
            entry("j/k ↑/↓", "Move selection"),
            entry("g/G", "Top / bottom"),
            entry("Enter", "Open host detail"),
            entry("Esc", "Back to overview"),
            Line::from(""),
            entry("r", "Refresh now"),
            entry("?", "Toggle this help"),
            entry("q Ctrl+c", "Quit"),
            Line::from(""),
            Line::from(Span::styled("        Esc or ? to close", theme::key_hint())),
        ];
        frame.render_widget(Paragraph::new(help_text).block(block), help_area);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use hostpulse_core::hostpulse_api::TransportConfig;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::test_support::buffer_text;

    fn app() -> App {
        // Port 9 (discard) refuses connections; feeds fail fast and quietly.
        let config = DashboardConfig {
            base_url: "http://127.0.0.1:9/api/dashboard".into(),
            overview_interval: Duration::from_secs(600),
            detail_interval: Duration::from_secs(600),
            ..DashboardConfig::default()
        };
        let client = DashboardClient::new(&config.base_url, &TransportConfig::default()).unwrap();
        App::new(client, config)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[tokio::test]
    async fn global_keys_map_to_actions() {
        let mut app = app();
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Char('q'))).unwrap(),
            Some(Action::Quit)
        ));
        assert!(matches!(
            app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
                .unwrap(),
            Some(Action::Quit)
        ));
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Char('r'))).unwrap(),
            Some(Action::Refresh)
        ));
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Char('?'))).unwrap(),
            Some(Action::ToggleHelp)
        ));
    }

    #[tokio::test]
    async fn help_overlay_swallows_screen_keys() {
        let mut app = app();
        app.process_action(&Action::ToggleHelp).unwrap();
        assert!(draw(&app).contains("Keyboard Shortcuts"));

        assert!(app.handle_key_event(key(KeyCode::Char('j'))).unwrap().is_none());
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Esc)).unwrap(),
            Some(Action::ToggleHelp)
        ));
    }

    #[tokio::test]
    async fn opening_and_leaving_a_host_manages_its_feed() {
        let mut app = app();
        app.process_action(&Action::OpenHost("web-1".into())).unwrap();
        assert_eq!(app.active_screen, ScreenId::HostDetail);
        let feed_name = app.host.as_ref().map(|v| v.feed.name().to_owned());
        assert_eq!(feed_name.as_deref(), Some("host:web-1"));

        let action = app.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert!(matches!(action, Some(Action::GoBack)));
        app.process_action(&Action::GoBack).unwrap();

        assert_eq!(app.active_screen, ScreenId::Overview);
        assert!(app.host.is_none());
    }

    #[tokio::test]
    async fn opening_another_host_replaces_the_first() {
        let mut app = app();
        app.process_action(&Action::OpenHost("a".into())).unwrap();
        let first_bridge = app.host.as_ref().unwrap().bridge.clone();

        app.process_action(&Action::OpenHost("b".into())).unwrap();
        assert!(first_bridge.is_cancelled());
        assert_eq!(app.host.as_ref().unwrap().screen.host_id(), "b");
    }

    #[tokio::test]
    async fn stale_host_updates_are_dropped_after_leaving() {
        let mut app = app();
        app.process_action(&Action::OpenHost("a".into())).unwrap();
        app.process_action(&Action::GoBack).unwrap();

        app.process_action(&Action::HostUpdated {
            host_id: "a".into(),
            state: hostpulse_core::ViewState::new(),
        })
        .unwrap();
        assert!(app.host.is_none());
        assert_eq!(app.active_screen, ScreenId::Overview);
    }

    #[tokio::test]
    async fn status_bar_shows_screen_and_url() {
        let app = app();
        let text = draw(&app);
        assert!(text.contains("Overview"));
        assert!(text.contains("http://127.0.0.1:9/api/dashboard"));
        assert!(text.contains("◐ loading"));
    }

    #[tokio::test]
    async fn spinner_follows_the_active_screen() {
        let mut app = app();
        let spinning = app.spinning.subscribe();
        assert!(*spinning.borrow());

        let mut loaded = hostpulse_core::ViewState::new();
        let ticket = loaded.begin();
        loaded.apply(ticket, Ok(Vec::new()));
        app.process_action(&Action::OverviewUpdated(loaded)).unwrap();
        assert!(!*spinning.borrow());

        app.process_action(&Action::OpenHost("web-1".into())).unwrap();
        assert!(*spinning.borrow());

        app.process_action(&Action::GoBack).unwrap();
        assert!(!*spinning.borrow());
    }

    #[tokio::test]
    async fn quit_stops_the_loop() {
        let mut app = app();
        app.process_action(&Action::Quit).unwrap();
        assert!(!app.running);
        app.shutdown();
        assert!(app.data_cancel.is_cancelled());
    }
}
