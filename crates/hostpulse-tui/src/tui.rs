//! Terminal setup, restoration, and panic-safe cleanup, plus the guard
//! that keeps the dashboard from rendering into a window too small for it.

use std::io::{Stdout, stdout};

use color_eyre::eyre::Result;
use crossterm::{
    ExecutableCommand, cursor,
    event::{DisableFocusChange, EnableFocusChange},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal, backend::CrosstermBackend};

use crate::theme;

pub type Backend = CrosstermBackend<Stdout>;

/// Smallest window the overview table and status bar fit in.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 12;

/// Owns the terminal for the lifetime of the app. Dropping it restores
/// the shell's screen.
pub struct Tui {
    pub terminal: Terminal<Backend>,
}

impl Tui {
    /// Does not enter raw mode yet.
    pub fn new() -> Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        Ok(Self { terminal })
    }

    /// Alternate screen, raw mode, hidden cursor. Focus reporting is on so
    /// returning to the window can trigger a refresh.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        stdout().execute(EnableFocusChange)?;
        stdout().execute(cursor::Hide)?;
        self.terminal.clear()?;
        Ok(())
    }

    pub fn exit(&mut self) {
        restore_terminal();
    }

    /// Draw one frame, or the size notice if the window is too small.
    pub fn draw<F>(&mut self, render: F) -> Result<()>
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal.draw(|frame| draw_guarded(frame, render))?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        self.exit();
    }
}

fn fits(area: Rect) -> bool {
    area.width >= MIN_WIDTH && area.height >= MIN_HEIGHT
}

pub fn draw_guarded<F>(frame: &mut Frame, render: F)
where
    F: FnOnce(&mut Frame),
{
    let area = frame.area();
    if fits(area) {
        render(frame);
        return;
    }

    let notice = vec![
        Line::from(Span::styled("Terminal too small", theme::warning_style())),
        Line::from(Span::styled(
            format!("{}x{} (need {MIN_WIDTH}x{MIN_HEIGHT})", area.width, area.height),
            theme::key_hint(),
        )),
    ];
    let top = area.height.saturating_sub(2) / 2;
    let rows = Rect::new(area.x, area.y + top, area.width, area.height.min(2));
    frame.render_widget(Paragraph::new(notice).alignment(Alignment::Center), rows);
}

/// Best-effort: every step runs even if an earlier one fails.
fn restore_terminal() {
    let _ = stdout().execute(cursor::Show);
    let _ = stdout().execute(DisableFocusChange);
    let _ = stdout().execute(LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

/// Install panic and error hooks that restore the terminal before printing.
///
/// Call before entering the terminal so init panics print cleanly too.
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .into_hooks();

    eyre_hook.install()?;

    let panic_hook = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        panic_hook(info);
    }));

    Ok(())
}
