mod layout;
mod widgets;

use std::{
    io::Stdout,
    time::Duration,
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
    backend::CrosstermBackend,
    style::{Color, Style},
    Terminal,
};
use tui_logger::TuiLoggerWidget;

use crate::{
    channel::{Recv, StateChannel},
    solver::StateSnapshot,
};

use layout::TuiLayout;

const POLL_INTERVAL: Duration = Duration::from_millis(80);
const TITLE_STYLE: Style = Style {
    fg: Some(Color::White),
    bg: None,
    add_modifier: tui::style::Modifier::BOLD,
    sub_modifier: tui::style::Modifier::empty(),
};

/// Owns the terminal for the lifetime of a `solve` run. Construction enters
/// the alternate screen and raw mode; `Drop` always restores the terminal,
/// even if `run` returns early on an error or the process panics.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("Failed to enable terminal raw mode")?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("Failed to initialize terminal backend")?;
        Ok(Self { terminal })
    }

    /// Blocks on `channel` and redraws the table on every snapshot, until
    /// the channel closes. Never touches solver state directly;
    /// everything it knows comes from the `StateSnapshot`s it receives. A
    /// user-requested interrupt (Ctrl+C / Esc / q) closes the channel itself
    /// rather than tearing down the terminal out from under the solver
    /// thread, so the solver always observes the same cancellation path a
    /// misbehaving oracle would trigger.
    pub fn run(&mut self, channel: &StateChannel<StateSnapshot>) -> Result<()> {
        let mut last: Option<StateSnapshot> = None;

        loop {
            if poll_for_interrupt()? {
                channel.close();
            }

            match channel.get_timeout(POLL_INTERVAL) {
                Ok(Recv::Value(snapshot)) => {
                    self.draw(&snapshot)?;
                    last = Some(snapshot);
                }
                Ok(Recv::Closed) => {
                    if let Some(snapshot) = &last {
                        self.draw(snapshot)?;
                    }
                    return Ok(());
                }
                Err(_timeout) => {
                    if let Some(snapshot) = &last {
                        self.draw(snapshot)?;
                    }
                    if channel.is_closed() {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn draw(&mut self, snapshot: &StateSnapshot) -> Result<()> {
        self.terminal
            .draw(|frame| {
                let regions = TuiLayout::calculate(frame.size());

                let table = widgets::build_block_table(TITLE_STYLE, snapshot);
                frame.render_widget(table, regions.block_table_area());

                let border = widgets::build_status_panel_border(TITLE_STYLE);
                frame.render_widget(border, regions.status_panel_area());

                let (solved, total) = count_solved_bytes(snapshot);
                let gauge = widgets::build_progress_bar(solved, total);
                frame.render_widget(gauge, regions.progress_bar_area());

                let log_widget = TuiLoggerWidget::default()
                    .block(widgets::build_log_view(TITLE_STYLE))
                    .style_error(Style::default().fg(Color::Red))
                    .style_warn(Style::default().fg(Color::Yellow))
                    .style_info(Style::default().fg(Color::Cyan));
                frame.render_widget(log_widget, regions.logs_area());
            })
            .context("Failed to draw TUI frame")?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

fn count_solved_bytes(snapshot: &StateSnapshot) -> (usize, usize) {
    let total = snapshot.block_count * snapshot.block_size.as_usize();
    let solved = snapshot
        .plaintext
        .iter()
        .skip(1)
        .flat_map(|block| block.0.iter())
        .filter(|slot| slot.is_solved())
        .count();
    (solved, total)
}

fn poll_for_interrupt() -> Result<bool> {
    if !event::poll(Duration::from_millis(0)).context("Failed to poll terminal events")? {
        return Ok(false);
    }
    if let Event::Key(key) = event::read().context("Failed to read terminal event")? {
        let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
        let quit_key = matches!(key.code, KeyCode::Char('q') | KeyCode::Esc);
        return Ok(ctrl_c || quit_key);
    }
    Ok(false)
}
