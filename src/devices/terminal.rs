//! Terminal preview using crossterm.
//!
//! Each device draws its LED grid as true-color cells in its own band of
//! rows. [`TerminalSession`] owns the alternate screen and raw mode.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{self, Color as TermColor, Stylize},
    terminal, ExecutableCommand, QueueableCommand,
};
use rgbscape_device::{DeviceError, UpdateSink};
use rgbscape_model::{Color, LedId};

/// Width of each cell in characters.
const CELL_W: u16 = 4;
/// Unlit cells.
const DIM: TermColor = TermColor::Rgb {
    r: 40,
    g: 40,
    b: 40,
};

fn to_u16(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Draws one device's LEDs as a `cols`-wide grid starting at terminal row `top`
pub struct TerminalSink {
    label: String,
    top: u16,
    cols: u32,
    rows: u32,
}

impl TerminalSink {
    pub fn new(label: impl Into<String>, top: u16, rows: u32, cols: u32) -> Self {
        Self {
            label: label.into(),
            top,
            cols: cols.max(1),
            rows,
        }
    }

    /// Terminal rows this sink occupies, label included
    pub fn height(&self) -> u16 {
        to_u16(self.rows).saturating_add(1)
    }

    fn cell(&self, id: LedId) -> (u16, u16) {
        let col = id.0 % self.cols;
        let row = id.0 / self.cols;
        (
            to_u16(col).saturating_mul(CELL_W),
            self.top.saturating_add(1).saturating_add(to_u16(row)),
        )
    }

    fn draw(&self, batch: &[(LedId, Option<Color>)]) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.queue(cursor::MoveTo(0, self.top))?;
        stdout.queue(style::PrintStyledContent(
            format!(" {} ", self.label)
                .with(TermColor::White)
                .on(TermColor::DarkGrey),
        ))?;

        for (id, color) in batch {
            let (x, y) = self.cell(*id);
            let bg = match color {
                Some(color) => {
                    let (r, g, b) = color.multiply_rgb(color.a(), color.a(), color.a()).rgb_bytes();
                    TermColor::Rgb { r, g, b }
                }
                None => DIM,
            };
            stdout.queue(cursor::MoveTo(x, y))?;
            stdout.queue(style::PrintStyledContent(
                format!("{:>width$} ", id.0, width = CELL_W as usize - 1)
                    .with(TermColor::Black)
                    .on(bg),
            ))?;
        }
        stdout.flush()
    }
}

impl UpdateSink<LedId, Color> for TerminalSink {
    fn update(&self, batch: &[(LedId, Color)]) -> Result<(), DeviceError> {
        let cells: Vec<(LedId, Option<Color>)> =
            batch.iter().map(|(id, color)| (*id, Some(*color))).collect();
        self.draw(&cells)
            .map_err(|e| DeviceError::Transport(format!("{}: {e}", self.label)))
    }

    fn reset(&self) -> Result<(), DeviceError> {
        let cells: Vec<(LedId, Option<Color>)> =
            (0..self.rows * self.cols).map(|i| (LedId(i), None)).collect();
        self.draw(&cells)
            .map_err(|e| DeviceError::Transport(format!("{}: {e}", self.label)))
    }
}

/// Alternate screen plus raw mode, restored on drop
pub struct TerminalSession {
    _private: (),
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        stdout
            .execute(terminal::EnterAlternateScreen)?
            .execute(terminal::Clear(terminal::ClearType::All))?
            .execute(cursor::Hide)?;
        Ok(Self { _private: () })
    }

    /// Print a status line at `row`
    pub fn status(&self, row: u16, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.queue(cursor::MoveTo(0, row))?;
        stdout.queue(style::PrintStyledContent(
            format!(" {text} ").with(TermColor::White).on(TermColor::DarkGrey),
        ))?;
        stdout.flush()
    }

    /// Wait up to `timeout` for q, Esc or Ctrl-C
    pub fn poll_quit(&self, timeout: Duration) -> io::Result<bool> {
        if !event::poll(timeout)? {
            return Ok(false);
        }
        if let event::Event::Key(key) = event::read()? {
            return Ok(match key.code {
                event::KeyCode::Char('q') | event::KeyCode::Esc => true,
                event::KeyCode::Char('c') => key.modifiers.contains(event::KeyModifiers::CONTROL),
                _ => false,
            });
        }
        Ok(false)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = stdout.execute(cursor::Show);
        let _ = stdout.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
