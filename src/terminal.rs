// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// Style and cursor state last sent to the terminal, so unchanged
/// attributes are not re-emitted.
#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    pos: Option<(u16, u16)>,
}

impl Pen {
    fn style(&mut self, out: &mut Stdout, cell: &Cell) -> Result<()> {
        if cell.fg != self.fg {
            out.queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            self.fg = cell.fg;
        }
        if cell.bg != self.bg {
            out.queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            self.bg = cell.bg;
        }
        if cell.bold != self.bold {
            out.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            self.bold = cell.bold;
        }
        Ok(())
    }

    fn move_to(&mut self, out: &mut Stdout, x: u16, y: u16) -> Result<()> {
        if self.pos != Some((x, y)) {
            out.queue(cursor::MoveTo(x, y))?;
        }
        Ok(())
    }
}

/// What is currently on screen.
struct Shown {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

pub struct Terminal {
    stdout: Stdout,
    shown: Option<Shown>,
    run: String,
    rows: Vec<Vec<usize>>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            shown: None,
            run: String::with_capacity(64),
            rows: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        self.stdout.execute(terminal::SetTitle(title))?;
        Ok(())
    }

    /// Ring the terminal bell. Used as the thunder sound.
    pub fn bell(&mut self) -> Result<()> {
        self.stdout.queue(Print('\x07'))?;
        Ok(())
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let resized = self
            .shown
            .as_ref()
            .map(|s| s.width != frame.width || s.height != frame.height)
            .unwrap_or(true);
        let total = frame.width as usize * frame.height as usize;
        let heavy = total > 0 && frame.dirty_indices().len() >= total / 3;

        if resized || frame.is_dirty_all() || heavy {
            self.draw_full(frame, resized)?;
        } else {
            self.draw_dirty(frame)?;
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    fn draw_full(&mut self, frame: &Frame, resized: bool) -> Result<()> {
        if resized {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            self.shown = Some(Shown {
                width: frame.width,
                height: frame.height,
                cells: vec![Cell::blank_with_bg(None); total_of(frame)],
            });
        }
        let Some(shown) = self.shown.as_mut() else {
            return Ok(());
        };
        let mut pen = Pen::default();
        for y in 0..frame.height {
            self.stdout.queue(cursor::MoveTo(0, y))?;
            for x in 0..frame.width {
                let idx = y as usize * frame.width as usize + x as usize;
                let cell = frame.cell_at_index(idx);
                pen.style(&mut self.stdout, &cell)?;
                self.stdout.queue(Print(cell.ch))?;
                shown.cells[idx] = cell;
            }
        }
        Ok(())
    }

    /// Repaint only changed cells, coalescing horizontal runs that share a
    /// style into one print.
    fn draw_dirty(&mut self, frame: &Frame) -> Result<()> {
        let Some(shown) = self.shown.as_mut() else {
            return Ok(());
        };
        let width = frame.width as usize;

        if self.rows.len() != frame.height as usize {
            self.rows = vec![Vec::new(); frame.height as usize];
        }
        for &idx in frame.dirty_indices() {
            if let Some(row) = self.rows.get_mut(idx / width) {
                row.push(idx);
            }
        }

        let mut pen = Pen::default();
        for (y, row) in self.rows.iter_mut().enumerate() {
            if row.is_empty() {
                continue;
            }
            row.sort_unstable();
            let mut i = 0usize;
            while i < row.len() {
                let start = row[i];
                let head = frame.cell_at_index(start);
                if shown.cells[start] == head {
                    i += 1;
                    continue;
                }
                shown.cells[start] = head;

                self.run.clear();
                self.run.push(head.ch);
                let mut end = start;
                let mut j = i + 1;
                while j < row.len() && row[j] == end + 1 {
                    let next = frame.cell_at_index(row[j]);
                    if shown.cells[row[j]] == next
                        || (next.fg, next.bg, next.bold) != (head.fg, head.bg, head.bold)
                    {
                        break;
                    }
                    shown.cells[row[j]] = next;
                    self.run.push(next.ch);
                    end = row[j];
                    j += 1;
                }

                let x = (start % width) as u16;
                let y = y as u16;
                pen.move_to(&mut self.stdout, x, y)?;
                pen.style(&mut self.stdout, &head)?;
                self.stdout.queue(Print(self.run.as_str()))?;
                let next_x = (end % width) as u16 + 1;
                pen.pos = (next_x < frame.width).then_some((next_x, y));
                i = j;
            }
            row.clear();
        }
        Ok(())
    }
}

fn total_of(frame: &Frame) -> usize {
    frame.width as usize * frame.height as usize
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.stdout.flush();
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
