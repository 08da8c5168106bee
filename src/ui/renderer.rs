/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Raw mode and the alternate screen are held for the renderer's active
/// lifetime. `cleanup()` releases them and `Drop` calls it on any path
/// that skipped it (early `?` return, panic unwind).

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::direction::Direction;
use crate::domain::grid::{face_value, Rank, SIZE};
use crate::domain::rules;
use crate::sim::engine;
use crate::sim::session::{GameSession, Phase};
use super::theme::Scheme;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Reset;

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::Reset,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = bg;
        cell
    }

    fn as_str(&self) -> &str {
        // from_char only ever stores a whole encoded char
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::from_char(ch, fg, bg));
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).as_str().to_string()).collect()
    }
}

// ── Layout ──

/// Each tile is TILE_W columns by TILE_H rows.
const TILE_W: usize = 7;
const TILE_H: usize = 3;
const BOARD_W: usize = TILE_W * SIZE;

const HEADER_ROW: usize = 0;
const BEST_ROW: usize = 1;
const BOARD_ROW: usize = 3;
const STATUS_ROW: usize = BOARD_ROW + TILE_H * SIZE + 1;
const HELP_ROW: usize = STATUS_ROW + 1;

/// Text shown in the middle row of a tile.
fn tile_label(rank: Rank) -> String {
    if rank == 0 {
        return "·".to_string();
    }
    let s = face_value(rank).to_string();
    if s.len() <= TILE_W { s } else { format!("2^{rank}") }
}

/// Centre `label` in a tile-wide field, extra space going left.
fn centered(label: &str) -> String {
    let len = label.chars().count();
    let t = TILE_W.saturating_sub(len);
    format!("{}{}{}", " ".repeat(t - t / 2), label, " ".repeat(t / 2))
}

/// Arrows for the moves that would change the board, in the classic
/// left-up-right-down order.
fn help_line(s: &GameSession) -> String {
    if !rules::has_moves(s.grid()) {
        return "q".to_string();
    }
    const ORDER: [Direction; 4] = [Direction::Left, Direction::Up, Direction::Right, Direction::Down];
    let arrows: Vec<String> = ORDER
        .iter()
        .filter(|&&d| engine::can_move(s.grid(), d))
        .map(|d| d.arrow().to_string())
        .collect();
    if arrows.is_empty() {
        "q".to_string()
    } else {
        format!("{} or q", arrows.join(","))
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    scheme: Scheme,
    active: bool,
}

impl Renderer {
    pub fn new(scheme: Scheme) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(8192, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            scheme,
            active: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.active = true;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn cleanup(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        let shown = execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        // raw mode goes even if the screen commands failed
        terminal::disable_raw_mode()?;
        shown
    }

    pub fn render(&mut self, session: &GameSession) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, ResetColor, Clear(ClearType::All))?;
        }

        // Detect phase change → clear for clean transition
        if self.last_phase != Some(session.phase()) {
            self.back.cells.fill(Cell::INVALID);
            self.last_phase = Some(session.phase());
        }

        self.front.clear();
        self.compose(session);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::Reset;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer, ResetColor)?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;
                last_x = x;
                last_y = y;
            }
        }

        queue!(self.writer, ResetColor)?;
        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, s: &GameSession) {
        let left = self.front.width.saturating_sub(BOARD_W) / 2;
        self.compose_header(s, left);
        self.compose_board(s, left);
        self.compose_status(s, left);

        let help = help_line(s);
        let hx = left + BOARD_W.saturating_sub(help.chars().count()) / 2;
        self.front.put_str(hx, HELP_ROW, &help, Color::DarkGrey, Color::Reset);
    }

    fn compose_header(&mut self, s: &GameSession, left: usize) {
        let title = "2048";
        let pts = format!("{} pts", s.score());
        let pad = BOARD_W.saturating_sub(title.len() + pts.len());
        let header = format!("{title}{}{pts}", " ".repeat(pad));
        self.front.put_str(left, HEADER_ROW, &header, Color::White, Color::Reset);

        let best = format!("moves {}  best {}", s.moves(), s.best());
        let bx = left + BOARD_W.saturating_sub(best.len());
        self.front.put_str(bx, BEST_ROW, &best, Color::DarkGrey, Color::Reset);
    }

    fn compose_board(&mut self, s: &GameSession, left: usize) {
        for r in 0..SIZE {
            for c in 0..SIZE {
                let rank = s.rank_at(r, c);
                let (bg, fg) = self.scheme.tile_colors(rank);
                let x0 = left + c * TILE_W;
                let y0 = BOARD_ROW + r * TILE_H;
                let blank = " ".repeat(TILE_W);
                self.front.put_str(x0, y0, &blank, fg, bg);
                self.front.put_str(x0, y0 + 1, &centered(&tile_label(rank)), fg, bg);
                self.front.put_str(x0, y0 + 2, &blank, fg, bg);
            }
        }
    }

    fn compose_status(&mut self, s: &GameSession, left: usize) {
        let (text, fg) = match s.phase() {
            Phase::GameOver => ("GAME OVER   ENTER: new game  q: quit".to_string(), Color::Red),
            Phase::ConfirmQuit => ("QUIT? (y/n)".to_string(), Color::Yellow),
            Phase::ConfirmRestart => ("RESTART? (y/n)".to_string(), Color::Yellow),
            Phase::Playing => (s.message.clone(), Color::Yellow),
        };
        if text.is_empty() {
            return;
        }
        let x = left + BOARD_W.saturating_sub(text.chars().count()) / 2;
        self.front.put_str(x, STATUS_ROW, &text, fg, Color::Reset);
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            tracing::error!(error = %e, "terminal restore failed");
        }
    }
}
