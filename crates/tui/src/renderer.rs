use std::io::{Stdout, stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::debug;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Block,
};
use tickline_core::{Orientation, TextExtent, TextMeasure, Tickline, TouchEvent, TouchId};
use tickline_protocol::{Paint, Point, RenderCommand, TextAlign, ThemeToken};

/// Pixels per terminal cell. The tickline works in pixels; a cell is
/// treated as an 8×16 glyph box.
pub const CELL_W: f64 = 8.0;
pub const CELL_H: f64 = 16.0;

const FRAME: Duration = Duration::from_millis(16);
const IDLE: Duration = Duration::from_millis(250);

/// The mouse drives the ruler as a single touch.
const MOUSE_TOUCH: TouchId = 0;

/// One glyph per character, one row per label.
pub struct CellMeasure;

impl TextMeasure for CellMeasure {
    fn measure(&self, text: &str, _font_size: f64) -> TextExtent {
        TextExtent {
            width: text.chars().count() as f64 * CELL_W,
            height: CELL_H,
        }
    }
}

fn theme_to_color(token: ThemeToken) -> Color {
    match token {
        ThemeToken::Background => Color::Black,
        ThemeToken::Border => Color::DarkGray,
        ThemeToken::CenterLine => Color::DarkGray,
        ThemeToken::TickMajor => Color::White,
        ThemeToken::TickMinor => Color::Gray,
        ThemeToken::TickData => Color::LightYellow,
        ThemeToken::TickLabel => Color::Gray,
    }
}

fn paint_to_color(paint: Paint) -> Color {
    match paint {
        Paint::Theme(token) => theme_to_color(token),
        Paint::Rgba(color) => {
            let [r, g, b, _] = color.to_rgba8();
            Color::Rgb(r, g, b)
        }
    }
}

/// Cell-space rectangle, half-open, relative to the drawing area.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CellRect {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

impl CellRect {
    fn of(rect: &tickline_protocol::Rect) -> Self {
        let (x0, x1) = cell_span(rect.x, rect.w, CELL_W);
        let (y0, y1) = cell_span(rect.y, rect.h, CELL_H);
        Self { x0, y0, x1, y1 }
    }

    fn intersect(self, other: Self) -> Self {
        Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }

    fn contains(&self, col: i64, row: i64) -> bool {
        col >= self.x0 && col < self.x1 && row >= self.y0 && row < self.y1
    }
}

/// Cells covered by `[start, start + len)`; never empty, so hairline marks
/// still show up.
fn cell_span(start: f64, len: f64, unit: f64) -> (i64, i64) {
    let first = (start / unit).floor() as i64;
    let last = ((start + len) / unit).ceil() as i64;
    (first, last.max(first + 1))
}

fn put(buf: &mut Buffer, area: Rect, clip: CellRect, col: i64, row: i64, ch: char, fg: Color) {
    if !clip.contains(col, row) {
        return;
    }
    let (Ok(dx), Ok(dy)) = (u16::try_from(col), u16::try_from(row)) else {
        return;
    };
    if dx >= area.width || dy >= area.height {
        return;
    }
    buf[(area.x + dx, area.y + dy)].set_char(ch).set_fg(fg);
}

/// Rasterise a command list into `area` of `buf`. Large rectangles become
/// cell backgrounds, marks become box-drawing glyphs.
pub fn rasterise(commands: &[RenderCommand], area: Rect, buf: &mut Buffer) {
    let full = CellRect {
        x0: 0,
        y0: 0,
        x1: i64::from(area.width),
        y1: i64::from(area.height),
    };
    let mut clip = full;
    let mut clip_stack: Vec<CellRect> = Vec::new();

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect { rect, color, .. } => {
                let cells = CellRect::of(rect).intersect(clip);
                let fg = paint_to_color(*color);
                let glyph = if rect.w >= CELL_W && rect.h >= CELL_H {
                    None
                } else if rect.w <= rect.h {
                    Some('│')
                } else {
                    Some('─')
                };
                for row in cells.y0..cells.y1 {
                    for col in cells.x0..cells.x1 {
                        match glyph {
                            Some(ch) => put(buf, area, clip, col, row, ch, fg),
                            None => {
                                let (Ok(dx), Ok(dy)) = (u16::try_from(col), u16::try_from(row))
                                else {
                                    continue;
                                };
                                if dx < area.width && dy < area.height {
                                    buf[(area.x + dx, area.y + dy)].set_char(' ').set_bg(fg);
                                }
                            }
                        }
                    }
                }
            }

            RenderCommand::DrawLine {
                from, to, color, ..
            } => {
                let fg = paint_to_color(*color);
                if from.y == to.y {
                    let row = (from.y / CELL_H).floor() as i64;
                    let (a, b) = (from.x.min(to.x), from.x.max(to.x));
                    let (c0, c1) = cell_span(a, b - a, CELL_W);
                    for col in c0..c1 {
                        put(buf, area, clip, col, row, '─', fg);
                    }
                } else if from.x == to.x {
                    let col = (from.x / CELL_W).floor() as i64;
                    let (a, b) = (from.y.min(to.y), from.y.max(to.y));
                    let (r0, r1) = cell_span(a, b - a, CELL_H);
                    for row in r0..r1 {
                        put(buf, area, clip, col, row, '│', fg);
                    }
                }
            }

            RenderCommand::DrawText {
                position,
                text,
                color,
                align,
                ..
            } => {
                let fg = paint_to_color(*color);
                let len = text.chars().count() as i64;
                let row = ((position.y + CELL_H / 2.0) / CELL_H).floor() as i64;
                let anchor = (position.x / CELL_W).round() as i64;
                let start = match align {
                    TextAlign::Left => anchor,
                    TextAlign::Center => anchor - len / 2,
                    TextAlign::Right => anchor - len,
                };
                for (i, ch) in text.chars().enumerate() {
                    put(buf, area, clip, start + i as i64, row, ch, fg);
                }
            }

            RenderCommand::SetClip { rect } => {
                clip_stack.push(clip);
                clip = clip.intersect(CellRect::of(rect));
            }

            RenderCommand::ClearClip => {
                clip = clip_stack.pop().unwrap_or(full);
            }

            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }
}

/// Centre of a terminal cell in the tickline's pixel space.
fn cell_to_point(content: Rect, col: u16, row: u16) -> Point {
    Point::new(
        (f64::from(col) - f64::from(content.x)) * CELL_W + CELL_W / 2.0,
        (f64::from(row) - f64::from(content.y)) * CELL_H + CELL_H / 2.0,
    )
}

/// Keyboard shortcuts. Returns `true` when the user asked to quit.
fn handle_key(tickline: &mut Tickline, code: KeyCode, home: (f64, f64)) -> bool {
    let span = tickline.index_1() - tickline.index_0();
    let centre = {
        let b = tickline.viewport().bounds();
        tickline.viewport().along(b.center())
    };
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Up | KeyCode::Char('k') => {
            tickline.translate_by(-span * 0.1);
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Down | KeyCode::Char('j') => {
            tickline.translate_by(span * 0.1);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => tickline.zoom_by(1.5, centre),
        KeyCode::Char('-') => tickline.zoom_by(1.0 / 1.5, centre),
        KeyCode::Char('0') => {
            tickline.cancel_touches();
            let backward = tickline.viewport().backward();
            tickline.set_backward(false);
            tickline.set_index_range(home.0, home.1);
            tickline.set_backward(backward);
        }
        KeyCode::Char('o') => {
            tickline.cancel_touches();
            let flipped = match tickline.viewport().orientation() {
                Orientation::Horizontal => Orientation::Vertical,
                Orientation::Vertical => Orientation::Horizontal,
            };
            tickline.set_orientation(flipped);
        }
        KeyCode::Char('b') => {
            let backward = !tickline.viewport().backward();
            tickline.set_backward(backward);
        }
        _ => {}
    }
    false
}

pub fn render_tui(mut tickline: Tickline) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut tickline);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, tickline: &mut Tickline) -> Result<()> {
    // Reset restores the forward range, whatever the direction at startup.
    let home = if tickline.viewport().backward() {
        (tickline.index_1(), tickline.index_0())
    } else {
        (tickline.index_0(), tickline.index_1())
    };
    let mut commands: Vec<RenderCommand> = Vec::new();
    let mut last = Instant::now();

    loop {
        let term_size = terminal.size()?;
        let content = Rect::new(0, 1, term_size.width, term_size.height.saturating_sub(1));
        let bounds = tickline_protocol::Rect::new(
            0.0,
            0.0,
            f64::from(content.width) * CELL_W,
            f64::from(content.height) * CELL_H,
        );
        if tickline.viewport().bounds() != bounds {
            debug!("terminal resized to {}x{}", content.width, content.height);
            tickline.set_bounds(bounds);
        }

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f64();
        last = now;
        if let Some(fresh) = tickline.frame(dt, &CellMeasure) {
            commands = fresh;
        }

        terminal.draw(|frame| {
            let area = frame.area();

            // Header
            let header_area = Rect::new(0, 0, area.width, 1);
            let header = Block::default()
                .title(format!(
                    " tickline {:.2} … {:.2} | drag pan | wheel/+/- zoom | o orient | b backward | 0 reset | q quit ",
                    tickline.index_0(),
                    tickline.index_1(),
                ))
                .style(Style::default().fg(Color::White).bg(Color::DarkGray));
            frame.render_widget(header, header_area);

            rasterise(&commands, content, frame.buffer_mut());
        })?;

        let timeout = if tickline.in_motion() { FRAME } else { IDLE };
        if !event::poll(timeout)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if handle_key(tickline, key.code, home) {
                    break;
                }
            }
            Event::Mouse(mouse) => {
                let at = cell_to_point(content, mouse.column, mouse.row);
                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        tickline.handle_touch(&TouchEvent::down(MOUSE_TOUCH, at));
                    }
                    MouseEventKind::Drag(MouseButton::Left) => {
                        tickline.handle_touch(&TouchEvent::moved(MOUSE_TOUCH, at));
                    }
                    MouseEventKind::Up(MouseButton::Left) => {
                        tickline.handle_touch(&TouchEvent::up(MOUSE_TOUCH, at));
                    }
                    MouseEventKind::ScrollUp => {
                        let pivot = tickline.viewport().along(at);
                        tickline.zoom_by(1.25, pivot);
                    }
                    MouseEventKind::ScrollDown => {
                        let pivot = tickline.viewport().along(at);
                        tickline.zoom_by(0.8, pivot);
                    }
                    _ => {}
                }
            }
            Event::FocusLost => tickline.cancel_touches(),
            _ => {}
        }
    }

    Ok(())
}
