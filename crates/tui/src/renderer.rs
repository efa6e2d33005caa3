use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseButton, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    buffer::{Buffer, Cell},
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tracelane_core::{EventDetails, TimelineConfig, TimelineState, WheelInput};
use tracelane_protocol::{Point, RenderCommand, TextAlign, ThemeToken};

/// Surface pixels per terminal column.
const CELL_WIDTH: f64 = 8.0;
/// Surface pixels per terminal row.
const CELL_HEIGHT: f64 = 16.0;
const DETAILS_HEIGHT: u16 = 9;
const KEY_PAN_PX: f64 = CELL_WIDTH * 8.0;
const WHEEL_PAN_PX: f64 = CELL_WIDTH * 4.0;

/// Fit the layout onto the cell grid: one text row per track, two for the
/// time axis.
pub fn terminal_config(mut config: TimelineConfig) -> TimelineConfig {
    config.layout.row_height = CELL_HEIGHT;
    config.layout.row_padding = 0.0;
    config.layout.header_height = CELL_HEIGHT * 2.0;
    config.layout.track_label_width = CELL_WIDTH * 24.0;
    config.layout.label_inset = CELL_WIDTH;
    config
}

fn theme_to_color(token: ThemeToken) -> Color {
    match token {
        ThemeToken::Palette0 => Color::Rgb(0x42, 0x85, 0xF4),
        ThemeToken::Palette1 => Color::Rgb(0xEA, 0x43, 0x35),
        ThemeToken::Palette2 => Color::Rgb(0xFB, 0xBC, 0x05),
        ThemeToken::Palette3 => Color::Rgb(0x34, 0xA8, 0x53),
        ThemeToken::Palette4 => Color::Rgb(0x8A, 0xB4, 0xF8),
        ThemeToken::Palette5 => Color::Rgb(0xF2, 0x8B, 0x82),
        ThemeToken::SelectionHighlight => Color::White,
        ThemeToken::Background => Color::Black,
        ThemeToken::RowBackground => Color::Rgb(0x1e, 0x1e, 0x1e),
        ThemeToken::EventLabelText => Color::White,
        ThemeToken::TrackLabelBackground => Color::Rgb(0x10, 0x10, 0x10),
        ThemeToken::TrackLabelText => Color::Rgb(0xcc, 0xcc, 0xcc),
        ThemeToken::AxisBackground => Color::Rgb(0x11, 0x11, 0x11),
        ThemeToken::AxisTick => Color::DarkGray,
        ThemeToken::AxisText => Color::Gray,
    }
}

/// Text drawn on the selection highlight needs a dark foreground.
fn contrast_fg(bg: Color, fg: Color) -> Color {
    if bg == Color::White { Color::Black } else { fg }
}

/// Replay `commands` onto `buf` inside `area`, one cell per
/// `CELL_WIDTH` x `CELL_HEIGHT` surface pixels.
pub fn paint(commands: &[RenderCommand], buf: &mut Buffer, area: Rect) {
    let mut clip: Option<CellRect> = None;

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect { rect, color, .. } => {
                let cells = CellRect::cover(rect.x, rect.y, rect.w, rect.h);
                let bg = theme_to_color(*color);
                let rows = cells.y0.max(0)..cells.y1.min(i32::from(area.height));
                let cols = cells.x0.max(0)..cells.x1.min(i32::from(area.width));
                for row in rows {
                    for col in cols.clone() {
                        if let Some(cell) = cell_at(buf, area, col, row) {
                            cell.set_char(' ').set_bg(bg);
                        }
                    }
                }
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
            } => {
                let len = text.chars().count() as i32;
                let anchor = (position.x / CELL_WIDTH).floor() as i32;
                let start = match align {
                    TextAlign::Left => anchor,
                    TextAlign::Center => anchor - len / 2,
                    TextAlign::Right => anchor - len,
                };
                // `position.y` is the baseline; the glyph box starts above it.
                let row = ((position.y - font_size * 0.75) / CELL_HEIGHT).floor() as i32;
                let fg = theme_to_color(*color);
                for (i, ch) in text.chars().enumerate() {
                    let col = start + i as i32;
                    if clip.is_some_and(|c| !c.contains(col, row)) {
                        continue;
                    }
                    if let Some(cell) = cell_at(buf, area, col, row) {
                        let fg = contrast_fg(cell.bg, fg);
                        cell.set_char(ch).set_fg(fg);
                    }
                }
            }
            RenderCommand::DrawLine { from, to, color, .. } => {
                // Only vertical ticks occur; draw them in their bottom cell.
                let col = (from.x / CELL_WIDTH).floor() as i32;
                let row = ((from.y.max(to.y) - 1.0) / CELL_HEIGHT).floor() as i32;
                let fg = theme_to_color(*color);
                if let Some(cell) = cell_at(buf, area, col, row)
                    && cell.symbol() == " "
                {
                    cell.set_char('╷').set_fg(fg);
                }
            }
            RenderCommand::SetClip { rect } => {
                clip = Some(CellRect::inside(rect.x, rect.y, rect.w, rect.h));
            }
            RenderCommand::ClearClip => clip = None,
            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }
}

fn cell_at(buf: &mut Buffer, area: Rect, col: i32, row: i32) -> Option<&mut Cell> {
    let col = u16::try_from(col).ok()?;
    let row = u16::try_from(row).ok()?;
    if col < area.width && row < area.height {
        Some(&mut buf[(area.x + col, area.y + row)])
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CellRect {
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
}

impl CellRect {
    /// Every cell the rectangle touches; never empty.
    fn cover(x: f64, y: f64, w: f64, h: f64) -> Self {
        let x0 = (x / CELL_WIDTH).floor() as i32;
        let y0 = (y / CELL_HEIGHT).floor() as i32;
        let x1 = ((x + w) / CELL_WIDTH).ceil() as i32;
        let y1 = ((y + h) / CELL_HEIGHT).ceil() as i32;
        Self {
            x0,
            y0,
            x1: x1.max(x0 + 1),
            y1: y1.max(y0 + 1),
        }
    }

    /// Cells at least half covered, so clipped text stays inside its bar.
    fn inside(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x0: (x / CELL_WIDTH).round() as i32,
            y0: (y / CELL_HEIGHT).floor() as i32,
            x1: ((x + w) / CELL_WIDTH).round() as i32,
            y1: ((y + h) / CELL_HEIGHT).ceil() as i32,
        }
    }

    fn contains(&self, col: i32, row: i32) -> bool {
        col >= self.x0 && col < self.x1 && row >= self.y0 && row < self.y1
    }
}

fn cell_center(col: u16, row: u16) -> Point {
    Point::new(
        (f64::from(col) + 0.5) * CELL_WIDTH,
        (f64::from(row) + 0.5) * CELL_HEIGHT,
    )
}

fn details_lines(state: &TimelineState) -> Vec<Line<'static>> {
    let Some(details) = state.selected_details() else {
        return vec![Line::from("Click an event to inspect it.")];
    };
    let EventDetails { fields, args } = details;
    let mut lines: Vec<Line<'static>> = fields
        .into_iter()
        .map(|f| Line::from(format!("{:<10} {}", f.label, f.value)))
        .collect();
    if let Some(args) = args {
        lines.push(Line::from("Args"));
        lines.extend(args.lines().map(|l| Line::from(format!("  {l}"))));
    }
    lines
}

pub fn run(state: &mut TimelineState) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, state);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn event_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    state: &mut TimelineState,
) -> Result<()> {
    let mut timeline_area = Rect::default();

    loop {
        terminal.draw(|frame| {
            let [timeline, details] =
                Layout::vertical([Constraint::Min(3), Constraint::Length(DETAILS_HEIGHT)])
                    .areas(frame.area());
            timeline_area = timeline;

            let width = f64::from(timeline.width) * CELL_WIDTH;
            let height = f64::from(timeline.height) * CELL_HEIGHT;
            if state.surface().width != width || state.surface().height != height {
                state.resize(width, height);
            }

            paint(&state.render(), frame.buffer_mut(), timeline);

            let title = format!(
                " {} | {} events in {} tracks | q quit ",
                state.source_name().unwrap_or("tracelane"),
                state.trace().events().len(),
                state.trace().tracks().len(),
            );
            let panel = Paragraph::new(details_lines(state))
                .block(Block::default().borders(Borders::TOP).title(title))
                .style(Style::default().fg(Color::Gray).bg(Color::Black))
                .wrap(Wrap { trim: false });
            frame.render_widget(panel, details);
        })?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let center_x = state.surface().width / 2.0;
        let zoom_step = state.config().zoom_step;
        let row_height = state.config().layout.row_height;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') => break,
                KeyCode::Esc if state.selection().is_some() => {
                    state.select(None);
                }
                KeyCode::Esc => break,
                KeyCode::Left => state.pan(-KEY_PAN_PX),
                KeyCode::Right => state.pan(KEY_PAN_PX),
                KeyCode::Up => state.scroll_by(-row_height),
                KeyCode::Down => state.scroll_by(row_height),
                KeyCode::Char('+') | KeyCode::Char('=') => state.zoom_at(center_x, zoom_step),
                KeyCode::Char('-') => state.zoom_at(center_x, zoom_step.recip()),
                KeyCode::Char('0') => state.fit(),
                _ => {}
            },
            Event::Mouse(mouse) => {
                let inside = mouse.column >= timeline_area.x
                    && mouse.column < timeline_area.right()
                    && mouse.row >= timeline_area.y
                    && mouse.row < timeline_area.bottom();
                if !inside {
                    continue;
                }
                let point = cell_center(
                    mouse.column - timeline_area.x,
                    mouse.row - timeline_area.y,
                );
                let delta_y = match mouse.kind {
                    MouseEventKind::ScrollUp => -WHEEL_PAN_PX,
                    MouseEventKind::ScrollDown => WHEEL_PAN_PX,
                    MouseEventKind::Down(MouseButton::Left) => {
                        state.click(point);
                        continue;
                    }
                    _ => continue,
                };
                if mouse.modifiers.contains(KeyModifiers::SHIFT) {
                    state.scroll_by(delta_y.signum() * row_height);
                } else {
                    state.wheel(WheelInput {
                        x: point.x,
                        delta_y,
                        zoom_modifier: mouse.modifiers.contains(KeyModifiers::CONTROL),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(())
}
