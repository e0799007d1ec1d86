//! Full-screen classroom preview.
//!
//! One fixed-layout draw per turn: a summary column on the left, the
//! classroom rectangle on the right with account markers clamped into its
//! interior. The preview blocks for a key press before returning control to
//! the conversation loop.

use std::collections::BTreeMap;
use std::io::stdout;

use anyhow::{Context, Result};
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::config::{Account, ActivityConfig};

use super::theme::{BORDER, TEXT_MUTED, TEXT_PRIMARY, TEXT_SECONDARY, group_color};

const SUMMARY_WIDTH: u16 = 30;
const HINT: &str = " press any key to continue ";

/// Render the preview once and wait for a key press.
pub fn show(config: &ActivityConfig) -> Result<()> {
    enable_raw_mode().context("Failed to enter raw mode")?;
    stdout().execute(EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout())).context("Failed to create terminal")?;

    let result = draw_and_wait(&mut terminal, config);

    disable_raw_mode().context("Failed to leave raw mode")?;
    stdout().execute(LeaveAlternateScreen).context("Failed to leave alternate screen")?;

    result
}

fn draw_and_wait(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, config: &ActivityConfig) -> Result<()> {
    terminal
        .draw(|frame| frame.render_widget(ClassroomView::new(config), frame.area()))
        .context("Failed to draw classroom preview")?;

    loop {
        if let Event::Key(key) = event::read().context("Failed to read key event")? {
            if key.kind == KeyEventKind::Press {
                return Ok(());
            }
        }
    }
}

/// The classroom preview widget.
pub struct ClassroomView<'a> {
    config: &'a ActivityConfig,
}

impl<'a> ClassroomView<'a> {
    pub fn new(config: &'a ActivityConfig) -> Self {
        Self { config }
    }

    fn render_summary(&self, area: Rect, buf: &mut Buffer) {
        let header = Style::default().fg(TEXT_SECONDARY).add_modifier(Modifier::BOLD);
        let body = Style::default().fg(TEXT_PRIMARY);
        let muted = Style::default().fg(TEXT_MUTED);

        let mut lines: Vec<Line> = Vec::new();

        lines.push(Line::styled("Phases", header));
        if self.config.phases.is_empty() {
            lines.push(Line::styled("  (none yet)", muted));
        }
        for (i, phase) in self.config.phases.iter().enumerate() {
            lines.push(Line::styled(format!("  {}. {}", i + 1, phase), body));
        }

        lines.push(Line::raw(""));
        lines.push(Line::styled("Groups", header));
        if self.config.groups.is_empty() {
            lines.push(Line::styled("  (none yet)", muted));
        }
        for group in &self.config.groups {
            let tint = group_color(&self.config.groups, Some(group));
            lines.push(Line::from(vec![
                Span::styled("  ■ ", Style::default().fg(tint)),
                Span::styled(group.clone(), body),
            ]));
        }

        lines.push(Line::raw(""));
        lines.push(Line::styled("Boards", header));
        if self.config.boards.is_empty() {
            lines.push(Line::styled("  (none yet)", muted));
        }
        for board in &self.config.boards {
            lines.push(Line::styled(format!("  {}", board.board_name), body));
            if !board.buckets.is_empty() {
                lines.push(Line::styled(format!("    buckets: {}", board.buckets.join(", ")), muted));
            }
            let resources = [
                ("canvas", &board.canvas),
                ("bucket view", &board.bucket_view),
                ("monitor view", &board.monitor_view),
                ("todo", &board.todo),
                ("workspace", &board.workspace),
            ];
            for (name, visibility) in resources {
                for (phase, groups) in visibility {
                    if !groups.is_empty() {
                        lines.push(Line::styled(format!("    {name} [{phase}]: {}", groups.join(", ")), muted));
                    }
                }
            }
        }

        Paragraph::new(lines).render(area, buf);
    }

    fn render_room(&self, area: Rect, buf: &mut Buffer) {
        Block::default()
            .borders(Borders::ALL)
            .title(" Classroom ")
            .border_style(Style::default().fg(BORDER))
            .render(area, buf);

        // Fixed draw order; later categories overdraw earlier ones.
        let categories: [(&BTreeMap<String, Account>, char); 3] = [
            (&self.config.accounts.teachers, 'T'),
            (&self.config.accounts.students, 'S'),
            (&self.config.accounts.devices, 'D'),
        ];

        for (accounts, glyph) in categories {
            for (name, account) in accounts {
                let Some((mx, my)) = clamp_point(area, account.x, account.y) else {
                    continue;
                };
                let tint = group_color(&self.config.groups, account.group.as_deref());

                if let Some((lx, ly, label)) = label_placement(area, mx, my, name) {
                    buf.set_string(lx, ly, label, Style::default().fg(tint));
                }
                buf.set_string(mx, my, glyph.to_string(), Style::default().fg(tint).add_modifier(Modifier::BOLD));
            }
        }
    }
}

impl Widget for ClassroomView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.config.project_name.is_empty() {
            " Untitled Activity ".to_string()
        } else {
            format!(" {} ", self.config.project_name)
        };

        let frame_block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(BORDER));
        let inner = frame_block.inner(area);
        frame_block.render(area, buf);

        if inner.width < SUMMARY_WIDTH + 10 || inner.height < 4 {
            return;
        }

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SUMMARY_WIDTH), Constraint::Min(10)])
            .split(inner);

        self.render_summary(panels[0], buf);
        self.render_room(panels[1], buf);

        buf.set_string(inner.x, inner.y + inner.height - 1, HINT, Style::default().fg(TEXT_MUTED));
    }
}

/// Clamp a classroom coordinate into the drawable band of the rectangle:
/// `[left+1, right-2]` horizontally, `[top+1, bottom-1]` vertically.
///
/// Coordinates are offsets from the rectangle's top-left corner. Returns
/// `None` when the rectangle has no interior.
fn clamp_point(area: Rect, x: i32, y: i32) -> Option<(u16, u16)> {
    let left = area.x as i32;
    let top = area.y as i32;
    let right = left + area.width as i32 - 1;
    let bottom = top + area.height as i32 - 1;

    let (lo_x, hi_x) = (left + 1, right - 2);
    let (lo_y, hi_y) = (top + 1, bottom - 1);
    if hi_x < lo_x || hi_y < lo_y {
        return None;
    }

    let cx = (left + x).clamp(lo_x, hi_x);
    let cy = (top + y).clamp(lo_y, hi_y);
    Some((cx as u16, cy as u16))
}

/// Place a name label centered over its marker, one row above; flips to one
/// row below when the row above would land on the top border.
fn label_placement(area: Rect, mx: u16, my: u16, name: &str) -> Option<(u16, u16, String)> {
    let left = area.x as i32;
    let right = left + area.width as i32 - 1;
    let (lo_x, hi_x) = (left + 1, right - 2);
    if hi_x < lo_x {
        return None;
    }

    let row = if my <= area.y + 1 { my + 1 } else { my - 1 };

    let band_width = (hi_x - lo_x + 1) as usize;
    let label: String = name.chars().take(band_width).collect();
    if label.is_empty() {
        return None;
    }

    let len = label.chars().count() as i32;
    let start = (mx as i32 - len / 2).clamp(lo_x, (hi_x - len + 1).max(lo_x));
    Some((start as u16, row, label))
}
