//! Terminal rendering: message area, separator rule, and the input prompt.
//! Presentation only; all state lives in [`App`].

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::core::app::App;
use crate::core::scrollback::EntryKind;

/// Rows reserved below the message area: one separator, one prompt.
const CHROME_HEIGHT: u16 = 2;

/// Height of the message area for a terminal of the given total height.
pub fn viewport_height(total_height: u16) -> usize {
    total_height.saturating_sub(CHROME_HEIGHT).max(1) as usize
}

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    if area.height <= CHROME_HEIGHT || area.width == 0 {
        return;
    }

    let message_height = viewport_height(area.height);
    let entries = app
        .scrollback
        .visible_window(message_height, app.scroll_offset);
    let lines: Vec<Line> = entries
        .iter()
        .map(|entry| Line::from(Span::styled(entry.text.clone(), style_for(entry.kind))))
        .collect();

    let messages = Paragraph::new(lines);
    frame.render_widget(
        messages,
        Rect::new(0, 0, area.width, message_height as u16),
    );

    let separator = Paragraph::new(Line::from(Span::styled(
        "-".repeat(area.width as usize),
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(separator, Rect::new(0, area.height - 2, area.width, 1));

    let prompt = format!("{}> {}", app.identity, app.input);
    let prompt_row = area.height - 1;
    let input = Paragraph::new(Line::from(Span::styled(
        prompt.clone(),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(input, Rect::new(0, prompt_row, area.width, 1));

    let cursor_x = (prompt.chars().count() as u16).min(area.width.saturating_sub(1));
    frame.set_cursor_position((cursor_x, prompt_row));
}

fn style_for(kind: EntryKind) -> Style {
    match kind {
        EntryKind::System => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        EntryKind::Own => Style::default().fg(Color::Cyan),
        EntryKind::Peer => Style::default().fg(Color::White),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_reserves_the_chrome_rows() {
        assert_eq!(viewport_height(24), 22);
        assert_eq!(viewport_height(3), 1);
        // Degenerate terminals still get one message row.
        assert_eq!(viewport_height(0), 1);
    }
}
