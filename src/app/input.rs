use super::App;
use std::io;

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::util::{byte_index, inside, prev_word_start};

impl App {
    const SCROLL_LINES: isize = 3;

    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> io::Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        let len = self.query.chars().count();
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => self.cancel(),
            (_, KeyCode::Enter) => self.accept(),
            (_, KeyCode::Up) | (KeyModifiers::CONTROL, KeyCode::Char('p')) => {
                self.move_selection(-1);
            }
            (_, KeyCode::Down) | (KeyModifiers::CONTROL, KeyCode::Char('n')) => {
                self.move_selection(1);
            }
            (_, KeyCode::PageUp) => self.move_selection(-Self::PAGE_ROWS),
            (_, KeyCode::PageDown) => self.move_selection(Self::PAGE_ROWS),
            (_, KeyCode::Left) => self.query_cursor = self.query_cursor.saturating_sub(1),
            (_, KeyCode::Right) => self.query_cursor = (self.query_cursor + 1).min(len),
            (_, KeyCode::Home) => self.query_cursor = 0,
            (_, KeyCode::End) => self.query_cursor = len,
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
                if !self.query.is_empty() {
                    self.query.clear();
                    self.query_cursor = 0;
                    self.refresh_results();
                }
            }
            (KeyModifiers::CONTROL, KeyCode::Char('w')) => {
                let start = prev_word_start(&self.query, self.query_cursor);
                if start < self.query_cursor {
                    let from = byte_index(&self.query, start);
                    let to = byte_index(&self.query, self.query_cursor);
                    self.query.replace_range(from..to, "");
                    self.query_cursor = start;
                    self.refresh_results();
                }
            }
            (_, KeyCode::Backspace) => {
                if self.query_cursor > 0 {
                    self.query_cursor -= 1;
                    let at = byte_index(&self.query, self.query_cursor);
                    self.query.remove(at);
                    self.refresh_results();
                }
            }
            (_, KeyCode::Delete) => {
                if self.query_cursor < len {
                    let at = byte_index(&self.query, self.query_cursor);
                    self.query.remove(at);
                    self.refresh_results();
                }
            }
            (_, KeyCode::Char(c)) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    let at = byte_index(&self.query, self.query_cursor);
                    self.query.insert(at, c);
                    self.query_cursor += 1;
                    self.refresh_results();
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub(crate) fn handle_mouse(&mut self, mouse: MouseEvent) -> io::Result<()> {
        if !inside(mouse.column, mouse.row, self.list_rect) {
            return Ok(());
        }
        match mouse.kind {
            MouseEventKind::ScrollDown => self.move_selection(Self::SCROLL_LINES),
            MouseEventKind::ScrollUp => self.move_selection(-Self::SCROLL_LINES),
            MouseEventKind::Down(MouseButton::Left) => {
                let row = self.list_state.offset() + usize::from(mouse.row - self.list_rect.y);
                if row >= self.rows.len() {
                    return Ok(());
                }
                // second click on the highlighted row picks it
                if row == self.selected {
                    self.accept();
                } else {
                    self.selected = row;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
