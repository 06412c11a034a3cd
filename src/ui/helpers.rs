use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders};

use crate::theme::Theme;

pub(crate) fn list_item_style(selected: bool, theme: &Theme) -> Style {
    if selected {
        Style::default()
            .fg(theme.fg)
            .bg(theme.selection)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.fg)
    }
}

/// Rows the current query does not match stay visible, dimmed.
pub(crate) fn unmatched_style(theme: &Theme) -> Style {
    Style::default().fg(theme.fg_muted)
}

pub(crate) fn themed_block(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(theme.bg_alt))
        .border_style(Style::default().fg(theme.accent))
}
