mod helpers;
mod picker;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use crate::app::App;
use picker::{render_list, render_query, render_status};

pub(crate) fn draw(app: &mut App, frame: &mut Frame<'_>) {
    let size = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(app.theme.bg)), size);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(size);
    render_query(app, frame, vertical[0]);
    render_list(app, frame, vertical[1]);
    render_status(app, frame, vertical[2]);
}
