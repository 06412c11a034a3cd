use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, Paragraph};
use unicode_width::UnicodeWidthStr;

use super::helpers::{list_item_style, themed_block, unmatched_style};
use crate::app::App;
use crate::util::{prefix_width, to_u16_saturating, truncate_start};

pub(crate) fn render_query(app: &App, frame: &mut Frame<'_>, area: Rect) {
    let theme = &app.theme;
    let block = themed_block(theme).title("Go to Tab");
    let inner = block.inner(area);
    let line = if app.query.is_empty() {
        Line::from(Span::styled(
            app.placeholder.clone(),
            Style::default().fg(theme.fg_muted),
        ))
    } else {
        Line::from(Span::styled(app.query.clone(), Style::default().fg(theme.fg)))
    };
    let paragraph = Paragraph::new(line)
        .style(Style::default().fg(theme.fg).bg(theme.bg_alt))
        .block(block);
    frame.render_widget(paragraph, area);
    if inner.width > 0 && inner.height > 0 {
        let offset = to_u16_saturating(prefix_width(&app.query, app.query_cursor));
        let x = inner
            .x
            .saturating_add(offset)
            .min(inner.x + inner.width.saturating_sub(1));
        frame.set_cursor_position((x, inner.y));
    }
}

pub(crate) fn render_list(app: &mut App, frame: &mut Frame<'_>, area: Rect) {
    let theme = app.theme.clone();
    let block = themed_block(&theme).border_style(Style::default().fg(theme.border));
    app.list_rect = block.inner(area);
    let width = usize::from(app.list_rect.width);
    let filtering = !app.session.query().is_empty();

    let items: Vec<ListItem> = app
        .rows
        .iter()
        .filter_map(|row| app.session.candidate(row.index).map(|c| (row, c)))
        .map(|(row, candidate)| {
            let base = if filtering && !row.force_show {
                unmatched_style(&theme)
            } else {
                list_item_style(false, &theme)
            };
            let badge = format!("[{:<3}] ", candidate.kind.badge());
            let mut spans = vec![
                Span::styled(badge.clone(), Style::default().fg(theme.accent_secondary)),
                Span::styled(candidate.label.clone(), base),
            ];
            let mut used = badge.width() + candidate.label.width() + 2;
            if let Some(tab) = app.snapshot.tab(candidate.source) {
                if tab.is_dirty {
                    spans.push(Span::styled(" ●", Style::default().fg(theme.accent)));
                    used += 2;
                }
                if tab.is_pinned {
                    spans.push(Span::styled(" pinned", Style::default().fg(theme.fg_muted)));
                    used += 7;
                }
            }
            if !candidate.description.is_empty() && width > used {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(
                    truncate_start(&candidate.description, width - used),
                    Style::default().fg(theme.fg_muted),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let empty = items.is_empty();
    app.list_state
        .select((!empty).then_some(app.selected.min(app.rows.len().saturating_sub(1))));
    let list = List::new(items)
        .highlight_style(list_item_style(true, &theme))
        .block(block.title(format!("Open Tabs ({})", app.session.len())));
    frame.render_stateful_widget(list, area, &mut app.list_state);
    if empty {
        let msg = Paragraph::new("No open tabs")
            .style(Style::default().fg(theme.fg_muted).add_modifier(Modifier::ITALIC));
        frame.render_widget(msg, app.list_rect);
    }
}

pub(crate) fn render_status(app: &App, frame: &mut Frame<'_>, area: Rect) {
    let theme = &app.theme;
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(theme.fg_muted).bg(theme.bg));
    frame.render_widget(status, area);
}
