use ratatui::layout::Rect;
use ratatui::widgets::ListState;

use crate::filter::{FilterSession, FinalSelection, RenderRow};
use crate::scorer::ScoringWorker;
use crate::tab::{TabRef, TabSnapshot};
use crate::theme::Theme;

mod core;
mod input;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outcome {
    Accepted(Option<FinalSelection<TabRef>>),
    Cancelled,
}

pub(crate) struct App {
    pub(crate) snapshot: TabSnapshot,
    pub(crate) session: FilterSession<TabRef>,
    pub(crate) worker: Option<ScoringWorker>,
    pub(crate) query: String,
    /// Char index of the query cursor.
    pub(crate) query_cursor: usize,
    pub(crate) rows: Vec<RenderRow>,
    pub(crate) selected: usize,
    pub(crate) pending_seq: Option<u64>,
    pub(crate) status: String,
    pub(crate) theme: Theme,
    pub(crate) placeholder: String,
    pub(crate) list_state: ListState,
    pub(crate) list_rect: Rect,
    pub(crate) outcome: Option<Outcome>,
    pub(crate) quit: bool,
}
