use super::{App, Outcome};

use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tracing::warn;

use crate::config::PickerConfig;
use crate::filter::{FilterSession, RenderUpdate, ScoredQuery, score_request};
use crate::matcher::Matcher;
use crate::scorer::ScoringWorker;
use crate::tab::{TabSnapshot, enumerate_candidates};
use crate::theme::theme_from_colors;

impl App {
    pub(crate) const PAGE_ROWS: isize = 10;

    pub(crate) fn new(snapshot: TabSnapshot, config: &PickerConfig) -> Self {
        let candidates = enumerate_candidates(&snapshot);
        let session = FilterSession::new(candidates, Matcher::new(config.matcher));
        let worker = match ScoringWorker::spawn(session.match_fields(), *session.matcher()) {
            Ok(worker) => Some(worker),
            Err(err) => {
                warn!(error = %err, "scoring worker unavailable, scoring inline");
                None
            }
        };
        let rows = session.rows().to_vec();
        // start on the host's focused tab; rows are still in candidate order
        let selected = snapshot
            .active_tab()
            .and_then(|active| session.candidates().iter().position(|c| c.source == active))
            .unwrap_or(0);
        let mut app = Self {
            snapshot,
            session,
            worker,
            query: String::new(),
            query_cursor: 0,
            rows,
            selected,
            pending_seq: None,
            status: String::new(),
            theme: theme_from_colors(&config.colors),
            placeholder: config.placeholder.clone(),
            list_state: ListState::default(),
            list_rect: Rect::default(),
            outcome: None,
            quit: false,
        };
        app.status = app.summary(0);
        app
    }

    pub(crate) fn set_status<S: Into<String>>(&mut self, status: S) {
        self.status = status.into();
    }

    /// Re-rank for the current query, on the worker when there is one.
    pub(crate) fn refresh_results(&mut self) {
        let request = self.session.begin_query(&self.query);
        let seq = request.seq;
        let submitted = self
            .worker
            .as_ref()
            .is_some_and(|worker| worker.submit(request.clone()));
        if submitted {
            self.pending_seq = Some(seq);
            return;
        }
        if self.worker.take().is_some() {
            warn!("scoring worker stopped, scoring inline");
        }
        let scored = score_request(&self.session.match_fields(), self.session.matcher(), request);
        self.apply_scored(scored);
    }

    pub(crate) fn poll_scoring(&mut self) {
        let results = match self.worker.as_ref() {
            Some(worker) => worker.try_results(),
            None => return,
        };
        for scored in results {
            self.apply_scored(scored);
        }
    }

    /// Score the current query inline if the worker has not answered yet.
    pub(crate) fn settle(&mut self) {
        if self.pending_seq.is_none() {
            return;
        }
        let request = self.session.begin_query(&self.query);
        let scored = score_request(&self.session.match_fields(), self.session.matcher(), request);
        self.apply_scored(scored);
        self.pending_seq = None;
    }

    pub(crate) fn apply_scored(&mut self, scored: ScoredQuery) {
        if self.pending_seq == Some(scored.seq) {
            self.pending_seq = None;
        }
        match self.session.apply(scored) {
            Ok(Some(update)) => self.show_update(update),
            Ok(None) => {}
            Err(err) => self.set_status(format!("Invalid query: {err}")),
        }
    }

    fn show_update(&mut self, update: RenderUpdate) {
        match update.active {
            Some(active) => {
                self.selected = update
                    .rows
                    .iter()
                    .position(|r| r.index == active)
                    .unwrap_or(0);
            }
            None => {
                self.selected = self.selected.min(update.rows.len().saturating_sub(1));
            }
        }
        let matches = update.match_count();
        self.rows = update.rows;
        let status = self.summary(matches);
        self.set_status(status);
    }

    fn summary(&self, matches: usize) -> String {
        let total = self.session.len();
        if total == 0 {
            "No open tabs".to_string()
        } else if self.session.query().is_empty() {
            format!("{total} open tab{}", if total == 1 { "" } else { "s" })
        } else {
            format!("{matches}/{total} matching")
        }
    }

    pub(crate) fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.selected = 0;
            return;
        }
        let max = self.rows.len() - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(max);
    }

    pub(crate) fn selected_candidate(&self) -> Option<usize> {
        self.rows.get(self.selected).map(|r| r.index)
    }

    pub(crate) fn accept(&mut self) {
        self.settle();
        let selection = self.session.on_accept(self.selected_candidate());
        self.outcome = Some(Outcome::Accepted(selection));
        self.quit = true;
    }

    pub(crate) fn cancel(&mut self) {
        self.session.cancel();
        self.outcome = Some(Outcome::Cancelled);
        self.quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tab::{Tab, TabGroup, TabInput};
    use std::time::{Duration, Instant};

    fn snapshot(labels: &[&str]) -> TabSnapshot {
        TabSnapshot {
            groups: vec![TabGroup {
                view_column: 1,
                is_active: true,
                tabs: labels
                    .iter()
                    .map(|l| Tab {
                        label: l.to_string(),
                        input: TabInput::Text {
                            uri: format!("/src/{l}"),
                        },
                        is_active: false,
                        is_dirty: false,
                        is_pinned: false,
                    })
                    .collect(),
            }],
        }
    }

    fn inline_app(labels: &[&str]) -> App {
        let mut app = App::new(snapshot(labels), &PickerConfig::default());
        app.worker = None;
        app
    }

    fn label_at(app: &App, row: usize) -> &str {
        &app.session.candidates()[app.rows[row].index].label
    }

    #[test]
    fn test_new_app_lists_all_tabs() {
        let app = inline_app(&["main.ts", "readme.md", "index.ts"]);
        assert_eq!(app.rows.len(), 3);
        assert_eq!(app.status, "3 open tabs");
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_starts_on_focused_tab() {
        let mut snap = snapshot(&["main.ts", "readme.md", "index.ts"]);
        snap.groups[0].tabs[2].is_active = true;
        let app = App::new(snap.clone(), &PickerConfig::default());
        assert_eq!(app.selected, 2);

        snap.groups[0].is_active = false;
        let app = App::new(snap, &PickerConfig::default());
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_empty_snapshot_status() {
        let app = inline_app(&[]);
        assert_eq!(app.status, "No open tabs");
    }

    #[test]
    fn test_refresh_inline_highlights_best_match() {
        let mut app = inline_app(&["main.ts", "readme.md", "index.ts"]);
        app.query = "index".to_string();
        app.refresh_results();
        assert_eq!(label_at(&app, 0), "index.ts");
        assert_eq!(app.selected, 0);
        assert_eq!(app.status, "1/3 matching");
    }

    #[test]
    fn test_empty_query_keeps_highlight() {
        let mut app = inline_app(&["main.ts", "readme.md", "index.ts"]);
        app.move_selection(2);
        app.query = "zzz".to_string();
        app.refresh_results();
        assert_eq!(app.selected, 2);
        app.query.clear();
        app.refresh_results();
        assert_eq!(app.selected, 2);
        assert_eq!(app.status, "3 open tabs");
    }

    #[test]
    fn test_invalid_query_keeps_rows() {
        let mut app = inline_app(&["main.ts", "readme.md"]);
        app.query = "readme".to_string();
        app.refresh_results();
        let before = app.rows.clone();
        app.query = "readme !".to_string();
        app.refresh_results();
        assert_eq!(app.rows, before);
        assert!(app.status.starts_with("Invalid query"));
        assert!(app.session.is_open());
    }

    #[test]
    fn test_move_selection_clamps() {
        let mut app = inline_app(&["a", "b", "c"]);
        app.move_selection(-5);
        assert_eq!(app.selected, 0);
        app.move_selection(App::PAGE_ROWS);
        assert_eq!(app.selected, 2);
        let mut empty = inline_app(&[]);
        empty.move_selection(1);
        assert_eq!(empty.selected, 0);
    }

    #[test]
    fn test_accept_records_selection() {
        let mut app = inline_app(&["main.ts", "readme.md"]);
        app.move_selection(1);
        app.accept();
        assert!(app.quit);
        match app.outcome {
            Some(Outcome::Accepted(Some(ref sel))) => {
                assert_eq!(sel.label, "readme.md");
                assert_eq!(sel.source.index, 1);
            }
            ref other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_accept_with_no_tabs() {
        let mut app = inline_app(&[]);
        app.accept();
        assert_eq!(app.outcome, Some(Outcome::Accepted(None)));
    }

    #[test]
    fn test_cancel() {
        let mut app = inline_app(&["main.ts"]);
        app.cancel();
        assert_eq!(app.outcome, Some(Outcome::Cancelled));
        assert!(!app.session.is_open());
    }

    #[test]
    fn test_accept_settles_pending_query() {
        let mut app = App::new(
            snapshot(&["main.ts", "readme.md", "index.ts"]),
            &PickerConfig::default(),
        );
        app.query = "index".to_string();
        app.refresh_results();
        // accept before polling: the latest query still decides the pick
        app.accept();
        match app.outcome {
            Some(Outcome::Accepted(Some(ref sel))) => assert_eq!(sel.label, "index.ts"),
            ref other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_worker_results_are_polled() {
        let mut app = App::new(
            snapshot(&["main.ts", "readme.md", "index.ts"]),
            &PickerConfig::default(),
        );
        app.query = "readme".to_string();
        app.refresh_results();
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.pending_seq.is_some() && Instant::now() < deadline {
            app.poll_scoring();
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(app.pending_seq, None);
        assert_eq!(label_at(&app, 0), "readme.md");
    }
}
