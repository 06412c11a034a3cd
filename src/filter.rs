use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::ScoringError;
use crate::matcher::{Matcher, ParsedQuery};
use crate::types::{SessionState, TabKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<R> {
    pub label: String,
    pub description: String,
    pub kind: TabKind,
    /// Host back-reference; carried through untouched.
    pub source: R,
    /// Set while the candidate matches the current query.
    pub force_show: bool,
}

impl<R> Candidate<R> {
    pub fn new(
        label: impl Into<String>,
        description: impl Into<String>,
        kind: TabKind,
        source: R,
    ) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            kind,
            source,
            force_show: false,
        }
    }
}

/// The matchable text of one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFields {
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRow {
    /// Index into the candidate set.
    pub index: usize,
    pub score: Option<f64>,
    pub force_show: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub rows: Vec<RenderRow>,
    /// Best-scoring match, if any.
    pub best: Option<usize>,
}

impl Ranking {
    fn unranked(len: usize) -> Self {
        Self {
            rows: (0..len)
                .map(|index| RenderRow {
                    index,
                    score: None,
                    force_show: false,
                })
                .collect(),
            best: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderUpdate {
    pub seq: u64,
    pub rows: Vec<RenderRow>,
    /// Default highlight. `None` leaves the renderer's current highlight.
    pub active: Option<usize>,
}

impl RenderUpdate {
    pub fn match_count(&self) -> usize {
        self.rows.iter().filter(|r| r.force_show).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub seq: u64,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredQuery {
    pub seq: u64,
    pub query: String,
    pub result: Result<Ranking, ScoringError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinalSelection<R> {
    pub source: R,
    pub kind: TabKind,
    pub label: String,
}

/// Rank every candidate against an already parsed query.
pub fn rank(fields: &[MatchFields], matcher: &Matcher, query: &ParsedQuery) -> Ranking {
    if query.is_empty() {
        // Whitespace only: nothing can match.
        return Ranking::unranked(fields.len());
    }
    let mut matched: Vec<(usize, f64)> = fields
        .iter()
        .enumerate()
        .filter_map(|(i, f)| {
            matcher
                .score_fields(query, &[&f.label, &f.description])
                .map(|score| (i, score))
        })
        .collect();
    // sort_by is stable: equal scores keep candidate order.
    matched.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut is_match = vec![false; fields.len()];
    for (i, _) in &matched {
        is_match[*i] = true;
    }
    let best = matched.first().map(|(i, _)| *i);
    let rows = matched
        .iter()
        .map(|&(index, score)| RenderRow {
            index,
            score: Some(score),
            force_show: true,
        })
        .chain((0..fields.len()).filter(|i| !is_match[*i]).map(|index| RenderRow {
            index,
            score: None,
            force_show: false,
        }))
        .collect();
    Ranking { rows, best }
}

/// Rank against a raw query string. The empty string restores the original order.
pub fn rank_query(
    fields: &[MatchFields],
    matcher: &Matcher,
    query: &str,
) -> Result<Ranking, ScoringError> {
    if query.is_empty() {
        return Ok(Ranking::unranked(fields.len()));
    }
    let parsed = matcher.parse(query)?;
    Ok(rank(fields, matcher, &parsed))
}

pub fn score_request(
    fields: &[MatchFields],
    matcher: &Matcher,
    request: QueryRequest,
) -> ScoredQuery {
    let result = rank_query(fields, matcher, &request.query);
    ScoredQuery {
        seq: request.seq,
        query: request.query,
        result,
    }
}

pub struct FilterSession<R> {
    candidates: Vec<Candidate<R>>,
    fields: Arc<[MatchFields]>,
    matcher: Matcher,
    query: String,
    rows: Vec<RenderRow>,
    active: Option<usize>,
    state: SessionState,
    issued_seq: u64,
}

impl<R> FilterSession<R> {
    pub fn new(mut candidates: Vec<Candidate<R>>, matcher: Matcher) -> Self {
        for c in &mut candidates {
            c.force_show = false;
        }
        let fields: Arc<[MatchFields]> = candidates
            .iter()
            .map(|c| MatchFields {
                label: c.label.clone(),
                description: c.description.clone(),
            })
            .collect();
        info!(candidates = candidates.len(), "filter session opened");
        Self {
            rows: Ranking::unranked(candidates.len()).rows,
            candidates,
            fields,
            matcher,
            query: String::new(),
            active: None,
            state: SessionState::Open,
            issued_seq: 0,
        }
    }

    pub fn candidates(&self) -> &[Candidate<R>] {
        &self.candidates
    }

    pub fn candidate(&self, index: usize) -> Option<&Candidate<R>> {
        self.candidates.get(index)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Shared copy of the matchable text, for scoring on another thread.
    pub fn match_fields(&self) -> Arc<[MatchFields]> {
        Arc::clone(&self.fields)
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn rows(&self) -> &[RenderRow] {
        &self.rows
    }

    pub fn default_active(&self) -> Option<usize> {
        self.active
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Issue a request for `query`. Any earlier request becomes stale.
    pub fn begin_query(&mut self, query: &str) -> QueryRequest {
        self.issued_seq += 1;
        QueryRequest {
            seq: self.issued_seq,
            query: query.to_string(),
        }
    }

    /// Apply a scored query.
    ///
    /// Returns `Ok(None)` when the session is closed or the result belongs to
    /// a superseded request. A scoring failure leaves the current rows as
    /// they were.
    pub fn apply(
        &mut self,
        scored: ScoredQuery,
    ) -> Result<Option<RenderUpdate>, ScoringError> {
        if !self.is_open() {
            return Ok(None);
        }
        if scored.seq != self.issued_seq {
            debug!(
                seq = scored.seq,
                latest = self.issued_seq,
                "dropping stale scoring result"
            );
            return Ok(None);
        }
        let ranking = match scored.result {
            Ok(ranking) => ranking,
            Err(err) => {
                warn!(query = %scored.query, error = %err, "query could not be scored");
                return Err(err);
            }
        };
        for row in &ranking.rows {
            if let Some(c) = self.candidates.get_mut(row.index) {
                c.force_show = row.force_show;
            }
        }
        debug!(
            query = %scored.query,
            matches = ranking.rows.iter().filter(|r| r.force_show).count(),
            "ranking applied"
        );
        self.query = scored.query;
        self.rows = ranking.rows;
        self.active = ranking.best;
        Ok(Some(RenderUpdate {
            seq: scored.seq,
            rows: self.rows.clone(),
            active: self.active,
        }))
    }

    /// Score `query` synchronously and apply it.
    pub fn on_query_change(
        &mut self,
        query: &str,
    ) -> Result<Option<RenderUpdate>, ScoringError> {
        if !self.is_open() {
            return Ok(None);
        }
        let request = self.begin_query(query);
        let scored = score_request(&self.fields, &self.matcher, request);
        self.apply(scored)
    }

    pub fn cancel(&mut self) {
        if self.is_open() {
            info!("filter session cancelled");
        }
        self.state = SessionState::Closed;
    }
}

impl<R: Clone> FilterSession<R> {
    /// Finish the session with the highlighted candidate, if any. The session
    /// is closed afterwards whatever the outcome.
    pub fn on_accept(&mut self, selected: Option<usize>) -> Option<FinalSelection<R>> {
        if !self.is_open() {
            return None;
        }
        self.state = SessionState::Closed;
        let candidate = selected.and_then(|i| self.candidates.get(i))?;
        info!(label = %candidate.label, "tab accepted");
        Some(FinalSelection {
            source: candidate.source.clone(),
            kind: candidate.kind,
            label: candidate.label.clone(),
        })
    }
}
