use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use tracing::debug;

use crate::filter::{MatchFields, QueryRequest, ScoredQuery, score_request};
use crate::matcher::Matcher;

/// Scores queries on a background thread so typing never waits on ranking.
pub(crate) struct ScoringWorker {
    tx: Sender<QueryRequest>,
    rx: Receiver<ScoredQuery>,
}

impl ScoringWorker {
    pub(crate) fn spawn(fields: Arc<[MatchFields]>, matcher: Matcher) -> io::Result<Self> {
        let (req_tx, req_rx) = mpsc::channel::<QueryRequest>();
        let (res_tx, res_rx) = mpsc::channel::<ScoredQuery>();
        thread::Builder::new()
            .name("tabz-scorer".to_string())
            .spawn(move || scoring_loop(&fields, &matcher, req_rx, res_tx))?;
        Ok(Self {
            tx: req_tx,
            rx: res_rx,
        })
    }

    /// Returns false once the worker thread is gone.
    pub(crate) fn submit(&self, request: QueryRequest) -> bool {
        self.tx.send(request).is_ok()
    }

    pub(crate) fn try_results(&self) -> Vec<ScoredQuery> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(scored) => out.push(scored),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }
}

/// Runs until the request channel closes. Requests queued behind a newer one
/// are skipped without scoring.
pub(crate) fn scoring_loop(
    fields: &[MatchFields],
    matcher: &Matcher,
    rx: Receiver<QueryRequest>,
    tx: Sender<ScoredQuery>,
) {
    while let Ok(mut request) = rx.recv() {
        while let Ok(newer) = rx.try_recv() {
            debug!(seq = request.seq, "skipping superseded query");
            request = newer;
        }
        if tx.send(score_request(fields, matcher, request)).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn fields() -> Arc<[MatchFields]> {
        ["main.ts", "readme.md", "index.ts"]
            .iter()
            .map(|l| MatchFields {
                label: l.to_string(),
                description: String::new(),
            })
            .collect()
    }

    fn request(seq: u64, query: &str) -> QueryRequest {
        QueryRequest {
            seq,
            query: query.to_string(),
        }
    }

    #[test]
    fn test_scoring_loop_only_scores_newest_queued_request() {
        let (req_tx, req_rx) = mpsc::channel();
        let (res_tx, res_rx) = mpsc::channel();
        req_tx.send(request(1, "m")).unwrap();
        req_tx.send(request(2, "ma")).unwrap();
        req_tx.send(request(3, "index")).unwrap();
        drop(req_tx);

        scoring_loop(&fields(), &Matcher::default(), req_rx, res_tx);

        let results: Vec<ScoredQuery> = res_rx.try_iter().collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].seq, 3);
        let ranking = results[0].result.as_ref().unwrap();
        assert_eq!(ranking.best, Some(2));
    }

    #[test]
    fn test_scoring_loop_reports_failures() {
        let (req_tx, req_rx) = mpsc::channel();
        let (res_tx, res_rx) = mpsc::channel();
        req_tx.send(request(7, "'")).unwrap();
        drop(req_tx);

        scoring_loop(&fields(), &Matcher::default(), req_rx, res_tx);

        let scored = res_rx.try_recv().unwrap();
        assert_eq!(scored.seq, 7);
        assert!(scored.result.is_err());
    }

    #[test]
    fn test_scoring_loop_stops_when_results_dropped() {
        let (req_tx, req_rx) = mpsc::channel();
        let (res_tx, res_rx) = mpsc::channel::<ScoredQuery>();
        drop(res_rx);
        req_tx.send(request(1, "main")).unwrap();
        // returns instead of blocking on the still-open request channel
        scoring_loop(&fields(), &Matcher::default(), req_rx, res_tx);
    }

    #[test]
    fn test_worker_round_trip() {
        let worker = ScoringWorker::spawn(fields(), Matcher::default()).expect("spawn worker");
        assert!(worker.submit(request(1, "readme")));

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut results = Vec::new();
        while results.is_empty() && Instant::now() < deadline {
            results = worker.try_results();
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].result.as_ref().unwrap().best, Some(1));
    }
}
