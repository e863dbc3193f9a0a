//! Session state machine: `Upload -> Analyzing -> Results`, with failures
//! falling back to `Upload`.
//!
//! The state is the single source of truth for what the view renders and the
//! transitions below are the only way to change it. Entry into `Analyzing`
//! happens only through the upload gate, so at most one request is in flight.
//!
//! Callers that run the request elsewhere (the TUI worker) use
//! [`Session::begin`] / [`Session::complete`]; everything else can use
//! [`Session::run`], which drives both with an [`Analyzer`].

use crate::error::{AnalysisError, SessionError};
use crate::model::AnalysisResult;
use paylens_ingest::{InputSource, UploadCandidate, UploadGate, Verdict};
use std::future::Future;

/// Anything that can turn an accepted PDF into an analysis.
pub trait Analyzer {
    fn analyze(
        &self,
        candidate: &UploadCandidate,
    ) -> impl Future<Output = Result<AnalysisResult, AnalysisError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Upload,
    Analyzing,
    Results(Box<AnalysisResult>),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Upload => "upload",
            SessionState::Analyzing => "analyzing",
            SessionState::Results(_) => "results",
        }
    }
}

/// An accepted submission. The request id ties the eventual completion back
/// to this submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub request_id: u64,
    pub candidate: UploadCandidate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Results are now showing
    Applied,
    /// Back at upload; the error is for the caller to surface
    Failed(AnalysisError),
    /// Completion for a request that was cancelled or superseded
    Stale,
}

#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    last_request_id: u64,
    in_flight: Option<u64>,
    selected_file: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn results(&self) -> Option<&AnalysisResult> {
        match &self.state {
            SessionState::Results(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, SessionState::Analyzing)
    }

    /// Name of the file most recently accepted by the gate.
    pub fn selected_file(&self) -> Option<&str> {
        self.selected_file.as_deref()
    }

    /// Validate a candidate and, if accepted, enter `Analyzing`.
    ///
    /// Rejection leaves the state untouched.
    pub fn begin(
        &mut self,
        source: InputSource,
        candidate: Option<UploadCandidate>,
    ) -> Result<Ticket, SessionError> {
        match self.state {
            SessionState::Upload => {}
            SessionState::Analyzing => return Err(SessionError::Busy),
            SessionState::Results(_) => return Err(SessionError::NotAtUpload),
        }

        let candidate = match UploadGate::submit(source, candidate) {
            Verdict::Accepted(c) => c,
            Verdict::Rejected(r) => return Err(r.into()),
        };

        self.last_request_id += 1;
        let request_id = self.last_request_id;
        self.in_flight = Some(request_id);
        self.selected_file = Some(candidate.file_name.clone());
        self.transition(SessionState::Analyzing);

        Ok(Ticket {
            request_id,
            candidate,
        })
    }

    /// Apply the outcome of the request identified by `request_id`.
    pub fn complete(
        &mut self,
        request_id: u64,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> Completion {
        if self.in_flight != Some(request_id) {
            tracing::debug!(request_id, "ignoring stale analysis completion");
            return Completion::Stale;
        }
        self.in_flight = None;

        match outcome {
            Ok(result) => {
                tracing::info!(
                    transactions = result.transactions.len(),
                    pages = result.page_count,
                    "analysis complete"
                );
                self.transition(SessionState::Results(Box::new(result)));
                Completion::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "analysis failed");
                self.transition(SessionState::Upload);
                Completion::Failed(e)
            }
        }
    }

    /// Abandon the in-flight request. Returns false if nothing was running.
    pub fn cancel(&mut self) -> bool {
        if !self.is_analyzing() {
            return false;
        }
        self.in_flight = None;
        self.transition(SessionState::Upload);
        true
    }

    /// Start over from the upload view, dropping any results.
    pub fn reset(&mut self) {
        self.in_flight = None;
        self.selected_file = None;
        self.transition(SessionState::Upload);
    }

    /// Gate, analyze once, and transition.
    pub async fn run<A: Analyzer>(
        &mut self,
        analyzer: &A,
        source: InputSource,
        candidate: Option<UploadCandidate>,
    ) -> Result<&AnalysisResult, SessionError> {
        let ticket = self.begin(source, candidate)?;
        let outcome = analyzer.analyze(&ticket.candidate).await;

        if let Completion::Failed(e) = self.complete(ticket.request_id, outcome) {
            return Err(e.into());
        }

        match &self.state {
            SessionState::Results(r) => Ok(r),
            _ => Err(SessionError::Busy),
        }
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = self.state.name(), to = next.name(), "session transition");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GENERIC_FAILURE_MESSAGE;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeAnalyzer {
        calls: AtomicUsize,
        outcome: Result<AnalysisResult, AnalysisError>,
    }

    impl FakeAnalyzer {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: Ok(AnalysisResult {
                    page_count: 2,
                    ..Default::default()
                }),
            }
        }

        fn failing(e: AnalysisError) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: Err(e),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Analyzer for FakeAnalyzer {
        async fn analyze(
            &self,
            _candidate: &UploadCandidate,
        ) -> Result<AnalysisResult, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn pdf() -> UploadCandidate {
        UploadCandidate::new("statement.pdf", "application/pdf", b"%PDF-1.7".to_vec())
    }

    fn txt() -> UploadCandidate {
        UploadCandidate::new("notes.txt", "text/plain", b"hi".to_vec())
    }

    #[tokio::test]
    async fn test_non_pdf_never_reaches_analyzer() {
        let analyzer = FakeAnalyzer::ok();
        let mut s = Session::new();

        let err = s
            .run(&analyzer, InputSource::FilePicker, Some(txt()))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Rejected(_)));
        assert_eq!(analyzer.calls(), 0);
        assert_eq!(s.state(), &SessionState::Upload);
    }

    #[tokio::test]
    async fn test_pdf_issues_exactly_one_request() {
        let analyzer = FakeAnalyzer::ok();
        let mut s = Session::new();

        let r = s
            .run(&analyzer, InputSource::DragDrop, Some(pdf()))
            .await
            .unwrap();
        assert_eq!(r.page_count, 2);
        assert_eq!(analyzer.calls(), 1);
        assert_eq!(s.state().name(), "results");
        assert_eq!(s.selected_file(), Some("statement.pdf"));
    }

    #[tokio::test]
    async fn test_failure_returns_to_upload() {
        let analyzer = FakeAnalyzer::failing(AnalysisError::transport("connection reset"));
        let mut s = Session::new();

        let err = s
            .run(&analyzer, InputSource::FilePicker, Some(pdf()))
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(s.state(), &SessionState::Upload);
        assert!(s.results().is_none());
        assert_eq!(analyzer.calls(), 1);
    }

    #[test]
    fn test_begin_enters_analyzing_synchronously() {
        let mut s = Session::new();
        let ticket = s.begin(InputSource::FilePicker, Some(pdf())).unwrap();
        assert_eq!(ticket.request_id, 1);
        assert!(s.is_analyzing());
    }

    #[test]
    fn test_second_submit_while_analyzing_is_busy() {
        let mut s = Session::new();
        s.begin(InputSource::FilePicker, Some(pdf())).unwrap();
        let err = s.begin(InputSource::DragDrop, Some(pdf())).unwrap_err();
        assert_eq!(err, SessionError::Busy);
    }

    #[test]
    fn test_no_direct_edge_from_results_to_analyzing() {
        let mut s = Session::new();
        let t = s.begin(InputSource::FilePicker, Some(pdf())).unwrap();
        assert_eq!(s.complete(t.request_id, Ok(AnalysisResult::default())), Completion::Applied);

        let err = s.begin(InputSource::FilePicker, Some(pdf())).unwrap_err();
        assert_eq!(err, SessionError::NotAtUpload);

        s.reset();
        assert_eq!(s.state(), &SessionState::Upload);
        let t2 = s.begin(InputSource::FilePicker, Some(pdf())).unwrap();
        assert_eq!(t2.request_id, 2);
    }

    #[test]
    fn test_cancel_makes_completion_stale() {
        let mut s = Session::new();
        let t = s.begin(InputSource::FilePicker, Some(pdf())).unwrap();
        assert!(s.cancel());
        assert_eq!(s.state(), &SessionState::Upload);

        assert_eq!(s.complete(t.request_id, Ok(AnalysisResult::default())), Completion::Stale);
        assert_eq!(s.state(), &SessionState::Upload);
        assert!(!s.cancel());
    }

    #[test]
    fn test_superseded_request_is_ignored() {
        let mut s = Session::new();
        let first = s.begin(InputSource::FilePicker, Some(pdf())).unwrap();
        s.cancel();
        let second = s.begin(InputSource::FilePicker, Some(pdf())).unwrap();

        assert_eq!(
            s.complete(first.request_id, Err(AnalysisError::transport("late"))),
            Completion::Stale
        );
        assert!(s.is_analyzing());
        assert_eq!(s.complete(second.request_id, Ok(AnalysisResult::default())), Completion::Applied);
    }

    #[test]
    fn test_rejection_after_reset_stays_at_upload() {
        let mut s = Session::new();
        let t = s.begin(InputSource::FilePicker, Some(pdf())).unwrap();
        s.complete(t.request_id, Ok(AnalysisResult::default()));
        s.reset();

        let err = s.begin(InputSource::DragDrop, None).unwrap_err();
        assert_eq!(err.user_message(), "Please drop a valid PDF file");
        assert_eq!(s.state(), &SessionState::Upload);
    }
}
