use paylens_core::{AnalysisError, AnalysisResult, Analyzer};
use paylens_ingest::UploadCandidate;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub request_id: u64,
    pub candidate: UploadCandidate,
}

#[derive(Debug, Clone)]
pub enum WorkerCommand {
    Analyze(AnalyzeRequest),
    Cancel,
}

#[derive(Debug, Clone)]
pub enum AnalysisEvent {
    Started {
        request_id: u64,
    },
    Finished {
        request_id: u64,
        outcome: Result<AnalysisResult, AnalysisError>,
    },
}

/// Runs one analysis at a time. A new request or a cancel aborts whatever is
/// in flight; the aborted request never reports back.
pub async fn run_worker<A>(
    analyzer: A,
    mut rx: mpsc::UnboundedReceiver<WorkerCommand>,
    tx: std::sync::mpsc::Sender<AnalysisEvent>,
) where
    A: Analyzer + Send + Sync + 'static,
{
    let analyzer = Arc::new(analyzer);
    let mut current: Option<tokio::task::JoinHandle<()>> = None;

    while let Some(cmd) = rx.recv().await {
        if let Some(h) = current.take() {
            h.abort();
        }

        let req = match cmd {
            WorkerCommand::Analyze(req) => req,
            WorkerCommand::Cancel => {
                tracing::debug!("analysis cancelled");
                continue;
            }
        };

        let analyzer = Arc::clone(&analyzer);
        let tx2 = tx.clone();
        current = Some(tokio::spawn(async move {
            let _ = tx2.send(AnalysisEvent::Started {
                request_id: req.request_id,
            });
            let outcome = analyzer.analyze(&req.candidate).await;
            let _ = tx2.send(AnalysisEvent::Finished {
                request_id: req.request_id,
                outcome,
            });
        }));
    }

    if let Some(h) = current.take() {
        h.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Files named `slow*` never finish within a test.
    struct SlowOrFast;

    impl Analyzer for SlowOrFast {
        async fn analyze(&self, c: &UploadCandidate) -> Result<AnalysisResult, AnalysisError> {
            if c.file_name.starts_with("slow") {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok(AnalysisResult {
                page_count: 1,
                ..Default::default()
            })
        }
    }

    fn request(request_id: u64, name: &str) -> WorkerCommand {
        WorkerCommand::Analyze(AnalyzeRequest {
            request_id,
            candidate: UploadCandidate::new(name, "application/pdf", b"%PDF".to_vec()),
        })
    }

    async fn finished_ids(rx: &std::sync::mpsc::Receiver<AnalysisEvent>, wait: Duration) -> Vec<u64> {
        let deadline = tokio::time::Instant::now() + wait;
        let mut ids = Vec::new();
        while tokio::time::Instant::now() < deadline {
            while let Ok(ev) = rx.try_recv() {
                if let AnalysisEvent::Finished { request_id, .. } = ev {
                    ids.push(request_id);
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        ids
    }

    #[tokio::test]
    async fn test_new_request_supersedes_in_flight() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (ev_tx, ev_rx) = std::sync::mpsc::channel();
        tokio::spawn(run_worker(SlowOrFast, cmd_rx, ev_tx));

        cmd_tx.send(request(1, "slow.pdf")).unwrap();
        cmd_tx.send(request(2, "fast.pdf")).unwrap();

        assert_eq!(finished_ids(&ev_rx, Duration::from_millis(300)).await, vec![2]);
    }

    #[tokio::test]
    async fn test_cancel_silences_in_flight() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (ev_tx, ev_rx) = std::sync::mpsc::channel();
        tokio::spawn(run_worker(SlowOrFast, cmd_rx, ev_tx));

        cmd_tx.send(request(7, "slow.pdf")).unwrap();
        cmd_tx.send(WorkerCommand::Cancel).unwrap();

        assert!(finished_ids(&ev_rx, Duration::from_millis(200)).await.is_empty());
    }
}
