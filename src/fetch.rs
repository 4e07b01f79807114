use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use reqwest::header::ACCEPT;

use crate::error::{DashboardError, Result};
use crate::models::DashboardStats;
use crate::store::Action;

/// Anything that can produce a validated payload.
pub trait StatsSource: Send + 'static {
    fn fetch(&self) -> Result<DashboardStats>;
    fn describe(&self) -> String;
}

/// `GET` against the fixed dashboard endpoint. No query parameters.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpSource {
    /// `timeout` of `None` waits indefinitely.
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

impl StatsSource for HttpSource {
    fn fetch(&self) -> Result<DashboardStats> {
        tracing::debug!(endpoint = %self.endpoint, "requesting dashboard stats");
        let resp = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "application/json")
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DashboardError::Status {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let body = resp.text()?;
        Ok(DashboardStats::from_json(&body)?)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

// ---------------------------------------------------------------------------
// Fetch controller
// ---------------------------------------------------------------------------

/// A single in-flight load, started by [`load`]. The outcome is handed to the
/// UI thread through [`PendingLoad::poll`]; once the view is unmounted any late
/// result is dropped.
pub struct PendingLoad {
    rx: Receiver<Result<DashboardStats>>,
    mounted: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    done: bool,
}

/// Issue the request on a worker thread. Called once per mount; nothing
/// re-issues it and there is no retry.
pub fn load<S: StatsSource>(source: S) -> PendingLoad {
    let mounted = Arc::new(AtomicBool::new(true));
    let guard = Arc::clone(&mounted);
    let (tx, rx) = mpsc::channel();

    tracing::info!(source = %source.describe(), "loading dashboard");
    let worker = thread::spawn(move || {
        let result = source.fetch();
        if guard.load(Ordering::Acquire) {
            let _ = tx.send(result);
        } else {
            tracing::debug!("view torn down before load finished; discarding result");
        }
    });

    PendingLoad {
        rx,
        mounted,
        worker: Some(worker),
        done: false,
    }
}

impl PendingLoad {
    /// Non-blocking. Yields the completion action exactly once.
    pub fn poll(&mut self) -> Option<Action> {
        if self.done || !self.is_mounted() {
            return None;
        }
        let action = match self.rx.try_recv() {
            Ok(Ok(stats)) => Action::StatsLoaded(stats),
            Ok(Err(e)) => Action::LoadFailed(e),
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Action::LoadFailed(DashboardError::Other(
                "fetch worker exited without a result".into(),
            )),
        };
        self.done = true;
        Some(action)
    }

    /// Block until the load completes. Used by the one-shot commands.
    pub fn wait(mut self) -> Result<DashboardStats> {
        self.done = true;
        match self.rx.recv() {
            Ok(result) => result,
            Err(_) => Err(DashboardError::Other(
                "fetch worker exited without a result".into(),
            )),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.done
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }

    #[cfg(test)]
    fn join_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            handle.join().unwrap();
        }
    }
}

impl Drop for PendingLoad {
    fn drop(&mut self) {
        self.unmount();
        // The worker is detached: a hung request must not block teardown.
        self.worker.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::SAMPLE;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::Mutex;

    struct FixedSource(Mutex<Option<Result<DashboardStats>>>);

    impl FixedSource {
        fn new(result: Result<DashboardStats>) -> Self {
            Self(Mutex::new(Some(result)))
        }
    }

    impl StatsSource for FixedSource {
        fn fetch(&self) -> Result<DashboardStats> {
            self.0
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(DashboardError::Other("already fetched".into())))
        }

        fn describe(&self) -> String {
            "fixed".into()
        }
    }

    /// Blocks inside `fetch` until the test releases it.
    struct GatedSource {
        gate: Mutex<Receiver<()>>,
    }

    impl StatsSource for GatedSource {
        fn fetch(&self) -> Result<DashboardStats> {
            let _ = self.gate.lock().unwrap().recv();
            Ok(DashboardStats::from_json(SAMPLE)?)
        }

        fn describe(&self) -> String {
            "gated".into()
        }
    }

    fn poll_until_done(pending: &mut PendingLoad) -> Action {
        for _ in 0..500 {
            if let Some(action) = pending.poll() {
                return action;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("load never completed");
    }

    #[test]
    fn test_load_delivers_stats_once() {
        let stats = DashboardStats::from_json(SAMPLE).unwrap();
        let mut pending = load(FixedSource::new(Ok(stats)));
        match poll_until_done(&mut pending) {
            Action::StatsLoaded(s) => assert_eq!(s.total_products, 10),
            _ => panic!("expected StatsLoaded"),
        }
        assert!(pending.is_finished());
        assert!(pending.poll().is_none());
    }

    #[test]
    fn test_load_delivers_failure() {
        let mut pending = load(FixedSource::new(Err(DashboardError::Status {
            status: 500,
            url: "x".into(),
        })));
        match poll_until_done(&mut pending) {
            Action::LoadFailed(e) => assert!(matches!(e, DashboardError::Status { status: 500, .. })),
            _ => panic!("expected LoadFailed"),
        }
    }

    #[test]
    fn test_result_after_unmount_is_dropped() {
        let (release, gate) = mpsc::channel();
        let mut pending = load(GatedSource {
            gate: Mutex::new(gate),
        });
        assert!(pending.poll().is_none());

        pending.unmount();
        release.send(()).unwrap();
        pending.join_worker();

        assert!(!pending.is_mounted());
        assert!(pending.poll().is_none());
        assert!(!pending.is_finished());
    }

    #[test]
    fn test_wait_blocks_for_result() {
        let stats = DashboardStats::from_json(SAMPLE).unwrap();
        let pending = load(FixedSource::new(Ok(stats)));
        assert_eq!(pending.wait().unwrap().total_purchases, 7.0);
    }

    // -- HttpSource against a local one-shot server --------------------------

    fn serve_once(status_line: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let mut request = Vec::new();
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}/api/dashboard")
    }

    #[test]
    fn test_http_source_success() {
        let url = serve_once("200 OK", SAMPLE);
        let source = HttpSource::new(&url, Some(Duration::from_secs(5))).unwrap();
        let stats = source.fetch().unwrap();
        assert_eq!(stats.total_sales, 5.0);
        assert_eq!(source.describe(), url);
    }

    #[test]
    fn test_http_source_status_error() {
        let url = serve_once("500 Internal Server Error", "{}");
        let source = HttpSource::new(&url, Some(Duration::from_secs(5))).unwrap();
        let err = source.fetch().unwrap_err();
        assert!(matches!(err, DashboardError::Status { status: 500, .. }));
    }

    #[test]
    fn test_http_source_malformed_body() {
        let url = serve_once("200 OK", "{\"totalProducts\": \"many\"}");
        let source = HttpSource::new(&url, Some(Duration::from_secs(5))).unwrap();
        let err = source.fetch().unwrap_err();
        assert!(matches!(err, DashboardError::Payload(_)));
    }

    #[test]
    fn test_http_source_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let source =
            HttpSource::new(&format!("http://{addr}/api/dashboard"), Some(Duration::from_secs(5)))
                .unwrap();
        let err = source.fetch().unwrap_err();
        assert!(matches!(err, DashboardError::Http(_)));
    }
}
