//! Background quote requests
//!
//! Each submission runs on its own worker thread and reports back over a
//! channel that the UI drains once per frame. Submissions are numbered and
//! only the newest one may update the display: a slow response to an older
//! click is dropped instead of overwriting a newer quote.

use crate::config::ApiConfig;
use crate::display::QuoteDisplay;
use crate::quote::{resolve, QuoteBackend, QuoteError, QuoteRequest, QuoteResponse};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

/// Messages from a worker thread to the UI
#[derive(Debug)]
pub struct Completion {
    pub seq: u64,
    pub result: Result<QuoteResponse, QuoteError>,
}

pub struct QuoteRequester {
    backend: Arc<dyn QuoteBackend>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    next_seq: u64,
    /// Sequence number of the request whose answer we are waiting for
    pending: Option<u64>,
}

impl QuoteRequester {
    pub fn new(backend: Arc<dyn QuoteBackend>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            backend,
            tx,
            rx,
            next_seq: 0,
            pending: None,
        }
    }

    /// Fire one request; any earlier request still in flight becomes stale
    pub fn submit(&mut self, request: QuoteRequest) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.pending = Some(seq);

        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = backend.generate(&request);
            // Receiver is gone once the UI has shut down
            let _ = tx.send(Completion { seq, result });
        });

        seq
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Non-blocking; returns the latest request's result once it lands
    pub fn poll(&mut self) -> Option<Result<QuoteResponse, QuoteError>> {
        let mut latest = None;
        while let Ok(done) = self.rx.try_recv() {
            if self.pending == Some(done.seq) {
                self.pending = None;
                latest = Some(done.result);
            } else {
                log::debug!("Dropping stale quote response #{}", done.seq);
            }
        }
        latest
    }
}

/// Move the newest finished request, success or fallback, onto the display.
/// Returns whether the display changed.
pub fn apply_completion(
    requester: &mut QuoteRequester,
    display: &mut QuoteDisplay,
    api: &ApiConfig,
) -> bool {
    match requester.poll() {
        Some(result) => {
            display.set(resolve(result, api));
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::tests::one_shot_server;
    use crate::quote::{HttpQuoteBackend, QuoteForm};
    use std::collections::HashMap;
    use std::net::TcpListener;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    /// Answers keyed by topic; each call waits for its gate to open
    struct ScriptedBackend {
        script: Mutex<HashMap<String, (Receiver<()>, Result<QuoteResponse, QuoteError>)>>,
    }

    impl QuoteBackend for ScriptedBackend {
        fn generate(&self, request: &QuoteRequest) -> Result<QuoteResponse, QuoteError> {
            let topic = request.topic.clone().unwrap_or_default();
            let (gate, result) = self.script.lock().unwrap().remove(&topic).unwrap();
            gate.recv().ok();
            result
        }
    }

    fn ok(quote: &str, author: Option<&str>) -> Result<QuoteResponse, QuoteError> {
        Ok(QuoteResponse {
            quote: quote.to_string(),
            author: author.map(str::to_string),
        })
    }

    fn request(topic: &str) -> QuoteRequest {
        QuoteForm {
            topic: topic.to_string(),
            ..Default::default()
        }
        .to_request()
    }

    fn wait_for(
        requester: &mut QuoteRequester,
        timeout: Duration,
    ) -> Option<Result<QuoteResponse, QuoteError>> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(result) = requester.poll() {
                return Some(result);
            }
            thread::sleep(Duration::from_millis(5));
        }
        None
    }

    fn requester_with(
        answers: Vec<(&str, Result<QuoteResponse, QuoteError>)>,
    ) -> (QuoteRequester, HashMap<String, Sender<()>>) {
        let mut gates = HashMap::new();
        let mut script = HashMap::new();
        for (topic, answer) in answers {
            let (open, gate) = mpsc::channel();
            gates.insert(topic.to_string(), open);
            script.insert(topic.to_string(), (gate, answer));
        }
        let backend = ScriptedBackend {
            script: Mutex::new(script),
        };
        (QuoteRequester::new(Arc::new(backend)), gates)
    }

    #[test]
    fn test_success_clears_loading() {
        let (mut requester, gates) = requester_with(vec![("a", ok("Be bold.", Some("X")))]);
        assert!(!requester.is_loading());

        requester.submit(request("a"));
        assert!(requester.is_loading());
        assert!(requester.poll().is_none());

        gates["a"].send(()).unwrap();
        let result = wait_for(&mut requester, Duration::from_secs(5)).unwrap();
        let quote = resolve(result, &ApiConfig::default());
        assert_eq!(quote.text, "Be bold.");
        assert_eq!(quote.author, "X");
        assert!(!requester.is_loading());
    }

    #[test]
    fn test_failure_falls_back_and_clears_loading() {
        let failure = Err(QuoteError::Status {
            status: 500,
            detail: None,
        });
        let (mut requester, gates) = requester_with(vec![("a", failure)]);

        requester.submit(request("a"));
        gates["a"].send(()).unwrap();

        let result = wait_for(&mut requester, Duration::from_secs(5)).unwrap();
        let quote = resolve(result, &ApiConfig::default());
        assert_eq!(quote.text, "Failed to generate quote.");
        assert_eq!(quote.author, "Swan");
        assert!(!requester.is_loading());
    }

    #[test]
    fn test_stale_response_is_ignored() {
        let (mut requester, gates) = requester_with(vec![
            ("first", ok("first", None)),
            ("second", ok("second", Some("B"))),
        ]);

        let first = requester.submit(request("first"));
        let second = requester.submit(request("second"));
        assert!(second > first);

        // Newer request lands first
        gates["second"].send(()).unwrap();
        let result = wait_for(&mut requester, Duration::from_secs(5)).unwrap();
        assert_eq!(result.unwrap().quote, "second");
        assert!(!requester.is_loading());

        // Older one arrives late and must not surface
        gates["first"].send(()).unwrap();
        assert!(wait_for(&mut requester, Duration::from_millis(200)).is_none());
        assert!(!requester.is_loading());
    }

    #[test]
    fn test_late_older_response_does_not_end_loading() {
        let (mut requester, gates) = requester_with(vec![
            ("first", ok("first", None)),
            ("second", ok("second", None)),
        ]);

        requester.submit(request("first"));
        requester.submit(request("second"));

        gates["first"].send(()).unwrap();
        assert!(wait_for(&mut requester, Duration::from_millis(200)).is_none());
        assert!(requester.is_loading());

        gates["second"].send(()).unwrap();
        let result = wait_for(&mut requester, Duration::from_secs(5)).unwrap();
        assert_eq!(result.unwrap().quote, "second");
    }

    fn apply_until_shown(
        requester: &mut QuoteRequester,
        display: &mut QuoteDisplay,
        api: &ApiConfig,
    ) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !apply_completion(requester, display, api) {
            assert!(Instant::now() < deadline, "request never completed");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_server_error_shows_fallback() {
        let (base_url, server) =
            one_shot_server("500 Internal Server Error", r#"{"detail":"model offline"}"#);
        let api = ApiConfig {
            base_url,
            timeout_secs: 5,
            ..Default::default()
        };
        let mut requester = QuoteRequester::new(Arc::new(HttpQuoteBackend::new(&api).unwrap()));
        let mut display = QuoteDisplay::new();
        assert!(!apply_completion(&mut requester, &mut display, &api));

        requester.submit(request("grit"));
        apply_until_shown(&mut requester, &mut display, &api);
        server.join().unwrap();

        let shown = display.visible().unwrap();
        assert_eq!(shown.text, "Failed to generate quote.");
        assert_eq!(shown.author, "Swan");
        assert!(!requester.is_loading());
    }

    #[test]
    fn test_unreachable_server_shows_fallback() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let api = ApiConfig {
            base_url: format!("http://{}", addr),
            timeout_secs: 5,
            ..Default::default()
        };
        let mut requester = QuoteRequester::new(Arc::new(HttpQuoteBackend::new(&api).unwrap()));
        let mut display = QuoteDisplay::new();

        requester.submit(request("grit"));
        apply_until_shown(&mut requester, &mut display, &api);

        let shown = display.visible().unwrap();
        assert_eq!(shown.text, "Failed to generate quote.");
        assert_eq!(shown.author, "Swan");
        assert!(!requester.is_loading());
    }

    #[test]
    fn test_success_replaces_previous_quote() {
        let (base_url, server) =
            one_shot_server("200 OK", r#"{"quote":"Keep going.","author":"Ada"}"#);
        let api = ApiConfig {
            base_url,
            timeout_secs: 5,
            ..Default::default()
        };
        let mut requester = QuoteRequester::new(Arc::new(HttpQuoteBackend::new(&api).unwrap()));
        let mut display = QuoteDisplay::new();
        display.set(resolve(ok("old", None), &api));

        requester.submit(request("grit"));
        apply_until_shown(&mut requester, &mut display, &api);
        server.join().unwrap();

        let shown = display.visible().unwrap();
        assert_eq!(shown.text, "Keep going.");
        assert_eq!(shown.author, "Ada");
    }
}
