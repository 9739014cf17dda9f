// tests/common/mod.rs
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use product_ranker::ingest::client::{HttpRequest, HttpResponse, Transport};
use product_ranker::IngestError;
use serde_json::Value;
use tokio::time::Instant;

type Handler = dyn Fn(&HttpRequest, usize) -> Result<HttpResponse, IngestError> + Send + Sync;

/// Transport that answers from a closure and records every request.
/// The closure also gets the 0-based call index.
pub struct ScriptedTransport {
    handler: Box<Handler>,
    calls: AtomicUsize,
    log: Mutex<Vec<(Instant, HttpRequest)>>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest, usize) -> Result<HttpResponse, IngestError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        })
    }

    /// Fails the test if anything is sent.
    pub fn unreachable() -> Arc<Self> {
        Self::new(|req, _| panic!("unexpected network call: {} {}", req.method.as_str(), req.url))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn instants(&self) -> Vec<Instant> {
        self.log.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    pub fn count_matching(&self, url_suffix: &str) -> usize {
        self.requests().iter().filter(|r| r.url.ends_with(url_suffix)).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, req: &HttpRequest) -> Result<HttpResponse, IngestError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push((Instant::now(), req.clone()));
        (self.handler)(req, n)
    }
}

pub fn ok_json(v: Value) -> Result<HttpResponse, IngestError> {
    Ok(HttpResponse {
        status: 200,
        body: v.to_string(),
    })
}

pub fn status(req: &HttpRequest, code: u16) -> Result<HttpResponse, IngestError> {
    Err(IngestError::Status {
        method: req.method.as_str(),
        url: req.url.clone(),
        status: code,
    })
}

pub fn reset(req: &HttpRequest) -> Result<HttpResponse, IngestError> {
    Err(IngestError::Transport {
        method: req.method.as_str(),
        url: req.url.clone(),
        message: "connection reset".into(),
    })
}
