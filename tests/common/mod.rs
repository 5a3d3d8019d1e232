// Shared fakes for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use headline_watch::{
    FeedDocument, FeedItem, FeedSource, FetchError, HealthStatus, Observer, PublishError, Publisher,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, Once};

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn item(id: &str, title: &str) -> FeedItem {
    FeedItem::new(id, title, t0())
}

pub fn document(title: &str, items: Vec<FeedItem>) -> FeedDocument {
    FeedDocument {
        title: title.to_string(),
        items,
    }
}

/// Feed source that replays scripted responses per address. `None` in the
/// script is a fetch failure; an exhausted script repeats its last answer.
#[derive(Default)]
pub struct ScriptedSource {
    scripts: Mutex<HashMap<String, VecDeque<Option<FeedDocument>>>>,
    last: Mutex<HashMap<String, Option<FeedDocument>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, address: &str, response: Option<FeedDocument>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(address.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedSource for ScriptedSource {
    async fn fetch(&self, address: &str) -> Result<FeedDocument, FetchError> {
        self.calls.lock().unwrap().push(address.to_string());

        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(address)
            .and_then(|queue| queue.pop_front());

        let response = match next {
            Some(response) => {
                self.last.lock().unwrap().insert(address.to_string(), response.clone());
                response
            }
            None => self.last.lock().unwrap().get(address).cloned().flatten(),
        };

        response.ok_or_else(|| FetchError::Parse(format!("scripted failure for {}", address)))
    }
}

/// Publisher that records every status and fails those containing any of
/// the configured markers.
#[derive(Default)]
pub struct RecordingPublisher {
    sent: Mutex<Vec<String>>,
    attempts: Mutex<Vec<String>>,
    fail_markers: Vec<String>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(markers: &[&str]) -> Self {
        Self {
            fail_markers: markers.iter().map(|m| m.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    fn publisher_name(&self) -> String {
        "recording".to_string()
    }

    async fn publish(&self, status: &str) -> Result<(), PublishError> {
        self.attempts.lock().unwrap().push(status.to_string());

        if self.fail_markers.iter().any(|m| status.contains(m.as_str())) {
            return Err(PublishError::Rejected {
                code: 187,
                message: "Status is a duplicate.".to_string(),
            });
        }

        self.sent.lock().unwrap().push(status.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Increment(String),
    Histogram(String, f64),
    Check(String, HealthStatus),
    Event(String, String),
}

#[derive(Default)]
pub struct RecordingObserver {
    signals: Mutex<Vec<Signal>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.signals.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.signals()
            .iter()
            .filter(|s| matches!(s, Signal::Increment(n) if n == name))
            .count()
    }

    /// Most recent value recorded for a histogram.
    pub fn last_histogram(&self, name: &str) -> Option<f64> {
        self.signals().iter().rev().find_map(|s| match s {
            Signal::Histogram(n, v) if n == name => Some(*v),
            _ => None,
        })
    }

    pub fn checks(&self, name: &str) -> Vec<HealthStatus> {
        self.signals()
            .iter()
            .filter_map(|s| match s {
                Signal::Check(n, status) if n == name => Some(*status),
                _ => None,
            })
            .collect()
    }

    pub fn events(&self) -> Vec<(String, String)> {
        self.signals()
            .iter()
            .filter_map(|s| match s {
                Signal::Event(title, text) => Some((title.clone(), text.clone())),
                _ => None,
            })
            .collect()
    }
}

impl Observer for RecordingObserver {
    fn increment(&self, name: &str) {
        self.signals.lock().unwrap().push(Signal::Increment(name.to_string()));
    }

    fn histogram(&self, name: &str, value: f64) {
        self.signals
            .lock()
            .unwrap()
            .push(Signal::Histogram(name.to_string(), value));
    }

    fn check(&self, name: &str, status: HealthStatus) {
        self.signals.lock().unwrap().push(Signal::Check(name.to_string(), status));
    }

    fn event(&self, title: &str, text: &str) {
        self.signals
            .lock()
            .unwrap()
            .push(Signal::Event(title.to_string(), text.to_string()));
    }
}
