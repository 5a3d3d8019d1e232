//! Fire-and-forget telemetry. Nothing here may fail the caller: sink
//! errors are logged and dropped.

use std::net::{SocketAddr, UdpSocket};
use tracing::{debug, info, warn};

/// Metric and check names shared with the dashboards.
pub mod metrics {
    pub const ARTICLE_NEW: &str = "article_new";
    pub const ARTICLE_STALE: &str = "article_stale";
    pub const ARTICLE_CHANGED: &str = "article_changed";
    pub const ERROR_RATE: &str = "error_rate";
    pub const ARTICLE_COUNT: &str = "article_count";
    pub const FEEDITEMS_COUNT: &str = "feeditems_count";
    pub const COUNT_PURGED: &str = "count_purged";
    pub const SERVICE_UP: &str = "service.up";
    pub const TWEET_RESULT: &str = "tweet_result";
    pub const PUBLISH_FAILED_EVENT: &str = "Status update failed";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Ok,
    Warning,
}

impl HealthStatus {
    /// DogStatsD service check status code.
    pub fn code(self) -> u8 {
        match self {
            HealthStatus::Ok => 0,
            HealthStatus::Warning => 1,
        }
    }
}

/// Sink for counters, histograms, health checks and events.
pub trait Observer: Send + Sync {
    fn increment(&self, name: &str);

    fn histogram(&self, name: &str, value: f64);

    fn check(&self, name: &str, status: HealthStatus);

    fn event(&self, title: &str, text: &str);
}

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn increment(&self, _name: &str) {}

    fn histogram(&self, _name: &str, _value: f64) {}

    fn check(&self, _name: &str, _status: HealthStatus) {}

    fn event(&self, _title: &str, _text: &str) {}
}

/// Writes telemetry to the tracing log, for runs without a StatsD agent.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn increment(&self, name: &str) {
        debug!(metric = name, "counter +1");
    }

    fn histogram(&self, name: &str, value: f64) {
        debug!(metric = name, value, "histogram");
    }

    fn check(&self, name: &str, status: HealthStatus) {
        debug!(check = name, ?status, "service check");
    }

    fn event(&self, title: &str, text: &str) {
        info!("Telemetry event: {}: {}", title, text);
    }
}

/// DogStatsD client over UDP.
pub struct StatsdObserver {
    socket: UdpSocket,
    prefix: String,
}

impl StatsdObserver {
    pub fn connect(addr: SocketAddr, prefix: impl Into<String>) -> std::io::Result<Self> {
        let bind_addr: SocketAddr = if addr.is_ipv4() {
            ([0u8; 4], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(bind_addr)?;
        socket.connect(addr)?;
        socket.set_nonblocking(true)?;

        info!("Sending telemetry to StatsD at {}", addr);
        Ok(Self {
            socket,
            prefix: prefix.into(),
        })
    }

    pub fn counter_line(&self, name: &str) -> String {
        format!("{}{}:1|c", self.prefix, metric_name(name))
    }

    pub fn histogram_line(&self, name: &str, value: f64) -> String {
        format!("{}{}:{}|h", self.prefix, metric_name(name), value)
    }

    pub fn check_line(&self, name: &str, status: HealthStatus) -> String {
        format!("_sc|{}{}|{}", self.prefix, metric_name(name), status.code())
    }

    /// Lengths are byte counts of the escaped title and text.
    pub fn event_line(&self, title: &str, text: &str) -> String {
        let title = event_field(title);
        let text = event_field(text);
        format!("_e{{{},{}}}:{}|{}", title.len(), text.len(), title, text)
    }

    fn send(&self, line: String) {
        if let Err(e) = self.socket.send(line.as_bytes()) {
            warn!("Dropping telemetry datagram {:?}: {}", line, e);
        }
    }
}

impl Observer for StatsdObserver {
    fn increment(&self, name: &str) {
        self.send(self.counter_line(name));
    }

    fn histogram(&self, name: &str, value: f64) {
        self.send(self.histogram_line(name, value));
    }

    fn check(&self, name: &str, status: HealthStatus) {
        self.send(self.check_line(name, status));
    }

    fn event(&self, title: &str, text: &str) {
        self.send(self.event_line(title, text));
    }
}

/// Replaces the characters that delimit fields in a DogStatsD line.
/// Category names end up here, so anything a feed title yields must be safe.
fn metric_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ':' | '|' | '@' | '#' | '\n' | '\r' => '_',
            c => c,
        })
        .collect()
}

/// Events may span lines, but only as escaped `\\n` sequences.
fn event_field(text: &str) -> String {
    text.replace("\r\n", "\\n").replace(['\n', '\r'], "\\n")
}
