//! Periodic tasks sharing one record store: poll cycles, retention sweeps
//! and the telemetry heartbeat.

use crate::category::CategoryRules;
use crate::config::WatchConfig;
use crate::pipeline::{CycleReport, PollCycle};
use crate::publishers::{LogPublisher, TwitterPublisher};
use crate::sources::HttpFeedSource;
use crate::store::{RecordStore, SharedStore};
use crate::sweeper::{RetentionSweeper, SweepReport};
use crate::telemetry::{metrics, HealthStatus, LogObserver, Observer, StatsdObserver};
use crate::traits::{FeedSource, Publisher};
use crate::types::{self, ConfigError};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

pub struct HeadlineWatch {
    store: SharedStore,
    cycle: PollCycle,
    sweeper: RetentionSweeper,
    observer: Arc<dyn Observer>,
    poll_interval: Duration,
    sweep_interval: Duration,
    heartbeat_interval: Duration,
}

impl HeadlineWatch {
    pub fn new(
        config: &WatchConfig,
        source: Arc<dyn FeedSource>,
        publisher: Arc<dyn Publisher>,
        observer: Arc<dyn Observer>,
    ) -> Result<Self, ConfigError> {
        let rules = CategoryRules::new(config.category_boilerplate.as_slice())?;
        let cycle = PollCycle::new(config.feed_addresses(), source, publisher, observer.clone()).with_rules(rules);
        let sweeper = RetentionSweeper::new(config.retention(), observer.clone());

        Ok(Self {
            store: RecordStore::shared(),
            cycle,
            sweeper,
            observer,
            poll_interval: config.poll_interval(),
            sweep_interval: config.sweep_interval(),
            heartbeat_interval: config.heartbeat_interval(),
        })
    }

    /// Validates `config` and wires the HTTP feed source together with the
    /// publisher and observer the config selects.
    pub fn from_config(config: &WatchConfig) -> types::Result<Self> {
        config.validate()?;

        let source = Arc::new(HttpFeedSource::new(config.fetch.clone())?);

        let publisher: Arc<dyn Publisher> = if config.publisher.dry_run {
            Arc::new(LogPublisher)
        } else {
            Arc::new(TwitterPublisher::new(&config.publisher)?)
        };

        let observer: Arc<dyn Observer> = match config.statsd_socket_addr()? {
            Some(addr) => Arc::new(StatsdObserver::connect(addr, config.statsd_prefix.clone())?),
            None => Arc::new(LogObserver),
        };

        Ok(Self::new(config, source, publisher, observer)?)
    }

    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }

    pub async fn poll_once(&self) -> CycleReport {
        self.cycle.run(&self.store).await
    }

    pub async fn sweep_now(&self) -> SweepReport {
        self.sweeper.sweep_shared(&self.store, Utc::now()).await
    }

    /// Reports liveness and the number of tracked articles in every category
    /// seen so far, zero included.
    pub async fn heartbeat(&self) {
        self.observer.check(metrics::SERVICE_UP, HealthStatus::Ok);

        let counts = self.store.read().await.category_counts();
        for (category, count) in &counts {
            self.observer.histogram(category, *count as f64);
        }
        debug!("Heartbeat: {} categories tracked", counts.len());
    }

    /// Polls immediately, then keeps all three schedules until `shutdown`
    /// resolves. Tasks run one at a time, so a sweep never interleaves
    /// with a poll cycle.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut poll = interval(self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut sweep = interval_at(Instant::now() + self.sweep_interval, self.sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut heartbeat = interval_at(Instant::now() + self.heartbeat_interval, self.heartbeat_interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Watching {} feeds (poll every {:?}, sweep every {:?}, heartbeat every {:?})",
            self.cycle.feeds().len(),
            self.poll_interval,
            self.sweep_interval,
            self.heartbeat_interval
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping");
                    break;
                }
                _ = poll.tick() => {
                    self.poll_once().await;
                }
                _ = sweep.tick() => {
                    self.sweep_now().await;
                }
                _ = heartbeat.tick() => {
                    self.heartbeat().await;
                }
            }
        }
    }
}
