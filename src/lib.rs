pub mod types;
pub mod store;
pub mod detector;
pub mod sweeper;
pub mod category;
pub mod pipeline;
pub mod fetcher;
pub mod parser;
pub mod traits;
pub mod sources;
pub mod publishers;
pub mod telemetry;
pub mod config;
pub mod service;

pub use types::*;
pub use store::{RecordStore, SharedStore};
pub use detector::ChangeDetector;
pub use sweeper::{RetentionSweeper, SweepReport};
pub use category::{capitalize_words, CategoryRules};
pub use pipeline::{CycleReport, PollCycle};
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use traits::{FeedSource, Publisher};
pub use sources::HttpFeedSource;
pub use publishers::{render_change, LogPublisher, TwitterPublisher};
pub use telemetry::{HealthStatus, LogObserver, NullObserver, Observer, StatsdObserver};
pub use config::{FetchConfig, PublisherConfig, WatchConfig};
pub use service::HeadlineWatch;
