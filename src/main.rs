use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use headline_watch::{HeadlineWatch, WatchConfig};
use tracing::{error, info};

/// Watches news feeds and announces headline changes
#[derive(Parser, Debug)]
#[command(name = "headline-watch", version, about)]
struct Cli {
    #[command(flatten)]
    options: Options,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug)]
struct Options {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log changes instead of publishing them
    #[arg(long, global = true, env = "HEADLINE_WATCH_DRY_RUN")]
    dry_run: bool,

    /// Feed name or address to watch; repeat to watch several. Replaces the default list.
    #[arg(long = "feed", global = true, env = "HEADLINE_WATCH_FEEDS", value_delimiter = ',')]
    feeds: Vec<String>,

    /// Base address that feed names are resolved against
    #[arg(long, global = true, env = "HEADLINE_WATCH_FEED_ROOT")]
    feed_root: Option<String>,

    /// DogStatsD agent address, e.g. 127.0.0.1:8125
    #[arg(long, global = true, env = "HEADLINE_WATCH_STATSD_ADDR")]
    statsd_addr: Option<String>,

    /// Seconds between poll cycles
    #[arg(long, global = true, env = "HEADLINE_WATCH_POLL_SECS")]
    poll_secs: Option<u64>,

    /// User-context bearer token for the publishing API
    #[arg(long, global = true, env = "TWITTER_BEARER_TOKEN", hide_env_values = true)]
    bearer_token: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the watcher until interrupted (default)
    Run,
    /// Run a single poll cycle against an empty store and print the report
    Once,
    /// Print the resolved feed addresses
    Feeds,
}

impl Options {
    fn into_config(self) -> WatchConfig {
        let mut config = WatchConfig::default();

        if !self.feeds.is_empty() {
            config.feeds = self.feeds;
        }
        if let Some(feed_root) = self.feed_root {
            config.feed_root = feed_root;
        }
        if let Some(poll_secs) = self.poll_secs {
            config.poll_interval_secs = poll_secs;
        }
        config.statsd_addr = self.statsd_addr;
        config.publisher.bearer_token = self.bearer_token;
        config.publisher.dry_run = self.dry_run;

        config
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.options.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let command = cli.command.unwrap_or(Command::Run);
    let mut config = cli.options.into_config();

    if let Command::Feeds = command {
        for address in config.feed_addresses() {
            println!("{}", address);
        }
        return Ok(());
    }

    if let Command::Once = command {
        config.publisher.dry_run = true;
    }

    info!("Starting headline-watch with {:?}", config);
    let watch = HeadlineWatch::from_config(&config).context("Failed to start headline-watch")?;

    match command {
        Command::Once => {
            let report = watch.poll_once().await;
            println!("{:#?}", report);
        }
        _ => {
            watch.run(shutdown_signal()).await;
        }
    }

    info!("headline-watch stopped");
    Ok(())
}
