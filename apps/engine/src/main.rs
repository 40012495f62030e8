use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use pong_engine::config::engine::redis_url;
use pong_engine::{EngineConfig, GameRepo, HttpBotClient, Orchestrator, RedisStore};
use tracing::{error, info};

mod telemetry;

#[derive(Parser)]
#[command(name = "pong-tick")]
#[command(about = "Advance every active Pong game by one tick")]
struct Args {
    /// Repeat a pass every N milliseconds instead of running once
    #[arg(long, value_name = "MS")]
    every_ms: Option<u64>,

    /// Stop after this many passes when repeating
    #[arg(long, requires = "every_ms")]
    passes: Option<u64>,
}

#[tokio::main]
async fn main() {
    telemetry::init_tracing();
    let args = Args::parse();

    // Environment variables must be set by the runtime environment
    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid engine configuration: {e}");
            std::process::exit(2);
        }
    };
    let url = match redis_url() {
        Ok(url) => url,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(2);
        }
    };

    let store = match RedisStore::connect(&url, &config.namespace).await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ Failed to connect to redis: {e}");
            std::process::exit(1);
        }
    };
    let bots = match HttpBotClient::new(config.bot_timeout) {
        Ok(bots) => bots,
        Err(e) => {
            eprintln!("❌ Failed to build bot client: {e}");
            std::process::exit(1);
        }
    };

    let repo = GameRepo::new(Arc::new(store), config.cas_max_attempts);
    let orchestrator = Orchestrator::new(repo, Arc::new(bots), config);

    let Some(every_ms) = args.every_ms else {
        if let Err(e) = orchestrator.run_pass().await {
            error!(error = %e, "Tick pass failed");
            std::process::exit(1);
        }
        return;
    };

    info!(every_ms, passes = ?args.passes, "Ticking on a fixed interval");
    let mut interval = tokio::time::interval(Duration::from_millis(every_ms.max(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut done = 0u64;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!(passes = done, "Interrupted, stopping");
                break;
            }
        }

        // A failed pass (registry unreadable) is retried on the next tick
        if let Err(e) = orchestrator.run_pass().await {
            error!(error = %e, "Tick pass failed");
        }
        done += 1;
        if args.passes.is_some_and(|limit| done >= limit) {
            break;
        }
    }
}
