//! Integration test common infrastructure.
//!
//! Provides a recording sender and engine constructors with a manual clock.

pub mod sender;

#[allow(unused_imports)]
pub use sender::TestSender;

use slcmd::config::Config;
use slcmd::cooldown::ManualClock;
use slcmd::dispatch::CommandEngine;
use std::sync::Arc;

/// Engine with default config and a manual clock.
#[allow(dead_code)]
pub fn engine() -> (CommandEngine, Arc<ManualClock>) {
    engine_with_config(Config::default())
}

#[allow(dead_code)]
pub fn engine_with_config(config: Config) -> (CommandEngine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let engine = CommandEngine::builder()
        .config(config)
        .clock(clock.clone())
        .build();
    (engine, clock)
}
