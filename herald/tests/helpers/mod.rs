// Shared fixtures so tests can `use helpers::*;`
#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use herald::{Herald, HeraldConfig, JitterRange};
use herald_mock::{ManualClock, MockEventSource, MockSocialProvider, RecordingObserver};

pub struct Fixture {
    pub herald: Herald,
    pub social: Arc<MockSocialProvider>,
    pub events: Arc<MockEventSource>,
    pub clock: Arc<ManualClock>,
    pub observer: Arc<RecordingObserver>,
}

/// Default configuration without jitter, so waits are exact.
pub fn config() -> HeraldConfig {
    let mut cfg = HeraldConfig::default();
    cfg.retry.backoff_jitter = JitterRange::none();
    cfg.retry.quota_jitter = JitterRange::none();
    cfg
}

pub fn fixture() -> Fixture {
    fixture_with(config(), MockSocialProvider::new())
}

pub fn fixture_with(cfg: HeraldConfig, social: MockSocialProvider) -> Fixture {
    let social = Arc::new(social);
    let events = Arc::new(MockEventSource::default());
    let clock = Arc::new(ManualClock::default());
    let observer = Arc::new(RecordingObserver::new());
    let herald = Herald::builder()
        .social(social.clone())
        .events(events.clone())
        .config(cfg)
        .clock(clock.clone())
        .observer(observer.clone())
        .build()
        .expect("valid test configuration");
    Fixture {
        herald,
        social,
        events,
        clock,
        observer,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub fn names<T>(items: &[T], name: impl Fn(&T) -> &str) -> Vec<String> {
    items.iter().map(|i| name(i).to_string()).collect()
}
