#![allow(dead_code)]

use std::sync::Arc;

use herald::{EventListingProvider, SocialSearchProvider};

fn use_mock() -> bool {
    std::env::var("HERALD_EXAMPLES_USE_MOCK").is_ok()
}

#[must_use]
pub fn get_social() -> Arc<dyn SocialSearchProvider> {
    if use_mock() {
        println!("--- (Using mock social provider) ---");
        return Arc::new(herald_mock::MockSocialProvider::new());
    }
    match herald_connectors::TwitterConnector::from_env() {
        Ok(connector) => Arc::new(connector),
        Err(e) => {
            eprintln!("social connector unavailable ({e}); falling back to mock");
            Arc::new(herald_mock::MockSocialProvider::new())
        }
    }
}

#[must_use]
pub fn get_events() -> Arc<dyn EventListingProvider> {
    if use_mock() {
        println!("--- (Using mock event source) ---");
        return Arc::new(herald_mock::MockEventSource::default());
    }
    match herald_connectors::SerpEventsConnector::from_env() {
        Ok(connector) => Arc::new(connector),
        Err(e) => {
            eprintln!("event connector unavailable ({e}); falling back to mock");
            Arc::new(herald_mock::MockEventSource::default())
        }
    }
}
