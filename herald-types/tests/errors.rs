use herald_types::{HeraldError, RateLimitInfo};

#[test]
fn only_malformed_and_setup_failures_are_not_retryable() {
    assert!(HeraldError::too_many_requests("search_recent").is_retryable());
    assert!(HeraldError::connector("twitter", "connection reset").is_retryable());
    assert!(HeraldError::Data("bad json".into()).is_retryable());
    assert!(HeraldError::Other("boom".into()).is_retryable());

    assert!(!HeraldError::bad_request("search_recent", "invalid query").is_retryable());
    assert!(!HeraldError::InvalidArg("start > end".into()).is_retryable());
    assert!(!HeraldError::not_operational("twitter").is_retryable());
}

#[test]
fn only_invalid_arguments_are_programmer_errors() {
    assert!(HeraldError::InvalidArg("x".into()).is_programmer_error());
    assert!(!HeraldError::bad_request("e", "m").is_programmer_error());
    assert!(!HeraldError::not_operational("twitter").is_programmer_error());
}

#[test]
fn errors_serialize_for_reports() {
    let err = HeraldError::QuotaExceeded {
        endpoint: "search_recent".into(),
        reset_in_ms: 1500,
    };
    let json = serde_json::to_value(&err).expect("serialize error");
    let back: HeraldError = serde_json::from_value(json).expect("deserialize error");
    assert_eq!(back, err);
}

#[test]
fn throttling_errors_carry_reported_rate_limits() {
    assert_eq!(HeraldError::too_many_requests("search_recent").rate_limit(), None);
    // empty metadata is not attached
    let bare = HeraldError::rate_limited("search_recent", RateLimitInfo::default());
    assert_eq!(bare, HeraldError::too_many_requests("search_recent"));

    let info = RateLimitInfo {
        limit: Some(450),
        remaining: Some(0),
        reset_epoch_secs: Some(1_704_068_100),
    };
    let err = HeraldError::rate_limited("search_recent", info);
    assert!(err.is_retryable());
    assert_eq!(err.rate_limit(), Some(&info));

    let json = serde_json::to_value(&err).expect("serialize error");
    let back: HeraldError = serde_json::from_value(json).expect("deserialize error");
    assert_eq!(back.rate_limit(), Some(&info));
    assert_eq!(HeraldError::connector("twitter", "reset").rate_limit(), None);
}
