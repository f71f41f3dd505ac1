// tests/pipeline_contract.rs
//! Behaviour of a batch run against a scripted provider.

mod common;

use common::{addresses, fast_settings, settings_with_backoff, Reply, StubProvider};
use geobatch::{
    Address, AppError, CancelToken, Coordinate, GeocodeFailure, GeocodingPipeline, NoProgress,
    Progress, ProviderStatus, RunCompletion,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test]
async fn one_result_per_address_in_input_order() {
    let provider = StubProvider::new()
        .reply("B", [Reply::Ok(2.0, 2.0)])
        .reply("D", [Reply::Transport])
        .reply("A", [Reply::Ok(1.0, 1.0)]);
    let pipeline = GeocodingPipeline::new(provider, fast_settings());
    let input = addresses(&["A", "B", "C", "D", "E"]);

    let run = pipeline
        .run(&input, &NoProgress, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(run.completion, RunCompletion::Completed);
    assert_eq!(run.batch.len(), input.len());
    let order: Vec<&Address> = run.batch.iter().map(|r| &r.address).collect();
    assert_eq!(order, input.iter().collect::<Vec<_>>());
    let positions: Vec<usize> = run.batch.iter().map(|r| r.position).collect();
    assert_eq!(positions, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn ok_reply_yields_the_exact_coordinate() {
    let provider = StubProvider::new().reply("1600 Amphitheatre Pkwy", [Reply::Ok(37.4, -122.1)]);
    let pipeline = GeocodingPipeline::new(provider, fast_settings());

    let run = pipeline
        .run(
            &addresses(&["1600 Amphitheatre Pkwy"]),
            &NoProgress,
            &CancelToken::new(),
        )
        .await
        .unwrap();

    let result = &run.batch.results()[0];
    assert_eq!(result.address.as_str(), "1600 Amphitheatre Pkwy");
    assert_eq!(result.coordinate(), Some(Coordinate::new(37.4, -122.1)));
    assert_eq!(result.provider_status, Some(ProviderStatus::Ok));
}

#[tokio::test]
async fn zero_results_records_no_match_and_continues() {
    let provider = StubProvider::new()
        .reply("Atlantis", [Reply::ZeroResults])
        .reply("Paris", [Reply::Ok(48.85, 2.35)]);
    let pipeline = GeocodingPipeline::new(provider, fast_settings());

    let run = pipeline
        .run(&addresses(&["Atlantis", "Paris"]), &NoProgress, &CancelToken::new())
        .await
        .unwrap();

    let first = &run.batch.results()[0];
    assert_eq!(first.coordinate(), None);
    assert_eq!(
        first.failure(),
        Some(&GeocodeFailure::NoMatch {
            address: Address::new("Atlantis").unwrap()
        })
    );
    assert_eq!(first.attempts, 1);
    assert_eq!(
        run.batch.results()[1].coordinate(),
        Some(Coordinate::new(48.85, 2.35))
    );
}

#[tokio::test]
async fn throttled_address_is_retried_until_it_succeeds() {
    let backoff = Duration::from_millis(20);
    let provider = StubProvider::new().reply(
        "Busy St",
        [
            Reply::OverQueryLimit,
            Reply::OverQueryLimit,
            Reply::OverQueryLimit,
            Reply::Ok(10.0, 20.0),
        ],
    );
    let pipeline = GeocodingPipeline::new(provider, settings_with_backoff(backoff, 5));

    let started = Instant::now();
    let run = pipeline
        .run(&addresses(&["Busy St"]), &NoProgress, &CancelToken::new())
        .await
        .unwrap();
    let elapsed = started.elapsed();

    let result = &run.batch.results()[0];
    assert_eq!(result.coordinate(), Some(Coordinate::new(10.0, 20.0)));
    assert_eq!(result.attempts, 4);
    // 20ms + 40ms + 80ms of backoff
    assert!(elapsed >= Duration::from_millis(140), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn sustained_throttling_ends_in_rate_limit_exhausted() {
    let provider = StubProvider::new().reply("Busy St", std::iter::repeat(Reply::OverQueryLimit).take(50));
    let pipeline = GeocodingPipeline::new(provider, settings_with_backoff(Duration::from_millis(1), 3));

    let run = tokio::time::timeout(
        Duration::from_secs(5),
        pipeline.run(&addresses(&["Busy St", "Next"]), &NoProgress, &CancelToken::new()),
    )
    .await
    .expect("run must terminate")
    .unwrap();

    assert_eq!(
        run.batch.results()[0].failure(),
        Some(&GeocodeFailure::RateLimitExhausted {
            address: Address::new("Busy St").unwrap(),
            attempts: 3
        })
    );
    assert_eq!(run.batch.len(), 2);
}

#[tokio::test]
async fn other_failures_are_not_retried() {
    let provider = StubProvider::new()
        .reply("Denied", [Reply::Status("REQUEST_DENIED"), Reply::Ok(0.0, 0.0)])
        .reply("Broken", [Reply::HttpStatus(502), Reply::Ok(0.0, 0.0)]);
    let pipeline = GeocodingPipeline::new(provider, fast_settings());

    let run = pipeline
        .run(&addresses(&["Denied", "Broken"]), &NoProgress, &CancelToken::new())
        .await
        .unwrap();

    assert!(matches!(
        run.batch.results()[0].failure(),
        Some(GeocodeFailure::Provider { reason, .. }) if reason == "REQUEST_DENIED"
    ));
    assert!(matches!(
        run.batch.results()[1].failure(),
        Some(GeocodeFailure::HttpStatus { code: 502, .. })
    ));
}

#[tokio::test]
async fn missing_credential_fails_before_any_request() {
    let provider = Arc::new(StubProvider::new().reply("A", [Reply::Ok(1.0, 1.0)]));
    let mut settings = fast_settings();
    settings.api_key = None;
    let pipeline = GeocodingPipeline::new(Arc::clone(&provider), settings);

    let err = pipeline
        .run(&addresses(&["A", "B"]), &NoProgress, &CancelToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::MissingCredential(_)));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn cancelling_after_n_addresses_keeps_exactly_n_results() {
    let provider = Arc::new(StubProvider::new());
    let pipeline = GeocodingPipeline::new(Arc::clone(&provider), fast_settings());
    let input = addresses(&["A", "B", "C", "D", "E", "F"]);
    let cancel = CancelToken::new();

    let trigger = cancel.clone();
    let progress = move |p: &Progress<'_>| {
        if p.processed == 3 {
            trigger.cancel();
        }
    };

    let run = pipeline.run(&input, &progress, &cancel).await.unwrap();

    assert_eq!(run.completion, RunCompletion::Cancelled);
    assert_eq!(run.requested, 6);
    assert_eq!(run.batch.len(), 3);
    for (position, result) in run.batch.iter().enumerate() {
        assert_eq!(result.position, position);
        assert_eq!(result.address, input[position]);
    }
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn cancelling_during_backoff_abandons_the_current_address() {
    let provider = Arc::new(
        StubProvider::new()
            .reply("A", [Reply::Ok(1.0, 1.0)])
            .reply("B", std::iter::repeat(Reply::OverQueryLimit).take(10)),
    );
    let pipeline = GeocodingPipeline::new(
        Arc::clone(&provider),
        settings_with_backoff(Duration::from_secs(30), 5),
    );
    let cancel = CancelToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let run = tokio::time::timeout(
        Duration::from_secs(5),
        pipeline.run(&addresses(&["A", "B", "C"]), &NoProgress, &cancel),
    )
    .await
    .expect("cancellation must interrupt the backoff")
    .unwrap();

    assert_eq!(run.completion, RunCompletion::Cancelled);
    assert_eq!(run.batch.len(), 1);
    assert!(run.batch.results()[0].is_located());
    assert_eq!(provider.seen(), vec!["A", "B"]);
}

#[tokio::test]
async fn progress_is_reported_after_every_address() {
    let pipeline = GeocodingPipeline::new(StubProvider::new(), fast_settings());
    let seen = Mutex::new(Vec::new());
    let progress = |p: &Progress<'_>| {
        seen.lock()
            .push((p.processed, p.total, p.current.to_string()))
    };

    pipeline
        .run(&addresses(&["A", "B", "C"]), &progress, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(
        *seen.lock(),
        vec![
            (1, 3, "A".to_string()),
            (2, 3, "B".to_string()),
            (3, 3, "C".to_string()),
        ]
    );
}

#[tokio::test]
async fn requests_are_paced_by_the_quota() {
    let mut settings = fast_settings();
    settings.requests_per_second = 20.0;
    settings.burst = 1;
    let pipeline = GeocodingPipeline::new(StubProvider::new(), settings);

    let started = Instant::now();
    pipeline
        .run(&addresses(&["A", "B", "C", "D"]), &NoProgress, &CancelToken::new())
        .await
        .unwrap();

    // Four requests at 20/s need three 50ms gaps.
    assert!(started.elapsed() >= Duration::from_millis(140));
}

#[tokio::test]
async fn vanishing_rate_waits_until_cancelled_instead_of_panicking() {
    let mut settings = fast_settings();
    settings.requests_per_second = 1e-30;
    settings.burst = 1;
    let provider = Arc::new(StubProvider::new().reply("A", [Reply::Ok(1.0, 1.0)]));
    let pipeline = GeocodingPipeline::new(Arc::clone(&provider), settings);
    let cancel = CancelToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let run = tokio::time::timeout(
        Duration::from_secs(5),
        pipeline.run(&addresses(&["A", "B"]), &NoProgress, &cancel),
    )
    .await
    .expect("cancellation must end the pacing wait")
    .unwrap();

    assert_eq!(run.completion, RunCompletion::Cancelled);
    assert_eq!(run.batch.len(), 1);
    assert_eq!(provider.calls(), 1);
}
