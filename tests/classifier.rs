//! Duration classifier integration tests
//!
//! Exercises spacing, retry, and side-effect behavior against a scripted
//! provider, with the tokio clock paused so timing assertions are exact.

use std::sync::Arc;
use std::time::Duration;

use aperture_gateway::classify::{DurationClassifier, NO_MATCH_SENTENCE};
use aperture_gateway::context::PatientContext;
use aperture_gateway::telemetry::DisplayState;
use aperture_gateway::{Error, SharedContext};

mod common;
use common::{MockProvider, MockSpeaker, Outcome, ok_result, result};

use aperture_gateway::classify::SentenceProvider;
use aperture_gateway::speech::Speaker;

struct Harness {
    classifier: Arc<DurationClassifier>,
    provider: Arc<MockProvider>,
    speaker: Arc<MockSpeaker>,
    display: Arc<DisplayState>,
    context: SharedContext,
}

fn harness(provider: MockProvider) -> Harness {
    let provider = Arc::new(provider);
    let display = Arc::new(DisplayState::new());
    let context = PatientContext::shared();
    context.lock().unwrap().last_messages.clear();
    let speaker = Arc::new(MockSpeaker::default());

    let classifier = Arc::new(DurationClassifier::new(
        Arc::clone(&provider) as Arc<dyn SentenceProvider>,
        Arc::clone(&display),
        Arc::clone(&context),
        Some(Arc::clone(&speaker) as Arc<dyn Speaker>),
    ));

    Harness {
        classifier,
        provider,
        speaker,
        display,
        context,
    }
}

#[tokio::test(start_paused = true)]
async fn seven_seconds_maps_to_suction_and_updates_history() {
    let h = harness(MockProvider::default());

    h.classifier.submit(Duration::from_secs(7)).await.unwrap();

    let calls = h.provider.calls();
    assert_eq!(calls.len(), 1);
    assert!((calls[0].duration_seconds - 7.0).abs() < 1e-9);

    assert_eq!(h.speaker.spoken(), vec!["I need suction."]);

    let context = h.context.lock().unwrap();
    assert_eq!(context.last_messages[0].text, "I need suction.");

    let snapshot = h.display.snapshot();
    assert_eq!(
        snapshot.prediction.unwrap().detected_sentence,
        "I need suction."
    );
    assert!(!snapshot.in_progress);
    assert!(snapshot.status.is_none());
}

#[tokio::test(start_paused = true)]
async fn out_of_range_duration_yields_no_match_and_no_side_effects() {
    let h = harness(MockProvider::default());

    h.classifier.submit(Duration::from_secs(20)).await.unwrap();

    assert_eq!(h.provider.calls().len(), 1);
    assert!(h.speaker.spoken().is_empty());
    assert!(h.context.lock().unwrap().last_messages.is_empty());

    let prediction = h.display.snapshot().prediction.unwrap();
    assert_eq!(prediction.detected_sentence, NO_MATCH_SENTENCE);
    assert!(prediction.confidence.abs() < f64::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn back_to_back_requests_are_spaced_two_seconds_apart() {
    let h = harness(MockProvider::default());

    let first = h.classifier.submit(Duration::from_secs(3));
    let second = h.classifier.submit(Duration::from_secs(5));
    first.await.unwrap();
    second.await.unwrap();

    let calls = h.provider.calls();
    assert_eq!(calls.len(), 2);
    let gap = calls[1].at.duration_since(calls[0].at);
    assert!(gap >= Duration::from_millis(2000), "gap was {gap:?}");
}

#[tokio::test(start_paused = true)]
async fn persistent_throttling_makes_six_attempts_with_doubling_delays() {
    let h = harness(MockProvider::scripted(vec![Outcome::Throttle; 6]));

    h.classifier.submit(Duration::from_secs(4)).await.unwrap();

    let calls = h.provider.calls();
    assert_eq!(calls.len(), 6, "5 retries means 6 attempts overall");

    // Delays double from 3s, each with up to 1s of jitter
    for (i, base_ms) in [(0, 3000u64), (1, 6000), (2, 12000), (3, 24000), (4, 48000)] {
        let gap = calls[i + 1].at.duration_since(calls[i].at);
        assert!(gap >= Duration::from_millis(base_ms), "gap {i}: {gap:?}");
        assert!(
            gap < Duration::from_millis(base_ms + 1000),
            "gap {i}: {gap:?}"
        );
    }

    let snapshot = h.display.snapshot();
    assert_eq!(
        snapshot.status.as_deref(),
        Some("System quota exceeded. Please wait 60 seconds.")
    );
    assert!(!snapshot.in_progress);
    assert!(h.speaker.spoken().is_empty());
}

#[tokio::test(start_paused = true)]
async fn non_throttling_failure_is_terminal_with_zero_retries() {
    let h = harness(MockProvider::scripted([Outcome::Fail]));

    h.classifier.submit(Duration::from_secs(4)).await.unwrap();

    assert_eq!(h.provider.calls().len(), 1);
    assert_eq!(
        h.display.snapshot().status.as_deref(),
        Some("Connection error. Please try again.")
    );
    assert!(h.context.lock().unwrap().last_messages.is_empty());
}

#[tokio::test(start_paused = true)]
async fn throttle_then_success_recovers_within_one_request() {
    let h = harness(MockProvider::scripted([
        Outcome::Throttle,
        ok_result("I feel cold."),
    ]));

    h.classifier.submit(Duration::from_secs(3)).await.unwrap();

    assert_eq!(h.provider.calls().len(), 2);
    assert_eq!(h.speaker.spoken(), vec!["I feel cold."]);
    assert!(h.display.snapshot().status.is_none());
}

#[tokio::test(start_paused = true)]
async fn backoff_abandons_when_a_newer_utterance_supersedes() {
    // First request throttles and backs off; while it sleeps a newer
    // utterance is classified. The stale retry must give up silently.
    let h = harness(MockProvider::scripted([
        Outcome::Throttle,
        ok_result("Please turn me."),
    ]));

    let stale = h.classifier.submit(Duration::from_secs(9));
    let fresh = h.classifier.submit(Duration::from_secs(5));
    stale.await.unwrap();
    fresh.await.unwrap();

    // One dispatch each: the stale request never retried
    assert_eq!(h.provider.calls().len(), 2);
    assert_eq!(h.speaker.spoken(), vec!["Please turn me."]);

    let snapshot = h.display.snapshot();
    assert_eq!(
        snapshot.prediction.unwrap().detected_sentence,
        "Please turn me."
    );
    assert!(snapshot.status.is_none(), "stale retry must not leave status");
    assert!(!snapshot.in_progress);
}

#[tokio::test(start_paused = true)]
async fn slow_early_result_cannot_overwrite_a_newer_prediction() {
    let h = harness(MockProvider::scripted([
        Outcome::SlowOk(result("I am scared."), 10_000),
        ok_result("I need the doctor."),
    ]));

    let slow = h.classifier.submit(Duration::from_secs(4));
    let fast = h.classifier.submit(Duration::from_secs(10));
    slow.await.unwrap();
    fast.await.unwrap();

    // The slow call still completed (and spoke), but the display keeps the
    // fresher result
    assert_eq!(
        h.display.snapshot().prediction.unwrap().detected_sentence,
        "I need the doctor."
    );
}

#[tokio::test(start_paused = true)]
async fn history_keeps_the_five_most_recent_detections() {
    let sentences = [
        "I am in pain.",
        "I feel cold.",
        "I am scared.",
        "Please turn me.",
        "I need suction.",
        "I want to sleep.",
    ];
    let h = harness(MockProvider::scripted(
        sentences.iter().map(|s| ok_result(s)),
    ));

    for _ in &sentences {
        h.classifier.submit(Duration::from_secs(3)).await.unwrap();
    }

    let context = h.context.lock().unwrap();
    assert_eq!(context.last_messages.len(), 5);
    let texts: Vec<&str> = context
        .last_messages
        .iter()
        .map(|m| m.text.as_str())
        .collect();
    assert_eq!(
        texts,
        vec![
            "I want to sleep.",
            "I need suction.",
            "Please turn me.",
            "I am scared.",
            "I feel cold."
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn one_shot_classify_reports_quota_exhaustion() {
    let h = harness(MockProvider::scripted(vec![Outcome::Throttle; 6]));

    let err = h.classifier.classify(4.0).await.unwrap_err();
    assert!(matches!(err, Error::QuotaExceeded));
    assert_eq!(
        err.user_message(),
        "System quota exceeded. Please wait 60 seconds."
    );
}
