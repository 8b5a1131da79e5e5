//! Completion gates for callback, deferred, and suspending test bodies.
//!
//! The fixtures simulate a slow data fetch; tests run on a paused tokio
//! clock so every sleep and deadline resolves in virtual time.

use std::time::Duration;

use mockgate::assert::matcher::contains_str;
use mockgate::error::Error;
use mockgate::gate::{CompletionGate, FailReason, TestOutcome};

/// The code under test: fetches data after a delay, succeeding or failing.
async fn fetch_data(succeed: bool) -> Result<String, String> {
    tokio::time::sleep(Duration::from_millis(300)).await;
    if succeed {
        Ok("peanut butter".to_string())
    } else {
        Err("error".to_string())
    }
}

#[tokio::test(start_paused = true)]
async fn callback_style_delivers_the_data() {
    let gate = CompletionGate::new()
        .with_deadline(Duration::from_secs(5))
        .expect_assertions(1);
    let assertions = gate.assertions();

    let report = gate
        .run_callback_style(|done| {
            tokio::spawn(async move {
                match fetch_data(true).await {
                    Ok(data) => match assertions.eq(&data, &"peanut butter".to_string()) {
                        Ok(()) => done.done(),
                        Err(failure) => done.fail(failure.to_string()),
                    },
                    Err(e) => done.fail(e),
                }
            });
        })
        .await;

    assert_eq!(report.outcome, TestOutcome::Succeeded(()));
    assert!(report.is_clean());
}

#[tokio::test(start_paused = true)]
async fn callback_style_times_out_when_the_handle_never_fires() {
    let limit = Duration::from_millis(50);
    let gate = CompletionGate::new().with_deadline(limit);

    // The body drops the handle without signaling.
    let report = gate.run_callback_style(|_done| {}).await;

    assert_eq!(
        report.outcome,
        TestOutcome::Failed(FailReason::Timeout(limit))
    );
}

#[tokio::test(start_paused = true)]
async fn signaling_twice_keeps_the_first_outcome_and_reports_the_second() {
    let gate = CompletionGate::new().with_deadline(Duration::from_secs(5));

    let report = gate
        .run_callback_style(|done| {
            done.done();
            done.fail("should have been ignored as an outcome");
        })
        .await;

    assert_eq!(report.outcome, TestOutcome::Succeeded(()));
    assert_eq!(report.violations.len(), 1);
    assert!(matches!(
        report.violations[0],
        Error::DoubleCompletion { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn deferred_style_resolves_to_the_data() {
    let gate = CompletionGate::new().with_deadline(Duration::from_secs(5));

    let report = gate.run_deferred_style(|| fetch_data(true)).await;

    assert_eq!(
        report.outcome,
        TestOutcome::Succeeded("peanut butter".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn deferred_style_surfaces_the_rejection() {
    let gate = CompletionGate::new().with_deadline(Duration::from_secs(5));

    let report = gate.run_deferred_style(|| fetch_data(false)).await;

    assert_eq!(
        report.outcome,
        TestOutcome::Failed(FailReason::Rejected("error".to_string()))
    );
}

#[tokio::test(start_paused = true)]
async fn rejection_branch_must_actually_run() {
    let gate = CompletionGate::new()
        .with_deadline(Duration::from_secs(5))
        .expect_assertions(1);
    let assertions = gate.assertions();

    let report = gate
        .run_suspending_style(async move {
            assertions
                .rejects_with(fetch_data(false), contains_str("error"))
                .await?;
            Ok::<_, Error>(())
        })
        .await;

    assert_eq!(report.outcome, TestOutcome::Succeeded(()));
}

#[tokio::test(start_paused = true)]
async fn declared_assertions_missed_force_a_failure() {
    let gate = CompletionGate::new()
        .with_deadline(Duration::from_secs(5))
        .expect_assertions(1);

    // The body completes successfully but never asserts anything, so the
    // gate refuses the success.
    let report = gate
        .run_suspending_style(async {
            let _data = fetch_data(true).await?;
            Ok::<_, String>(())
        })
        .await;

    assert_eq!(
        report.outcome,
        TestOutcome::Failed(FailReason::AssertionCount {
            expected: 1,
            executed: 0,
        })
    );
}

#[tokio::test(start_paused = true)]
async fn suspending_style_awaits_the_data() {
    let gate = CompletionGate::new()
        .with_deadline(Duration::from_secs(5))
        .expect_assertions(1);
    let assertions = gate.assertions();

    let report = gate
        .run_suspending_style(async move {
            let data = assertions
                .resolves_to(fetch_data(true), "peanut butter".to_string())
                .await?;
            Ok::<_, Error>(data)
        })
        .await;

    assert_eq!(
        report.outcome,
        TestOutcome::Succeeded("peanut butter".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn suspending_style_surfaces_a_raised_error() {
    let gate = CompletionGate::new()
        .with_deadline(Duration::from_secs(5))
        .expect_assertions(1);
    let assertions = gate.assertions();

    let report = gate
        .run_suspending_style(async move {
            match fetch_data(false).await {
                Ok(data) => Err(format!("unexpectedly resolved to {data:?}")),
                Err(reason) => {
                    assertions
                        .contains(&reason, "error")
                        .map_err(|e| e.to_string())?;
                    Ok(())
                }
            }
        })
        .await;

    assert_eq!(report.outcome, TestOutcome::Succeeded(()));
}

#[tokio::test(start_paused = true)]
async fn suspending_style_times_out_past_the_deadline() {
    let limit = Duration::from_millis(50);
    let gate = CompletionGate::new().with_deadline(limit);

    let report = gate.run_suspending_style(fetch_data(true)).await;

    assert_eq!(
        report.outcome,
        TestOutcome::Failed(FailReason::Timeout(limit))
    );
}

#[tokio::test(start_paused = true)]
async fn late_signal_after_timeout_never_unterminates_the_gate() {
    let limit = Duration::from_millis(50);
    let gate = CompletionGate::new().with_deadline(limit);

    let report = gate
        .run_callback_style(|done| {
            // Fires only well past the deadline.
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                done.done();
            });
        })
        .await;

    assert_eq!(
        report.outcome,
        TestOutcome::Failed(FailReason::Timeout(limit))
    );
}
