//! Correlator behaviour: once-only delivery, task supervision and draining.

use std::sync::mpsc;
use std::time::Duration;

use rstest::{fixture, rstest};

use super::*;
use crate::tests::support::{Push, RecordingWindow, SETTLE_TIMEOUT, capture_logs};

struct Fixture {
    correlator: Correlator,
    window: Arc<RecordingWindow>,
}

impl Fixture {
    fn completion(&self, channel: Channel, id: &str) -> Arc<Completion> {
        self.correlator
            .completion(self.window.clone(), channel, CallId::new(id))
    }

    fn settle(&self) -> Vec<Push> {
        self.correlator.drain(SETTLE_TIMEOUT).expect("drain");
        self.window.pushes()
    }
}

#[fixture]
fn fixture() -> Fixture {
    Fixture {
        correlator: Correlator::new().expect("start correlator"),
        window: RecordingWindow::new(1, "main"),
    }
}

#[rstest]
fn first_outcome_wins(fixture: Fixture) {
    let completion = fixture.completion(Channel::Call, "c1");

    assert!(completion.succeed_json("1"));
    assert!(!completion.succeed_json("2"));
    assert!(!completion.fail(&TaskFailure::Abandoned));
    assert!(completion.is_delivered());

    assert_eq!(
        fixture.settle(),
        vec![Push::CallResponse {
            id: "c1".to_owned(),
            payload: "1".to_owned(),
        }]
    );
}

#[rstest]
#[case::call_success(Channel::Call, true, Push::CallResponse { id: "x".to_owned(), payload: "ok".to_owned() })]
#[case::call_error(Channel::Call, false, Push::CallError { id: "x".to_owned(), message: "task finished without reporting an outcome".to_owned() })]
#[case::dialog_success(Channel::Dialog, true, Push::DialogResponse { id: "x".to_owned(), payload: "ok".to_owned(), is_json: false })]
#[case::dialog_error(Channel::Dialog, false, Push::DialogError { id: "x".to_owned(), message: "task finished without reporting an outcome".to_owned() })]
fn channel_selects_window_push(
    fixture: Fixture,
    #[case] channel: Channel,
    #[case] success: bool,
    #[case] expected: Push,
) {
    let completion = fixture.completion(channel, "x");
    if success {
        completion.succeed("ok");
    } else {
        completion.fail(&TaskFailure::Abandoned);
    }

    assert_eq!(fixture.settle(), vec![expected]);
}

#[rstest]
fn launched_job_reports_through_completion(fixture: Fixture) {
    let completion = fixture.completion(Channel::Call, "c2");
    let handle = fixture
        .correlator
        .launch(completion, |completion| {
            completion.succeed_json(r#"{"done":true}"#);
        })
        .expect("task handle");

    assert_eq!(handle.call_id().as_str(), "c2");
    assert!(handle.join());
    assert_eq!(
        fixture.settle(),
        vec![Push::CallResponse {
            id: "c2".to_owned(),
            payload: r#"{"done":true}"#.to_owned(),
        }]
    );
}

#[rstest]
fn silent_job_is_reported_as_abandoned(fixture: Fixture) {
    let completion = fixture.completion(Channel::Dialog, "d1");
    fixture.correlator.launch(completion, |_| {});

    assert_eq!(
        fixture.settle(),
        vec![Push::DialogError {
            id: "d1".to_owned(),
            message: "task finished without reporting an outcome".to_owned(),
        }]
    );
}

#[rstest]
fn panic_after_reporting_keeps_the_first_outcome(fixture: Fixture) {
    let completion = fixture.completion(Channel::Call, "c3");
    fixture.correlator.launch(completion, |completion| {
        completion.succeed_json("{}");
        panic!("late failure");
    });

    assert_eq!(
        fixture.settle(),
        vec![Push::CallResponse {
            id: "c3".to_owned(),
            payload: "{}".to_owned(),
        }]
    );
}

#[rstest]
fn formatted_panics_are_reported(fixture: Fixture) {
    let completion = fixture.completion(Channel::Call, "c4");
    let code = 42;
    fixture.correlator.launch(completion, move |_| {
        panic!("exit code {code}");
    });

    assert_eq!(
        fixture.settle(),
        vec![Push::CallError {
            id: "c4".to_owned(),
            message: "task panicked: exit code 42".to_owned(),
        }]
    );
}

#[rstest]
fn missing_result_encodes_as_empty_object(fixture: Fixture) {
    let completion = fixture.completion(Channel::Call, "c5");
    completion.succeed_with(None);

    assert_eq!(
        fixture.settle(),
        vec![Push::CallResponse {
            id: "c5".to_owned(),
            payload: "{}".to_owned(),
        }]
    );
}

#[rstest]
fn drain_times_out_while_tasks_run(fixture: Fixture) {
    let (release, blocked) = mpsc::channel::<()>();
    let completion = fixture.completion(Channel::Call, "c6");
    fixture.correlator.launch(completion, move |completion| {
        blocked.recv().ok();
        completion.succeed_json("{}");
    });

    let error = fixture
        .correlator
        .drain(Duration::from_millis(20))
        .expect_err("task still blocked");
    assert!(matches!(error, CorrelatorError::DrainTimedOut { pending: 1 }));
    assert_eq!(fixture.correlator.running(), 1);

    release.send(()).expect("release task");
    assert_eq!(fixture.settle().len(), 1);
    assert_eq!(fixture.correlator.running(), 0);
}

#[rstest]
fn completions_outlive_their_correlator(fixture: Fixture) {
    let Fixture { correlator, window } = fixture;
    let completion = correlator.completion(window.clone(), Channel::Dialog, CallId::new("d2"));
    drop(correlator);

    assert!(completion.succeed("late"));
    assert_eq!(
        window.wait_for(1, SETTLE_TIMEOUT),
        vec![Push::DialogResponse {
            id: "d2".to_owned(),
            payload: "late".to_owned(),
            is_json: false,
        }]
    );
}

#[rstest]
fn late_failures_are_not_logged_as_errors(fixture: Fixture) {
    let completion = fixture.completion(Channel::Call, "c7");

    let logs = capture_logs(|| {
        completion.succeed_json("{}");
        completion.fail(&TaskFailure::Abandoned);
    });

    assert!(!logs.contains("ERROR"), "unexpected error line: {logs}");
    assert!(logs.contains("WARN"), "duplicate not reported: {logs}");
    assert!(logs.contains("dropping duplicate outcome"));
}

#[rstest]
fn accepted_failures_are_logged_as_errors(fixture: Fixture) {
    let completion = fixture.completion(Channel::Dialog, "d3");

    let logs = capture_logs(|| {
        completion.fail(&TaskFailure::Abandoned);
    });

    let line = logs
        .lines()
        .find(|line| line.contains("ERROR"))
        .expect("error line");
    assert!(line.contains("task finished without reporting an outcome"));
    assert!(line.contains("d3"));
}

#[rstest]
fn drain_accepts_unbounded_timeouts(fixture: Fixture) {
    let completion = fixture.completion(Channel::Call, "c8");
    fixture.correlator.launch(completion, |completion| {
        completion.succeed_json("{}");
    });

    fixture
        .correlator
        .drain(Duration::MAX)
        .expect("drain without deadline");

    assert_eq!(fixture.window.pushes().len(), 1);
}
