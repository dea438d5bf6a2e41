//! Phase sequencing against a recording backend.

mod support;

use std::time::Duration;

use deisctl::domain::{Plan, Scheduler, Selection, Target, Verb};
use deisctl::error::Error;
use deisctl::testkit::{FakeBackend, Operation};

use support::sequencer;

const PLATFORM_HEADINGS: [&str; 5] = [
    "Storage subsystem...",
    "Logging subsystem...",
    "Control plane...",
    "Data plane...",
    "Routing mesh...",
];

#[tokio::test]
async fn start_platform_reports_every_subsystem_in_order() {
    let backend = FakeBackend::new();
    let (sequencer, reporter) = sequencer(&backend);

    sequencer.start(&Selection::Platform).await.unwrap();

    let mut expected = vec!["Starting Deis...".to_string()];
    expected.extend(PLATFORM_HEADINGS.iter().map(|h| h.to_string()));
    assert_eq!(reporter.lines(), expected);
    assert_eq!(reporter.headings(), expected);
    assert!(reporter.failures().is_empty());
    assert_eq!(
        reporter.finished_hints(),
        Some(vec![
            "Please use `deis register` to setup an administrator account.".to_string()
        ])
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failures_are_never_lost_on_a_threaded_runtime() {
    let backend = FakeBackend::new().failing(Operation::Stop, "registry", "stop failed");
    let (sequencer, _reporter) = sequencer(&backend);
    let selection = Selection::parse(&["registry"]).unwrap();

    for _ in 0..2_000 {
        let err = sequencer.stop(&selection).await.unwrap_err();
        assert!(
            matches!(err, Error::Backend(ref e) if e.target == "registry"),
            "{err}"
        );
    }
}

#[tokio::test]
async fn failing_stop_ends_the_run_at_its_phase() {
    let backend = FakeBackend::new().failing(Operation::Stop, "registry", "stop failed");
    let (sequencer, reporter) = sequencer(&backend);

    let err = sequencer.stop(&Selection::Platform).await.unwrap_err();

    match err {
        Error::Backend(err) => {
            assert_eq!(err.target, "registry");
            assert_eq!(err.message, "stop failed");
        }
        other => panic!("expected a backend error, got {other}"),
    }
    assert_eq!(
        reporter.lines(),
        [
            "Stopping Deis...",
            "Routing mesh...",
            "Data plane...",
            "Control plane..."
        ]
    );
    assert_eq!(reporter.failures(), ["registry: stop failed"]);
    assert_eq!(reporter.finished_hints(), None);

    // Nothing below the control plane was touched.
    assert_eq!(backend.times(Operation::Stop, "logger"), 0);
    assert_eq!(backend.times(Operation::Stop, "store-monitor"), 0);
}

#[tokio::test]
async fn restart_stops_to_completion_before_starting() {
    let backend = FakeBackend::new().with_delay(Duration::from_millis(20));
    let (sequencer, _reporter) = sequencer(&backend);

    let selection = Selection::parse(&["builder"]).unwrap();
    sequencer.restart(&selection).await.unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].operation, Operation::Stop);
    assert_eq!(calls[0].targets, ["builder"]);
    assert_eq!(calls[1].operation, Operation::Start);
    assert_eq!(calls[1].targets, ["builder"]);
    assert_eq!(calls[1].outstanding, 0, "start issued while stop was in flight");
    assert_eq!(
        backend.completed(),
        [
            (Operation::Stop, "builder".to_string()),
            (Operation::Start, "builder".to_string())
        ]
    );
}

#[tokio::test]
async fn no_call_is_issued_while_an_earlier_phase_is_in_flight() {
    for verb in [Verb::Install, Verb::Stop, Verb::Uninstall] {
        let backend = FakeBackend::new().with_delay(Duration::from_millis(10));
        let (sequencer, _reporter) = sequencer(&backend);

        sequencer.execute(&Plan::platform(verb)).await.unwrap();

        let calls = backend.calls();
        assert!(!calls.is_empty());
        for call in &calls {
            assert_eq!(
                call.outstanding, 0,
                "{verb}: {:?} issued with work still in flight",
                call.targets
            );
        }
        assert_eq!(backend.outstanding(), 0);
    }
}

#[tokio::test]
async fn start_orders_storage_and_logging_one_batch_at_a_time() {
    let backend = FakeBackend::new().with_delay(Duration::from_millis(10));
    let (sequencer, _reporter) = sequencer(&backend);

    sequencer.start(&Selection::Platform).await.unwrap();

    let calls = backend.calls_for(Operation::Start);
    let ordered: Vec<&str> = calls[..7]
        .iter()
        .map(|call| {
            assert_eq!(call.outstanding, 0);
            assert_eq!(call.targets.len(), 1);
            call.targets[0].as_str()
        })
        .collect();
    assert_eq!(
        ordered,
        [
            "store-monitor",
            "store-daemon",
            "store-metadata",
            "store-gateway",
            "store-volume",
            "logger",
            "logspout"
        ]
    );
}

#[tokio::test]
async fn start_dispatches_each_platform_target_exactly_once() {
    let backend = FakeBackend::new().with_delay(Duration::from_millis(5));
    let (sequencer, _reporter) = sequencer(&backend);

    sequencer.start(&Selection::Platform).await.unwrap();

    let members = Plan::platform(Verb::Start).members();
    assert_eq!(members.len(), 16);
    for target in &members {
        assert_eq!(
            backend.times(Operation::Start, &target.to_string()),
            1,
            "{target} started more than once"
        );
    }
}

#[tokio::test]
async fn background_failures_on_start_surface_on_the_run() {
    let backend = FakeBackend::new().failing(Operation::Start, "router@2", "no machines");
    let (sequencer, reporter) = sequencer(&backend);

    let err = sequencer.start(&Selection::Platform).await.unwrap_err();

    assert_eq!(err.to_string(), "router@2: no machines");
    assert_eq!(reporter.failures(), ["router@2: no machines"]);
    assert_eq!(reporter.finished_hints(), None);
}

#[tokio::test]
async fn k8s_start_bootstraps_dns_after_the_kubelet() {
    let backend = FakeBackend::new().with_extensions();
    let (sequencer, reporter) = sequencer(&backend);

    sequencer
        .start(&Selection::Scheduler(Scheduler::Kubernetes))
        .await
        .unwrap();

    let operations: Vec<(Operation, Vec<String>)> = backend
        .calls()
        .into_iter()
        .map(|call| (call.operation, call.targets))
        .collect();
    assert_eq!(
        operations,
        [
            (Operation::Start, vec!["kube-apiserver".to_string()]),
            (
                Operation::Start,
                vec![
                    "kube-controller-manager".to_string(),
                    "kube-scheduler".to_string()
                ]
            ),
            (
                Operation::Start,
                vec!["kube-proxy".to_string(), "kube-kubelet".to_string()]
            ),
            (Operation::Bootstrap, vec!["k8s".to_string()]),
        ]
    );
    assert_eq!(reporter.lines().last().map(String::as_str), Some("K8s DNS..."));
}

#[tokio::test]
async fn k8s_uninstall_tears_dns_down_first() {
    let backend = FakeBackend::new().with_extensions();
    let (sequencer, reporter) = sequencer(&backend);

    sequencer
        .uninstall(&Selection::Scheduler(Scheduler::Kubernetes))
        .await
        .unwrap();

    let calls = backend.calls();
    assert_eq!(calls[0].operation, Operation::Teardown);
    assert!(calls[1..]
        .iter()
        .all(|call| call.operation == Operation::Destroy));
    assert_eq!(calls[1].targets, ["kube-proxy", "kube-kubelet"]);
    assert_eq!(
        calls.last().map(|call| call.targets.clone()),
        Some(vec!["kube-apiserver".to_string()])
    );
    assert_eq!(
        reporter.lines(),
        [
            "Destroying K8s...",
            "K8s DNS...",
            "K8s proxy and kubelet...",
            "K8s controller and scheduler...",
            "K8s API Server..."
        ]
    );
}

#[tokio::test]
async fn addon_stage_is_skipped_with_a_warning_without_extensions() {
    let backend = FakeBackend::new();
    let (sequencer, reporter) = sequencer(&backend);

    sequencer
        .start(&Selection::Scheduler(Scheduler::Kubernetes))
        .await
        .unwrap();

    assert!(backend.calls_for(Operation::Bootstrap).is_empty());
    assert_eq!(reporter.warnings().len(), 1);
    assert!(reporter.warnings()[0].contains("K8s add-ons"));
    assert!(reporter.finished_hints().is_some());
}

#[tokio::test]
async fn literal_targets_run_as_one_untitled_batch() {
    let backend = FakeBackend::new();
    let (sequencer, reporter) = sequencer(&backend);

    let selection = Selection::parse(&["router@1", "router@2", "cache"]).unwrap();
    sequencer.install(&selection).await.unwrap();

    let calls = backend.calls_for(Operation::Create);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].targets, ["router@1", "router@2", "cache"]);
    assert!(reporter.lines().is_empty());
    assert_eq!(reporter.finished_hints(), None);
}

#[tokio::test]
async fn status_stops_at_the_first_error() {
    let backend = FakeBackend::new().failing(Operation::Status, "registry", "unit not found");
    let (sequencer, _reporter) = sequencer(&backend);

    let targets: Vec<Target> = ["cache", "registry", "builder"]
        .iter()
        .map(|t| t.parse().unwrap())
        .collect();
    let err = sequencer.status(&targets).await.unwrap_err();

    assert_eq!(err.to_string(), "registry: unit not found");
    let inspected: Vec<String> = backend
        .calls_for(Operation::Status)
        .into_iter()
        .flat_map(|call| call.targets)
        .collect();
    assert_eq!(inspected, ["cache", "registry"]);
}
