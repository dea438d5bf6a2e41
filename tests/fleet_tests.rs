#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use deisctl::adapter::outbound::fleet::{FleetBackend, FleetConfig};
use deisctl::application::Sequencer;
use deisctl::domain::{ScaleRequest, Selection};
use deisctl::testkit::RecordingReporter;
use tempfile::TempDir;

/// A fake `fleetctl` that logs its arguments, answers `list-units` from a
/// file and fails `start` for `deis-broken.service`.
struct FakeFleet {
    dir: TempDir,
}

impl FakeFleet {
    fn new(templates: &[&str], listing: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        let units = dir.path().join("units");
        fs::create_dir(&units).unwrap();
        for name in templates {
            fs::write(units.join(name), "[Service]\nExecStart=/bin/true\n").unwrap();
        }
        fs::write(dir.path().join("listing"), listing.join("\n")).unwrap();

        let log = dir.path().join("calls.log");
        let script = format!(
            "#!/bin/sh\n\
             echo \"$*\" >> '{log}'\n\
             case \"$1\" in\n\
               list-units) cat '{listing}' ;;\n\
               start) if [ \"$2\" = deis-broken.service ]; then echo \"unit $2 failed to start\" >&2; exit 1; fi ;;\n\
             esac\n",
            log = log.display(),
            listing = dir.path().join("listing").display(),
        );
        let binary = dir.path().join("fleetctl");
        fs::write(&binary, script).unwrap();
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();

        Self { dir }
    }

    fn config(&self) -> FleetConfig {
        FleetConfig {
            binary: self.path("fleetctl").display().to_string(),
            tunnel: None,
            units: Some(self.path("units")),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.path("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn sequencer(&self) -> (Sequencer, Arc<RecordingReporter>) {
        let reporter = Arc::new(RecordingReporter::new());
        let backend = FleetBackend::new(&self.config());
        let sequencer =
            Sequencer::new(Arc::new(backend), reporter.clone()).with_interval(Duration::ZERO);
        (sequencer, reporter)
    }
}

fn staged(unit: &str) -> String {
    let path: &Path = &std::env::temp_dir().join("deisctl-units").join(unit);
    path.display().to_string()
}

#[tokio::test]
async fn install_loads_templates_and_staged_instances() {
    let fleet = FakeFleet::new(&["deis-router.service", "deis-builder.service"], &[]);
    let (sequencer, reporter) = fleet.sequencer();

    let selection = Selection::parse(&["router@1", "builder"]).unwrap();
    sequencer.install(&selection).await.unwrap();

    let mut calls = fleet.calls();
    calls.sort();
    let template = fleet.path("units").join("deis-builder.service");
    assert_eq!(
        calls,
        [
            format!("load {}", template.display()),
            format!("load {}", staged("deis-router@1.service")),
        ]
    );
    let mut lines = reporter.lines();
    lines.sort();
    assert_eq!(
        lines,
        ["deis-builder.service: loaded", "deis-router@1.service: loaded"]
    );
}

#[tokio::test]
async fn start_failure_carries_fleetctl_stderr() {
    let fleet = FakeFleet::new(&[], &[]);
    let (sequencer, reporter) = fleet.sequencer();

    let selection = Selection::parse(&["broken"]).unwrap();
    let err = sequencer.start(&selection).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "deis-broken.service: unit deis-broken.service failed to start"
    );
    assert_eq!(reporter.failures().len(), 1);
}

#[tokio::test]
async fn missing_template_fails_the_install() {
    let fleet = FakeFleet::new(&[], &[]);
    let (sequencer, _reporter) = fleet.sequencer();

    let selection = Selection::parse(&["publisher"]).unwrap();
    let err = sequencer.install(&selection).await.unwrap_err();

    assert!(
        err.to_string()
            .starts_with("publisher: unit file deis-publisher.service not found in"),
        "{err}"
    );
    assert!(fleet.calls().is_empty());
}

#[tokio::test]
async fn scale_down_removes_the_highest_instances_first() {
    let fleet = FakeFleet::new(
        &["deis-router.service"],
        &[
            "deis-router@1.service",
            "deis-router@2.service",
            "deis-router@3.service",
            "deis-registry.service",
        ],
    );
    let (sequencer, reporter) = fleet.sequencer();

    let requests = [ScaleRequest::parse("router=1").unwrap()];
    sequencer.scale(&requests).await.unwrap();

    assert_eq!(
        fleet.calls(),
        [
            "list-units --no-legend --full --fields=unit",
            "stop deis-router@3.service",
            "destroy deis-router@3.service",
            "stop deis-router@2.service",
            "destroy deis-router@2.service",
        ]
    );
    assert_eq!(reporter.lines(), ["router: scaled to 1"]);
}

#[tokio::test]
async fn scale_up_creates_and_starts_missing_instances() {
    let fleet = FakeFleet::new(
        &["deis-router.service"],
        &["deis-router@1.service", "deis-router@3.service"],
    );
    let (sequencer, _reporter) = fleet.sequencer();

    let requests = [ScaleRequest::parse("router=4").unwrap()];
    sequencer.scale(&requests).await.unwrap();

    assert_eq!(
        fleet.calls(),
        [
            "list-units --no-legend --full --fields=unit".to_string(),
            format!("load {}", staged("deis-router@2.service")),
            "start deis-router@2.service".to_string(),
            format!("load {}", staged("deis-router@4.service")),
            "start deis-router@4.service".to_string(),
        ]
    );
}
