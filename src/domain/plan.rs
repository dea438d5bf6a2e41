//! Phase plans: what each lifecycle verb does to an aggregate or literal selection.

use std::collections::BTreeSet;
use std::fmt;

use crate::domain::component::{Scheduler, Subsystem, PLATFORM};
use crate::domain::target::Target;
use crate::error::ParseError;

/// Lifecycle verbs that run as phase plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Install,
    Start,
    Stop,
    Uninstall,
}

impl Verb {
    fn gerund(self) -> &'static str {
        match self {
            Verb::Install => "Installing",
            Verb::Start => "Starting",
            Verb::Stop => "Stopping",
            Verb::Uninstall => "Uninstalling",
        }
    }

    /// Whether the verb walks the dependency graph backwards.
    pub fn is_teardown(self) -> bool {
        matches!(self, Verb::Stop | Verb::Uninstall)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verb::Install => "install",
            Verb::Start => "start",
            Verb::Stop => "stop",
            Verb::Uninstall => "uninstall",
        };
        f.write_str(name)
    }
}

/// What a lifecycle verb acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every platform component.
    Platform,
    /// An alternate scheduler's control components.
    Scheduler(Scheduler),
    /// Literal targets, transitioned as one batch.
    Targets(Vec<Target>),
}

impl Selection {
    /// Resolve operator tokens.
    ///
    /// Reserved names (`platform`, scheduler names) expand to full plans and
    /// are only accepted as the sole token.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, ParseError> {
        match tokens {
            [] => Err(ParseError::NoTargets),
            [only] => {
                let token = only.as_ref();
                if token == PLATFORM {
                    Ok(Selection::Platform)
                } else if let Some(scheduler) = Scheduler::from_name(token) {
                    Ok(Selection::Scheduler(scheduler))
                } else {
                    Ok(Selection::Targets(vec![Target::parse(token)?]))
                }
            }
            many => many
                .iter()
                .map(|token| {
                    let token = token.as_ref();
                    if token == PLATFORM || Scheduler::from_name(token).is_some() {
                        Err(ParseError::ReservedTarget {
                            name: token.to_string(),
                        })
                    } else {
                        Target::parse(token)
                    }
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Selection::Targets),
        }
    }

    /// The plan `verb` runs over this selection.
    pub fn plan(&self, verb: Verb) -> Plan {
        match self {
            Selection::Platform => Plan::platform(verb),
            Selection::Scheduler(scheduler) => Plan::scheduler(*scheduler, verb),
            Selection::Targets(targets) => Plan::targets(verb, targets.clone()),
        }
    }
}

/// Targets transitioned together, in batches awaited one after another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    heading: Option<String>,
    batches: Vec<Vec<Target>>,
}

impl Phase {
    pub fn new(heading: Option<String>, batches: Vec<Vec<Target>>) -> Self {
        Self { heading, batches }
    }

    pub fn heading(&self) -> Option<&str> {
        self.heading.as_deref()
    }

    pub fn batches(&self) -> &[Vec<Target>] {
        &self.batches
    }
}

/// Direction of a scheduler add-on stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddonAction {
    Bootstrap,
    Teardown,
}

/// One step of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Phase(Phase),
    /// Scheduler-owned work run through the backend's extensions.
    Addon {
        heading: String,
        scheduler: Scheduler,
        action: AddonAction,
    },
}

/// Ordered stages for one verb over one selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    verb: Verb,
    title: Option<String>,
    stages: Vec<Stage>,
    overlap_from: Option<usize>,
    hints: Vec<String>,
}

impl Plan {
    /// The whole platform, subsystem by subsystem.
    ///
    /// Start brings storage and logging up one batch at a time, then
    /// dispatches everything from the control plane onward at once and
    /// reports it phase by phase.
    pub fn platform(verb: Verb) -> Self {
        let order: Vec<Subsystem> = if verb.is_teardown() {
            Subsystem::ALL.iter().rev().copied().collect()
        } else {
            Subsystem::ALL.to_vec()
        };

        let stages = order
            .into_iter()
            .map(|subsystem| {
                let batches = match verb {
                    Verb::Install => vec![subsystem.components()],
                    Verb::Start => subsystem.start_batches(),
                    Verb::Stop | Verb::Uninstall => subsystem.teardown_batches(),
                };
                Stage::Phase(Phase::new(Some(subsystem.heading().to_string()), batches))
            })
            .collect();

        let overlap_from = match verb {
            Verb::Start => Subsystem::ALL
                .iter()
                .position(|s| *s == Subsystem::ControlPlane),
            _ => None,
        };

        let hints = match verb {
            Verb::Install => vec!["Please run `deisctl start platform` to boot up Deis.".to_string()],
            Verb::Start => {
                vec!["Please use `deis register` to setup an administrator account.".to_string()]
            }
            Verb::Stop => vec!["Please run `deisctl start platform` to restart Deis.".to_string()],
            Verb::Uninstall => Vec::new(),
        };

        Self {
            verb,
            title: Some(format!("{} Deis...", verb.gerund())),
            stages,
            overlap_from,
            hints,
        }
    }

    /// A scheduler's control components plus its add-on, if it has one.
    pub fn scheduler(scheduler: Scheduler, verb: Verb) -> Self {
        let mut tiers = scheduler.tiers();
        if verb.is_teardown() {
            tiers.reverse();
        }

        let mut stages: Vec<Stage> = tiers
            .into_iter()
            .map(|(heading, targets)| {
                Stage::Phase(Phase::new(Some(heading.to_string()), vec![targets]))
            })
            .collect();

        if let Some(heading) = scheduler.addon_heading() {
            match verb {
                Verb::Start => stages.push(Stage::Addon {
                    heading: heading.to_string(),
                    scheduler,
                    action: AddonAction::Bootstrap,
                }),
                Verb::Uninstall => stages.insert(
                    0,
                    Stage::Addon {
                        heading: heading.to_string(),
                        scheduler,
                        action: AddonAction::Teardown,
                    },
                ),
                Verb::Install | Verb::Stop => {}
            }
        }

        let name = scheduler.display_name();
        let title = match verb {
            Verb::Uninstall => format!("Destroying {name}..."),
            _ => format!("{} {name}...", verb.gerund()),
        };

        let hints = match (verb, scheduler) {
            (Verb::Install, _) => vec![format!(
                "Please run `deisctl start {}` to start {name}.",
                scheduler.name()
            )],
            (Verb::Start, Scheduler::Kubernetes) => vec![
                "Please run `deisctl config controller set schedulerModule=k8s` to use the K8s scheduler."
                    .to_string(),
            ],
            (Verb::Start, Scheduler::Mesos) => vec![
                "Please run `deisctl config controller set schedulerModule=mesos_marathon` to use the Mesos scheduler."
                    .to_string(),
            ],
            _ => Vec::new(),
        };

        Self {
            verb,
            title: Some(title),
            stages,
            overlap_from: None,
            hints,
        }
    }

    /// Literal targets as one ad-hoc phase with no heading.
    pub fn targets(verb: Verb, targets: Vec<Target>) -> Self {
        Self {
            verb,
            title: None,
            stages: vec![Stage::Phase(Phase::new(None, vec![targets]))],
            overlap_from: None,
            hints: Vec::new(),
        }
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Index of the first stage dispatched together with everything after it.
    pub fn overlap_from(&self) -> Option<usize> {
        self.overlap_from
    }

    /// Lines printed after a successful run.
    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    /// Stage headings in execution order.
    pub fn headings(&self) -> Vec<&str> {
        self.stages
            .iter()
            .filter_map(|stage| match stage {
                Stage::Phase(phase) => phase.heading(),
                Stage::Addon { heading, .. } => Some(heading.as_str()),
            })
            .collect()
    }

    /// Every target the plan touches.
    pub fn members(&self) -> BTreeSet<Target> {
        self.stages
            .iter()
            .filter_map(|stage| match stage {
                Stage::Phase(phase) => Some(phase.batches().iter().flatten().cloned()),
                Stage::Addon { .. } => None,
            })
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_reverses_install_order() {
        let install = Plan::platform(Verb::Install);
        let stop = Plan::platform(Verb::Stop);

        let mut reversed = install.headings();
        reversed.reverse();
        assert_eq!(stop.headings(), reversed);
    }

    #[test]
    fn every_verb_covers_the_same_platform() {
        let install = Plan::platform(Verb::Install).members();
        assert_eq!(install.len(), 16);
        for verb in [Verb::Start, Verb::Stop, Verb::Uninstall] {
            assert_eq!(Plan::platform(verb).members(), install, "{verb}");
        }
    }

    #[test]
    fn uninstall_destroys_storage_dependents_first() {
        let plan = Plan::platform(Verb::Uninstall);
        let Some(Stage::Phase(storage)) = plan.stages().last() else {
            panic!("storage should be the last stage");
        };
        let names: Vec<Vec<String>> = storage
            .batches()
            .iter()
            .map(|batch| batch.iter().map(ToString::to_string).collect())
            .collect();
        assert_eq!(
            names,
            vec![
                vec!["store-volume".to_string(), "store-gateway".to_string()],
                vec!["store-metadata".to_string()],
                vec!["store-daemon".to_string()],
                vec!["store-monitor".to_string()],
            ]
        );
    }

    #[test]
    fn start_overlaps_from_the_control_plane() {
        let plan = Plan::platform(Verb::Start);
        let overlap = plan.overlap_from().unwrap();
        assert_eq!(plan.headings()[overlap], "Control plane...");
        assert_eq!(Plan::platform(Verb::Install).overlap_from(), None);
    }

    #[test]
    fn kubernetes_addon_brackets_the_plan() {
        let start = Plan::scheduler(Scheduler::Kubernetes, Verb::Start);
        assert!(matches!(
            start.stages().last(),
            Some(Stage::Addon {
                action: AddonAction::Bootstrap,
                ..
            })
        ));

        let uninstall = Plan::scheduler(Scheduler::Kubernetes, Verb::Uninstall);
        assert!(matches!(
            uninstall.stages().first(),
            Some(Stage::Addon {
                action: AddonAction::Teardown,
                ..
            })
        ));
        assert_eq!(uninstall.title(), Some("Destroying K8s..."));

        let mesos = Plan::scheduler(Scheduler::Mesos, Verb::Start);
        assert!(mesos
            .stages()
            .iter()
            .all(|stage| matches!(stage, Stage::Phase(_))));
    }

    #[test]
    fn selection_expands_reserved_names_only_alone() {
        assert_eq!(Selection::parse(&["platform"]), Ok(Selection::Platform));
        assert_eq!(
            Selection::parse(&["k8s"]),
            Ok(Selection::Scheduler(Scheduler::Kubernetes))
        );
        assert_eq!(
            Selection::parse(&["router@1", "builder"]),
            Ok(Selection::Targets(vec![
                Target::indexed("router", 1),
                Target::new("builder")
            ]))
        );
        assert_eq!(
            Selection::parse(&["builder", "platform"]),
            Err(ParseError::ReservedTarget {
                name: "platform".to_string()
            })
        );
        assert_eq!(Selection::parse::<&str>(&[]), Err(ParseError::NoTargets));
    }

    #[test]
    fn literal_targets_form_one_untitled_phase() {
        let plan = Plan::targets(Verb::Start, vec![Target::new("builder")]);
        assert_eq!(plan.title(), None);
        assert_eq!(plan.stages().len(), 1);
        assert!(plan.headings().is_empty());
    }
}
