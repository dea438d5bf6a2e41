//! The fixed component graph: platform subsystems and alternate schedulers.

use crate::domain::target::Target;

/// Aggregate target that expands to the whole platform.
pub const PLATFORM: &str = "platform";

/// Components whose replica count can change after install.
pub const SCALABLE_COMPONENTS: &[&str] = &["router"];

/// Routing mesh replicas installed by default.
pub const ROUTER_REPLICAS: u32 = 3;

/// Whether `component` accepts scale requests.
pub fn is_scalable(component: &str) -> bool {
    SCALABLE_COMPONENTS.contains(&component)
}

fn targets(names: &[&str]) -> Vec<Target> {
    names.iter().map(|name| Target::new(*name)).collect()
}

fn routers() -> Vec<Target> {
    (1..=ROUTER_REPLICAS)
        .map(|index| Target::indexed("router", index))
        .collect()
}

/// Platform subsystems in install (dependency) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    Storage,
    Logging,
    ControlPlane,
    DataPlane,
    RoutingMesh,
}

impl Subsystem {
    /// Dependency order: each subsystem only depends on earlier ones.
    pub const ALL: [Subsystem; 5] = [
        Subsystem::Storage,
        Subsystem::Logging,
        Subsystem::ControlPlane,
        Subsystem::DataPlane,
        Subsystem::RoutingMesh,
    ];

    /// Operator-facing progress heading.
    pub fn heading(self) -> &'static str {
        match self {
            Subsystem::Storage => "Storage subsystem...",
            Subsystem::Logging => "Logging subsystem...",
            Subsystem::ControlPlane => "Control plane...",
            Subsystem::DataPlane => "Data plane...",
            Subsystem::RoutingMesh => "Routing mesh...",
        }
    }

    /// Every component of the subsystem, installed as one batch.
    pub fn components(self) -> Vec<Target> {
        match self {
            Subsystem::Storage => targets(&[
                "store-daemon",
                "store-monitor",
                "store-metadata",
                "store-volume",
                "store-gateway",
            ]),
            Subsystem::Logging => targets(&["logger", "logspout"]),
            Subsystem::ControlPlane => {
                targets(&["cache", "database", "registry", "controller", "builder"])
            }
            Subsystem::DataPlane => targets(&["publisher"]),
            Subsystem::RoutingMesh => routers(),
        }
    }

    /// Start batches, each awaited before the next.
    ///
    /// Storage comes up monitor first; the gateway needs metadata and the
    /// volume needs the gateway. Logging starts the logger before the shipper.
    pub fn start_batches(self) -> Vec<Vec<Target>> {
        match self {
            Subsystem::Storage => [
                "store-monitor",
                "store-daemon",
                "store-metadata",
                "store-gateway",
                "store-volume",
            ]
            .iter()
            .map(|name| vec![Target::new(*name)])
            .collect(),
            Subsystem::Logging => vec![targets(&["logger"]), targets(&["logspout"])],
            Subsystem::ControlPlane => vec![
                targets(&["cache", "database", "registry", "controller"]),
                targets(&["builder"]),
            ],
            Subsystem::DataPlane | Subsystem::RoutingMesh => vec![self.components()],
        }
    }

    /// Stop and destroy batches: dependents before their dependencies.
    pub fn teardown_batches(self) -> Vec<Vec<Target>> {
        match self {
            Subsystem::Storage => vec![
                targets(&["store-volume", "store-gateway"]),
                targets(&["store-metadata"]),
                targets(&["store-daemon"]),
                targets(&["store-monitor"]),
            ],
            Subsystem::ControlPlane => vec![targets(&[
                "controller",
                "builder",
                "cache",
                "database",
                "registry",
            ])],
            _ => vec![self.components()],
        }
    }
}

/// Alternate schedulers that can be deployed next to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheduler {
    Kubernetes,
    Mesos,
}

impl Scheduler {
    pub const ALL: [Scheduler; 2] = [Scheduler::Kubernetes, Scheduler::Mesos];

    /// Reserved target name.
    pub fn name(self) -> &'static str {
        match self {
            Scheduler::Kubernetes => "k8s",
            Scheduler::Mesos => "mesos",
        }
    }

    /// Name used in progress titles.
    pub fn display_name(self) -> &'static str {
        match self {
            Scheduler::Kubernetes => "K8s",
            Scheduler::Mesos => "Mesos",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scheduler| scheduler.name() == name)
    }

    /// Install-order tiers as `(heading, components)`.
    pub fn tiers(self) -> Vec<(&'static str, Vec<Target>)> {
        match self {
            Scheduler::Kubernetes => vec![
                ("K8s API Server...", targets(&["kube-apiserver"])),
                (
                    "K8s controller and scheduler...",
                    targets(&["kube-controller-manager", "kube-scheduler"]),
                ),
                (
                    "K8s proxy and kubelet...",
                    targets(&["kube-proxy", "kube-kubelet"]),
                ),
            ],
            Scheduler::Mesos => vec![
                ("Zookeeper...", targets(&["zookeeper"])),
                ("Mesos Master...", targets(&["mesos-master"])),
                ("Mesos Slave...", targets(&["mesos-slave"])),
                ("Marathon framework...", targets(&["mesos-marathon"])),
            ],
        }
    }

    /// Heading of the scheduler-owned add-on stage, when the scheduler has one.
    pub fn addon_heading(self) -> Option<&'static str> {
        match self {
            Scheduler::Kubernetes => Some("K8s DNS..."),
            Scheduler::Mesos => None,
        }
    }
}
