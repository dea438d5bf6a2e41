//! Resource definitions for the cluster DNS add-on.

use serde::Deserialize;
use serde_json::{json, Value};

/// Name shared by the replication controller and the service.
pub const NAME: &str = "kube-dns";

/// Prefix the controller gives the pods it creates.
pub const POD_PREFIX: &str = "kube-dns-";

pub const CLUSTER_IP: &str = "10.100.0.10";

const DOMAIN: &str = "cluster.local";

/// Replication controller running etcd, kube2sky and skydns in one pod.
pub fn replication_controller(master: &str, api_port: u16) -> Value {
    json!({
        "kind": "ReplicationController",
        "apiVersion": "v1beta3",
        "metadata": {
            "name": NAME,
            "namespace": "default",
            "labels": labels(),
        },
        "spec": {
            "replicas": 1,
            "selector": { "k8s-app": NAME },
            "template": {
                "metadata": { "labels": labels() },
                "spec": {
                    "dnsPolicy": "Default",
                    "containers": [
                        {
                            "name": "etcd",
                            "image": "gcr.io/google_containers/etcd:2.0.9",
                            "command": [
                                "/usr/local/bin/etcd",
                                "-listen-client-urls",
                                "http://127.0.0.1:2379,http://127.0.0.1:4001",
                                "-advertise-client-urls",
                                "http://127.0.0.1:2379,http://127.0.0.1:4001",
                                "-initial-cluster-token",
                                "skydns-etcd"
                            ]
                        },
                        {
                            "name": "kube2sky",
                            "image": "gcr.io/google_containers/kube2sky:1.7",
                            "args": [
                                format!("-kube_master_url=http://{master}:{api_port}"),
                                format!("-domain={DOMAIN}")
                            ]
                        },
                        {
                            "name": "skydns",
                            "image": "gcr.io/google_containers/skydns:2015-03-11-001",
                            "args": [
                                "-machines=http://localhost:2379",
                                "-addr=0.0.0.0:53",
                                format!("-domain={DOMAIN}"),
                                "-nameservers=8.8.8.8:53,8.8.4.4:53"
                            ],
                            "livenessProbe": {
                                "initialDelaySeconds": 30,
                                "timeoutSeconds": 5,
                                "exec": {
                                    "command": [
                                        "/bin/sh",
                                        "-c",
                                        format!("nslookup kubernetes.default.{DOMAIN} localhost >/dev/null")
                                    ]
                                }
                            },
                            "ports": dns_ports("containerPort")
                        }
                    ]
                }
            }
        }
    })
}

/// Service exposing the DNS pod on the fixed cluster IP.
pub fn service() -> Value {
    let mut labels = labels();
    labels["name"] = json!(NAME);
    json!({
        "kind": "Service",
        "apiVersion": "v1",
        "metadata": {
            "name": NAME,
            "namespace": "default",
            "labels": labels,
        },
        "spec": {
            "clusterIP": CLUSTER_IP,
            "selector": { "k8s-app": NAME },
            "ports": dns_ports("port")
        }
    })
}

fn labels() -> Value {
    json!({
        "k8s-app": NAME,
        "kubernetes.io/cluster-service": "true"
    })
}

fn dns_ports(key: &str) -> Value {
    json!([
        { "name": "dns", "protocol": "UDP", key: 53 },
        { "name": "dns-tcp", "protocol": "TCP", key: 53 }
    ])
}

/// The part of a pod listing the teardown needs.
#[derive(Debug, Deserialize)]
pub struct PodList {
    #[serde(default)]
    pub items: Vec<Pod>,
}

#[derive(Debug, Deserialize)]
pub struct Pod {
    pub metadata: PodMetadata,
}

#[derive(Debug, Deserialize)]
pub struct PodMetadata {
    pub name: String,
    #[serde(rename = "generateName", default)]
    pub generate_name: Option<String>,
}

impl PodList {
    /// Names of the pods the DNS controller created.
    pub fn dns_pods(&self) -> impl Iterator<Item = &str> {
        self.items
            .iter()
            .filter(|pod| pod.metadata.generate_name.as_deref() == Some(POD_PREFIX))
            .map(|pod| pod.metadata.name.as_str())
    }
}
