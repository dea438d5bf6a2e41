//! Cluster DNS add-on for the Kubernetes scheduler.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::try_join_all;
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::Scheduler;
use crate::error::{BackendError, Result};
use crate::port::{spawn_one, ConfigStore, EventSink, Extensions, PhaseBarrier};

use super::manifest::{self, PodList, NAME};
use super::settings::KubernetesConfig;

/// Store key holding the API server host.
pub const MASTER_KEY: &str = "/deis/scheduler/k8s/master";

struct ResourceApi {
    http: HttpClient,
    store: Arc<dyn ConfigStore>,
    api_port: u16,
}

impl ResourceApi {
    async fn master(&self) -> Result<String> {
        self.store.get(MASTER_KEY).await?.ok_or_else(|| {
            BackendError::new(NAME, format!("scheduler master not set at {MASTER_KEY}")).into()
        })
    }

    /// `http://<master>:<port>/api/v1beta3/namespaces/default/`
    fn namespace(&self, master: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "http://{master}:{}/api/v1beta3/namespaces/default/",
            self.api_port
        ))?)
    }

    async fn send(&self, method: Method, url: Url, body: Option<Value>) -> Result<Response> {
        debug!(%method, %url, "Kubernetes request");
        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        Self::check(&method, &url, response)
    }

    /// DELETE a resource. Returns whether it still existed; a 404 is not an error.
    async fn remove(&self, url: Url) -> Result<bool> {
        debug!(%url, "Kubernetes delete");
        let response = self.http.delete(url.clone()).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(%url, "Already removed");
            return Ok(false);
        }
        Self::check(&Method::DELETE, &url, response)?;
        Ok(true)
    }

    fn check(method: &Method, url: &Url, response: Response) -> Result<Response> {
        if !response.status().is_success() {
            return Err(BackendError::new(
                NAME,
                format!("{method} {} returned {}", url.path(), response.status()),
            )
            .into());
        }
        Ok(response)
    }

    async fn bootstrap(&self) -> Result<Option<String>> {
        let master = self.master().await?;
        let base = self.namespace(&master)?;

        let controller = manifest::replication_controller(&master, self.api_port);
        self.send(Method::POST, base.join("replicationcontrollers/")?, Some(controller))
            .await?;
        self.send(Method::POST, base.join("services/")?, Some(manifest::service()))
            .await?;

        info!(%master, "DNS add-on deployed");
        Ok(Some(format!("{NAME}: deployed")))
    }

    async fn teardown(&self) -> Result<Option<String>> {
        let master = self.master().await?;
        let base = self.namespace(&master)?;

        self.remove(base.join(&format!("replicationcontrollers/{NAME}"))?)
            .await?;
        self.remove(base.join(&format!("services/{NAME}"))?).await?;

        let pods: PodList = self
            .send(Method::GET, base.join("pods")?, None)
            .await?
            .json()
            .await?;
        let deletes = pods
            .dns_pods()
            .map(|pod| base.join(&format!("pods/{pod}")))
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .map(|url| self.remove(url));
        let removed = try_join_all(deletes)
            .await?
            .into_iter()
            .filter(|deleted| *deleted)
            .count();

        info!(%master, pods = removed, "DNS add-on removed");
        Ok(Some(format!("{NAME}: removed")))
    }
}

/// Deploys and removes `kube-dns` through the Kubernetes resource API.
///
/// The API server address is read from the configuration store when the
/// add-on runs, since the master only exists once the scheduler is up.
#[derive(Clone)]
pub struct KubeDnsAddon {
    api: Arc<ResourceApi>,
}

impl KubeDnsAddon {
    pub fn new(store: Arc<dyn ConfigStore>, config: &KubernetesConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });
        Self {
            api: Arc::new(ResourceApi {
                http,
                store,
                api_port: config.api_port,
            }),
        }
    }
}

impl Extensions for KubeDnsAddon {
    fn bootstrap(&self, scheduler: Scheduler, barrier: &PhaseBarrier, events: &EventSink) {
        let api = Arc::clone(&self.api);
        spawn_one(barrier, events, async move {
            match scheduler {
                Scheduler::Kubernetes => api.bootstrap().await,
                other => Err(unsupported(other)),
            }
        });
    }

    fn teardown(&self, scheduler: Scheduler, barrier: &PhaseBarrier, events: &EventSink) {
        let api = Arc::clone(&self.api);
        spawn_one(barrier, events, async move {
            match scheduler {
                Scheduler::Kubernetes => api.teardown().await,
                other => Err(unsupported(other)),
            }
        });
    }
}

fn unsupported(scheduler: Scheduler) -> crate::error::Error {
    BackendError::new(scheduler.name(), "no add-ons for this scheduler").into()
}
