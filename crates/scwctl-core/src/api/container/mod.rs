//! Serverless containers API (`/containers/v1beta1`)
//!
//! Namespaces group containers; triggers feed a container from a message
//! queue. All three are regional resources.

mod types;
pub mod sweepers;

pub use types::*;

use tracing::{debug, info};

use crate::client::{Query, ScwClient};
use crate::error::Result;
use crate::locality::Region;
use crate::pagination::fetch_all_pages;
use crate::progress::ProgressCallback;
use crate::wait::{Observation, PollState, poll_until};

const BASE_PATH: &str = "/containers/v1beta1/regions";

/// Client for the serverless containers API
#[derive(Debug, Clone)]
pub struct ContainerApi {
    client: ScwClient,
}

impl ContainerApi {
    pub fn new(client: ScwClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ScwClient {
        &self.client
    }

    fn path(&self, region: Option<&Region>, suffix: &str) -> Result<String> {
        let region = self.client.region_or_default(region)?;
        Ok(format!("{BASE_PATH}/{region}/{suffix}"))
    }

    fn page_size(&self, requested: Option<u32>) -> Option<u32> {
        requested.or(self.client.default_page_size())
    }

    // Namespaces

    pub async fn list_namespaces(
        &self,
        req: &ListNamespacesRequest,
    ) -> Result<ListNamespacesResponse> {
        let path = self.path(req.region.as_ref(), "namespaces")?;
        let query = Query::new()
            .push_opt("page", req.page)
            .push_opt("page_size", self.page_size(req.page_size))
            .push_opt("order_by", req.order_by.as_deref())
            .push_opt("name", req.name.as_deref())
            .push_opt("organization_id", req.organization_id.as_deref())
            .push_opt("project_id", req.project_id.as_deref());
        self.client.get(&path, &query).await
    }

    pub async fn list_all_namespaces(
        &self,
        req: &ListNamespacesRequest,
    ) -> Result<ListNamespacesResponse> {
        fetch_all_pages(|page| {
            let req = ListNamespacesRequest {
                page: Some(page),
                ..req.clone()
            };
            async move { self.list_namespaces(&req).await }
        })
        .await
    }

    pub async fn get_namespace(
        &self,
        region: Option<&Region>,
        namespace_id: &str,
    ) -> Result<Namespace> {
        let path = self.path(region, &format!("namespaces/{namespace_id}"))?;
        self.client.get(&path, &Query::new()).await
    }

    pub async fn create_namespace(&self, req: &CreateNamespaceRequest) -> Result<Namespace> {
        let path = self.path(req.region.as_ref(), "namespaces")?;
        let mut body = req.clone();
        body.project_id = self.client.project_or_default(req.project_id.as_deref());
        let namespace: Namespace = self.client.post(&path, &body).await?;
        info!(id = %namespace.id, region = %namespace.region, "created container namespace");
        Ok(namespace)
    }

    pub async fn update_namespace(&self, req: &UpdateNamespaceRequest) -> Result<Namespace> {
        let path = self.path(
            req.region.as_ref(),
            &format!("namespaces/{}", req.namespace_id),
        )?;
        self.client.patch(&path, req).await
    }

    /// Delete a namespace and every container in it
    ///
    /// Returns the namespace, now in the `deleting` status.
    pub async fn delete_namespace(
        &self,
        region: Option<&Region>,
        namespace_id: &str,
    ) -> Result<Namespace> {
        let path = self.path(region, &format!("namespaces/{namespace_id}"))?;
        let namespace = self.client.delete_json(&path).await?;
        debug!(id = namespace_id, "deleting container namespace");
        Ok(namespace)
    }

    // Containers

    pub async fn list_containers(
        &self,
        req: &ListContainersRequest,
    ) -> Result<ListContainersResponse> {
        let path = self.path(req.region.as_ref(), "containers")?;
        let query = Query::new()
            .push_opt("page", req.page)
            .push_opt("page_size", self.page_size(req.page_size))
            .push_opt("order_by", req.order_by.as_deref())
            .push_opt("namespace_id", req.namespace_id.as_deref())
            .push_opt("name", req.name.as_deref())
            .push_opt("organization_id", req.organization_id.as_deref())
            .push_opt("project_id", req.project_id.as_deref());
        self.client.get(&path, &query).await
    }

    pub async fn list_all_containers(
        &self,
        req: &ListContainersRequest,
    ) -> Result<ListContainersResponse> {
        fetch_all_pages(|page| {
            let req = ListContainersRequest {
                page: Some(page),
                ..req.clone()
            };
            async move { self.list_containers(&req).await }
        })
        .await
    }

    pub async fn get_container(
        &self,
        region: Option<&Region>,
        container_id: &str,
    ) -> Result<Container> {
        let path = self.path(region, &format!("containers/{container_id}"))?;
        self.client.get(&path, &Query::new()).await
    }

    pub async fn create_container(&self, req: &CreateContainerRequest) -> Result<Container> {
        let path = self.path(req.region.as_ref(), "containers")?;
        let container: Container = self.client.post(&path, req).await?;
        info!(id = %container.id, namespace = %container.namespace_id, "created container");
        Ok(container)
    }

    pub async fn update_container(&self, req: &UpdateContainerRequest) -> Result<Container> {
        let path = self.path(
            req.region.as_ref(),
            &format!("containers/{}", req.container_id),
        )?;
        self.client.patch(&path, req).await
    }

    pub async fn delete_container(
        &self,
        region: Option<&Region>,
        container_id: &str,
    ) -> Result<Container> {
        let path = self.path(region, &format!("containers/{container_id}"))?;
        let container = self.client.delete_json(&path).await?;
        debug!(id = container_id, "deleting container");
        Ok(container)
    }

    /// Start a new deployment of a container from its registry image
    pub async fn deploy_container(
        &self,
        region: Option<&Region>,
        container_id: &str,
    ) -> Result<Container> {
        let path = self.path(region, &format!("containers/{container_id}/deploy"))?;
        let container: Container = self
            .client
            .post(&path, &serde_json::json!({}))
            .await?;
        info!(id = container_id, "container deployment started");
        Ok(container)
    }

    // Triggers

    pub async fn list_triggers(&self, req: &ListTriggersRequest) -> Result<ListTriggersResponse> {
        let path = self.path(req.region.as_ref(), "triggers")?;
        let mut query = Query::new()
            .push_opt("page", req.page)
            .push_opt("page_size", self.page_size(req.page_size))
            .push_opt("order_by", req.order_by.as_deref());
        // One scope filter only, the narrowest given
        query = match (&req.container_id, &req.namespace_id, &req.project_id) {
            (Some(id), _, _) => query.push("container_id", id),
            (None, Some(id), _) => query.push("namespace_id", id),
            (None, None, Some(id)) => query.push("project_id", id),
            (None, None, None) => query,
        };
        self.client.get(&path, &query).await
    }

    pub async fn list_all_triggers(
        &self,
        req: &ListTriggersRequest,
    ) -> Result<ListTriggersResponse> {
        fetch_all_pages(|page| {
            let req = ListTriggersRequest {
                page: Some(page),
                ..req.clone()
            };
            async move { self.list_triggers(&req).await }
        })
        .await
    }

    pub async fn get_trigger(&self, region: Option<&Region>, trigger_id: &str) -> Result<Trigger> {
        let path = self.path(region, &format!("triggers/{trigger_id}"))?;
        self.client.get(&path, &Query::new()).await
    }

    pub async fn create_trigger(&self, req: &CreateTriggerRequest) -> Result<Trigger> {
        let path = self.path(req.region.as_ref(), "triggers")?;
        let trigger: Trigger = self.client.post(&path, req).await?;
        info!(id = %trigger.id, container = %trigger.container_id, "created trigger");
        Ok(trigger)
    }

    pub async fn delete_trigger(
        &self,
        region: Option<&Region>,
        trigger_id: &str,
    ) -> Result<Trigger> {
        let path = self.path(region, &format!("triggers/{trigger_id}"))?;
        let trigger = self.client.delete_json(&path).await?;
        debug!(id = trigger_id, "deleting trigger");
        Ok(trigger)
    }

    // Waiters

    /// Poll a namespace until it is `ready`, `error` or `locked`
    pub async fn wait_for_namespace(
        &self,
        req: &WaitForContainerResourceRequest,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Namespace> {
        let region = self.client.region_or_default(req.region.as_ref())?;
        let options = req.options.unwrap_or_else(|| self.client.wait_options());
        poll_until(
            "container namespace",
            &req.id,
            &options,
            on_progress,
            || self.get_namespace(Some(&region), &req.id),
            |ns: &Namespace| Observation::new(namespace_poll_state(&ns.status), ns.status.as_str()),
        )
        .await
    }

    /// Poll a container until it is `ready`, `created`, `error` or `locked`
    pub async fn wait_for_container(
        &self,
        req: &WaitForContainerResourceRequest,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Container> {
        let region = self.client.region_or_default(req.region.as_ref())?;
        let options = req.options.unwrap_or_else(|| self.client.wait_options());
        poll_until(
            "container",
            &req.id,
            &options,
            on_progress,
            || self.get_container(Some(&region), &req.id),
            |c: &Container| Observation::new(container_poll_state(&c.status), c.status.as_str()),
        )
        .await
    }

    /// Poll a trigger until it is `ready` or `error`
    pub async fn wait_for_trigger(
        &self,
        req: &WaitForContainerResourceRequest,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Trigger> {
        let region = self.client.region_or_default(req.region.as_ref())?;
        let options = req.options.unwrap_or_else(|| self.client.wait_options());
        poll_until(
            "container trigger",
            &req.id,
            &options,
            on_progress,
            || self.get_trigger(Some(&region), &req.id),
            |t: &Trigger| Observation::new(trigger_poll_state(&t.status), t.status.as_str()),
        )
        .await
    }
}

fn namespace_poll_state(status: &NamespaceStatus) -> PollState {
    match status {
        NamespaceStatus::Ready | NamespaceStatus::Error | NamespaceStatus::Locked => {
            PollState::Terminal
        }
        _ => PollState::Pending,
    }
}

fn container_poll_state(status: &ContainerStatus) -> PollState {
    match status {
        ContainerStatus::Ready
        | ContainerStatus::Error
        | ContainerStatus::Locked
        | ContainerStatus::Created => PollState::Terminal,
        _ => PollState::Pending,
    }
}

fn trigger_poll_state(status: &TriggerStatus) -> PollState {
    match status {
        TriggerStatus::Ready | TriggerStatus::Error => PollState::Terminal,
        _ => PollState::Pending,
    }
}
