use crate::core::envelope::{unwrap_list, unwrap_single};
use crate::core::mapper::read_extent;
use crate::domain::model::{ContainerExtent, ContainerFilters, RawRecordList};
use crate::domain::ports::UpstreamStore;
use crate::utils::error::{LayoutError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

/// 透過 REST API 存取倉儲後端
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
    headers: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            headers: HashMap::new(),
            timeout: None,
        }
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<serde_json::Value> {
        let endpoint = self.url(path);
        tracing::debug!("Making API request to: {}", endpoint);

        let mut request = self
            .client
            .get(&endpoint)
            .header("Accept", "application/json")
            .query(query);

        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(LayoutError::UpstreamStatus {
                endpoint,
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl UpstreamStore for HttpStore {
    async fn fetch_containers(&self, filters: &ContainerFilters) -> Result<RawRecordList> {
        let payload = self.get_json("/api/udc", &filters.query_pairs()).await?;
        Ok(unwrap_list(&payload))
    }

    async fn fetch_compartments(&self, container_id: i64) -> Result<RawRecordList> {
        let path = format!("/api/udc/{}/compartments", container_id);
        let payload = self.get_json(&path, &[]).await?;
        Ok(unwrap_list(&payload))
    }

    async fn fetch_container_dimensions(&self, container_id: i64) -> Result<ContainerExtent> {
        let path = format!("/api/udc/{}", container_id);
        let payload = self.get_json(&path, &[]).await?;
        Ok(unwrap_single(&payload)
            .map(|record| read_extent(&record))
            .unwrap_or_default())
    }
}
