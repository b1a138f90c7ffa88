use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::{BackendConfig, NetworkConfig};
use crate::gesture::RefreshAction;
use crate::timetable::ScheduleEntry;

/// REST client for the backend's timetable table.
#[derive(Clone, Debug)]
pub struct TimetableClient {
    client: reqwest::Client,
    endpoint: String,
    anon_key: Option<String>,
}

impl TimetableClient {
    /// Create a new client with configurable timeouts.
    pub fn new(backend: &BackendConfig, network_config: &NetworkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(network_config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(network_config.connect_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let endpoint = format!(
            "{}/rest/v1/{}",
            backend.url.trim_end_matches('/'),
            backend.timetable_table
        );

        Ok(Self {
            client,
            endpoint,
            anon_key: backend.anon_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch every schedule entry.
    pub async fn fetch_entries(&self) -> Result<Vec<ScheduleEntry>> {
        let url = format!("{}?select=*", self.endpoint);
        let mut request = self.client.get(&url);
        if let Some(key) = &self.anon_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .context("Failed to send request to timetable API")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("API returned error status: {}", status);
        }

        let entries = response
            .json::<Vec<ScheduleEntry>>()
            .await
            .context("Failed to parse timetable API response")?;

        tracing::debug!("Fetched {} schedule entries", entries.len());
        Ok(entries)
    }
}

/// Refresh action that reloads the timetable into a shared cache.
#[derive(Clone, Debug)]
pub struct TimetableRefresh {
    client: TimetableClient,
    entries: Arc<RwLock<Vec<ScheduleEntry>>>,
}

impl TimetableRefresh {
    pub fn new(client: TimetableClient) -> Self {
        Self {
            client,
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Copy of the most recently fetched entries.
    pub fn entries(&self) -> Vec<ScheduleEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RefreshAction for TimetableRefresh {
    async fn refresh(&self) -> Result<()> {
        let fresh = self.client.fetch_entries().await?;
        *self.entries.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        Ok(())
    }
}
