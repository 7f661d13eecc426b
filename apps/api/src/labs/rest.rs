use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::errors::AppError;
use crate::labs::LabStore;
use crate::models::lab::Lab;

/// Reads labs through the hosted row store's REST interface (`/rest/v1/<table>`).
#[derive(Clone)]
pub struct RestLabStore {
    client: Client,
    table_url: String,
    api_key: String,
}

impl RestLabStore {
    pub fn new(base_url: &str, api_key: String, table: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::LabStore(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            table_url: format!("{}/rest/v1/{table}", base_url.trim_end_matches('/')),
            api_key,
        })
    }

    async fn select(&self, filters: &[(&str, String)]) -> Result<Vec<Lab>, AppError> {
        let response = self
            .client
            .get(&self.table_url)
            .query(&[("select", "*")])
            .query(filters)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AppError::LabStore(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::LabStore(format!(
                "Row store returned {status}: {body}"
            )));
        }

        response
            .json::<Vec<Lab>>()
            .await
            .map_err(|e| AppError::LabStore(format!("Malformed lab rows: {e}")))
    }
}

#[async_trait]
impl LabStore for RestLabStore {
    async fn fetch_all(&self) -> Result<Vec<Lab>, AppError> {
        let labs = self.select(&[]).await?;
        debug!("Fetched {} labs from the REST row store", labs.len());
        Ok(labs)
    }

    async fn fetch_one(&self, id: i64) -> Result<Option<Lab>, AppError> {
        let labs = self.select(&[("id", format!("eq.{id}"))]).await?;
        Ok(labs.into_iter().next())
    }
}
