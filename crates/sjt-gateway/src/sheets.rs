//! Google Sheets gateway.
//!
//! Appends one row per submission through the Sheets v4 `values:append`
//! endpoint. Obtaining the OAuth access token is left to whoever writes the
//! configuration.

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use tracing::instrument;

use sjt_core::submission::SubmissionRecord;
use sjt_core::traits::PersistenceGateway;

use crate::error::GatewayError;

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";
const DEFAULT_RANGE: &str = "Sheet1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Appends submission rows to a Google spreadsheet.
pub struct SheetsGateway {
    access_token: String,
    spreadsheet_id: String,
    range: String,
    base_url: String,
    client: reqwest::Client,
}

impl SheetsGateway {
    pub fn new(
        access_token: &str,
        spreadsheet_id: &str,
        range: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| GatewayError::Setup(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            access_token: access_token.to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.unwrap_or_else(|| DEFAULT_RANGE.to_string()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client,
        })
    }

    fn append_url(&self) -> Result<Url, GatewayError> {
        let append_segment = format!("{}:append", self.range);
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| GatewayError::Setup(format!("invalid base URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::Setup(format!("base URL cannot have a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                append_segment.as_str(),
            ]);
        url.query_pairs_mut()
            // RAW stores cells verbatim: no formulas, no date guessing.
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        Ok(url)
    }
}

#[derive(Serialize)]
struct AppendRequest {
    #[serde(rename = "majorDimension")]
    major_dimension: &'static str,
    values: Vec<Vec<JSValue>>,
}

#[derive(Deserialize, Default)]
struct AppendResponse {
    #[serde(default)]
    updates: AppendUpdates,
}

#[derive(Deserialize, Default)]
struct AppendUpdates {
    #[serde(rename = "updatedRange", default)]
    updated_range: Option<String>,
    #[serde(rename = "updatedCells", default)]
    updated_cells: u64,
}

#[derive(Deserialize)]
struct SheetsErrorBody {
    error: SheetsErrorDetail,
}

#[derive(Deserialize)]
struct SheetsErrorDetail {
    message: String,
}

/// Prefer the API's own error message over the raw body.
fn error_message(body: String) -> String {
    serde_json::from_str::<SheetsErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body)
}

#[async_trait]
impl PersistenceGateway for SheetsGateway {
    fn name(&self) -> &str {
        "sheets"
    }

    #[instrument(skip(self, record), fields(spreadsheet = %self.spreadsheet_id, columns = record.len()))]
    async fn append_row(&self, record: &SubmissionRecord) -> anyhow::Result<()> {
        let body = AppendRequest {
            major_dimension: "ROWS",
            values: vec![record.row_values()],
        };

        let response = self
            .client
            .post(self.append_url()?)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    GatewayError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                .saturating_mul(1000);
            return Err(GatewayError::RateLimited {
                retry_after_ms: retry_after,
            }
            .into());
        }
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::AuthenticationFailed(error_message(body)).into());
        }
        if status == 404 {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::DestinationNotFound(error_message(body)).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::ApiError {
                status,
                message: error_message(body),
            }
            .into());
        }

        // A 2xx with an unexpected body still means the row was written.
        let appended: AppendResponse = response.json().await.unwrap_or_default();
        tracing::debug!(
            "appended {} cells at {}",
            appended.updates.updated_cells,
            appended.updates.updated_range.as_deref().unwrap_or("<unknown range>")
        );
        Ok(())
    }
}
