//! Outbound records API execution.

use std::time::Duration;

use serde_json::Value as JsonValue;

use nlq_core::{Method, RequestDescriptor};

use crate::error::AppError;

/// Client for the downstream FHIR records API
#[derive(Clone)]
pub struct FhirClient {
    http: reqwest::Client,
}

impl Default for FhirClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FhirClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Issue the generated request and return the response body.
    ///
    /// Only search execution is supported; create/update descriptors are
    /// returned to the caller via the preview endpoint instead. Non-2xx
    /// responses surface the upstream status and body unchanged.
    pub async fn execute(&self, request: &RequestDescriptor) -> Result<JsonValue, AppError> {
        match request.method {
            Method::Get => {
                let response = self
                    .http
                    .get(&request.url)
                    .header(reqwest::header::ACCEPT, "application/fhir+json")
                    .send()
                    .await
                    .map_err(|e| AppError::Upstream {
                        status: 502,
                        body: format!("Records API unreachable: {e}"),
                    })?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::Upstream {
                        status: status.as_u16(),
                        body,
                    });
                }

                response
                    .json()
                    .await
                    .map_err(|e| AppError::Internal(format!("Invalid upstream JSON: {e}")))
            }
            method => Err(AppError::NotImplemented(format!(
                "Method {method} not implemented."
            ))),
        }
    }
}
