use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

use super::error::GeminiError;
use super::types::CreateInteractionRequest;

pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// The two calls the lifecycle client needs from the network.
///
/// Implemented by [`GeminiClient`] and by scripted fakes in tests.
pub trait InteractionTransport {
    /// Create a background interaction. Returns the raw response body.
    async fn create_interaction(&self, req: &CreateInteractionRequest)
    -> Result<Value, GeminiError>;

    /// Fetch the current state of an interaction by id.
    async fn get_interaction(&self, id: &str) -> Result<Value, GeminiError>;
}

pub struct GeminiClient {
    api_key: String,
    client: Client,
    base_url: String,
}

impl GeminiClient {
    /// `base_url` is the API root, e.g. [`API_BASE`]; a trailing slash is
    /// tolerated.
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, GeminiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            api_key,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/interactions", self.base_url)
    }

    // Only 200 counts as success; everything else carries its body back.
    async fn into_json(response: Response) -> Result<Value, GeminiError> {
        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GeminiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

impl InteractionTransport for GeminiClient {
    async fn create_interaction(
        &self,
        req: &CreateInteractionRequest,
    ) -> Result<Value, GeminiError> {
        let response = self
            .client
            .post(self.collection_url())
            .header(API_KEY_HEADER, &self.api_key)
            .header("content-type", "application/json")
            .json(req)
            .send()
            .await?;
        Self::into_json(response).await
    }

    async fn get_interaction(&self, id: &str) -> Result<Value, GeminiError> {
        let response = self
            .client
            .get(format!("{}/{id}", self.collection_url()))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        Self::into_json(response).await
    }
}
