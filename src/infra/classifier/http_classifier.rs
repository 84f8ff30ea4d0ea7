use crate::core::moderation::{Classifier, ClassifierError, ClassifierScores};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Client for a remote scoring service.
///
/// Request: `POST <url>` with `{"text": "..."}`.
/// Response: `{"obscenity_score": 0.0..1.0, "negativity_score": 0.0..1.0}`
/// (camelCase keys are accepted too).
pub struct HttpClassifier {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiScores {
    #[serde(alias = "obscenityScore")]
    obscenity_score: Option<f32>,
    #[serde(alias = "negativityScore")]
    negativity_score: Option<f32>,
}

impl HttpClassifier {
    pub fn new(
        url: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClassifierError> {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert(
            "User-Agent",
            HeaderValue::from_static("FeedModeration/0.1"),
        );
        if let Some(key) = api_key {
            headers.insert(
                "Authorization",
                HeaderValue::from_str(&format!("Bearer {}", key))
                    .map_err(|e| ClassifierError::Request(e.to_string()))?,
            );
        }

        // The pipeline enforces its own deadline too; this one stops the
        // socket from lingering after the pipeline has given up.
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::Request(e.to_string()))?;

        Ok(Self { client, url })
    }

    fn parse_scores(body: &str) -> Result<ClassifierScores, ClassifierError> {
        let api: ApiScores =
            serde_json::from_str(body).map_err(|e| ClassifierError::Malformed(e.to_string()))?;

        match (api.obscenity_score, api.negativity_score) {
            (Some(obscenity), Some(negativity)) => Ok(ClassifierScores::new(obscenity, negativity)),
            _ => Err(ClassifierError::Malformed(
                "response is missing a score".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<ClassifierScores, ClassifierError> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| ClassifierError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClassifierError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Self::parse_scores(&body)
    }
}
