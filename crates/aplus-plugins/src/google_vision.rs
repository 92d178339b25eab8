//! Google Cloud Vision annotator
//!
//! Sends one image per request with text, logo, object and label detection
//! and returns the annotations of the single response element.

use anyhow::{Context, Result};
use aplus_core::{RemoteServiceError, VisionAnnotations, VisionAnnotator, VisionConfig};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

const FEATURES: &[&str] = &[
    "TEXT_DETECTION",
    "LOGO_DETECTION",
    "OBJECT_LOCALIZATION",
    "LABEL_DETECTION",
];

/// Error bodies are truncated to this many characters in errors and logs
const MAX_ERROR_BODY: usize = 512;

/// Google Cloud Vision images:annotate client
pub struct GoogleVisionClient {
    http_client: reqwest::Client,
    api_key: String,
    endpoint: String,
    timeout: Duration,
}

impl Debug for GoogleVisionClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GoogleVisionClient")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GoogleVisionClient {
    /// Build a client. The timeout bounds the whole request, body included.
    pub fn new(config: &VisionConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client for Google Vision API")?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            timeout: config.timeout,
        })
    }

    fn request_body(image: &[u8]) -> serde_json::Value {
        use base64::Engine;
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(image);

        let features: Vec<serde_json::Value> = FEATURES
            .iter()
            .map(|feature| json!({ "type": feature }))
            .collect();

        json!({
            "requests": [{
                "image": {
                    "content": image_base64
                },
                "features": features
            }]
        })
    }

    fn map_transport_error(&self, err: reqwest::Error) -> RemoteServiceError {
        if err.is_timeout() {
            RemoteServiceError::Timeout(self.timeout)
        } else {
            RemoteServiceError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl VisionAnnotator for GoogleVisionClient {
    fn name(&self) -> &str {
        "google_vision"
    }

    async fn annotate(&self, image: &[u8]) -> Result<VisionAnnotations, RemoteServiceError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            image_bytes = image.len(),
            "Requesting Google Vision annotations"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request_body(image))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RemoteServiceError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let vision_response: VisionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                RemoteServiceError::Timeout(self.timeout)
            } else {
                RemoteServiceError::Malformed(e.to_string())
            }
        })?;

        // Single-image batch: only the first element is meaningful
        let Some(first) = vision_response.responses.into_iter().next() else {
            return Ok(VisionAnnotations::default());
        };

        if let Some(error) = first.error {
            return Err(RemoteServiceError::Api {
                code: error.code,
                message: error.message.unwrap_or_default(),
            });
        }

        Ok(first.annotations)
    }
}

#[derive(Debug, Deserialize)]
struct VisionResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
struct AnnotateImageResponse {
    #[serde(flatten)]
    annotations: VisionAnnotations,
    error: Option<VisionError>,
}

#[derive(Debug, Deserialize)]
struct VisionError {
    code: Option<i32>,
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const ANNOTATE_PATH: &str = "/v1/images:annotate";

    fn client_for(server: &mockito::Server) -> GoogleVisionClient {
        GoogleVisionClient::new(&VisionConfig {
            api_key: "test-key".to_string(),
            endpoint: format!("{}{}", server.url(), ANNOTATE_PATH),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let body = GoogleVisionClient::request_body(b"abc");
        assert_eq!(body["requests"][0]["image"]["content"], "YWJj");
        let features: Vec<&str> = body["requests"][0]["features"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["type"].as_str().unwrap())
            .collect();
        assert_eq!(features, FEATURES);
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = GoogleVisionClient::new(&VisionConfig {
            api_key: "super-secret".to_string(),
            endpoint: "https://vision.example.test/v1/images:annotate".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        assert!(!format!("{:?}", client).contains("super-secret"));
    }

    #[tokio::test]
    async fn test_annotate_parses_first_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", ANNOTATE_PATH)
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::Regex(r#""content":"AQID""#.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "responses": [{
                        "textAnnotations": [{ "description": "SALE" }],
                        "localizedObjectAnnotations": [
                            { "mid": "/m/06rrc", "name": "Shoe", "score": 0.93 },
                            { "mid": "/m/01g317", "name": "Person", "score": 0.88 }
                        ],
                        "labelAnnotations": [{ "description": "Footwear", "score": 0.97 }]
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let annotations = client_for(&server).annotate(&[1, 2, 3]).await.unwrap();

        mock.assert_async().await;
        assert_eq!(annotations.text_annotations.len(), 1);
        assert!(annotations.logo_annotations.is_empty());
        assert_eq!(
            annotations.object_names().collect::<Vec<_>>(),
            vec!["Shoe", "Person"]
        );
        assert_eq!(annotations.label_annotations[0].description, "Footwear");
    }

    #[tokio::test]
    async fn test_annotate_empty_responses_is_no_annotations() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", ANNOTATE_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"responses": [{}]}"#)
            .create_async()
            .await;

        let annotations = client_for(&server).annotate(b"img").await.unwrap();
        assert_eq!(annotations, VisionAnnotations::default());
    }

    #[tokio::test]
    async fn test_annotate_http_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", ANNOTATE_PATH)
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error": {"code": 403, "message": "API key not valid"}}"#)
            .create_async()
            .await;

        let err = client_for(&server).annotate(b"img").await.unwrap_err();
        match err {
            RemoteServiceError::Status { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("API key not valid"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_annotate_error_inside_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", ANNOTATE_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"responses": [{"error": {"code": 3, "message": "Bad image data."}}]}"#)
            .create_async()
            .await;

        let err = client_for(&server).annotate(b"img").await.unwrap_err();
        assert!(matches!(
            err,
            RemoteServiceError::Api { code: Some(3), ref message } if message == "Bad image data."
        ));
    }

    #[tokio::test]
    async fn test_annotate_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", ANNOTATE_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let err = client_for(&server).annotate(b"img").await.unwrap_err();
        assert!(matches!(err, RemoteServiceError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_annotate_slow_server_times_out() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", ANNOTATE_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_chunked_body(|w| {
                use std::io::Write;
                std::thread::sleep(Duration::from_secs(3));
                w.write_all(br#"{"responses": []}"#)
            })
            .create_async()
            .await;

        let client = GoogleVisionClient::new(&VisionConfig {
            api_key: "test-key".to_string(),
            endpoint: format!("{}{}", server.url(), ANNOTATE_PATH),
            timeout: Duration::from_secs(1),
        })
        .unwrap();

        let err = client.annotate(b"img").await.unwrap_err();
        assert!(
            matches!(err, RemoteServiceError::Timeout(t) if t == Duration::from_secs(1)),
            "expected timeout, got {:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_annotate_unreachable_endpoint() {
        let client = GoogleVisionClient::new(&VisionConfig {
            api_key: "test-key".to_string(),
            endpoint: "http://127.0.0.1:1/v1/images:annotate".to_string(),
            timeout: Duration::from_secs(2),
        })
        .unwrap();

        let err = client.annotate(b"img").await.unwrap_err();
        assert!(matches!(
            err,
            RemoteServiceError::Transport(_) | RemoteServiceError::Timeout(_)
        ));
    }
}
