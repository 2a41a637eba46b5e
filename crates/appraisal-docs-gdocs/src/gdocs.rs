//! Google Docs API v1 client.
//!
//! The client is constructed explicitly and must be `connect`ed before use;
//! `close` drops the cached credentials and rejects further calls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use appraisal_docs_core::{BatchUpdateReply, DocsError, Document, DocumentStore, EditOperation};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::gdrive::api_url;
use crate::token_manager::TokenManager;

pub const DEFAULT_DOCS_API_BASE: &str = "https://docs.googleapis.com";

#[derive(Serialize)]
struct BatchUpdateRequest<'a> {
    requests: &'a [EditOperation],
}

/// Google Docs API client implementing [`DocumentStore`].
pub struct GoogleDocsClient {
    http: Client,
    base_url: String,
    tokens: Arc<TokenManager>,
    connected: AtomicBool,
}

impl GoogleDocsClient {
    pub fn new(tokens: Arc<TokenManager>, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            connected: AtomicBool::new(false),
        }
    }

    /// Obtain an access token so that credential problems surface here
    /// rather than on the first document call.
    pub async fn connect(&self) -> Result<(), DocsError> {
        self.tokens
            .get_valid_token()
            .await
            .map_err(|e| DocsError::Auth(e.to_string()))?;
        self.connected.store(true, Ordering::SeqCst);
        info!("Connected to Google Docs API at {}", self.base_url);
        Ok(())
    }

    pub async fn close(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.tokens.invalidate().await;
        debug!("Closed Google Docs client");
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn token(&self) -> Result<String, DocsError> {
        if !self.is_connected() {
            return Err(DocsError::NotConnected);
        }
        self.tokens
            .get_valid_token()
            .await
            .map_err(|e| DocsError::Auth(e.to_string()))
    }

    /// `{base}/v1/documents/{id}{suffix}` with the id percent-encoded as a
    /// single path segment.
    fn document_url(&self, document_id: &str, suffix: &str) -> Result<Url, DocsError> {
        let segment = format!("{}{}", document_id, suffix);
        api_url(&self.base_url, &["v1", "documents", &segment])
            .map_err(|e| DocsError::InvalidInput(e.to_string()))
    }
}

/// Map a non-success response to a [`DocsError`].
async fn error_for_status(resp: Response, document_id: &str) -> Result<Response, DocsError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(DocsError::DocumentNotFound(document_id.to_string()));
    }
    let body = resp.text().await.unwrap_or_default();
    Err(DocsError::Api {
        status: status.as_u16(),
        message: body,
    })
}

fn transport(e: reqwest::Error) -> DocsError {
    DocsError::Transport(e.to_string())
}

#[async_trait]
impl DocumentStore for GoogleDocsClient {
    #[instrument(skip(self), level = "debug")]
    async fn get_document(&self, document_id: &str) -> Result<Document, DocsError> {
        let token = self.token().await?;

        let resp = self
            .http
            .get(self.document_url(document_id, "")?)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(transport)?;
        let resp = error_for_status(resp, document_id).await?;

        let document: Document = resp.json().await.map_err(transport)?;
        debug!(
            "Fetched document {} ({} top-level elements)",
            document_id,
            document.body.content.len()
        );
        Ok(document)
    }

    #[instrument(skip(self, requests), level = "debug", fields(count = requests.len()))]
    async fn batch_update(
        &self,
        document_id: &str,
        requests: &[EditOperation],
    ) -> Result<BatchUpdateReply, DocsError> {
        let token = self.token().await?;

        let resp = self
            .http
            .post(self.document_url(document_id, ":batchUpdate")?)
            .bearer_auth(&token)
            .json(&BatchUpdateRequest { requests })
            .send()
            .await
            .map_err(transport)?;
        let resp = error_for_status(resp, document_id).await?;

        let reply: BatchUpdateReply = resp.json().await.map_err(transport)?;
        debug!(
            "Applied {} requests to document {}",
            requests.len(),
            document_id
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_manager::OAuthCredentials;
    use appraisal_docs_core::TextRange;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn connected_client(server: &MockServer) -> GoogleDocsClient {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "test-token",
                "expires_in": 3600
            })))
            .mount(server)
            .await;

        let tokens = Arc::new(TokenManager::new(
            OAuthCredentials {
                client_id: "client".to_string(),
                client_secret: "secret".to_string(),
                refresh_token: "refresh".to_string(),
            },
            format!("{}/token", server.uri()),
        ));
        let client = GoogleDocsClient::new(tokens, server.uri());
        client.connect().await.unwrap();
        client
    }

    #[tokio::test]
    async fn test_get_document() {
        let server = MockServer::start().await;
        let client = connected_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/v1/documents/doc-1"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documentId": "doc-1",
                "title": "Appraisal",
                "revisionId": "r1",
                "body": { "content": [
                    { "endIndex": 1, "sectionBreak": {} },
                    { "startIndex": 1, "endIndex": 11, "paragraph": { "elements": [
                        { "startIndex": 1, "endIndex": 11, "textRun": { "content": "{{title}}\n", "textStyle": {} } }
                    ]}}
                ]}
            })))
            .mount(&server)
            .await;

        let doc = client.get_document("doc-1").await.unwrap();

        assert_eq!(doc.document_id, "doc-1");
        assert_eq!(doc.body.content.len(), 2);
        assert_eq!(
            appraisal_docs_core::locate::locate_first(&doc, "title"),
            Some(TextRange::new(1, 10))
        );
    }

    #[tokio::test]
    async fn test_missing_document_maps_to_not_found() {
        let server = MockServer::start().await;
        let client = connected_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/v1/documents/nope"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client.get_document("nope").await.unwrap_err();
        assert!(matches!(err, DocsError::DocumentNotFound(id) if id == "nope"));
    }

    #[tokio::test]
    async fn test_batch_update_posts_requests() {
        let server = MockServer::start().await;
        let client = connected_client(&server).await;

        let requests = vec![
            EditOperation::replace_placeholder("title", "Vase"),
            EditOperation::delete(TextRange::new(5, 10)),
        ];

        Mock::given(method("POST"))
            .and(path("/v1/documents/doc-1:batchUpdate"))
            .and(body_json(json!({ "requests": requests })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documentId": "doc-1",
                "replies": [{ "replaceAllText": { "occurrencesChanged": 2 } }, {}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client.batch_update("doc-1", &requests).await.unwrap();
        assert_eq!(reply.replies.len(), 2);
    }

    #[tokio::test]
    async fn test_api_error_is_propagated() {
        let server = MockServer::start().await;
        let client = connected_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/v1/documents/doc-1:batchUpdate"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Quota exceeded"))
            .mount(&server)
            .await;

        let err = client
            .batch_update("doc-1", &[EditOperation::replace_placeholder("a", "b")])
            .await
            .unwrap_err();
        match err {
            DocsError::Api { status, message } => {
                assert_eq!(status, 429);
                assert!(message.contains("Quota exceeded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_document_id_is_a_single_path_segment() {
        let server = MockServer::start().await;
        let client = connected_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/v1/documents/doc%2F1%3Fx%23y:batchUpdate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documentId": "doc/1?x#y",
                "replies": [{}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client
            .batch_update("doc/1?x#y", &[EditOperation::replace_placeholder("a", "b")])
            .await
            .unwrap();
        assert_eq!(reply.document_id, "doc/1?x#y");
    }

    #[tokio::test]
    async fn test_calls_require_connection() {
        let server = MockServer::start().await;
        let client = connected_client(&server).await;

        client.close().await;
        assert!(!client.is_connected());
        assert!(matches!(
            client.get_document("doc-1").await,
            Err(DocsError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_connect_reports_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized_client"))
            .mount(&server)
            .await;

        let tokens = Arc::new(TokenManager::new(
            OAuthCredentials {
                client_id: "client".to_string(),
                client_secret: "bad".to_string(),
                refresh_token: "refresh".to_string(),
            },
            format!("{}/token", server.uri()),
        ));
        let client = GoogleDocsClient::new(tokens, server.uri());

        assert!(matches!(client.connect().await, Err(DocsError::Auth(_))));
        assert!(!client.is_connected());
    }
}
