//! Google Drive API v3 client wrapper.
//!
//! Token is passed per-call by the caller (TokenManager resolves it).
//! Covers what report publishing needs: copying the template, exporting
//! the filled document as PDF, uploading it, and sharing it.

use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

pub const DEFAULT_DRIVE_API_BASE: &str = "https://www.googleapis.com";
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// `base` with `segments` appended as percent-encoded path segments, so an
/// id can never add segments, a query or a fragment.
pub(crate) fn api_url(base: &str, segments: &[&str]) -> anyhow::Result<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("API base URL cannot carry a path: {}", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Metadata returned by Google Drive API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub web_view_link: Option<String>,
}

/// Google Drive API client (stateless, token provided per-call).
pub struct GDriveClient {
    http: Client,
    base_url: String,
}

impl Default for GDriveClient {
    fn default() -> Self {
        Self::new(DEFAULT_DRIVE_API_BASE)
    }
}

impl GDriveClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Copy a file (typically the report template). Returns the new file ID.
    #[instrument(skip(self, token), level = "debug")]
    pub async fn copy_file(
        &self,
        token: &str,
        file_id: &str,
        name: &str,
        folder_id: Option<&str>,
    ) -> anyhow::Result<String> {
        let url = api_url(&self.base_url, &["drive", "v3", "files", file_id, "copy"])?;

        let mut body = json!({ "name": name });
        if let Some(folder) = folder_id {
            body["parents"] = json!([folder]);
        }

        let resp = self
            .http
            .post(url)
            .query(&[("supportsAllDrives", "true")])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Google Drive copy error {}: {}", status, body);
        }

        let copied: FileMetadata = resp.json().await?;
        debug!("Copied file {} to {} ({})", file_id, copied.id, name);
        Ok(copied.id)
    }

    /// Export a Google Docs document as PDF bytes.
    #[instrument(skip(self, token), level = "debug")]
    pub async fn export_pdf(&self, token: &str, file_id: &str) -> anyhow::Result<Vec<u8>> {
        let url = api_url(&self.base_url, &["drive", "v3", "files", file_id, "export"])?;

        let resp = self
            .http
            .get(url)
            .query(&[("mimeType", PDF_MIME_TYPE)])
            .bearer_auth(token)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Google Drive export error {}: {}", status, body);
        }

        let bytes = resp.bytes().await?;
        debug!("Exported {} bytes of PDF for file {}", bytes.len(), file_id);
        Ok(bytes.to_vec())
    }

    /// Create an empty file with metadata only. Returns the new file ID.
    #[instrument(skip(self, token), level = "debug")]
    pub async fn create_file(
        &self,
        token: &str,
        name: &str,
        mime_type: &str,
        folder_id: Option<&str>,
    ) -> anyhow::Result<String> {
        let url = api_url(&self.base_url, &["drive", "v3", "files"])?;

        let mut body = json!({ "name": name, "mimeType": mime_type });
        if let Some(folder) = folder_id {
            body["parents"] = json!([folder]);
        }

        let resp = self
            .http
            .post(url)
            .query(&[("supportsAllDrives", "true")])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Google Drive create error {}: {}", status, body);
        }

        let created: FileMetadata = resp.json().await?;
        debug!("Created file {} ({})", created.id, name);
        Ok(created.id)
    }

    /// Upload (replace) file content on Google Drive.
    #[instrument(skip(self, token, data), level = "debug", fields(data_len = data.len()))]
    pub async fn update_file(
        &self,
        token: &str,
        file_id: &str,
        data: &[u8],
        content_type: &str,
    ) -> anyhow::Result<()> {
        let url = api_url(&self.base_url, &["upload", "drive", "v3", "files", file_id])?;

        let resp = self
            .http
            .patch(url)
            .query(&[("uploadType", "media")])
            .bearer_auth(token)
            .header("Content-Type", content_type)
            .body(data.to_vec())
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Google Drive upload error {}: {}", status, body);
        }

        debug!("Updated file {} ({} bytes)", file_id, data.len());
        Ok(())
    }

    /// Grant read access to anyone with the link.
    #[instrument(skip(self, token), level = "debug")]
    pub async fn share_public(&self, token: &str, file_id: &str) -> anyhow::Result<()> {
        let url = api_url(&self.base_url, &["drive", "v3", "files", file_id, "permissions"])?;

        let resp = self
            .http
            .post(url)
            .query(&[("supportsAllDrives", "true")])
            .bearer_auth(token)
            .json(&json!({ "role": "reader", "type": "anyone" }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Google Drive permission error {}: {}", status, body);
        }

        debug!("Shared file {} with anyone (reader)", file_id);
        Ok(())
    }

    /// Get file metadata from Google Drive.
    #[instrument(skip(self, token), level = "debug")]
    pub async fn get_metadata(
        &self,
        token: &str,
        file_id: &str,
    ) -> anyhow::Result<Option<FileMetadata>> {
        let url = api_url(&self.base_url, &["drive", "v3", "files", file_id])?;

        let resp = self
            .http
            .get(url)
            .query(&[
                ("fields", "id,name,mimeType,webViewLink"),
                ("supportsAllDrives", "true"),
            ])
            .bearer_auth(token)
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Google Drive API error {}: {}", status, body);
        }

        let metadata: FileMetadata = resp.json().await?;
        debug!("Got metadata for file {}: {:?}", file_id, metadata);
        Ok(Some(metadata))
    }
}

/// Edit link for a Google Docs document.
pub fn document_url(document_id: &str) -> String {
    format!("https://docs.google.com/document/d/{}/edit", document_id)
}

/// Public view link for a Drive file.
pub fn view_url(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{}/view", file_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_links() {
        assert_eq!(
            document_url("abc"),
            "https://docs.google.com/document/d/abc/edit"
        );
        assert_eq!(view_url("xyz"), "https://drive.google.com/file/d/xyz/view");
    }

    #[tokio::test]
    async fn test_copy_file_into_folder() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/drive/v3/files/template-1/copy"))
            .and(body_json(json!({ "name": "Report", "parents": ["folder-9"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "copy-1" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GDriveClient::new(server.uri());
        let id = client
            .copy_file("tok", "template-1", "Report", Some("folder-9"))
            .await
            .unwrap();

        assert_eq!(id, "copy-1");
    }

    #[tokio::test]
    async fn test_export_pdf() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/doc-1/export"))
            .and(query_param("mimeType", PDF_MIME_TYPE))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7".to_vec()))
            .mount(&server)
            .await;

        let client = GDriveClient::new(server.uri());
        let pdf = client.export_pdf("tok", "doc-1").await.unwrap();

        assert_eq!(pdf, b"%PDF-1.7".to_vec());
    }

    #[tokio::test]
    async fn test_upload_sends_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/upload/drive/v3/files/pdf-1"))
            .and(query_param("uploadType", "media"))
            .and(header("content-type", PDF_MIME_TYPE))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "pdf-1" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GDriveClient::new(server.uri());
        client
            .update_file("tok", "pdf-1", b"%PDF", PDF_MIME_TYPE)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_errors_carry_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/drive/v3/files/pdf-1/permissions"))
            .respond_with(ResponseTemplate::new(403).set_body_string("sharing disabled"))
            .mount(&server)
            .await;

        let client = GDriveClient::new(server.uri());
        let err = client.share_public("tok", "pdf-1").await.unwrap_err();

        assert!(err.to_string().contains("403"));
        assert!(err.to_string().contains("sharing disabled"));
    }

    #[test]
    fn test_api_url_encodes_ids_as_one_segment() {
        let url = api_url("http://127.0.0.1:9000", &["drive", "v3", "files", "a/b?c#d"]).unwrap();

        assert_eq!(url.path(), "/drive/v3/files/a%2Fb%3Fc%23d");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[tokio::test]
    async fn test_file_id_cannot_redirect_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/drive/v3/files/evil%2F..%2Fother/permissions"))
            .and(query_param("supportsAllDrives", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "perm-1" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GDriveClient::new(server.uri());
        client.share_public("tok", "evil/../other").await.unwrap();
    }

    #[tokio::test]
    async fn test_metadata_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = GDriveClient::new(server.uri());
        assert!(client.get_metadata("tok", "gone").await.unwrap().is_none());
    }
}
