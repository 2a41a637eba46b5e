//! End-to-end report rendering: template copy, placeholder filling, PDF
//! publishing.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use appraisal_docs_core::{
    values_from_json, DocumentPopulator, DocumentStore, Gallery, GalleryOptions, PopulateOutcome,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::gdrive::{document_url, view_url, GDriveClient, PDF_MIME_TYPE};
use crate::token_manager::TokenManager;

/// Everything needed to render one report, as produced upstream from the
/// appraisal post content.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportJob {
    pub template_id: String,
    pub output_name: String,
    #[serde(default)]
    pub folder_id: Option<String>,
    /// Placeholder name -> value; `null` clears the placeholder.
    #[serde(default)]
    pub values: serde_json::Map<String, serde_json::Value>,
    /// Placeholder name -> `"Key: Value - Key: Value"` string.
    #[serde(default)]
    pub metadata_blocks: BTreeMap<String, String>,
    #[serde(default)]
    pub gallery: Option<Gallery>,
    #[serde(default)]
    pub title: Option<String>,
}

impl ReportJob {
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading job file {}", path.display()))?;
        let job = serde_json::from_str(&raw)
            .with_context(|| format!("parsing job file {}", path.display()))?;
        Ok(job)
    }
}

/// Links to the rendered artifacts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportOutput {
    pub document_id: String,
    pub document_url: String,
    pub pdf_file_id: Option<String>,
    pub pdf_url: Option<String>,
}

pub struct ReportPipeline {
    drive: Arc<GDriveClient>,
    tokens: Arc<TokenManager>,
    populator: DocumentPopulator,
}

impl ReportPipeline {
    pub fn new(
        drive: Arc<GDriveClient>,
        tokens: Arc<TokenManager>,
        store: Arc<dyn DocumentStore>,
        options: GalleryOptions,
    ) -> Self {
        Self {
            drive,
            tokens,
            populator: DocumentPopulator::with_options(store, options),
        }
    }

    /// Render `job` into a new document and, when `export_pdf` is set,
    /// publish a PDF copy.
    ///
    /// Steps run one after another against the same document; each step
    /// reads fresh offsets.
    pub async fn run(&self, job: &ReportJob, export_pdf: bool) -> anyhow::Result<ReportOutput> {
        let token = self.tokens.get_valid_token().await?;

        let document_id = self
            .drive
            .copy_file(
                &token,
                &job.template_id,
                &job.output_name,
                job.folder_id.as_deref(),
            )
            .await?;
        info!("Created document {} from template {}", document_id, job.template_id);

        let values = values_from_json(&job.values);
        self.populator
            .replace_placeholders(&document_id, &values)
            .await
            .context("replacing placeholders")?;

        if let PopulateOutcome::PlaceholderMissing = self
            .populator
            .insert_metadata_blocks(&document_id, &job.metadata_blocks)
            .await
            .context("inserting metadata blocks")?
        {
            warn!("No metadata block placeholders found in {}", document_id);
        }

        if let Some(gallery) = &job.gallery {
            self.populator
                .populate_gallery(&document_id, gallery)
                .await
                .context("populating gallery")?;
        }

        if let Some(title) = &job.title {
            self.populator
                .adjust_title_size(&document_id, title)
                .await
                .context("sizing title")?;
        }

        let mut output = ReportOutput {
            document_url: document_url(&document_id),
            document_id,
            pdf_file_id: None,
            pdf_url: None,
        };

        if export_pdf {
            let (pdf_id, pdf_url) = self.publish_pdf(job, &output.document_id).await?;
            output.pdf_file_id = Some(pdf_id);
            output.pdf_url = Some(pdf_url);
        }

        Ok(output)
    }

    /// Export, upload, and share the PDF. Returns its file ID and view link.
    async fn publish_pdf(
        &self,
        job: &ReportJob,
        document_id: &str,
    ) -> anyhow::Result<(String, String)> {
        // Filling may outlast the token; ask again.
        let token = self.tokens.get_valid_token().await?;

        let pdf = self.drive.export_pdf(&token, document_id).await?;
        let pdf_name = format!("{}.pdf", job.output_name);
        let pdf_id = self
            .drive
            .create_file(&token, &pdf_name, PDF_MIME_TYPE, job.folder_id.as_deref())
            .await?;
        self.drive
            .update_file(&token, &pdf_id, &pdf, PDF_MIME_TYPE)
            .await?;
        self.drive.share_public(&token, &pdf_id).await?;

        let link = self
            .drive
            .get_metadata(&token, &pdf_id)
            .await?
            .and_then(|m| m.web_view_link)
            .unwrap_or_else(|| view_url(&pdf_id));

        info!("Published PDF {} ({} bytes) at {}", pdf_id, pdf.len(), link);
        Ok((pdf_id, link))
    }
}
