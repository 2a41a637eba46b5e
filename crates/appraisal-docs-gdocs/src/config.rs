use std::path::PathBuf;

use appraisal_docs_core::gallery::{DEFAULT_CELL_PADDING_PT, DEFAULT_IMAGE_SIZE_PT};
use appraisal_docs_core::GalleryOptions;
use clap::Parser;

use crate::gdocs::DEFAULT_DOCS_API_BASE;
use crate::gdrive::DEFAULT_DRIVE_API_BASE;
use crate::token_manager::OAuthCredentials;

/// Configuration for the appraisal-docs renderer.
#[derive(Parser, Debug, Clone)]
#[command(name = "appraisal-docs")]
#[command(about = "Render an appraisal report from a Google Docs template and publish it as PDF")]
pub struct Config {
    /// Path to the report job JSON file
    #[arg(long, env = "REPORT_JOB")]
    pub job: PathBuf,

    /// Google OAuth2 Client ID
    #[arg(long, env = "GOOGLE_CLIENT_ID")]
    pub google_client_id: String,

    /// Google OAuth2 Client Secret
    #[arg(long, env = "GOOGLE_CLIENT_SECRET")]
    pub google_client_secret: String,

    /// Google OAuth2 refresh token with Docs and Drive scopes
    #[arg(long, env = "GOOGLE_REFRESH_TOKEN")]
    pub google_refresh_token: String,

    /// Docs API base URL
    #[arg(long, default_value = DEFAULT_DOCS_API_BASE, env = "DOCS_API_BASE")]
    pub docs_api_base: String,

    /// Drive API base URL
    #[arg(long, default_value = DEFAULT_DRIVE_API_BASE, env = "DRIVE_API_BASE")]
    pub drive_api_base: String,

    /// OAuth2 token endpoint
    #[arg(long, default_value = "https://oauth2.googleapis.com/token", env = "OAUTH_TOKEN_URL")]
    pub oauth_token_url: String,

    /// Gallery image bounding box (points)
    #[arg(long, default_value_t = DEFAULT_IMAGE_SIZE_PT, env = "GALLERY_IMAGE_SIZE_PT")]
    pub image_size_pt: f64,

    /// Gallery cell padding (points)
    #[arg(long, default_value_t = DEFAULT_CELL_PADDING_PT, env = "GALLERY_CELL_PADDING_PT")]
    pub cell_padding_pt: f64,

    /// Fill the document only; do not export or upload a PDF
    #[arg(long)]
    pub skip_pdf: bool,
}

impl Config {
    pub fn credentials(&self) -> OAuthCredentials {
        OAuthCredentials {
            client_id: self.google_client_id.clone(),
            client_secret: self.google_client_secret.clone(),
            refresh_token: self.google_refresh_token.clone(),
        }
    }

    pub fn gallery_options(&self) -> GalleryOptions {
        GalleryOptions {
            image_size_pt: self.image_size_pt,
            cell_padding_pt: self.cell_padding_pt,
        }
    }
}
