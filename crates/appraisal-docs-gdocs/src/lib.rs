//! Google Docs / Drive backend for appraisal report rendering.
//!
//! - `GoogleDocsClient`: `DocumentStore` over the Docs API v1
//! - `GDriveClient`: template copy, PDF export, upload, sharing
//! - `TokenManager`: OAuth2 refresh-token grant with caching
//! - `ReportPipeline`: runs a `ReportJob` end to end

pub mod config;
pub mod gdocs;
pub mod gdrive;
pub mod report;
pub mod token_manager;

pub use config::Config;
pub use gdocs::GoogleDocsClient;
pub use gdrive::GDriveClient;
pub use report::{ReportJob, ReportOutput, ReportPipeline};
pub use token_manager::{OAuthCredentials, TokenManager};
