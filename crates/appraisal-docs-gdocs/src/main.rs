use std::sync::Arc;

use appraisal_docs_gdocs::{
    Config, GDriveClient, GoogleDocsClient, ReportJob, ReportPipeline, TokenManager,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();

    info!("Starting appraisal-docs");
    info!("  Job file: {}", config.job.display());
    info!("  Docs API: {}", config.docs_api_base);

    let job = ReportJob::load(&config.job).await?;

    let token_manager = Arc::new(TokenManager::new(
        config.credentials(),
        config.oauth_token_url.clone(),
    ));

    let docs_client = Arc::new(GoogleDocsClient::new(
        token_manager.clone(),
        config.docs_api_base.clone(),
    ));
    docs_client.connect().await?;

    let drive_client = Arc::new(GDriveClient::new(config.drive_api_base.clone()));

    let pipeline = ReportPipeline::new(
        drive_client,
        token_manager,
        docs_client.clone(),
        config.gallery_options(),
    );

    let result = pipeline.run(&job, !config.skip_pdf).await;
    docs_client.close().await;
    let output = result?;

    info!("Report ready: {}", output.document_url);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
