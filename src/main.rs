use anyhow::{Context, Result};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use video_upload_wizard::{
    HttpTransport, UploadClient, WizardController,
    config::AppConfig,
    handlers::cli_handler::{self, ConsoleProgress, FormInput},
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // --- Parse config + form values ---
    let (cfg, args) = AppConfig::from_env_and_args()?;
    tracing::info!("Starting upload wizard with config: {:?}", cfg);

    let input = FormInput::from_args(&args).await?;

    // --- Upload client ---
    let transport = HttpTransport::new(cfg.endpoint.clone()).context("building HTTP client")?;
    let client = UploadClient::new(transport);

    // --- Walk the wizard ---
    let mut wizard = WizardController::new();
    let outcome =
        cli_handler::fill_and_submit(&mut wizard, &client, input, ConsoleProgress).await;
    match outcome {
        Ok(success) => {
            println!("{}", success.message);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            for line in cli_handler::describe_failure(&err) {
                eprintln!("{}", line);
            }
            tracing::debug!(state = ?wizard.state(), "wizard state after failure");
            Ok(ExitCode::FAILURE)
        }
    }
}
