use anyhow::{Result, anyhow};
use clap::Parser;
use plasterbust::client::{GenerateClient, UiPhase, UiState, UploadPayload};
use plasterbust::config::setup_logging;
use plasterbust::constants::DOWNLOAD_FILENAME;
use std::path::PathBuf;
use tracing::info;
use url::Url;

/// Turn a portrait photo into a plaster bust using a running plasterbust server.
///
/// Minimal UX:
///   plaster_client selfie.jpg --output bust.png
#[derive(Parser, Debug)]
#[command(name = "plaster_client")]
struct Args {
    /// Photo to send (PNG, JPG, WEBP, GIF)
    image: PathBuf,

    /// Base URL of the plasterbust server
    #[arg(long, default_value = "http://127.0.0.1:9000", env = "PLASTERBUST_SERVER")]
    server: Url,

    /// Save the render here. Use `-` to save as ./plaster-bust.png
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _ = setup_logging(args.debug);

    let client = GenerateClient::new(&args.server)?;
    let mut state = UiState::default();
    state.select_image(UploadPayload::from_file(&args.image).await?)?;

    info!("Generating plaster bust via {}", client.endpoint());
    state.generate(&client).await?;

    match state.phase() {
        UiPhase::Succeeded => {
            let image_url = state
                .download_url()
                .ok_or_else(|| anyhow!("Generation finished without an image URL"))?;
            println!("{image_url}");
            if let Some(output) = args.output {
                let dest = if output.as_os_str() == "-" {
                    PathBuf::from(DOWNLOAD_FILENAME)
                } else {
                    output
                };
                let written = client.download(image_url, &dest).await?;
                eprintln!("Saved: {} ({written} bytes)", dest.display());
            }
            Ok(())
        }
        _ => Err(anyhow!(
            "{}",
            state.error().unwrap_or("An error occurred")
        )),
    }
}
