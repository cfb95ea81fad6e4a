use clap::Parser;
use plasterbust::config::{ProviderConfig, setup_logging};
use plasterbust::provider::ProviderHandle;
use tracing::error;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = plasterbust::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }

    let provider = ProviderHandle::openai(cli.openai_api_key.clone(), ProviderConfig::from(&cli));

    if let Err(err) = plasterbust::web::setup_server(
        &cli.listen_address,
        cli.port,
        provider,
        cli.max_body_bytes,
    )
    .await
    {
        error!("Application error: {}", err);
    }
}
