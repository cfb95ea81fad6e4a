//! Config handling

use tracing::log::LevelFilter;
use url::Url;

use crate::cli::CliOptions;

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("reqwest", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Which provider endpoint and models to use.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// REST base, eg `https://api.openai.com/v1`
    pub base_url: Url,
    /// Vision model that describes the photo
    pub analysis_model: String,
    /// Model that renders the bust
    pub image_model: String,
}

impl From<&CliOptions> for ProviderConfig {
    fn from(cli: &CliOptions) -> Self {
        Self {
            base_url: cli.openai_base_url.clone(),
            analysis_model: cli.analysis_model.clone(),
            image_model: cli.image_model.clone(),
        }
    }
}
