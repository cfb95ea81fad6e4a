//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;
use url::Url;

use crate::constants::{
    DEFAULT_ANALYSIS_MODEL, DEFAULT_IMAGE_MODEL, DEFAULT_MAX_BODY_BYTES, DEFAULT_OPENAI_BASE_URL,
};

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "PLASTERBUST_DEBUG")]
    /// Enable debug logging. Env: PLASTERBUST_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "9000", env = "PLASTERBUST_PORT")]
    /// http listener, defaults to `9000`.
    /// Env: PLASTERBUST_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "PLASTERBUST_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: PLASTERBUST_LISTEN_ADDRESS
    pub listen_address: String,

    #[clap(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    /// OpenAI API key. The server starts without one, but every generation
    /// request is refused until it's set.
    /// Env: OPENAI_API_KEY
    pub openai_api_key: Option<String>,

    #[clap(long, default_value = DEFAULT_OPENAI_BASE_URL, env = "OPENAI_BASE_URL")]
    /// OpenAI REST base URL.
    /// Env: OPENAI_BASE_URL
    pub openai_base_url: Url,

    #[clap(long, default_value = DEFAULT_ANALYSIS_MODEL, env = "PLASTERBUST_ANALYSIS_MODEL")]
    /// Vision model used to describe the photo.
    /// Env: PLASTERBUST_ANALYSIS_MODEL
    pub analysis_model: String,

    #[clap(long, default_value = DEFAULT_IMAGE_MODEL, env = "PLASTERBUST_IMAGE_MODEL")]
    /// Image model used to render the bust. `dall-e-3` gets a 1024x1792 hd
    /// portrait; any other model is sent a plain 1024x1024 request, so it
    /// has to be one that answers with an image URL (e.g. `dall-e-2`).
    /// Env: PLASTERBUST_IMAGE_MODEL
    pub image_model: String,

    #[clap(long, default_value_t = DEFAULT_MAX_BODY_BYTES, env = "PLASTERBUST_MAX_BODY_BYTES")]
    /// Largest accepted request body, in bytes.
    /// Env: PLASTERBUST_MAX_BODY_BYTES
    pub max_body_bytes: usize,
}
