//! The external AI provider seam.
//!
//! [`ImageProvider`] is the only thing the generation pipeline talks to, so
//! tests can swap the OpenAI adapter for a stand-in.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::config::ProviderConfig;

pub mod openai;

pub use openai::OpenAiProvider;

/// Boxed future returned by provider calls.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Vision-to-text and text-to-image capabilities of an external provider.
pub trait ImageProvider: Send + Sync + std::fmt::Debug {
    /// Describes `image` (a `data:` URL) following `instructions`.
    ///
    /// `Ok(None)` means the provider answered but produced no text.
    fn describe_image<'a>(
        &'a self,
        image: &'a str,
        instructions: &'a str,
    ) -> ProviderFuture<'a, Option<String>>;

    /// Renders one image for `prompt` and returns where to fetch it.
    ///
    /// `Ok(None)` means the provider answered without a URL.
    fn generate_image<'a>(&'a self, prompt: &'a str) -> ProviderFuture<'a, Option<String>>;
}

/// Failures talking to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The request never got a response
    Transport(String),
    /// The provider answered with a non-success status
    Api {
        /// HTTP status code
        status: u16,
        /// The provider's own message when it sent one
        message: String,
    },
    /// The response body wasn't what we expected
    Decode(String),
}

impl ProviderError {
    /// The underlying message, suitable for showing to the user.
    pub fn message(&self) -> &str {
        match self {
            ProviderError::Transport(message)
            | ProviderError::Decode(message)
            | ProviderError::Api { message, .. } => message,
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Transport(message) => write!(f, "Request to provider failed: {message}"),
            ProviderError::Api { status, message } => {
                write!(f, "Provider returned {status}: {message}")
            }
            ProviderError::Decode(message) => write!(f, "Unexpected provider response: {message}"),
        }
    }
}

impl std::error::Error for ProviderError {}

type ProviderFactory = Box<dyn Fn(&str) -> Arc<dyn ImageProvider> + Send + Sync>;

/// Process-wide provider client, built on first use from the credential.
///
/// Without a credential it never builds anything, and [`ProviderHandle::get`]
/// returns `None` on every call.
pub struct ProviderHandle {
    api_key: Option<String>,
    factory: ProviderFactory,
    provider: OnceLock<Arc<dyn ImageProvider>>,
}

impl ProviderHandle {
    /// Creates a handle that builds its provider with `factory`.
    ///
    /// Blank keys count as missing.
    pub fn new<F>(api_key: Option<String>, factory: F) -> Self
    where
        F: Fn(&str) -> Arc<dyn ImageProvider> + Send + Sync + 'static,
    {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        Self {
            api_key,
            factory: Box::new(factory),
            provider: OnceLock::new(),
        }
    }

    /// A handle backed by the OpenAI REST API.
    pub fn openai(api_key: Option<String>, config: ProviderConfig) -> Self {
        Self::new(api_key, move |key| {
            Arc::new(OpenAiProvider::new(key, &config)) as Arc<dyn ImageProvider>
        })
    }

    /// True when a credential was supplied.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Returns the shared provider, creating it on the first call.
    pub fn get(&self) -> Option<Arc<dyn ImageProvider>> {
        let api_key = self.api_key.as_deref()?;
        let provider = self.provider.get_or_init(|| {
            debug!("Creating provider client");
            (self.factory)(api_key)
        });
        Some(Arc::clone(provider))
    }
}

impl std::fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("configured", &self.is_configured())
            .field("initialized", &self.provider.get().is_some())
            .finish()
    }
}
