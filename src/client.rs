//! Client side of the generator: pick a photo, send it, keep the result.
//!
//! [`UiState`] mirrors what the upload page tracks, so the command line client
//! and the page behave the same way.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose;
use tracing::{debug, info};
use url::Url;

use crate::constants::{GENERATE_PATH, MSG_GENERATION_FAILED};
use crate::error::ErrorBody;
use crate::generation::{GenerateRequest, GenerateResponse};

/// Client-side failures. Endpoint failures are not errors here, they land in
/// [`UiState::error`].
#[derive(Debug)]
pub enum ClientError {
    /// The file's bytes aren't a recognisable image
    NotAnImage,
    /// Reading or writing a local file failed
    Io(std::io::Error),
    /// A generation is already in flight
    Busy,
    /// Generate was asked for before an image was selected
    NoImage,
    /// The server URL can't be used
    InvalidServer(url::ParseError),
    /// Fetching the finished image failed
    Download(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::NotAnImage => write!(f, "The selected file is not a supported image"),
            ClientError::Io(err) => write!(f, "File error: {err}"),
            ClientError::Busy => write!(f, "A generation is already in progress"),
            ClientError::NoImage => write!(f, "Select an image first"),
            ClientError::InvalidServer(err) => write!(f, "Invalid server URL: {err}"),
            ClientError::Download(message) => write!(f, "Download failed: {message}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Io(err)
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidServer(err)
    }
}

/// A selected photo, encoded as a `data:` URL.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UploadPayload {
    mime: &'static str,
    data_url: String,
}

impl UploadPayload {
    /// Encodes raw image bytes. The format is sniffed from the magic bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ClientError> {
        let format = image::guess_format(bytes).map_err(|err| {
            debug!("Failed to guess image format: {}", err);
            ClientError::NotAnImage
        })?;
        let mime = format.to_mime_type();
        let data_url = format!(
            "data:{};base64,{}",
            mime,
            general_purpose::STANDARD.encode(bytes)
        );
        Ok(Self { mime, data_url })
    }

    /// Reads and encodes an image file.
    pub async fn from_file(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_bytes(&bytes)
    }

    /// MIME type of the encoded image.
    pub fn mime(&self) -> &str {
        self.mime
    }

    /// The `data:` URL sent to the endpoint.
    pub fn as_data_url(&self) -> &str {
        &self.data_url
    }
}

/// Derived view of [`UiState`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UiPhase {
    /// Nothing selected yet
    Idle,
    /// A photo is ready to send
    ImageSelected,
    /// Waiting on the endpoint
    Generating,
    /// A render is available
    Succeeded,
    /// The last attempt failed
    Failed,
}

/// What the upload view holds between interactions.
#[derive(Clone, Debug, Default)]
pub struct UiState {
    selected: Option<UploadPayload>,
    result: Option<String>,
    loading: bool,
    error: Option<String>,
}

impl UiState {
    /// Where the view is now.
    pub fn phase(&self) -> UiPhase {
        if self.loading {
            UiPhase::Generating
        } else if self.error.is_some() {
            UiPhase::Failed
        } else if self.result.is_some() {
            UiPhase::Succeeded
        } else if self.selected.is_some() {
            UiPhase::ImageSelected
        } else {
            UiPhase::Idle
        }
    }

    /// Replaces the selected photo and clears any previous outcome.
    pub fn select_image(&mut self, payload: UploadPayload) -> Result<(), ClientError> {
        if self.loading {
            return Err(ClientError::Busy);
        }
        self.selected = Some(payload);
        self.result = None;
        self.error = None;
        Ok(())
    }

    /// True when a photo is selected and nothing is in flight.
    pub fn can_generate(&self) -> bool {
        self.selected.is_some() && !self.loading
    }

    /// Enters the busy state and hands back the payload to send.
    pub fn begin_generate(&mut self) -> Result<UploadPayload, ClientError> {
        if self.loading {
            return Err(ClientError::Busy);
        }
        let payload = self.selected.clone().ok_or(ClientError::NoImage)?;
        self.loading = true;
        self.error = None;
        Ok(payload)
    }

    /// Records the endpoint's answer and leaves the busy state.
    pub fn finish_generate(&mut self, outcome: Result<String, String>) {
        self.loading = false;
        match outcome {
            Ok(url) => {
                self.result = Some(url);
                self.error = None;
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
    }

    /// Runs one full generate round trip through `client`.
    pub async fn generate(&mut self, client: &GenerateClient) -> Result<(), ClientError> {
        let payload = self.begin_generate()?;
        let outcome = client.generate(&payload).await;
        self.finish_generate(outcome);
        Ok(())
    }

    /// The render's URL, once there is one.
    pub fn download_url(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Message for the last failure.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The current photo, if any.
    pub fn selected(&self) -> Option<&UploadPayload> {
        self.selected.as_ref()
    }
}

/// Talks to a running plasterbust server.
#[derive(Clone, Debug)]
pub struct GenerateClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl GenerateClient {
    /// Client for the server at `server`, eg `http://127.0.0.1:9000`. A path
    /// on `server` is kept as a prefix, so `https://host/plaster` posts to
    /// `https://host/plaster/api/generate`.
    pub fn new(server: &Url) -> Result<Self, ClientError> {
        let mut base = server.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: base.join(GENERATE_PATH.trim_start_matches('/'))?,
        })
    }

    /// Full URL of the generation endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends `payload` and returns the render URL or a display message.
    pub async fn generate(&self, payload: &UploadPayload) -> Result<String, String> {
        let body = GenerateRequest {
            image: Some(payload.as_data_url().to_string()),
        };
        info!("Sending {} image to {}", payload.mime(), self.endpoint);
        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|err| err.to_string())?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|err| err.to_string())?;
        if !status.is_success() {
            debug!("Endpoint returned {}", status);
            return Err(serde_json::from_slice::<ErrorBody>(&bytes)
                .map(|body| body.error)
                .ok()
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| MSG_GENERATION_FAILED.to_string()));
        }

        serde_json::from_slice::<GenerateResponse>(&bytes)
            .map(|body| body.image_url)
            .map_err(|err| {
                debug!("Unexpected success body: {}", err);
                MSG_GENERATION_FAILED.to_string()
            })
    }

    /// Fetches the render straight from where it's hosted into `dest`.
    pub async fn download(&self, image_url: &str, dest: &Path) -> Result<usize, ClientError> {
        let resp = self
            .http
            .get(image_url)
            .send()
            .await
            .map_err(|err| ClientError::Download(err.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Download(format!("{image_url} returned {status}")));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| ClientError::Download(err.to_string()))?;
        tokio::fs::write(dest, &bytes).await?;
        Ok(bytes.len())
    }
}
