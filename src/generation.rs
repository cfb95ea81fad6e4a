//! The two-stage describe-then-render pipeline behind the endpoint.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::constants::{MSG_INVALID_BODY, MSG_NO_IMAGE, MSG_NO_IMAGE_URL};
use crate::error::PlasterError;
use crate::prompts::{ANALYSIS_PROMPT, compose_generation_prompt};
use crate::provider::ImageProvider;

/// Where a request is in its lifecycle. `Failed` is reachable from
/// `Validating`, `Analyzing` and `GeneratingImage`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GenerationStage {
    /// Body arrived
    Received,
    /// Checking the body for an image
    Validating,
    /// Waiting on the vision model
    Analyzing,
    /// Building the image prompt
    ComposingPrompt,
    /// Waiting on the image model
    GeneratingImage,
    /// A URL came back
    Succeeded,
    /// Terminal failure
    Failed,
}

impl std::fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            GenerationStage::Received => "received",
            GenerationStage::Validating => "validating",
            GenerationStage::Analyzing => "analyzing",
            GenerationStage::ComposingPrompt => "composing prompt",
            GenerationStage::GeneratingImage => "generating image",
            GenerationStage::Succeeded => "succeeded",
            GenerationStage::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Body of `POST /api/generate`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GenerateRequest {
    /// The photo as a `data:` URL
    #[serde(default)]
    pub image: Option<String>,
}

/// Successful body of `POST /api/generate`.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// Provider-hosted location of the render
    pub image_url: String,
}

/// Pulls the image out of a raw request body.
///
/// Empty bodies and missing, null or empty `image` fields are all "no image".
pub fn validate_body(body: &[u8]) -> Result<String, PlasterError> {
    debug!("Stage: {}", GenerationStage::Validating);
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(PlasterError::Validation(MSG_NO_IMAGE.to_string()));
    }
    let request: GenerateRequest = serde_json::from_slice(body).map_err(|err| {
        debug!("Unparseable request body: {}", err);
        PlasterError::Validation(MSG_INVALID_BODY.to_string())
    })?;
    request
        .image
        .filter(|image| !image.trim().is_empty())
        .ok_or_else(|| PlasterError::Validation(MSG_NO_IMAGE.to_string()))
}

/// Describes the photo, then renders the bust, returning the image URL.
///
/// A missing description is tolerated and the render goes ahead on the style
/// template alone. Provider errors end the request.
#[instrument(skip_all, fields(image_len = image.len()))]
pub async fn generate_bust(
    provider: &dyn ImageProvider,
    image: &str,
) -> Result<GenerateResponse, PlasterError> {
    debug!("Stage: {}", GenerationStage::Analyzing);
    let analysis = provider
        .describe_image(image, ANALYSIS_PROMPT)
        .await
        .map_err(|err| PlasterError::upstream(GenerationStage::Analyzing, err))?
        .unwrap_or_default();
    if analysis.trim().is_empty() {
        warn!("Analysis returned no text, rendering without a description");
    }

    debug!("Stage: {}", GenerationStage::ComposingPrompt);
    let prompt = compose_generation_prompt(&analysis);

    debug!("Stage: {}", GenerationStage::GeneratingImage);
    let image_url = provider
        .generate_image(&prompt)
        .await
        .map_err(|err| PlasterError::upstream(GenerationStage::GeneratingImage, err))?
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| PlasterError::Upstream {
            stage: GenerationStage::GeneratingImage,
            message: MSG_NO_IMAGE_URL.to_string(),
        })?;

    debug!("Stage: {}", GenerationStage::Succeeded);
    Ok(GenerateResponse { image_url })
}
