use super::prelude::*;
use crate::generation::{generate_bust, validate_body};

/// handles the /api/generate POST
///
/// The credential check comes first, so an unconfigured server never looks at
/// the body.
pub(crate) async fn generate_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, PlasterError> {
    debug!("Stage: {} ({} bytes)", GenerationStage::Received, body.len());
    let Some(provider) = state.provider.get() else {
        return Err(PlasterError::Configuration);
    };

    let image = validate_body(&body)?;
    let response = generate_bust(provider.as_ref(), &image)
        .await
        .inspect_err(|err| debug!("Stage: {} ({})", GenerationStage::Failed, err))?;

    info!("Generated image {}", response.image_url);
    Ok(Json(response))
}
