//! Shared constants for the service and the client
//!

/// Path of the generation endpoint.
pub const GENERATE_PATH: &str = "/api/generate";

/// Default OpenAI REST base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Multimodal chat model used to describe the uploaded photo.
pub const DEFAULT_ANALYSIS_MODEL: &str = "gpt-4o";

/// Image model used to render the bust.
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Token ceiling for the photo description.
pub const ANALYSIS_MAX_TOKENS: u32 = 300;

/// 9:16 portrait, the closest dall-e-3 size to a 3:4 frame.
pub const IMAGE_SIZE: &str = "1024x1792";

/// Square size for models that don't offer portrait output (dall-e-2).
pub const IMAGE_SIZE_SQUARE: &str = "1024x1024";

/// Quality tier requested from dall-e-3. Other models get no quality field.
pub const IMAGE_QUALITY: &str = "hd";

/// Ask for a fetchable URL rather than inline base64.
pub const IMAGE_RESPONSE_FORMAT: &str = "url";

/// Default request body ceiling, large enough for a base64'd 10MB photo.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Upload size hint shown in the UI. Not enforced anywhere.
pub const UPLOAD_HINT: &str = "PNG, JPG, WEBP up to 10MB";

/// Suggested file name for downloads.
pub const DOWNLOAD_FILENAME: &str = "plaster-bust.png";

/// Returned when the request carries no image.
pub const MSG_NO_IMAGE: &str = "No image provided";

/// Returned when the request body isn't the expected JSON object.
pub const MSG_INVALID_BODY: &str = "Invalid request body";

/// Returned when no API credential is configured.
pub const MSG_NOT_CONFIGURED: &str = "OpenAI API key not configured";

/// Returned when the image model answers without a URL.
pub const MSG_NO_IMAGE_URL: &str = "No image URL returned from OpenAI";

/// Fallback for failures that carry no message of their own.
pub const MSG_GENERATION_FAILED: &str = "Failed to generate image";
