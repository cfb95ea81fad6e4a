pub(crate) use crate::error::PlasterError;
pub(crate) use crate::generation::{GenerateResponse, GenerationStage};
pub(crate) use crate::web::AppState;
pub(crate) use askama::Template;
pub(crate) use askama_web::WebTemplate;
pub(crate) use axum::Json;
pub(crate) use axum::body::Bytes;
pub(crate) use axum::extract::State;
pub(crate) use tracing::{debug, info};
