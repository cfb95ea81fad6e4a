//! OpenAI REST adapter.
//!
//! Chat completions: <https://platform.openai.com/docs/api-reference/chat>
//! Images: <https://platform.openai.com/docs/api-reference/images>

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ImageProvider, ProviderError, ProviderFuture};
use crate::config::ProviderConfig;
use crate::constants::{
    ANALYSIS_MAX_TOKENS, IMAGE_QUALITY, IMAGE_RESPONSE_FORMAT, IMAGE_SIZE, IMAGE_SIZE_SQUARE,
};

// -----------------------------
// Chat completions (vision)
// -----------------------------

#[derive(Serialize, Debug)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Serialize, Debug)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// -----------------------------
// Images API
// -----------------------------

/// Request body for POST /images/generations
#[derive(Serialize, Debug)]
struct ImagesGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<&'a str>,
    response_format: &'a str,
}

#[derive(Deserialize, Debug)]
struct ImagesGenerateResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize, Debug)]
struct ImageData {
    url: Option<String>,
    revised_prompt: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize, Debug)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Talks to the OpenAI API with a shared `reqwest` client.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    config: ProviderConfig,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OpenAiProvider {
    /// Creates a provider for `api_key`.
    pub fn new(api_key: &str, config: &ProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            config: config.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.as_str().trim_end_matches('/'),
            path
        )
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ProviderError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!("POST {}", url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| ProviderError::Transport(err.to_string()))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| ProviderError::Transport(err.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.error.message)
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| format!("OpenAI API error {status}"));
            warn!("OpenAI {} returned {}: {}", path, status, message);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes)
            .map_err(|err| ProviderError::Decode(format!("Failed to parse /{path} JSON: {err}")))
    }

    async fn chat_describe(
        &self,
        image: &str,
        instructions: &str,
    ) -> Result<Option<String>, ProviderError> {
        let req_body = ChatCompletionRequest {
            model: &self.config.analysis_model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: instructions },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image },
                    },
                ],
            }],
            max_tokens: ANALYSIS_MAX_TOKENS,
        };

        let parsed: ChatCompletionResponse = self.post_json("chat/completions", &req_body).await?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content))
    }

    async fn images_generate(&self, prompt: &str) -> Result<Option<String>, ProviderError> {
        let model = self.config.image_model.as_str();
        // portrait and hd are dall-e-3 only; dall-e-2 etc get a plain square
        let (size, quality) = if model == "dall-e-3" {
            (IMAGE_SIZE, Some(IMAGE_QUALITY))
        } else {
            (IMAGE_SIZE_SQUARE, None)
        };
        let req_body = ImagesGenerateRequest {
            model,
            prompt,
            n: 1,
            size,
            quality,
            response_format: IMAGE_RESPONSE_FORMAT,
        };

        let parsed: ImagesGenerateResponse =
            self.post_json("images/generations", &req_body).await?;
        let Some(first) = parsed.data.into_iter().next() else {
            return Ok(None);
        };
        if let Some(revised_prompt) = first.revised_prompt {
            debug!("Revised prompt from OpenAI: {}", revised_prompt);
        }
        Ok(first.url)
    }
}

impl ImageProvider for OpenAiProvider {
    fn describe_image<'a>(
        &'a self,
        image: &'a str,
        instructions: &'a str,
    ) -> ProviderFuture<'a, Option<String>> {
        Box::pin(self.chat_describe(image, instructions))
    }

    fn generate_image<'a>(&'a self, prompt: &'a str) -> ProviderFuture<'a, Option<String>> {
        Box::pin(self.images_generate(prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
    use axum::response::IntoResponse;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use tokio::sync::Mutex;
    use url::Url;

    #[derive(Clone, Default)]
    struct MockOpenAi {
        requests: Arc<Mutex<Vec<(String, Value)>>>,
        fail_with: Option<(StatusCode, Value)>,
        chat_reply: Option<Value>,
    }

    async fn mock_chat(
        State(mock): State<MockOpenAi>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> axum::response::Response {
        record(&mock, &headers, "chat", body).await;
        if let Some((status, body)) = mock.fail_with.clone() {
            return (status, Json(body)).into_response();
        }
        let reply = mock.chat_reply.clone().unwrap_or_else(|| {
            json!({"choices": [{"message": {"role": "assistant", "content": "a smiling young adult"}}]})
        });
        Json(reply).into_response()
    }

    async fn mock_images(
        State(mock): State<MockOpenAi>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> axum::response::Response {
        record(&mock, &headers, "images", body).await;
        if let Some((status, body)) = mock.fail_with.clone() {
            return (status, Json(body)).into_response();
        }
        Json(json!({"created": 1, "data": [{"url": "https://example/img1.png", "revised_prompt": "bust"}]}))
            .into_response()
    }

    async fn record(mock: &MockOpenAi, headers: &HeaderMap, kind: &str, body: Value) {
        let auth = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert_eq!(auth, "Bearer sk-test");
        mock.requests.lock().await.push((kind.to_string(), body));
    }

    async fn spawn_mock(mock: MockOpenAi) -> OpenAiProvider {
        spawn_mock_with_model(mock, "dall-e-3").await
    }

    async fn spawn_mock_with_model(mock: MockOpenAi, image_model: &str) -> OpenAiProvider {
        let app = Router::new()
            .route("/v1/chat/completions", axum::routing::post(mock_chat))
            .route("/v1/images/generations", axum::routing::post(mock_images))
            .with_state(mock);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock");
        let addr = listener.local_addr().expect("mock addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        let config = ProviderConfig {
            image_model: image_model.to_string(),
            ..test_config(&format!("http://{addr}/v1"))
        };
        OpenAiProvider::new("sk-test", &config)
    }

    fn test_config(base_url: &str) -> ProviderConfig {
        ProviderConfig {
            base_url: Url::parse(base_url).expect("base url"),
            analysis_model: "gpt-4o".to_string(),
            image_model: "dall-e-3".to_string(),
        }
    }

    #[tokio::test]
    async fn describe_sends_image_and_instructions() {
        let mock = MockOpenAi::default();
        let requests = mock.requests.clone();
        let provider = spawn_mock(mock).await;

        let text = provider
            .describe_image("data:image/png;base64,AAAA", "describe them")
            .await
            .expect("describe");
        assert_eq!(text.as_deref(), Some("a smiling young adult"));

        let requests = requests.lock().await;
        let (kind, body) = &requests[0];
        assert_eq!(kind, "chat");
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 300);
        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "describe them");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,AAAA");
    }

    #[tokio::test]
    async fn describe_without_choices_is_empty() {
        let mock = MockOpenAi {
            chat_reply: Some(json!({"choices": []})),
            ..Default::default()
        };
        let provider = spawn_mock(mock).await;
        let text = provider
            .describe_image("data:image/png;base64,AAAA", "describe them")
            .await
            .expect("describe");
        assert!(text.is_none());
    }

    #[tokio::test]
    async fn generate_requests_one_hd_portrait_url() {
        let mock = MockOpenAi::default();
        let requests = mock.requests.clone();
        let provider = spawn_mock(mock).await;

        let url = provider
            .generate_image("a plaster bust")
            .await
            .expect("generate");
        assert_eq!(url.as_deref(), Some("https://example/img1.png"));

        let requests = requests.lock().await;
        let (kind, body) = &requests[0];
        assert_eq!(kind, "images");
        assert_eq!(body["model"], "dall-e-3");
        assert_eq!(body["prompt"], "a plaster bust");
        assert_eq!(body["n"], 1);
        assert_eq!(body["size"], "1024x1792");
        assert_eq!(body["quality"], "hd");
        assert_eq!(body["response_format"], "url");
    }

    #[tokio::test]
    async fn dall_e_2_gets_a_square_without_quality() {
        let mock = MockOpenAi::default();
        let requests = mock.requests.clone();
        let provider = spawn_mock_with_model(mock, "dall-e-2").await;

        let url = provider
            .generate_image("a plaster bust")
            .await
            .expect("generate");
        assert_eq!(url.as_deref(), Some("https://example/img1.png"));

        let requests = requests.lock().await;
        let (_, body) = &requests[0];
        assert_eq!(body["model"], "dall-e-2");
        assert_eq!(body["size"], "1024x1024");
        assert!(body.get("quality").is_none());
        assert_eq!(body["response_format"], "url");
    }

    #[tokio::test]
    async fn api_error_message_is_surfaced() {
        let mock = MockOpenAi {
            fail_with: Some((
                StatusCode::UNAUTHORIZED,
                json!({"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}),
            )),
            ..Default::default()
        };
        let provider = spawn_mock(mock).await;
        let err = provider
            .generate_image("a plaster bust")
            .await
            .expect_err("should fail");
        assert_eq!(
            err,
            ProviderError::Api {
                status: 401,
                message: "Incorrect API key provided".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn api_error_without_body_gets_status_message() {
        let mock = MockOpenAi {
            fail_with: Some((StatusCode::BAD_GATEWAY, json!({}))),
            ..Default::default()
        };
        let provider = spawn_mock(mock).await;
        let err = provider
            .describe_image("data:image/png;base64,AAAA", "describe them")
            .await
            .expect_err("should fail");
        assert_eq!(err.message(), "OpenAI API error 502 Bad Gateway");
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let provider = OpenAiProvider::new("sk-test", &test_config(&format!("http://{addr}/v1")));
        let err = provider
            .describe_image("data:image/png;base64,AAAA", "describe them")
            .await
            .expect_err("should fail");
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
