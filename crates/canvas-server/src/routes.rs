//! HTTP and WebSocket endpoints

use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        DefaultBodyLimit, Multipart, State,
    },
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use canvas_commands::{ActionResult, CommandProcessor};
use futures_util::{future, StreamExt};
use inference::{GenerateChunk, GenerateRequest};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::assistant::AssistantReply;
use crate::constants::{defaults, routes};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(routes::HEALTHCHECK, get(healthcheck))
        .route(routes::MODELS, get(list_models))
        .route(routes::TEXT_PROMPT, post(text_prompt))
        .route(
            routes::IMAGE_PROMPT,
            post(image_prompt).layer(DefaultBodyLimit::max(defaults::MAX_UPLOAD_BYTES)),
        )
        .route(routes::HANDLE_COMMAND, post(handle_command))
        .route(routes::ASSISTANT, post(assistant))
        .route(routes::COMMAND_SOCKET, get(command_socket))
        .layer(cors)
        .with_state(state)
}

// --- Handlers ---

async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "running" }))
}

async fn list_models(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let models = state.gateway.list_models().await.map_err(ApiError::Models)?;
    Ok(Json(json!({ "models": models })))
}

#[derive(Debug, Deserialize)]
pub struct TextPromptForm {
    pub prompt: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// Stream the model's answer to a free-form prompt as plain text
async fn text_prompt(
    State(state): State<AppState>,
    Form(form): Form<TextPromptForm>,
) -> Result<Response, ApiError> {
    let model = form.model.unwrap_or_default();
    log::debug!("Text prompt for model '{}': {}", model, form.prompt);

    let stream = state
        .gateway
        .generate_stream(GenerateRequest::new(model, form.prompt))
        .await?;

    let body = stream.filter_map(|chunk| {
        future::ready(match chunk {
            Ok(GenerateChunk {
                content: Some(text),
                ..
            }) => Some(Ok(text)),
            Ok(_) => None,
            Err(e) => {
                log::error!("Text prompt stream failed: {}", e);
                Some(Err(e))
            }
        })
    });

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(body),
    )
        .into_response())
}

/// Multipart form: `prompt`, `file` and an optional `model`. The image goes
/// to the model base64-encoded; the answer comes back whole.
async fn image_prompt(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut prompt = None;
    let mut model = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "prompt" => prompt = Some(field.text().await?),
            "model" => model = Some(field.text().await?),
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                log::debug!("Image '{}' ({} bytes)", file_name, bytes.len());
                image = Some(STANDARD.encode(&bytes));
            }
            other => log::debug!("Ignoring form field '{}'", other),
        }
    }

    let prompt = prompt
        .filter(|prompt| !prompt.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing form field 'prompt'".to_string()))?;
    let image = image
        .filter(|image| !image.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing form field 'file'".to_string()))?;
    let model = model
        .map(|model| model.trim().to_string())
        .filter(|model| !model.is_empty())
        .unwrap_or_else(|| state.gateway.default_model().to_string());

    log::info!("Image prompt for model '{}': {}", model, prompt);
    let request = GenerateRequest::new(model.clone(), prompt).with_image(image);
    let text = state
        .gateway
        .complete(request)
        .await
        .map_err(ApiError::Image)?;

    Ok(Json(json!({ "model": model, "response": text })))
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    /// Raw model text, or an already decoded action / action list
    pub command: Value,
}

async fn handle_command(
    State(state): State<AppState>,
    Json(request): Json<CommandRequest>,
) -> Result<Json<Value>, ApiError> {
    let response = match &request.command {
        Value::String(text) => state.processor.process(text)?,
        other => state.processor.process_value(other)?,
    };
    Ok(Json(response.to_json()))
}

#[derive(Debug, Deserialize)]
pub struct AssistantRequest {
    pub message: String,
    #[serde(default)]
    pub model: Option<String>,
}

async fn assistant(
    State(state): State<AppState>,
    Json(request): Json<AssistantRequest>,
) -> Result<Json<AssistantReply>, ApiError> {
    let reply = state
        .assistant
        .respond(&request.message, request.model.as_deref())
        .await?;
    Ok(Json(reply))
}

async fn command_socket(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_command_socket(socket, state.processor))
}

/// Every text frame is one command; the reply frame carries its result(s).
/// Malformed frames get an error frame and the socket stays open.
async fn run_command_socket(mut socket: WebSocket, processor: CommandProcessor) {
    log::info!("Command socket connected");

    while let Some(message) = socket.recv().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                log::debug!("Command socket error: {}", e);
                break;
            }
        };

        match message {
            Message::Text(text) => {
                let reply = command_reply(&processor, &text);
                if socket.send(Message::Text(reply.to_string())).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    log::info!("Command socket closed");
}

/// Result JSON for one command frame
fn command_reply(processor: &CommandProcessor, text: &str) -> Value {
    match processor.process(text) {
        Ok(response) => response.to_json(),
        Err(e) => ActionResult::from(e).to_json(),
    }
}
