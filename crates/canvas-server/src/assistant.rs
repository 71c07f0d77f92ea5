//! Two-step assistant: classify the message, then either act on the canvas
//! or chat.

use canvas_commands::{CommandError, CommandProcessor, CommandResponse};
use inference::{GatewayError, GenerateRequest, SharedGateway};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::prompts;

/// Which agent handles a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    ActionAgent,
    #[serde(alias = "manager")]
    Conversational,
}

impl Route {
    /// Decode the router's `{"route": ...}` answer.
    ///
    /// Anything that is not a known route falls back to conversation.
    pub fn from_reply(text: &str) -> Self {
        #[derive(Deserialize)]
        struct RouterReply {
            route: Route,
        }

        match serde_json::from_str::<RouterReply>(text.trim()) {
            Ok(reply) => reply.route,
            Err(e) => {
                log::warn!("Unusable route '{}' ({}); answering conversationally", text, e);
                Route::Conversational
            }
        }
    }
}

/// What the assistant did with a message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantReply {
    pub route: Route,
    /// Chat text, or an explanation when no actions could be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    /// Results of executed canvas actions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<CommandResponse>,
}

impl AssistantReply {
    fn text(route: Route, reply: impl Into<String>) -> Self {
        Self {
            route,
            reply: Some(reply.into()),
            results: None,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            log::error!("Failed to serialize assistant reply: {}", e);
            Value::Null
        })
    }
}

#[derive(Clone)]
pub struct Assistant {
    gateway: SharedGateway,
    processor: CommandProcessor,
}

impl Assistant {
    pub fn new(gateway: SharedGateway, processor: CommandProcessor) -> Self {
        Self { gateway, processor }
    }

    /// Handle one user message. `model` overrides the configured default.
    pub async fn respond(
        &self,
        message: &str,
        model: Option<&str>,
    ) -> Result<AssistantReply, GatewayError> {
        let route = self.classify(message, model).await?;
        log::debug!("Routing message to {:?}", route);

        match route {
            Route::ActionAgent => self.act(message, model).await,
            Route::Conversational => self.converse(message, model).await,
        }
    }

    async fn classify(&self, message: &str, model: Option<&str>) -> Result<Route, GatewayError> {
        let mut request = GenerateRequest::new(model.unwrap_or_default(), message)
            .with_system(prompts::ROUTER)
            .with_temperature(0.0);
        // Without JSON mode the router prompt alone asks for the object
        if self.gateway.capabilities().json_mode {
            request = request.json_mode();
        }
        let text = self.gateway.complete(request).await?;
        Ok(Route::from_reply(&text))
    }

    async fn act(&self, message: &str, model: Option<&str>) -> Result<AssistantReply, GatewayError> {
        let request = GenerateRequest::new(model.unwrap_or_default(), message)
            .with_system(prompts::ACTION_AGENT)
            .with_temperature(0.0);
        let text = self.gateway.complete(request).await?;

        Ok(match self.processor.process(&text) {
            Ok(results) => AssistantReply {
                route: Route::ActionAgent,
                reply: None,
                results: Some(results),
            },
            Err(CommandError::MalformedResponse { raw }) => {
                log::warn!("Action agent produced no JSON: {}", raw);
                AssistantReply::text(
                    Route::ActionAgent,
                    "Sorry, I could not turn that into canvas actions. Try describing the shapes more precisely.",
                )
            }
            Err(e) => AssistantReply::text(Route::ActionAgent, e.to_string()),
        })
    }

    async fn converse(
        &self,
        message: &str,
        model: Option<&str>,
    ) -> Result<AssistantReply, GatewayError> {
        let request = GenerateRequest::new(model.unwrap_or_default(), message)
            .with_system(prompts::CONVERSATIONAL);
        let text = self.gateway.complete(request).await?;
        Ok(AssistantReply::text(Route::Conversational, text))
    }
}
