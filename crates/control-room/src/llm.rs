//! Request contract for the hosted-model chat interactor. The server only
//! shapes and forwards these; the model client itself lives in external
//! tooling.

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub project_id: String,
    pub location: String,
    pub model_name: String,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            project_id: env::var("LLM_PROJECT_ID").unwrap_or_default(),
            location: env::var("LLM_LOCATION").unwrap_or_else(|_| "us-central1".to_string()),
            model_name: env::var("LLM_MODEL_NAME")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
        }
    }
}

/// Scene context attached to a chat request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmContext {
    #[serde(default)]
    pub camera_ids: Vec<String>,
    #[serde(default)]
    pub scene_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmChatRequest {
    #[serde(default)]
    pub request_id: String,
    pub prompt: String,
    pub context: Option<LlmContext>,
}
