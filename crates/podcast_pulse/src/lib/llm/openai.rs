use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::{error::Error, types::SourcePost, ScriptWriter};

pub struct OpenAIClient {
    client: Client,
    api_key: Option<SecretString>,
    model: String,
    base_url: String,
}

impl OpenAIClient {
    const SYSTEM_PROMPT: &str = include_str!("./prompts/system.txt");
    const MONOLOGUE_TEMPLATE: &str = include_str!("./prompts/monologue.txt");
    const DEFAULT_MODEL: &str = "gpt-4o";

    pub fn new(api_key: Option<SecretString>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: Self::DEFAULT_MODEL.into(),
            base_url: "https://api.openai.com/v1".into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub(crate) fn monologue_prompt(post_text: &str) -> String {
        Self::MONOLOGUE_TEMPLATE.replace("{post}", post_text.trim())
    }

    pub async fn send_completion_request(
        &self,
        user_content: impl Into<String>,
    ) -> Result<CompletionResponse, Error> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(Error::MissingConfig("OPENAI_API_KEY"))?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": Self::SYSTEM_PROMPT
                },
                {
                    "role": "user",
                    "content": user_content.into()
                }
            ]
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            return Err(Error::from_response(resp).await);
        }

        Ok(resp.json::<CompletionResponse>().await?)
    }
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub index: u32,
    pub message: CompletionMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: Option<String>,
}

impl CompletionResponse {
    pub fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
    }
}

impl ScriptWriter for OpenAIClient {
    const WRITER_MODEL: &'static str = Self::DEFAULT_MODEL;
    type Error = Error;

    #[tracing::instrument(skip_all, fields(post_id = %post.id, model = %self.model))]
    async fn write_script(&self, post: &SourcePost) -> Result<String, Self::Error> {
        let response = self
            .send_completion_request(Self::monologue_prompt(&post.text))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to generate script"))?;

        response
            .into_content()
            .ok_or_else(|| Error::UnexpectedResponse("No content in completion response".into()))
    }
}
