use std::sync::Arc;

use async_openai::{
    config::OpenAIConfig,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;

use crate::{configuration::CompletionSettings, error::AdvisorError};

use super::QuotaTracker;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AdvisorError>;
}

pub struct GeminiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, settings: &CompletionSettings) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(settings.api_base.clone());
        GeminiClient {
            client: Client::with_config(config),
            model: settings.model.clone(),
        }
    }
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, AdvisorError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into()])
            .temperature(0.3_f32)
            .top_p(0.95_f32)
            .max_tokens(4096_u32)
            .build()?;

        let response = self.client.chat().create(request).await?;
        log::info!(
            "Completion finished with {} choice(s), usage: {:?}",
            response.choices.len(),
            response.usage
        );

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AdvisorError::MalformedModelResponse("No content in model response".into()))
    }
}

pub struct QuotaGuardedCompletion {
    inner: Arc<dyn CompletionProvider>,
    quota: Arc<dyn QuotaTracker>,
}

impl QuotaGuardedCompletion {
    pub fn new(inner: Arc<dyn CompletionProvider>, quota: Arc<dyn QuotaTracker>) -> Self {
        QuotaGuardedCompletion { inner, quota }
    }
}

#[async_trait]
impl CompletionProvider for QuotaGuardedCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, AdvisorError> {
        if !self.quota.try_consume() {
            return Err(AdvisorError::QuotaExceeded {
                limit: self.quota.daily_limit(),
            });
        }
        self.inner.complete(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use async_trait::async_trait;

    use super::*;
    use crate::services::InMemoryQuotaTracker;

    #[derive(Default)]
    struct EchoCompletion {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionProvider for EchoCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, AdvisorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(prompt.to_uppercase())
        }
    }

    #[tokio::test]
    async fn quota_exhaustion_is_a_distinct_error() {
        let inner = Arc::new(EchoCompletion::default());
        let guarded =
            QuotaGuardedCompletion::new(inner.clone(), Arc::new(InMemoryQuotaTracker::new(1)));

        assert_eq!(guarded.complete("hi").await.unwrap(), "HI");

        let err = guarded.complete("again").await.unwrap_err();
        assert!(matches!(err, AdvisorError::QuotaExceeded { limit: 1 }));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }
}
