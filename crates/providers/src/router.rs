//! LLM routing: active provider/model selection, response caching, and
//! in-flight de-duplication.
//!
//! The router owns a registry of provider adapters and dispatches every
//! completion to whichever one is active. Identical non-streaming requests
//! are answered from a bounded FIFO cache; identical requests that race
//! while the first is still on the wire share a single upstream call.
//! Streaming requests bypass both.

use crate::anthropic::AnthropicProvider;
use crate::cache::ResponseCache;
use crate::openai::OpenAiCompatProvider;
use futures::future::{BoxFuture, FutureExt, Shared};
use sha2::{Digest, Sha256};
use sidecar_config::AppConfig;
use sidecar_core::completion::{CompletionOptions, CompletionResponse};
use sidecar_core::conversation::ConversationContext;
use sidecar_core::error::ProviderError;
use sidecar_core::provider::{Provider, ProviderRequest};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

const DEFAULT_TEMPERATURE: f32 = 0.3;

/// The model used when the caller selects a provider without naming one.
pub fn default_model_for(provider: &str) -> &'static str {
    match provider {
        "anthropic" => "claude-3-5-sonnet-20241022",
        _ => "gpt-4o",
    }
}

type SharedCompletion =
    Shared<BoxFuture<'static, std::result::Result<CompletionResponse, ProviderError>>>;

struct Active {
    provider: String,
    model: String,
}

/// Routes completions to the active provider.
pub struct LlmRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    active: RwLock<Active>,
    default_temperature: f32,
    default_max_tokens: Option<u32>,
    cache: Arc<Mutex<ResponseCache>>,
    in_flight: Arc<Mutex<HashMap<String, SharedCompletion>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LlmRouter {
    pub fn new(default_provider: impl Into<String>, cache_capacity: usize) -> Self {
        let provider = default_provider.into();
        let model = default_model_for(&provider).to_string();
        Self {
            providers: HashMap::new(),
            active: RwLock::new(Active { provider, model }),
            default_temperature: DEFAULT_TEMPERATURE,
            default_max_tokens: None,
            cache: Arc::new(Mutex::new(ResponseCache::new(cache_capacity))),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Build a router with adapters for every provider the config names.
    /// The default provider gets an adapter even without a config entry so
    /// env-supplied keys work with an empty file.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut router = Self::new(&config.default_provider, config.cache_capacity);
        router.default_temperature = config.default_temperature;
        router.default_max_tokens = Some(config.default_max_tokens);

        let mut names: Vec<&str> = config.providers.keys().map(String::as_str).collect();
        if !names.contains(&config.default_provider.as_str()) {
            names.push(&config.default_provider);
        }

        for name in names {
            let entry = config.providers.get(name);
            let api_key = entry
                .and_then(|p| p.api_key.clone())
                .or_else(|| config.api_key.clone())
                .unwrap_or_default();
            let api_url = entry.and_then(|p| p.api_url.clone());

            let provider: Arc<dyn Provider> = if name == "anthropic" {
                let mut p = AnthropicProvider::new(api_key);
                if let Some(url) = api_url {
                    p = p.with_base_url(url);
                }
                Arc::new(p)
            } else {
                let mut p = OpenAiCompatProvider::new(name, api_key);
                if let Some(url) = api_url {
                    p = p.with_base_url(url);
                }
                Arc::new(p)
            };
            router.register(name, provider);
        }

        if let Some(model) = config
            .providers
            .get(&config.default_provider)
            .and_then(|p| p.default_model.clone())
        {
            router.set_model(model);
        }

        router
    }

    /// Register a provider adapter under a name.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Switch the active provider. Resets the active model to that
    /// provider's default; call `set_model` afterwards to override.
    pub fn set_provider(
        &self,
        name: impl Into<String>,
    ) -> std::result::Result<(), ProviderError> {
        let name = name.into();
        if !self.providers.contains_key(&name) {
            return Err(ProviderError::NotConfigured(name));
        }
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        active.model = default_model_for(&name).to_string();
        info!(provider = %name, model = %active.model, "switched active provider");
        active.provider = name;
        Ok(())
    }

    /// Override the active model.
    pub fn set_model(&self, model: impl Into<String>) {
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        active.model = model.into();
    }

    pub fn active_provider(&self) -> String {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .provider
            .clone()
    }

    pub fn active_model(&self) -> String {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .model
            .clone()
    }

    /// Derive the cache key from messages and options. The system prompt is
    /// not hashed: in practice it is a pure function of the playbook, which
    /// the options' model/temperature already distinguish, so contexts that
    /// differ only in system prompt share an entry.
    fn cache_key(context: &ConversationContext, options: &CompletionOptions) -> String {
        let bytes = serde_json::to_vec(&(&context.messages, options)).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        format!("{:x}", hasher.finalize())
    }

    /// Resolve the active provider and fill per-request defaults.
    fn resolve(
        &self,
        context: &ConversationContext,
        options: &CompletionOptions,
    ) -> std::result::Result<(Arc<dyn Provider>, ProviderRequest), ProviderError> {
        let active = self.active.read().unwrap_or_else(PoisonError::into_inner);
        let provider = self
            .providers
            .get(&active.provider)
            .cloned()
            .ok_or_else(|| ProviderError::NotConfigured(active.provider.clone()))?;

        let request = ProviderRequest {
            model: options.model.clone().unwrap_or_else(|| active.model.clone()),
            context: context.clone(),
            temperature: options.temperature.unwrap_or(self.default_temperature),
            max_tokens: options.max_tokens.or(self.default_max_tokens),
            stop: options.stop_sequences.clone(),
        };
        Ok((provider, request))
    }

    /// Non-streaming completion: cache first, then the in-flight table, then
    /// the wire. Failures are handed to every waiter but never cached.
    pub async fn complete(
        &self,
        context: &ConversationContext,
        options: &CompletionOptions,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        let key = Self::cache_key(context, options);

        if let Some(hit) = lock(&self.cache).get(&key) {
            debug!(key = %&key[..12], "response cache hit");
            return Ok(hit);
        }

        let shared = {
            let mut in_flight = lock(&self.in_flight);
            if let Some(existing) = in_flight.get(&key) {
                debug!(key = %&key[..12], "joining in-flight request");
                existing.clone()
            } else {
                let (provider, request) = self.resolve(context, options)?;
                let cache = Arc::clone(&self.cache);
                let table = Arc::clone(&self.in_flight);
                let owned_key = key.clone();

                let fut = async move {
                    let result = provider.complete(request).await;
                    lock(&table).remove(&owned_key);
                    if let Ok(response) = &result {
                        lock(&cache).insert(owned_key, response.clone());
                    }
                    result
                }
                .boxed()
                .shared();

                in_flight.insert(key, fut.clone());
                fut
            }
        };

        shared.await
    }

    /// Streaming completion. Never consults or populates the cache.
    pub async fn stream(
        &self,
        context: &ConversationContext,
        options: &CompletionOptions,
    ) -> std::result::Result<
        ReceiverStream<std::result::Result<String, ProviderError>>,
        ProviderError,
    > {
        let (provider, request) = self.resolve(context, options)?;
        debug!(provider = %provider.name(), model = %request.model, "opening stream");
        let rx = provider.stream(request).await?;
        Ok(ReceiverStream::new(rx))
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        lock(&self.cache).clear();
    }
}
