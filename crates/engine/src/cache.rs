use anyhow::Result;
use parking_lot::Mutex;
use sfcore_ai_conversation::TextGenerator;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::llama_server::{EngineOptions, LlamaServerEngine};

/// Builds an engine for a model name
pub type EngineFactory = Arc<dyn Fn(&str) -> Result<Arc<dyn TextGenerator>> + Send + Sync>;

/// Model name -> engine, owned by the host.
///
/// Created once at startup and emptied only through [`clear`](Self::clear).
#[derive(Clone)]
pub struct EngineCache {
    engines: Arc<Mutex<HashMap<String, Arc<dyn TextGenerator>>>>,
    factory: EngineFactory,
}

impl EngineCache {
    pub fn new(factory: EngineFactory) -> Self {
        Self {
            engines: Arc::new(Mutex::new(HashMap::new())),
            factory,
        }
    }

    /// Cache of llama-server engines sharing `base` options. The model name
    /// `"default"` (or an empty name) keeps whatever model `base` names.
    pub fn llama_server(base: EngineOptions) -> Self {
        Self::new(Arc::new(move |model: &str| -> Result<Arc<dyn TextGenerator>> {
            let mut opts = base.clone();
            if !model.is_empty() && model != "default" {
                opts.model = Some(model.to_string());
            }
            let engine: Arc<dyn TextGenerator> = Arc::new(LlamaServerEngine::new(opts)?);
            Ok(engine)
        }))
    }

    pub fn get_or_create(&self, model: &str) -> Result<Arc<dyn TextGenerator>> {
        let mut engines = self.engines.lock();
        if let Some(engine) = engines.get(model) {
            debug!("Engine cache hit: {}", model);
            return Ok(engine.clone());
        }

        info!("Creating engine for model {}", model);
        let engine = (self.factory)(model)?;
        engines.insert(model.to_string(), engine.clone());
        Ok(engine)
    }

    /// Drop every cached engine. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut engines = self.engines.lock();
        let count = engines.len();
        engines.clear();
        info!("Engine cache cleared ({} engines)", count);
        count
    }

    pub fn len(&self) -> usize {
        self.engines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sfcore_ai_conversation::GenerationRequest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed(&'static str);

    #[async_trait]
    impl TextGenerator for Fixed {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn counting_cache() -> (EngineCache, Arc<AtomicUsize>) {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = created.clone();
        let cache = EngineCache::new(Arc::new(move |_model: &str| -> Result<Arc<dyn TextGenerator>> {
            counter.fetch_add(1, Ordering::SeqCst);
            let engine: Arc<dyn TextGenerator> = Arc::new(Fixed("ok"));
            Ok(engine)
        }));
        (cache, created)
    }

    #[test]
    fn test_engines_are_reused_per_model() {
        let (cache, created) = counting_cache();
        cache.get_or_create("tiny").unwrap();
        cache.get_or_create("tiny").unwrap();
        cache.get_or_create("distilgpt2").unwrap();

        assert_eq!(created.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_clear() {
        let (cache, created) = counting_cache();
        cache.get_or_create("tiny").unwrap();
        assert_eq!(cache.clear(), 1);
        assert!(cache.is_empty());

        cache.get_or_create("tiny").unwrap();
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_factory_error_is_not_cached() {
        let cache = EngineCache::new(Arc::new(|model: &str| -> Result<Arc<dyn TextGenerator>> {
            anyhow::bail!("unknown model {}", model)
        }));
        assert!(cache.get_or_create("nope").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_llama_server_cache_builds_engines() {
        let cache = EngineCache::llama_server(EngineOptions::default());
        assert!(cache.get_or_create("default").is_ok());
        assert_eq!(cache.len(), 1);
    }
}
