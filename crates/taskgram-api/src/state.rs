//! Application state shared across handlers.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};

use taskgram_extractor::Extractor;
use taskgram_store::Store;

use crate::config::ApiConfig;

/// Application state shared across all handlers.
///
/// Both collaborators are injected behind traits so tests can run the full
/// HTTP surface against a fake store and a scripted extractor.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Persistent store.
    pub store: Arc<dyn Store>,
    /// Task extractor.
    pub extractor: Arc<dyn Extractor>,
}

impl AppState {
    /// Creates a new AppState.
    pub fn new(config: ApiConfig, store: Arc<dyn Store>, extractor: Arc<dyn Extractor>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            extractor,
        }
    }

    /// Current time in the configured timezone's offset, fed to the
    /// extractor to seed deadline inference.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.config.utc_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use taskgram_extractor::{ExtractResult, Result as ExtractResultT};
    use taskgram_store::MemoryStore;

    struct NeverATask;

    #[async_trait]
    impl Extractor for NeverATask {
        async fn extract(
            &self,
            _text: &str,
            _now: DateTime<FixedOffset>,
            _timezone: &str,
        ) -> ExtractResultT<ExtractResult> {
            Ok(ExtractResult::NotATask)
        }
    }

    #[test]
    fn test_now_uses_configured_offset() {
        let config = ApiConfig::default().with_timezone("Asia/Almaty", "+06:00");
        let state = AppState::new(config, Arc::new(MemoryStore::new()), Arc::new(NeverATask));

        assert_eq!(state.now().offset().local_minus_utc(), 6 * 3600);
    }
}
