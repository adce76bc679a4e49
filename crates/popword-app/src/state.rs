use std::path::Path;
use std::sync::Arc;

use popword_config::Config;
use popword_core::{Aggregator, FileConfigStore, Router};
use popword_dictionary::{Dictionary, FreeDictionary};
use popword_translator::GoogleTranslator;

pub struct AppState {
    pub config: Config,
    pub router: Router,
}

impl AppState {
    pub fn new(config: Config, prefs_path: &Path) -> anyhow::Result<Self> {
        let translator = Arc::new(GoogleTranslator::new(&config.translator)?);

        let dictionary: Option<Arc<dyn Dictionary>> = if config.dictionary.enabled {
            Some(Arc::new(FreeDictionary::new(
                &config.dictionary,
                config.translator.request_timeout_secs,
            )?))
        } else {
            tracing::warn!("Dictionary disabled, enriched mode gives context only");
            None
        };

        let aggregator = Aggregator::new(translator, dictionary, &config);
        let store = Arc::new(FileConfigStore::new(prefs_path));
        let router = Router::new(aggregator, store, config.router.clone());

        Ok(Self { config, router })
    }
}
