use std::sync::Arc;

use crate::cli::Cli;
use crate::config::Config;
use crate::error::Result;
use crate::service::DictionaryService;

pub struct AppContext {
    pub config: Config,
    pub service: Arc<DictionaryService>,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = Config::load(cli.config.as_deref())?;
        if let Some(db) = &cli.db {
            config.database.path.clone_from(db);
        }
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let service = DictionaryService::from_config(&config)?;
        Ok(Self {
            config,
            service: Arc::new(service),
        })
    }
}
