//! Unified service container for Websift
//!
//! Provides shared access to all core services.

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::fetch::ContentFetcher;
use crate::core::search::SearchClient;
use std::sync::Arc;

/// Unified services container
///
/// The stdio server, the HTTP gateway and the CLI all use this same
/// struct for service access.
#[derive(Clone)]
pub struct Services {
    /// Web search client
    pub search: Arc<SearchClient>,

    /// Page fetcher and markdown converter
    pub fetcher: Arc<ContentFetcher>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl Services {
    /// Create services from configuration
    pub fn new(config: Config) -> Result<Self> {
        let search = Arc::new(SearchClient::new(&config.search)?);
        let fetcher = Arc::new(ContentFetcher::new(&config.fetch)?);

        Ok(Self {
            search,
            fetcher,
            config: Arc::new(config),
        })
    }
}
