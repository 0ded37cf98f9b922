pub mod draft;
pub mod location;
pub mod login;
pub mod meeting;
pub mod submit;
pub mod times;

use anyhow::{Context as _, Result};
use gomeet_core::client::{Client, HttpTransport};
use gomeet_core::config::GoMeetConfig;
use gomeet_core::draft::DraftStore;
use tracing::debug;

/// What every command needs: the loaded config and ways to reach the draft
/// and the backend.
pub struct Context {
    pub config: GoMeetConfig,
}

impl Context {
    pub fn new(config: GoMeetConfig) -> Self {
        Context { config }
    }

    pub fn client(&self) -> Result<Client<HttpTransport>> {
        debug!(backend = %self.config.backend_url, "using backend");
        Ok(Client::connect(
            &self.config.backend_url,
            self.config.session_cookie.clone(),
        )?)
    }

    pub fn open_draft(&self) -> Result<DraftStore> {
        let dir = self.config.session_path();
        debug!(dir = %dir.display(), "opening draft");
        DraftStore::open(&dir)
            .with_context(|| format!("Could not read the draft in {}", dir.display()))
    }
}
