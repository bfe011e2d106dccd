use anyhow::{Context, Result};
use std::time::Duration;

use crushquest_core::{
    CampusData, CrushQuest, DelayedRepository, EngineConfig, MemorySessionStore, StaticRepository,
};

pub type TesterApp = CrushQuest<StaticRepository, MemorySessionStore>;

/// Campus data snapshot shared by every scenario run.
#[derive(Debug, Clone)]
pub struct TesterAssets {
    data: CampusData,
    config: EngineConfig,
}

impl TesterAssets {
    /// Fetch every collection through the latency adapter, the same path the
    /// app takes on first load.
    ///
    /// # Errors
    ///
    /// Returns an error if any collection fails to load.
    pub async fn load(config: EngineConfig) -> Result<Self> {
        let repo = DelayedRepository::from_config(StaticRepository::bundled(), &config);
        let data = repo
            .fetch_all()
            .await
            .context("failed to load campus data")?;
        log::debug!(
            "loaded {} games, {} matches, {} posts in {:?}",
            data.games.len(),
            data.matches.len(),
            data.confessions.len(),
            repo.latency()
        );
        Ok(Self { data, config })
    }

    /// Bundled data without any simulated delay.
    #[cfg(test)]
    pub fn load_default() -> Self {
        Self::from_data(CampusData::default_data().clone())
    }

    #[cfg(test)]
    pub fn from_data(data: CampusData) -> Self {
        Self {
            data,
            config: EngineConfig::default().with_fetch_latency_ms(0),
        }
    }

    pub const fn data(&self) -> &CampusData {
        &self.data
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub const fn latency(&self) -> Duration {
        self.config.fetch_latency()
    }

    /// Fresh app over this snapshot with its own empty session store.
    pub fn app(&self) -> TesterApp {
        CrushQuest::with_config(
            StaticRepository::new(self.data.clone()),
            MemorySessionStore::new(),
            self.config.clone(),
        )
    }
}
