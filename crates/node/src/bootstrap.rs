//! Ordered, fail-fast startup sequence.
//!
//! Steps run strictly in numeric order; a hard-gate failure logs an error
//! and aborts the sequence, so the process exits before serving anything.
//! Step 8 is the only soft gate: it surfaces advisory warnings and never
//! fails.

mod step_01_environment;
mod step_02_directories;
mod step_03_config;
mod step_04_database;
mod step_05_migrations;
mod step_06_ssl;
mod step_07_logging;
mod step_08_validation;

pub use step_01_environment::REQUIRED_VARS;

use crate::error::Result;

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use vigil_config::ServiceConfig;
use vigil_environment::HomeLayout;

pub struct Bootstrap {
    layout: HomeLayout,
    config_path: PathBuf,
    shutdown_token: CancellationToken,

    // set by step 3
    config: Option<ServiceConfig>,
}

/// Everything the post-startup modes need, produced by a completed
/// sequence.
pub struct ReadyNode {
    pub layout: HomeLayout,
    pub config_path: PathBuf,
    pub config: ServiceConfig,
    pub shutdown_token: CancellationToken,
}

impl Bootstrap {
    pub fn new(home: &Path, config_path: &Path) -> Self {
        Self {
            layout: HomeLayout::new(home),
            config_path: config_path.to_path_buf(),
            shutdown_token: CancellationToken::new(),
            config: None,
        }
    }

    pub const fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    pub async fn run(mut self) -> Result<ReadyNode> {
        if let Err(e) = step_01_environment::execute(&mut self).await {
            error!("environment check failed: {e}");
            return Err(e);
        }

        if let Err(e) = step_02_directories::execute(&mut self).await {
            error!("directory preparation failed: {e}");
            return Err(e);
        }

        if let Err(e) = step_03_config::execute(&mut self).await {
            error!("configuration loading failed: {e}");
            return Err(e);
        }

        if let Err(e) = step_04_database::execute(&mut self).await {
            error!("database dependency wait failed: {e}");
            return Err(e);
        }

        if let Err(e) = step_05_migrations::execute(&mut self).await {
            error!("migrations failed: {e}");
            return Err(e);
        }

        if let Err(e) = step_06_ssl::execute(&mut self).await {
            error!("ssl verification failed: {e}");
            return Err(e);
        }

        if let Err(e) = step_07_logging::execute(&mut self).await {
            error!("logging preparation failed: {e}");
            return Err(e);
        }

        // Soft gate: step 8 reports but never fails.
        step_08_validation::execute(&mut self).await;

        info!("startup sequence complete");

        let config = self.config.unwrap_or_else(|| {
            panic!("config not loaded before end of sequence");
        });

        Ok(ReadyNode {
            layout: self.layout,
            config_path: self.config_path,
            config,
            shutdown_token: self.shutdown_token,
        })
    }

    fn config(&self) -> &ServiceConfig {
        self.config.as_ref().unwrap_or_else(|| {
            panic!("config not set before a step that requires it");
        })
    }
}
