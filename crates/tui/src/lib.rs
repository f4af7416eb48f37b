//! Terminal user interface for the Haixin AI toolkit.
//!
//! The UI is a set of components over a central [`app::App`] model: state
//! changes flow through messages, side effects come back as effects the
//! runtime either applies synchronously (navigation) or spawns as background
//! tasks (fetches).

pub mod app;
pub mod cmd;
pub mod ui;

use std::sync::Arc;

use anyhow::Result;
use haixin_api::HaixinClient;
use haixin_types::API_PREFIX;

use crate::app::App;

/// Startup options resolved by the CLI.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Explicit API base URL; the environment decides when unset.
    pub api_base: Option<String>,
    /// Offer model mutation operations.
    pub manager: bool,
    /// Location path to start on; defaults to the compare page.
    pub initial_path: Option<String>,
}

/// Builds the client and runs the UI until the user quits.
pub async fn run(options: RunOptions) -> Result<()> {
    let client = match &options.api_base {
        Some(base) => HaixinClient::with_base_url(base.clone())?,
        None => HaixinClient::new_from_env()?,
    };
    let initial_path = options
        .initial_path
        .unwrap_or_else(|| format!("{API_PREFIX}/ui"));
    let mut app = App::new(Arc::new(client), options.manager, initial_path);
    ui::runtime::run(&mut app).await
}
