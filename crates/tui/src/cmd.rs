//! Effect execution: background fetches and browser handoff.

use std::path::PathBuf;
use std::sync::Arc;

use haixin_api::HaixinClient;
use haixin_types::{Effect, Msg};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::app::App;

/// Spawns the background task for a fetch effect. Navigation effects are
/// handled synchronously by the runtime and never reach this function; they
/// return `None`.
pub fn spawn_effect(
    client: &Arc<HaixinClient>,
    effect: Effect,
    history_page: (usize, usize),
) -> Option<JoinHandle<Msg>> {
    let client = Arc::clone(client);
    match effect {
        Effect::FetchModels => Some(tokio::spawn(async move {
            Msg::ModelsLoaded(client.list_models().await.map_err(|e| e.to_string()))
        })),
        Effect::FetchHistory => {
            let (limit, offset) = history_page;
            Some(tokio::spawn(async move {
                Msg::HistoryLoaded(client.history(limit, offset).await.map_err(|e| e.to_string()))
            }))
        }
        Effect::FetchHistoryDetail(id) => Some(tokio::spawn(async move {
            Msg::HistoryDetailLoaded(client.history_detail(id).await.map_err(|e| e.to_string()))
        })),
        Effect::RunCompare {
            image_path,
            prompt,
            model_ids,
        } => Some(tokio::spawn(async move {
            let path = PathBuf::from(image_path);
            Msg::CompareCompleted(
                client
                    .compare(&path, &prompt, &model_ids)
                    .await
                    .map_err(|e| e.to_string()),
            )
        })),
        Effect::CreateModel(new_model) => Some(tokio::spawn(async move {
            Msg::ModelMutated(
                client
                    .create_model(&new_model)
                    .await
                    .map(|id| format!("Model #{id} added"))
                    .map_err(|e| e.to_string()),
            )
        })),
        Effect::ToggleModel(id) => Some(tokio::spawn(async move {
            Msg::ModelMutated(
                client
                    .toggle_model(id)
                    .await
                    .map(|()| format!("Model #{id} toggled"))
                    .map_err(|e| e.to_string()),
            )
        })),
        Effect::DeleteModel(id) => Some(tokio::spawn(async move {
            Msg::ModelMutated(
                client
                    .delete_model(id)
                    .await
                    .map(|()| format!("Model #{id} deleted"))
                    .map_err(|e| e.to_string()),
            )
        })),
        Effect::SwitchTo(_)
        | Effect::NavigateSameTool(_)
        | Effect::OpenExternal(_)
        | Effect::Quit => None,
    }
}

/// Opens a link in the system browser. Relative hrefs are resolved against
/// the web base; the running client is left untouched.
pub fn open_external(app: &mut App, href: &str) {
    let url = if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!(
            "{}{}",
            app.ctx.client.web_base().trim_end_matches('/'),
            href
        )
    };
    match webbrowser::open(&url) {
        Ok(()) => app.status_info(format!("Opened {url}")),
        Err(error) => {
            warn!(%error, %url, "browser open failed");
            app.status_error(format!("Could not open {url}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haixin_types::Route;

    #[test]
    fn navigation_effects_spawn_nothing() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let _guard = rt.enter();
        let client = Arc::new(
            HaixinClient::with_base_url("http://localhost:8000").expect("client"),
        );
        for effect in [
            Effect::Quit,
            Effect::SwitchTo(Route::Models),
            Effect::NavigateSameTool("/x".into()),
            Effect::OpenExternal("/y".into()),
        ] {
            assert!(spawn_effect(&client, effect, (20, 0)).is_none());
        }
    }
}
