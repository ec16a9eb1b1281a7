use std::{net::SocketAddr, sync::Arc};

use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::info;

use crate::{config::AppConfig, store::SubscriptionStore, templ_manager::TemplateManager, Result};

// ###################################
// ->  Structs
// ###################################
pub struct App<S> {
    pub app_state: AppState<S>,
    pub listener: TcpListener,
}

impl<S: SubscriptionStore> App<S> {
    pub fn new(app_state: AppState<S>, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    /// Builds the `AppState` around the provided store and binds the listener to the configured address.
    pub async fn build_from_config(config: &AppConfig, store: S) -> Result<Self> {
        let templ_mgr = TemplateManager::init();
        let app_state = AppState::new(store, templ_mgr);

        let addr = SocketAddr::from((config.net_config.host, config.net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        Ok(App::new(app_state, listener))
    }
}

pub struct InternalState<S> {
    pub store: S,
    pub templ_mgr: TemplateManager,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Deref)]
pub struct AppState<S>(Arc<InternalState<S>>);

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        AppState(Arc::clone(&self.0))
    }
}

impl<S: SubscriptionStore> AppState<S> {
    pub fn new(store: S, templ_mgr: TemplateManager) -> Self {
        AppState(Arc::new(InternalState { store, templ_mgr }))
    }
}
