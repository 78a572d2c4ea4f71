use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{config::Settings, error, spotify, success, types::PkceToken};

pub async fn auth(settings: &Settings, shared_state: Arc<Mutex<Option<PkceToken>>>) {
    match spotify::auth::auth(settings, shared_state).await {
        Ok(()) => success!("Authentication successful. Token stored."),
        Err(e) => error!("{}", e),
    }
}
