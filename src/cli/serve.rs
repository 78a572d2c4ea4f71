use crate::{config::Settings, error, info, server};

pub async fn serve(settings: Settings) {
    info!("Serving on http://{}", settings.server_addr);
    if let Err(e) = server::start_server(settings).await {
        error!("Server stopped: {}", e);
    }
}
