use std::{net::SocketAddr, sync::Arc};

use stockwatch::{
    config, routes,
    services::{
        monitor::MonitorState,
        notifier::{EmailJsNotifier, LogNotifier, Notifier},
        poll_loop::PollLoop,
        quotes::YahooQuoteClient,
        storage::FileStore,
    },
    templates, AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = config::load();

    let backend = Arc::new(FileStore::open(&settings.storage_dir)?);
    let (events_tx, _events_rx) = tokio::sync::broadcast::channel::<String>(64);
    let monitor = Arc::new(MonitorState::load(backend, events_tx));

    let quotes = Arc::new(YahooQuoteClient::new(settings.quote_base_url.clone()));
    let emailjs = EmailJsNotifier::new(
        settings.emailjs_base_url.clone(),
        settings.emailjs_service_id.clone(),
        settings.emailjs_template_id.clone(),
        settings.emailjs_user_id.clone(),
    );
    let notifier: Arc<dyn Notifier> = if emailjs.is_configured() {
        Arc::new(emailjs)
    } else {
        tracing::warn!("EmailJS ids not set, alert emails will only be logged");
        Arc::new(LogNotifier)
    };

    let poll = PollLoop::new(monitor.clone(), quotes, notifier);
    poll.start();

    let state = AppState {
        hbs: templates::build_handlebars(),
        settings: settings.clone(),
        monitor,
    };

    let app = routes::app(state);

    let addr = SocketAddr::from((settings.host.parse::<std::net::IpAddr>()?, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    poll.stop();
    Ok(())
}
