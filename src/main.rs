use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use hrm_leave::adjudication::Adjudicator;
use hrm_leave::config::Config;
use hrm_leave::db::init_db;
use hrm_leave::docs::ApiDoc;
use hrm_leave::notify::Dispatcher;
use hrm_leave::notify::transport::{
    EmailSender, HttpEmailSender, HttpMessageSender, LogOnlyTransport, MessageSender,
};
use hrm_leave::routes;
use hrm_leave::store::{CachedCalendar, MySqlStore};

fn email_sender(config: &Config, client: &reqwest::Client) -> Arc<dyn EmailSender> {
    match &config.email_api_url {
        Some(url) => Arc::new(HttpEmailSender::new(
            client.clone(),
            url.clone(),
            config.email_api_key.clone(),
            config.email_from.clone(),
        )),
        None => {
            warn!("EMAIL_API_URL not set, leave emails will only be logged");
            Arc::new(LogOnlyTransport)
        }
    }
}

fn message_sender(config: &Config, client: &reqwest::Client) -> Arc<dyn MessageSender> {
    match &config.message_api_url {
        Some(url) => Arc::new(HttpMessageSender::new(
            client.clone(),
            url.clone(),
            config.message_api_key.clone(),
        )),
        None => {
            warn!("MESSAGE_API_URL not set, leave messages will only be logged");
            Arc::new(LogOnlyTransport)
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await?;
    let store = Arc::new(MySqlStore::new(pool.clone()));
    let calendar = Arc::new(CachedCalendar::new(
        MySqlStore::new(pool),
        config.holiday_cache_ttl,
    ));

    let client = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;
    let (queue, dispatcher) = Dispatcher::new(
        store.clone(),
        email_sender(&config, &client),
        message_sender(&config, &client),
        config.dashboard_url.clone(),
    )
    .context("Failed to load notification templates")?
    .spawn(config.notify_queue_capacity);

    let adjudicator = Data::new(Adjudicator::new(
        store,
        calendar,
        config.week_offs.clone(),
        queue,
    ));

    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(adjudicator.clone())
            .app_data(Data::new(config.clone()))
            .configure(|cfg| routes::configure(cfg, config.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    info!("Server stopped, draining notifications");
    dispatcher.drain().await;

    Ok(())
}
