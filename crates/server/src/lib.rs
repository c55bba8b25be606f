//! HTTP and WebSocket endpoints for the hold'em service.
//!
//! A thin actix-web shell over [`rvb_hosting::Lobby`]: room creation and
//! discovery over HTTP, gameplay over the WebSocket upgrade. Nothing here
//! touches game state directly; every mutation goes through a room actor.

pub mod handlers;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use rvb_core::Chips;
use rvb_hosting::Lobby;
use std::sync::Arc;

/// Environment inputs. None of these affect gameplay.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address, e.g. `0.0.0.0:8080`.
    pub bind: String,
    /// Allowed CORS origins; empty or `*` means any.
    pub origins: Vec<String>,
    /// The privileged-mode shared secret. Unset disables god mode.
    pub secret: Option<String>,
    /// Default blind schedule for new rooms.
    pub small: Chips,
    pub big: Chips,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".into(),
            origins: Vec::new(),
            secret: None,
            small: rvb_core::DEFAULT_SMALL_BLIND,
            big: rvb_core::DEFAULT_BIG_BLIND,
        }
    }
}

async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let lobby = web::Data::new(Arc::new(Lobby::new(config.secret.as_deref())));
    let defaults = web::Data::new(config.clone());
    let origins = config.origins.clone();
    log::info!("serving on {}", config.bind);
    HttpServer::new(move || {
        let cors = if origins.is_empty() || origins.iter().any(|o| o == "*") {
            Cors::permissive()
        } else {
            origins
                .iter()
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
                .allow_any_method()
                .allow_any_header()
        };
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(cors)
            .app_data(lobby.clone())
            .app_data(defaults.clone())
            .route("/health", web::get().to(health))
            .service(
                web::scope("/rooms")
                    .route("", web::post().to(handlers::create))
                    .route("", web::get().to(handlers::list))
                    .route("/{code}/history", web::get().to(handlers::history))
                    .route("/{code}/ws", web::get().to(handlers::enter)),
            )
    })
    .bind(config.bind)?
    .run()
    .await
}
