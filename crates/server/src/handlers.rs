use super::ServerConfig;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use rvb_core::Chips;
use rvb_core::SessionId;
use rvb_hosting::Lobby;
use serde::Deserialize;
use std::sync::Arc;

/// `POST /rooms` body. The creator's session becomes the room host.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoom {
    pub name: String,
    pub session_id: uuid::Uuid,
    pub small_blind: Option<Chips>,
    pub big_blind: Option<Chips>,
    pub seats: Option<usize>,
}

pub async fn create(
    lobby: web::Data<Arc<Lobby>>,
    defaults: web::Data<ServerConfig>,
    body: web::Json<CreateRoom>,
) -> impl Responder {
    let name = body.name.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest().body("room name required");
    }
    let small = body.small_blind.unwrap_or(defaults.small);
    let big = body.big_blind.unwrap_or(defaults.big);
    if small == 0 || big == 0 || small > big {
        return HttpResponse::BadRequest().body("invalid blind schedule");
    }
    let code = lobby
        .open(
            name,
            SessionId::from(body.session_id),
            small,
            big,
            body.seats,
        )
        .await;
    HttpResponse::Ok().json(serde_json::json!({ "roomId": code }))
}

pub async fn list(lobby: web::Data<Arc<Lobby>>) -> impl Responder {
    HttpResponse::Ok().json(lobby.list().await)
}

pub async fn history(
    lobby: web::Data<Arc<Lobby>>,
    path: web::Path<String>,
) -> impl Responder {
    match lobby.history(&path.into_inner()).await {
        Some(hands) => HttpResponse::Ok().json(hands),
        None => HttpResponse::NotFound().body("room not found"),
    }
}

pub async fn enter(
    lobby: web::Data<Arc<Lobby>>,
    path: web::Path<String>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    let code = path.into_inner();
    if !lobby.exists(&code).await {
        return HttpResponse::NotFound()
            .body("room not found")
            .map_into_right_body();
    }
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            rvb_hosting::serve(lobby.get_ref().clone(), session, stream).await;
            response.map_into_left_body()
        }
        Err(e) => HttpResponse::InternalServerError()
            .body(e.to_string())
            .map_into_right_body(),
    }
}
