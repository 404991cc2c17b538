/// WebSocket endpoint for real-time notifications.
///
/// Each connection registers one handle with the notification hub under the
/// recipient's identity and drains its receiver into the socket. The handle
/// is unregistered when the session stops, whatever the disconnect cause, so
/// the hub never accumulates dead connections.
use std::time::{Duration, Instant};

use actix::{Actor, ActorContext, AsyncContext, Handler, Message as ActixMessage, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse, Result as ActixResult};
use actix_web_actors::ws;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use crate::notifications::{ConnectionId, NotificationHub, WsServerMessage};
use crate::state::AppState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// The recipient identity this connection listens for. The gateway has
    /// already authenticated the caller.
    pub user_id: Uuid,
}

/// Hub message forwarded into the session's socket.
#[derive(ActixMessage)]
#[rtype(result = "()")]
struct PushMessage(WsServerMessage);

struct WsSession {
    recipient_id: Uuid,
    connection_id: ConnectionId,
    hub: NotificationHub,
    /// Receiving half of the hub subscription; drained once started
    receiver: Option<UnboundedReceiver<WsServerMessage>>,
    hb: Instant,
}

impl WsSession {
    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                tracing::warn!(
                    recipient_id = %act.recipient_id,
                    "WebSocket heartbeat failed, disconnecting"
                );
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(recipient_id = %self.recipient_id, "notification session started");

        self.heartbeat(ctx);

        // Drain the hub subscription into this socket
        if let Some(mut receiver) = self.receiver.take() {
            let addr = ctx.address();
            actix::spawn(async move {
                while let Some(message) = receiver.recv().await {
                    addr.do_send(PushMessage(message));
                }
            });
        }

        if let Ok(confirmation) = WsServerMessage::connected().to_json() {
            ctx.text(confirmation);
        }
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(recipient_id = %self.recipient_id, "notification session stopped");

        let hub = self.hub.clone();
        let recipient_id = self.recipient_id;
        let connection_id = self.connection_id;
        actix::spawn(async move {
            hub.unsubscribe(recipient_id, connection_id).await;
        });
    }
}

impl Handler<PushMessage> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: PushMessage, ctx: &mut Self::Context) {
        match msg.0.to_json() {
            Ok(payload) => ctx.text(payload),
            Err(err) => {
                tracing::warn!(
                    recipient_id = %self.recipient_id,
                    error = %err,
                    "dropping unserializable notification"
                );
            }
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.hb = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(_)) => {
                // Delivery is one-way; client text is treated as liveness only
                self.hb = Instant::now();
            }
            Ok(ws::Message::Binary(_)) => {
                tracing::warn!("Binary WebSocket messages not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::debug!(?reason, "WebSocket close message received");
                ctx.stop();
            }
            _ => {}
        }
    }
}

/// GET /ws?user_id=...
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    params: web::Query<WsParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let recipient_id = params.user_id;
    let (connection_id, receiver) = state.hub.subscribe(recipient_id).await;

    let session = WsSession {
        recipient_id,
        connection_id,
        hub: state.hub.clone(),
        receiver: Some(receiver),
        hb: Instant::now(),
    };

    ws::start(session, &req, stream)
}

/// GET /ws/status/{user_id}
pub async fn ws_status(
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let user_id = path.into_inner();
    let connection_count = state.hub.connection_count(user_id).await;

    Ok(HttpResponse::Ok().json(json!({
        "user_id": user_id.to_string(),
        "connected": connection_count > 0,
        "connection_count": connection_count,
    })))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ws", web::get().to(ws_connect))
        .route("/ws/status/{user_id}", web::get().to(ws_status));
}
