use futures_util::sink::SinkExt;
use futures_util::stream::StreamExt;
use log::{error, info};
use tokio::sync::mpsc;
use uuid::Uuid;
use warp::ws::WebSocket;

use crate::core::event_handler::EventHandler;
use crate::core::server::SharedServerManager;

// Handle a WebSocket connection from upgrade to teardown
pub async fn handle_ws_client(ws: WebSocket, server: SharedServerManager) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let (tx, rx) = mpsc::unbounded_channel();

    // Forward everything pushed onto our channel out over the WebSocket
    tokio::task::spawn(async move {
        let mut rx = rx;
        while let Some(message) = rx.recv().await {
            if let Err(e) = ws_tx.send(message).await {
                error!("Failed to send WebSocket message: {}", e);
                break;
            }
        }
    });

    // The connection id is minted here, at transport-connect time
    let client_id = Uuid::new_v4().to_string();
    server.register_connection(client_id.clone(), tx).await;

    info!("Client connected: {}", client_id);
    info!("Current connections: {}", server.connection_count().await);

    let handler = EventHandler::new(server.clone());

    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(msg) => {
                // Only text frames carry protocol events
                if let Ok(text) = msg.to_str() {
                    handler.handle_event(&client_id, text).await;
                }
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
        }
    }

    // Runs once whether the close was voluntary or not
    server.disconnect(&client_id).await;
    info!("Current connections: {}", server.connection_count().await);
}
