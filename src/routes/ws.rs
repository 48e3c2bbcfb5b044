//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument};

use crate::domain::Document;
use crate::error::{AppError, AppResult};
use crate::loader::{load_document, TextSource};
use crate::logic;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "smarttext", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "smarttext", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => handle_client_ws(incoming, &state).await,
          Err(e) => ServerWsMessage::Error { error: "invalid_json", message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          let err = AppError::Internal(format!("Serialization error: {}", e));
          serde_json::json!({ "type": "error", "error": err.kind(), "message": err.to_string() }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "smarttext", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "smarttext", "WebSocket disconnected");
}

async fn pasted(text: String) -> AppResult<Document> {
  load_document(TextSource { file: None, pasted: Some(text) }).await
}

/// Every failure becomes an `error` message; the socket stays open.
pub(crate) async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  dispatch(msg, state).await.unwrap_or_else(ServerWsMessage::from)
}

#[instrument(level = "info", skip_all)]
async fn dispatch(msg: ClientWsMessage, state: &AppState) -> AppResult<ServerWsMessage> {
  match msg {
    ClientWsMessage::Ping => Ok(ServerWsMessage::Pong),

    ClientWsMessage::Languages => Ok(ServerWsMessage::Languages { languages: language_table() }),

    ClientWsMessage::Load { text } => {
      let doc = pasted(text).await?;
      Ok(ServerWsMessage::Loaded { load: logic::describe_document(state, &doc).into() })
    }

    ClientWsMessage::Answer { text, question, output } => {
      let opts = output.resolve()?;
      let doc = pasted(text).await?;
      match logic::answer_question(state, &doc, &question, &opts).await? {
        Some(r) => {
          info!(target: "smarttext", answer_len = r.text.len(), "WS answer served");
          Ok(ServerWsMessage::Answer { answer: answer_out(&r, opts.language) })
        }
        None => Ok(ServerWsMessage::NoQuestion),
      }
    }

    ClientWsMessage::Summary { text, output } => {
      let opts = output.resolve()?;
      let doc = pasted(text).await?;
      let r = logic::summarize_document(state, &doc, &opts).await?;
      Ok(ServerWsMessage::Summary { summary: summary_out(&r, opts.language) })
    }

    ClientWsMessage::Quiz { text, output } => {
      let opts = output.resolve()?;
      let doc = pasted(text).await?;
      let r = logic::quiz_document(state, &doc, &opts).await?;
      Ok(ServerWsMessage::Quiz { quiz: quiz_out(&r, opts.language) })
    }
  }
}
