//! SmartText · text understanding backend
//!
//! - Axum HTTP + WebSocket API: load text, answer a question, summarize, quiz
//! - Pivot-language translation (Google web endpoint or OpenAI) and TTS
//!   (Google/OpenAI cloud, espeak-ng offline)
//! - Static page fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   APP_CONFIG_PATH   : path to TOML config (quiz, summary, translation, speech, limits, prompts)
//!   OPENAI_API_KEY    : enables OpenAI integration if present
//!   OPENAI_BASE_URL   : default "https://api.openai.com/v1"
//!   OPENAI_FAST_MODEL : default "gpt-4o-mini"
//!   OPENAI_TTS_MODEL  : default "tts-1"
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod text;
mod detect;
mod answer;
mod quiz;
mod summarize;
mod loader;
mod openai;
mod translate;
mod speech;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (config, translator, summarizer, speech engines).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "smarttext", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
