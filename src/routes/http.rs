//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs basic request and result info.

use std::sync::Arc;

use axum::{
  async_trait,
  extract::{FromRequest, Multipart, Request, State},
  http::{header, StatusCode},
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument};

use crate::domain::Document;
use crate::error::{AppError, AppResult};
use crate::loader::{load_document, TextSource, UploadedFile};
use crate::logic::{self, OutputOptions, Rendered};
use crate::protocol::*;
use crate::state::AppState;

/// One action request, from either a multipart form or a JSON body.
#[derive(Debug, Default)]
pub struct ActionRequest {
  pub source: TextSource,
  pub question: Option<String>,
  pub output: OutputIn,
  pub download: Option<Download>,
}

fn parse_flag(s: &str) -> bool {
  matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "on" | "yes")
}

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for ActionRequest {
  type Rejection = AppError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let content_type = req
      .headers()
      .get(header::CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .unwrap_or_default()
      .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
      let mut multipart = Multipart::from_request(req, state).await.map_err(|e| AppError::Upload(e.body_text()))?;
      let mut out = ActionRequest::default();
      while let Some(field) = multipart.next_field().await.map_err(|e| AppError::Upload(e.body_text()))? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
          let file_name = field.file_name().map(str::to_string);
          let content_type = field.content_type().map(str::to_string);
          let bytes = field.bytes().await.map_err(|e| AppError::Upload(e.body_text()))?;
          out.source.file = Some(UploadedFile { file_name, content_type, bytes: bytes.to_vec() });
          continue;
        }
        let value = field.text().await.map_err(|e| AppError::Upload(e.body_text()))?;
        match name.as_str() {
          "text" => out.source.pasted = Some(value),
          "question" => out.question = Some(value),
          "language" => out.output.language = Some(value),
          "tts_mode" => out.output.tts_mode = Some(value),
          "voice" => out.output.voice = parse_flag(&value),
          "download" => out.download = Download::parse(&value)?,
          _ => {}
        }
      }
      Ok(out)
    } else if content_type.is_empty() {
      Ok(ActionRequest::default())
    } else {
      let Json(body) = Json::<ActionIn>::from_request(req, state)
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?;
      Ok(ActionRequest {
        source: TextSource { file: None, pasted: body.text },
        question: body.question,
        output: body.output,
        download: body.download,
      })
    }
  }
}

impl ActionRequest {
  /// Loaded document plus resolved output options. Asking for an audio
  /// download implies voice.
  async fn prepare(self) -> AppResult<(Document, OutputOptions, Option<Download>, Option<String>)> {
    let mut opts = self.output.resolve()?;
    if self.download == Some(Download::Audio) {
      opts.voice = true;
    }
    let doc = load_document(self.source).await?;
    Ok((doc, opts, self.download, self.question))
  }
}

fn attachment(file_name: &str, mime: &str, body: Vec<u8>) -> Response {
  (
    [
      (header::CONTENT_TYPE, mime.to_string()),
      (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
    ],
    body,
  )
    .into_response()
}

/// Text or audio attachment of a rendered result, or None for a JSON reply.
fn rendered_download(stem: &str, r: Rendered, download: Option<Download>) -> AppResult<Option<Response>> {
  match download {
    None => Ok(None),
    Some(Download::Text) => Ok(Some(attachment(&format!("{stem}.txt"), "text/plain; charset=utf-8", r.text.into_bytes()))),
    Some(Download::Audio) => {
      let audio = r.audio.ok_or_else(|| AppError::Validation("There is nothing to speak".into()))?;
      Ok(Some(attachment(&format!("{stem}.{}", audio.extension), audio.mime, audio.bytes)))
    }
  }
}

#[instrument(level = "info", skip_all)]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, translation: state.normalizer.can_translate() })
}

#[instrument(level = "info")]
pub async fn http_languages() -> impl IntoResponse {
  Json(LanguagesOut { languages: language_table() })
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_load(State(state): State<Arc<AppState>>, req: ActionRequest) -> AppResult<Json<LoadOut>> {
  let doc = load_document(req.source).await?;
  let out = logic::describe_document(&state, &doc);
  info!(target: "smarttext", chars = out.chars, detected = ?out.detected, source = ?out.source, "HTTP load served");
  Ok(Json(out.into()))
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_answer(State(state): State<Arc<AppState>>, req: ActionRequest) -> AppResult<Response> {
  let (doc, opts, download, question) = req.prepare().await?;
  let Some(r) = logic::answer_question(&state, &doc, question.as_deref().unwrap_or_default(), &opts).await? else {
    info!(target: "smarttext", "HTTP answer without a question; nothing to do");
    return Ok(StatusCode::NO_CONTENT.into_response());
  };
  let body = Json(answer_out(&r, opts.language)).into_response();
  Ok(rendered_download("answer", r, download)?.unwrap_or(body))
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_summary(State(state): State<Arc<AppState>>, req: ActionRequest) -> AppResult<Response> {
  let (doc, opts, download, _) = req.prepare().await?;
  let r = logic::summarize_document(&state, &doc, &opts).await?;
  let body = Json(summary_out(&r, opts.language)).into_response();
  Ok(rendered_download("summary", r, download)?.unwrap_or(body))
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_quiz(State(state): State<Arc<AppState>>, req: ActionRequest) -> AppResult<Response> {
  if req.download == Some(Download::Audio) {
    return Err(AppError::Validation("Quiz audio is returned per question; download the quiz as text".into()));
  }
  let (doc, opts, download, _) = req.prepare().await?;
  let r = logic::quiz_document(&state, &doc, &opts).await?;
  if download == Some(Download::Text) {
    return Ok(attachment("quiz.txt", "text/plain; charset=utf-8", r.listing.into_bytes()));
  }
  Ok(Json(quiz_out(&r, opts.language)).into_response())
}
