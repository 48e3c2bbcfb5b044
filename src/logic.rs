//! Request pipelines shared by both HTTP and WebSocket handlers.
//!
//! Every action runs the same chain on an already loaded [`Document`]:
//! normalize to the pivot language, apply the heuristic, translate the result
//! into the output language, and optionally speak it.

use std::sync::Arc;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{info, instrument, warn};

use crate::answer::find_answer;
use crate::domain::{AudioClip, Document, DocumentSource, Language, QuizItem, TtsMode};
use crate::error::{AppError, AppResult};
use crate::quiz::{generate_quiz, quiz_listing};
use crate::state::AppState;
use crate::text::tokenize_sentences;
use crate::util::preview;

/// How a result should be delivered.
#[derive(Clone, Copy, Debug, Default)]
pub struct OutputOptions {
  pub language: Language,
  pub tts_mode: TtsMode,
  pub voice: bool,
}

/// Audio read back into memory; the file on disk is already gone.
#[derive(Clone, Debug)]
pub struct SpokenAudio {
  pub bytes: Vec<u8>,
  pub mime: &'static str,
  pub extension: &'static str,
}

#[derive(Clone, Debug)]
pub struct LoadResult {
  pub chars: usize,
  pub preview: String,
  pub truncated: bool,
  pub detected: Option<&'static str>,
  pub source: DocumentSource,
}

/// Text output of the answer and summary actions.
#[derive(Clone, Debug)]
pub struct Rendered {
  pub text: String,
  pub detected: Option<&'static str>,
  pub audio: Option<SpokenAudio>,
}

#[derive(Clone, Debug)]
pub struct QuizResult {
  pub items: Vec<QuizItem>,
  pub listing: String,
  pub detected: Option<&'static str>,
  /// One clip per question, in order, when voice is on.
  pub audio: Vec<SpokenAudio>,
}

pub fn describe_document(state: &AppState, doc: &Document) -> LoadResult {
  let (preview, truncated) = preview(&doc.text, state.config.limits.preview_chars);
  LoadResult {
    chars: doc.text.chars().count(),
    preview,
    truncated,
    detected: state.normalizer.detect(&doc.text),
    source: doc.source,
  }
}

/// Read a synthesized clip into memory and delete the file.
async fn take_clip(clip: AudioClip) -> AppResult<SpokenAudio> {
  let bytes = tokio::fs::read(&clip.path).await.map_err(|e| AppError::Speech(e.to_string()))?;
  if let Err(e) = tokio::fs::remove_file(&clip.path).await {
    warn!(target: "smarttext", path = %clip.path.display(), error = %e, "Failed to remove audio file");
  }
  Ok(SpokenAudio { bytes, mime: clip.mime, extension: clip.extension })
}

#[instrument(level = "info", skip(state, text), fields(text_len = text.len(), lang = opts.language.code()))]
pub async fn speak(state: &AppState, text: &str, opts: &OutputOptions) -> AppResult<SpokenAudio> {
  let clip = state.speech.render(text, opts.language, opts.tts_mode).await?;
  take_clip(clip).await
}

async fn maybe_speak(state: &AppState, text: &str, opts: &OutputOptions) -> AppResult<Option<SpokenAudio>> {
  if !opts.voice || text.trim().is_empty() {
    return Ok(None);
  }
  speak(state, text, opts).await.map(Some)
}

/// Get Answer. `None` when no question was supplied.
#[instrument(level = "info", skip(state, doc, question), fields(text_len = doc.text.len(), question_len = question.len(), lang = opts.language.code()))]
pub async fn answer_question(
  state: &AppState,
  doc: &Document,
  question: &str,
  opts: &OutputOptions,
) -> AppResult<Option<Rendered>> {
  if question.trim().is_empty() {
    return Ok(None);
  }
  let (pivot, detected) = state.normalizer.to_pivot(&doc.text).await?;
  let answer = find_answer(&pivot, question);
  let text = state.normalizer.from_pivot(answer, opts.language).await?;
  let audio = maybe_speak(state, &text, opts).await?;
  info!(target: "smarttext", answer_len = text.len(), voiced = audio.is_some(), "Answer ready");
  Ok(Some(Rendered { text, detected, audio }))
}

/// Summarize Text: the ranked sentences joined with a space.
#[instrument(level = "info", skip(state, doc), fields(text_len = doc.text.len(), lang = opts.language.code()))]
pub async fn summarize_document(state: &AppState, doc: &Document, opts: &OutputOptions) -> AppResult<Rendered> {
  let (pivot, detected) = state.normalizer.to_pivot(&doc.text).await?;
  let summarizer = Arc::clone(&state.summarizer);
  let (count, limit) = (state.config.summary.sentences, state.config.summary.max_input_sentences);
  // Ranking is CPU-bound and quadratic; keep it off the async workers.
  let sentences = tokio::task::spawn_blocking(move || {
    let total = tokenize_sentences(&pivot).len();
    if total > limit {
      return Err(AppError::Validation(format!(
        "The text has {total} sentences; summaries are limited to {limit}"
      )));
    }
    Ok(summarizer.summarize(&pivot, count))
  })
  .await
  .map_err(|e| AppError::Internal(format!("summarizer aborted: {e}")))??;
  let summary = sentences.join(" ");
  let text = state.normalizer.from_pivot(&summary, opts.language).await?;
  let audio = maybe_speak(state, &text, opts).await?;
  info!(target: "smarttext", sentences = sentences.len(), summary_len = text.len(), voiced = audio.is_some(), "Summary ready");
  Ok(Rendered { text, detected, audio })
}

/// Generate Quiz Questions with a fresh entropy-seeded generator.
pub async fn quiz_document(state: &AppState, doc: &Document, opts: &OutputOptions) -> AppResult<QuizResult> {
  let mut rng = StdRng::from_entropy();
  quiz_document_with_rng(state, doc, opts, &mut rng).await
}

/// Quiz pipeline with an injected random source. Question and answer of
/// every item are translated separately.
#[instrument(level = "info", skip(state, doc, rng), fields(text_len = doc.text.len(), lang = opts.language.code()))]
pub async fn quiz_document_with_rng<R: Rng + Send + ?Sized>(
  state: &AppState,
  doc: &Document,
  opts: &OutputOptions,
  rng: &mut R,
) -> AppResult<QuizResult> {
  let (pivot, detected) = state.normalizer.to_pivot(&doc.text).await?;
  let generated = generate_quiz(&pivot, &state.config.quiz.options(), rng);

  let mut items = Vec::with_capacity(generated.len());
  let mut audio = Vec::new();
  for item in generated {
    let question = state.normalizer.from_pivot(&item.question, opts.language).await?;
    let answer = state.normalizer.from_pivot(&item.answer, opts.language).await?;
    if let Some(clip) = maybe_speak(state, &question, opts).await? {
      audio.push(clip);
    }
    items.push(QuizItem { question, answer });
  }

  let listing = quiz_listing(&items);
  info!(target: "smarttext", questions = items.len(), voiced = audio.len(), "Quiz ready");
  Ok(QuizResult { items, listing, detected, audio })
}
