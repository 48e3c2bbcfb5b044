//! Text-to-speech rendering.
//!
//! Two modes: a cloud engine (Google Translate TTS or OpenAI, whole language
//! table) and a local engine (an espeak-compatible command, English only).
//! Engines write a file and hand back its path; whoever calls
//! [`SpeechRenderer::render`] owns the file afterwards.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::{AudioClip, Language, TtsMode};
use crate::error::{AppError, AppResult};
use crate::openai::OpenAI;
use crate::translate::google_code;
use crate::util::{chunk_text, trunc_for_log};

const GOOGLE_TTS_URL: &str = "https://translate.google.com/translate_tts";
/// The TTS endpoint rejects longer inputs.
const GOOGLE_TTS_MAX_CHARS: usize = 100;
/// Input limit of OpenAI audio/speech.
const OPENAI_TTS_MAX_CHARS: usize = 4096;

#[async_trait]
pub trait SpeechEngine: Send + Sync {
  async fn synthesize(&self, text: &str, lang: Language) -> AppResult<AudioClip>;
}

fn new_audio_path(dir: &Path, extension: &str) -> PathBuf {
  dir.join(format!("smarttext-{}.{}", Uuid::new_v4(), extension))
}

/// Google Translate TTS. Text is spoken in ≤100-char chunks whose MP3
/// streams are concatenated in order.
#[derive(Clone)]
pub struct GoogleSpeech {
  client: reqwest::Client,
  endpoint: String,
  out_dir: PathBuf,
}

impl GoogleSpeech {
  pub fn new(out_dir: PathBuf) -> Result<Self, String> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|e| e.to_string())?;
    Ok(Self { client, endpoint: GOOGLE_TTS_URL.into(), out_dir })
  }
}

#[async_trait]
impl SpeechEngine for GoogleSpeech {
  #[instrument(level = "info", skip(self, text), fields(text_len = text.len(), lang = lang.code()))]
  async fn synthesize(&self, text: &str, lang: Language) -> AppResult<AudioClip> {
    let chunks = chunk_text(text, GOOGLE_TTS_MAX_CHARS);
    let total = chunks.len().to_string();
    let tl = google_code(lang.code());
    let mut audio: Vec<u8> = Vec::new();

    for (idx, chunk) in chunks.iter().enumerate() {
      let idx_s = idx.to_string();
      let len_s = chunk.chars().count().to_string();
      let res = self
        .client
        .get(&self.endpoint)
        .query(&[
          ("ie", "UTF-8"),
          ("client", "tw-ob"),
          ("tl", tl.as_str()),
          ("q", chunk.as_str()),
          ("total", total.as_str()),
          ("idx", idx_s.as_str()),
          ("textlen", len_s.as_str()),
        ])
        .send()
        .await
        .map_err(|e| AppError::Speech(e.to_string()))?;
      if !res.status().is_success() {
        return Err(AppError::Speech(format!("Google TTS HTTP {}", res.status())));
      }
      let bytes = res.bytes().await.map_err(|e| AppError::Speech(e.to_string()))?;
      audio.extend_from_slice(&bytes);
    }

    let path = new_audio_path(&self.out_dir, "mp3");
    tokio::fs::write(&path, &audio).await.map_err(|e| AppError::Speech(e.to_string()))?;
    info!(target: "smarttext", chunks = chunks.len(), bytes = audio.len(), "Cloud speech written");
    Ok(AudioClip { path, mime: "audio/mpeg", extension: "mp3" })
  }
}

/// OpenAI audio/speech. The model infers the language from the text; long
/// text is spoken chunk by chunk and the MP3 streams concatenated.
#[derive(Clone)]
pub struct OpenAiSpeech {
  client: OpenAI,
  voice: String,
  out_dir: PathBuf,
}

impl OpenAiSpeech {
  pub fn new(client: OpenAI, voice: String, out_dir: PathBuf) -> Self {
    Self { client, voice, out_dir }
  }
}

#[async_trait]
impl SpeechEngine for OpenAiSpeech {
  #[instrument(level = "info", skip(self, text), fields(text_len = text.len()))]
  async fn synthesize(&self, text: &str, _lang: Language) -> AppResult<AudioClip> {
    let chunks = chunk_text(text, OPENAI_TTS_MAX_CHARS);
    let mut audio: Vec<u8> = Vec::new();
    for chunk in &chunks {
      let bytes = self.client.speech(chunk, &self.voice).await.map_err(AppError::Speech)?;
      audio.extend_from_slice(&bytes);
    }
    info!(target: "smarttext", chunks = chunks.len(), bytes = audio.len(), "Cloud speech written");
    let path = new_audio_path(&self.out_dir, "mp3");
    tokio::fs::write(&path, &audio).await.map_err(|e| AppError::Speech(e.to_string()))?;
    Ok(AudioClip { path, mime: "audio/mpeg", extension: "mp3" })
  }
}

/// Offline engine driven through an espeak-compatible command line:
/// `<command...> -v en -s <rate> -w <file.wav> -- <text>`.
#[derive(Clone, Debug)]
pub struct LocalSpeech {
  command: Vec<String>,
  rate: u32,
  out_dir: PathBuf,
}

impl LocalSpeech {
  pub fn new(command: Vec<String>, rate: u32, out_dir: PathBuf) -> Self {
    Self { command, rate, out_dir }
  }
}

#[async_trait]
impl SpeechEngine for LocalSpeech {
  #[instrument(level = "info", skip(self, text), fields(text_len = text.len(), program = ?self.command.first()))]
  async fn synthesize(&self, text: &str, _lang: Language) -> AppResult<AudioClip> {
    let (program, lead) = self
      .command
      .split_first()
      .ok_or_else(|| AppError::Speech("local TTS command is empty".into()))?;
    let path = new_audio_path(&self.out_dir, "wav");

    let output = Command::new(program)
      .args(lead)
      .arg("-v")
      .arg("en")
      .arg("-s")
      .arg(self.rate.to_string())
      .arg("-w")
      .arg(&path)
      // Text starting with '-' must not be read as options.
      .arg("--")
      .arg(text)
      .output()
      .await
      .map_err(|e| AppError::Speech(format!("failed to run {program}: {e}")))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(AppError::Speech(format!("{program} exited with {}: {}", output.status, trunc_for_log(stderr.trim(), 300))));
    }
    if tokio::fs::metadata(&path).await.is_err() {
      return Err(AppError::Speech(format!("{program} produced no audio file")));
    }
    Ok(AudioClip { path, mime: "audio/wav", extension: "wav" })
  }
}

/// Chooses the engine for a request and enforces the offline engine's
/// English-only precondition.
#[derive(Clone)]
pub struct SpeechRenderer {
  cloud: Option<Arc<dyn SpeechEngine>>,
  local: Arc<dyn SpeechEngine>,
}

impl SpeechRenderer {
  pub fn new(cloud: Option<Arc<dyn SpeechEngine>>, local: Arc<dyn SpeechEngine>) -> Self {
    Self { cloud, local }
  }

  #[instrument(level = "info", skip(self, text), fields(text_len = text.len(), lang = lang.code(), ?mode))]
  pub async fn render(&self, text: &str, lang: Language, mode: TtsMode) -> AppResult<AudioClip> {
    if text.trim().is_empty() {
      return Err(AppError::Validation("Nothing to speak".into()));
    }
    match mode {
      TtsMode::Local if lang != Language::English => {
        warn!(target: "smarttext", lang = lang.code(), "Offline TTS requested for non-English output");
        Err(AppError::Validation(format!(
          "Offline TTS supports English only; choose cloud mode for {}",
          lang.name()
        )))
      }
      TtsMode::Local => self.local.synthesize(text, lang).await,
      TtsMode::Cloud => match &self.cloud {
        Some(engine) => engine.synthesize(text, lang).await,
        None => Err(AppError::Speech("cloud TTS is not configured".into())),
      },
    }
  }
}
