//! Language normalization: detect the source language, translate into the
//! pivot language (English) for processing, and translate results back.
//!
//! Translation backends sit behind the [`Translator`] trait and are injected;
//! failures propagate as `AppError::Translation` and are never retried.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::config::Prompts;
use crate::detect::LanguageDetector;
use crate::domain::{Language, PIVOT};
use crate::error::{AppError, AppResult};
use crate::openai::OpenAI;
use crate::util::chunk_text;

const GOOGLE_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

#[async_trait]
pub trait Translator: Send + Sync {
  /// Translate `text` into `target`. `source` is a detected code, or None for auto.
  async fn translate(&self, text: &str, source: Option<&str>, target: Language) -> AppResult<String>;
}

/// Code as understood by Google endpoints ("zh-cn" → "zh-CN").
pub fn google_code(code: &str) -> String {
  match code.split_once('-') {
    Some((lang, region)) => format!("{}-{}", lang, region.to_uppercase()),
    None => code.to_string(),
  }
}

/// Google Translate public web endpoint, as used by browser extensions.
/// Long inputs are sent in chunks and joined with a space.
#[derive(Clone)]
pub struct GoogleTranslator {
  client: reqwest::Client,
  endpoint: String,
  chunk_chars: usize,
}

impl GoogleTranslator {
  pub fn new(chunk_chars: usize) -> Result<Self, String> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|e| e.to_string())?;
    Ok(Self { client, endpoint: GOOGLE_TRANSLATE_URL.into(), chunk_chars })
  }

  #[instrument(level = "debug", skip(self, chunk), fields(chunk_len = chunk.len(), %sl, %tl))]
  async fn translate_chunk(&self, chunk: &str, sl: &str, tl: &str) -> Result<String, String> {
    let res = self
      .client
      .get(&self.endpoint)
      .query(&[("client", "gtx"), ("sl", sl), ("tl", tl), ("dt", "t"), ("q", chunk)])
      .send()
      .await
      .map_err(|e| e.to_string())?;
    if !res.status().is_success() {
      return Err(format!("Google Translate HTTP {}", res.status()));
    }
    let body: Value = res.json().await.map_err(|e| e.to_string())?;
    parse_google_response(&body).ok_or_else(|| "Unexpected Google Translate response shape".to_string())
  }
}

/// The endpoint answers `[[["translated", "original", ...], ...], ...]`;
/// the translation is the concatenation of every segment's first element.
pub fn parse_google_response(body: &Value) -> Option<String> {
  let segments = body.get(0)?.as_array()?;
  let mut out = String::new();
  for seg in segments {
    if let Some(s) = seg.get(0).and_then(Value::as_str) {
      out.push_str(s);
    }
  }
  Some(out)
}

#[async_trait]
impl Translator for GoogleTranslator {
  async fn translate(&self, text: &str, source: Option<&str>, target: Language) -> AppResult<String> {
    let sl = source.map(google_code).unwrap_or_else(|| "auto".into());
    let tl = google_code(target.code());
    let mut parts = Vec::new();
    for chunk in chunk_text(text, self.chunk_chars) {
      let t = self.translate_chunk(&chunk, &sl, &tl).await.map_err(AppError::Translation)?;
      parts.push(t);
    }
    Ok(parts.join(" "))
  }
}

/// Translation through OpenAI chat completions.
#[derive(Clone)]
pub struct OpenAiTranslator {
  client: OpenAI,
  prompts: Prompts,
  chunk_chars: usize,
}

impl OpenAiTranslator {
  pub fn new(client: OpenAI, prompts: Prompts, chunk_chars: usize) -> Self {
    Self { client, prompts, chunk_chars }
  }
}

#[async_trait]
impl Translator for OpenAiTranslator {
  async fn translate(&self, text: &str, _source: Option<&str>, target: Language) -> AppResult<String> {
    let mut parts = Vec::new();
    for chunk in chunk_text(text, self.chunk_chars) {
      let t = self
        .client
        .translate(&self.prompts, &chunk, target.name())
        .await
        .map_err(AppError::Translation)?;
      parts.push(t);
    }
    Ok(parts.join(" "))
  }
}

/// Pivot-language routing built from an injected detector and optional translator.
#[derive(Clone)]
pub struct LanguageNormalizer {
  detector: Arc<dyn LanguageDetector>,
  translator: Option<Arc<dyn Translator>>,
}

impl LanguageNormalizer {
  pub fn new(detector: Arc<dyn LanguageDetector>, translator: Option<Arc<dyn Translator>>) -> Self {
    Self { detector, translator }
  }

  fn translator(&self) -> AppResult<&dyn Translator> {
    self.translator.as_deref().ok_or(AppError::TranslationUnavailable)
  }

  pub fn detect(&self, text: &str) -> Option<&'static str> {
    self.detector.detect(text)
  }

  pub fn can_translate(&self) -> bool {
    self.translator.is_some()
  }

  /// Text in the pivot language plus the detected source code.
  /// Text already in the pivot language (or with no letters) passes unchanged.
  #[instrument(level = "info", skip(self, text), fields(text_len = text.len()))]
  pub async fn to_pivot(&self, text: &str) -> AppResult<(String, Option<&'static str>)> {
    let detected = self.detect(text);
    match detected {
      None => {
        debug!(target: "smarttext", "No language detected; passing text through");
        Ok((text.to_string(), None))
      }
      Some(code) if code == PIVOT.code() => Ok((text.to_string(), detected)),
      Some(code) => {
        let pivot = self.translator()?.translate(text, Some(code), PIVOT).await?;
        info!(target: "smarttext", from = code, in_len = text.len(), out_len = pivot.len(), "Translated to pivot");
        Ok((pivot, detected))
      }
    }
  }

  /// Pivot-language text rendered in `target`; identity when `target` is the pivot.
  #[instrument(level = "info", skip(self, text), fields(text_len = text.len(), target = target.code()))]
  pub async fn from_pivot(&self, text: &str, target: Language) -> AppResult<String> {
    if target == PIVOT || text.trim().is_empty() {
      return Ok(text.to_string());
    }
    self.translator()?.translate(text, Some(PIVOT.code()), target).await
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::detect::ScriptDetector;
  use std::sync::Mutex;

  /// Records calls and tags the text with the target code.
  #[derive(Default)]
  pub(crate) struct FakeTranslator {
    pub calls: Mutex<Vec<(String, Option<String>, Language)>>,
  }

  #[async_trait]
  impl Translator for FakeTranslator {
    async fn translate(&self, text: &str, source: Option<&str>, target: Language) -> AppResult<String> {
      self.calls.lock().unwrap().push((text.to_string(), source.map(str::to_string), target));
      Ok(format!("[{}] {}", target.code(), text))
    }
  }

  pub(crate) struct FailingTranslator;

  #[async_trait]
  impl Translator for FailingTranslator {
    async fn translate(&self, _: &str, _: Option<&str>, _: Language) -> AppResult<String> {
      Err(AppError::Translation("service unavailable".into()))
    }
  }

  fn normalizer(t: Option<Arc<dyn Translator>>) -> LanguageNormalizer {
    LanguageNormalizer::new(Arc::new(ScriptDetector), t)
  }

  #[tokio::test]
  async fn english_input_skips_translation() {
    let fake = Arc::new(FakeTranslator::default());
    let n = normalizer(Some(fake.clone() as Arc<dyn Translator>));
    let (pivot, detected) = n.to_pivot("The cat sat on the mat.").await.unwrap();
    assert_eq!(pivot, "The cat sat on the mat.");
    assert_eq!(detected, Some("en"));
    assert!(fake.calls.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn foreign_input_is_translated_to_pivot() {
    let fake = Arc::new(FakeTranslator::default());
    let n = normalizer(Some(fake.clone() as Arc<dyn Translator>));
    let (pivot, detected) = n.to_pivot("Это тестовое предложение.").await.unwrap();
    assert_eq!(detected, Some("ru"));
    assert_eq!(pivot, "[en] Это тестовое предложение.");
    let calls = fake.calls.lock().unwrap();
    assert_eq!(calls[0].1.as_deref(), Some("ru"));
  }

  #[tokio::test]
  async fn from_pivot_is_identity_for_english() {
    let n = normalizer(None);
    assert_eq!(n.from_pivot("Hello.", Language::English).await.unwrap(), "Hello.");
  }

  #[tokio::test]
  async fn from_pivot_translates_other_targets() {
    let n = normalizer(Some(Arc::new(FakeTranslator::default())));
    assert_eq!(n.from_pivot("Hello.", Language::Hindi).await.unwrap(), "[hi] Hello.");
  }

  #[tokio::test]
  async fn missing_or_failing_translator_is_an_error() {
    let n = normalizer(None);
    assert!(matches!(n.from_pivot("Hello.", Language::French).await, Err(AppError::TranslationUnavailable)));
    assert!(matches!(n.to_pivot("这是一个测试句子。").await, Err(AppError::TranslationUnavailable)));

    let n = normalizer(Some(Arc::new(FailingTranslator)));
    assert!(matches!(n.from_pivot("Hello.", Language::French).await, Err(AppError::Translation(_))));
  }

  #[test]
  fn google_codes_uppercase_region() {
    assert_eq!(google_code("zh-cn"), "zh-CN");
    assert_eq!(google_code("hi"), "hi");
  }

  #[test]
  fn parses_google_segments() {
    let body: Value = serde_json::from_str(
      r#"[[["Hello. ","Hola. ",null,null,10],["How are you?","¿Cómo estás?",null,null,10]],null,"es"]"#,
    )
    .unwrap();
    assert_eq!(parse_google_response(&body).as_deref(), Some("Hello. How are you?"));
    assert_eq!(parse_google_response(&Value::Null), None);
  }
}
