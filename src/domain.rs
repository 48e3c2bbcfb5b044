//! Domain models used by the backend: loaded documents, output languages,
//! quiz items, speech modes and synthesized audio.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Plain text extracted from an upload or pasted by the user.
/// Immutable once loaded; lives for a single request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
  pub text: String,
  pub source: DocumentSource,
}

/// Where did the text come from?
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSource {
  File,
  Pasted,
}

/// Output language table (display name → code). Order matters: it is the
/// order shown to users.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Language {
  English,
  Hindi,
  Spanish,
  French,
  German,
  Italian,
  Chinese,
  Japanese,
  Russian,
  Arabic,
  Bengali,
  Tamil,
  Telugu,
  Kannada,
  Malayalam,
}

impl Default for Language {
  fn default() -> Self { Language::English }
}

/// The pivot language every translation is routed through.
pub const PIVOT: Language = Language::English;

impl Language {
  pub const ALL: [Language; 15] = [
    Language::English,
    Language::Hindi,
    Language::Spanish,
    Language::French,
    Language::German,
    Language::Italian,
    Language::Chinese,
    Language::Japanese,
    Language::Russian,
    Language::Arabic,
    Language::Bengali,
    Language::Tamil,
    Language::Telugu,
    Language::Kannada,
    Language::Malayalam,
  ];

  pub fn code(self) -> &'static str {
    match self {
      Language::English => "en",
      Language::Hindi => "hi",
      Language::Spanish => "es",
      Language::French => "fr",
      Language::German => "de",
      Language::Italian => "it",
      Language::Chinese => "zh-cn",
      Language::Japanese => "ja",
      Language::Russian => "ru",
      Language::Arabic => "ar",
      Language::Bengali => "bn",
      Language::Tamil => "ta",
      Language::Telugu => "te",
      Language::Kannada => "kn",
      Language::Malayalam => "ml",
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      Language::English => "English",
      Language::Hindi => "Hindi",
      Language::Spanish => "Spanish",
      Language::French => "French",
      Language::German => "German",
      Language::Italian => "Italian",
      Language::Chinese => "Chinese",
      Language::Japanese => "Japanese",
      Language::Russian => "Russian",
      Language::Arabic => "Arabic",
      Language::Bengali => "Bengali",
      Language::Tamil => "Tamil",
      Language::Telugu => "Telugu",
      Language::Kannada => "Kannada",
      Language::Malayalam => "Malayalam",
    }
  }

  pub fn from_code(code: &str) -> Option<Language> {
    Self::ALL.iter().copied().find(|l| l.code().eq_ignore_ascii_case(code))
  }

  /// Accepts either the display name ("Hindi") or the code ("hi"), case-insensitive.
  pub fn lookup(name_or_code: &str) -> Option<Language> {
    let s = name_or_code.trim();
    Self::from_code(s).or_else(|| Self::ALL.iter().copied().find(|l| l.name().eq_ignore_ascii_case(s)))
  }
}

impl Serialize for Language {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.code())
  }
}

impl<'de> Deserialize<'de> for Language {
  fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    Language::lookup(&s).ok_or_else(|| serde::de::Error::custom(format!("unknown language: {s}")))
  }
}

/// One fill-in-the-blank question: the masked sentence and the removed token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuizItem {
  pub question: String,
  pub answer: String,
}

/// How candidate words are picked for a quiz question.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuizStrategy {
  /// Any word longer than three characters.
  #[default]
  AnyWord,
  /// Only words tagged as nouns (and longer than three characters).
  Nouns,
}

/// Which speech engine renders audio.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TtsMode {
  /// Network synthesis; supports the whole language table.
  #[default]
  Cloud,
  /// Offline engine; English only.
  Local,
}

impl TtsMode {
  pub fn parse(s: &str) -> Option<TtsMode> {
    match s.trim().to_ascii_lowercase().as_str() {
      "cloud" | "online" => Some(TtsMode::Cloud),
      "local" | "offline" => Some(TtsMode::Local),
      _ => None,
    }
  }
}

/// A synthesized audio file on disk. The caller owns its lifetime.
#[derive(Clone, Debug)]
pub struct AudioClip {
  pub path: PathBuf,
  pub mime: &'static str,
  pub extension: &'static str,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn language_table_has_fifteen_unique_codes() {
    let mut codes: Vec<_> = Language::ALL.iter().map(|l| l.code()).collect();
    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), 15);
    assert_eq!(Language::ALL[0], Language::English);
    assert_eq!(Language::ALL[14], Language::Malayalam);
  }

  #[test]
  fn lookup_accepts_names_and_codes() {
    assert_eq!(Language::lookup("Hindi"), Some(Language::Hindi));
    assert_eq!(Language::lookup("zh-CN"), Some(Language::Chinese));
    assert_eq!(Language::lookup(" kannada "), Some(Language::Kannada));
    assert_eq!(Language::lookup("pt"), None);
  }

  #[test]
  fn language_serializes_as_code() {
    let json = serde_json::to_string(&Language::Chinese).unwrap();
    assert_eq!(json, "\"zh-cn\"");
    let back: Language = serde_json::from_str("\"Tamil\"").unwrap();
    assert_eq!(back, Language::Tamil);
  }

  #[test]
  fn tts_mode_parses_aliases() {
    assert_eq!(TtsMode::parse("Offline"), Some(TtsMode::Local));
    assert_eq!(TtsMode::parse("cloud"), Some(TtsMode::Cloud));
    assert_eq!(TtsMode::parse("radio"), None);
  }
}
