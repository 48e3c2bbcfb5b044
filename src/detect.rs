//! Best-effort language detection.
//!
//! Non-Latin text is classified by its dominant Unicode script. Latin text is
//! classified by counting very common function words per language; when no
//! function word matches, the pivot language (English) is assumed.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::util::is_cjk;

/// Only this many characters are inspected.
const SAMPLE_CHARS: usize = 4000;

pub trait LanguageDetector: Send + Sync {
  /// ISO-639-1-ish code (`"en"`, `"zh-cn"`, ...) or None when the text has no letters.
  fn detect(&self, text: &str) -> Option<&'static str>;
}

/// Declaration order is the tie-break: earlier scripts win equal counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Script {
  Latin,
  Cyrillic,
  Greek,
  Arabic,
  Hebrew,
  Devanagari,
  Bengali,
  Gurmukhi,
  Gujarati,
  Tamil,
  Telugu,
  Kannada,
  Malayalam,
  Thai,
  Kana,
  Han,
  Hangul,
}

fn script_of(ch: char) -> Option<Script> {
  let c = ch as u32;
  let s = match c {
    0x0041..=0x005A | 0x0061..=0x007A | 0x00C0..=0x024F => Script::Latin,
    0x0370..=0x03FF => Script::Greek,
    0x0400..=0x04FF => Script::Cyrillic,
    0x0590..=0x05FF => Script::Hebrew,
    0x0600..=0x06FF | 0x0750..=0x077F => Script::Arabic,
    0x0900..=0x097F => Script::Devanagari,
    0x0980..=0x09FF => Script::Bengali,
    0x0A00..=0x0A7F => Script::Gurmukhi,
    0x0A80..=0x0AFF => Script::Gujarati,
    0x0B80..=0x0BFF => Script::Tamil,
    0x0C00..=0x0C7F => Script::Telugu,
    0x0C80..=0x0CFF => Script::Kannada,
    0x0D00..=0x0D7F => Script::Malayalam,
    0x0E00..=0x0E7F => Script::Thai,
    0x3040..=0x30FF => Script::Kana,
    0xAC00..=0xD7AF | 0x1100..=0x11FF => Script::Hangul,
    _ if is_cjk(ch) => Script::Han,
    _ => return None,
  };
  Some(s)
}

const LATIN_FUNCTION_WORDS: &[(&str, &[&str])] = &[
  ("en", &["the", "and", "is", "are", "of", "to", "in", "that", "it", "with", "was", "for", "this", "on"]),
  ("es", &["el", "la", "los", "las", "y", "es", "de", "que", "en", "un", "una", "por", "con", "para", "del"]),
  ("fr", &["le", "la", "les", "et", "est", "des", "une", "du", "que", "dans", "pour", "pas", "sur", "avec"]),
  ("de", &["der", "die", "das", "und", "ist", "nicht", "ein", "eine", "zu", "mit", "den", "von", "auf", "sich"]),
  ("it", &["il", "lo", "gli", "e", "è", "di", "che", "non", "un", "una", "per", "con", "della", "sono"]),
  ("pt", &["o", "os", "as", "e", "é", "de", "que", "não", "um", "uma", "com", "para", "do", "da"]),
  ("nl", &["de", "het", "een", "en", "is", "van", "niet", "dat", "op", "met", "voor", "zijn", "ook"]),
];

/// Script + function-word detector. Stateless.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptDetector;

impl LanguageDetector for ScriptDetector {
  #[instrument(level = "debug", skip(self, text), fields(text_len = text.len()))]
  fn detect(&self, text: &str) -> Option<&'static str> {
    let mut counts: BTreeMap<Script, usize> = BTreeMap::new();
    for ch in text.chars().take(SAMPLE_CHARS) {
      if let Some(s) = script_of(ch) {
        *counts.entry(s).or_default() += 1;
      }
    }

    // Kana anywhere means Japanese even when Han characters dominate.
    if counts.get(&Script::Kana).copied().unwrap_or(0) > 0 {
      return Some("ja");
    }

    let dominant = counts
      .into_iter()
      .max_by(|(sa, na), (sb, nb)| na.cmp(nb).then(sb.cmp(sa)))
      .map(|(s, _)| s)?;
    let code = match dominant {
      Script::Latin => latin_language(text),
      Script::Cyrillic => "ru",
      Script::Greek => "el",
      Script::Arabic => "ar",
      Script::Hebrew => "he",
      Script::Devanagari => "hi",
      Script::Bengali => "bn",
      Script::Gurmukhi => "pa",
      Script::Gujarati => "gu",
      Script::Tamil => "ta",
      Script::Telugu => "te",
      Script::Kannada => "kn",
      Script::Malayalam => "ml",
      Script::Thai => "th",
      Script::Kana => "ja",
      Script::Han => "zh-cn",
      Script::Hangul => "ko",
    };
    debug!(target: "smarttext", detected = code, ?dominant, "Language detected");
    Some(code)
  }
}

fn latin_language(text: &str) -> &'static str {
  let sample: String = text.chars().take(SAMPLE_CHARS).collect::<String>().to_lowercase();
  let words: Vec<&str> = sample
    .split(|c: char| !c.is_alphanumeric())
    .filter(|w| !w.is_empty())
    .collect();

  let mut best = ("en", 0usize);
  for (code, list) in LATIN_FUNCTION_WORDS {
    let hits = words.iter().filter(|w| list.contains(*w)).count();
    // Strictly greater: English wins ties as the pivot language.
    if hits > best.1 {
      best = (*code, hits);
    }
  }
  best.0
}
