//! Sentence and word segmentation shared by the answer finder, summarizer and
//! quiz generator.
//!
//! Two sentence splitters exist on purpose:
//! - [`split_sentences`] is the plain punctuation rule used for answering:
//!   cut after `.`, `!` or `?` when followed by whitespace.
//! - [`tokenize_sentences`] is a tokenizer that also knows about common
//!   abbreviations, initials and decimal numbers, used for quizzes and
//!   summaries.

pub mod tagger;

use once_cell::sync::Lazy;
use regex::Regex;

static TERMINAL_THEN_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

// Candidate boundary: terminal punctuation, optional closing quotes/brackets,
// then whitespace or end of input.
static BOUNDARY: Lazy<Regex> =
  Lazy::new(|| Regex::new(r#"[.!?。！？]+["'”’)\]]*(?:\s+|$)"#).unwrap());

static ABBREVIATIONS: &[&str] = &[
  "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "inc", "ltd",
  "co", "corp", "no", "vol", "fig", "approx", "dept", "est", "jan", "feb", "mar", "apr", "jun",
  "jul", "aug", "sep", "sept", "oct", "nov", "dec", "u.s", "u.k", "a.m", "p.m",
];

/// A word token with its byte span in the source sentence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
  pub text: &'a str,
  pub start: usize,
  pub end: usize,
}

/// Greedy, left-to-right, non-overlapping split after sentence-terminal
/// punctuation followed by whitespace. Pieces are trimmed; blank pieces are
/// dropped, so blank input yields no sentences.
pub fn split_sentences(text: &str) -> Vec<&str> {
  let mut out = Vec::new();
  let mut start = 0;
  for m in TERMINAL_THEN_SPACE.find_iter(text) {
    // keep the punctuation (one byte) with the sentence
    push_trimmed(&mut out, &text[start..m.start() + 1]);
    start = m.end();
  }
  push_trimmed(&mut out, &text[start..]);
  out
}

/// Abbreviation-aware sentence tokenizer.
pub fn tokenize_sentences(text: &str) -> Vec<&str> {
  let mut out = Vec::new();
  let mut start = 0;
  for m in BOUNDARY.find_iter(text) {
    if m.start() < start {
      continue;
    }
    let candidate = &text[start..m.end()];
    let at_end = m.end() == text.len();
    if !at_end && !is_real_boundary(text, start, m.start(), m.end()) {
      continue;
    }
    push_trimmed(&mut out, candidate);
    start = m.end();
  }
  push_trimmed(&mut out, &text[start..]);
  out
}

/// Word tokens (`\w+` runs) of a sentence, in order.
pub fn words(sentence: &str) -> Vec<Token<'_>> {
  WORD
    .find_iter(sentence)
    .map(|m| Token { text: m.as_str(), start: m.start(), end: m.end() })
    .collect()
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, piece: &'a str) {
  let piece = piece.trim();
  if !piece.is_empty() {
    out.push(piece);
  }
}

fn is_real_boundary(text: &str, sentence_start: usize, punct_start: usize, boundary_end: usize) -> bool {
  let punct = &text[punct_start..boundary_end];
  if !punct.starts_with('.') {
    return true;
  }

  // The word right before the period, e.g. "Dr" in "Dr. Smith" or "e.g" in "e.g. this".
  let before = &text[sentence_start..punct_start];
  let last_word = before
    .rsplit(|c: char| c.is_whitespace() || c == '(' || c == '"')
    .next()
    .unwrap_or("");
  let lower = last_word.to_lowercase();

  if ABBREVIATIONS.contains(&lower.as_str()) {
    return false;
  }
  // Single-letter initials: "J. R. R. Tolkien".
  if last_word.chars().count() == 1 && last_word.chars().all(|c| c.is_alphabetic() && c.is_uppercase()) {
    return false;
  }

  // A lowercase continuation is a strong hint the period was not terminal.
  let next = text[boundary_end..].chars().next();
  !matches!(next, Some(c) if c.is_lowercase())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn split_cuts_after_terminal_punctuation() {
    let s = split_sentences("The cat sat on the mat. It was sunny! Was it? Yes");
    assert_eq!(s, vec!["The cat sat on the mat.", "It was sunny!", "Was it?", "Yes"]);
  }

  #[test]
  fn split_needs_whitespace_after_punctuation() {
    assert_eq!(split_sentences("Version 1.5 is out.Really"), vec!["Version 1.5 is out.Really"]);
  }

  #[test]
  fn split_handles_newlines_and_blank_input() {
    assert_eq!(split_sentences("One.\nTwo.\n\n"), vec!["One.", "Two."]);
    assert!(split_sentences("").is_empty());
    assert!(split_sentences("  \n ").is_empty());
  }

  #[test]
  fn tokenizer_skips_abbreviations_and_initials() {
    let s = tokenize_sentences("Dr. Smith met J. Doe at 5 p.m. today. They talked, e.g. about tea. Fine.");
    assert_eq!(s, vec!["Dr. Smith met J. Doe at 5 p.m. today.", "They talked, e.g. about tea.", "Fine."]);
  }

  #[test]
  fn tokenizer_keeps_closing_quotes() {
    let s = tokenize_sentences("He said \"stop.\" Then he left.");
    assert_eq!(s, vec!["He said \"stop.\"", "Then he left."]);
  }

  #[test]
  fn tokenizer_keeps_decimals_and_trailing_fragment() {
    let s = tokenize_sentences("Pi is 3.14 roughly. No period here");
    assert_eq!(s, vec!["Pi is 3.14 roughly.", "No period here"]);
  }

  #[test]
  fn words_report_spans() {
    let w = words("Hi, big world");
    assert_eq!(w.len(), 3);
    assert_eq!(w[2].text, "world");
    assert_eq!(&"Hi, big world"[w[1].start..w[1].end], "big");
  }
}
