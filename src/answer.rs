//! Keyword-overlap answer finder.
//!
//! The "answer" is the sentence of the text that contains the most question
//! keywords. It is a relevance heuristic, not question answering: the chosen
//! sentence is always copied from the text, never generated.

use tracing::{debug, instrument};

use crate::text::split_sentences;

pub const NO_ANSWER: &str = "Sorry, I couldn't find an answer.";

/// Question keywords: whitespace-delimited tokens, edge punctuation stripped,
/// case-folded, longer than two characters. Duplicates are kept and count twice.
pub fn keywords(question: &str) -> Vec<String> {
  question
    .split_whitespace()
    .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
    .filter(|t| t.chars().count() > 2)
    .collect()
}

fn score(sentence: &str, keywords: &[String]) -> usize {
  let lower = sentence.to_lowercase();
  keywords.iter().filter(|k| lower.contains(k.as_str())).count()
}

/// Best-scoring sentence of `text` for `question`; the earliest sentence wins
/// ties. Falls back to [`NO_ANSWER`] when the text has no sentences.
#[instrument(level = "debug", skip(text, question), fields(text_len = text.len(), question_len = question.len()))]
pub fn find_answer<'a>(text: &'a str, question: &str) -> &'a str {
  let sentences = split_sentences(text);
  let keys = keywords(question);

  let mut best: Option<(&'a str, usize)> = None;
  for s in sentences.iter().copied() {
    let sc = score(s, &keys);
    match best {
      Some((_, b)) if sc <= b => {}
      _ => best = Some((s, sc)),
    }
  }

  debug!(target: "smarttext", sentences = sentences.len(), keywords = keys.len(), best_score = best.map(|(_, s)| s), "Answer ranked");
  best.map(|(s, _)| s).unwrap_or(NO_ANSWER)
}
