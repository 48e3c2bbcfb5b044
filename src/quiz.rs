//! Fill-in-the-blank quiz generation.
//!
//! Each sentence yields at most one question: a candidate word is picked at
//! random and its first occurrence (as a whole word) is replaced by a blank.
//! The random source is passed in so callers decide about determinism.

use rand::{seq::SliceRandom, Rng};
use tracing::{debug, instrument};

use crate::domain::{QuizItem, QuizStrategy};
use crate::text::{tagger, tokenize_sentences, words, Token};

/// Words must be longer than this many characters to become blanks.
const MIN_CHARS_EXCLUSIVE: usize = 3;

pub const DEFAULT_BLANK: &str = "_____";

#[derive(Clone, Debug)]
pub struct QuizOptions {
  pub num_questions: usize,
  pub strategy: QuizStrategy,
  pub blank: String,
}

impl Default for QuizOptions {
  fn default() -> Self {
    Self { num_questions: 5, strategy: QuizStrategy::AnyWord, blank: DEFAULT_BLANK.into() }
  }
}

fn long_enough(t: &Token<'_>) -> bool {
  t.text.chars().count() > MIN_CHARS_EXCLUSIVE
}

fn candidates(sentence: &str, strategy: QuizStrategy) -> Vec<Token<'_>> {
  match strategy {
    QuizStrategy::AnyWord => words(sentence).into_iter().filter(long_enough).collect(),
    QuizStrategy::Nouns => tagger::tag(sentence)
      .into_iter()
      .filter(|(t, tag)| tag.is_noun() && long_enough(t))
      .map(|(t, _)| t)
      .collect(),
  }
}

/// Replace the first whole-word occurrence of `word` in `sentence` by `blank`.
fn mask_first(sentence: &str, word: &str, blank: &str) -> String {
  match words(sentence).into_iter().find(|t| t.text == word) {
    Some(t) => format!("{}{}{}", &sentence[..t.start], blank, &sentence[t.end..]),
    None => sentence.to_string(),
  }
}

/// Generate up to `opts.num_questions` questions, in sentence order.
/// Sentences without candidates are skipped; fewer questions (possibly none)
/// is not an error.
#[instrument(level = "debug", skip(text, rng), fields(text_len = text.len(), n = opts.num_questions, strategy = ?opts.strategy))]
pub fn generate_quiz<R: Rng + ?Sized>(text: &str, opts: &QuizOptions, rng: &mut R) -> Vec<QuizItem> {
  let mut items = Vec::new();
  if opts.num_questions == 0 {
    return items;
  }

  for sentence in tokenize_sentences(text) {
    let cands = candidates(sentence, opts.strategy);
    if let Some(chosen) = cands.choose(rng) {
      items.push(QuizItem {
        question: mask_first(sentence, chosen.text, &opts.blank),
        answer: chosen.text.to_string(),
      });
    }
    if items.len() >= opts.num_questions {
      break;
    }
  }

  debug!(target: "smarttext", questions = items.len(), "Quiz generated");
  items
}

/// Plain-text listing used for `quiz.txt`.
pub fn quiz_listing(items: &[QuizItem]) -> String {
  items
    .iter()
    .enumerate()
    .map(|(i, q)| format!("Q{}: {}\nA: {}", i + 1, q.question, q.answer))
    .collect::<Vec<_>>()
    .join("\n\n")
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;
  use rand::{rngs::StdRng, SeedableRng};

  fn opts(n: usize, strategy: QuizStrategy) -> QuizOptions {
    QuizOptions { num_questions: n, strategy, blank: DEFAULT_BLANK.into() }
  }

  #[test]
  fn one_question_per_usable_sentence_up_to_n() {
    let text = "Rivers carry water to oceans. Mountains block clouds. A cat. Forests store carbon.";
    let mut rng = StdRng::seed_from_u64(7);
    let q = generate_quiz(text, &opts(2, QuizStrategy::AnyWord), &mut rng);
    assert_eq!(q.len(), 2);
    assert!(q[0].question.contains(DEFAULT_BLANK));
    assert_eq!(q[0].question.replace(DEFAULT_BLANK, &q[0].answer), "Rivers carry water to oceans.");
    assert_eq!(q[1].question.replace(DEFAULT_BLANK, &q[1].answer), "Mountains block clouds.");
  }

  #[test]
  fn sentences_without_long_words_are_skipped() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(generate_quiz("The cat sat on a mat.", &opts(5, QuizStrategy::AnyWord), &mut rng).is_empty());
    assert!(generate_quiz("", &opts(5, QuizStrategy::AnyWord), &mut rng).is_empty());
  }

  #[test]
  fn zero_questions_requested_gives_none() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(generate_quiz("Plenty of words here.", &opts(0, QuizStrategy::AnyWord), &mut rng).is_empty());
  }

  #[test]
  fn noun_strategy_only_blanks_nouns() {
    let mut rng = StdRng::seed_from_u64(3);
    let text = "They quickly walked towards the station. Gardens need patience.";
    for _ in 0..20 {
      let q = generate_quiz(text, &opts(5, QuizStrategy::Nouns), &mut rng);
      assert_eq!(q.len(), 2);
      assert_eq!(q[0].answer, "station");
      assert!(["Gardens", "patience"].contains(&q[1].answer.as_str()));
    }
  }

  #[test]
  fn masks_whole_word_not_substring() {
    assert_eq!(mask_first("Then the authentic then", "then", "_"), "Then the authentic _");
    assert_eq!(mask_first("word", "missing", "_"), "word");
  }

  #[test]
  fn same_seed_same_quiz() {
    let text = "Alpha beta gamma delta epsilon. Zeta theta iota kappa lambda.";
    let a = generate_quiz(text, &opts(5, QuizStrategy::AnyWord), &mut StdRng::seed_from_u64(42));
    let b = generate_quiz(text, &opts(5, QuizStrategy::AnyWord), &mut StdRng::seed_from_u64(42));
    assert_eq!(a, b);
  }

  #[test]
  fn listing_numbers_entries_from_one() {
    let items = vec![
      QuizItem { question: "_____ are red.".into(), answer: "Apples".into() },
      QuizItem { question: "Sky is _____.".into(), answer: "blue".into() },
    ];
    assert_eq!(quiz_listing(&items), "Q1: _____ are red.\nA: Apples\n\nQ2: Sky is _____.\nA: blue");
    assert_eq!(quiz_listing(&[]), "");
  }

  proptest! {
    #[test]
    fn never_more_than_n_and_only_the_blank_differs(
      text in "([A-Za-z]{1,8} ){1,8}[A-Za-z]{1,8}[.!?]( ([A-Za-z]{1,8} ){1,8}[A-Za-z]{1,8}[.!?]){0,6}",
      n in 0usize..6,
      seed in any::<u64>(),
    ) {
      let mut rng = StdRng::seed_from_u64(seed);
      let items = generate_quiz(&text, &opts(n, QuizStrategy::AnyWord), &mut rng);
      prop_assert!(items.len() <= n);
      let sentences = tokenize_sentences(&text);
      for item in &items {
        prop_assert!(item.answer.chars().count() > 3);
        let restored = item.question.replacen(DEFAULT_BLANK, &item.answer, 1);
        prop_assert!(sentences.contains(&restored.as_str()));
      }
    }
  }
}
