//! Extractive summarization.
//!
//! [`LexRank`] ranks sentences by centrality in a cosine-similarity graph of
//! TF-IDF vectors (edges kept above a threshold), computed with a damped
//! power method. The top sentences are returned in their original order.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

use crate::text::tokenize_sentences;

pub const DEFAULT_SENTENCES: usize = 5;
pub const MAX_INPUT_SENTENCES: usize = 2000;

static TERM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}']+").unwrap());

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
  [
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
    "it", "its", "of", "on", "that", "the", "to", "was", "will", "with", "this", "but", "they",
    "have", "had", "what", "when", "where", "who", "which", "why", "how", "or", "not", "been",
    "were", "their", "there", "so", "than", "then", "these", "those", "we", "you", "i",
  ]
  .into_iter()
  .collect()
});

pub trait Summarizer: Send + Sync {
  /// At most `sentence_count` sentences of `text`, in original order.
  fn summarize(&self, text: &str, sentence_count: usize) -> Vec<String>;
}

#[derive(Clone, Debug)]
pub struct LexRank {
  /// Cosine similarity an edge needs to survive.
  pub threshold: f64,
  /// Probability of jumping to a random sentence.
  pub damping: f64,
  /// Power-method convergence tolerance.
  pub epsilon: f64,
  pub max_iterations: usize,
}

impl Default for LexRank {
  fn default() -> Self {
    Self { threshold: 0.1, damping: 0.15, epsilon: 1e-6, max_iterations: 200 }
  }
}

fn terms(sentence: &str) -> Vec<String> {
  TERM
    .find_iter(sentence)
    .map(|m| m.as_str().to_lowercase())
    .filter(|w| !STOP_WORDS.contains(w.as_str()))
    .collect()
}

fn cosine(a: &HashMap<&str, f64>, b: &HashMap<&str, f64>) -> f64 {
  let dot: f64 = a.iter().filter_map(|(t, x)| b.get(t).map(|y| x * y)).sum();
  let na: f64 = a.values().map(|x| x * x).sum::<f64>().sqrt();
  let nb: f64 = b.values().map(|x| x * x).sum::<f64>().sqrt();
  if na == 0.0 || nb == 0.0 { 0.0 } else { dot / (na * nb) }
}

impl LexRank {
  /// Centrality score for every sentence (sums to 1 for a non-empty input).
  fn scores(&self, sentences: &[Vec<String>]) -> Vec<f64> {
    let n = sentences.len();
    if n == 0 {
      return vec![];
    }

    let mut df: HashMap<&str, usize> = HashMap::new();
    for s in sentences {
      let uniq: HashSet<&str> = s.iter().map(String::as_str).collect();
      for t in uniq {
        *df.entry(t).or_default() += 1;
      }
    }
    let idf = |t: &str| ((1.0 + n as f64) / (1.0 + df[t] as f64)).ln() + 1.0;

    // tf normalized by the most frequent term of the sentence
    let vectors: Vec<HashMap<&str, f64>> = sentences
      .iter()
      .map(|s| {
        let mut tf: HashMap<&str, f64> = HashMap::new();
        for t in s {
          *tf.entry(t.as_str()).or_default() += 1.0;
        }
        let max = tf.values().cloned().fold(0.0, f64::max);
        tf.into_iter().map(|(t, f)| (t, (f / max) * idf(t))).collect()
      })
      .collect();

    // Thresholded adjacency without self-loops, row-normalized by degree.
    // Isolated sentences spread their weight uniformly.
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
      let mut degree = 0.0;
      for j in 0..n {
        if i != j && cosine(&vectors[i], &vectors[j]) > self.threshold {
          matrix[i][j] = 1.0;
          degree += 1.0;
        }
      }
      for cell in matrix[i].iter_mut() {
        *cell = if degree == 0.0 { 1.0 / n as f64 } else { *cell / degree };
      }
    }

    let teleport = self.damping / n as f64;
    let mut p = vec![1.0 / n as f64; n];
    for _ in 0..self.max_iterations {
      let next: Vec<f64> = (0..n)
        .map(|j| teleport + (1.0 - self.damping) * (0..n).map(|i| matrix[i][j] * p[i]).sum::<f64>())
        .collect();
      let delta: f64 = next.iter().zip(&p).map(|(a, b)| (a - b).abs()).sum();
      p = next;
      if delta < self.epsilon {
        break;
      }
    }
    p
  }
}

impl Summarizer for LexRank {
  #[instrument(level = "debug", skip(self, text), fields(text_len = text.len()))]
  fn summarize(&self, text: &str, sentence_count: usize) -> Vec<String> {
    let sentences = tokenize_sentences(text);
    if sentence_count == 0 || sentences.is_empty() {
      return vec![];
    }
    if sentences.len() <= sentence_count {
      return sentences.into_iter().map(str::to_string).collect();
    }

    let tokenized: Vec<Vec<String>> = sentences.iter().map(|s| terms(s)).collect();
    let scores = self.scores(&tokenized);

    let mut order: Vec<usize> = (0..sentences.len()).collect();
    // Highest score first; earlier sentence wins ties.
    order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(std::cmp::Ordering::Equal).then(a.cmp(&b)));
    let mut chosen: Vec<usize> = order.into_iter().take(sentence_count).collect();
    chosen.sort_unstable();

    debug!(target: "smarttext", total = sentences.len(), kept = chosen.len(), "Summary ranked");
    chosen.into_iter().map(|i| sentences[i].to_string()).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const TEXT: &str = "Solar power converts sunlight into electricity. \
    Solar panels use photovoltaic cells to capture sunlight. \
    My neighbour owns a red bicycle. \
    Electricity from solar panels can be stored in batteries. \
    Batteries store solar electricity for cloudy days. \
    The bakery opens at seven.";

  #[test]
  fn keeps_requested_count_in_original_order() {
    let out = LexRank::default().summarize(TEXT, 3);
    assert_eq!(out.len(), 3);
    let all = tokenize_sentences(TEXT);
    let positions: Vec<usize> = out.iter().map(|s| all.iter().position(|a| *a == s.as_str()).unwrap()).collect();
    let mut sorted = positions.clone();
    sorted.sort();
    assert_eq!(positions, sorted);
  }

  #[test]
  fn central_sentences_beat_outliers() {
    let out = LexRank::default().summarize(TEXT, 3);
    assert!(!out.iter().any(|s| s.contains("bicycle")));
    assert!(!out.iter().any(|s| s.contains("bakery")));
  }

  #[test]
  fn short_text_is_returned_whole() {
    let out = LexRank::default().summarize("Only one sentence here. And a second.", 5);
    assert_eq!(out, vec!["Only one sentence here.", "And a second."]);
  }

  #[test]
  fn empty_text_or_zero_count_gives_nothing() {
    assert!(LexRank::default().summarize("", 5).is_empty());
    assert!(LexRank::default().summarize("Some text.", 0).is_empty());
  }

  #[test]
  fn scores_form_a_distribution() {
    let sents: Vec<Vec<String>> = tokenize_sentences(TEXT).iter().map(|s| terms(s)).collect();
    let s = LexRank::default().scores(&sents);
    let total: f64 = s.iter().sum();
    assert!((total - 1.0).abs() < 1e-6);
  }
}
