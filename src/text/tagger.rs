//! Lightweight rule-based part-of-speech tagger for English.
//!
//! Closed-class words come from small lexicons; open-class words are guessed
//! from suffixes and the previous tag. Unknown words default to nouns, which
//! is the most frequent open class. Good enough to pick quiz blanks, not a
//! linguistic tool.

use super::{words, Token};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
  Noun,
  ProperNoun,
  Verb,
  Adjective,
  Adverb,
  Determiner,
  Pronoun,
  Preposition,
  Conjunction,
  Number,
}

impl Tag {
  pub fn is_noun(self) -> bool {
    matches!(self, Tag::Noun | Tag::ProperNoun)
  }
}

const DETERMINERS: &[&str] = &[
  "a", "an", "the", "this", "that", "these", "those", "each", "every", "some", "any", "no",
  "my", "your", "his", "her", "its", "our", "their", "all", "both", "either", "neither",
  "another", "such", "much", "many", "few", "several",
];

const PRONOUNS: &[&str] = &[
  "i", "you", "he", "she", "it", "we", "they", "me", "him", "us", "them", "myself",
  "yourself", "himself", "herself", "itself", "ourselves", "themselves", "who", "whom",
  "whose", "which", "what", "mine", "yours", "hers", "ours", "theirs", "someone", "anyone",
  "everyone", "nobody", "something", "anything", "everything", "nothing",
];

const PREPOSITIONS: &[&str] = &[
  "in", "on", "at", "by", "for", "with", "about", "against", "between", "into", "through",
  "during", "before", "after", "above", "below", "to", "from", "up", "down", "of", "off",
  "over", "under", "across", "along", "around", "behind", "beside", "beyond", "near",
  "toward", "towards", "upon", "within", "without", "among", "throughout", "despite", "via",
];

const CONJUNCTIONS: &[&str] = &[
  "and", "or", "but", "nor", "so", "yet", "because", "although", "though", "while", "if",
  "unless", "since", "whereas", "whether", "than", "when", "where", "how", "why",
];

const VERBS: &[&str] = &[
  "is", "are", "was", "were", "be", "been", "being", "am", "have", "has", "had", "do",
  "does", "did", "can", "could", "will", "would", "shall", "should", "may", "might", "must",
  "said", "says", "made", "make", "makes", "went", "go", "goes", "get", "got", "gets",
  "took", "take", "takes", "came", "come", "comes", "know", "knew", "knows", "think",
  "thought", "see", "saw", "seen", "gave", "give", "gives", "found", "find", "finds", "sat",
  "became", "become", "becomes", "began", "begin", "begins", "left", "felt", "kept", "held",
  "brought", "told", "ran", "run", "runs", "wrote", "written", "grew", "grown", "shows",
  "showed", "shown", "seems", "seemed", "includes", "included", "contains", "contained",
  "need", "needs", "needed", "want", "wants", "wanted", "use", "uses", "used", "help", "helps",
];

const MODALS_AND_INFINITIVE: &[&str] = &[
  "to", "can", "could", "will", "would", "shall", "should", "may", "might", "must", "did",
  "does", "do",
];

const ADVERBS: &[&str] = &[
  "not", "very", "also", "just", "only", "then", "there", "here", "now", "often", "always",
  "never", "sometimes", "soon", "already", "still", "again", "too", "quite", "almost",
  "even", "ever", "well", "however", "therefore", "perhaps", "rather",
];

const SUBJECT_PRONOUNS: &[&str] = &["i", "you", "he", "she", "it", "we", "they"];

const NOUN_SUFFIXES: &[&str] = &[
  "tion", "sion", "ment", "ness", "ity", "ism", "ship", "ance", "ence", "hood", "dom", "ist",
  "ure", "age", "ery",
];
const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "less", "ical", "ish", "ent", "ant"];

/// Tag every word token of `sentence`, keeping byte spans.
pub fn tag(sentence: &str) -> Vec<(Token<'_>, Tag)> {
  let mut out: Vec<(Token<'_>, Tag)> = Vec::new();
  for (i, tok) in words(sentence).into_iter().enumerate() {
    let prev = out.last().map(|(t, tag)| (t.text.to_lowercase(), *tag));
    let tag = tag_word(tok.text, i == 0, prev.as_ref().map(|(w, t)| (w.as_str(), *t)));
    out.push((tok, tag));
  }
  out
}

fn tag_word(word: &str, sentence_initial: bool, prev: Option<(&str, Tag)>) -> Tag {
  if word.chars().all(|c| c.is_ascii_digit()) {
    return Tag::Number;
  }
  let lower = word.to_lowercase();
  let w = lower.as_str();

  if DETERMINERS.contains(&w) { return Tag::Determiner; }
  if PRONOUNS.contains(&w) { return Tag::Pronoun; }
  if PREPOSITIONS.contains(&w) { return Tag::Preposition; }
  if CONJUNCTIONS.contains(&w) { return Tag::Conjunction; }
  if VERBS.contains(&w) { return Tag::Verb; }
  if ADVERBS.contains(&w) { return Tag::Adverb; }

  let starts_upper = word.chars().next().map(char::is_uppercase).unwrap_or(false);
  if starts_upper && !sentence_initial {
    return Tag::ProperNoun;
  }

  let after_determiner = matches!(prev, Some((_, Tag::Determiner | Tag::Adjective)));
  let after_verb_trigger = matches!(
    prev,
    Some((p, _)) if MODALS_AND_INFINITIVE.contains(&p) || SUBJECT_PRONOUNS.contains(&p)
  );

  if w.len() > 3 && w.ends_with("ly") {
    return Tag::Adverb;
  }
  if NOUN_SUFFIXES.iter().any(|s| w.len() > s.len() + 1 && w.ends_with(s)) {
    return Tag::Noun;
  }
  if ADJECTIVE_SUFFIXES.iter().any(|s| w.len() > s.len() + 2 && w.ends_with(s)) {
    return Tag::Adjective;
  }
  if (w.ends_with("ing") || w.ends_with("ed")) && w.len() > 4 && !after_determiner {
    return Tag::Verb;
  }
  if after_verb_trigger {
    return Tag::Verb;
  }
  Tag::Noun
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tags(s: &str) -> Vec<(&str, Tag)> {
    tag(s).into_iter().map(|(t, g)| (t.text, g)).collect()
  }

  #[test]
  fn tags_a_simple_sentence() {
    let t = tags("The cat sat on the mat.");
    assert_eq!(
      t,
      vec![
        ("The", Tag::Determiner),
        ("cat", Tag::Noun),
        ("sat", Tag::Verb),
        ("on", Tag::Preposition),
        ("the", Tag::Determiner),
        ("mat", Tag::Noun),
      ]
    );
  }

  #[test]
  fn suffixes_and_context_guide_open_classes() {
    let t = tags("They quickly walked to the famous station in Paris");
    let get = |w: &str| t.iter().find(|(x, _)| *x == w).map(|(_, g)| *g);
    assert_eq!(get("quickly"), Some(Tag::Adverb));
    assert_eq!(get("walked"), Some(Tag::Verb));
    assert_eq!(get("famous"), Some(Tag::Adjective));
    assert_eq!(get("station"), Some(Tag::Noun));
    assert_eq!(get("Paris"), Some(Tag::ProperNoun));
  }

  #[test]
  fn modals_make_the_next_word_a_verb() {
    let t = tags("We should plant trees");
    assert_eq!(t[2], ("plant", Tag::Verb));
    assert_eq!(t[3], ("trees", Tag::Noun));
  }

  #[test]
  fn numbers_and_nouns_after_determiners() {
    let t = tags("In 1999 the building opened");
    assert_eq!(t[1].1, Tag::Number);
    assert_eq!(t[3], ("building", Tag::Noun));
    assert!(Tag::ProperNoun.is_noun());
    assert!(!Tag::Verb.is_noun());
  }
}
