//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// True if unicode char belongs to the CJK unified ideograph ranges.
pub fn is_cjk(ch: char) -> bool {
  ('\u{4E00}'..='\u{9FFF}').contains(&ch)
    || ('\u{3400}'..='\u{4DBF}').contains(&ch)
    || ('\u{20000}'..='\u{2A6DF}').contains(&ch)
    || ('\u{2A700}'..='\u{2CEAF}').contains(&ch)
    || ('\u{F900}'..='\u{FAFF}').contains(&ch)
}

/// First `max_chars` characters of `text`, with "..." appended when cut.
pub fn preview(text: &str, max_chars: usize) -> (String, bool) {
  match text.char_indices().nth(max_chars) {
    Some((idx, _)) => (format!("{}...", &text[..idx]), true),
    None => (text.to_string(), false),
  }
}

/// Split `text` into pieces of at most `max_chars` characters, preferring to
/// cut after sentence punctuation, then at whitespace. A single word longer
/// than `max_chars` is hard-split.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
  let max_chars = max_chars.max(1);
  let mut chunks = Vec::new();
  let mut rest = text.trim();

  while !rest.is_empty() {
    if rest.chars().count() <= max_chars {
      chunks.push(rest.to_string());
      break;
    }
    // Byte offset just past the `max_chars`-th character.
    let limit = rest.char_indices().nth(max_chars).map(|(i, _)| i).unwrap_or(rest.len());
    let window = &rest[..limit];

    let cut = window
      .rfind(|c: char| matches!(c, '.' | '!' | '?' | '。' | '！' | '？'))
      .map(|i| i + window[i..].chars().next().map(char::len_utf8).unwrap_or(1))
      .filter(|&i| i > 0)
      .or_else(|| window.rfind(char::is_whitespace).filter(|&i| i > 0))
      .unwrap_or(limit);

    let (head, tail) = rest.split_at(cut);
    let head = head.trim();
    if !head.is_empty() {
      chunks.push(head.to_string());
    }
    rest = tail.trim_start();
  }

  chunks
}

/// Log-safe truncation for large strings.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  let (p, cut) = preview(s, max);
  if cut { format!("{} ({} bytes total)", p, s.len()) } else { p }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_keys() {
    assert_eq!(fill_template("to {language}!", &[("language", "Hindi")]), "to Hindi!");
  }

  #[test]
  fn preview_appends_ellipsis_only_when_cut() {
    assert_eq!(preview("hello", 10), ("hello".to_string(), false));
    assert_eq!(preview("héllo world", 5), ("héllo...".to_string(), true));
  }

  #[test]
  fn chunk_text_prefers_sentence_boundaries() {
    let chunks = chunk_text("One two. Three four five.", 12);
    assert_eq!(chunks, vec!["One two.", "Three four", "five."]);
  }

  #[test]
  fn chunk_text_respects_limit_and_keeps_words() {
    let text = "alpha beta gamma delta epsilon zeta eta theta";
    let chunks = chunk_text(text, 11);
    assert!(chunks.iter().all(|c| c.chars().count() <= 11));
    assert_eq!(chunks.join(" "), text);
  }

  #[test]
  fn chunk_text_hard_splits_long_words() {
    let chunks = chunk_text("abcdefghij", 4);
    assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
  }

  #[test]
  fn chunk_text_of_blank_is_empty() {
    assert!(chunk_text("   ", 10).is_empty());
  }

  #[test]
  fn trunc_for_log_mentions_size() {
    assert_eq!(trunc_for_log("abcdef", 3), "abc... (6 bytes total)");
  }
}
