//! Text loading: an uploaded PDF or plain-text file, or pasted text.
//!
//! A file that yields text wins over pasted text. PDF pages with no
//! extractable text contribute an empty string rather than failing the
//! document.

use tracing::{debug, info, instrument, warn};

use crate::domain::{Document, DocumentSource};
use crate::error::{AppError, AppResult};

const UTF8_BOM: &str = "\u{feff}";

/// An uploaded file as received from the client.
#[derive(Clone, Debug, Default)]
pub struct UploadedFile {
  pub file_name: Option<String>,
  pub content_type: Option<String>,
  pub bytes: Vec<u8>,
}

/// Both possible inputs of one request.
#[derive(Clone, Debug, Default)]
pub struct TextSource {
  pub file: Option<UploadedFile>,
  pub pasted: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FileKind {
  Pdf,
  PlainText,
}

fn file_kind(file: &UploadedFile) -> AppResult<FileKind> {
  let declared = file
    .content_type
    .as_deref()
    .map(|ct| ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
    .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

  match declared.as_deref() {
    Some("application/pdf") => Ok(FileKind::Pdf),
    Some("text/plain") => Ok(FileKind::PlainText),
    Some(other) => Err(AppError::UnsupportedFile(other.to_string())),
    None => {
      let name = file.file_name.as_deref().unwrap_or_default().to_ascii_lowercase();
      if name.ends_with(".pdf") {
        Ok(FileKind::Pdf)
      } else if name.ends_with(".txt") {
        Ok(FileKind::PlainText)
      } else {
        Err(AppError::UnsupportedFile(if name.is_empty() { "unknown".into() } else { name }))
      }
    }
  }
}

/// Strict UTF-8 decoding; a leading byte-order mark is dropped.
pub fn decode_plain_text(bytes: &[u8]) -> AppResult<String> {
  let text = std::str::from_utf8(bytes).map_err(|_| AppError::InvalidUtf8)?;
  Ok(text.strip_prefix(UTF8_BOM).unwrap_or(text).to_string())
}

/// Pages in order, one line break between them.
fn join_pages(pages: &[String]) -> String {
  pages.iter().map(|p| p.trim_end()).collect::<Vec<_>>().join("\n")
}

#[instrument(level = "debug", skip(bytes), fields(len = bytes.len()))]
async fn extract_pdf(bytes: Vec<u8>) -> AppResult<String> {
  // pdf-extract is CPU-bound and can panic on malformed input.
  let joined = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&bytes))
    .await
    .map_err(|e| AppError::Pdf(format!("extractor aborted: {e}")))?;
  let pages = joined.map_err(|e| AppError::Pdf(e.to_string()))?;
  let empty = pages.iter().filter(|p| p.trim().is_empty()).count();
  debug!(target: "smarttext", pages = pages.len(), empty_pages = empty, "PDF pages extracted");
  Ok(join_pages(&pages))
}

async fn read_file(file: UploadedFile) -> AppResult<String> {
  match file_kind(&file)? {
    FileKind::Pdf => extract_pdf(file.bytes).await,
    FileKind::PlainText => decode_plain_text(&file.bytes),
  }
}

/// Load a [`Document`] from whichever source has text; `NoInput` when none does.
#[instrument(level = "info", skip(source), fields(has_file = source.file.is_some(), has_pasted = source.pasted.is_some()))]
pub async fn load_document(source: TextSource) -> AppResult<Document> {
  if let Some(file) = source.file.filter(|f| !f.bytes.is_empty()) {
    let name = file.file_name.clone().unwrap_or_default();
    let text = read_file(file).await?;
    if !text.trim().is_empty() {
      info!(target: "smarttext", file = %name, chars = text.chars().count(), "Loaded uploaded file");
      return Ok(Document { text, source: DocumentSource::File });
    }
    warn!(target: "smarttext", file = %name, "Uploaded file has no extractable text");
  }

  match source.pasted {
    Some(text) if !text.trim().is_empty() => {
      info!(target: "smarttext", chars = text.chars().count(), "Using pasted text");
      Ok(Document { text, source: DocumentSource::Pasted })
    }
    _ => Err(AppError::NoInput),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn upload(name: &str, ct: Option<&str>, bytes: &[u8]) -> UploadedFile {
    UploadedFile { file_name: Some(name.into()), content_type: ct.map(str::to_string), bytes: bytes.to_vec() }
  }

  #[tokio::test]
  async fn file_wins_over_pasted_text() {
    let src = TextSource {
      file: Some(upload("notes.txt", Some("text/plain"), b"From the file.")),
      pasted: Some("From the box.".into()),
    };
    let doc = load_document(src).await.unwrap();
    assert_eq!(doc.text, "From the file.");
    assert_eq!(doc.source, DocumentSource::File);
  }

  #[tokio::test]
  async fn blank_file_falls_back_to_pasted() {
    let src = TextSource {
      file: Some(upload("empty.txt", Some("text/plain"), b"  \n")),
      pasted: Some("Pasted words.".into()),
    };
    let doc = load_document(src).await.unwrap();
    assert_eq!(doc.source, DocumentSource::Pasted);
  }

  #[tokio::test]
  async fn nothing_loaded_is_no_input() {
    assert!(matches!(load_document(TextSource::default()).await, Err(AppError::NoInput)));
    let src = TextSource { file: None, pasted: Some("   ".into()) };
    assert!(matches!(load_document(src).await, Err(AppError::NoInput)));
  }

  #[tokio::test]
  async fn extension_decides_when_type_is_generic() {
    let src = TextSource {
      file: Some(upload("story.TXT", Some("application/octet-stream"), "\u{feff}Once upon a time.".as_bytes())),
      pasted: None,
    };
    assert_eq!(load_document(src).await.unwrap().text, "Once upon a time.");
  }

  #[tokio::test]
  async fn rejects_unsupported_and_invalid_input() {
    let png = TextSource { file: Some(upload("cat.png", Some("image/png"), b"\x89PNG")), pasted: None };
    assert!(matches!(load_document(png).await, Err(AppError::UnsupportedFile(_))));

    let bad = TextSource { file: Some(upload("bad.txt", Some("text/plain; charset=utf-8"), b"\xff\xfe\x00")), pasted: None };
    assert!(matches!(load_document(bad).await, Err(AppError::InvalidUtf8)));
  }

  #[tokio::test]
  async fn malformed_pdf_is_a_pdf_error() {
    let src = TextSource { file: Some(upload("x.pdf", Some("application/pdf"), b"not a pdf at all")), pasted: None };
    assert!(matches!(load_document(src).await, Err(AppError::Pdf(_))));
  }

  /// Minimal PDF with one Helvetica text line per page; an empty string gives a blank page.
  fn tiny_pdf(pages: &[&str]) -> Vec<u8> {
    let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", 4 + 2 * i)).collect();
    let mut objects = vec![
      "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
      format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), pages.len()),
      "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
    ];
    for (i, text) in pages.iter().enumerate() {
      let content = if text.is_empty() { String::new() } else { format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET") };
      objects.push(format!(
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
        5 + 2 * i
      ));
      objects.push(format!("<< /Length {} >>\nstream\n{}\nendstream", content.len(), content));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
      offsets.push(out.len());
      out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }
    let xref_at = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for off in offsets {
      xref.push_str(&format!("{off:010} 00000 n \n"));
    }
    xref.push_str(&format!("trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n", objects.len() + 1, xref_at));
    out.extend_from_slice(xref.as_bytes());
    out
  }

  #[tokio::test]
  async fn pdf_pages_are_read_in_order_and_blank_pages_skipped() {
    let pdf = tiny_pdf(&["First page.", "", "Third page."]);
    let src = TextSource { file: Some(upload("three.pdf", Some("application/pdf"), &pdf)), pasted: None };
    let doc = load_document(src).await.unwrap();
    assert_eq!(doc.source, DocumentSource::File);
    let first = doc.text.find("First page.").unwrap();
    let third = doc.text.find("Third page.").unwrap();
    assert!(first < third);
  }

  #[tokio::test]
  async fn pdf_without_text_is_no_input() {
    let pdf = tiny_pdf(&["", ""]);
    let src = TextSource { file: Some(upload("blank.pdf", Some("application/pdf"), &pdf)), pasted: None };
    assert!(matches!(load_document(src).await, Err(AppError::NoInput)));

    let src = TextSource { file: Some(upload("blank.pdf", None, &pdf)), pasted: Some("Typed instead.".into()) };
    assert_eq!(load_document(src).await.unwrap().source, DocumentSource::Pasted);
  }

  #[test]
  fn empty_pages_contribute_nothing_but_keep_order() {
    let pages = vec!["First page. ".to_string(), String::new(), "Third page.".to_string()];
    assert_eq!(join_pages(&pages), "First page.\n\nThird page.");
  }
}
