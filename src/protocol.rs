//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::domain::{DocumentSource, Language, QuizItem, TtsMode};
use crate::error::{AppError, AppResult};
use crate::logic::{LoadResult, OutputOptions, QuizResult, Rendered, SpokenAudio};

/// Output selection shared by every action (JSON, multipart and WebSocket).
#[derive(Debug, Default, Deserialize)]
pub struct OutputIn {
    /// Display name or code; English when absent.
    #[serde(default)]
    pub language: Option<String>,
    /// "cloud" (default) or "local".
    #[serde(default)]
    pub tts_mode: Option<String>,
    #[serde(default)]
    pub voice: bool,
}

impl OutputIn {
    pub fn resolve(&self) -> AppResult<OutputOptions> {
        let language = match self.language.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(l) => Language::lookup(l).ok_or_else(|| AppError::UnknownLanguage(l.to_string()))?,
            None => Language::default(),
        };
        let tts_mode = match self.tts_mode.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(m) => TtsMode::parse(m).ok_or_else(|| AppError::Validation(format!("Unknown TTS mode: {m}")))?,
            None => TtsMode::default(),
        };
        Ok(OutputOptions { language, tts_mode, voice: self.voice })
    }
}

/// Turns an action response into a file attachment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Download {
    Text,
    Audio,
}

impl Download {
    pub fn parse(s: &str) -> AppResult<Option<Download>> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(None),
            "text" | "txt" => Ok(Some(Download::Text)),
            "audio" | "mp3" => Ok(Some(Download::Audio)),
            other => Err(AppError::Validation(format!("Unknown download kind: {other}"))),
        }
    }
}

/// JSON body of the action endpoints (multipart forms use the same names plus `file`).
#[derive(Debug, Default, Deserialize)]
pub struct ActionIn {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(flatten)]
    pub output: OutputIn,
    #[serde(default)]
    pub download: Option<Download>,
}

/// Messages the client can send over WebSocket. Text is always pasted text.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Languages,
    Load {
        text: String,
    },
    Answer {
        text: String,
        question: String,
        #[serde(flatten)]
        output: OutputIn,
    },
    Summary {
        text: String,
        #[serde(flatten)]
        output: OutputIn,
    },
    Quiz {
        text: String,
        #[serde(flatten)]
        output: OutputIn,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Languages {
        languages: Vec<LanguageOut>,
    },
    Loaded {
        load: LoadOut,
    },
    Answer {
        answer: AnswerOut,
    },
    /// The answer action was sent without a question.
    NoQuestion,
    Summary {
        summary: SummaryOut,
    },
    Quiz {
        quiz: QuizOut,
    },
    Error {
        error: &'static str,
        message: String,
    },
}

impl From<AppError> for ServerWsMessage {
    fn from(e: AppError) -> Self {
        ServerWsMessage::Error { error: e.kind(), message: e.to_string() }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
    /// False when no translator is configured: only English input and output work.
    pub translation: bool,
}

#[derive(Debug, Serialize)]
pub struct LanguageOut {
    pub name: &'static str,
    pub code: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LanguagesOut {
    pub languages: Vec<LanguageOut>,
}

pub fn language_table() -> Vec<LanguageOut> {
    Language::ALL.iter().map(|l| LanguageOut { name: l.name(), code: l.code() }).collect()
}

#[derive(Debug, Serialize)]
pub struct LoadOut {
    pub chars: usize,
    pub preview: String,
    pub truncated: bool,
    pub detected: Option<&'static str>,
    pub source: DocumentSource,
}

impl From<LoadResult> for LoadOut {
    fn from(r: LoadResult) -> Self {
        LoadOut { chars: r.chars, preview: r.preview, truncated: r.truncated, detected: r.detected, source: r.source }
    }
}

#[derive(Debug, Serialize)]
pub struct AudioOut {
    pub file_name: String,
    pub mime: &'static str,
    pub base64: String,
}

pub fn audio_out(stem: &str, audio: &SpokenAudio) -> AudioOut {
    AudioOut {
        file_name: format!("{}.{}", stem, audio.extension),
        mime: audio.mime,
        base64: STANDARD.encode(&audio.bytes),
    }
}

#[derive(Debug, Serialize)]
pub struct AnswerOut {
    pub answer: String,
    pub language: Language,
    pub detected: Option<&'static str>,
    pub file_name: &'static str,
    pub audio: Option<AudioOut>,
}

pub fn answer_out(r: &Rendered, language: Language) -> AnswerOut {
    AnswerOut {
        answer: r.text.clone(),
        language,
        detected: r.detected,
        file_name: "answer.txt",
        audio: r.audio.as_ref().map(|a| audio_out("answer", a)),
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryOut {
    pub summary: String,
    pub language: Language,
    pub detected: Option<&'static str>,
    pub file_name: &'static str,
    pub audio: Option<AudioOut>,
}

pub fn summary_out(r: &Rendered, language: Language) -> SummaryOut {
    SummaryOut {
        summary: r.text.clone(),
        language,
        detected: r.detected,
        file_name: "summary.txt",
        audio: r.audio.as_ref().map(|a| audio_out("summary", a)),
    }
}

#[derive(Debug, Serialize)]
pub struct QuizOut {
    pub items: Vec<QuizItem>,
    pub listing: String,
    pub language: Language,
    pub detected: Option<&'static str>,
    pub file_name: &'static str,
    /// Spoken questions, in item order.
    pub audio: Vec<AudioOut>,
}

pub fn quiz_out(r: &QuizResult, language: Language) -> QuizOut {
    QuizOut {
        items: r.items.clone(),
        listing: r.listing.clone(),
        language,
        detected: r.detected,
        file_name: "quiz.txt",
        audio: r
            .audio
            .iter()
            .enumerate()
            .map(|(i, a)| audio_out(&format!("quiz_q{}", i + 1), a))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_messages_parse_with_flattened_options() {
        let msg: ClientWsMessage = serde_json::from_str(
            r#"{"type":"answer","text":"A cat.","question":"cat?","language":"Hindi","tts_mode":"local","voice":true}"#,
        )
        .unwrap();
        match msg {
            ClientWsMessage::Answer { question, output, .. } => {
                assert_eq!(question, "cat?");
                let opts = output.resolve().unwrap();
                assert_eq!(opts.language, Language::Hindi);
                assert_eq!(opts.tts_mode, TtsMode::Local);
                assert!(opts.voice);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn output_defaults_and_rejections() {
        let opts = OutputIn::default().resolve().unwrap();
        assert_eq!(opts.language, Language::English);
        assert_eq!(opts.tts_mode, TtsMode::Cloud);
        assert!(!opts.voice);

        let bad = OutputIn { language: Some("Klingon".into()), ..Default::default() };
        assert!(matches!(bad.resolve(), Err(AppError::UnknownLanguage(_))));
    }

    #[test]
    fn audio_file_name_follows_extension() {
        let a = SpokenAudio { bytes: b"abc".to_vec(), mime: "audio/wav", extension: "wav" };
        let out = audio_out("answer", &a);
        assert_eq!(out.file_name, "answer.wav");
        assert_eq!(out.base64, "YWJj");
    }

    #[test]
    fn errors_become_ws_error_messages() {
        let json = serde_json::to_value(ServerWsMessage::from(AppError::NoInput)).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["error"], "no_input");
    }

    #[test]
    fn download_kinds() {
        assert_eq!(Download::parse("Audio").unwrap(), Some(Download::Audio));
        assert_eq!(Download::parse("").unwrap(), None);
        assert!(Download::parse("video").is_err());
    }
}
