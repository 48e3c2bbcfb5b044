//! Application state: the configuration plus every service the pipelines need,
//! built once at startup and shared read-only by all requests.
//!
//! Nothing here is mutable; concurrent requests never interact.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::config::{load_app_config_from_env, AppConfig, CloudSpeechProvider, TranslationProvider};
use crate::detect::ScriptDetector;
use crate::openai::OpenAI;
use crate::speech::{GoogleSpeech, LocalSpeech, OpenAiSpeech, SpeechEngine, SpeechRenderer};
use crate::summarize::{LexRank, Summarizer};
use crate::translate::{GoogleTranslator, LanguageNormalizer, OpenAiTranslator, Translator};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub normalizer: LanguageNormalizer,
    pub summarizer: Arc<dyn Summarizer>,
    pub speech: SpeechRenderer,
}

impl AppState {
    /// Build state from env: load config, init OpenAI, pick translation and speech backends.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = load_app_config_from_env();

        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "smarttext", base_url = %oa.base_url, fast_model = %oa.fast_model, tts_model = %oa.tts_model, "OpenAI enabled.");
        } else {
            info!(target: "smarttext", "OpenAI disabled (no OPENAI_API_KEY).");
        }

        let chunk_chars = config.translation.chunk_chars;
        let translator: Option<Arc<dyn Translator>> = match config.translation.provider {
            TranslationProvider::Google => match GoogleTranslator::new(chunk_chars) {
                Ok(t) => Some(Arc::new(t)),
                Err(e) => {
                    error!(target: "smarttext", error = %e, "Failed to build Google translator; translation disabled");
                    None
                }
            },
            TranslationProvider::Openai => match &openai {
                Some(oa) => Some(Arc::new(OpenAiTranslator::new(oa.clone(), config.prompts.clone(), chunk_chars))),
                None => {
                    warn!(target: "smarttext", "translation.provider = openai but OPENAI_API_KEY is not set; translation disabled");
                    None
                }
            },
            TranslationProvider::None => None,
        };
        info!(target: "smarttext", provider = ?config.translation.provider, enabled = translator.is_some(), "Translation backend");

        let out_dir = config.speech.output_dir();
        let cloud: Option<Arc<dyn SpeechEngine>> = match config.speech.cloud_provider {
            CloudSpeechProvider::Google => match GoogleSpeech::new(out_dir.clone()) {
                Ok(s) => Some(Arc::new(s)),
                Err(e) => {
                    error!(target: "smarttext", error = %e, "Failed to build Google TTS client; cloud speech disabled");
                    None
                }
            },
            CloudSpeechProvider::Openai => match &openai {
                Some(oa) => Some(Arc::new(OpenAiSpeech::new(oa.clone(), config.speech.openai_voice.clone(), out_dir.clone()))),
                None => {
                    warn!(target: "smarttext", "speech.cloud_provider = openai but OPENAI_API_KEY is not set; cloud speech disabled");
                    None
                }
            },
        };
        let local: Arc<dyn SpeechEngine> = Arc::new(LocalSpeech::new(
            config.speech.local_command.clone(),
            config.speech.local_rate,
            out_dir.clone(),
        ));
        info!(target: "smarttext", cloud = ?config.speech.cloud_provider, cloud_enabled = cloud.is_some(), local = ?config.speech.local_command, out_dir = %out_dir.display(), "Speech backends");

        Self::with_services(
            config,
            LanguageNormalizer::new(Arc::new(ScriptDetector), translator),
            Arc::new(LexRank::default()),
            SpeechRenderer::new(cloud, local),
        )
    }

    /// Assemble state from explicitly constructed services.
    pub fn with_services(
        config: AppConfig,
        normalizer: LanguageNormalizer,
        summarizer: Arc<dyn Summarizer>,
        speech: SpeechRenderer,
    ) -> Self {
        Self { config, normalizer, summarizer, speech }
    }
}
