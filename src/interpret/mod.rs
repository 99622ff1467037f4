//! Chart interpretation: turn a page or figure image into a text answer.
//!
//! The core pipeline never calls an interpreter. It is a separate,
//! pluggable step that takes an image path (typically one of the rendered
//! `page_<n>.jpg` files) and returns whatever the model says about it.
//!
//! ## Profiles
//!
//! | Kind | temperature | top_p | frequency penalty | max tokens |
//! |------|-------------|-------|-------------------|------------|
//! | [`InterpreterKind::Captioning`] | 0.8 | 0.6 | 0.6 | 80 |
//! | [`InterpreterKind::DocumentQa`] | 0.0 | – | – | 512 |
//!
//! ## Example
//! ```rust,no_run
//! use edgequake_pdfsplit::interpret::{interpreter_from_config, InterpreterConfig, InterpreterKind};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = InterpreterConfig::builder()
//!     .kind(InterpreterKind::DocumentQa)
//!     .provider_name("openai")
//!     .model("gpt-4.1-nano")
//!     .build()?;
//! let interpreter = interpreter_from_config(&config)?;
//! let answer = interpreter.interpret(Path::new("output/pages_as_images/page_3.jpg"))?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

pub mod encode;
pub mod prompts;

use crate::error::PdfSplitError;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tracing::{debug, info};

/// Default model when a provider is named without one.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Default per-call API timeout in seconds.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 60;

/// Anything that can answer a question about an image.
pub trait ChartInterpreter: Send + Sync {
    /// Interpret the image at `image_path` and return the answer text.
    ///
    /// An empty answer is a valid result.
    fn interpret(&self, image_path: &Path) -> Result<String, PdfSplitError>;
}

/// Run `interpreter` over each image in order.
///
/// Stops at the first failure.
pub fn interpret_all(
    interpreter: &dyn ChartInterpreter,
    image_paths: &[PathBuf],
) -> Result<Vec<(PathBuf, String)>, PdfSplitError> {
    image_paths
        .iter()
        .map(|path| Ok((path.clone(), interpreter.interpret(path)?)))
        .collect()
}

/// Generation profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpreterKind {
    /// Short free-form description, sampled with a repetition penalty.
    #[default]
    Captioning,
    /// Greedy question answering over the image.
    DocumentQa,
}

impl InterpreterKind {
    /// Completion options for this profile.
    pub fn options(self) -> CompletionOptions {
        match self {
            InterpreterKind::Captioning => CompletionOptions {
                temperature: Some(0.8),
                top_p: Some(0.6),
                // A multiplicative repetition penalty of 1.6 has no direct
                // equivalent on chat APIs; 0.6 is its additive counterpart.
                frequency_penalty: Some(0.6),
                max_tokens: Some(80),
                ..Default::default()
            },
            InterpreterKind::DocumentQa => CompletionOptions {
                temperature: Some(0.0),
                max_tokens: Some(512),
                ..Default::default()
            },
        }
    }

    /// System prompt used when the config does not override it.
    pub fn default_system_prompt(self) -> &'static str {
        match self {
            InterpreterKind::Captioning => prompts::CAPTION_SYSTEM_PROMPT,
            InterpreterKind::DocumentQa => prompts::DOCQA_SYSTEM_PROMPT,
        }
    }
}

impl fmt::Display for InterpreterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpreterKind::Captioning => write!(f, "captioning"),
            InterpreterKind::DocumentQa => write!(f, "docqa"),
        }
    }
}

impl FromStr for InterpreterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "captioning" | "caption" => Ok(InterpreterKind::Captioning),
            "docqa" | "document-qa" | "document_qa" => Ok(InterpreterKind::DocumentQa),
            other => Err(format!(
                "unknown interpreter '{other}' (expected 'captioning' or 'docqa')"
            )),
        }
    }
}

/// Configuration for [`interpreter_from_config`].
#[derive(Clone)]
pub struct InterpreterConfig {
    /// Generation profile. Default: captioning.
    pub kind: InterpreterKind,

    /// Question sent with every image. Default: [`prompts::CHART_QUESTION`].
    pub question: String,

    /// System prompt override. `None` uses the profile's default.
    pub system_prompt: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Model name. Default: provider default, or `gpt-4.1-nano` when a
    /// provider is named.
    pub model: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Per-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            kind: InterpreterKind::default(),
            question: prompts::CHART_QUESTION.to_string(),
            system_prompt: None,
            provider_name: None,
            model: None,
            provider: None,
            api_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for InterpreterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterpreterConfig")
            .field("kind", &self.kind)
            .field("question", &self.question)
            .field("system_prompt", &self.system_prompt.as_ref().map(|_| "<custom>"))
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl InterpreterConfig {
    pub fn builder() -> InterpreterConfigBuilder {
        InterpreterConfigBuilder::default()
    }
}

/// Builder for [`InterpreterConfig`].
#[derive(Default)]
pub struct InterpreterConfigBuilder {
    config: InterpreterConfig,
}

impl InterpreterConfigBuilder {
    pub fn kind(mut self, kind: InterpreterKind) -> Self {
        self.config.kind = kind;
        self
    }

    pub fn question(mut self, question: impl Into<String>) -> Self {
        self.config.question = question.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<InterpreterConfig, PdfSplitError> {
        if self.config.question.trim().is_empty() {
            return Err(PdfSplitError::InvalidConfig(
                "question must not be empty".to_string(),
            ));
        }
        if self.config.api_timeout_secs == 0 {
            return Err(PdfSplitError::InvalidConfig(
                "api_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(self.config)
    }
}

/// Build the interpreter described by `config`.
///
/// The provider is resolved here, once; every later call reuses it.
pub fn interpreter_from_config(
    config: &InterpreterConfig,
) -> Result<Box<dyn ChartInterpreter>, PdfSplitError> {
    let provider = resolve_provider(config)?;
    Ok(Box::new(VlmChartInterpreter::new(provider, config)?))
}

/// Chart interpreter backed by a vision-capable LLM.
///
/// Owns a current-thread tokio runtime that drives the async provider call.
/// Calling [`ChartInterpreter::interpret`] from inside another tokio runtime
/// returns an error instead of blocking it.
pub struct VlmChartInterpreter {
    provider: Arc<dyn LLMProvider>,
    kind: InterpreterKind,
    question: String,
    system_prompt: String,
    timeout: Duration,
    runtime: Runtime,
}

impl VlmChartInterpreter {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        config: &InterpreterConfig,
    ) -> Result<Self, PdfSplitError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PdfSplitError::Internal(format!("Failed to start tokio runtime: {e}")))?;

        Ok(Self {
            provider,
            kind: config.kind,
            question: config.question.clone(),
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| config.kind.default_system_prompt().to_string()),
            timeout: Duration::from_secs(config.api_timeout_secs),
            runtime,
        })
    }

    pub fn kind(&self) -> InterpreterKind {
        self.kind
    }
}

impl ChartInterpreter for VlmChartInterpreter {
    fn interpret(&self, image_path: &Path) -> Result<String, PdfSplitError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(PdfSplitError::Internal(
                "VlmChartInterpreter cannot be called from inside a tokio runtime".to_string(),
            ));
        }

        let image = encode::load_image_data(image_path)?;
        let messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user_with_images(self.question.as_str(), vec![image]),
        ];
        let options = self.kind.options();

        let start = Instant::now();
        let response = self
            .runtime
            .block_on(async {
                tokio::time::timeout(self.timeout, self.provider.chat(&messages, Some(&options)))
                    .await
            })
            .map_err(|_| PdfSplitError::ApiTimeout {
                path: image_path.to_path_buf(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|e| PdfSplitError::LlmApiError {
                message: format!("{}", e),
            })?;

        debug!(
            "{}: {} input tokens, {} output tokens, {:?}",
            image_path.display(),
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        Ok(response.content.trim().to_string())
    }
}

fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, PdfSplitError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        PdfSplitError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider + model** (`config.provider_name`). The factory reads
///    the matching API key from the environment.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`),
///    honoured only when both are set.
/// 4. **`OPENAI_API_KEY`** present: OpenAI with the configured model.
/// 5. **Full auto-detection** via [`ProviderFactory::from_env`].
pub fn resolve_provider(config: &InterpreterConfig) -> Result<Arc<dyn LLMProvider>, PdfSplitError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        info!("Using provider {} / {}", name, model);
        return create_vision_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            info!("Using provider {} / {} from environment", prov, model);
            return create_vision_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_vision_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| PdfSplitError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers from a fixed list and counts calls.
    struct ScriptedInterpreter {
        answers: Vec<&'static str>,
        calls: AtomicUsize,
    }

    impl ChartInterpreter for ScriptedInterpreter {
        fn interpret(&self, image_path: &Path) -> Result<String, PdfSplitError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.answers.get(n) {
                Some(answer) => Ok(answer.to_string()),
                None => Err(PdfSplitError::ImageLoadFailed {
                    path: image_path.to_path_buf(),
                    detail: "no scripted answer".to_string(),
                }),
            }
        }
    }

    #[test]
    fn captioning_profile_samples_with_penalty() {
        let opts = InterpreterKind::Captioning.options();
        assert_eq!(opts.temperature, Some(0.8));
        assert_eq!(opts.top_p, Some(0.6));
        assert_eq!(opts.frequency_penalty, Some(0.6));
        assert_eq!(opts.max_tokens, Some(80));
    }

    #[test]
    fn docqa_profile_is_greedy() {
        let opts = InterpreterKind::DocumentQa.options();
        assert_eq!(opts.temperature, Some(0.0));
        assert_eq!(opts.max_tokens, Some(512));
        assert_eq!(opts.top_p, None);
        assert_eq!(opts.frequency_penalty, None);
    }

    #[test]
    fn kind_parses_from_cli_names() {
        assert_eq!("captioning".parse::<InterpreterKind>(), Ok(InterpreterKind::Captioning));
        assert_eq!("DocQA".parse::<InterpreterKind>(), Ok(InterpreterKind::DocumentQa));
        assert_eq!("document-qa".parse::<InterpreterKind>(), Ok(InterpreterKind::DocumentQa));
        assert!("ocr".parse::<InterpreterKind>().is_err());
        assert_eq!(InterpreterKind::DocumentQa.to_string(), "docqa");
    }

    #[test]
    fn default_config_asks_the_chart_question() {
        let config = InterpreterConfig::default();
        assert_eq!(config.kind, InterpreterKind::Captioning);
        assert_eq!(config.question, prompts::CHART_QUESTION);
        assert_eq!(config.api_timeout_secs, DEFAULT_API_TIMEOUT_SECS);
        assert!(config.provider.is_none());
    }

    #[test]
    fn builder_rejects_empty_question_and_zero_timeout() {
        assert!(InterpreterConfig::builder().question("   ").build().is_err());
        assert!(InterpreterConfig::builder().api_timeout_secs(0).build().is_err());

        let config = InterpreterConfig::builder()
            .kind(InterpreterKind::DocumentQa)
            .question("What is the peak value?")
            .api_timeout_secs(5)
            .build()
            .unwrap();
        assert_eq!(config.question, "What is the peak value?");
        assert_eq!(config.api_timeout_secs, 5);
    }

    #[test]
    fn debug_hides_provider_internals() {
        let config = InterpreterConfig::builder()
            .system_prompt("secret house style")
            .build()
            .unwrap();
        let dbg = format!("{config:?}");
        assert!(dbg.contains("<custom>"));
        assert!(!dbg.contains("secret house style"));
    }

    #[test]
    fn interpret_all_keeps_order() {
        let interp = ScriptedInterpreter {
            answers: vec!["sales rise", ""],
            calls: AtomicUsize::new(0),
        };
        let paths = vec![PathBuf::from("page_1.jpg"), PathBuf::from("page_2.jpg")];

        let answers = interpret_all(&interp, &paths).unwrap();

        assert_eq!(answers[0], (PathBuf::from("page_1.jpg"), "sales rise".to_string()));
        assert_eq!(answers[1], (PathBuf::from("page_2.jpg"), String::new()));
    }

    #[test]
    fn interpret_all_stops_at_first_failure() {
        let interp = ScriptedInterpreter {
            answers: vec!["ok"],
            calls: AtomicUsize::new(0),
        };
        let paths: Vec<PathBuf> = (1..=3).map(|n| PathBuf::from(format!("page_{n}.jpg"))).collect();

        let err = interpret_all(&interp, &paths).unwrap_err();

        assert!(matches!(err, PdfSplitError::ImageLoadFailed { ref path, .. } if path.ends_with("page_2.jpg")));
        assert_eq!(interp.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn interpreter_is_object_safe() {
        let boxed: Box<dyn ChartInterpreter> = Box::new(ScriptedInterpreter {
            answers: vec!["a line chart"],
            calls: AtomicUsize::new(0),
        });
        assert_eq!(boxed.interpret(Path::new("x.jpg")).unwrap(), "a line chart");
    }
}
