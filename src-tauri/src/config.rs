//! Runtime configuration.
//!
//! Everything comes from CLI flags with environment fallbacks; a `.env` file
//! in the working directory is loaded first. The API key is not validated up
//! front: a missing or wrong key shows up as a failure of the first model call.

use crate::llm::{claude, gemini, openai, Provider};
use clap::{Parser, ValueEnum};

/// Which hosted model family answers questions and reads PDFs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    Gemini,
    Openai,
    Claude,
}

impl ProviderKind {
    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-2.5-flash",
            ProviderKind::Openai => "gpt-4o-mini",
            ProviderKind::Claude => "claude-sonnet-4-20250514",
        }
    }

    /// Provider-specific variable consulted when `API_KEY` is not set.
    pub fn api_key_env(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::Openai => "OPENAI_API_KEY",
            ProviderKind::Claude => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::Gemini => gemini::DEFAULT_BASE_URL,
            ProviderKind::Openai => openai::DEFAULT_BASE_URL,
            ProviderKind::Claude => claude::DEFAULT_BASE_URL,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Interactive RAG knowledge base — answers questions only from your own FAQs and PDFs.
#[derive(Debug, Parser)]
#[command(name = "rag-kb", version, about, long_about = None)]
pub struct Cli {
    /// Hosted model provider.
    #[arg(long, env = "RAG_KB_PROVIDER", value_enum, default_value = "gemini")]
    pub provider: ProviderKind,

    /// Model used to answer questions (defaults per provider).
    #[arg(long, env = "RAG_KB_MODEL")]
    pub model: Option<String>,

    /// Model used to extract PDF text (defaults to --model).
    #[arg(long, env = "RAG_KB_EXTRACTION_MODEL")]
    pub extraction_model: Option<String>,

    /// API credential. Falls back to GEMINI_API_KEY, OPENAI_API_KEY or ANTHROPIC_API_KEY.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Override the provider endpoint.
    #[arg(long, env = "RAG_KB_BASE_URL")]
    pub base_url: Option<String>,

    /// Start with an empty knowledge base and no greeting.
    #[arg(long)]
    pub no_seed: bool,

    /// Log format: text (default) or json.
    #[arg(long, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub extraction_model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub seed: bool,
}

impl AppConfig {
    /// Resolve the CLI into a config, reading provider key variables from the process environment.
    pub fn from_cli(cli: &Cli) -> Self {
        Self::resolve(cli, |name| std::env::var(name).ok())
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> Self {
        let model = cli
            .model
            .clone()
            .unwrap_or_else(|| cli.provider.default_model().to_string());
        let extraction_model = cli.extraction_model.clone().unwrap_or_else(|| model.clone());
        let api_key = cli
            .api_key
            .clone()
            .or_else(|| env(cli.provider.api_key_env()))
            .filter(|key| !key.trim().is_empty());

        Self {
            provider: cli.provider,
            model,
            extraction_model,
            api_key,
            base_url: cli.base_url.clone(),
            seed: !cli.no_seed,
        }
    }

    pub fn provider(&self) -> Provider {
        let api_key = self.api_key.clone().unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!(
                provider = ?self.provider,
                "no API key configured; model calls will fail until one is set"
            );
        }
        let provider = match self.provider {
            ProviderKind::Gemini => Provider::gemini(api_key),
            ProviderKind::Openai => Provider::openai(api_key),
            ProviderKind::Claude => Provider::claude(api_key),
        };
        match &self.base_url {
            Some(url) => provider.with_base_url(url.as_str()),
            None => provider.with_base_url(self.provider.default_base_url()),
        }
    }
}

/// Install the global tracing subscriber. Logs go to stderr.
pub fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match cli.verbose {
        0 => "rag_kb=info,rag_kb_lib=info",
        1 => "rag_kb=debug,rag_kb_lib=debug",
        _ => "rag_kb=trace,rag_kb_lib=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
