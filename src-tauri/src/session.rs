//! Conversation controller.
//!
//! A [`Session`] owns the knowledge base, the transcript and a single-permit
//! gate. `add_pdf` and `send_message` hold the permit for their whole run, so
//! at most one hosted-model call is in flight per session. Dropping the permit
//! returns the session to idle on every exit path.

use crate::answer::{self, GenerationError};
use crate::config::AppConfig;
use crate::doc_processor::{self, ExtractionError, UploadedFile};
use crate::llm::{HostedModel, Provider};
use crate::store::models::{KnowledgeEntry, TranscriptMessage};
use crate::store::{DocumentStore, Transcript};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::{Semaphore, SemaphorePermit};

pub const GREETING: &str =
    "Hello! Add documents to the knowledge base and ask me questions about them.";
pub const EMPTY_KNOWLEDGE_BASE: &str =
    "The knowledge base is empty. Please add some documents before asking questions.";
pub const SEED_FAQ_QUESTION: &str =
    "When does the course AI Foundations and Prompt Engineering end?";
pub const SEED_FAQ_ANSWER: &str = "November 14";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Another request is still in progress. Please wait for it to finish.")]
    Busy,
}

/// Result of an upload.
#[derive(Debug)]
pub enum PdfOutcome {
    Added(KnowledgeEntry),
    Rejected(ExtractionError),
}

/// Result of a question.
#[derive(Debug)]
pub enum Reply {
    /// Blank input; nothing was recorded.
    Ignored,
    EmptyKnowledgeBase,
    Answered(String),
    Failed(GenerationError),
}

pub struct Session<M> {
    model: M,
    answer_model: String,
    extraction_model: String,
    store: Mutex<DocumentStore>,
    transcript: Mutex<Transcript>,
    gate: Semaphore,
}

impl Session<Provider> {
    pub fn from_config(config: &AppConfig) -> Self {
        let provider = config.provider();
        tracing::info!(
            provider = provider.name(),
            model = %config.model,
            extraction_model = %config.extraction_model,
            seeded = config.seed,
            "starting session"
        );
        if config.seed {
            Self::new(provider, &config.model, &config.extraction_model)
        } else {
            Self::empty(provider, &config.model, &config.extraction_model)
        }
    }
}

impl<M: HostedModel> Session<M> {
    /// A session seeded with the sample FAQ and the greeting.
    pub fn new(
        model: M,
        answer_model: impl Into<String>,
        extraction_model: impl Into<String>,
    ) -> Self {
        let session = Self::empty(model, answer_model, extraction_model);
        session
            .store()
            .append(KnowledgeEntry::faq(SEED_FAQ_QUESTION, SEED_FAQ_ANSWER));
        session.transcript().push(TranscriptMessage::bot(GREETING));
        session
    }

    pub fn empty(
        model: M,
        answer_model: impl Into<String>,
        extraction_model: impl Into<String>,
    ) -> Self {
        Self {
            model,
            answer_model: answer_model.into(),
            extraction_model: extraction_model.into(),
            store: Mutex::new(DocumentStore::new()),
            transcript: Mutex::new(Transcript::new()),
            gate: Semaphore::new(1),
        }
    }

    #[cfg(test)]
    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn is_busy(&self) -> bool {
        self.gate.available_permits() == 0
    }

    pub fn documents(&self) -> Vec<KnowledgeEntry> {
        self.store().list()
    }

    pub fn messages(&self) -> Vec<TranscriptMessage> {
        self.transcript().messages()
    }

    pub fn messages_since(&self, start: usize) -> Vec<TranscriptMessage> {
        self.transcript().since(start)
    }

    pub fn message_count(&self) -> usize {
        self.transcript().len()
    }

    /// Add a FAQ pair. Blank fields (after trimming) are ignored.
    pub fn add_faq(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<Option<KnowledgeEntry>, SessionError> {
        if self.is_busy() {
            tracing::warn!("FAQ rejected: session busy");
            return Err(SessionError::Busy);
        }
        if question.trim().is_empty() || answer.trim().is_empty() {
            tracing::debug!("FAQ ignored: blank question or answer");
            return Ok(None);
        }

        let entry = KnowledgeEntry::faq(question, answer);
        self.store().append(entry.clone());
        tracing::info!(id = %entry.id, "FAQ added to knowledge base");
        Ok(Some(entry))
    }

    /// Extract an uploaded PDF into the knowledge base.
    ///
    /// A placeholder message is shown while extraction runs and is replaced by
    /// the outcome. The store only changes when extraction succeeds.
    pub async fn add_pdf(&self, file: UploadedFile) -> Result<PdfOutcome, SessionError> {
        let _permit = self.begin()?;
        self.transcript().push_provisional(TranscriptMessage::bot(format!(
            "Analyzing {}...",
            file.name
        )));

        let outcome =
            match doc_processor::extract(&self.model, &self.extraction_model, &file).await {
                Ok(content) => {
                    let entry = KnowledgeEntry::pdf(&file.name, content);
                    self.store().append(entry.clone());
                    self.transcript()
                        .resolve_provisional(TranscriptMessage::bot(format!(
                            "Successfully added \"{}\" to the knowledge base.",
                            file.name
                        )));
                    tracing::info!(id = %entry.id, file = %file.name, "PDF added to knowledge base");
                    PdfOutcome::Added(entry)
                }
                Err(err) => {
                    self.transcript()
                        .resolve_provisional(TranscriptMessage::bot(format!(
                            "Could not process {}. {}",
                            file.name, err
                        )));
                    PdfOutcome::Rejected(err)
                }
            };
        Ok(outcome)
    }

    /// Record a question and answer it from the whole knowledge base.
    pub async fn send_message(&self, question: &str) -> Result<Reply, SessionError> {
        if question.trim().is_empty() {
            return Ok(Reply::Ignored);
        }
        let _permit = self.begin()?;
        self.transcript().push(TranscriptMessage::user(question));

        let documents = self.store().list();
        if documents.is_empty() {
            self.transcript()
                .push(TranscriptMessage::bot(EMPTY_KNOWLEDGE_BASE));
            return Ok(Reply::EmptyKnowledgeBase);
        }

        let context = answer::assemble_context(&documents);
        tracing::debug!(documents = documents.len(), chars = context.len(), "context assembled");

        let reply = match answer::answer(&self.model, &self.answer_model, question, &context).await
        {
            Ok(text) => {
                self.transcript().push(TranscriptMessage::bot(text.clone()));
                Reply::Answered(text)
            }
            Err(err) => {
                self.transcript().push(TranscriptMessage::bot(err.to_string()));
                Reply::Failed(err)
            }
        };
        Ok(reply)
    }

    fn begin(&self) -> Result<SemaphorePermit<'_>, SessionError> {
        self.gate.try_acquire().map_err(|_| {
            tracing::warn!("request rejected: session busy");
            SessionError::Busy
        })
    }

    fn store(&self) -> MutexGuard<'_, DocumentStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transcript(&self) -> MutexGuard<'_, Transcript> {
        self.transcript
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
