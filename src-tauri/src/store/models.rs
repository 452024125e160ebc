use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Faq,
    PdfExtract,
}

/// One stored document used as answer context.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct KnowledgeEntry {
    pub id: String,
    pub name: String,
    pub content: String,
    pub kind: EntryKind,
}

impl KnowledgeEntry {
    /// Build a FAQ entry. The question doubles as the display name.
    pub fn faq(question: &str, answer: &str) -> Self {
        Self {
            id: format!("faq-{}", uuid::Uuid::new_v4()),
            name: question.to_string(),
            content: format!("Ques: {}\nAns: {}", question, answer),
            kind: EntryKind::Faq,
        }
    }

    /// Build an entry from text extracted out of an uploaded file.
    pub fn pdf(file_name: &str, content: String) -> Self {
        Self {
            id: format!("pdf-{}", uuid::Uuid::new_v4()),
            name: file_name.to_string(),
            content,
            kind: EntryKind::PdfExtract,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TranscriptMessage {
    pub sender: Sender,
    pub text: String,
}

impl TranscriptMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}
