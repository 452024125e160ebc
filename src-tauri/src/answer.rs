//! Context assembly and grounded answering.
//!
//! The whole knowledge base is sent with every question. There is no chunking,
//! ranking or truncation; a knowledge base larger than the model's context
//! window fails at the provider.

use crate::llm::{GenerateRequest, HostedModel, LlmError};
use crate::store::models::KnowledgeEntry;

/// Sentence the model is told to use when the context has no answer.
///
/// This is requested in the prompt only. Nothing checks that the model complied.
pub const REFUSAL: &str = "I cannot find an answer in the provided documents.";

pub const GENERATION_FAILED_NOTICE: &str =
    "An error occurred while communicating with the AI. Please check the logs for details.";

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("{}", GENERATION_FAILED_NOTICE)]
    Failed {
        #[source]
        source: LlmError,
    },
}

/// Join every entry as `--- Document: <name> ---\n<content>`, separated by a
/// blank line, in store order.
pub fn assemble_context(entries: &[KnowledgeEntry]) -> String {
    entries
        .iter()
        .map(|doc| format!("--- Document: {} ---\n{}", doc.name, doc.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "You are a helpful Q&A assistant. Your task is to answer the user's question based ONLY on the provided context.
- Do not use any external knowledge or information you have outside of the provided context.
- The context contains several documents, which could be FAQs or content from PDFs. Consider both kinds.
- FAQs are formatted with \"Ques:\" for the question and \"Ans:\" for the answer.
- If the context does not contain information relevant to the question, you MUST respond with: \"{REFUSAL}\"
- Otherwise, provide a clear and concise answer based on the information in the context.

CONTEXT:
---
{context}
---

QUESTION: {question}
"
    )
}

/// Ask the model to answer `question` from `context` alone.
pub async fn answer<M: HostedModel>(
    model: &M,
    model_id: &str,
    question: &str,
    context: &str,
) -> Result<String, GenerationError> {
    let request = GenerateRequest::text(model_id, build_prompt(question, context));

    match model.generate(&request).await {
        Ok(text) => {
            tracing::info!(model = model_id, chars = text.len(), "answer generated");
            Ok(text)
        }
        Err(source) => {
            tracing::error!(model = model_id, error = %source, "answer generation failed");
            Err(GenerationError::Failed { source })
        }
    }
}
