use super::AppSession;
use crate::doc_processor::UploadedFile;
use crate::session::PdfOutcome;
use crate::store::models::{KnowledgeEntry, TranscriptMessage};
use std::path::Path;
use tauri::State;

#[tauri::command]
pub fn list_documents(session: State<'_, AppSession>) -> Vec<KnowledgeEntry> {
    session.documents()
}

/// Returns `None` when either field is blank.
#[tauri::command]
pub fn add_faq(
    session: State<'_, AppSession>,
    question: String,
    answer: String,
) -> Result<Option<KnowledgeEntry>, String> {
    session
        .add_faq(&question, &answer)
        .map_err(|e| e.to_string())
}

/// Extract a PDF picked in the dialog. Returns the updated transcript; the
/// outcome message is its last entry.
#[tauri::command]
pub async fn upload_pdf(
    session: State<'_, AppSession>,
    file_path: String,
) -> Result<Vec<TranscriptMessage>, String> {
    let file = UploadedFile::from_path(Path::new(&file_path))
        .map_err(|e| format!("Could not read {}: {}", file_path, e))?;

    match session.add_pdf(file).await.map_err(|e| e.to_string())? {
        PdfOutcome::Added(entry) => tracing::debug!(id = %entry.id, "upload committed"),
        PdfOutcome::Rejected(err) => tracing::debug!(error = %err, "upload rejected"),
    }
    Ok(session.messages())
}
