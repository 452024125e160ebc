use super::AppSession;
use crate::store::models::TranscriptMessage;
use serde::Serialize;
use tauri::State;

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    busy: bool,
    documents: usize,
    messages: usize,
}

#[tauri::command]
pub fn get_messages(session: State<'_, AppSession>) -> Vec<TranscriptMessage> {
    session.messages()
}

#[tauri::command]
pub fn session_status(session: State<'_, AppSession>) -> SessionStatus {
    SessionStatus {
        busy: session.is_busy(),
        documents: session.documents().len(),
        messages: session.message_count(),
    }
}

/// Ask a question. Returns the updated transcript.
#[tauri::command]
pub async fn send_message(
    session: State<'_, AppSession>,
    content: String,
) -> Result<Vec<TranscriptMessage>, String> {
    session
        .send_message(&content)
        .await
        .map_err(|e| e.to_string())?;
    Ok(session.messages())
}
