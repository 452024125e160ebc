pub mod answer;
#[cfg(feature = "desktop")]
mod commands;
pub mod config;
pub mod console;
pub mod doc_processor;
pub mod llm;
pub mod session;
pub mod store;

/// Launch the desktop window around a single session.
#[cfg(feature = "desktop")]
pub fn run(config: config::AppConfig) -> tauri::Result<()> {
    let session = session::Session::from_config(&config);

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .manage(session)
        .invoke_handler(tauri::generate_handler![
            commands::knowledge::list_documents,
            commands::knowledge::add_faq,
            commands::knowledge::upload_pdf,
            commands::chat::get_messages,
            commands::chat::session_status,
            commands::chat::send_message,
        ])
        .run(tauri::generate_context!())
}
