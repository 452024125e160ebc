use crate::llm::{non_empty, Attachment, GenerateRequest, HostedModel, LlmError};
use std::fs;
use std::path::Path;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Instruction sent with every uploaded document.
pub const EXTRACTION_INSTRUCTION: &str = "Extract all text content from this PDF document. \
Present it clearly. If the document is an image-based PDF, perform OCR to extract the text.";

/// A file handed over by the presentation layer.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a local file, declaring its media type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        let bytes = fs::read(path)?;
        Ok(Self {
            name,
            media_type: media_type_for(path).to_string(),
            bytes,
        })
    }

    /// Whether the declared media type is PDF. Parameters and case are ignored.
    pub fn is_pdf(&self) -> bool {
        self.media_type
            .split(';')
            .next()
            .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE))
            .unwrap_or(false)
    }
}

/// Declared media type for a path, by extension.
pub fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "pdf" => PDF_MEDIA_TYPE,
        "txt" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Error: Unsupported file type. Please upload a PDF file.")]
    UnsupportedType { media_type: String },
    #[error("An error occurred while extracting content from {file_name}. The file might be corrupted, too complex, or an unsupported format.")]
    Failed {
        file_name: String,
        #[source]
        source: LlmError,
    },
}

/// Turn an uploaded PDF into plain text via the hosted model.
///
/// Non-PDF uploads are rejected before anything is sent. Every model failure,
/// including an empty reply, comes back as [`ExtractionError::Failed`].
pub async fn extract<M: HostedModel>(
    model: &M,
    model_id: &str,
    file: &UploadedFile,
) -> Result<String, ExtractionError> {
    if !file.is_pdf() {
        tracing::warn!(file = %file.name, media_type = %file.media_type, "rejected non-PDF upload");
        return Err(ExtractionError::UnsupportedType {
            media_type: file.media_type.clone(),
        });
    }

    let request = GenerateRequest::text(model_id, EXTRACTION_INSTRUCTION.to_string())
        .with_attachment(Attachment {
            file_name: file.name.clone(),
            media_type: PDF_MEDIA_TYPE.to_string(),
            data: file.bytes.clone(),
        });

    tracing::debug!(file = %file.name, bytes = file.bytes.len(), model = model_id, "extracting document text");
    match model.generate(&request).await.and_then(non_empty) {
        Ok(text) => Ok(text),
        Err(source) => {
            tracing::error!(file = %file.name, error = %source, "document extraction failed");
            Err(ExtractionError::Failed {
                file_name: file.name.clone(),
                source,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingModel {
        reply: fn() -> Result<String, LlmError>,
        calls: Mutex<Vec<GenerateRequest>>,
    }

    impl RecordingModel {
        fn new(reply: fn() -> Result<String, LlmError>) -> Self {
            Self {
                reply,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl HostedModel for RecordingModel {
        async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError> {
            self.calls.lock().unwrap().push(request.clone());
            (self.reply)()
        }
    }

    #[test]
    fn test_media_type_for() {
        assert_eq!(media_type_for(Path::new("a/Report.PDF")), PDF_MEDIA_TYPE);
        assert_eq!(media_type_for(Path::new("notes.md")), "text/markdown");
        assert_eq!(media_type_for(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_is_pdf_ignores_case_and_parameters() {
        assert!(UploadedFile::new("a", "application/pdf", vec![]).is_pdf());
        assert!(UploadedFile::new("a", "Application/PDF; charset=binary", vec![]).is_pdf());
        assert!(!UploadedFile::new("a", "text/plain", vec![]).is_pdf());
        assert!(!UploadedFile::new("a", "", vec![]).is_pdf());
    }

    #[test]
    fn test_from_path_reads_name_and_type() {
        let path = std::env::temp_dir().join(format!("rag-kb-{}.pdf", uuid::Uuid::new_v4()));
        fs::write(&path, b"%PDF-1.7").unwrap();
        let file = UploadedFile::from_path(&path).unwrap();
        fs::remove_file(&path).ok();

        assert!(file.name.ends_with(".pdf"));
        assert!(file.is_pdf());
        assert_eq!(file.bytes, b"%PDF-1.7");
    }

    #[tokio::test]
    async fn test_unsupported_type_never_calls_model() {
        let model = RecordingModel::new(|| Ok("should not be used".into()));
        let file = UploadedFile::new("notes.txt", "text/plain", b"hello".to_vec());

        let err = extract(&model, "m", &file).await.unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedType { .. }));
        assert_eq!(
            err.to_string(),
            "Error: Unsupported file type. Please upload a PDF file."
        );
        assert!(model.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_extract_sends_instruction_and_payload() {
        let model = RecordingModel::new(|| Ok("Extracted text".into()));
        let file = UploadedFile::new("guide.pdf", "application/pdf", b"%PDF".to_vec());

        let text = extract(&model, "vision-model", &file).await.unwrap();
        assert_eq!(text, "Extracted text");

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "vision-model");
        assert_eq!(calls[0].prompt, EXTRACTION_INSTRUCTION);
        let attachment = calls[0].attachment.as_ref().unwrap();
        assert_eq!(attachment.media_type, PDF_MEDIA_TYPE);
        assert_eq!(attachment.file_name, "guide.pdf");
        assert_eq!(attachment.data, b"%PDF");
    }

    #[tokio::test]
    async fn test_blank_reply_becomes_extraction_failed() {
        let model = RecordingModel::new(|| Ok(" \n\t ".into()));
        let file = UploadedFile::new("blank.pdf", "application/pdf", vec![0]);

        let err = extract(&model, "m", &file).await.unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Failed {
                source: LlmError::EmptyResponse,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_model_failure_becomes_extraction_failed() {
        let model = RecordingModel::new(|| Err(LlmError::EmptyResponse));
        let file = UploadedFile::new("broken.pdf", "application/pdf", vec![0]);

        let err = extract(&model, "m", &file).await.unwrap_err();
        match &err {
            ExtractionError::Failed { file_name, source } => {
                assert_eq!(file_name, "broken.pdf");
                assert!(matches!(source, LlmError::EmptyResponse));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("broken.pdf"));
    }
}
