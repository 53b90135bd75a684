//! Upload intake: gate, decode, and run uploaded files through the model.
//!
//! Gating happens before any decode or provider work, so a rejected file
//! costs nothing. Decode is lossy and never fails; binary garbage becomes
//! replacement characters and flows through like any other text.

use std::sync::Arc;

use ironwren_core::{
    Attachment, ChatMessage, CompletionRequest, Error, FileError, Provider,
};
use tracing::{debug, warn};

use crate::persona::{PERSONA_PREAMBLE, Task};

/// Excerpt sent with the quick upload summary.
pub const ANALYZE_EXCERPT_CHARS: usize = 500;
/// Excerpt sent when rewriting a file.
pub const FIX_EXCERPT_CHARS: usize = 3000;

/// Extensions named when refusing an archive or image.
pub const SUPPORTED_TEXT_HINT: &str = ".txt, .py, .js, .md, .json, .html, .css";

/// Decode file bytes as UTF-8, replacing anything invalid. Never fails.
pub fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Take the first `max_chars` characters, whole characters only.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Drop fence markers the model wrapped around its output. Removes the
/// first line if it opens a fence and the last line if it closes one;
/// everything between is returned untouched.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let mut lines: Vec<&str> = trimmed.lines().collect();
    if lines
        .first()
        .is_some_and(|line| line.trim_start().starts_with("```"))
    {
        lines.remove(0);
    }
    if lines
        .last()
        .is_some_and(|line| line.trim().starts_with("```"))
    {
        lines.pop();
    }
    lines.join("\n")
}

/// Runs uploads through the provider. One call per file, no retries.
pub struct FilePipeline {
    provider: Arc<dyn Provider>,
    chat_model: String,
    analyze_model: String,
}

impl FilePipeline {
    pub fn new(
        provider: Arc<dyn Provider>,
        chat_model: impl Into<String>,
        analyze_model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            chat_model: chat_model.into(),
            analyze_model: analyze_model.into(),
        }
    }

    fn model_for(&self, task: Task) -> &str {
        if task.uses_chat_model() {
            &self.chat_model
        } else {
            &self.analyze_model
        }
    }

    /// Summarize an uploaded file. Gating errors are returned; provider
    /// errors are swallowed into a generic receipt so the upload flow never
    /// surfaces a raw failure.
    pub async fn analyze(&self, attachment: &Attachment) -> Result<String, FileError> {
        if let Some(rejection) = attachment.rejection() {
            return Err(rejection);
        }

        let text = decode_text(&attachment.bytes);
        let sample = excerpt(&text, ANALYZE_EXCERPT_CHARS);
        let params = Task::UploadAnalysis.params();
        let request = CompletionRequest::new(
            self.model_for(Task::UploadAnalysis),
            vec![
                ChatMessage::system(PERSONA_PREAMBLE),
                ChatMessage::user(format!(
                    "A user uploaded a file named `{}`. In two or three sentences, \
                     say what the file appears to do and point out anything that \
                     stands out.\n\nFile content begins:\n{sample}",
                    attachment.filename
                )),
            ],
        )
        .with_max_tokens(params.max_tokens)
        .with_temperature(params.temperature);

        debug!(filename = %attachment.filename, "Requesting upload summary");
        match self.provider.complete(request).await {
            Ok(response) => Ok(response.content),
            Err(error) => {
                warn!(filename = %attachment.filename, error = %error, "Upload summary failed, using receipt");
                Ok(receipt_for(&attachment.filename))
            }
        }
    }

    /// Rewrite an uploaded file and return the corrected content. Gating
    /// errors and provider errors both surface here; the caller picks the
    /// reply wording.
    pub async fn auto_fix(&self, attachment: &Attachment) -> Result<String, Error> {
        if let Some(rejection) = attachment.rejection() {
            return Err(rejection.into());
        }

        let text = decode_text(&attachment.bytes);
        let sample = excerpt(&text, FIX_EXCERPT_CHARS);
        let params = Task::Fix.params();
        let request = CompletionRequest::new(
            self.model_for(Task::Fix),
            vec![
                ChatMessage::system(PERSONA_PREAMBLE),
                ChatMessage::user(format!(
                    "Fix every bug, syntax error, and obvious problem in this file \
                     named `{}`. Return only the corrected file content, with no \
                     commentary.\n\n{sample}",
                    attachment.filename
                )),
            ],
        )
        .with_max_tokens(params.max_tokens)
        .with_temperature(params.temperature);

        debug!(filename = %attachment.filename, "Requesting file rewrite");
        let response = self.provider.complete(request).await?;
        let cleaned = strip_code_fences(&response.content);
        if cleaned.trim().is_empty() {
            return Err(FileError::Unfixable {
                filename: attachment.filename.clone(),
            }
            .into());
        }
        Ok(cleaned)
    }
}

/// Success-toned fallback when the summary call fails. Never includes the
/// provider's error text.
fn receipt_for(filename: &str) -> String {
    format!(
        "\u{2705} Got `{filename}`. It reads as a plain text file; ask me to fix \
         or convert it if you want changes."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ironwren_core::{CompletionResponse, ProviderError};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        calls: AtomicUsize,
        responses: Mutex<Vec<Result<String, ProviderError>>>,
    }

    impl MockProvider {
        fn returning(content: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                responses: Mutex::new(vec![Ok(content.to_string())]),
            }
        }

        fn failing(error: ProviderError) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                responses: Mutex::new(vec![Err(error)]),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Ok("fallthrough".to_string()));
            next.map(|content| CompletionResponse {
                content,
                model: "mock-model".to_string(),
                usage: None,
            })
        }
    }

    fn pipeline(provider: Arc<MockProvider>) -> FilePipeline {
        FilePipeline::new(provider, "chat-model", "code-model")
    }

    #[tokio::test]
    async fn archives_are_rejected_without_a_provider_call() {
        let provider = Arc::new(MockProvider::returning("should never run"));
        let pipeline = pipeline(provider.clone());

        let result = pipeline
            .analyze(&Attachment::new("backup.zip", Vec::new()))
            .await;

        assert!(matches!(result, Err(FileError::UnsupportedArchive { .. })));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn oversize_is_rejected_before_decode() {
        let provider = Arc::new(MockProvider::returning("should never run"));
        let pipeline = pipeline(provider.clone());
        let attachment =
            Attachment::with_declared_size("notes.txt", 101 * 1024 * 1024, Vec::new());

        let analyze = pipeline.analyze(&attachment).await;
        let fix = pipeline.auto_fix(&attachment).await;

        assert!(matches!(analyze, Err(FileError::Oversize { .. })));
        assert!(matches!(fix, Err(Error::File(FileError::Oversize { .. }))));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn binary_content_decodes_lossily() {
        let provider = Arc::new(MockProvider::returning("looks like noise"));
        let pipeline = pipeline(provider.clone());
        let attachment = Attachment::new("blob.txt", vec![0xff, 0xfe, b'h', b'i']);

        let result = pipeline.analyze(&attachment).await.unwrap();

        assert_eq!(result, "looks like noise");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn fix_strips_the_fence_the_model_added() {
        let provider = Arc::new(MockProvider::returning("```python\nprint(1)\n```"));
        let pipeline = pipeline(provider);
        let attachment = Attachment::new("script.py", b"print 1".to_vec());

        let fixed = pipeline.auto_fix(&attachment).await.unwrap();

        assert_eq!(fixed, "print(1)");
    }

    #[tokio::test]
    async fn empty_rewrite_is_unfixable() {
        let provider = Arc::new(MockProvider::returning("```\n```"));
        let pipeline = pipeline(provider);
        let attachment = Attachment::new("script.py", b"print 1".to_vec());

        let result = pipeline.auto_fix(&attachment).await;

        assert!(matches!(
            result,
            Err(Error::File(FileError::Unfixable { .. }))
        ));
    }

    #[tokio::test]
    async fn summary_failure_becomes_a_receipt() {
        let provider = Arc::new(MockProvider::failing(ProviderError::ApiError {
            status_code: 500,
            message: "kaboom-internal-detail".to_string(),
        }));
        let pipeline = pipeline(provider);
        let attachment = Attachment::new("notes.txt", b"hello".to_vec());

        let result = pipeline.analyze(&attachment).await.unwrap();

        assert!(!result.is_empty());
        assert!(result.contains("notes.txt"));
        assert!(!result.contains("kaboom-internal-detail"));
    }

    #[test]
    fn fence_stripping_leaves_plain_text_alone() {
        assert_eq!(strip_code_fences("print(1)"), "print(1)");
        assert_eq!(strip_code_fences("```js\nlet x = 1;\n```"), "let x = 1;");
        assert_eq!(strip_code_fences("x = 1\n```"), "x = 1");
    }

    #[test]
    fn excerpt_respects_character_boundaries() {
        let text = "héllo wörld";
        assert_eq!(excerpt(text, 5), "héllo");
        assert_eq!(excerpt(text, 100), text);
    }
}
