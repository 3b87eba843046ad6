//! Save tool - writes the document to a `.txt` file

use super::{Tool, ToolContext};
use crate::state_machine::{ActionEffect, ActionInput, ConversationState, SaveInput, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;

const TXT_SUFFIX: &str = ".txt";

/// Append `.txt` unless the name already ends with it (case-sensitive)
pub fn normalize_filename(filename: &str) -> String {
    if filename.ends_with(TXT_SUFFIX) {
        filename.to_string()
    } else {
        format!("{filename}{TXT_SUFFIX}")
    }
}

/// Saves the current document. Failures become error results, never panics
/// or dispatch errors, so the user can retry under another name.
#[derive(Debug, Default, Clone, Copy)]
pub struct SaveTool;

#[async_trait]
impl Tool for SaveTool {
    type Input = SaveInput;

    fn name(&self) -> &'static str {
        ActionInput::SAVE
    }

    fn description(&self) -> String {
        "Save the current document to a text file and finish the process.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["filename"],
            "properties": {
                "filename": {
                    "type": "string",
                    "description": "Name for the text file. '.txt' is added if missing."
                }
            }
        })
    }

    async fn run(
        &self,
        state: ConversationState,
        input: &SaveInput,
        ctx: &ToolContext<'_>,
    ) -> (ConversationState, ToolResult) {
        let final_name = normalize_filename(&input.filename);
        let path = PathBuf::from(&final_name);

        let result = match ctx.persistence.write_file(&path, state.document()).await {
            Ok(()) => ToolResult::success(
                ctx.action_id,
                self.name(),
                format!("Document has been saved successfully to '{final_name}'."),
                ActionEffect::DocumentSaved { path },
            ),
            Err(e) => {
                tracing::warn!(filename = %final_name, error = %e, "Save failed");
                ToolResult::failure(
                    ctx.action_id,
                    self.name(),
                    format!("Error saving document: {e}"),
                    e.to_string(),
                )
            }
        };

        (state, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::testing::MemoryPersistence;
    use crate::runtime::FsPersistence;
    use crate::runtime::Persistence;
    use crate::state_machine::state::ToolOutcome;
    use tempfile::TempDir;

    async fn run_save(
        persistence: &dyn Persistence,
        document: &str,
        filename: &str,
    ) -> (ConversationState, ToolResult) {
        let mut state = ConversationState::new();
        state.replace_document(document.to_string());
        let ctx = ToolContext {
            action_id: "call-save",
            persistence,
        };
        SaveTool
            .run(
                state,
                &SaveInput {
                    filename: filename.to_string(),
                },
                &ctx,
            )
            .await
    }

    #[test]
    fn test_normalize_filename() {
        assert_eq!(normalize_filename("report"), "report.txt");
        assert_eq!(normalize_filename("report.txt"), "report.txt");
        // Exact, case-sensitive suffix check
        assert_eq!(normalize_filename("REPORT.TXT"), "REPORT.TXT.txt");
        assert_eq!(normalize_filename("notes.md"), "notes.md.txt");
    }

    #[tokio::test]
    async fn test_save_writes_document() {
        let dir = TempDir::new().unwrap();
        let persistence = FsPersistence::new(dir.path());

        let (_, result) = run_save(&persistence, "Test content for saving.", "testfile.txt").await;

        let written = std::fs::read_to_string(dir.path().join("testfile.txt")).unwrap();
        assert_eq!(written, "Test content for saving.");
        assert!(result.text.to_lowercase().contains("saved successfully"));
    }

    #[tokio::test]
    async fn test_save_adds_txt_suffix() {
        let dir = TempDir::new().unwrap();
        let persistence = FsPersistence::new(dir.path());

        let (_, result) = run_save(&persistence, "Another test.", "myfile").await;

        let written = std::fs::read_to_string(dir.path().join("myfile.txt")).unwrap();
        assert_eq!(written, "Another test.");
        assert_eq!(result.text, "Document has been saved successfully to 'myfile.txt'.");
    }

    #[tokio::test]
    async fn test_save_with_and_without_suffix_hit_same_path() {
        let persistence = MemoryPersistence::default();

        let (_, a) = run_save(&persistence, "one", "report").await;
        let (_, b) = run_save(&persistence, "two", "report.txt").await;

        assert_eq!(a.saved_path(), b.saved_path());
        assert_eq!(persistence.get("report.txt").as_deref(), Some("two"));
        assert_eq!(persistence.len(), 1);
    }

    #[tokio::test]
    async fn test_save_empty_content() {
        let dir = TempDir::new().unwrap();
        let persistence = FsPersistence::new(dir.path());

        let (_, result) = run_save(&persistence, "", "empty.txt").await;

        assert_eq!(std::fs::read_to_string(dir.path().join("empty.txt")).unwrap(), "");
        assert!(!result.is_error());
    }

    #[tokio::test]
    async fn test_save_invalid_path() {
        let dir = TempDir::new().unwrap();
        let persistence = FsPersistence::new(dir.path());
        let missing = dir.path().join("invalid_dir").join("should_fail");

        let (state, result) =
            run_save(&persistence, "Should fail.", missing.to_str().unwrap()).await;

        assert!(result.text.starts_with("Error saving document: "));
        assert!(matches!(result.outcome, ToolOutcome::Failure { .. }));
        assert_eq!(state.document(), "Should fail.");
        assert!(!missing.with_extension("txt").exists());
    }
}
