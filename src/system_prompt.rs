//! System instruction construction
//!
//! The instruction is rebuilt every turn from a template so the model always
//! sees the current document rather than a stale copy from earlier messages.

use std::path::Path;

/// Placeholder replaced with the current document text
pub const DOCUMENT_PLACEHOLDER: &str = "{document}";

/// Base system prompt establishing the assistant's role
const BASE_PROMPT: &str = r"You are Drafter, a helpful writing assistant. You are going to help the user update and modify documents.

- If the user wants to update or modify content, use the 'update' tool with the complete updated content.
- If the user wants to save and finish, you need to use the 'save' tool.
- Make sure to always show the current document state after modifications.

The current document content is:
{document}";

/// Heading used when a custom template has no placeholder
const APPENDED_DOCUMENT_HEADING: &str = "\n\nThe current document content is:\n";

/// System instruction template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(BASE_PROMPT)
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Load a template from disk
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        std::fs::read_to_string(path).map(Self::new)
    }

    /// Build the instruction for the given document, embedded verbatim
    pub fn render(&self, document: &str) -> String {
        if self.template.contains(DOCUMENT_PLACEHOLDER) {
            self.template.replace(DOCUMENT_PLACEHOLDER, document)
        } else {
            let mut prompt = self.template.clone();
            prompt.push_str(APPENDED_DOCUMENT_HEADING);
            prompt.push_str(document);
            prompt
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_template_embeds_document() {
        let prompt = PromptTemplate::default().render("Dear Bob,\nHello.");
        assert!(prompt.starts_with("You are Drafter"));
        assert!(prompt.ends_with("The current document content is:\nDear Bob,\nHello."));
        assert!(!prompt.contains(DOCUMENT_PLACEHOLDER));
    }

    #[test]
    fn test_empty_document() {
        let prompt = PromptTemplate::default().render("");
        assert!(prompt.ends_with("The current document content is:\n"));
    }

    #[test]
    fn test_document_containing_placeholder_is_verbatim() {
        let prompt = PromptTemplate::new("doc=[{document}]").render("a {document} b");
        assert_eq!(prompt, "doc=[a {document} b]");
    }

    #[test]
    fn test_template_without_placeholder_appends_document() {
        let prompt = PromptTemplate::new("Be terse.").render("text");
        assert_eq!(prompt, "Be terse.\n\nThe current document content is:\ntext");
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "Custom: {document}").unwrap();

        let template = PromptTemplate::from_file(&path).unwrap();
        assert_eq!(template.render("x"), "Custom: x");

        assert!(PromptTemplate::from_file(&dir.path().join("missing.txt")).is_err());
    }
}
