//! Error types for story extraction
//!
//! Every failure is fatal for the document it was raised on and names the
//! offending file. Non-fatal conditions (generated id collisions) are reported
//! as [`crate::extractors::base::ExtractionWarning`] instead.

use thiserror::Error;

/// Coarse classification used by callers deciding how to surface a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing required construct or malformed value
    Schema,
    /// Conflicting story identity
    Identity,
    /// Node lookup failed (snippet references, compiled output)
    Locator,
}

/// Node kinds the compiled-output locator must find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompiledNode {
    DefineMetaImport,
    DefineMetaDeclaration,
    ExportDefault,
    StoryIdentifier,
    StoriesFunction,
}

impl std::fmt::Display for CompiledNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompiledNode::DefineMetaImport => write!(f, "the `defineMeta` import specifier"),
            CompiledNode::DefineMetaDeclaration => {
                write!(f, "the destructured `defineMeta` variable declaration")
            }
            CompiledNode::ExportDefault => write!(f, "the default export"),
            CompiledNode::StoryIdentifier => write!(f, "the destructured `Story` identifier"),
            CompiledNode::StoriesFunction => write!(f, "the generated stories component function"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("Missing module tag in '{filename}': stories files must declare `defineMeta` inside <script module>")]
    MissingModuleTag { filename: String },

    #[error("Default or namespace import of '{package}' used in '{filename}': only named imports are supported")]
    DefaultOrNamespaceImport { filename: String, package: String },

    #[error("No destructured `defineMeta` call found in '{filename}': expected `const {{ Story }} = defineMeta({{ ... }})`")]
    NoDestructuredDefineMeta { filename: String },

    #[error("`defineMeta` call in '{filename}' does not destructure a `Story` component")]
    NoStoryComponentDestructured { filename: String },

    #[error("First argument of `defineMeta` in '{filename}' must be an object literal")]
    InvalidDefineMetaArgument { filename: String },

    #[error("Story at offset {offset} in '{filename}' has no `name` attribute")]
    MissingStoryName { filename: String, offset: usize },

    #[error("Story at offset {offset} in '{filename}' has neither `name` nor `exportName`")]
    MissingStoryIdentity { filename: String, offset: usize },

    #[error("Duplicate story name '{name}' in '{filename}'")]
    DuplicateStoryName { filename: String, name: String },

    #[error("Duplicate story export name '{export_name}' in '{filename}'")]
    DuplicateExportName {
        filename: String,
        export_name: String,
    },

    #[error("Story name '{name}' in '{filename}' cannot be turned into an export name")]
    InvalidExportName { filename: String, name: String },

    #[error("Attribute `{attribute}` in '{filename}' must be {expected}")]
    InvalidAttribute {
        filename: String,
        attribute: String,
        expected: &'static str,
    },

    #[error("Meta property `{property}` in '{filename}' must be {expected}")]
    InvalidMetaProperty {
        filename: String,
        property: String,
        expected: &'static str,
    },

    #[error("Element {index} of `{name}` in '{filename}' is not a static string")]
    ArrayElementNotString {
        filename: String,
        name: String,
        index: usize,
    },

    #[error("Snippet block `{snippet}` used by story '{story}' not found in '{filename}'")]
    SnippetNotFound {
        filename: String,
        snippet: String,
        story: String,
    },

    #[error("Source range {start}..{end} does not index into '{filename}'")]
    SpanOutOfBounds {
        filename: String,
        start: usize,
        end: usize,
    },

    #[error("Could not find {node} in compiled output of '{filename}'")]
    CompiledNodeNotFound { filename: String, node: CompiledNode },

    #[error("Failed to parse compiled output of '{filename}': {reason}")]
    CompiledParse { filename: String, reason: String },
}

impl ExtractError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExtractError::DuplicateStoryName { .. } | ExtractError::DuplicateExportName { .. } => {
                ErrorCategory::Identity
            }
            ExtractError::SnippetNotFound { .. }
            | ExtractError::CompiledNodeNotFound { .. }
            | ExtractError::CompiledParse { .. } => ErrorCategory::Locator,
            _ => ErrorCategory::Schema,
        }
    }

    /// File the error was raised on
    pub fn filename(&self) -> &str {
        match self {
            ExtractError::MissingModuleTag { filename }
            | ExtractError::DefaultOrNamespaceImport { filename, .. }
            | ExtractError::NoDestructuredDefineMeta { filename }
            | ExtractError::NoStoryComponentDestructured { filename }
            | ExtractError::InvalidDefineMetaArgument { filename }
            | ExtractError::MissingStoryName { filename, .. }
            | ExtractError::MissingStoryIdentity { filename, .. }
            | ExtractError::DuplicateStoryName { filename, .. }
            | ExtractError::DuplicateExportName { filename, .. }
            | ExtractError::InvalidExportName { filename, .. }
            | ExtractError::InvalidAttribute { filename, .. }
            | ExtractError::InvalidMetaProperty { filename, .. }
            | ExtractError::ArrayElementNotString { filename, .. }
            | ExtractError::SnippetNotFound { filename, .. }
            | ExtractError::SpanOutOfBounds { filename, .. }
            | ExtractError::CompiledNodeNotFound { filename, .. }
            | ExtractError::CompiledParse { filename, .. } => filename,
        }
    }
}

/// Result type alias for ExtractError
pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_file() {
        let err = ExtractError::MissingModuleTag {
            filename: "Button.stories.svelte".to_string(),
        };
        assert!(err.to_string().contains("Button.stories.svelte"));
        assert!(err.to_string().contains("module"));

        let err = ExtractError::CompiledNodeNotFound {
            filename: "Button.stories.svelte".to_string(),
            node: CompiledNode::StoriesFunction,
        };
        assert!(err.to_string().contains("stories component function"));
        assert_eq!(err.filename(), "Button.stories.svelte");
    }

    #[test]
    fn test_error_categories() {
        let dup = ExtractError::DuplicateStoryName {
            filename: "a.svelte".to_string(),
            name: "Default".to_string(),
        };
        assert_eq!(dup.category(), ErrorCategory::Identity);

        let missing = ExtractError::SnippetNotFound {
            filename: "a.svelte".to_string(),
            snippet: "tmpl".to_string(),
            story: "Default".to_string(),
        };
        assert_eq!(missing.category(), ErrorCategory::Locator);

        let schema = ExtractError::InvalidDefineMetaArgument {
            filename: "a.svelte".to_string(),
        };
        assert_eq!(schema.category(), ErrorCategory::Schema);
    }
}
