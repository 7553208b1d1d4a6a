//! Options for opening documents.

/// Options for opening PDF documents.
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// Error handling mode for page interpretation
    pub error_mode: ErrorMode,

    /// Maximum nesting of form XObjects before they are skipped
    pub max_form_depth: usize,

    /// Whether to read `/Annots` into the page objects
    pub annotations: bool,

    /// Password for encrypted documents
    pub password: Option<String>,
}

impl OpenOptions {
    /// Create new open options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (pages that fail to interpret come back empty).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set the form XObject nesting limit.
    pub fn with_max_form_depth(mut self, depth: usize) -> Self {
        self.max_form_depth = depth;
        self
    }

    /// Set password for encrypted documents.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Enable or disable annotation extraction.
    pub fn with_annotations(mut self, annotations: bool) -> Self {
        self.annotations = annotations;
        self
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            max_form_depth: 12,
            annotations: true,
            password: None,
        }
    }
}

/// Error handling mode during page interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Log the error and treat the page as empty
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_options_builder() {
        let options = OpenOptions::new()
            .lenient()
            .with_max_form_depth(3)
            .with_annotations(false)
            .with_password("secret");

        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert_eq!(options.max_form_depth, 3);
        assert!(!options.annotations);
        assert_eq!(options.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_default_options() {
        let options = OpenOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.max_form_depth, 12);
        assert!(options.annotations);
    }
}
