//! Template loading: raw text only, no substitution.

use std::path::PathBuf;

use tracing::debug;

use crate::PromptError;

/// Default directory holding `prompt.txt` and `summary_prompt.txt`.
pub const DEFAULT_PROMPT_DIR: &str = "./prompt";

/// Which of the two templates to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Conversation-turn template (`prompt.txt`).
    Turn,
    /// Conversation summary template (`summary_prompt.txt`).
    Summary,
}

impl TemplateKind {
    pub fn file_name(self) -> &'static str {
        match self {
            TemplateKind::Turn => "prompt.txt",
            TemplateKind::Summary => "summary_prompt.txt",
        }
    }
}

/// Source of raw template text.
pub trait TemplateLoader: Send + Sync {
    fn load(&self, kind: TemplateKind) -> Result<String, PromptError>;
}

/// Reads templates from a directory on every call, so edits on disk apply to the next render.
#[derive(Debug, Clone)]
pub struct FileTemplateLoader {
    dir: PathBuf,
}

impl FileTemplateLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, kind: TemplateKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }
}

impl Default for FileTemplateLoader {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT_DIR)
    }
}

impl TemplateLoader for FileTemplateLoader {
    fn load(&self, kind: TemplateKind) -> Result<String, PromptError> {
        let path = self.path_for(kind);
        debug!(path = %path.display(), ?kind, "Loading prompt template");
        std::fs::read_to_string(&path)
            .map_err(|source| PromptError::TemplateUnreadable { path, source })
    }
}

/// Templates held in memory.
#[derive(Debug, Clone)]
pub struct StaticTemplateLoader {
    turn: String,
    summary: String,
}

impl StaticTemplateLoader {
    pub fn new(turn: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            turn: turn.into(),
            summary: summary.into(),
        }
    }
}

impl TemplateLoader for StaticTemplateLoader {
    fn load(&self, kind: TemplateKind) -> Result<String, PromptError> {
        Ok(match kind {
            TemplateKind::Turn => self.turn.clone(),
            TemplateKind::Summary => self.summary.clone(),
        })
    }
}
