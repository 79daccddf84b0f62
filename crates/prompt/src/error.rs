use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    /// Template file missing or unreadable. Prompt construction cannot proceed.
    #[error("Template {} is unreadable: {source}", .path.display())]
    TemplateUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
