use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("path has no file name: {}", .0.display())]
    NoFileName(PathBuf),

    #[error("unsupported document (expected .txt or .pdf): {}", .0.display())]
    UnsupportedDocument(PathBuf),
}
