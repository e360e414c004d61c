use std::fmt;
use std::path::Path;

/// 本棚が扱う文書の種別。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// プレーンテキスト（.txt）
    Text,
    /// PDF（.pdf）
    Pdf,
}

impl DocumentKind {
    /// 拡張子（大文字小文字を区別しない）から種別を判定する。
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" => Some(Self::Text),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Pdf => write!(f, "pdf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_supported_extensions() {
        assert_eq!(
            DocumentKind::from_path(Path::new("/a/notes.txt")),
            Some(DocumentKind::Text)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("C:/books/Dune.Pdf")),
            Some(DocumentKind::Pdf)
        );
    }

    #[test]
    fn rejects_other_files() {
        assert_eq!(DocumentKind::from_path(Path::new("/a/cover.png")), None);
        assert_eq!(DocumentKind::from_path(Path::new("/a/README")), None);
        assert_eq!(DocumentKind::from_path(Path::new("/a/.txt")), None);
    }
}
