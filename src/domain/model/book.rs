use serde::{Deserialize, Serialize};

use super::document::DocumentKind;

/// 本棚に登録された1冊分のレコード。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    title: String,
    file_path: String,
    /// 読書進捗（ページ番号）。現状どの操作も更新しない。
    #[serde(default)]
    current_page: u32,
}

impl BookRecord {
    pub fn new(title: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            file_path: file_path.into(),
            current_page: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// 拡張子から判定した文書種別。対象外ならNone。
    pub fn kind(&self) -> Option<DocumentKind> {
        DocumentKind::from_path(std::path::Path::new(&self.file_path))
    }
}
