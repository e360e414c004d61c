use std::path::PathBuf;

use crate::domain::model::library::Library;
use crate::domain::repository::LibraryRepository;

/// 本棚データの既定ファイル名（カレントディレクトリ基準）。
pub const DEFAULT_DATA_FILE: &str = "bookshelf_data.json";

#[derive(Debug, thiserror::Error)]
pub enum JsonStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSONファイルによるLibraryRepository実装。
/// 本棚全体 = 1 JSONファイル（レコードの配列）。
pub struct JsonLibraryRepository {
    path: PathBuf,
}

impl JsonLibraryRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 読み込めないデータファイルを `<path>.corrupt` へ退避し、退避先を返す。
    /// 次回の save で元データを上書きしないようにするため。
    pub fn quarantine(&self) -> std::io::Result<PathBuf> {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".corrupt");
        let target = PathBuf::from(name);
        std::fs::rename(&self.path, &target)?;
        Ok(target)
    }
}

impl LibraryRepository for JsonLibraryRepository {
    type Error = JsonStoreError;

    fn load(&self) -> Result<Option<Library>, Self::Error> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let library: Library = serde_json::from_str(&content)?;
        Ok(Some(library))
    }

    fn save(&self, library: &Library) -> Result<(), Self::Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // serde_jsonは非ASCII文字をエスケープせずそのまま出力する
        let content = serde_json::to_string_pretty(library)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, &content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
