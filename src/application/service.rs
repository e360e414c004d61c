use std::path::{Path, PathBuf};

use crate::domain::model::book::BookRecord;
use crate::domain::model::library::Library;
use crate::domain::opener::DocumentOpener;
use crate::domain::repository::LibraryRepository;

use super::error::AppError;

/// 本棚に対するユースケース。
/// 起動時に load、セッション中はメモリ上で変更、終了時に save する。
pub struct LibraryService<R: LibraryRepository> {
    repo: R,
    library: Library,
}

impl<R: LibraryRepository> LibraryService<R> {
    /// 空の本棚で開始する。
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            library: Library::new(),
        }
    }

    /// 保存済みの本棚で置き換える。
    ///
    /// ファイルがなければ何もしない。読み込みに失敗した場合は本棚を変更せずにエラーを返す。
    pub fn load(&mut self) -> Result<(), AppError> {
        let loaded = self
            .repo
            .load()
            .map_err(|e| AppError::Storage(Box::new(e)))?;
        match loaded {
            Some(library) => {
                tracing::debug!(books = library.len(), "Loaded bookshelf");
                self.library = library;
            }
            None => tracing::debug!("No saved bookshelf; starting empty"),
        }
        Ok(())
    }

    /// 本棚全体を永続化する（既存データは上書き）。
    pub fn save(&self) -> Result<(), AppError> {
        self.repo
            .save(&self.library)
            .map_err(|e| AppError::Storage(Box::new(e)))?;
        tracing::debug!(books = self.library.len(), "Saved bookshelf");
        Ok(())
    }

    pub fn add(&mut self, title: impl Into<String>, file_path: impl Into<String>) {
        self.library.add(title, file_path);
    }

    /// ファイル名をタイトルとして追加する。
    pub fn add_file(&mut self, path: &Path) -> Result<BookRecord, AppError> {
        Ok(self.library.add_file(path)?)
    }

    /// タイトル完全一致の全件を削除し、削除件数を返す。
    pub fn remove(&mut self, title: &str) -> usize {
        self.library.remove(title)
    }

    pub fn list(&self) -> &[BookRecord] {
        self.library.list()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// 指定タイトルの文書を既定ビューアで開き、開いたパスを返す。
    ///
    /// 参照先ファイルが消えていれば `FileMissing`（opener は呼ばない）。
    pub fn open(&self, title: &str, opener: &dyn DocumentOpener) -> Result<PathBuf, AppError> {
        let book = self
            .library
            .find(title)
            .ok_or_else(|| AppError::BookNotFound(title.to_string()))?;
        let path = PathBuf::from(book.file_path());
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Referenced document no longer exists");
            return Err(AppError::FileMissing(path));
        }
        opener.open(&path).map_err(|source| AppError::Open {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "Opened document");
        Ok(path)
    }
}
