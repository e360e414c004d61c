//! Shared test harness for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use bookshelf_mcp::application::service::LibraryService;
use bookshelf_mcp::domain::model::library::Library;
use bookshelf_mcp::domain::opener::DocumentOpener;
use bookshelf_mcp::domain::repository::LibraryRepository;

// =============================================================================
// InMemoryRepo — テスト用リポジトリ
// =============================================================================

/// ファイルI/O不要のインメモリリポジトリ。JSON文字列で保持する。
pub struct InMemoryRepo {
    store: RefCell<Option<String>>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self {
            store: RefCell::new(None),
        }
    }

    /// 任意の内容（壊れたJSONなど）を保存済みデータとして仕込む。
    pub fn with_raw(json: &str) -> Self {
        Self {
            store: RefCell::new(Some(json.to_string())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.store.borrow().clone()
    }
}

impl LibraryRepository for InMemoryRepo {
    type Error = serde_json::Error;

    fn load(&self) -> Result<Option<Library>, Self::Error> {
        match self.store.borrow().as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, library: &Library) -> Result<(), Self::Error> {
        let json = serde_json::to_string(library)?;
        *self.store.borrow_mut() = Some(json);
        Ok(())
    }
}

// =============================================================================
// RecordingOpener — 開いたパスを記録する
// =============================================================================

#[derive(Default)]
pub struct RecordingOpener {
    pub opened: RefCell<Vec<PathBuf>>,
}

impl DocumentOpener for RecordingOpener {
    fn open(&self, path: &Path) -> std::io::Result<()> {
        self.opened.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

/// 常に失敗するOpener（ランチャーが見つからない環境を模す）。
pub struct FailingOpener;

impl DocumentOpener for FailingOpener {
    fn open(&self, _path: &Path) -> std::io::Result<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no document launcher found in PATH",
        ))
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// 指定の (title, path) を順に追加したService。
pub fn service_with(books: &[(&str, &str)]) -> LibraryService<InMemoryRepo> {
    let mut svc = LibraryService::new(InMemoryRepo::new());
    for (title, path) in books {
        svc.add(*title, *path);
    }
    svc
}

/// 結果がErrで、メッセージに指定文字列を含むことをassert。
pub fn assert_error_contains<T: std::fmt::Debug>(
    result: Result<T, impl std::fmt::Display>,
    expected: &str,
) {
    match result {
        Err(e) => {
            let msg = e.to_string();
            assert!(
                msg.contains(expected),
                "Expected error containing '{expected}', got: '{msg}'"
            );
        }
        Ok(v) => panic!("Expected error containing '{expected}', got Ok({v:?})"),
    }
}
