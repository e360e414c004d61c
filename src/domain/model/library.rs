use std::path::Path;

use serde::{Deserialize, Serialize};

use super::book::BookRecord;
use super::document::DocumentKind;
use crate::domain::error::DomainError;

/// 本棚 — BookRecordの順序付きコレクション。集約ルート。
///
/// 挿入順を保持する。タイトルの重複は許容し、削除は一致する全件を対象とする。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Library {
    books: Vec<BookRecord>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// 末尾に追加する。パスの存在やタイトル重複は検証しない。
    pub fn add(&mut self, title: impl Into<String>, file_path: impl Into<String>) {
        self.books.push(BookRecord::new(title, file_path));
    }

    /// ファイル名をタイトルとして追加する。.txt / .pdf 以外は拒否。
    pub fn add_file(&mut self, path: &Path) -> Result<BookRecord, DomainError> {
        let title = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| DomainError::NoFileName(path.to_path_buf()))?;
        if DocumentKind::from_path(path).is_none() {
            return Err(DomainError::UnsupportedDocument(path.to_path_buf()));
        }
        let record = BookRecord::new(title, path.to_string_lossy());
        self.books.push(record.clone());
        Ok(record)
    }

    /// タイトルが完全一致する全レコードを削除し、削除件数を返す。
    pub fn remove(&mut self, title: &str) -> usize {
        let before = self.books.len();
        self.books.retain(|book| book.title() != title);
        before - self.books.len()
    }

    pub fn list(&self) -> &[BookRecord] {
        &self.books
    }

    pub fn find(&self, title: &str) -> Option<&BookRecord> {
        self.books.iter().find(|book| book.title() == title)
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.books.iter().map(BookRecord::title)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_preserves_insertion_order() {
        let mut lib = Library::new();
        lib.add("b.txt", "/b.txt");
        lib.add("a.txt", "/a.txt");
        let titles: Vec<&str> = lib.titles().collect();
        assert_eq!(titles, vec!["b.txt", "a.txt"]);
    }

    #[test]
    fn add_allows_duplicate_titles() {
        let mut lib = Library::new();
        lib.add("X", "/one/X");
        lib.add("X", "/two/X");
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.find("X").unwrap().file_path(), "/one/X");
    }

    #[test]
    fn remove_deletes_every_match() {
        let mut lib = Library::new();
        lib.add("X", "/one/X");
        lib.add("Y", "/Y");
        lib.add("X", "/two/X");
        assert_eq!(lib.remove("X"), 2);
        assert_eq!(lib.list(), &[BookRecord::new("Y", "/Y")]);
    }

    #[test]
    fn remove_without_match_is_noop() {
        let mut lib = Library::new();
        lib.add("Y", "/Y");
        let before = lib.clone();
        assert_eq!(lib.remove("y"), 0);
        assert_eq!(lib, before);
    }

    #[test]
    fn add_file_uses_file_name_as_title() {
        let mut lib = Library::new();
        let rec = lib.add_file(Path::new("/docs/Dune.pdf")).unwrap();
        assert_eq!(rec.title(), "Dune.pdf");
        assert_eq!(rec.file_path(), "/docs/Dune.pdf");
        assert_eq!(rec.current_page(), 0);
    }

    #[test]
    fn add_file_appends_after_existing_books() {
        let mut lib = Library::new();
        lib.add("first.txt", "/first.txt");
        let rec = lib.add_file(Path::new("/docs/second.pdf")).unwrap();
        assert_eq!(lib.list().last(), Some(&rec));
        assert_eq!(lib.len(), 2);
    }

    #[test]
    fn add_file_rejects_unsupported_extension() {
        let mut lib = Library::new();
        let err = lib.add_file(Path::new("/docs/cover.jpg")).unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedDocument(_)));
        assert!(lib.is_empty());
    }

    #[test]
    fn add_file_rejects_path_without_file_name() {
        let mut lib = Library::new();
        let err = lib.add_file(Path::new("/")).unwrap_err();
        assert!(matches!(err, DomainError::NoFileName(_)));
    }

    #[test]
    fn serializes_as_plain_array() {
        let mut lib = Library::new();
        lib.add("a.txt", "/a.txt");
        let json = serde_json::to_string(&lib).unwrap();
        assert_eq!(
            json,
            r#"[{"title":"a.txt","file_path":"/a.txt","current_page":0}]"#
        );
    }
}
