pub mod book;
pub mod document;
pub mod library;
