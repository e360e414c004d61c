pub mod error;
pub mod model;
pub mod opener;
pub mod repository;
