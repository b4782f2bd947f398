pub mod config;
pub mod context;
pub mod data;
pub mod error;
pub mod form;
pub mod pagination;
pub mod repository;
