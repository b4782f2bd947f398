pub mod pagination;
pub mod timestamp;
