pub mod crud;
pub mod listings;
