//! SQLite storage for SBSN.
//!
//! Provides persistence for users and their granted authorities.

mod db;
mod models;
mod queries;


pub use db::UserDatabase;
pub use models::*;
pub use sbsn_core::db::DatabaseError;
