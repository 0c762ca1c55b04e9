//! # atlas-db: Database Layer for Atlas POS
//!
//! SQLite persistence behind repository types. Each repository owns the
//! SQL for one aggregate; nothing above this crate writes SQL.
//!
//! ## Usage
//! ```rust,ignore
//! use atlas_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./atlas.db")).await?;
//! let products = db.products().list_pos(None).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
