pub mod db;
pub mod error;
pub mod store;

pub use db::SqliteStore;
pub use error::{DbError, DbResult};
pub use store::Store;
