pub mod db;
pub mod models;
pub mod parse;

pub use rusqlite;
