pub mod core;
pub mod db;
pub mod models;
