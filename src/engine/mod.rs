pub mod aggregate;
pub mod checks;
pub mod clean;
pub mod notify;
pub mod sample;
pub mod schema;
pub mod table;
pub mod validate;
