//! Database schema, initialization and row insertion

pub mod init;
pub mod rows;
pub mod schema;
pub mod table_schemas;

pub use init::*;
pub use rows::*;
pub use schema::*;
pub use table_schemas::*;
