pub mod aggregate;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod model;
pub mod output;
pub mod schema;
