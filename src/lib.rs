pub mod config;
pub mod db_mongo;
pub mod errors;
pub mod report;
pub mod runner;
pub mod seed;

pub use config::Config;
pub use errors::QueryError;
pub use runner::{CatalogueParams, CatalogueReport, QueryRunner};
