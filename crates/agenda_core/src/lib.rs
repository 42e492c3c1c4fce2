pub mod config;
pub mod crawl;
pub mod dates;
pub mod dom;
pub mod enrich;
pub mod error;
pub mod fetch;
pub mod links;
pub mod output;
pub mod page;
pub mod report;
pub mod rows;
pub mod schema;
pub mod urls;
