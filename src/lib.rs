pub mod config;
pub mod fixtures_fetch;
pub mod http_client;
pub mod ingest;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod persist;
