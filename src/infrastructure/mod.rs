// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod file_repository;
pub mod influx_source;
pub mod map_links;
pub mod ndjson_stream;
