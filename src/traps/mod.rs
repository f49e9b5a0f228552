pub mod ingest;
pub mod mac;
pub mod ownership;
