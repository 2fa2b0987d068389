pub mod errors;
pub mod list_builder;
pub mod merge;
pub mod metadata_resolver;
pub mod multicall_reader;
pub mod persistence;
pub mod retry;
pub mod schema_validator;
pub mod stablecoins;
pub mod token_list_fetcher;
pub mod token_requests;
