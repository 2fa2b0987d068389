pub mod providers;

pub use providers::ProviderRegistry;
