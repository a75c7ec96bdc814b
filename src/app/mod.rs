// Application layer - Use case orchestration

pub mod container;
pub mod download_session;
pub mod metadata_resolver;

// Re-export use cases
pub use download_session::DownloadSession;
pub use metadata_resolver::MetadataResolver;
