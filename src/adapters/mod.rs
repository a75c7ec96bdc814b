// Adapters - External system implementations

pub mod exec_tokio;
pub mod tool_locator;
pub mod toml_config;

// Re-export adapters
pub use exec_tokio::TokioToolRunner;
pub use tool_locator::ToolLocator;
pub use toml_config::{AppConfig, TimeoutConfig, TomlConfigAdapter};
