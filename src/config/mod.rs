/// Database configuration and connection management
pub mod database;

/// Invoice draft loading from TOML files
pub mod draft;

/// Explicit signed-in user and department context
pub mod session;

/// Application settings loading from config.toml
pub mod settings;
