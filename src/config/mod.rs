/// Database connection and table creation
pub mod database;

/// Initial product seeding from config.toml
pub mod seed;

/// Application settings loaded from environment variables
pub mod settings;

pub use settings::Settings;
