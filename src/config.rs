use std::path::Path;

use serde::Deserialize;

use crate::api::notifications::MAX_NOTIFICATION_LIMIT;

/// Server configuration.
///
/// Sources, lowest precedence first: built-in defaults, an optional TOML file
/// (`rawspill.toml` or the path given on the command line), then environment
/// variables named after the keys (`MONGODB_URI`, `ADMIN_PASS`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub bind_addr: String,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    /// Shared admin secret. Empty disables every admin route.
    pub admin_pass: String,
    /// Author assigned to posts created without one.
    pub default_author: String,
    /// Default page size of the notification feed.
    pub notification_limit: i64,
    /// Seed sample posts into an empty database at startup.
    pub seed_demo: bool,
}

impl AppConfig {
    pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file_source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("rawspill").required(false),
        };

        config::Config::builder()
            .set_default("bind_addr", "127.0.0.1:3000")?
            .set_default("mongodb_uri", "mongodb://localhost:27017")?
            .set_default("mongodb_database", "rawspill")?
            .set_default("admin_pass", "")?
            .set_default("default_author", "Admin")?
            .set_default("notification_limit", 50)?
            .set_default("seed_demo", false)?
            .add_source(file_source)
            .add_source(config::Environment::default().try_parsing(true))
            .build()?
            .try_deserialize::<Self>()?
            .validated()
    }

    fn validated(self) -> Result<Self, config::ConfigError> {
        if !(1..=MAX_NOTIFICATION_LIMIT).contains(&self.notification_limit) {
            return Err(config::ConfigError::Message(format!(
                "notification_limit must be between 1 and {}, got {}",
                MAX_NOTIFICATION_LIMIT, self.notification_limit
            )));
        }
        Ok(self)
    }
}
