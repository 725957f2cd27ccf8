use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub fcm: FcmSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FcmSettings {
    /// Message-send URL of the push backend.
    pub endpoint: String,
    /// Bearer credential for the push backend.
    pub server_key: String,
    /// Android notification sound stamped into every payload.
    pub sound: String,
    /// Ask the backend to validate without delivering.
    pub dry_run: bool,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("CHATPUSH"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default(
                "fcm.endpoint",
                "https://fcm.googleapis.com/v1/projects/chatpush/messages:send",
            )?
            .set_default("fcm.server_key", "")?
            .set_default("fcm.sound", "default")?
            .set_default("fcm.dry_run", false)?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::load().expect("Failed to load default settings")
    }
}
