//! Handles settings for the application. Configuration is read from an
//! optional TOML file (`config/cashkey.toml` by default) and from
//! `CASHKEY_*` environment variables, e.g. `CASHKEY_SERVER__PORT=8080`.
use config::{Config, Environment, File};
use engine::Currency;
use serde::Deserialize;
use url::Url;

use crate::error::Result;

pub const DEFAULT_CONFIG_PATH: &str = "config/cashkey";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    /// Address share links point at.
    pub public_url: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            public_url: "http://127.0.0.1:3000/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Display {
    pub currency: String,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            currency: Currency::default().code().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub display: Display,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("CASHKEY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn public_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.server.public_url)?)
    }

    pub fn currency(&self) -> Result<Currency> {
        Ok(Currency::try_from(self.display.currency.as_str())?)
    }
}
