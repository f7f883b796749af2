use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod validator;
pub mod watcher;

use crate::cli::Cli;
use crate::domain::FieldKind;
use crate::form::{FieldRegistry, WeekdaySet};

/// Template endpoint the form is built from when nothing else is configured.
pub const DEFAULT_API_URL: &str = "https://v2-dev-api.esigns.io/v1.0/templates-v2/687893c84c8b5bf090eacc09?company_id=678a07e588cd760d7bd74a6c";

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub schema: SchemaSettings,
    #[serde(default)]
    pub form: FormSettings,
    #[serde(default)]
    pub submission: SubmissionSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Where the field-group schema is fetched from
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SchemaSettings {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Request timeout; unset means no timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_seconds: None,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FormSettings {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub weekdays: WeekdaySet,
    /// Reject submissions with blank required fields instead of treating
    /// `required` as a rendering hint only
    #[serde(default)]
    pub enforce_required: bool,
    /// Extra `fieldType` tags mapped onto known types (tag -> type)
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            weekdays: WeekdaySet::default(),
            enforce_required: false,
            aliases: HashMap::new(),
        }
    }
}

fn default_title() -> String {
    "Dynamic Form Generator".to_string()
}

impl FormSettings {
    /// Dispatch table for these settings.
    pub fn registry(&self) -> FieldRegistry {
        self.aliases
            .iter()
            .fold(FieldRegistry::new(self.weekdays), |registry, (tag, kind)| {
                registry.with_alias(tag, FieldKind::from(kind.as_str()))
            })
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Emit the submission as a tracing event
    #[default]
    Log,
    /// POST the submission as JSON to `submission.url`
    Http,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct SubmissionSettings {
    #[serde(default)]
    pub sink: SinkKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Create settings from CLI arguments (config file plus CLI/env overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(File::from(cli.config.clone()).required(false))?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);

        settings.validate()?;
        Ok(settings)
    }

    /// Load `<root>/dynaform.{toml,yaml,json}` if present, defaults otherwise
    pub fn from_root(root: &str) -> Result<Self, anyhow::Error> {
        let config_path = std::path::Path::new(root).join("dynaform");
        let settings = Self::load(File::from(config_path).required(false))?;
        settings.validate()?;
        Ok(settings)
    }

    fn load<S>(source: S) -> Result<Self, anyhow::Error>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let s = Config::builder()
            .add_source(source)
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .build()?;

        Ok(s.try_deserialize()?)
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(api_url) = &cli.api_url {
            self.schema.api_url = api_url.clone();
        }
        if let Some(sink_url) = &cli.sink_url {
            self.submission.sink = SinkKind::Http;
            self.submission.url = Some(sink_url.clone());
        }
    }
}
