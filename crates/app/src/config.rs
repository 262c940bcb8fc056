use chrono::{Local, NaiveDate, Utc};
use engine::Persistence;
use serde::Deserialize;

use crate::{
    cli::GlobalArgs,
    error::{AppError, Result},
};

const DEFAULT_CONFIG_PATH: &str = "config/bashy.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding `expenses.json`, `budget.json` and `categories.json`.
    pub data_dir: String,
    /// Log level for the `bashy` and `engine` targets.
    pub level: String,
    pub persistence: Persistence,
    /// IANA timezone used to decide what "today" is. Defaults to the system
    /// local time.
    pub timezone: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            level: "warn".to_string(),
            persistence: Persistence::Immediate,
            timezone: None,
        }
    }
}

impl AppConfig {
    /// Today's calendar date in the configured timezone.
    pub fn today(&self) -> Result<NaiveDate> {
        match self.timezone.as_deref() {
            Some(name) => {
                let tz: chrono_tz::Tz = name
                    .parse()
                    .map_err(|err| AppError::Timezone(format!("{name}: {err}")))?;
                Ok(Utc::now().with_timezone(&tz).date_naive())
            }
            None => Ok(Local::now().date_naive()),
        }
    }
}

/// Layers the optional TOML file, `BASHY_*` environment variables and the
/// command-line overrides, in that order.
pub fn load(args: &GlobalArgs) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("BASHY"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(data_dir) = &args.data_dir {
        settings.data_dir = data_dir.clone();
    }
    if let Some(level) = &args.level {
        settings.level = level.clone();
    }
    if let Some(timezone) = &args.timezone {
        settings.timezone = Some(timezone.clone());
    }

    Ok(settings)
}
