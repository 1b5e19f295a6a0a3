use std::time::Duration;

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub api_keys: ApiKeySettings,
    pub completion: CompletionSettings,
    pub search: SearchSettings,
    pub news: NewsSettings,
    pub competitors: CompetitorSettings,
    pub storage: StorageSettings,
    #[serde(default)]
    pub benchmarks: BenchmarkSettings,
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(Deserialize, Clone)]
pub struct ApiKeySettings {
    #[serde(default)]
    pub gemini: String,
}

#[derive(Deserialize, Clone)]
pub struct CompletionSettings {
    pub model: String,
    pub api_base: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub daily_limit: u32,
    pub quota_file: String,
}

#[derive(Deserialize, Clone)]
pub struct SearchSettings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_requests: usize,
    pub request_delay_secs: u64,
    pub top_results: usize,
}

impl SearchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_secs)
    }
}

#[derive(Deserialize, Clone)]
pub struct NewsSettings {
    pub feeds: Vec<String>,
    pub max_articles: usize,
    pub max_requests: usize,
    pub entries_per_feed: usize,
    pub request_delay_secs: u64,
    pub ttl_hours: i64,
}

#[derive(Deserialize, Clone)]
pub struct CompetitorSettings {
    pub ttl_days: i64,
}

#[derive(Deserialize, Clone)]
pub struct StorageSettings {
    pub insights_dir: String,
}

#[derive(Deserialize, Clone, Default)]
pub struct BenchmarkSettings {
    /// Overrides the built-in lower-is-better metric list when non-empty.
    #[serde(default)]
    pub lower_is_better: Vec<String>,
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT.");
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(
            config::File::from(configuration_directory.join(environment_filename)).required(false),
        )
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("api_keys.gemini", std::env::var("GOOGLE_API_KEY").ok())?
        .build()?;

    settings.try_deserialize::<Settings>()
}
