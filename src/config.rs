use std::env;
use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub browser: BrowserConfig,
    pub crawl: CrawlConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub user_agent: String,
    pub chrome_path: Option<String>,
    pub window_width: u32,
    pub window_height: u32,
}

/// Timeouts and delays for the crawl loop. Selector waits are short and
/// bounded; navigations get more headroom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,
    #[serde(default = "default_detail_timeout")]
    pub detail_navigation_timeout_secs: u64,
    #[serde(default = "default_menu_timeout")]
    pub menu_timeout_secs: u64,
    #[serde(default = "default_container_timeout")]
    pub container_timeout_secs: u64,
    #[serde(default = "default_card_timeout")]
    pub card_timeout_secs: u64,
    #[serde(default = "default_table_timeout")]
    pub table_timeout_secs: u64,
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
}

fn default_navigation_timeout() -> u64 {
    60
}
fn default_detail_timeout() -> u64 {
    30
}
fn default_menu_timeout() -> u64 {
    15
}
fn default_container_timeout() -> u64 {
    10
}
fn default_card_timeout() -> u64 {
    15
}
fn default_table_timeout() -> u64 {
    10
}
fn default_settle_delay() -> u64 {
    2000
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_secs: default_navigation_timeout(),
            detail_navigation_timeout_secs: default_detail_timeout(),
            menu_timeout_secs: default_menu_timeout(),
            container_timeout_secs: default_container_timeout(),
            card_timeout_secs: default_card_timeout(),
            table_timeout_secs: default_table_timeout(),
            settle_delay_ms: default_settle_delay(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: String,
    pub log_dir: String,
}

impl AppConfig {
    pub fn from_env(config_dir: &str) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(File::with_name(&format!("{config_dir}/default")))
            // Add environment-specific config
            .add_source(File::with_name(&format!("{config_dir}/{run_mode}")).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name(&format!("{config_dir}/local")).required(false))
            // Add environment variables with prefix "CATALOG_"
            .add_source(Environment::with_prefix("CATALOG").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        if config.browser.chrome_path.is_none() {
            config.browser.chrome_path = env::var("CHROME_PATH").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crawl.settle_delay_ms == 0 {
            return Err(ConfigError::Message(
                "crawl.settle_delay_ms must be greater than 0".into(),
            ));
        }

        if self.crawl.navigation_timeout_secs == 0 || self.crawl.container_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "crawl timeouts must be greater than 0".into(),
            ));
        }

        if self.output.dir.is_empty() {
            return Err(ConfigError::Message("output.dir must not be empty".into()));
        }

        Ok(())
    }
}

/// Selector strings for each logical role on the target site. Supplied per
/// site, immutable for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    pub category_menu: String,
    pub product_container: String,
    pub product_card: String,
    pub product_title: String,
    pub product_link: String,
    pub product_image: String,
    pub price_container: String,
    pub discounted_price_container: String,
    pub original_price: String,
    pub discounted_price: String,
    pub nutrition_tab: String,
    pub nutrition_table: String,
    pub description_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site root; category discovery starts here and relative hrefs resolve
    /// against it.
    pub url: String,
    pub ingredients_label: String,
    pub nutrition_label: String,
    #[serde(default)]
    pub category_blacklist: Vec<String>,
    #[serde(default)]
    pub stop_category_at: String,
    pub selectors: SelectorConfig,
}

impl SiteConfig {
    pub fn load(sites_dir: &str, site: &str) -> Result<Self, ConfigError> {
        let path = format!("{sites_dir}/{site}");
        if !Path::new(&format!("{path}.toml")).exists() {
            return Err(ConfigError::Message(format!(
                "no site configuration found at {path}.toml"
            )));
        }

        let s = Config::builder()
            .add_source(File::with_name(&path))
            .build()?;

        let config: SiteConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if Url::parse(&self.url).is_err() {
            return Err(ConfigError::Message(format!(
                "invalid site URL: {}",
                self.url
            )));
        }

        let required = [
            ("category_menu", &self.selectors.category_menu),
            ("product_container", &self.selectors.product_container),
            ("product_card", &self.selectors.product_card),
            ("product_title", &self.selectors.product_title),
            ("product_link", &self.selectors.product_link),
        ];
        for (name, value) in required {
            if value.is_empty() {
                return Err(ConfigError::Message(format!(
                    "selectors.{name} must not be empty"
                )));
            }
        }

        Ok(())
    }

    pub fn origin(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.url)
    }
}
