use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use headless_chrome::{Browser, LaunchOptions};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog_crawler::config::{AppConfig, SiteConfig};
use catalog_crawler::runner::{CategoryRunner, RunContext};
use catalog_crawler::surface::ChromeSurface;

#[derive(Parser, Debug)]
#[command(name = "catalog-crawler", about = "Crawl a site's category pages into JSON catalogs")]
struct Args {
    /// Site name; selectors are read from <sites-dir>/<site>.toml
    #[arg(long)]
    site: String,

    #[arg(long, default_value = "config")]
    config_dir: String,

    #[arg(long, default_value = "sites")]
    sites_dir: String,

    /// Override the configured output directory
    #[arg(long)]
    output_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut app = AppConfig::from_env(&args.config_dir).context("loading configuration")?;
    if let Some(dir) = args.output_dir {
        app.output.dir = dir;
    }

    std::fs::create_dir_all(&app.output.dir)?;
    std::fs::create_dir_all(&app.output.log_dir)?;

    let file_appender = tracing_appender::rolling::never(&app.output.log_dir, "crawler.log");
    let (log_file, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("catalog_crawler=info".parse()?))
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(log_file))
        .init();

    let site = SiteConfig::load(&args.sites_dir, &args.site).context("loading site selectors")?;
    info!(site = %args.site, url = %site.url, "starting crawl");

    let browser = launch_browser(&app)?;
    let tab = browser.new_tab().map_err(|e| anyhow!("failed to open tab: {e}"))?;
    let surface = ChromeSurface::new(tab, &app.browser.user_agent)?;

    let ctx = RunContext::new(Box::new(surface), app, site);
    let summary = CategoryRunner::new(&ctx).run().await?;

    if !summary.is_success() {
        return Err(anyhow!(
            "{} of {} categories aborted",
            summary.aborted.len(),
            summary.aborted.len() + summary.completed.len()
        ));
    }

    info!(products = summary.total_products, "all categories processed");
    Ok(())
}

fn launch_browser(app: &AppConfig) -> Result<Browser> {
    let mut launch_options = LaunchOptions::default_builder()
        .headless(true)
        .sandbox(false)
        .window_size(Some((app.browser.window_width, app.browser.window_height)))
        .args(vec![
            std::ffi::OsStr::new("--no-sandbox"),
            std::ffi::OsStr::new("--disable-dev-shm-usage"),
            std::ffi::OsStr::new("--disable-gpu"),
            std::ffi::OsStr::new("--disable-extensions"),
        ])
        .build()
        .map_err(|e| anyhow!("failed to create launch options: {e}"))?;

    if let Some(chrome_path) = &app.browser.chrome_path {
        launch_options.path = Some(PathBuf::from(chrome_path));
    }

    Browser::new(launch_options).map_err(|e| anyhow!("failed to launch browser: {e}"))
}
