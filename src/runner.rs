use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::config::{AppConfig, SiteConfig};
use crate::discover::CategoryDiscoverer;
use crate::extract::{DetailEnricher, ListExtractor};
use crate::models::{ProductDetail, ProductRecord};
use crate::pagination::PaginationDriver;
use crate::surface::RenderSurface;
use crate::utils::error::Result;
use crate::writer::{category_slug, CatalogWriter};

/// Everything one run owns: the single render surface, the merged
/// configuration, and the catalog writer. Passed explicitly instead of living
/// in process globals, so several runs can coexist in one process.
pub struct RunContext {
    pub surface: Box<dyn RenderSurface>,
    pub app: AppConfig,
    pub site: SiteConfig,
    pub writer: CatalogWriter,
}

impl RunContext {
    pub fn new(surface: Box<dyn RenderSurface>, app: AppConfig, site: SiteConfig) -> Self {
        let writer = CatalogWriter::new(&app.output.dir);
        Self {
            surface,
            app,
            site,
            writer,
        }
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub completed: Vec<String>,
    pub aborted: Vec<String>,
    pub total_products: usize,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.aborted.is_empty()
    }
}

/// Orchestrates the whole crawl: discovery, then one sequential pass per
/// category (navigate, paginate, extract, enrich each item, persist).
/// Failures inside a category mark it aborted and the run moves on; write and
/// serialization failures stay fatal.
pub struct CategoryRunner<'a> {
    ctx: &'a RunContext,
}

impl<'a> CategoryRunner<'a> {
    pub fn new(ctx: &'a RunContext) -> Self {
        Self { ctx }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();

        let discoverer = CategoryDiscoverer::new(&self.ctx.site, &self.ctx.app.crawl);
        let categories = discoverer.discover(self.ctx.surface.as_ref()).await?;

        let mut summary = RunSummary {
            started_at,
            finished_at: started_at,
            completed: Vec::new(),
            aborted: Vec::new(),
            total_products: 0,
        };

        for link in &categories {
            let slug = category_slug(link);
            info!(category = %slug, url = %link, "crawling category");

            match self.run_category(link, &slug).await {
                Ok(count) => {
                    summary.total_products += count;
                    summary.completed.push(slug);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    error!(category = %slug, error = %e, "category aborted");
                    summary.aborted.push(slug);
                }
            }
        }

        summary.finished_at = Utc::now();
        info!(
            completed = summary.completed.len(),
            aborted = summary.aborted.len(),
            products = summary.total_products,
            "run finished"
        );
        Ok(summary)
    }

    async fn run_category(&self, link: &str, slug: &str) -> Result<usize> {
        let surface = self.ctx.surface.as_ref();
        let crawl = &self.ctx.app.crawl;

        surface
            .navigate(link, Duration::from_secs(crawl.navigation_timeout_secs))
            .await?;

        let total_loaded = PaginationDriver::new(&self.ctx.site.selectors, crawl)
            .load_all(surface)
            .await?;
        info!(category = %slug, total_loaded, "pagination settled");

        let summaries = ListExtractor::new(&self.ctx.site, crawl)
            .extract(surface)
            .await?;

        let enricher = DetailEnricher::new(&self.ctx.site, crawl);
        let total = summaries.len();
        let mut records: Vec<ProductRecord> = Vec::with_capacity(total);

        for (index, summary) in summaries.into_iter().enumerate() {
            info!(category = %slug, item = index + 1, total, "inspecting product detail page");

            let detail = match summary.url.as_deref() {
                Some(url) => match enricher.enrich(surface, url).await {
                    Ok(detail) => detail,
                    Err(e) => {
                        warn!(url, error = %e, "detail fetch failed, keeping summary only");
                        ProductDetail::default()
                    }
                },
                None => {
                    warn!(product = %summary.name, "product has no detail URL");
                    ProductDetail::default()
                }
            };

            records.push(summary.into_record(detail));
        }

        self.ctx.writer.write(slug, &records)?;
        Ok(records.len())
    }
}
