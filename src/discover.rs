use std::collections::HashSet;
use std::time::Duration;

use scraper::Html;
use tracing::info;

use crate::config::{CrawlConfig, SiteConfig};
use crate::extract::css;
use crate::surface::RenderSurface;
use crate::utils::error::Result;

/// Reads the navigation menu on the site root and produces the ordered,
/// deduplicated list of category URLs to crawl. A missing menu is fatal for
/// the run.
pub struct CategoryDiscoverer<'a> {
    site: &'a SiteConfig,
    timing: &'a CrawlConfig,
}

impl<'a> CategoryDiscoverer<'a> {
    pub fn new(site: &'a SiteConfig, timing: &'a CrawlConfig) -> Self {
        Self { site, timing }
    }

    pub async fn discover(&self, surface: &dyn RenderSurface) -> Result<Vec<String>> {
        surface
            .navigate(
                &self.site.url,
                Duration::from_secs(self.timing.navigation_timeout_secs),
            )
            .await?;
        surface
            .wait_for_selector(
                &self.site.selectors.category_menu,
                Duration::from_secs(self.timing.menu_timeout_secs),
            )
            .await?;

        let menu_selector = css(&self.site.selectors.category_menu)?;
        let link_selector = css(&self.site.selectors.product_link)?;
        let origin = self.site.origin()?;

        let html = surface.content().await?;
        let document = Html::parse_document(&html);

        let links: Vec<String> = document
            .select(&menu_selector)
            .flat_map(|menu| menu.select(&link_selector))
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| origin.join(href).ok())
            .map(|url| url.to_string())
            .collect();

        let categories = self.filter_links(links);
        info!(count = categories.len(), "category links discovered");
        Ok(categories)
    }

    /// Blacklist first, then truncate at the stop marker, then dedup keeping
    /// first-seen order. The stop-marker link itself is excluded.
    fn filter_links(&self, links: Vec<String>) -> Vec<String> {
        let filtered: Vec<String> = links
            .into_iter()
            .filter(|link| {
                !self
                    .site
                    .category_blacklist
                    .iter()
                    .any(|word| link.contains(word.as_str()))
            })
            .collect();

        let stop_index = if self.site.stop_category_at.is_empty() {
            None
        } else {
            filtered
                .iter()
                .position(|link| link.contains(&self.site.stop_category_at))
        };
        let truncated = match stop_index {
            Some(index) => &filtered[..index],
            None => &filtered[..],
        };

        let mut seen = HashSet::new();
        truncated
            .iter()
            .filter(|link| seen.insert(link.to_string()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::test_selectors;
    use crate::surface::scripted::ScriptedSurface;
    use crate::utils::error::CrawlError;

    fn test_site() -> SiteConfig {
        SiteConfig {
            url: "https://market.example.com".to_string(),
            ingredients_label: "İçindekiler".to_string(),
            nutrition_label: "Enerji ve Besin Öğeleri".to_string(),
            category_blacklist: vec!["kampanya".to_string()],
            stop_category_at: "elektronik".to_string(),
            selectors: test_selectors(),
        }
    }

    const MENU_PAGE: &str = r#"
        <html><body>
          <nav class="categories">
            <a href="/kategori/sut-urunleri">Süt</a>
            <a href="/kategori/atistirmalik">Atıştırmalık</a>
            <a href="/kampanya/haftanin-yildizlari">Kampanya</a>
            <a href="/kategori/elektronik">Elektronik</a>
            <a href="/kategori/ev-gerecleri">Ev</a>
            <a href="/kategori/sut-urunleri">Süt (tekrar)</a>
          </nav>
        </body></html>"#;

    #[tokio::test]
    async fn test_blacklist_stop_marker_and_dedup() {
        let surface = ScriptedSurface::with_document(MENU_PAGE);
        let site = test_site();
        let timing = CrawlConfig::default();

        let links = CategoryDiscoverer::new(&site, &timing)
            .discover(&surface)
            .await
            .unwrap();

        assert_eq!(
            links,
            vec![
                "https://market.example.com/kategori/sut-urunleri".to_string(),
                "https://market.example.com/kategori/atistirmalik".to_string(),
            ]
        );
        assert_eq!(
            surface.navigated_urls(),
            vec!["https://market.example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn test_no_stop_marker_keeps_all() {
        let surface = ScriptedSurface::with_document(MENU_PAGE);
        let mut site = test_site();
        site.stop_category_at = "hirdavat".to_string();
        let timing = CrawlConfig::default();

        let links = CategoryDiscoverer::new(&site, &timing)
            .discover(&surface)
            .await
            .unwrap();

        // Blacklisted link dropped, duplicate collapsed, everything else kept.
        assert_eq!(links.len(), 4);
        assert!(links.iter().all(|l| !l.contains("kampanya")));
    }

    #[tokio::test]
    async fn test_missing_menu_is_fatal() {
        let mut surface = ScriptedSurface::with_document(MENU_PAGE);
        surface.failing_selectors = vec!["nav.categories".to_string()];
        let site = test_site();
        let timing = CrawlConfig::default();

        let result = CategoryDiscoverer::new(&site, &timing)
            .discover(&surface)
            .await;
        assert!(matches!(result, Err(CrawlError::SelectorTimeout { .. })));
    }
}
