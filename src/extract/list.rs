use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::config::{CrawlConfig, SiteConfig};
use crate::extract::{css, element_text};
use crate::models::ProductSummary;
use crate::normalize::normalize_price;
use crate::surface::RenderSurface;
use crate::utils::error::{CrawlError, Result};

/// Reads every rendered product card on a fully-paginated category page into
/// a `ProductSummary`. Cards without a usable name or price are filtered out,
/// not errors.
pub struct ListExtractor<'a> {
    site: &'a SiteConfig,
    timing: &'a CrawlConfig,
}

struct CardSelectors {
    card: Selector,
    title: Selector,
    link: Selector,
    image: Selector,
    price_container: Selector,
    discount_container: Selector,
    original_price: Selector,
    discounted_price: Selector,
}

impl<'a> ListExtractor<'a> {
    pub fn new(site: &'a SiteConfig, timing: &'a CrawlConfig) -> Self {
        Self { site, timing }
    }

    pub async fn extract(&self, surface: &dyn RenderSurface) -> Result<Vec<ProductSummary>> {
        let selectors = self.card_selectors()?;

        match surface
            .wait_for_selector(
                &self.site.selectors.product_card,
                Duration::from_secs(self.timing.card_timeout_secs),
            )
            .await
        {
            Ok(()) => {}
            Err(CrawlError::SelectorTimeout { selector }) => {
                // Zero extractable products is a valid, if unusual, outcome.
                warn!(%selector, "product card selector never matched, category is empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        }

        let origin = self.site.origin()?;
        let html = surface.content().await?;
        let document = Html::parse_document(&html);

        let summaries: Vec<ProductSummary> = document
            .select(&selectors.card)
            .map(|card| self.card_summary(card, &selectors, &origin))
            .filter(|summary| summary.is_valid())
            .collect();

        debug!(count = summaries.len(), "extracted product summaries");
        Ok(summaries)
    }

    fn card_summary(
        &self,
        card: ElementRef,
        selectors: &CardSelectors,
        origin: &Url,
    ) -> ProductSummary {
        let name = card
            .select(&selectors.title)
            .next()
            .map(element_text)
            .unwrap_or_default();

        // Brand is derived, never scraped: the uppercased first token of the name.
        let brand = name
            .split_whitespace()
            .next()
            .map(|token| token.to_uppercase());

        let url = card
            .select(&selectors.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| origin.join(href).ok())
            .map(|u| u.to_string());

        let image_url = card
            .select(&selectors.image)
            .next()
            .and_then(|img| img.value().attr("src"))
            .and_then(|src| origin.join(src).ok())
            .map(|u| u.to_string());

        let (price, discounted_price) = match card.select(&selectors.discount_container).next() {
            Some(discount_box) => {
                let original = discount_box
                    .select(&selectors.original_price)
                    .next()
                    .map(element_text);
                let discounted = discount_box
                    .select(&selectors.discounted_price)
                    .next()
                    .map(element_text);
                (
                    original.as_deref().and_then(normalize_price),
                    discounted.as_deref().and_then(normalize_price),
                )
            }
            None => {
                let original = card
                    .select(&selectors.price_container)
                    .next()
                    .map(element_text)
                    .or_else(|| {
                        card.select(&selectors.original_price)
                            .next()
                            .map(element_text)
                    });
                (original.as_deref().and_then(normalize_price), None)
            }
        };

        ProductSummary {
            name,
            brand,
            price,
            discounted_price,
            image_url,
            url,
        }
    }

    fn card_selectors(&self) -> Result<CardSelectors> {
        let s = &self.site.selectors;
        Ok(CardSelectors {
            card: css(&s.product_card)?,
            title: css(&s.product_title)?,
            link: css(&s.product_link)?,
            image: css(&s.product_image)?,
            price_container: css(&s.price_container)?,
            discount_container: css(&s.discounted_price_container)?,
            original_price: css(&s.original_price)?,
            discounted_price: css(&s.discounted_price)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::test_selectors;
    use crate::surface::scripted::ScriptedSurface;

    fn test_site() -> SiteConfig {
        SiteConfig {
            url: "https://market.example.com".to_string(),
            ingredients_label: "İçindekiler".to_string(),
            nutrition_label: "Enerji ve Besin Öğeleri".to_string(),
            category_blacklist: Vec::new(),
            stop_category_at: String::new(),
            selectors: test_selectors(),
        }
    }

    fn page(cards: &str) -> String {
        format!("<html><body><div class=\"product-list\">{cards}</div></body></html>")
    }

    const PLAIN_CARD: &str = r#"
        <article class="product-card">
          <a href="/urun/x-milk"><h2 class="title">X Milk 1L</h2></a>
          <img src="/img/x-milk.jpg">
          <span class="price">19,90 TL</span>
        </article>"#;

    const DISCOUNTED_CARD: &str = r#"
        <article class="product-card">
          <a href="/urun/y-yogurt"><h2 class="title">Y Yogurt</h2></a>
          <img src="https://cdn.example.com/y.jpg">
          <div class="discount">
            <span class="original">54,50 TL</span>
            <span class="discounted">1.049,95 TL</span>
          </div>
        </article>"#;

    const PRICELESS_CARD: &str = r#"
        <article class="product-card">
          <a href="/urun/z"><h2 class="title">Z Cheese</h2></a>
        </article>"#;

    #[tokio::test]
    async fn test_plain_card_has_no_discount() {
        let surface = ScriptedSurface::with_document(&page(PLAIN_CARD));
        let site = test_site();
        let timing = CrawlConfig::default();

        let summaries = ListExtractor::new(&site, &timing)
            .extract(&surface)
            .await
            .unwrap();

        assert_eq!(summaries.len(), 1);
        let p = &summaries[0];
        assert_eq!(p.name, "X Milk 1L");
        assert_eq!(p.brand.as_deref(), Some("X"));
        assert_eq!(p.price, Some(19.90));
        assert_eq!(p.discounted_price, None);
        assert_eq!(p.url.as_deref(), Some("https://market.example.com/urun/x-milk"));
        assert_eq!(
            p.image_url.as_deref(),
            Some("https://market.example.com/img/x-milk.jpg")
        );
    }

    #[tokio::test]
    async fn test_discount_container_branch() {
        let surface = ScriptedSurface::with_document(&page(DISCOUNTED_CARD));
        let site = test_site();
        let timing = CrawlConfig::default();

        let summaries = ListExtractor::new(&site, &timing)
            .extract(&surface)
            .await
            .unwrap();

        assert_eq!(summaries.len(), 1);
        let p = &summaries[0];
        assert_eq!(p.price, Some(54.50));
        assert_eq!(p.discounted_price, Some(1049.95));
        assert_eq!(p.image_url.as_deref(), Some("https://cdn.example.com/y.jpg"));
    }

    #[tokio::test]
    async fn test_priceless_card_filtered() {
        let surface =
            ScriptedSurface::with_document(&page(&format!("{PLAIN_CARD}{PRICELESS_CARD}")));
        let site = test_site();
        let timing = CrawlConfig::default();

        let summaries = ListExtractor::new(&site, &timing)
            .extract(&surface)
            .await
            .unwrap();

        assert_eq!(summaries.len(), 1);
        assert!(summaries.iter().all(|p| !p.name.is_empty() && p.price.is_some()));
    }

    #[tokio::test]
    async fn test_card_timeout_yields_empty() {
        let mut surface = ScriptedSurface::with_document("<html></html>");
        surface.failing_selectors = vec!["article.product-card".to_string()];
        let site = test_site();
        let timing = CrawlConfig::default();

        let summaries = ListExtractor::new(&site, &timing)
            .extract(&surface)
            .await
            .unwrap();
        assert!(summaries.is_empty());
    }
}
