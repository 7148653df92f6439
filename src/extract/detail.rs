use std::time::Duration;

use scraper::{ElementRef, Html};
use tracing::{debug, warn};

use crate::config::{CrawlConfig, SiteConfig};
use crate::extract::{css, element_text};
use crate::models::{NutritionEntry, ProductDetail};
use crate::surface::{js_string, RenderSurface};
use crate::utils::error::Result;

/// Pulls optional ingredients and nutrition-table data off one product's
/// detail page. The two extractions are independent and best-effort: either
/// failing yields `None` for that field without touching the other, and never
/// aborts the category run. Only the navigation itself propagates, so the
/// runner can skip the item.
pub struct DetailEnricher<'a> {
    site: &'a SiteConfig,
    timing: &'a CrawlConfig,
}

impl<'a> DetailEnricher<'a> {
    pub fn new(site: &'a SiteConfig, timing: &'a CrawlConfig) -> Self {
        Self { site, timing }
    }

    pub async fn enrich(&self, surface: &dyn RenderSurface, url: &str) -> Result<ProductDetail> {
        surface
            .navigate(
                url,
                Duration::from_secs(self.timing.detail_navigation_timeout_secs),
            )
            .await?;

        let ingredients = match self.extract_ingredients(surface).await {
            Ok(value) => value,
            Err(e) => {
                warn!(url, error = %e, "could not read ingredients");
                None
            }
        };

        let nutrition_facts = match self.extract_nutrition(surface).await {
            Ok(value) => value,
            Err(e) => {
                warn!(url, error = %e, "could not read nutrition facts");
                None
            }
        };

        Ok(ProductDetail {
            ingredients,
            nutrition_facts,
        })
    }

    /// Find a description key node whose text equals the configured label
    /// exactly and take its next sibling element's text.
    async fn extract_ingredients(&self, surface: &dyn RenderSurface) -> Result<Option<String>> {
        let key_selector = css(&self.site.selectors.description_key)?;
        let html = surface.content().await?;
        let document = Html::parse_document(&html);

        let value = document
            .select(&key_selector)
            .find(|el| element_text(*el) == self.site.ingredients_label)
            .and_then(|key| key.next_siblings().find_map(ElementRef::wrap))
            .map(element_text)
            .filter(|text| !text.is_empty());

        Ok(value)
    }

    /// Activate the nutrition tab if present, wait for the table to render,
    /// then read every two-cell row in document order. Rows with any other
    /// cell count are skipped.
    async fn extract_nutrition(
        &self,
        surface: &dyn RenderSurface,
    ) -> Result<Option<Vec<NutritionEntry>>> {
        let click_script = format!(
            "(() => {{ \
             const tab = Array.from(document.querySelectorAll('{}'))\
               .find(el => el.textContent.includes('{}')); \
             if (tab) {{ tab.click(); return true; }} \
             return false; }})()",
            js_string(&self.site.selectors.nutrition_tab),
            js_string(&self.site.nutrition_label),
        );

        let found = surface.evaluate(&click_script).await?;
        if found.as_bool() != Some(true) {
            debug!("no nutrition tab on detail page");
            return Ok(None);
        }

        surface
            .wait_for_selector(
                &self.site.selectors.nutrition_table,
                Duration::from_secs(self.timing.table_timeout_secs),
            )
            .await?;

        let table_selector = css(&self.site.selectors.nutrition_table)?;
        let row_selector = css("tbody tr")?;
        let cell_selector = css("td")?;

        let html = surface.content().await?;
        let document = Html::parse_document(&html);

        let Some(table) = document.select(&table_selector).next() else {
            return Ok(None);
        };

        let entries = table
            .select(&row_selector)
            .filter_map(|row| {
                let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
                match cells.as_slice() {
                    [name, value] => Some(NutritionEntry {
                        name: element_text(*name),
                        value: element_text(*value),
                    }),
                    _ => None,
                }
            })
            .collect();

        Ok(Some(entries))
    }
}
