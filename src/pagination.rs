use std::time::Duration;

use tracing::{debug, info};

use crate::config::{CrawlConfig, SelectorConfig};
use crate::surface::{js_string, RenderSurface};
use crate::utils::error::Result;

/// Drives infinite-scroll pagination until the loaded card count stops
/// growing. Growth stalling is the only termination signal; an endlessly
/// growing virtualized list would keep this loop alive, which is an accepted
/// limitation rather than a silent cap.
pub struct PaginationDriver<'a> {
    selectors: &'a SelectorConfig,
    timing: &'a CrawlConfig,
}

impl<'a> PaginationDriver<'a> {
    pub fn new(selectors: &'a SelectorConfig, timing: &'a CrawlConfig) -> Self {
        Self { selectors, timing }
    }

    /// Scroll the already-navigated category page until the card count is
    /// stable; returns the final count. Propagates if the product container
    /// never appears — no partial page is usable.
    pub async fn load_all(&self, surface: &dyn RenderSurface) -> Result<usize> {
        surface
            .wait_for_selector(
                &self.selectors.product_container,
                Duration::from_secs(self.timing.container_timeout_secs),
            )
            .await?;

        let mut previous = self.count_cards(surface).await?;
        loop {
            surface
                .evaluate("window.scrollTo(0, document.body.scrollHeight)")
                .await?;
            tokio::time::sleep(Duration::from_millis(self.timing.settle_delay_ms)).await;

            let current = self.count_cards(surface).await?;
            if current <= previous {
                info!(total = current, "page bottom reached, all products loaded");
                return Ok(current);
            }
            debug!(total = current, "new products loaded");
            previous = current;
        }
    }

    async fn count_cards(&self, surface: &dyn RenderSurface) -> Result<usize> {
        let script = format!(
            "(() => {{ const c = document.querySelector('{}'); \
             return c ? c.querySelectorAll('{}').length : 0; }})()",
            js_string(&self.selectors.product_container),
            js_string(&self.selectors.product_card),
        );
        let value = surface.evaluate(&script).await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }
}
