use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::Tab;
use serde_json::Value;

use crate::utils::error::{CrawlError, Result};

/// The rendering collaborator: a navigable, scriptable page. The crawl core
/// only ever talks to this surface; it never issues browser-protocol calls
/// directly and never manages the browser process.
///
/// Structured extraction happens on the Rust side against `content()`;
/// `evaluate` is reserved for actions and primitive reads (counts, clicks,
/// scrolls), so parsing logic lives in exactly one place.
#[async_trait]
pub trait RenderSurface: Send + Sync {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;
    async fn evaluate(&self, script: &str) -> Result<Value>;
    /// Current rendered document HTML.
    async fn content(&self) -> Result<String>;
}

pub struct ChromeSurface {
    tab: Arc<Tab>,
}

impl ChromeSurface {
    pub fn new(tab: Arc<Tab>, user_agent: &str) -> Result<Self> {
        tab.set_user_agent(user_agent, None, None)
            .map_err(|e| CrawlError::Browser(format!("failed to set user agent: {e}")))?;
        Ok(Self { tab })
    }
}

#[async_trait]
impl RenderSurface for ChromeSurface {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        self.tab.set_default_timeout(timeout);
        self.tab
            .navigate_to(url)
            .map_err(|e| CrawlError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| CrawlError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map_err(|_| CrawlError::SelectorTimeout {
                selector: selector.to_string(),
            })?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| CrawlError::Evaluate(e.to_string()))?;
        Ok(result.value.unwrap_or(Value::Null))
    }

    async fn content(&self) -> Result<String> {
        self.tab
            .get_content()
            .map_err(|e| CrawlError::Browser(format!("failed to get page content: {e}")))
    }
}

/// Escape a string for interpolation into a single-quoted JS literal.
pub(crate) fn js_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
pub(crate) mod scripted {
    //! A scripted stand-in surface for unit tests: canned HTML documents,
    //! queued evaluate results, configurable selector timeouts.

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::Value;

    use super::RenderSurface;
    use crate::utils::error::{CrawlError, Result};

    #[derive(Default)]
    pub struct ScriptedSurface {
        pub eval_results: Mutex<VecDeque<Value>>,
        pub documents: Mutex<VecDeque<String>>,
        pub failing_selectors: Vec<String>,
        pub failing_urls: Vec<String>,
        pub navigations: Mutex<Vec<String>>,
        pub scrolls: AtomicUsize,
    }

    impl ScriptedSurface {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_document(html: &str) -> Self {
            let surface = Self::default();
            surface.push_document(html);
            surface
        }

        pub fn push_document(&self, html: &str) {
            self.documents.lock().unwrap().push_back(html.to_string());
        }

        pub fn push_eval(&self, value: Value) {
            self.eval_results.lock().unwrap().push_back(value);
        }

        pub fn scroll_count(&self) -> usize {
            self.scrolls.load(Ordering::SeqCst)
        }

        pub fn navigated_urls(&self) -> Vec<String> {
            self.navigations.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RenderSurface for ScriptedSurface {
        async fn navigate(&self, url: &str, _timeout: Duration) -> Result<()> {
            if self.failing_urls.iter().any(|u| url.contains(u.as_str())) {
                return Err(CrawlError::Navigation {
                    url: url.to_string(),
                    message: "scripted navigation failure".to_string(),
                });
            }
            self.navigations.lock().unwrap().push(url.to_string());
            Ok(())
        }

        async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<()> {
            if self.failing_selectors.iter().any(|s| s == selector) {
                return Err(CrawlError::SelectorTimeout {
                    selector: selector.to_string(),
                });
            }
            Ok(())
        }

        async fn evaluate(&self, script: &str) -> Result<Value> {
            if script.contains("scrollTo") {
                self.scrolls.fetch_add(1, Ordering::SeqCst);
                return Ok(Value::Null);
            }
            let mut queue = self.eval_results.lock().unwrap();
            Ok(queue.pop_front().unwrap_or(Value::Null))
        }

        async fn content(&self) -> Result<String> {
            let mut docs = self.documents.lock().unwrap();
            if docs.len() > 1 {
                Ok(docs.pop_front().unwrap())
            } else {
                docs.front().cloned().ok_or_else(|| {
                    CrawlError::Browser("scripted surface has no document".to_string())
                })
            }
        }
    }
}
