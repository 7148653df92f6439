pub mod config;
pub mod discover;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod pagination;
pub mod runner;
pub mod surface;
pub mod utils;
pub mod writer;

// Re-export commonly used types
pub use config::{AppConfig, SelectorConfig, SiteConfig};
pub use models::{NutritionEntry, ProductDetail, ProductRecord, ProductSummary};
pub use surface::RenderSurface;
pub use utils::error::CrawlError;

pub type Result<T> = std::result::Result<T, CrawlError>;
