use serde::{Deserialize, Serialize};

/// One product card as read off a category page. `url` is a crawl-time key
/// used to reach the detail page; it never appears in the persisted catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub name: String,
    pub brand: Option<String>,
    pub price: Option<f64>,
    pub discounted_price: Option<f64>,
    pub image_url: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NutritionEntry {
    pub name: String,
    pub value: String,
}

/// Optional data lifted from a product's detail page. Both fields are
/// best-effort; either can be absent independently.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub ingredients: Option<String>,
    pub nutrition_facts: Option<Vec<NutritionEntry>>,
}

/// The persisted catalog entry: summary merged with detail, URL dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub name: String,
    pub brand: Option<String>,
    pub price: Option<f64>,
    pub discounted_price: Option<f64>,
    pub image_url: Option<String>,
    pub ingredients: Option<String>,
    pub nutrition_facts: Option<Vec<NutritionEntry>>,
}

impl ProductSummary {
    /// A summary is persistable only with a name and a parsed price.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && self.price.is_some()
    }

    pub fn into_record(self, detail: ProductDetail) -> ProductRecord {
        ProductRecord {
            name: self.name,
            brand: self.brand,
            price: self.price,
            discounted_price: self.discounted_price,
            image_url: self.image_url,
            ingredients: detail.ingredients,
            nutrition_facts: detail.nutrition_facts,
        }
    }
}
