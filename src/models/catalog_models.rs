use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review sub-document embedded in a catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub user: String,
    pub rating: f64,
    pub comment: String,
    #[serde(alias = "timestamp")]
    pub date: DateTime<Utc>,
}

impl Review {
    pub fn new(user: &str, rating: f64, comment: &str) -> Self {
        Self {
            user: user.to_string(),
            rating,
            comment: comment.to_string(),
            date: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub name: Option<String>,
    pub category: Option<String>,
    pub average_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPriceSummary {
    pub category: Option<String>,
    pub avg_price: Option<f64>,
    pub product_count: i64,
}
