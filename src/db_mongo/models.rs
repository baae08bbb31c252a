use serde::{Deserialize, Serialize};
use mongodb::bson::{oid::ObjectId, Bson, Document};

/// A book as this program writes it when seeding.
///
/// Reads never decode into this type: documents in the collection belong to
/// whoever wrote them and are returned as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub published_year: i32,
    pub price: f64,
    pub in_stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

impl Book {
    pub fn new(
        title: &str,
        author: &str,
        genre: &str,
        published_year: i32,
        price: f64,
        in_stock: bool,
    ) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            author: author.to_string(),
            genre: genre.to_string(),
            published_year,
            price,
            in_stock,
            pages: None,
            publisher: None,
        }
    }

    pub fn with_details(mut self, pages: i32, publisher: &str) -> Self {
        self.pages = Some(pages);
        self.publisher = Some(publisher.to_string());
        self
    }

    /// Start year of the decade the book was published in.
    pub fn decade(&self) -> i32 {
        self.published_year.div_euclid(10) * 10
    }
}

/// Numeric value of any BSON number, including `Decimal128`.
pub fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        Bson::Decimal128(_) => value
            .clone()
            .into_relaxed_extjson()
            .get("$numberDecimal")
            .and_then(|s| s.as_str())
            .and_then(|s| s.parse::<f64>().ok()),
        _ => None,
    }
}

pub fn as_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        Bson::Double(v) => Some(*v as i64),
        Bson::Decimal128(_) => as_f64(value).map(|v| v as i64),
        _ => None,
    }
}

pub fn field_str<'a>(document: &'a Document, key: &str) -> Option<&'a str> {
    document.get(key).and_then(Bson::as_str)
}

pub fn field_f64(document: &Document, key: &str) -> Option<f64> {
    document.get(key).and_then(as_f64)
}

pub fn field_i64(document: &Document, key: &str) -> Option<i64> {
    document.get(key).and_then(as_i64)
}

/// One row of the average-price-by-genre aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreAveragePrice {
    /// `None` for books without a string genre.
    pub genre: Option<String>,
    /// `None` when no book in the group has a numeric price.
    pub avg_price: Option<f64>,
}

impl GenreAveragePrice {
    pub fn from_document(document: &Document) -> Self {
        Self {
            genre: field_str(document, "_id").map(str::to_string),
            avg_price: field_f64(document, "avgPrice"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorBookCount {
    pub author: Option<String>,
    pub book_count: Option<i64>,
}

impl AuthorBookCount {
    pub fn from_document(document: &Document) -> Self {
        Self {
            author: field_str(document, "_id").map(str::to_string),
            book_count: field_i64(document, "bookCount"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecadeCount {
    /// `None` for books without a numeric `published_year`.
    pub decade: Option<i64>,
    pub count: Option<i64>,
}

impl DecadeCount {
    pub fn from_document(document: &Document) -> Self {
        Self {
            decade: field_i64(document, "decade"),
            count: field_i64(document, "count"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// The parts of an `executionStats` explain document worth reading at a glance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExplainSummary {
    /// Winning plan stages, outermost first (e.g. `FETCH`, `IXSCAN`).
    pub stages: Vec<String>,
    pub n_returned: Option<i64>,
    pub total_keys_examined: Option<i64>,
    pub total_docs_examined: Option<i64>,
    pub execution_time_millis: Option<i64>,
}

impl ExplainSummary {
    pub fn from_explain(explain: &Document) -> Self {
        let stages = explain
            .get_document("queryPlanner")
            .and_then(|planner| planner.get_document("winningPlan"))
            .map(|plan| {
                // Servers using the slot-based engine nest the classic plan.
                let plan = plan.get_document("queryPlan").unwrap_or(plan);
                plan_stages(plan)
            })
            .unwrap_or_default();

        let stats = explain.get_document("executionStats").ok();
        let stat = |key: &str| stats.and_then(|s| field_i64(s, key));

        Self {
            stages,
            n_returned: stat("nReturned"),
            total_keys_examined: stat("totalKeysExamined"),
            total_docs_examined: stat("totalDocsExamined"),
            execution_time_millis: stat("executionTimeMillis"),
        }
    }

    pub fn uses_index(&self) -> bool {
        self.stages.iter().any(|s| s == "IXSCAN")
    }
}

fn plan_stages(plan: &Document) -> Vec<String> {
    let mut stages = Vec::new();
    let mut current = Some(plan);
    while let Some(stage) = current {
        if let Ok(name) = stage.get_str("stage") {
            stages.push(name.to_string());
        }
        current = stage.get_document("inputStage").ok();
    }
    stages
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, doc, Decimal128};

    // 9.99 as coefficient 999, exponent -2
    fn decimal_9_99() -> Decimal128 {
        let high: u64 = (6176u64 - 2) << 49;
        let low: u64 = 999;
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&low.to_le_bytes());
        bytes[8..].copy_from_slice(&high.to_le_bytes());
        Decimal128::from_bytes(bytes)
    }

    #[test]
    fn test_book_roundtrip_skips_missing_id() {
        let book = Book::new("1984", "George Orwell", "Dystopian", 1949, 10.99, true);
        let doc = bson::to_document(&book).unwrap();
        assert!(!doc.contains_key("_id"));
        assert!(!doc.contains_key("pages"));
        assert_eq!(doc.get_i32("published_year").unwrap(), 1949);
    }

    #[test]
    fn test_numbers_of_any_width() {
        assert_eq!(as_f64(&Bson::Int32(7)), Some(7.0));
        assert_eq!(as_f64(&Bson::Int64(7)), Some(7.0));
        assert_eq!(as_f64(&Bson::Double(9.99)), Some(9.99));
        assert_eq!(as_f64(&Bson::Decimal128(decimal_9_99())), Some(9.99));
        assert_eq!(as_f64(&Bson::Null), None);
        assert_eq!(as_f64(&Bson::String("9.99".to_string())), None);
        assert_eq!(as_i64(&Bson::Double(1940.0)), Some(1940));
    }

    #[test]
    fn test_fields_tolerate_missing_and_mistyped_values() {
        let doc = doc! {
            "title": "Leaves of Grass",
            "author": "Walt Whitman",
            "genre": "Poetry",
            "published_year": "1855",
            "price": Bson::Decimal128(decimal_9_99()),
        };
        assert_eq!(field_str(&doc, "title"), Some("Leaves of Grass"));
        assert_eq!(field_str(&doc, "in_stock"), None);
        assert_eq!(field_i64(&doc, "published_year"), None);
        assert_eq!(field_f64(&doc, "price"), Some(9.99));
    }

    #[test]
    fn test_aggregate_rows_with_nulls() {
        let avg = GenreAveragePrice::from_document(&doc! { "_id": "Poetry", "avgPrice": Bson::Null });
        assert_eq!(avg.genre.as_deref(), Some("Poetry"));
        assert_eq!(avg.avg_price, None);

        let avg = GenreAveragePrice::from_document(&doc! { "_id": Bson::Null, "avgPrice": 10.74 });
        assert_eq!(avg.genre, None);
        assert_eq!(avg.avg_price, Some(10.74));

        let top = AuthorBookCount::from_document(&doc! { "_id": "George Orwell", "bookCount": 2 });
        assert_eq!(top.author.as_deref(), Some("George Orwell"));
        assert_eq!(top.book_count, Some(2));

        let decade = DecadeCount::from_document(&doc! { "decade": 1940.0, "count": 2 });
        assert_eq!(decade.decade, Some(1940));
        assert_eq!(decade.count, Some(2));

        let undated = DecadeCount::from_document(&doc! { "decade": Bson::Null, "count": 1 });
        assert_eq!(undated.decade, None);
    }

    #[test]
    fn test_explain_summary_classic_plan() {
        let explain = doc! {
            "queryPlanner": {
                "winningPlan": {
                    "stage": "FETCH",
                    "inputStage": { "stage": "IXSCAN", "indexName": "title_1" }
                }
            },
            "executionStats": {
                "nReturned": 1,
                "executionTimeMillis": 0,
                "totalKeysExamined": 1,
                "totalDocsExamined": 1i64,
            }
        };

        let summary = ExplainSummary::from_explain(&explain);
        assert_eq!(summary.stages, vec!["FETCH", "IXSCAN"]);
        assert!(summary.uses_index());
        assert_eq!(summary.n_returned, Some(1));
        assert_eq!(summary.total_docs_examined, Some(1));
    }

    #[test]
    fn test_explain_summary_sbe_plan_and_missing_stats() {
        let explain = doc! {
            "queryPlanner": {
                "winningPlan": {
                    "queryPlan": { "stage": "COLLSCAN" },
                    "slotBasedPlan": { "stages": "..." }
                }
            }
        };

        let summary = ExplainSummary::from_explain(&explain);
        assert_eq!(summary.stages, vec!["COLLSCAN"]);
        assert!(!summary.uses_index());
        assert_eq!(summary.n_returned, None);
    }
}
