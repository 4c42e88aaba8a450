//! Catalog import
//!
//! Accepts the JSON list of parts a supplier catalog export produces and
//! upserts it by SKU into one branch's view of the catalog.

use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::models::{NewPart, PartCreate};
use sqlx::PgPool;

use crate::BoxError;
use crate::db::parts::BranchMerge;

/// One exported part
#[derive(Debug, Clone, Deserialize)]
pub struct ImportItem {
    #[serde(alias = "code")]
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    #[serde(alias = "price")]
    pub retail_price: f64,
    pub wholesale_price: Option<f64>,
    /// Purchase cost at the importing branch
    pub cost_price: Option<f64>,
    /// Quantity on hand at the importing branch
    pub stock: Option<i64>,
    pub min_stock: Option<i64>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImportFile {
    List(Vec<ImportItem>),
    Wrapped { parts: Vec<ImportItem> },
}

/// Parse an export: either a bare array or `{ "parts": [...] }`
pub fn parse_import_file(text: &str) -> Result<Vec<ImportItem>, serde_json::Error> {
    let file: ImportFile = serde_json::from_str(text)?;
    Ok(match file {
        ImportFile::List(items) | ImportFile::Wrapped { parts: items } => items,
    })
}

/// Read and parse an export file
pub fn read_import_file(path: &Path) -> Result<Vec<ImportItem>, BoxError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    Ok(parse_import_file(&text)?)
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedItem {
    /// Position in the file, from 0
    pub index: usize,
    pub sku: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: Vec<SkippedItem>,
}

impl ImportItem {
    /// Validated part with create defaults, plus the branch entries to merge
    /// into an existing part
    pub fn into_part(self, branch_id: &str) -> Result<(NewPart, BranchMerge), String> {
        let mut merge = BranchMerge::default();
        if let Some(cost) = self.cost_price {
            merge.cost_price.insert(branch_id.to_string(), cost);
        }
        if let Some(qty) = self.stock {
            merge.stock.insert(branch_id.to_string(), qty);
        }

        let create = PartCreate {
            sku: self.sku,
            name: self.name,
            category: self.category,
            unit: self.unit,
            retail_price: self.retail_price,
            wholesale_price: self.wholesale_price,
            cost_price: Some(merge.cost_price.clone()),
            stock: Some(merge.stock.clone()),
            min_stock: self.min_stock,
            description: self.description,
        };
        create.validate()?;
        Ok((create.into_new_part(branch_id), merge))
    }
}

pub async fn import_parts(
    pool: &PgPool,
    branch_id: &str,
    items: Vec<ImportItem>,
) -> Result<ImportReport, BoxError> {
    let mut report = ImportReport::default();
    let now = shared::util::now_millis();

    for (index, item) in items.into_iter().enumerate() {
        let sku = item.sku.trim().to_string();
        let (part, merge) = match item.into_part(branch_id) {
            Ok(parsed) => parsed,
            Err(reason) => {
                tracing::warn!(index, sku = %sku, reason = %reason, "Skipping import item");
                report.skipped.push(SkippedItem { index, sku, reason });
                continue;
            }
        };

        let created =
            crate::db::parts::upsert_by_sku(pool, shared::util::snowflake_id(), &part, &merge, now)
                .await?;
        if created {
            report.created += 1;
        } else {
            report.updated += 1;
        }
    }

    tracing::info!(
        branch_id,
        created = report.created,
        updated = report.updated,
        skipped = report.skipped.len(),
        "Catalog import complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_export_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"parts":[{{"sku":"YSS-1","name":"Shock","retail_price":1}}]}}"#).unwrap();
        let items = read_import_file(file.path()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].sku, "YSS-1");

        let missing = read_import_file(Path::new("/nonexistent/parts.json")).unwrap_err();
        assert!(missing.to_string().contains("failed to read"));
    }

    #[test]
    fn parses_bare_and_wrapped_lists() {
        let bare = r#"[{"code":"NGK-C7","name":"Spark plug C7HSA","price":45000}]"#;
        let items = parse_import_file(bare).unwrap();
        assert_eq!(items[0].sku, "NGK-C7");
        assert_eq!(items[0].retail_price, 45_000.0);

        let wrapped = r#"{"parts":[
            {"sku":"DID-428","name":"Chain 428","retail_price":180000,"stock":4,"cost_price":150000}
        ]}"#;
        let items = parse_import_file(wrapped).unwrap();
        assert_eq!(items[0].stock, Some(4));

        assert!(parse_import_file(r#"{"items":[]}"#).is_err());
    }

    #[test]
    fn explicit_figures_go_to_the_importing_branch() {
        let item: ImportItem = serde_json::from_str(
            r#"{"sku":" DID-428 ","name":"Chain 428","price":180000,"stock":4,"cost_price":150000}"#,
        )
        .unwrap();
        let (part, merge) = item.into_part("CN3").unwrap();
        assert_eq!(part.sku, "DID-428");
        assert_eq!(part.stock.get("CN3"), Some(&4));
        assert_eq!(merge.cost_price.get("CN3"), Some(&150_000.0));
        assert_eq!(merge.stock.get("CN3"), Some(&4));
    }

    #[test]
    fn missing_figures_default_on_insert_only() {
        let item: ImportItem =
            serde_json::from_str(r#"{"sku":"X1","name":"Mirror","price":60000}"#).unwrap();
        let (part, merge) = item.into_part("CN1").unwrap();
        // a new part starts at zero for the branch...
        assert_eq!(part.stock.get("CN1"), Some(&0));
        assert_eq!(part.cost_price.get("CN1"), Some(&0.0));
        // ...an existing one keeps what it has
        assert!(merge.stock.is_empty());
        assert!(merge.cost_price.is_empty());
    }

    #[test]
    fn invalid_items_are_rejected() {
        let item: ImportItem =
            serde_json::from_str(r#"{"sku":"","name":"Nameless","price":1}"#).unwrap();
        assert!(item.into_part("CN1").is_err());

        let item: ImportItem =
            serde_json::from_str(r#"{"sku":"N1","name":"Bad","price":-4}"#).unwrap();
        assert!(item.into_part("CN1").is_err());
    }
}
