//! Owner reference repair
//!
//! Older product records store `owner` as the user's hex id string instead
//! of an ObjectId. [`OwnerMaintenance::migrate_owners`] rewrites them in
//! place and [`OwnerMaintenance::owner_diagnostics`] reports what is stored.

use mongodb::bson::{Bson, Document, oid::ObjectId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

use crate::error::ProductResult;
use crate::repository::ProductRepository;

/// The `owner` field exactly as stored.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredOwner {
    Reference(ObjectId),
    Legacy(String),
    Missing,
    /// Any other BSON type, by type name
    Other(String),
}

impl StoredOwner {
    pub fn from_bson(value: Option<&Bson>) -> Self {
        match value {
            Some(Bson::ObjectId(id)) => StoredOwner::Reference(*id),
            Some(Bson::String(raw)) => StoredOwner::Legacy(raw.clone()),
            None | Some(Bson::Null) => StoredOwner::Missing,
            Some(other) => StoredOwner::Other(format!("{:?}", other.element_type())),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            StoredOwner::Reference(_) => "objectId",
            StoredOwner::Legacy(_) => "string",
            StoredOwner::Missing => "missing",
            StoredOwner::Other(name) => name,
        }
    }

    fn display(&self) -> Option<String> {
        match self {
            StoredOwner::Reference(id) => Some(id.to_hex()),
            StoredOwner::Legacy(raw) => Some(raw.clone()),
            StoredOwner::Missing | StoredOwner::Other(_) => None,
        }
    }
}

/// Raw view of a product record for owner maintenance
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerRecord {
    pub id: ObjectId,
    pub name: String,
    pub owner: StoredOwner,
}

impl OwnerRecord {
    /// `None` when the document has no ObjectId `_id`.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let id = doc.get_object_id("_id").ok()?;
        Some(Self {
            id,
            name: doc.get_str("name").unwrap_or_default().to_string(),
            owner: StoredOwner::from_bson(doc.get("owner")),
        })
    }
}

/// Outcome of an owner repair run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub success: bool,
    pub total: usize,
    pub migrated: usize,
    pub skipped: usize,
    pub failed: usize,
    #[schema(example = "Migration complete: 3 migrated, 10 skipped, 0 failed")]
    pub message: String,
}

impl MigrationReport {
    fn new(total: usize, migrated: usize, skipped: usize, failed: usize) -> Self {
        Self {
            success: true,
            total,
            migrated,
            skipped,
            failed,
            message: format!(
                "Migration complete: {} migrated, {} skipped, {} failed",
                migrated, skipped, failed
            ),
        }
    }
}

/// One row of the owner diagnostics listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDiagnostic {
    pub id: String,
    pub name: String,
    /// Stored value rendered as a string, absent when missing or not a string/ObjectId
    pub owner: Option<String>,
    /// `objectId`, `string`, `missing`, or the BSON type name
    #[schema(example = "string")]
    pub owner_type: String,
}

impl From<OwnerRecord> for OwnerDiagnostic {
    fn from(record: OwnerRecord) -> Self {
        Self {
            id: record.id.to_hex(),
            name: record.name,
            owner: record.owner.display(),
            owner_type: record.owner.type_name().to_string(),
        }
    }
}

/// Owner repair and diagnostics over a product repository.
pub struct OwnerMaintenance<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> Clone for OwnerMaintenance<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: ProductRepository> OwnerMaintenance<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Converts every string `owner` into an ObjectId, one record at a time.
    ///
    /// Records that already hold a reference, or hold nothing usable, are
    /// skipped. A string that is not a valid id, or a failed write, counts as
    /// failed and the scan continues. Running it twice migrates nothing the
    /// second time.
    #[instrument(skip(self))]
    pub async fn migrate_owners(&self) -> ProductResult<MigrationReport> {
        info!("Starting owner migration");
        let records = self.repository.owner_records().await?;
        info!(total = records.len(), "Checking products for legacy owners");

        let (mut migrated, mut skipped, mut failed) = (0, 0, 0);

        for record in &records {
            let StoredOwner::Legacy(raw) = &record.owner else {
                skipped += 1;
                continue;
            };

            let owner = match ObjectId::parse_str(raw.trim()) {
                Ok(owner) => owner,
                Err(e) => {
                    failed += 1;
                    error!(product_id = %record.id, owner = %raw, error = %e, "Owner is not a valid id");
                    continue;
                }
            };

            match self.repository.set_owner(record.id, owner).await {
                Ok(true) => {
                    migrated += 1;
                    debug!(product_id = %record.id, name = %record.name, "Migrated owner");
                }
                Ok(false) => {
                    failed += 1;
                    error!(product_id = %record.id, "Product disappeared during migration");
                }
                Err(e) => {
                    failed += 1;
                    error!(product_id = %record.id, error = %e, "Failed to migrate owner");
                }
            }
        }

        let report = MigrationReport::new(records.len(), migrated, skipped, failed);
        info!(
            target: "business",
            event = "owner_migration_completed",
            total = report.total,
            migrated,
            skipped,
            failed,
            "{}",
            report.message
        );
        Ok(report)
    }

    /// Every product with its stored owner and that owner's type.
    pub async fn owner_diagnostics(&self) -> ProductResult<Vec<OwnerDiagnostic>> {
        let diagnostics: Vec<OwnerDiagnostic> = self
            .repository
            .owner_records()
            .await?
            .into_iter()
            .map(OwnerDiagnostic::from)
            .collect();

        info!(count = diagnostics.len(), "Owner diagnostics complete");
        Ok(diagnostics)
    }
}
