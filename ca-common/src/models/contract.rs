//! Uploaded contract document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raw contract text plus the language its analysis must be written in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub contract_text: String,
    pub output_language: String,
    /// Set by an admin; removed by the next cleanup run
    pub marked_for_deletion: bool,
    pub created_at: DateTime<Utc>,
}

impl ContractDocument {
    /// Blob path of the rendered HTML report
    pub fn report_path(&self) -> String {
        report_path_for(self.id)
    }
}

/// Blob path of the rendered HTML report for `contract_id`
pub fn report_path_for(contract_id: Uuid) -> String {
    format!("reports/{}.html", contract_id)
}
