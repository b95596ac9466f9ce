//! Redlined clause artifact

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Suggested rewrite of one clause, stored as a standalone JSON blob
///
/// Read-only once created; rendered on demand by the artifact viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedlinedClauseArtifact {
    pub id: Uuid,
    /// Finding the clause belongs to, if the model referenced one
    pub finding_id: Option<Uuid>,
    pub original_clause: String,
    pub redlined_version: String,
    pub suggested_revision: String,
}

impl RedlinedClauseArtifact {
    /// Blob path under which the artifact JSON is stored
    pub fn storage_path(contract_id: Uuid, artifact_id: Uuid) -> String {
        format!("artifacts/{}/{}.json", contract_id, artifact_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_path_layout() {
        let contract_id = Uuid::nil();
        let artifact_id = Uuid::nil();
        assert_eq!(
            RedlinedClauseArtifact::storage_path(contract_id, artifact_id),
            format!("artifacts/{}/{}.json", Uuid::nil(), Uuid::nil())
        );
    }

    #[test]
    fn test_artifact_json_shape() {
        let artifact = RedlinedClauseArtifact {
            id: Uuid::new_v4(),
            finding_id: None,
            original_clause: "Unlimited liability.".to_string(),
            redlined_version: "~~Unlimited~~ Capped liability.".to_string(),
            suggested_revision: "Liability is capped at fees paid.".to_string(),
        };

        let json = serde_json::to_value(&artifact).unwrap();
        assert!(json["finding_id"].is_null());
        assert_eq!(json["original_clause"], "Unlimited liability.");
    }
}
