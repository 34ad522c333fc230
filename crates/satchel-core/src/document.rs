//! Document records: persisted media artifacts plus metadata.

use serde::{Deserialize, Serialize};

use crate::types::{DocumentId, IdentityId, MediaKind};

/// A stored artifact. Who may read it is decided entirely by the grant
/// table; the record itself carries no visibility information.
///
/// Immutable after creation. `created_at` is unix epoch milliseconds;
/// `storage_ref` is an opaque reference resolvable to a byte stream by the
/// serving layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub owner_id: IdentityId,
    pub kind: MediaKind,
    pub storage_ref: String,
    pub created_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_wire_shape() {
        let doc = Document {
            id: DocumentId::new(12),
            owner_id: IdentityId::new(3),
            kind: MediaKind::Image,
            storage_ref: "mara_to_corran_20260301_1415.png".to_string(),
            created_at: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["id"], 12);
        assert_eq!(json["owner_id"], 3);
        assert_eq!(json["kind"], "image");
        assert_eq!(json["storage_ref"], "mara_to_corran_20260301_1415.png");
        assert_eq!(json["created_at"], 1_700_000_000_000u64);
    }

    #[test]
    fn test_document_roundtrip() {
        let doc = Document {
            id: DocumentId::new(1),
            owner_id: IdentityId::new(2),
            kind: MediaKind::Text,
            storage_ref: "note.txt".to_string(),
            created_at: 42,
        };
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
