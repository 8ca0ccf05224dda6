use serde::{Deserialize, Serialize};

/// Vendor-neutral representation of one fetched CRM record.
///
/// `parent_id` is reserved for providers with hierarchical collections; the
/// contacts producer never sets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationItem {
    /// Opaque external identifier, passed through from the provider.
    pub id: Option<String>,
    /// Best-effort human-readable label.
    pub name: Option<String>,
    /// Object category label, or the sentinel "archived".
    #[serde(rename = "type")]
    pub item_type: String,
    /// Optional reference to another item's `id`.
    pub parent_id: Option<String>,
}
