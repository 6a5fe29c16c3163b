/// Identifiers handed out by the remote providers are opaque strings.
pub type RecordId = String;

/// User ids assigned by the auth provider.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Raw document fields as stored by the document store.
pub type Fields = serde_json::Map<String, serde_json::Value>;
