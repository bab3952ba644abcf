use serde::{Deserialize, Serialize};

/// A search result returned to the client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Document path, without the `.md` extension.
    pub path: String,
    pub title: String,
    /// HTML-escaped excerpt with query occurrences wrapped in `<mark>`.
    pub snippet: String,
}
