//! Request-bound single-use tokens gating the export flows.

/// What a token authorizes. Item tokens are tied to one content id; the
/// bulk scope is only ever issued to administrator sessions and never
/// authorizes a single-item export (or vice versa).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScope {
    Item(i64),
    BulkExport,
}

impl TokenScope {
    pub(crate) fn tag(self) -> String {
        match self {
            TokenScope::Item(id) => format!("item:{id}"),
            TokenScope::BulkExport => "bulk-export".to_string(),
        }
    }
}

pub trait TokenService: Send + Sync {
    fn issue(&self, scope: TokenScope) -> String;

    fn verify(&self, token: &str, scope: TokenScope) -> bool;
}
