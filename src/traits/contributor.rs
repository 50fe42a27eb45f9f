use serde_json::Value;

/// A registry-published collaborator that adds attributes to each request.
///
/// The `contributors` valve resolves every contributor registered under its
/// configured service key and calls them in registration order.
pub trait ContextContributor: Send + Sync {
    /// Attributes to merge into the request, given the request path.
    fn contribute(&self, path: &str) -> Vec<(String, Value)>;
}
