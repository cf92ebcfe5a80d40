use async_trait::async_trait;

use crate::error::DispatchError;
use crate::types::DispatchRequest;

/// Anything that can hand a dispatch request to an agent-dispatch server.
///
/// Implementations return the success body (only logged by the trigger) or a
/// [`DispatchError`] describing why the dispatch did not happen.
#[async_trait]
pub trait DispatchClient: Send + Sync {
    /// Human-readable name of this client (e.g., "http").
    fn name(&self) -> &str;

    /// Send one dispatch request. No retries.
    async fn dispatch(&self, request: &DispatchRequest) -> Result<String, DispatchError>;
}
