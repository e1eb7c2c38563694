use async_trait::async_trait;

use crate::executor::RawResponse;
use crate::request::RequestParts;

/// Observes the fully-built request before the transport call runs.
///
/// The executor awaits the hook; an error aborts the whole operation
/// with that error.
#[async_trait]
pub trait BeforeRequestHook: Send + Sync {
    async fn call(&self, request: &RequestParts) -> anyhow::Result<()>;
}

/// Observes the raw response before status and body interpretation.
#[async_trait]
pub trait AfterResponseHook: Send + Sync {
    async fn call(&self, response: &RawResponse) -> anyhow::Result<()>;
}
