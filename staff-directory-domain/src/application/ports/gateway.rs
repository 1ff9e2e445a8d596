use crate::domain::{
    entities::{Attributes, Identity, NewIdentity},
    errors::GatewayResult,
};
use async_trait::async_trait;

/// Capabilities the orchestration layer needs from the identity provider.
///
/// Implementations own their timeout and retry discipline; callers propagate
/// whatever is reported here without retrying.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Register a new identity. `send_invite` controls whether the provider
    /// delivers its welcome notification.
    async fn create(&self, candidate: &NewIdentity, send_invite: bool) -> GatewayResult<Identity>;

    async fn enable(&self, handle: &str) -> GatewayResult<()>;

    async fn disable(&self, handle: &str) -> GatewayResult<()>;

    /// `permanent` set means the identity is not forced to rotate it on next sign-in
    async fn set_password(&self, handle: &str, password: &str, permanent: bool)
        -> GatewayResult<()>;

    async fn add_to_group(&self, handle: &str, group: &str) -> GatewayResult<()>;

    async fn get(&self, handle: &str) -> GatewayResult<Identity>;

    /// `limit <= 0` lets the provider apply its own page size; `filter` is
    /// passed through untouched.
    async fn list(&self, limit: i32, filter: Option<&str>) -> GatewayResult<Vec<Identity>>;

    async fn list_groups(&self, handle: &str) -> GatewayResult<Vec<String>>;

    async fn update_attributes(&self, handle: &str, attributes: &Attributes)
        -> GatewayResult<()>;
}
