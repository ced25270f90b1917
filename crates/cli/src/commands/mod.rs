//! Command implementations.

pub mod account;
pub mod cart;
pub mod orders;
pub mod products;

use marigold_client::{ApiClient, AuthSession};

/// Restore the stored session and require it to be authenticated.
///
/// Runs the full restoration flow (silent token refresh included) before
/// any authenticated command.
pub(crate) async fn authenticated_session(
    api: &ApiClient,
) -> Result<AuthSession, Box<dyn std::error::Error>> {
    let session = AuthSession::new(api.clone());
    let state = session.check_auth_status().await?;
    if !state.is_authenticated() {
        return Err("not logged in; run `marigold login <username> --password <password>`".into());
    }
    Ok(session)
}
