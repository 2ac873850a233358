use super::keys;
use crate::client::{MutationAck, PortalClient};
use crate::domain::{AuthSession, Credentials, User};
use crate::http::{ApiRequest, Transport};
use crate::toast::{Notifier, Toast};

/// Sign-in state of the portal.
pub struct AuthApi<'a, T, N> {
    client: &'a PortalClient<T, N>,
}

impl<'a, T, N> AuthApi<'a, T, N>
where
    T: Transport,
    N: Notifier,
{
    pub(crate) fn new(client: &'a PortalClient<T, N>) -> Self {
        Self { client }
    }

    /// Exchange credentials for a bearer token. The token is attached to every
    /// later call made through the same client.
    pub async fn login(&self, credentials: &Credentials) -> Option<AuthSession> {
        let request = ApiRequest::post("/auth/login").with_json(credentials);
        let session = self
            .client
            .settle(self.client.fetch::<AuthSession>(request).await)?;

        self.client.set_token(session.token.clone());
        self.client.cache().invalidate(&keys::root(keys::AUTH));
        self.client
            .notifier()
            .notify(Toast::success(format!("Signed in as {}", session.user.name)));
        tracing::info!(user = %session.user.id, "signed in");
        Some(session)
    }

    /// The signed-in account.
    pub async fn me(&self) -> Option<User> {
        let key = keys::root(keys::AUTH).with("me");
        self.client.query(key, ApiRequest::get("/auth/me")).await
    }

    /// Ends the server session. The local token and every cached response are
    /// dropped even when the server call fails.
    pub async fn logout(&self) -> Option<MutationAck<serde_json::Value>> {
        let ack = self
            .client
            .mutate(ApiRequest::post("/auth/logout"), &[])
            .await;
        self.client.clear_token();
        self.client.cache().clear();
        ack
    }
}
