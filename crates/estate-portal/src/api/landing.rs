use super::keys;
use crate::client::{MutationAck, PortalClient};
use crate::domain::{Landing, LandingPatch};
use crate::http::{ApiRequest, Transport};
use crate::toast::Notifier;

/// Public landing page content.
pub struct LandingApi<'a, T, N> {
    client: &'a PortalClient<T, N>,
}

impl<'a, T, N> LandingApi<'a, T, N>
where
    T: Transport,
    N: Notifier,
{
    pub(crate) fn new(client: &'a PortalClient<T, N>) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> Option<Landing> {
        self.client
            .query(keys::root(keys::LANDING), ApiRequest::get("/landing"))
            .await
    }

    pub async fn update(&self, patch: &LandingPatch) -> Option<MutationAck<Landing>> {
        let request = ApiRequest::put("/landing").with_json(patch);
        self.client
            .mutate(request, &[keys::root(keys::LANDING)])
            .await
    }
}
