use super::keys;
use super::paged::PagedQuery;
use crate::client::{MutationAck, PortalClient};
use crate::domain::{Estate, EstateDraft, EstateFilter, EstatePatch, EntityId};
use crate::http::{ApiRequest, Transport};
use crate::pagination::Page;
use crate::toast::Notifier;

/// Property listings.
pub struct EstatesApi<'a, T, N> {
    client: &'a PortalClient<T, N>,
}

impl<'a, T, N> EstatesApi<'a, T, N>
where
    T: Transport,
    N: Notifier,
{
    pub(crate) fn new(client: &'a PortalClient<T, N>) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: &EstateFilter) -> Option<Page<Estate>> {
        let request = ApiRequest::get("/estates").with_query(filter);
        self.client
            .query(keys::list(keys::ESTATES, filter), request)
            .await
    }

    /// Infinite list over the same endpoint; `filter.page` and `filter.limit` are ignored.
    pub fn pages(&self, filter: &EstateFilter, limit: u32) -> PagedQuery<'a, T, N, Estate> {
        PagedQuery::new(self.client, keys::ESTATES, "/estates", filter, limit)
    }

    pub async fn get(&self, id: &EntityId) -> Option<Estate> {
        let request = ApiRequest::get(format!("/estates/{id}"));
        self.client
            .query(keys::detail(keys::ESTATES, id), request)
            .await
    }

    pub async fn create(&self, draft: &EstateDraft) -> Option<MutationAck<Estate>> {
        let request = ApiRequest::post("/estates").with_json(draft);
        self.client.mutate(request, &Self::touched()).await
    }

    pub async fn update(&self, id: &EntityId, patch: &EstatePatch) -> Option<MutationAck<Estate>> {
        let request = ApiRequest::patch(format!("/estates/{id}")).with_json(patch);
        self.client.mutate(request, &Self::touched()).await
    }

    pub async fn delete(&self, id: &EntityId) -> Option<MutationAck<serde_json::Value>> {
        let request = ApiRequest::delete(format!("/estates/{id}"));
        self.client.mutate(request, &Self::touched()).await
    }

    // Landing embeds featured estates.
    fn touched() -> [crate::cache::QueryKey; 2] {
        [keys::root(keys::ESTATES), keys::root(keys::LANDING)]
    }
}
