use serde_json::json;

use super::keys;
use super::paged::PagedQuery;
use crate::client::{MutationAck, PortalClient};
use crate::domain::{EntityId, EstateRequest, EstateRequestDraft, RequestFilter, RequestStatus};
use crate::http::{ApiRequest, Transport};
use crate::pagination::Page;
use crate::toast::Notifier;

/// Inbound client interest in listings.
pub struct RequestsApi<'a, T, N> {
    client: &'a PortalClient<T, N>,
}

impl<'a, T, N> RequestsApi<'a, T, N>
where
    T: Transport,
    N: Notifier,
{
    pub(crate) fn new(client: &'a PortalClient<T, N>) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: &RequestFilter) -> Option<Page<EstateRequest>> {
        let request = ApiRequest::get("/estate-requests").with_query(filter);
        self.client
            .query(keys::list(keys::REQUESTS, filter), request)
            .await
    }

    pub fn pages(
        &self,
        filter: &RequestFilter,
        limit: u32,
    ) -> PagedQuery<'a, T, N, EstateRequest> {
        PagedQuery::new(self.client, keys::REQUESTS, "/estate-requests", filter, limit)
    }

    /// Public contact form. Blank name or phone never reaches the server.
    pub async fn submit(&self, draft: &EstateRequestDraft) -> Option<MutationAck<EstateRequest>> {
        if draft.name.trim().is_empty() || draft.phone.trim().is_empty() {
            self.client.reject_locally("Name and phone are required");
            return None;
        }

        let request = ApiRequest::post("/estate-requests").with_json(draft);
        self.client
            .mutate(request, &[keys::root(keys::REQUESTS)])
            .await
    }

    pub async fn set_status(
        &self,
        id: &EntityId,
        status: RequestStatus,
    ) -> Option<MutationAck<EstateRequest>> {
        let request = ApiRequest::patch(format!("/estate-requests/{id}/status"))
            .with_json(&json!({ "status": status }));
        self.client
            .mutate(request, &[keys::root(keys::REQUESTS)])
            .await
    }
}
