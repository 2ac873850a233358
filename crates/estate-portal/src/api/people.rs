use super::keys;
use super::paged::PagedQuery;
use crate::client::{MutationAck, PortalClient};
use crate::domain::{
    EntityId, Owner, OwnerDraft, OwnerPatch, PeopleFilter, User, UserDraft, UserPatch,
};
use crate::http::{ApiRequest, Transport};
use crate::pagination::Page;
use crate::toast::Notifier;

/// Portal accounts.
pub struct UsersApi<'a, T, N> {
    client: &'a PortalClient<T, N>,
}

impl<'a, T, N> UsersApi<'a, T, N>
where
    T: Transport,
    N: Notifier,
{
    pub(crate) fn new(client: &'a PortalClient<T, N>) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: &PeopleFilter) -> Option<Page<User>> {
        let request = ApiRequest::get("/users").with_query(filter);
        self.client
            .query(keys::list(keys::USERS, filter), request)
            .await
    }

    pub fn pages(&self, filter: &PeopleFilter, limit: u32) -> PagedQuery<'a, T, N, User> {
        PagedQuery::new(self.client, keys::USERS, "/users", filter, limit)
    }

    pub async fn get(&self, id: &EntityId) -> Option<User> {
        let request = ApiRequest::get(format!("/users/{id}"));
        self.client
            .query(keys::detail(keys::USERS, id), request)
            .await
    }

    pub async fn create(&self, draft: &UserDraft) -> Option<MutationAck<User>> {
        let request = ApiRequest::post("/users").with_json(draft);
        self.client
            .mutate(request, &[keys::root(keys::USERS)])
            .await
    }

    pub async fn update(&self, id: &EntityId, patch: &UserPatch) -> Option<MutationAck<User>> {
        let request = ApiRequest::patch(format!("/users/{id}")).with_json(patch);
        self.client
            .mutate(request, &[keys::root(keys::USERS)])
            .await
    }

    pub async fn delete(&self, id: &EntityId) -> Option<MutationAck<serde_json::Value>> {
        let request = ApiRequest::delete(format!("/users/{id}"));
        self.client
            .mutate(request, &[keys::root(keys::USERS)])
            .await
    }
}

/// Property owners. Deleting or editing one also touches the estates that embed it.
pub struct OwnersApi<'a, T, N> {
    client: &'a PortalClient<T, N>,
}

impl<'a, T, N> OwnersApi<'a, T, N>
where
    T: Transport,
    N: Notifier,
{
    pub(crate) fn new(client: &'a PortalClient<T, N>) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: &PeopleFilter) -> Option<Page<Owner>> {
        let request = ApiRequest::get("/owners").with_query(filter);
        self.client
            .query(keys::list(keys::OWNERS, filter), request)
            .await
    }

    pub async fn get(&self, id: &EntityId) -> Option<Owner> {
        let request = ApiRequest::get(format!("/owners/{id}"));
        self.client
            .query(keys::detail(keys::OWNERS, id), request)
            .await
    }

    pub async fn create(&self, draft: &OwnerDraft) -> Option<MutationAck<Owner>> {
        let request = ApiRequest::post("/owners").with_json(draft);
        self.client
            .mutate(request, &[keys::root(keys::OWNERS)])
            .await
    }

    pub async fn update(&self, id: &EntityId, patch: &OwnerPatch) -> Option<MutationAck<Owner>> {
        let request = ApiRequest::patch(format!("/owners/{id}")).with_json(patch);
        self.client.mutate(request, &Self::touched()).await
    }

    pub async fn delete(&self, id: &EntityId) -> Option<MutationAck<serde_json::Value>> {
        let request = ApiRequest::delete(format!("/owners/{id}"));
        self.client.mutate(request, &Self::touched()).await
    }

    fn touched() -> [crate::cache::QueryKey; 2] {
        [keys::root(keys::OWNERS), keys::root(keys::ESTATES)]
    }
}
