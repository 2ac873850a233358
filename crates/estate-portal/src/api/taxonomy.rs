use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::json;

use super::keys;
use crate::client::{MutationAck, PortalClient};
use crate::domain::EntityId;
use crate::http::{ApiRequest, Transport};
use crate::toast::Notifier;

/// Flat `{id, name}` lookups: estate categories and regions.
pub struct TaxonomyApi<'a, T, N, I> {
    client: &'a PortalClient<T, N>,
    resource: &'static str,
    path: &'static str,
    item: PhantomData<fn() -> I>,
}

impl<'a, T, N, I> TaxonomyApi<'a, T, N, I>
where
    T: Transport,
    N: Notifier,
    I: DeserializeOwned,
{
    pub(crate) fn new(
        client: &'a PortalClient<T, N>,
        resource: &'static str,
        path: &'static str,
    ) -> Self {
        Self {
            client,
            resource,
            path,
            item: PhantomData,
        }
    }

    pub async fn list(&self) -> Option<Vec<I>> {
        self.client
            .query(keys::root(self.resource).with("list"), ApiRequest::get(self.path))
            .await
    }

    pub async fn create(&self, name: &str) -> Option<MutationAck<I>> {
        let name = name.trim();
        if name.is_empty() {
            self.client.reject_locally("Name is required");
            return None;
        }

        let request = ApiRequest::post(self.path).with_json(&json!({ "name": name }));
        self.client.mutate(request, &self.touched()).await
    }

    pub async fn delete(&self, id: &EntityId) -> Option<MutationAck<serde_json::Value>> {
        let request = ApiRequest::delete(format!("{}/{id}", self.path));
        self.client.mutate(request, &self.touched()).await
    }

    // Estates embed their category and region.
    fn touched(&self) -> [crate::cache::QueryKey; 2] {
        [keys::root(self.resource), keys::root(keys::ESTATES)]
    }
}
