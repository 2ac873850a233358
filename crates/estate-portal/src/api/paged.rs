use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::keys;
use crate::client::PortalClient;
use crate::http::{ApiRequest, Transport};
use crate::pagination::{Page, PageRequest, PageSource};
use crate::toast::Notifier;

/// A paged list endpoint bound to one set of filters.
///
/// Every page goes through [`PortalClient::query`] under its own key, so pages
/// already fetched are served from the cache until their root is invalidated.
pub struct PagedQuery<'a, T, N, I> {
    client: &'a PortalClient<T, N>,
    resource: &'static str,
    path: String,
    filters: Value,
    limit: u32,
    item: PhantomData<fn() -> I>,
}

impl<'a, T, N, I> PagedQuery<'a, T, N, I> {
    /// `filters` loses any `page`/`limit` fields; those come from the list itself.
    pub(crate) fn new<F: Serialize + ?Sized>(
        client: &'a PortalClient<T, N>,
        resource: &'static str,
        path: impl Into<String>,
        filters: &F,
        limit: u32,
    ) -> Self {
        let mut filters = serde_json::to_value(filters).unwrap_or_else(|err| {
            tracing::warn!(error = %err, resource, "list filters failed to serialize");
            Value::Null
        });
        if let Value::Object(fields) = &mut filters {
            fields.remove("page");
            fields.remove("limit");
        }

        Self {
            client,
            resource,
            path: path.into(),
            filters,
            limit,
            item: PhantomData,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

#[async_trait]
impl<'a, T, N, I> PageSource for PagedQuery<'a, T, N, I>
where
    T: Transport,
    N: Notifier,
    I: DeserializeOwned + Send + 'static,
{
    type Item = I;

    async fn fetch_page(&self, page: u32) -> Option<Page<I>> {
        let window = PageRequest {
            page,
            limit: self.limit,
        };
        let key = keys::page(self.resource, &self.filters, window);
        let request = ApiRequest::get(self.path.as_str())
            .with_query(&self.filters)
            .with_query(&window);
        self.client.query(key, request).await
    }
}
