use super::keys;
use super::paged::PagedQuery;
use crate::client::PortalClient;
use crate::domain::Notification;
use crate::http::{ApiRequest, Transport};
use crate::pagination::{Page, PageRequest};
use crate::toast::Notifier;

/// Server notifications. Read markers are local, see
/// [`NotificationReadStore`](crate::storage::NotificationReadStore).
pub struct NotificationsApi<'a, T, N> {
    client: &'a PortalClient<T, N>,
}

impl<'a, T, N> NotificationsApi<'a, T, N>
where
    T: Transport,
    N: Notifier,
{
    pub(crate) fn new(client: &'a PortalClient<T, N>) -> Self {
        Self { client }
    }

    pub async fn list(&self, window: PageRequest) -> Option<Page<Notification>> {
        let request = ApiRequest::get("/notifications").with_query(&window);
        let key = keys::page(keys::NOTIFICATIONS, &serde_json::Value::Null, window);
        self.client.query(key, request).await
    }

    pub fn pages(&self, limit: u32) -> PagedQuery<'a, T, N, Notification> {
        PagedQuery::new(
            self.client,
            keys::NOTIFICATIONS,
            "/notifications",
            &serde_json::Value::Null,
            limit,
        )
    }
}
