//! Booking calendar: sessions and the reminders that hang off them.
//!
//! Reminders reference sessions, so a write to either side invalidates both roots.

use super::keys;
use crate::cache::QueryKey;
use crate::calendar::CalendarMonth;
use crate::client::{MutationAck, PortalClient};
use crate::domain::{EntityId, Reminder, ReminderDraft, ReminderFilter, Session, SessionDraft};
use crate::http::{ApiRequest, Transport};
use crate::pagination::Page;
use crate::toast::Notifier;

fn schedule_roots() -> [QueryKey; 2] {
    [keys::root(keys::SESSIONS), keys::root(keys::REMINDERS)]
}

pub struct SessionsApi<'a, T, N> {
    client: &'a PortalClient<T, N>,
}

impl<'a, T, N> SessionsApi<'a, T, N>
where
    T: Transport,
    N: Notifier,
{
    pub(crate) fn new(client: &'a PortalClient<T, N>) -> Self {
        Self { client }
    }

    /// Sessions starting inside `month`.
    pub async fn month(&self, month: CalendarMonth) -> Option<Vec<Session>> {
        let range = month.range();
        let request = ApiRequest::get("/sessions").with_query(&range);
        self.client
            .query(keys::list(keys::SESSIONS, &range), request)
            .await
    }

    pub async fn get(&self, id: &EntityId) -> Option<Session> {
        let request = ApiRequest::get(format!("/sessions/{id}"));
        self.client
            .query(keys::detail(keys::SESSIONS, id), request)
            .await
    }

    pub async fn create(&self, draft: &SessionDraft) -> Option<MutationAck<Session>> {
        if !self.validated(draft) {
            return None;
        }
        let request = ApiRequest::post("/sessions").with_json(draft);
        self.client.mutate(request, &schedule_roots()).await
    }

    pub async fn update(&self, id: &EntityId, draft: &SessionDraft) -> Option<MutationAck<Session>> {
        if !self.validated(draft) {
            return None;
        }
        let request = ApiRequest::put(format!("/sessions/{id}")).with_json(draft);
        self.client.mutate(request, &schedule_roots()).await
    }

    pub async fn delete(&self, id: &EntityId) -> Option<MutationAck<serde_json::Value>> {
        let request = ApiRequest::delete(format!("/sessions/{id}"));
        self.client.mutate(request, &schedule_roots()).await
    }

    fn validated(&self, draft: &SessionDraft) -> bool {
        match draft.validate() {
            Ok(()) => true,
            Err(err) => {
                self.client.reject_locally(err.to_string());
                false
            }
        }
    }
}

pub struct RemindersApi<'a, T, N> {
    client: &'a PortalClient<T, N>,
}

impl<'a, T, N> RemindersApi<'a, T, N>
where
    T: Transport,
    N: Notifier,
{
    pub(crate) fn new(client: &'a PortalClient<T, N>) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: &ReminderFilter) -> Option<Page<Reminder>> {
        let request = ApiRequest::get("/reminders").with_query(filter);
        self.client
            .query(keys::list(keys::REMINDERS, filter), request)
            .await
    }

    pub async fn create(&self, draft: &ReminderDraft) -> Option<MutationAck<Reminder>> {
        if draft.title.trim().is_empty() {
            self.client.reject_locally("Reminder title is required");
            return None;
        }
        let request = ApiRequest::post("/reminders").with_json(draft);
        self.client.mutate(request, &schedule_roots()).await
    }

    pub async fn complete(&self, id: &EntityId) -> Option<MutationAck<Reminder>> {
        let request = ApiRequest::patch(format!("/reminders/{id}/complete"));
        self.client.mutate(request, &schedule_roots()).await
    }

    pub async fn delete(&self, id: &EntityId) -> Option<MutationAck<serde_json::Value>> {
        let request = ApiRequest::delete(format!("/reminders/{id}"));
        self.client.mutate(request, &schedule_roots()).await
    }
}
