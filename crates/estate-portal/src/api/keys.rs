//! Cache keys for every resource.
//!
//! Each resource owns one root key. Lists and details extend the root, so
//! invalidating the root reaches every entry underneath it.

use serde::Serialize;

use crate::cache::QueryKey;
use crate::domain::EntityId;
use crate::pagination::PageRequest;

pub const AUTH: &str = "auth";
pub const USERS: &str = "users";
pub const OWNERS: &str = "owners";
pub const ESTATES: &str = "estates";
pub const CATEGORIES: &str = "categories";
pub const REGIONS: &str = "regions";
pub const REQUESTS: &str = "estate-requests";
pub const SESSIONS: &str = "sessions";
pub const REMINDERS: &str = "reminders";
pub const NOTIFICATIONS: &str = "notifications";
pub const LANDING: &str = "landing";

pub fn root(name: &str) -> QueryKey {
    QueryKey::new(name)
}

/// `[name, "list", filters]`
pub fn list<P: Serialize + ?Sized>(name: &str, filters: &P) -> QueryKey {
    root(name).with("list").with_params(filters)
}

/// `[name, "list", filters, {page, limit}]`
pub fn page<P: Serialize + ?Sized>(name: &str, filters: &P, request: PageRequest) -> QueryKey {
    list(name, filters).with_params(&request)
}

/// `[name, "detail", id]`
pub fn detail(name: &str, id: &EntityId) -> QueryKey {
    root(name).with("detail").with(id.as_str())
}
