//! One handle per backend resource. Every method is a single hook following the
//! [`PortalClient`] contract.

pub mod keys;

mod auth;
mod estates;
mod landing;
mod notifications;
mod paged;
mod people;
mod requests;
mod schedule;
mod taxonomy;

pub use auth::AuthApi;
pub use estates::EstatesApi;
pub use landing::LandingApi;
pub use notifications::NotificationsApi;
pub use paged::PagedQuery;
pub use people::{OwnersApi, UsersApi};
pub use requests::RequestsApi;
pub use schedule::{RemindersApi, SessionsApi};
pub use taxonomy::TaxonomyApi;

use crate::client::PortalClient;
use crate::domain::{Category, Region};
use crate::http::Transport;
use crate::toast::Notifier;

impl<T, N> PortalClient<T, N>
where
    T: Transport,
    N: Notifier,
{
    pub fn auth(&self) -> AuthApi<'_, T, N> {
        AuthApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_, T, N> {
        UsersApi::new(self)
    }

    pub fn owners(&self) -> OwnersApi<'_, T, N> {
        OwnersApi::new(self)
    }

    pub fn estates(&self) -> EstatesApi<'_, T, N> {
        EstatesApi::new(self)
    }

    pub fn categories(&self) -> TaxonomyApi<'_, T, N, Category> {
        TaxonomyApi::new(self, keys::CATEGORIES, "/categories")
    }

    pub fn regions(&self) -> TaxonomyApi<'_, T, N, Region> {
        TaxonomyApi::new(self, keys::REGIONS, "/regions")
    }

    pub fn requests(&self) -> RequestsApi<'_, T, N> {
        RequestsApi::new(self)
    }

    pub fn sessions(&self) -> SessionsApi<'_, T, N> {
        SessionsApi::new(self)
    }

    pub fn reminders(&self) -> RemindersApi<'_, T, N> {
        RemindersApi::new(self)
    }

    pub fn notifications(&self) -> NotificationsApi<'_, T, N> {
        NotificationsApi::new(self)
    }

    pub fn landing(&self) -> LandingApi<'_, T, N> {
        LandingApi::new(self)
    }
}

#[cfg(test)]
mod tests;
