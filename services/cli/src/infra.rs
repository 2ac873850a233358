use std::sync::Arc;

use estate_portal::http::ReqwestTransport;
use estate_portal::socket::NotificationFeed;
use estate_portal::storage::{FileKv, NotificationReadStore, PreferenceStore};
use estate_portal::{Notifier, PortalClient, PortalConfig, PortalError, QueryCache, Toast, ToastLevel};

/// Prints toasts to stderr so stdout only carries command output.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Success => eprintln!("ok: {}", toast.message),
            ToastLevel::Error => eprintln!("error: {}", toast.message),
        }
    }
}

pub(crate) type Client = PortalClient<ReqwestTransport, ConsoleNotifier>;

/// Everything a command needs, built once from configuration.
pub(crate) struct AppContext {
    pub(crate) config: PortalConfig,
    pub(crate) cache: Arc<QueryCache>,
    pub(crate) client: Client,
    state: FileKv,
}

impl AppContext {
    pub(crate) fn from_config(config: PortalConfig, token: Option<String>) -> Result<Self, PortalError> {
        let transport = ReqwestTransport::from_config(&config.api)?;
        let cache = Arc::new(QueryCache::with_capacity(
            config.api.cache_ttl,
            config.api.cache_max_entries,
        ));
        let client = PortalClient::new(transport, cache.clone(), ConsoleNotifier);
        if let Some(token) = token {
            client.set_token(token);
        }
        let state = FileKv::new(config.storage.state_dir.clone());

        tracing::debug!(
            api = %config.api.base_url,
            state_dir = %config.storage.state_dir.display(),
            "context ready"
        );

        Ok(Self {
            config,
            cache,
            client,
            state,
        })
    }

    pub(crate) fn read_states(&self) -> NotificationReadStore<FileKv> {
        NotificationReadStore::new(self.state.clone())
    }

    pub(crate) fn preferences(&self) -> PreferenceStore<FileKv> {
        PreferenceStore::new(self.state.clone())
    }

    pub(crate) fn feed(&self) -> NotificationFeed {
        NotificationFeed::new(self.cache.clone())
    }
}

pub(crate) fn parse_month(raw: &str) -> Result<u32, String> {
    match raw.trim().parse::<u32>() {
        Ok(month) if (1..=12).contains(&month) => Ok(month),
        _ => Err(format!("'{raw}' is not a month between 1 and 12")),
    }
}
