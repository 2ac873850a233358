//! Client-owned state persisted through a [`KeyValueStore`].

mod file;
mod kv;
pub mod preferences;
pub mod read_state;

pub use file::FileKv;
pub use kv::{KeyValueStore, MemoryKv, StoreError};
pub use preferences::{PreferenceError, PreferenceStore, UiPreferences, PREFERENCES_KEY};
pub use read_state::{
    NotificationReadStore, ReadState, ReadStateError, ReadStateEvent, ReadStateMap, READ_STATES_KEY,
};
