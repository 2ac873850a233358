use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::cache::{QueryCache, QueryKey};
use crate::http::{ApiRequest, ErrorEnvelope, StatusClass, Transport, TransportError};
use crate::toast::{Notifier, Toast};

/// Why a hook resolved to `None`.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("server fault ({status}): {body}")]
    ServerFault { status: u16, body: String },
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected response shape: {0}")]
    Decode(String),
    #[error("request could not be encoded: {0}")]
    Encode(String),
}

impl HookError {
    /// Text shown in the error toast.
    pub fn user_message(&self) -> String {
        match self {
            HookError::Transport(err) => err.to_string(),
            HookError::ServerFault { status, body } => ErrorEnvelope::parse(body)
                .user_message()
                .unwrap_or_else(|| {
                    format!("Server error, please try again later (status {status})")
                }),
            HookError::Rejected { message, .. } => message.clone(),
            HookError::Decode(_) => "Unexpected response from the server".to_string(),
            HookError::Encode(reason) => format!("Request could not be prepared: {reason}"),
        }
    }

    /// Malformed success payloads degrade to `None` without bothering the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, HookError::Decode(_))
    }
}

/// Body of a successful mutation: `{ message, data? }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MutationAck<T> {
    pub message: Option<String>,
    pub data: Option<T>,
}

const DEFAULT_SUCCESS_MESSAGE: &str = "Changes saved";

/// Entry point for every backend call.
///
/// Each hook follows one contract: 5xx, 4xx and transport failures become a
/// single error toast and `None`; successful reads land in the cache; successful
/// mutations toast the server message and invalidate the keys they touch.
pub struct PortalClient<T, N> {
    transport: T,
    cache: Arc<QueryCache>,
    notifier: N,
    token: RwLock<Option<String>>,
}

impl<T, N> PortalClient<T, N>
where
    T: Transport,
    N: Notifier,
{
    pub fn new(transport: T, cache: Arc<QueryCache>, notifier: N) -> Self {
        Self {
            transport,
            cache,
            notifier,
            token: RwLock::new(None),
        }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Send `request` and interpret the status without absorbing failures.
    pub async fn fetch<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, HookError> {
        let value = self.fetch_value(request).await?;
        decode(value)
    }

    /// Cached read. A fresh entry short-circuits the network.
    pub async fn query<R: DeserializeOwned>(&self, key: QueryKey, request: ApiRequest) -> Option<R> {
        if let Some(cached) = self.cache.fresh(&key) {
            match serde_json::from_value::<R>(cached) {
                Ok(value) => {
                    debug!(%key, "served from cache");
                    return Some(value);
                }
                Err(err) => warn!(%key, error = %err, "cached entry no longer decodes"),
            }
        }
        self.refetch(key, request).await
    }

    /// Uncached read that still stores its result under `key`.
    pub async fn refetch<R: DeserializeOwned>(
        &self,
        key: QueryKey,
        request: ApiRequest,
    ) -> Option<R> {
        let outcome = match self.fetch_value(request).await {
            Ok(value) => decode::<R>(value.clone()).map(|decoded| (value, decoded)),
            Err(err) => Err(err),
        };

        let (value, decoded) = self.settle(outcome)?;
        self.cache.store(key, value);
        Some(decoded)
    }

    /// Write call. On success toasts the server message and invalidates `invalidates`.
    pub async fn mutate<R: DeserializeOwned>(
        &self,
        request: ApiRequest,
        invalidates: &[QueryKey],
    ) -> Option<MutationAck<R>> {
        let outcome = match self.fetch_value(request).await {
            Ok(Value::Null) => Ok(MutationAck {
                message: None,
                data: None,
            }),
            Ok(value) => decode::<MutationAck<R>>(value),
            Err(err) => Err(err),
        };

        let ack = self.settle(outcome)?;
        let message = ack
            .message
            .clone()
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string());
        self.notifier.notify(Toast::success(message));
        for key in invalidates {
            self.cache.invalidate(key);
        }
        Some(ack)
    }

    /// Apply the hook contract to a raw [`fetch`](Self::fetch) outcome: failures
    /// are logged, toasted unless silent, and collapse to `None`.
    pub fn settle<R>(&self, outcome: Result<R, HookError>) -> Option<R> {
        match outcome {
            Ok(value) => Some(value),
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    /// Turn a locally detected problem (form validation) into the same error toast.
    pub fn reject_locally(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "request rejected before sending");
        self.notifier.notify(Toast::error(message));
    }

    async fn fetch_value(&self, request: ApiRequest) -> Result<Value, HookError> {
        let request = self.authorize(request);
        if let Some(reason) = request.encode_error() {
            return Err(HookError::Encode(reason.to_string()));
        }

        let method = request.method;
        let path = request.path.clone();
        let response = self.transport.send(request).await?;
        debug!(
            method = method.as_str(),
            %path,
            status = response.status,
            "backend responded"
        );

        match StatusClass::of(response.status) {
            StatusClass::ServerFault => Err(HookError::ServerFault {
                status: response.status,
                body: response.body,
            }),
            StatusClass::Rejected => {
                let message = ErrorEnvelope::parse(&response.body)
                    .user_message()
                    .unwrap_or_else(|| format!("Request failed with status {}", response.status));
                Err(HookError::Rejected {
                    status: response.status,
                    message,
                })
            }
            StatusClass::Success => {
                if response.body.trim().is_empty() {
                    return Ok(Value::Null);
                }
                serde_json::from_str(&response.body).map_err(|err| HookError::Decode(err.to_string()))
            }
        }
    }

    fn authorize(&self, request: ApiRequest) -> ApiRequest {
        if request.bearer.is_some() {
            return request;
        }
        match self.token() {
            Some(token) => request.with_bearer(token),
            None => request,
        }
    }

    fn report(&self, err: &HookError) {
        match err {
            HookError::Transport(source) => error!(error = %source, "transport failure"),
            HookError::ServerFault { status, body } => {
                error!(status, body = %body, "server fault")
            }
            HookError::Rejected { status, message } => {
                warn!(status, message = %message, "request rejected")
            }
            HookError::Decode(reason) => warn!(reason = %reason, "response did not match the expected shape"),
            HookError::Encode(reason) => error!(reason = %reason, "request could not be encoded"),
        }

        if !err.is_silent() {
            self.notifier.notify(Toast::error(err.user_message()));
        }
    }
}

fn decode<R: DeserializeOwned>(value: Value) -> Result<R, HookError> {
    serde_json::from_value(value).map_err(|err| HookError::Decode(err.to_string()))
}
