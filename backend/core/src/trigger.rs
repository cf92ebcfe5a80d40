//! Call Trigger
//!
//! Owns the state of one caller session (server URL, dial info, call status,
//! loading flag) and turns a dispatch request into a status transition:
//!
//! ```text
//! idle --request_dispatch--> dialing --2xx--> connected
//!                               |
//!                               +--error / timeout--> idle
//! any  --reset--> idle
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{error, info, warn};

use dialer_logging::redact_sensitive_data;

use crate::error::{DialerError, DispatchError, ValidationError};
use crate::room::generate_room_name;
use crate::traits::DispatchClient;
use crate::types::{CallStatus, DialInfo, DispatchRequest, StatusChange};

/// Read-only view of a trigger's loading flag.
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn is_loading(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Holds the loading flag up while alive; clears it on drop, whatever happened.
struct LoadingGuard(Arc<AtomicBool>);

impl LoadingGuard {
    fn engage(flag: &LoadingFlag) -> Self {
        flag.0.store(true, Ordering::SeqCst);
        Self(Arc::clone(&flag.0))
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct CallTrigger {
    server_url: String,
    dial_info: DialInfo,
    status: CallStatus,
    loading: LoadingFlag,
    last_error: Option<String>,
    timeout: Option<Duration>,
    client: Arc<dyn DispatchClient>,
    events: broadcast::Sender<StatusChange>,
}

impl CallTrigger {
    pub fn new(client: Arc<dyn DispatchClient>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            server_url: String::new(),
            dial_info: DialInfo::default(),
            status: CallStatus::Idle,
            loading: LoadingFlag::default(),
            last_error: None,
            timeout: None,
            client,
            events,
        }
    }

    /// Bound each dispatch; on expiry the call reverts to idle.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    pub fn set_server_url(&mut self, url: impl Into<String>) {
        self.server_url = url.into();
    }

    pub fn set_phone_number(&mut self, phone_number: impl Into<String>) {
        self.dial_info.phone_number = phone_number.into();
    }

    pub fn set_transfer_to(&mut self, transfer_to: impl Into<String>) {
        self.dial_info.transfer_to = transfer_to.into();
    }

    pub fn set_dial_info(&mut self, dial_info: DialInfo) {
        self.dial_info = dial_info;
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn dial_info(&self) -> &DialInfo {
        &self.dial_info
    }

    pub fn status(&self) -> CallStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    pub fn loading_flag(&self) -> LoadingFlag {
        self.loading.clone()
    }

    /// Message of the most recent failed dispatch, until the next attempt or reset.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.events.subscribe()
    }

    /// Whether a dispatch would currently be accepted.
    pub fn can_dispatch(&self) -> bool {
        self.status == CallStatus::Idle && !self.is_loading() && self.validate().is_ok()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.status != CallStatus::Idle {
            return Err(ValidationError::NotIdle(self.status));
        }
        if self.dial_info.phone_number.trim().is_empty() {
            return Err(ValidationError::MissingPhoneNumber);
        }
        if self.server_url.trim().is_empty() {
            return Err(ValidationError::MissingServerUrl);
        }
        Ok(())
    }

    /// Ask the dispatch server to start an outbound call agent.
    ///
    /// Validation failures send nothing and leave the status alone. Otherwise
    /// the status moves to `Dialing` for the duration of the request and ends
    /// at `Connected` on success or back at `Idle` on any failure.
    pub async fn request_dispatch(&mut self) -> Result<CallStatus, DialerError> {
        if let Err(e) = self.validate() {
            warn!(error = %e, "Refusing to dispatch");
            return Err(e.into());
        }

        let _loading = LoadingGuard::engage(&self.loading);
        self.last_error = None;
        self.transition(CallStatus::Dialing);

        let request = DispatchRequest::new(generate_room_name(), &self.dial_info);
        info!(
            room = %request.room_name,
            agent = %request.agent_name,
            phone = %redact_sensitive_data(&request.phone_number),
            client = self.client.name(),
            "Dispatching outbound call agent"
        );

        match self.send(&request).await {
            Ok(body) => {
                info!(room = %request.room_name, response = %body, "Agent dispatched successfully");
                self.transition(CallStatus::Connected);
                Ok(CallStatus::Connected)
            }
            Err(e) => {
                error!(room = %request.room_name, error = %e, "Error triggering outbound call");
                self.last_error = Some(e.to_string());
                self.transition(CallStatus::Idle);
                Err(e.into())
            }
        }
    }

    /// Back to idle with empty dial info. No network effect.
    pub fn reset(&mut self) {
        self.dial_info.clear();
        self.last_error = None;
        self.transition(CallStatus::Idle);
    }

    async fn send(&self, request: &DispatchRequest) -> Result<String, DispatchError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.client.dispatch(request))
                .await
                .unwrap_or(Err(DispatchError::Timeout(limit))),
            None => self.client.dispatch(request).await,
        }
    }

    fn transition(&mut self, to: CallStatus) {
        let from = std::mem::replace(&mut self.status, to);
        if from != to {
            // No subscribers is fine.
            let _ = self.events.send(StatusChange { from, to });
        }
    }
}
