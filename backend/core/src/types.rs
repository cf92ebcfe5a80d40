use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Agent the dispatch server is asked to start for every outbound call.
pub const AGENT_NAME: &str = "outbound-caller";

/// Who to call, and optionally who to hand the call over to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialInfo {
    pub phone_number: String,
    /// Empty when no transfer target was given.
    #[serde(default)]
    pub transfer_to: String,
}

impl DialInfo {
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            transfer_to: String::new(),
        }
    }

    pub fn with_transfer_to(mut self, transfer_to: impl Into<String>) -> Self {
        self.transfer_to = transfer_to.into();
        self
    }

    pub fn clear(&mut self) {
        self.phone_number.clear();
        self.transfer_to.clear();
    }
}

/// Lifecycle of a single outbound call as seen by the caller's session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    #[default]
    Idle,
    Dialing,
    Connected,
    /// Declared for front ends; no transition currently produces it.
    Ended,
}

impl CallStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CallStatus::Idle => "Idle",
            CallStatus::Dialing => "Dialing",
            CallStatus::Connected => "Connected",
            CallStatus::Ended => "Ended",
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CallStatus::Idle => "idle",
            CallStatus::Dialing => "dialing",
            CallStatus::Connected => "connected",
            CallStatus::Ended => "ended",
        };
        write!(f, "{s}")
    }
}

/// A status transition, published to anyone watching the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: CallStatus,
    pub to: CallStatus,
}

/// Body of `POST /dispatch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub room_name: String,
    pub agent_name: String,
    pub phone_number: String,
    pub transfer_to: String,
}

impl DispatchRequest {
    pub fn new(room_name: impl Into<String>, dial_info: &DialInfo) -> Self {
        Self {
            room_name: room_name.into(),
            agent_name: AGENT_NAME.to_string(),
            phone_number: dial_info.phone_number.clone(),
            transfer_to: dial_info.transfer_to.clone(),
        }
    }

    /// Job metadata handed to the agent: just the numbers it needs to dial.
    pub fn metadata(&self) -> serde_json::Value {
        serde_json::json!({
            "phone_number": self.phone_number,
            "transfer_to": self.transfer_to,
        })
    }
}

/// Reply of a successful `POST /dispatch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReceipt {
    pub message: String,
    /// Room the agent was dispatched into.
    pub dispatch: String,
}

/// An agent dispatch recorded by the server for a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDispatch {
    pub id: Uuid,
    pub agent_name: String,
    pub room: String,
    /// JSON-encoded dial metadata.
    pub metadata: String,
    pub created_at: DateTime<Utc>,
}

impl AgentDispatch {
    pub fn from_request(request: &DispatchRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent_name: request.agent_name.clone(),
            room: request.room_name.clone(),
            metadata: request.metadata().to_string(),
            created_at: Utc::now(),
        }
    }
}
