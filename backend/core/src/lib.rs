pub mod client;
pub mod error;
pub mod registry;
pub mod room;
pub mod traits;
pub mod trigger;
pub mod types;

pub use client::{HttpDispatchClient, DEFAULT_DISPATCH_URL};
pub use error::{DialerError, DispatchError, ValidationError};
pub use registry::DispatchRegistry;
pub use room::generate_room_name;
pub use traits::DispatchClient;
pub use trigger::{CallTrigger, LoadingFlag};
pub use types::{
    AgentDispatch, CallStatus, DialInfo, DispatchReceipt, DispatchRequest, StatusChange,
    AGENT_NAME,
};
