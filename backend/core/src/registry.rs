use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::types::{AgentDispatch, DispatchRequest};

/// In-memory record of agent dispatches, keyed by room.
///
/// Rooms are never evicted: the map grows for the life of the server process
/// and is dropped with it. Nothing is written to disk.
#[derive(Clone, Default)]
pub struct DispatchRegistry {
    rooms: Arc<RwLock<HashMap<String, Vec<AgentDispatch>>>>,
}

impl DispatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a dispatch for the request's room and return it.
    pub async fn create(&self, request: &DispatchRequest) -> AgentDispatch {
        let dispatch = AgentDispatch::from_request(request);
        let mut rooms = self.rooms.write().await;
        let entries = rooms.entry(dispatch.room.clone()).or_default();
        entries.push(dispatch.clone());
        info!(
            dispatch_id = %dispatch.id,
            room = %dispatch.room,
            count = entries.len(),
            "there are {} dispatches in {}",
            entries.len(),
            dispatch.room
        );
        dispatch
    }

    pub async fn list(&self, room: &str) -> Vec<AgentDispatch> {
        self.rooms
            .read()
            .await
            .get(room)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DialInfo;

    #[tokio::test]
    async fn test_create_and_list() {
        let registry = DispatchRegistry::new();
        let req = DispatchRequest::new("room-1", &DialInfo::new("+15551234567"));

        registry.create(&req).await;
        registry.create(&req).await;
        registry
            .create(&DispatchRequest::new("room-2", &DialInfo::new("+15557654321")))
            .await;

        assert_eq!(registry.list("room-1").await.len(), 2);
        assert_eq!(registry.list("room-2").await.len(), 1);
        assert_eq!(registry.room_count().await, 2);
    }

    #[tokio::test]
    async fn test_unknown_room_is_empty() {
        let registry = DispatchRegistry::new();
        assert!(registry.list("nowhere").await.is_empty());
    }
}
