use log::{debug, info};
use std::sync::Arc;

use super::holdings_model::Holding;
use super::holdings_traits::{HoldingRepositoryTrait, HoldingServiceTrait};
use crate::errors::{DatabaseError, Error, Result};
use crate::events::{DomainEvent, DomainEventSink};

/// Owner-scoped access to persisted holdings.
pub struct HoldingService {
    repository: Arc<dyn HoldingRepositoryTrait>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl HoldingService {
    pub fn new(
        repository: Arc<dyn HoldingRepositoryTrait>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            repository,
            event_sink,
        }
    }
}

fn require_owner(owner_id: Option<&str>) -> Result<&str> {
    match owner_id.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(Error::Unauthenticated),
    }
}

#[async_trait::async_trait]
impl HoldingServiceTrait for HoldingService {
    fn list_holdings(&self, owner_id: Option<&str>) -> Result<Vec<Holding>> {
        let owner_id = require_owner(owner_id)?;
        self.repository.list_by_owner(owner_id)
    }

    async fn delete_holding(&self, owner_id: Option<&str>, holding_id: &str) -> Result<()> {
        let owner_id = require_owner(owner_id)?;
        let deleted = self.repository.delete(owner_id, holding_id).await?;
        if deleted == 0 {
            debug!("Delete matched no holding for this owner");
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "Holding {}",
                holding_id
            ))));
        }

        info!("Deleted holding {}", holding_id);
        self.event_sink
            .emit(DomainEvent::holding_deleted(owner_id, holding_id));
        Ok(())
    }
}
