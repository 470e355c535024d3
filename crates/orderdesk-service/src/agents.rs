use orderdesk_core::{Agent, AgentInput, DeskError, DeskResult, EntityKind, RecordId};
use tracing::info;

use crate::{OrderDesk, merge::required_text, resolve::require_agent};

impl OrderDesk {
    pub async fn get_agent(&self, id: RecordId) -> DeskResult<Agent> {
        let mut tx = self.store.begin().await?;
        require_agent(tx.as_mut(), id).await
    }

    pub async fn create_agent(&self, input: AgentInput) -> DeskResult<Agent> {
        let name = required_text("agent name", &input.name)?;

        let mut tx = self.store.begin().await?;
        let agent = tx
            .save_agent(Agent {
                id: 0,
                name,
                working_area: input.working_area,
                commission: input.commission,
                phone: input.phone,
                country: input.country,
            })
            .await?;
        tx.commit().await?;

        info!(agent_id = agent.id, "agent created");
        Ok(agent)
    }

    /// Deletes the agent unless some customer still points at it.
    pub async fn delete_agent_if_unassigned(&self, agent_id: RecordId) -> DeskResult<()> {
        let mut tx = self.store.begin().await?;
        require_agent(tx.as_mut(), agent_id).await?;

        if let Some(customer) = tx.first_customer_for_agent(agent_id).await? {
            return Err(DeskError::AlreadyReferenced {
                kind: EntityKind::Agent,
                id: agent_id,
                referrer: EntityKind::Customer,
                referrer_id: customer.id,
            });
        }

        tx.delete_agent(agent_id).await?;
        tx.commit().await?;

        info!(agent_id, "agent deleted");
        Ok(())
    }
}
