use orderdesk_core::{DeskResult, Payment, PaymentInput, RecordId};
use tracing::info;

use crate::{OrderDesk, merge::required_text, resolve::require_payment};

impl OrderDesk {
    pub async fn get_payment(&self, id: RecordId) -> DeskResult<Payment> {
        let mut tx = self.store.begin().await?;
        require_payment(tx.as_mut(), id).await
    }

    pub async fn create_payment(&self, input: PaymentInput) -> DeskResult<Payment> {
        let payment_type = required_text("payment type", &input.payment_type)?;

        let mut tx = self.store.begin().await?;
        let payment = tx
            .save_payment(Payment {
                id: 0,
                payment_type,
                amount: input.amount,
            })
            .await?;
        tx.commit().await?;

        info!(payment_id = payment.id, "payment created");
        Ok(payment)
    }
}
