use super::PostgresStore;
use crate::{
    error::Error,
    model::{FeeEvent, ProtocolEvent},
};

impl PostgresStore {
    pub(super) async fn insert_fee_event(
        &self,
        fee: &FeeEvent,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO "fee_event" (
                "id", "lp", "pool", "amount", "fee_type", "block_number",
                "tx_hash", "log_index", "created_at"
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT ("id") DO NOTHING
            "#,
        )
        .bind(&fee.id)
        .bind(&fee.lp)
        .bind(&fee.pool)
        .bind(&fee.amount)
        .bind(&fee.fee_type)
        .bind(fee.block_number)
        .bind(&fee.tx_hash)
        .bind(fee.log_index)
        .bind(fee.created_at)
        .execute(self.pg())
        .await?;

        Ok(())
    }

    pub(super) async fn insert_protocol_event(
        &self,
        event: &ProtocolEvent,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO "protocol_event" (
                "id", "kind", "subject", "verified", "previous_owner",
                "new_owner", "block_number", "tx_hash", "log_index",
                "created_at"
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT ("id") DO NOTHING
            "#,
        )
        .bind(&event.id)
        .bind(event.kind.as_str())
        .bind(&event.subject)
        .bind(event.verified)
        .bind(&event.previous_owner)
        .bind(&event.new_owner)
        .bind(event.block_number)
        .bind(&event.tx_hash)
        .bind(event.log_index)
        .bind(event.created_at)
        .execute(self.pg())
        .await?;

        Ok(())
    }
}
