use std::str::FromStr;

use sqlx::Row;

use super::PostgresStore;
use crate::{
    error::Error,
    model::{LPPosition, LPRebalance, PositionHealth, UserPosition},
};

impl PostgresStore {
    pub(super) async fn find_user_position(
        &self,
        id: &str,
    ) -> Result<Option<UserPosition>, Error> {
        let row = sqlx::query(
            r#"
            SELECT * FROM "user_position" WHERE "id" = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pg())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let health: String = row.try_get("health")?;

        Ok(Some(UserPosition {
            id: row.try_get("id")?,
            user: row.try_get("user")?,
            pool: row.try_get("pool")?,
            deposit_amount: row.try_get("deposit_amount")?,
            asset_amount: row.try_get("asset_amount")?,
            collateral_amount: row.try_get("collateral_amount")?,
            health: PositionHealth::from_str(&health)?,
            liquidator: row.try_get("liquidator")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }

    pub(super) async fn upsert_user_position(
        &self,
        position: &UserPosition,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO "user_position" (
                "id", "user", "pool", "deposit_amount", "asset_amount",
                "collateral_amount", "health", "liquidator", "created_at",
                "updated_at"
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT ("id") DO UPDATE SET
                "deposit_amount" = EXCLUDED."deposit_amount",
                "asset_amount" = EXCLUDED."asset_amount",
                "collateral_amount" = EXCLUDED."collateral_amount",
                "health" = EXCLUDED."health",
                "liquidator" = EXCLUDED."liquidator",
                "updated_at" = EXCLUDED."updated_at"
            "#,
        )
        .bind(&position.id)
        .bind(&position.user)
        .bind(&position.pool)
        .bind(&position.deposit_amount)
        .bind(&position.asset_amount)
        .bind(&position.collateral_amount)
        .bind(position.health.as_str())
        .bind(&position.liquidator)
        .bind(position.created_at)
        .bind(position.updated_at)
        .execute(self.pg())
        .await?;

        Ok(())
    }

    pub(super) async fn find_lp_position(
        &self,
        id: &str,
    ) -> Result<Option<LPPosition>, Error> {
        let row = sqlx::query(
            r#"
            SELECT * FROM "lp_position" WHERE "id" = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pg())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let health: String = row.try_get("health")?;

        Ok(Some(LPPosition {
            id: row.try_get("id")?,
            lp: row.try_get("lp")?,
            pool: row.try_get("pool")?,
            liquidity_commitment: row.try_get("liquidity_commitment")?,
            collateral_amount: row.try_get("collateral_amount")?,
            interest_accrued: row.try_get("interest_accrued")?,
            asset_share: row.try_get("asset_share")?,
            health: PositionHealth::from_str(&health)?,
            is_active: row.try_get("is_active")?,
            delegate: row.try_get("delegate")?,
            liquidator: row.try_get("liquidator")?,
            last_rebalance_cycle: row.try_get("last_rebalance_cycle")?,
            last_rebalance_price: row.try_get("last_rebalance_price")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }

    pub(super) async fn upsert_lp_position(
        &self,
        position: &LPPosition,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO "lp_position" (
                "id", "lp", "pool", "liquidity_commitment",
                "collateral_amount", "interest_accrued", "asset_share",
                "health", "is_active", "delegate", "liquidator",
                "last_rebalance_cycle", "last_rebalance_price", "created_at",
                "updated_at"
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15
            )
            ON CONFLICT ("id") DO UPDATE SET
                "liquidity_commitment" = EXCLUDED."liquidity_commitment",
                "collateral_amount" = EXCLUDED."collateral_amount",
                "interest_accrued" = EXCLUDED."interest_accrued",
                "asset_share" = EXCLUDED."asset_share",
                "health" = EXCLUDED."health",
                "is_active" = EXCLUDED."is_active",
                "delegate" = EXCLUDED."delegate",
                "liquidator" = EXCLUDED."liquidator",
                "last_rebalance_cycle" = EXCLUDED."last_rebalance_cycle",
                "last_rebalance_price" = EXCLUDED."last_rebalance_price",
                "updated_at" = EXCLUDED."updated_at"
            "#,
        )
        .bind(&position.id)
        .bind(&position.lp)
        .bind(&position.pool)
        .bind(&position.liquidity_commitment)
        .bind(&position.collateral_amount)
        .bind(&position.interest_accrued)
        .bind(&position.asset_share)
        .bind(position.health.as_str())
        .bind(position.is_active)
        .bind(&position.delegate)
        .bind(&position.liquidator)
        .bind(position.last_rebalance_cycle)
        .bind(&position.last_rebalance_price)
        .bind(position.created_at)
        .bind(position.updated_at)
        .execute(self.pg())
        .await?;

        Ok(())
    }

    pub(super) async fn insert_lp_rebalance(
        &self,
        rebalance: &LPRebalance,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO "lp_rebalance" (
                "id", "position", "cycle", "lp", "pool", "cycle_index",
                "rebalance_price", "amount", "is_deposit", "was_settled",
                "created_at"
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT ("id") DO NOTHING
            "#,
        )
        .bind(&rebalance.id)
        .bind(&rebalance.position)
        .bind(&rebalance.cycle)
        .bind(&rebalance.lp)
        .bind(&rebalance.pool)
        .bind(rebalance.cycle_index)
        .bind(&rebalance.rebalance_price)
        .bind(&rebalance.amount)
        .bind(rebalance.is_deposit)
        .bind(rebalance.was_settled)
        .bind(rebalance.created_at)
        .execute(self.pg())
        .await?;

        Ok(())
    }
}
