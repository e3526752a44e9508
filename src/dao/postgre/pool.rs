use std::str::FromStr;

use sqlx::Row;

use super::PostgresStore;
use crate::{
    error::Error,
    model::{
        Cycle, CycleManagerPool, CycleState, LiquidityManagerPool, Pool,
    },
};

impl PostgresStore {
    pub(super) async fn find_pool(
        &self,
        address: &str,
    ) -> Result<Option<Pool>, Error> {
        let row = sqlx::query(
            r#"
            SELECT * FROM "pool" WHERE "address" = $1
            "#,
        )
        .bind(address)
        .fetch_optional(self.pg())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let cycle_state: String = row.try_get("cycle_state")?;

        Ok(Some(Pool {
            address: row.try_get("address")?,
            asset_symbol: row.try_get("asset_symbol")?,
            reserve_token: row.try_get("reserve_token")?,
            oracle: row.try_get("oracle")?,
            asset_token: row.try_get("asset_token")?,
            cycle_manager: row.try_get("cycle_manager")?,
            liquidity_manager: row.try_get("liquidity_manager")?,
            strategy: row.try_get("strategy")?,
            is_verified: row.try_get("is_verified")?,
            total_user_deposits: row.try_get("total_user_deposits")?,
            total_user_collateral: row.try_get("total_user_collateral")?,
            reserve_backing_asset: row.try_get("reserve_backing_asset")?,
            aggregate_pool_reserves: row.try_get("aggregate_pool_reserves")?,
            asset_supply: row.try_get("asset_supply")?,
            reserve_yield_accrued: row.try_get("reserve_yield_accrued")?,
            total_lp_liquidity_commited: row
                .try_get("total_lp_liquidity_commited")?,
            total_lp_collateral: row.try_get("total_lp_collateral")?,
            lp_count: row.try_get("lp_count")?,
            cycle_total_deposits: row.try_get("cycle_total_deposits")?,
            cycle_total_redemptions: row.try_get("cycle_total_redemptions")?,
            cycle_total_add_liquidity_amount: row
                .try_get("cycle_total_add_liquidity_amount")?,
            cycle_total_reduce_liquidity_amount: row
                .try_get("cycle_total_reduce_liquidity_amount")?,
            cycle_interest_amount: row.try_get("cycle_interest_amount")?,
            rebalanced_lps: row.try_get("rebalanced_lps")?,
            cycle_index: row.try_get("cycle_index")?,
            cycle_state: CycleState::from_str(&cycle_state)?,
            cycle_price_high: row.try_get("cycle_price_high")?,
            cycle_price_low: row.try_get("cycle_price_low")?,
            prev_rebalance_price: row.try_get("prev_rebalance_price")?,
            current_asset_price: row.try_get("current_asset_price")?,
            interest_rate: row.try_get("interest_rate")?,
            utilization_ratio: row.try_get("utilization_ratio")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            last_cycle_action_at: row.try_get("last_cycle_action_at")?,
        }))
    }

    pub(super) async fn upsert_pool(&self, pool: &Pool) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO "pool" (
                "address", "asset_symbol", "reserve_token", "oracle",
                "asset_token", "cycle_manager", "liquidity_manager",
                "strategy", "is_verified", "total_user_deposits",
                "total_user_collateral", "reserve_backing_asset",
                "aggregate_pool_reserves", "asset_supply",
                "reserve_yield_accrued", "total_lp_liquidity_commited",
                "total_lp_collateral", "lp_count", "cycle_total_deposits",
                "cycle_total_redemptions", "cycle_total_add_liquidity_amount",
                "cycle_total_reduce_liquidity_amount", "cycle_interest_amount",
                "rebalanced_lps", "cycle_index", "cycle_state",
                "cycle_price_high", "cycle_price_low", "prev_rebalance_price",
                "current_asset_price", "interest_rate", "utilization_ratio",
                "created_at", "updated_at", "last_cycle_action_at"
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26,
                $27, $28, $29, $30, $31, $32, $33, $34, $35
            )
            ON CONFLICT ("address") DO UPDATE SET
                "asset_symbol" = EXCLUDED."asset_symbol",
                "reserve_token" = EXCLUDED."reserve_token",
                "oracle" = EXCLUDED."oracle",
                "asset_token" = EXCLUDED."asset_token",
                "cycle_manager" = EXCLUDED."cycle_manager",
                "liquidity_manager" = EXCLUDED."liquidity_manager",
                "strategy" = EXCLUDED."strategy",
                "is_verified" = EXCLUDED."is_verified",
                "total_user_deposits" = EXCLUDED."total_user_deposits",
                "total_user_collateral" = EXCLUDED."total_user_collateral",
                "reserve_backing_asset" = EXCLUDED."reserve_backing_asset",
                "aggregate_pool_reserves" = EXCLUDED."aggregate_pool_reserves",
                "asset_supply" = EXCLUDED."asset_supply",
                "reserve_yield_accrued" = EXCLUDED."reserve_yield_accrued",
                "total_lp_liquidity_commited" = EXCLUDED."total_lp_liquidity_commited",
                "total_lp_collateral" = EXCLUDED."total_lp_collateral",
                "lp_count" = EXCLUDED."lp_count",
                "cycle_total_deposits" = EXCLUDED."cycle_total_deposits",
                "cycle_total_redemptions" = EXCLUDED."cycle_total_redemptions",
                "cycle_total_add_liquidity_amount" = EXCLUDED."cycle_total_add_liquidity_amount",
                "cycle_total_reduce_liquidity_amount" = EXCLUDED."cycle_total_reduce_liquidity_amount",
                "cycle_interest_amount" = EXCLUDED."cycle_interest_amount",
                "rebalanced_lps" = EXCLUDED."rebalanced_lps",
                "cycle_index" = EXCLUDED."cycle_index",
                "cycle_state" = EXCLUDED."cycle_state",
                "cycle_price_high" = EXCLUDED."cycle_price_high",
                "cycle_price_low" = EXCLUDED."cycle_price_low",
                "prev_rebalance_price" = EXCLUDED."prev_rebalance_price",
                "current_asset_price" = EXCLUDED."current_asset_price",
                "interest_rate" = EXCLUDED."interest_rate",
                "utilization_ratio" = EXCLUDED."utilization_ratio",
                "created_at" = EXCLUDED."created_at",
                "updated_at" = EXCLUDED."updated_at",
                "last_cycle_action_at" = EXCLUDED."last_cycle_action_at"
            "#,
        )
        .bind(&pool.address)
        .bind(&pool.asset_symbol)
        .bind(&pool.reserve_token)
        .bind(&pool.oracle)
        .bind(&pool.asset_token)
        .bind(&pool.cycle_manager)
        .bind(&pool.liquidity_manager)
        .bind(&pool.strategy)
        .bind(pool.is_verified)
        .bind(&pool.total_user_deposits)
        .bind(&pool.total_user_collateral)
        .bind(&pool.reserve_backing_asset)
        .bind(&pool.aggregate_pool_reserves)
        .bind(&pool.asset_supply)
        .bind(&pool.reserve_yield_accrued)
        .bind(&pool.total_lp_liquidity_commited)
        .bind(&pool.total_lp_collateral)
        .bind(pool.lp_count)
        .bind(&pool.cycle_total_deposits)
        .bind(&pool.cycle_total_redemptions)
        .bind(&pool.cycle_total_add_liquidity_amount)
        .bind(&pool.cycle_total_reduce_liquidity_amount)
        .bind(&pool.cycle_interest_amount)
        .bind(pool.rebalanced_lps)
        .bind(pool.cycle_index)
        .bind(pool.cycle_state.as_str())
        .bind(&pool.cycle_price_high)
        .bind(&pool.cycle_price_low)
        .bind(&pool.prev_rebalance_price)
        .bind(&pool.current_asset_price)
        .bind(&pool.interest_rate)
        .bind(&pool.utilization_ratio)
        .bind(pool.created_at)
        .bind(pool.updated_at)
        .bind(pool.last_cycle_action_at)
        .execute(self.pg())
        .await?;

        Ok(())
    }

    pub(super) async fn find_cycle(
        &self,
        id: &str,
    ) -> Result<Option<Cycle>, Error> {
        let row = sqlx::query(
            r#"
            SELECT * FROM "cycle" WHERE "id" = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pg())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let state: String = row.try_get("state")?;

        Ok(Some(Cycle {
            id: row.try_get("id")?,
            pool: row.try_get("pool")?,
            cycle_index: row.try_get("cycle_index")?,
            state: CycleState::from_str(&state)?,
            started_at: row.try_get("started_at")?,
            ended_at: row.try_get("ended_at")?,
            price_high: row.try_get("price_high")?,
            price_low: row.try_get("price_low")?,
            rebalance_price: row.try_get("rebalance_price")?,
            total_deposits: row.try_get("total_deposits")?,
            total_redemptions: row.try_get("total_redemptions")?,
            total_add_liquidity_amount: row
                .try_get("total_add_liquidity_amount")?,
            total_reduce_liquidity_amount: row
                .try_get("total_reduce_liquidity_amount")?,
            interest_amount: row.try_get("interest_amount")?,
            lp_count: row.try_get("lp_count")?,
            rebalanced_lps: row.try_get("rebalanced_lps")?,
        }))
    }

    pub(super) async fn upsert_cycle(
        &self,
        cycle: &Cycle,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO "cycle" (
                "id", "pool", "cycle_index", "state", "started_at",
                "ended_at", "price_high", "price_low", "rebalance_price",
                "total_deposits", "total_redemptions",
                "total_add_liquidity_amount", "total_reduce_liquidity_amount",
                "interest_amount", "lp_count", "rebalanced_lps"
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16
            )
            ON CONFLICT ("id") DO UPDATE SET
                "state" = EXCLUDED."state",
                "started_at" = EXCLUDED."started_at",
                "ended_at" = EXCLUDED."ended_at",
                "price_high" = EXCLUDED."price_high",
                "price_low" = EXCLUDED."price_low",
                "rebalance_price" = EXCLUDED."rebalance_price",
                "total_deposits" = EXCLUDED."total_deposits",
                "total_redemptions" = EXCLUDED."total_redemptions",
                "total_add_liquidity_amount" = EXCLUDED."total_add_liquidity_amount",
                "total_reduce_liquidity_amount" = EXCLUDED."total_reduce_liquidity_amount",
                "interest_amount" = EXCLUDED."interest_amount",
                "lp_count" = EXCLUDED."lp_count",
                "rebalanced_lps" = EXCLUDED."rebalanced_lps"
            "#,
        )
        .bind(&cycle.id)
        .bind(&cycle.pool)
        .bind(cycle.cycle_index)
        .bind(cycle.state.as_str())
        .bind(cycle.started_at)
        .bind(cycle.ended_at)
        .bind(&cycle.price_high)
        .bind(&cycle.price_low)
        .bind(&cycle.rebalance_price)
        .bind(&cycle.total_deposits)
        .bind(&cycle.total_redemptions)
        .bind(&cycle.total_add_liquidity_amount)
        .bind(&cycle.total_reduce_liquidity_amount)
        .bind(&cycle.interest_amount)
        .bind(cycle.lp_count)
        .bind(cycle.rebalanced_lps)
        .execute(self.pg())
        .await?;

        Ok(())
    }

    pub(super) async fn find_cycle_manager_pool(
        &self,
        address: &str,
    ) -> Result<Option<CycleManagerPool>, Error> {
        let row = sqlx::query(
            r#"
            SELECT "address", "pool" FROM "cycle_manager_pool"
            WHERE "address" = $1
            "#,
        )
        .bind(address)
        .fetch_optional(self.pg())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(CycleManagerPool {
            address: row.try_get("address")?,
            pool: row.try_get("pool")?,
        }))
    }

    pub(super) async fn upsert_cycle_manager_pool(
        &self,
        link: &CycleManagerPool,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO "cycle_manager_pool" ("address", "pool")
            VALUES ($1, $2)
            ON CONFLICT ("address") DO UPDATE SET "pool" = EXCLUDED."pool"
            "#,
        )
        .bind(&link.address)
        .bind(&link.pool)
        .execute(self.pg())
        .await?;

        Ok(())
    }

    pub(super) async fn find_liquidity_manager_pool(
        &self,
        address: &str,
    ) -> Result<Option<LiquidityManagerPool>, Error> {
        let row = sqlx::query(
            r#"
            SELECT "address", "pool" FROM "liquidity_manager_pool"
            WHERE "address" = $1
            "#,
        )
        .bind(address)
        .fetch_optional(self.pg())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(LiquidityManagerPool {
            address: row.try_get("address")?,
            pool: row.try_get("pool")?,
        }))
    }

    pub(super) async fn upsert_liquidity_manager_pool(
        &self,
        link: &LiquidityManagerPool,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO "liquidity_manager_pool" ("address", "pool")
            VALUES ($1, $2)
            ON CONFLICT ("address") DO UPDATE SET "pool" = EXCLUDED."pool"
            "#,
        )
        .bind(&link.address)
        .bind(&link.pool)
        .execute(self.pg())
        .await?;

        Ok(())
    }
}
