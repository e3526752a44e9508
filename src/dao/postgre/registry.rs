use sqlx::Row;

use super::PostgresStore;
use crate::{
    error::Error,
    model::{Oracle, Strategy},
};

impl PostgresStore {
    pub(super) async fn find_oracle(
        &self,
        address: &str,
    ) -> Result<Option<Oracle>, Error> {
        let row = sqlx::query(
            r#"
            SELECT * FROM "oracle" WHERE "address" = $1
            "#,
        )
        .bind(address)
        .fetch_optional(self.pg())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Oracle {
            address: row.try_get("address")?,
            asset_symbol: row.try_get("asset_symbol")?,
            asset_price: row.try_get("asset_price")?,
            ohlc_open: row.try_get("ohlc_open")?,
            ohlc_high: row.try_get("ohlc_high")?,
            ohlc_low: row.try_get("ohlc_low")?,
            ohlc_close: row.try_get("ohlc_close")?,
            ohlc_updated_at: row.try_get("ohlc_updated_at")?,
            split_detected: row.try_get("split_detected")?,
            pre_split_price: row.try_get("pre_split_price")?,
            is_verified: row.try_get("is_verified")?,
            pool: row.try_get("pool")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            last_price_update_at: row.try_get("last_price_update_at")?,
        }))
    }

    pub(super) async fn upsert_oracle(
        &self,
        oracle: &Oracle,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO "oracle" (
                "address", "asset_symbol", "asset_price", "ohlc_open",
                "ohlc_high", "ohlc_low", "ohlc_close", "ohlc_updated_at",
                "split_detected", "pre_split_price", "is_verified", "pool",
                "created_at", "updated_at", "last_price_update_at"
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15
            )
            ON CONFLICT ("address") DO UPDATE SET
                "asset_symbol" = EXCLUDED."asset_symbol",
                "asset_price" = EXCLUDED."asset_price",
                "ohlc_open" = EXCLUDED."ohlc_open",
                "ohlc_high" = EXCLUDED."ohlc_high",
                "ohlc_low" = EXCLUDED."ohlc_low",
                "ohlc_close" = EXCLUDED."ohlc_close",
                "ohlc_updated_at" = EXCLUDED."ohlc_updated_at",
                "split_detected" = EXCLUDED."split_detected",
                "pre_split_price" = EXCLUDED."pre_split_price",
                "is_verified" = EXCLUDED."is_verified",
                "pool" = EXCLUDED."pool",
                "updated_at" = EXCLUDED."updated_at",
                "last_price_update_at" = EXCLUDED."last_price_update_at"
            "#,
        )
        .bind(&oracle.address)
        .bind(&oracle.asset_symbol)
        .bind(&oracle.asset_price)
        .bind(&oracle.ohlc_open)
        .bind(&oracle.ohlc_high)
        .bind(&oracle.ohlc_low)
        .bind(&oracle.ohlc_close)
        .bind(oracle.ohlc_updated_at)
        .bind(oracle.split_detected)
        .bind(&oracle.pre_split_price)
        .bind(oracle.is_verified)
        .bind(&oracle.pool)
        .bind(oracle.created_at)
        .bind(oracle.updated_at)
        .bind(oracle.last_price_update_at)
        .execute(self.pg())
        .await?;

        Ok(())
    }

    pub(super) async fn find_strategy(
        &self,
        address: &str,
    ) -> Result<Option<Strategy>, Error> {
        let row = sqlx::query(
            r#"
            SELECT * FROM "strategy" WHERE "address" = $1
            "#,
        )
        .bind(address)
        .fetch_optional(self.pg())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Strategy {
            address: row.try_get("address")?,
            base_interest_rate: row.try_get("base_interest_rate")?,
            interest_rate_1: row.try_get("interest_rate_1")?,
            max_interest_rate: row.try_get("max_interest_rate")?,
            utilization_tier_1: row.try_get("utilization_tier_1")?,
            utilization_tier_2: row.try_get("utilization_tier_2")?,
            user_healthy_collateral_ratio: row
                .try_get("user_healthy_collateral_ratio")?,
            user_liquidation_threshold: row
                .try_get("user_liquidation_threshold")?,
            lp_healthy_collateral_ratio: row
                .try_get("lp_healthy_collateral_ratio")?,
            lp_liquidation_threshold: row.try_get("lp_liquidation_threshold")?,
            lp_liquidation_reward: row.try_get("lp_liquidation_reward")?,
            rebalance_length: row.try_get("rebalance_length")?,
            oracle_update_threshold: row.try_get("oracle_update_threshold")?,
            halt_threshold: row.try_get("halt_threshold")?,
            halt_liquidity_percent: row.try_get("halt_liquidity_percent")?,
            halt_fee_percent: row.try_get("halt_fee_percent")?,
            halt_request_threshold: row.try_get("halt_request_threshold")?,
            protocol_fee: row.try_get("protocol_fee")?,
            fee_recipient: row.try_get("fee_recipient")?,
            is_yield_bearing: row.try_get("is_yield_bearing")?,
            is_verified: row.try_get("is_verified")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }

    pub(super) async fn upsert_strategy(
        &self,
        strategy: &Strategy,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO "strategy" (
                "address", "base_interest_rate", "interest_rate_1",
                "max_interest_rate", "utilization_tier_1",
                "utilization_tier_2", "user_healthy_collateral_ratio",
                "user_liquidation_threshold", "lp_healthy_collateral_ratio",
                "lp_liquidation_threshold", "lp_liquidation_reward",
                "rebalance_length", "oracle_update_threshold",
                "halt_threshold", "halt_liquidity_percent",
                "halt_fee_percent", "halt_request_threshold", "protocol_fee",
                "fee_recipient", "is_yield_bearing", "is_verified",
                "created_at", "updated_at"
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23
            )
            ON CONFLICT ("address") DO UPDATE SET
                "base_interest_rate" = EXCLUDED."base_interest_rate",
                "interest_rate_1" = EXCLUDED."interest_rate_1",
                "max_interest_rate" = EXCLUDED."max_interest_rate",
                "utilization_tier_1" = EXCLUDED."utilization_tier_1",
                "utilization_tier_2" = EXCLUDED."utilization_tier_2",
                "user_healthy_collateral_ratio" = EXCLUDED."user_healthy_collateral_ratio",
                "user_liquidation_threshold" = EXCLUDED."user_liquidation_threshold",
                "lp_healthy_collateral_ratio" = EXCLUDED."lp_healthy_collateral_ratio",
                "lp_liquidation_threshold" = EXCLUDED."lp_liquidation_threshold",
                "lp_liquidation_reward" = EXCLUDED."lp_liquidation_reward",
                "rebalance_length" = EXCLUDED."rebalance_length",
                "oracle_update_threshold" = EXCLUDED."oracle_update_threshold",
                "halt_threshold" = EXCLUDED."halt_threshold",
                "halt_liquidity_percent" = EXCLUDED."halt_liquidity_percent",
                "halt_fee_percent" = EXCLUDED."halt_fee_percent",
                "halt_request_threshold" = EXCLUDED."halt_request_threshold",
                "protocol_fee" = EXCLUDED."protocol_fee",
                "fee_recipient" = EXCLUDED."fee_recipient",
                "is_yield_bearing" = EXCLUDED."is_yield_bearing",
                "is_verified" = EXCLUDED."is_verified",
                "updated_at" = EXCLUDED."updated_at"
            "#,
        )
        .bind(&strategy.address)
        .bind(&strategy.base_interest_rate)
        .bind(&strategy.interest_rate_1)
        .bind(&strategy.max_interest_rate)
        .bind(&strategy.utilization_tier_1)
        .bind(&strategy.utilization_tier_2)
        .bind(&strategy.user_healthy_collateral_ratio)
        .bind(&strategy.user_liquidation_threshold)
        .bind(&strategy.lp_healthy_collateral_ratio)
        .bind(&strategy.lp_liquidation_threshold)
        .bind(&strategy.lp_liquidation_reward)
        .bind(&strategy.rebalance_length)
        .bind(&strategy.oracle_update_threshold)
        .bind(&strategy.halt_threshold)
        .bind(&strategy.halt_liquidity_percent)
        .bind(&strategy.halt_fee_percent)
        .bind(&strategy.halt_request_threshold)
        .bind(&strategy.protocol_fee)
        .bind(&strategy.fee_recipient)
        .bind(strategy.is_yield_bearing)
        .bind(strategy.is_verified)
        .bind(strategy.created_at)
        .bind(strategy.updated_at)
        .execute(self.pg())
        .await?;

        Ok(())
    }
}
