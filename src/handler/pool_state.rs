//! Pool counter reconciliation. Most events carry only a partial delta, so
//! after every balance-changing user or LP event the pool's cached
//! aggregates are re-read from the authoritative contracts. Each field is
//! apply-if-Some: a failed call keeps the prior value.

use crate::{
    configuration::{AppState, State},
    error::Error,
    model::Pool,
};

/// Mutates `pool` in place; the caller stamps `updated_at` and saves.
pub async fn reconcile_pool(
    app_state: &AppState<State>,
    pool: &mut Pool,
) -> Result<(), Error> {
    let query = &app_state.query_api;
    let address = pool.address.clone();

    if let Some(value) = query.total_user_deposits(&address).await {
        pool.total_user_deposits = value;
    }
    if let Some(value) = query.total_user_collateral(&address).await {
        pool.total_user_collateral = value;
    }
    if let Some(value) = query.reserve_backing_asset(&address).await {
        pool.reserve_backing_asset = value;
    }
    if let Some(value) = query.aggregate_pool_reserves(&address).await {
        pool.aggregate_pool_reserves = value;
    }
    if let Some(value) = query.cycle_total_deposits(&address).await {
        pool.cycle_total_deposits = value;
    }
    if let Some(value) = query.cycle_total_redemptions(&address).await {
        pool.cycle_total_redemptions = value;
    }
    if let Some(value) = query.reserve_yield_accrued(&address).await {
        pool.reserve_yield_accrued = value;
    }

    if let Some(manager) = pool.liquidity_manager.clone() {
        if let Some(value) = query.total_lp_liquidity_commited(&manager).await
        {
            pool.total_lp_liquidity_commited = value;
        }
        if let Some(value) = query.total_lp_collateral(&manager).await {
            pool.total_lp_collateral = value;
        }
        if let Some(value) = query.lp_count(&manager).await {
            pool.lp_count = value;
        }
        if let Some(value) =
            query.cycle_total_add_liquidity_amount(&manager).await
        {
            pool.cycle_total_add_liquidity_amount = value;
        }
        if let Some(value) =
            query.cycle_total_reduce_liquidity_amount(&manager).await
        {
            pool.cycle_total_reduce_liquidity_amount = value;
        }
    }

    if let Some(token) = pool.asset_token.clone() {
        if let Some(value) = query.total_supply(&token).await {
            pool.asset_supply = value;
        }
    }

    Ok(())
}
