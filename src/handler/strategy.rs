//! Strategy parameter events. Each event carries one complete parameter
//! group, so handlers overwrite the group wholesale. Strategies are keyed
//! by the emitting contract and created lazily on pool discovery; an update
//! from an untracked strategy is dropped.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use tracing::debug;

use crate::{
    configuration::{AppState, State},
    dispatch::EventCtx,
    error::Error,
    model::Strategy,
    types::{
        CycleParamsUpdated, FeeParamsUpdated, HaltParamsUpdated,
        InterestRateParamsUpdated, LpCollateralParamsUpdated,
        UserCollateralParamsUpdated, YieldBearingUpdated,
    },
};

pub async fn interest_rate_params_updated(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &InterestRateParamsUpdated,
) -> Result<(), Error> {
    let Some(mut strategy) = load(app_state, ctx.source).await? else {
        return Ok(());
    };

    strategy.base_interest_rate =
        BigDecimal::from_str(&item.base_interest_rate)?;
    strategy.interest_rate_1 = BigDecimal::from_str(&item.interest_rate_1)?;
    strategy.max_interest_rate =
        BigDecimal::from_str(&item.max_interest_rate)?;
    strategy.utilization_tier_1 =
        BigDecimal::from_str(&item.utilization_tier_1)?;
    strategy.utilization_tier_2 =
        BigDecimal::from_str(&item.utilization_tier_2)?;

    save(app_state, strategy, ctx).await
}

pub async fn user_collateral_params_updated(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &UserCollateralParamsUpdated,
) -> Result<(), Error> {
    let Some(mut strategy) = load(app_state, ctx.source).await? else {
        return Ok(());
    };

    strategy.user_healthy_collateral_ratio =
        BigDecimal::from_str(&item.healthy_ratio)?;
    strategy.user_liquidation_threshold =
        BigDecimal::from_str(&item.liquidation_threshold)?;

    save(app_state, strategy, ctx).await
}

pub async fn lp_collateral_params_updated(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &LpCollateralParamsUpdated,
) -> Result<(), Error> {
    let Some(mut strategy) = load(app_state, ctx.source).await? else {
        return Ok(());
    };

    strategy.lp_healthy_collateral_ratio =
        BigDecimal::from_str(&item.healthy_ratio)?;
    strategy.lp_liquidation_threshold =
        BigDecimal::from_str(&item.liquidation_threshold)?;
    strategy.lp_liquidation_reward =
        BigDecimal::from_str(&item.liquidation_reward)?;

    save(app_state, strategy, ctx).await
}

pub async fn cycle_params_updated(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &CycleParamsUpdated,
) -> Result<(), Error> {
    let Some(mut strategy) = load(app_state, ctx.source).await? else {
        return Ok(());
    };

    strategy.rebalance_length = BigDecimal::from_str(&item.rebalance_length)?;
    strategy.oracle_update_threshold =
        BigDecimal::from_str(&item.oracle_update_threshold)?;

    save(app_state, strategy, ctx).await
}

pub async fn halt_params_updated(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &HaltParamsUpdated,
) -> Result<(), Error> {
    let Some(mut strategy) = load(app_state, ctx.source).await? else {
        return Ok(());
    };

    strategy.halt_threshold = BigDecimal::from_str(&item.halt_threshold)?;
    strategy.halt_liquidity_percent =
        BigDecimal::from_str(&item.liquidity_percent)?;
    strategy.halt_fee_percent = BigDecimal::from_str(&item.fee_percent)?;
    strategy.halt_request_threshold =
        BigDecimal::from_str(&item.request_threshold)?;

    save(app_state, strategy, ctx).await
}

pub async fn fee_params_updated(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &FeeParamsUpdated,
) -> Result<(), Error> {
    let Some(mut strategy) = load(app_state, ctx.source).await? else {
        return Ok(());
    };

    strategy.protocol_fee = BigDecimal::from_str(&item.protocol_fee)?;
    strategy.fee_recipient = Some(item.fee_recipient.clone());

    save(app_state, strategy, ctx).await
}

pub async fn yield_bearing_updated(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &YieldBearingUpdated,
) -> Result<(), Error> {
    let Some(mut strategy) = load(app_state, ctx.source).await? else {
        return Ok(());
    };

    strategy.is_yield_bearing = item.is_yield_bearing;

    save(app_state, strategy, ctx).await
}

async fn load(
    app_state: &AppState<State>,
    address: &str,
) -> Result<Option<Strategy>, Error> {
    let strategy = app_state.store.load_strategy(address).await?;
    if strategy.is_none() {
        debug!("params update from untracked strategy {}", address);
    }

    Ok(strategy)
}

async fn save(
    app_state: &AppState<State>,
    mut strategy: Strategy,
    ctx: &EventCtx<'_>,
) -> Result<(), Error> {
    strategy.updated_at = ctx.at;
    app_state.store.save_strategy(&strategy).await
}
