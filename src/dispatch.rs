//! Single entry point: one decoded event in, exactly one handler out.
//! Handler failures come back wrapped with enough event context to locate
//! and replay the offending log once the root cause is fixed.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::{
        cycle_manager, factory, liquidity_manager, oracle, pool, registry,
        strategy,
    },
    helpers::to_date_time,
    types::{ChainEvent, EventKind},
};

/// Envelope fields every handler needs alongside its typed parameters.
pub struct EventCtx<'a> {
    pub source: &'a str,
    pub at: DateTime<Utc>,
    pub block_number: i64,
    pub tx_hash: &'a str,
    pub log_index: i64,
}

pub async fn apply_event(
    app_state: &AppState<State>,
    event: ChainEvent,
) -> Result<(), Error> {
    route(app_state, &event).await.map_err(|cause| Error::EventApply {
        kind: event.kind.as_str().to_owned(),
        source_address: event.source.clone(),
        block_number: event.block_number,
        tx_hash: event.tx_hash.clone(),
        cause: Box::new(cause),
    })
}

async fn route(
    app_state: &AppState<State>,
    event: &ChainEvent,
) -> Result<(), Error> {
    let ctx = EventCtx {
        source: &event.source,
        at: to_date_time(event.block_timestamp)?,
        block_number: event.block_number,
        tx_hash: &event.tx_hash,
        log_index: event.log_index,
    };

    debug!("applying {} from {}", event.kind, event.source);

    match &event.kind {
        EventKind::OracleCreated(item) => {
            factory::oracle_created(app_state, &ctx, item).await
        },
        EventKind::PoolCreated(item) => {
            factory::pool_created(app_state, &ctx, item).await
        },

        EventKind::OracleVerificationUpdated(item) => {
            registry::oracle_verification_updated(app_state, &ctx, item).await
        },
        EventKind::PoolVerificationUpdated(item) => {
            registry::pool_verification_updated(app_state, &ctx, item).await
        },
        EventKind::StrategyVerificationUpdated(item) => {
            registry::strategy_verification_updated(app_state, &ctx, item)
                .await
        },
        EventKind::OwnershipTransferred(item) => {
            registry::ownership_transferred(app_state, &ctx, item).await
        },
        EventKind::RegistryUpdated(item) => {
            registry::registry_updated(app_state, &ctx, item).await
        },

        EventKind::PriceUpdated(item) => {
            oracle::price_updated(app_state, &ctx, item).await
        },
        EventKind::OhlcUpdated(item) => {
            oracle::ohlc_updated(app_state, &ctx, item).await
        },
        EventKind::PriceSplitDetected(item) => {
            oracle::price_split_detected(app_state, &ctx, item).await
        },

        EventKind::CollateralDeposited(item) => {
            pool::collateral_deposited(app_state, &ctx, item).await
        },
        EventKind::CollateralWithdrawn(item) => {
            pool::collateral_withdrawn(app_state, &ctx, item).await
        },
        EventKind::DepositRequested(item) => {
            pool::deposit_requested(app_state, &ctx, item).await
        },
        EventKind::AssetClaimed(item) => {
            pool::asset_claimed(app_state, &ctx, item).await
        },
        EventKind::RedeemRequested(item) => {
            pool::redeem_requested(app_state, &ctx, item).await
        },
        EventKind::ReserveWithdrawn(item) => {
            pool::reserve_withdrawn(app_state, &ctx, item).await
        },
        EventKind::LiquidationRequested(item) => {
            pool::liquidation_requested(app_state, &ctx, item).await
        },
        EventKind::LiquidationClaimed(item) => {
            pool::liquidation_claimed(app_state, &ctx, item).await
        },
        EventKind::LiquidationCancelled(item) => {
            pool::liquidation_cancelled(app_state, &ctx, item).await
        },

        EventKind::CycleStarted(item) => {
            cycle_manager::cycle_started(app_state, &ctx, item).await
        },
        EventKind::RebalanceInitiated(item) => {
            cycle_manager::rebalance_initiated(app_state, &ctx, item).await
        },
        EventKind::Rebalanced(item) => {
            cycle_manager::rebalanced(app_state, &ctx, item).await
        },
        EventKind::InterestAccrued(item) => {
            cycle_manager::interest_accrued(app_state, &ctx, item).await
        },

        EventKind::LpAdded(item) => {
            liquidity_manager::lp_added(app_state, &ctx, item).await
        },
        EventKind::LpRemoved(item) => {
            liquidity_manager::lp_removed(app_state, &ctx, item).await
        },
        EventKind::LiquidityAdditionRequested(item) => {
            liquidity_manager::liquidity_addition_requested(
                app_state, &ctx, item,
            )
            .await
        },
        EventKind::LiquidityReductionRequested(item) => {
            liquidity_manager::liquidity_reduction_requested(
                app_state, &ctx, item,
            )
            .await
        },
        EventKind::LiquidityAdded(item) => {
            liquidity_manager::liquidity_added(app_state, &ctx, item).await
        },
        EventKind::LiquidityReduced(item) => {
            liquidity_manager::liquidity_reduced(app_state, &ctx, item).await
        },
        EventKind::CollateralAdded(item) => {
            liquidity_manager::collateral_added(app_state, &ctx, item).await
        },
        EventKind::CollateralReduced(item) => {
            liquidity_manager::collateral_reduced(app_state, &ctx, item).await
        },
        EventKind::InterestClaimed(item) => {
            liquidity_manager::interest_claimed(app_state, &ctx, item).await
        },
        EventKind::InterestDistributed(item) => {
            liquidity_manager::interest_distributed(app_state, &ctx, item)
                .await
        },
        EventKind::FeeDeducted(item) => {
            liquidity_manager::fee_deducted(app_state, &ctx, item).await
        },
        EventKind::LpLiquidationRequested(item) => {
            liquidity_manager::lp_liquidation_requested(app_state, &ctx, item)
                .await
        },
        EventKind::LpLiquidationExecuted(item) => {
            liquidity_manager::lp_liquidation_executed(app_state, &ctx, item)
                .await
        },
        EventKind::LpLiquidationCancelled(item) => {
            liquidity_manager::lp_liquidation_cancelled(app_state, &ctx, item)
                .await
        },
        EventKind::DelegateSet(item) => {
            liquidity_manager::delegate_set(app_state, &ctx, item).await
        },

        EventKind::InterestRateParamsUpdated(item) => {
            strategy::interest_rate_params_updated(app_state, &ctx, item).await
        },
        EventKind::UserCollateralParamsUpdated(item) => {
            strategy::user_collateral_params_updated(app_state, &ctx, item)
                .await
        },
        EventKind::LpCollateralParamsUpdated(item) => {
            strategy::lp_collateral_params_updated(app_state, &ctx, item).await
        },
        EventKind::CycleParamsUpdated(item) => {
            strategy::cycle_params_updated(app_state, &ctx, item).await
        },
        EventKind::HaltParamsUpdated(item) => {
            strategy::halt_params_updated(app_state, &ctx, item).await
        },
        EventKind::FeeParamsUpdated(item) => {
            strategy::fee_params_updated(app_state, &ctx, item).await
        },
        EventKind::YieldBearingUpdated(item) => {
            strategy::yield_bearing_updated(app_state, &ctx, item).await
        },
    }
}
