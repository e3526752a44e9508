//! Liquidity manager events, the LP side: commitments, collateral,
//! interest, fees, and LP liquidations. The manager is per-pool; events
//! resolve their pool through the back-reference written at creation.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{
    pool_for_liquidity_manager, pool_state::reconcile_pool, strategy_of,
};
use crate::{
    configuration::{AppState, State},
    dispatch::EventCtx,
    error::Error,
    helpers::{checked_sub, classify_health, lp_thresholds},
    model::{
        log_id, FeeEvent, LPPosition, LPRequest, Pool, RequestKind,
        RequestStatus,
    },
    types::{
        CollateralAdded, CollateralReduced, DelegateSet, FeeDeducted,
        InterestClaimed, InterestDistributed, LiquidityAdded,
        LiquidityAdditionRequested, LiquidityReduced,
        LiquidityReductionRequested, LpAdded, LpLiquidationCancelled,
        LpLiquidationExecuted, LpLiquidationRequested, LpRemoved,
    },
};

pub async fn lp_added(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &LpAdded,
) -> Result<(), Error> {
    let Some(mut pool) =
        pool_for_liquidity_manager(app_state, ctx.source).await?
    else {
        return Ok(());
    };

    let mut position =
        position_or_new(app_state, &item.lp, &pool, ctx.at).await?;

    position.liquidity_commitment =
        BigDecimal::from_str(&item.liquidity_amount)?;
    position.collateral_amount =
        BigDecimal::from_str(&item.collateral_amount)?;
    position.is_active = true;
    finish_position(app_state, &pool, &mut position, ctx.at).await?;

    pool.lp_count += 1;
    save_reconciled(app_state, &mut pool, ctx.at).await
}

pub async fn lp_removed(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &LpRemoved,
) -> Result<(), Error> {
    let Some(mut pool) =
        pool_for_liquidity_manager(app_state, ctx.source).await?
    else {
        return Ok(());
    };
    let Some(mut position) = load_position(app_state, &item.lp, &pool).await?
    else {
        return Ok(());
    };

    position.clear_balances();
    finish_position(app_state, &pool, &mut position, ctx.at).await?;

    // The single tolerated decrement anomaly: reconciliation will correct
    // the count, so a zero here is warned about rather than fatal.
    if pool.lp_count == 0 {
        warn!("lp_count already zero on pool {}", pool.address);
    } else {
        pool.lp_count -= 1;
    }

    save_reconciled(app_state, &mut pool, ctx.at).await
}

pub async fn liquidity_addition_requested(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &LiquidityAdditionRequested,
) -> Result<(), Error> {
    file_request(
        app_state,
        ctx,
        &item.lp,
        &item.amount,
        &item.cycle_index,
        RequestKind::AddLiquidity,
        None,
    )
    .await
}

pub async fn liquidity_reduction_requested(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &LiquidityReductionRequested,
) -> Result<(), Error> {
    file_request(
        app_state,
        ctx,
        &item.lp,
        &item.amount,
        &item.cycle_index,
        RequestKind::ReduceLiquidity,
        None,
    )
    .await
}

pub async fn liquidity_added(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &LiquidityAdded,
) -> Result<(), Error> {
    let Some(mut pool) =
        pool_for_liquidity_manager(app_state, ctx.source).await?
    else {
        return Ok(());
    };

    let amount = BigDecimal::from_str(&item.amount)?;
    let mut position =
        position_or_new(app_state, &item.lp, &pool, ctx.at).await?;

    position.liquidity_commitment += &amount;
    position.is_active = true;
    finish_position(app_state, &pool, &mut position, ctx.at).await?;

    // Add/reduce settlements carry no cycle index; they complete the
    // request filed in the pool's current cycle.
    complete_request(
        app_state,
        &item.lp,
        &pool.address,
        pool.cycle_index,
        RequestKind::AddLiquidity,
        ctx.at,
    )
    .await?;

    pool.cycle_total_add_liquidity_amount += &amount;
    save_reconciled(app_state, &mut pool, ctx.at).await
}

pub async fn liquidity_reduced(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &LiquidityReduced,
) -> Result<(), Error> {
    let Some(mut pool) =
        pool_for_liquidity_manager(app_state, ctx.source).await?
    else {
        return Ok(());
    };
    let Some(mut position) = load_position(app_state, &item.lp, &pool).await?
    else {
        return Ok(());
    };

    let amount = BigDecimal::from_str(&item.amount)?;
    position.liquidity_commitment = checked_sub(
        &position.liquidity_commitment,
        &amount,
        &position.id,
        "liquidity_commitment",
    )?;
    position.is_active = position.liquidity_commitment > BigDecimal::from(0);
    finish_position(app_state, &pool, &mut position, ctx.at).await?;

    complete_request(
        app_state,
        &item.lp,
        &pool.address,
        pool.cycle_index,
        RequestKind::ReduceLiquidity,
        ctx.at,
    )
    .await?;

    pool.cycle_total_reduce_liquidity_amount += &amount;
    save_reconciled(app_state, &mut pool, ctx.at).await
}

pub async fn collateral_added(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &CollateralAdded,
) -> Result<(), Error> {
    let Some(mut pool) =
        pool_for_liquidity_manager(app_state, ctx.source).await?
    else {
        return Ok(());
    };

    let amount = BigDecimal::from_str(&item.amount)?;
    let mut position =
        position_or_new(app_state, &item.lp, &pool, ctx.at).await?;

    position.collateral_amount += &amount;
    finish_position(app_state, &pool, &mut position, ctx.at).await?;

    save_reconciled(app_state, &mut pool, ctx.at).await
}

pub async fn collateral_reduced(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &CollateralReduced,
) -> Result<(), Error> {
    let Some(mut pool) =
        pool_for_liquidity_manager(app_state, ctx.source).await?
    else {
        return Ok(());
    };
    let Some(mut position) = load_position(app_state, &item.lp, &pool).await?
    else {
        return Ok(());
    };

    let amount = BigDecimal::from_str(&item.amount)?;
    position.collateral_amount = checked_sub(
        &position.collateral_amount,
        &amount,
        &position.id,
        "collateral_amount",
    )?;
    finish_position(app_state, &pool, &mut position, ctx.at).await?;

    save_reconciled(app_state, &mut pool, ctx.at).await
}

pub async fn interest_claimed(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &InterestClaimed,
) -> Result<(), Error> {
    let Some(pool) = pool_for_liquidity_manager(app_state, ctx.source).await?
    else {
        return Ok(());
    };
    let Some(mut position) = load_position(app_state, &item.lp, &pool).await?
    else {
        return Ok(());
    };

    position.interest_accrued = BigDecimal::from(0);
    position.updated_at = ctx.at;
    app_state.store.save_lp_position(&position).await
}

pub async fn interest_distributed(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &InterestDistributed,
) -> Result<(), Error> {
    let Some(pool) = pool_for_liquidity_manager(app_state, ctx.source).await?
    else {
        return Ok(());
    };

    let amount = BigDecimal::from_str(&item.amount)?;
    let mut position =
        position_or_new(app_state, &item.lp, &pool, ctx.at).await?;

    position.interest_accrued += &amount;
    position.updated_at = ctx.at;
    app_state.store.save_lp_position(&position).await
}

pub async fn fee_deducted(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &FeeDeducted,
) -> Result<(), Error> {
    let Some(mut pool) =
        pool_for_liquidity_manager(app_state, ctx.source).await?
    else {
        return Ok(());
    };
    let Some(mut position) = load_position(app_state, &item.lp, &pool).await?
    else {
        return Ok(());
    };

    let amount = BigDecimal::from_str(&item.amount)?;
    position.collateral_amount = checked_sub(
        &position.collateral_amount,
        &amount,
        &position.id,
        "collateral_amount",
    )?;
    finish_position(app_state, &pool, &mut position, ctx.at).await?;

    app_state
        .store
        .save_fee_event(&FeeEvent {
            id: log_id(ctx.tx_hash, ctx.log_index),
            lp: item.lp.clone(),
            pool: pool.address.clone(),
            amount,
            fee_type: item.fee_type.clone(),
            block_number: ctx.block_number,
            tx_hash: ctx.tx_hash.to_owned(),
            log_index: ctx.log_index,
            created_at: ctx.at,
        })
        .await?;

    save_reconciled(app_state, &mut pool, ctx.at).await
}

pub async fn lp_liquidation_requested(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &LpLiquidationRequested,
) -> Result<(), Error> {
    let Some(pool) = pool_for_liquidity_manager(app_state, ctx.source).await?
    else {
        return Ok(());
    };
    let Some(mut position) = load_position(app_state, &item.lp, &pool).await?
    else {
        return Ok(());
    };

    file_request(
        app_state,
        ctx,
        &item.lp,
        "0",
        &item.cycle_index,
        RequestKind::Liquidate,
        Some(item.liquidator.clone()),
    )
    .await?;

    position.liquidator = Some(item.liquidator.clone());
    position.updated_at = ctx.at;
    app_state.store.save_lp_position(&position).await
}

pub async fn lp_liquidation_executed(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &LpLiquidationExecuted,
) -> Result<(), Error> {
    let Some(mut pool) =
        pool_for_liquidity_manager(app_state, ctx.source).await?
    else {
        return Ok(());
    };
    let Some(mut position) = load_position(app_state, &item.lp, &pool).await?
    else {
        return Ok(());
    };

    let amount = BigDecimal::from_str(&item.amount)?;
    let cycle_index: i64 = item.cycle_index.parse()?;

    position.liquidity_commitment = checked_sub(
        &position.liquidity_commitment,
        &amount,
        &position.id,
        "liquidity_commitment",
    )?;
    position.is_active = position.liquidity_commitment > BigDecimal::from(0);
    position.liquidator = None;
    finish_position(app_state, &pool, &mut position, ctx.at).await?;

    complete_request(
        app_state,
        &item.lp,
        &pool.address,
        cycle_index,
        RequestKind::Liquidate,
        ctx.at,
    )
    .await?;

    save_reconciled(app_state, &mut pool, ctx.at).await
}

pub async fn lp_liquidation_cancelled(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &LpLiquidationCancelled,
) -> Result<(), Error> {
    let Some(pool) = pool_for_liquidity_manager(app_state, ctx.source).await?
    else {
        return Ok(());
    };

    let cycle_index: i64 = item.cycle_index.parse()?;
    let id = LPRequest::id_for(&item.lp, &pool.address, cycle_index);

    if let Some(mut request) = app_state.store.load_lp_request(&id).await? {
        if request.kind == RequestKind::Liquidate
            && request.status == RequestStatus::Pending
        {
            request.status = RequestStatus::Cancelled;
            request.resolved_at = Some(ctx.at);
            app_state.store.save_lp_request(&request).await?;
        }
    }

    if let Some(mut position) =
        load_position(app_state, &item.lp, &pool).await?
    {
        position.liquidator = None;
        position.updated_at = ctx.at;
        app_state.store.save_lp_position(&position).await?;
    }

    Ok(())
}

pub async fn delegate_set(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &DelegateSet,
) -> Result<(), Error> {
    let Some(pool) = pool_for_liquidity_manager(app_state, ctx.source).await?
    else {
        return Ok(());
    };

    let mut position =
        position_or_new(app_state, &item.lp, &pool, ctx.at).await?;
    position.delegate = Some(item.delegate.clone());
    position.updated_at = ctx.at;
    app_state.store.save_lp_position(&position).await
}

async fn load_position(
    app_state: &AppState<State>,
    lp: &str,
    pool: &Pool,
) -> Result<Option<LPPosition>, Error> {
    let id = LPPosition::id_for(lp, &pool.address);
    let position = app_state.store.load_lp_position(&id).await?;
    if position.is_none() {
        debug!("no LP position {} to mutate", id);
    }

    Ok(position)
}

async fn position_or_new(
    app_state: &AppState<State>,
    lp: &str,
    pool: &Pool,
    at: DateTime<Utc>,
) -> Result<LPPosition, Error> {
    let id = LPPosition::id_for(lp, &pool.address);

    Ok(app_state.store.load_lp_position(&id).await?.unwrap_or_else(|| {
        LPPosition::new(lp.to_owned(), pool.address.clone(), at)
    }))
}

async fn finish_position(
    app_state: &AppState<State>,
    pool: &Pool,
    position: &mut LPPosition,
    at: DateTime<Utc>,
) -> Result<(), Error> {
    let strategy = strategy_of(app_state, pool).await?;
    let (healthy, liquidation) = lp_thresholds(strategy.as_ref());

    position.health = classify_health(
        &position.collateral_amount,
        &position.liquidity_commitment,
        &healthy,
        &liquidation,
    );
    position.updated_at = at;

    app_state.store.save_lp_position(position).await
}

#[allow(clippy::too_many_arguments)]
async fn file_request(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    lp: &str,
    amount: &str,
    cycle_index: &str,
    kind: RequestKind,
    liquidator: Option<String>,
) -> Result<(), Error> {
    let Some(pool) = pool_for_liquidity_manager(app_state, ctx.source).await?
    else {
        return Ok(());
    };

    let mut request = LPRequest::new(
        lp.to_owned(),
        pool.address.clone(),
        cycle_index.parse()?,
        kind,
        BigDecimal::from_str(amount)?,
        ctx.at,
    );
    request.liquidator = liquidator;

    app_state.store.save_lp_request(&request).await
}

async fn complete_request(
    app_state: &AppState<State>,
    lp: &str,
    pool: &str,
    cycle_index: i64,
    kind: RequestKind,
    at: DateTime<Utc>,
) -> Result<(), Error> {
    let id = LPRequest::id_for(lp, pool, cycle_index);

    match app_state.store.load_lp_request(&id).await? {
        Some(mut request)
            if request.kind == kind
                && request.status == RequestStatus::Pending =>
        {
            request.status = RequestStatus::Completed;
            request.resolved_at = Some(at);
            app_state.store.save_lp_request(&request).await
        },
        _ => {
            debug!("no pending {} request {} to complete", kind, id);
            Ok(())
        },
    }
}

async fn save_reconciled(
    app_state: &AppState<State>,
    pool: &mut Pool,
    at: DateTime<Utc>,
) -> Result<(), Error> {
    reconcile_pool(app_state, pool).await?;
    pool.updated_at = at;
    app_state.store.save_pool(pool).await
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use chrono::{TimeZone, Utc};

    use super::{
        collateral_added, collateral_reduced, fee_deducted, interest_claimed,
        interest_distributed, liquidity_added, liquidity_addition_requested,
        liquidity_reduced, lp_added, lp_liquidation_cancelled,
        lp_liquidation_executed, lp_liquidation_requested, lp_removed,
    };
    use crate::{
        dao::{EntityStore, MemoryStore},
        handler::testing::{app_with, ctx, ScriptedQuery, EPOCH},
        model::{
            LPPosition, LPRequest, LiquidityManagerPool, Pool,
            PositionHealth, RequestStatus,
        },
        types::{
            CollateralAdded, CollateralReduced, FeeDeducted, InterestClaimed,
            InterestDistributed, LiquidityAdded, LiquidityAdditionRequested,
            LiquidityReduced, LpAdded, LpLiquidationCancelled,
            LpLiquidationExecuted, LpLiquidationRequested, LpRemoved,
        },
    };

    const POOL: &str = "0xpool";
    const LM: &str = "0xlm";
    const LP: &str = "0xlp";

    async fn seed(store: &MemoryStore) {
        let at = Utc.timestamp_opt(EPOCH, 0).unwrap();
        let pool = Pool::new(
            String::from(POOL),
            String::from("0xoracle"),
            String::from("0xusdc"),
            String::from("BTC"),
            at,
        );
        store.save_pool(&pool).await.unwrap();
        store
            .save_liquidity_manager_pool(&LiquidityManagerPool {
                address: String::from(LM),
                pool: String::from(POOL),
            })
            .await
            .unwrap();
    }

    async fn add_lp(app: &crate::configuration::AppState<crate::configuration::State>) {
        lp_added(
            app,
            &ctx(LM),
            &LpAdded {
                lp: String::from(LP),
                liquidity_amount: String::from("500"),
                collateral_amount: String::from("50"),
            },
        )
        .await
        .unwrap();
    }

    async fn position(store: &MemoryStore) -> LPPosition {
        store
            .load_lp_position(&LPPosition::id_for(LP, POOL))
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn lp_add_and_remove_keep_the_record() {
        let (app, store) = app_with(ScriptedQuery::default());
        seed(&store).await;
        add_lp(&app).await;

        let added = position(&store).await;
        assert_eq!(added.liquidity_commitment, BigDecimal::from(500));
        assert_eq!(added.collateral_amount, BigDecimal::from(50));
        assert!(added.is_active);
        assert_eq!(store.load_pool(POOL).await.unwrap().unwrap().lp_count, 1);

        lp_removed(
            &app,
            &ctx(LM),
            &LpRemoved {
                lp: String::from(LP),
            },
        )
        .await
        .unwrap();

        let removed = position(&store).await;
        assert_eq!(removed.liquidity_commitment, BigDecimal::from(0));
        assert_eq!(removed.collateral_amount, BigDecimal::from(0));
        assert!(!removed.is_active);
        assert_eq!(removed.health, PositionHealth::Healthy);
        assert_eq!(store.load_pool(POOL).await.unwrap().unwrap().lp_count, 0);

        // removing again warns on the counter but never underflows it
        lp_removed(
            &app,
            &ctx(LM),
            &LpRemoved {
                lp: String::from(LP),
            },
        )
        .await
        .unwrap();
        assert_eq!(store.load_pool(POOL).await.unwrap().unwrap().lp_count, 0);
    }

    #[tokio::test]
    async fn collateral_reduction_is_exact_and_underflow_fatal() {
        let (app, store) = app_with(ScriptedQuery::default());
        seed(&store).await;
        add_lp(&app).await;

        collateral_reduced(
            &app,
            &ctx(LM),
            &CollateralReduced {
                lp: String::from(LP),
                amount: String::from("40"),
            },
        )
        .await
        .unwrap();

        let reduced = position(&store).await;
        assert_eq!(reduced.collateral_amount, BigDecimal::from(10));
        // 10/500 = 200 bp, below the 2000 bp LP liquidation threshold
        assert_eq!(reduced.health, PositionHealth::Liquidatable);

        let err = collateral_reduced(
            &app,
            &ctx(LM),
            &CollateralReduced {
                lp: String::from(LP),
                amount: String::from("20"),
            },
        )
        .await;
        assert!(err.is_err());
        assert_eq!(position(&store).await.collateral_amount, BigDecimal::from(10));
    }

    #[tokio::test]
    async fn liquidity_request_round_trip() {
        let (app, store) = app_with(ScriptedQuery::default());
        seed(&store).await;
        add_lp(&app).await;

        liquidity_addition_requested(
            &app,
            &ctx(LM),
            &LiquidityAdditionRequested {
                lp: String::from(LP),
                amount: String::from("200"),
                cycle_index: String::from("1"),
            },
        )
        .await
        .unwrap();

        let request = store
            .load_lp_request(&LPRequest::id_for(LP, POOL, 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.status, RequestStatus::Pending);

        liquidity_added(
            &app,
            &ctx(LM),
            &LiquidityAdded {
                lp: String::from(LP),
                amount: String::from("200"),
            },
        )
        .await
        .unwrap();

        let request = store
            .load_lp_request(&LPRequest::id_for(LP, POOL, 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.status, RequestStatus::Completed);
        assert_eq!(
            position(&store).await.liquidity_commitment,
            BigDecimal::from(700)
        );

        let pool = store.load_pool(POOL).await.unwrap().unwrap();
        assert_eq!(
            pool.cycle_total_add_liquidity_amount,
            BigDecimal::from(200)
        );
    }

    #[tokio::test]
    async fn liquidity_reduction_underflow_is_fatal() {
        let (app, store) = app_with(ScriptedQuery::default());
        seed(&store).await;
        add_lp(&app).await;

        liquidity_reduced(
            &app,
            &ctx(LM),
            &LiquidityReduced {
                lp: String::from(LP),
                amount: String::from("500"),
            },
        )
        .await
        .unwrap();

        let drained = position(&store).await;
        assert_eq!(drained.liquidity_commitment, BigDecimal::from(0));
        assert!(!drained.is_active);

        let err = liquidity_reduced(
            &app,
            &ctx(LM),
            &LiquidityReduced {
                lp: String::from(LP),
                amount: String::from("1"),
            },
        )
        .await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn interest_accrues_and_resets_on_claim() {
        let (app, store) = app_with(ScriptedQuery::default());
        seed(&store).await;
        add_lp(&app).await;

        for amount in ["5", "7"] {
            interest_distributed(
                &app,
                &ctx(LM),
                &InterestDistributed {
                    lp: String::from(LP),
                    amount: String::from(amount),
                },
            )
            .await
            .unwrap();
        }
        assert_eq!(position(&store).await.interest_accrued, BigDecimal::from(12));

        interest_claimed(
            &app,
            &ctx(LM),
            &InterestClaimed {
                lp: String::from(LP),
            },
        )
        .await
        .unwrap();
        assert_eq!(position(&store).await.interest_accrued, BigDecimal::from(0));
    }

    #[tokio::test]
    async fn fee_deduction_cuts_collateral_and_logs() {
        let (app, store) = app_with(ScriptedQuery::default());
        seed(&store).await;
        add_lp(&app).await;

        fee_deducted(
            &app,
            &ctx(LM),
            &FeeDeducted {
                lp: String::from(LP),
                amount: String::from("8"),
                fee_type: String::from("HALT"),
            },
        )
        .await
        .unwrap();

        assert_eq!(position(&store).await.collateral_amount, BigDecimal::from(42));

        let fees = store.fee_events().await;
        assert_eq!(fees.len(), 1);
        assert_eq!(fees[0].amount, BigDecimal::from(8));
        assert_eq!(fees[0].fee_type, "HALT");
    }

    #[tokio::test]
    async fn lp_liquidation_executes_against_the_filed_cycle() {
        let (app, store) = app_with(ScriptedQuery::default());
        seed(&store).await;
        add_lp(&app).await;

        lp_liquidation_requested(
            &app,
            &ctx(LM),
            &LpLiquidationRequested {
                lp: String::from(LP),
                liquidator: String::from("0xliq"),
                cycle_index: String::from("2"),
            },
        )
        .await
        .unwrap();
        assert_eq!(position(&store).await.liquidator.as_deref(), Some("0xliq"));

        lp_liquidation_executed(
            &app,
            &ctx(LM),
            &LpLiquidationExecuted {
                lp: String::from(LP),
                amount: String::from("300"),
                cycle_index: String::from("2"),
            },
        )
        .await
        .unwrap();

        let settled = position(&store).await;
        assert_eq!(settled.liquidity_commitment, BigDecimal::from(200));
        assert!(settled.liquidator.is_none());

        let request = store
            .load_lp_request(&LPRequest::id_for(LP, POOL, 2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.status, RequestStatus::Completed);
    }

    #[tokio::test]
    async fn cancelled_lp_liquidation_clears_the_liquidator() {
        let (app, store) = app_with(ScriptedQuery::default());
        seed(&store).await;
        add_lp(&app).await;

        lp_liquidation_requested(
            &app,
            &ctx(LM),
            &LpLiquidationRequested {
                lp: String::from(LP),
                liquidator: String::from("0xliq"),
                cycle_index: String::from("2"),
            },
        )
        .await
        .unwrap();

        lp_liquidation_cancelled(
            &app,
            &ctx(LM),
            &LpLiquidationCancelled {
                lp: String::from(LP),
                cycle_index: String::from("2"),
            },
        )
        .await
        .unwrap();

        let cancelled = position(&store).await;
        assert!(cancelled.liquidator.is_none());
        assert_eq!(cancelled.liquidity_commitment, BigDecimal::from(500));
        assert_eq!(cancelled.collateral_amount, BigDecimal::from(50));

        let request = store
            .load_lp_request(&LPRequest::id_for(LP, POOL, 2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.status, RequestStatus::Cancelled);
    }

    #[tokio::test]
    async fn collateral_add_improves_health() {
        let (app, store) = app_with(ScriptedQuery::default());
        seed(&store).await;
        add_lp(&app).await;

        // 50/500 = 1000 bp, below the 2000 bp threshold
        assert_eq!(position(&store).await.health, PositionHealth::Liquidatable);

        collateral_added(
            &app,
            &ctx(LM),
            &CollateralAdded {
                lp: String::from(LP),
                amount: String::from("100"),
            },
        )
        .await
        .unwrap();

        // 150/500 = 3000 bp, at the healthy boundary
        assert_eq!(position(&store).await.health, PositionHealth::Healthy);
    }
}
