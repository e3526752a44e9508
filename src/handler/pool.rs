//! Asset pool events, the user side: collateral moves, deposit/redeem
//! requests, claims, and liquidations. The emitting contract is the pool
//! itself. Settlement math involves proportional reductions the feed does
//! not carry, so settlements replace balances with authoritative accessor
//! reads instead of applying deltas.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{pool_state::reconcile_pool, strategy_of};
use crate::{
    configuration::{AppState, State},
    dispatch::EventCtx,
    error::Error,
    helpers::{checked_sub, classify_health, user_thresholds},
    model::{Pool, RequestKind, RequestStatus, UserPosition, UserRequest},
    types::{
        AssetClaimed, CollateralDeposited, CollateralWithdrawn,
        DepositRequested, LiquidationCancelled, LiquidationClaimed,
        LiquidationRequested, RedeemRequested, ReserveWithdrawn,
    },
};

pub async fn collateral_deposited(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &CollateralDeposited,
) -> Result<(), Error> {
    let Some(mut pool) = load_pool(app_state, ctx.source).await? else {
        return Ok(());
    };

    let amount = BigDecimal::from_str(&item.amount)?;
    let mut position = position_or_new(app_state, &item.user, &pool, ctx.at).await?;

    position.collateral_amount += &amount;
    finish_position(app_state, &pool, &mut position, ctx.at).await?;

    save_reconciled(app_state, &mut pool, ctx.at).await
}

pub async fn collateral_withdrawn(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &CollateralWithdrawn,
) -> Result<(), Error> {
    let Some(mut pool) = load_pool(app_state, ctx.source).await? else {
        return Ok(());
    };
    let Some(mut position) =
        load_position(app_state, &item.user, &pool).await?
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

pub async fn deposit_requested(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &DepositRequested,
) -> Result<(), Error> {
    let Some(mut pool) = load_pool(app_state, ctx.source).await? else {
        return Ok(());
    };

    let amount = BigDecimal::from_str(&item.amount)?;
    let cycle_index: i64 = item.cycle_index.parse()?;
    let mut position = position_or_new(app_state, &item.user, &pool, ctx.at).await?;
    let mut request = UserRequest::new(
        item.user.clone(),
        pool.address.clone(),
        cycle_index,
        RequestKind::Deposit,
        amount.clone(),
        ctx.at,
    );

    position.deposit_amount += &amount;

    // The event does not carry the collateral the contract locked with the
    // request; read it back when the accessor answers.
    if let Some(state) = app_state
        .query_api
        .user_request_state(&pool.address, &item.user)
        .await
    {
        request.collateral_amount = state.collateral_amount.clone();
        position.collateral_amount += &state.collateral_amount;
    }

    app_state.store.save_user_request(&request).await?;
    finish_position(app_state, &pool, &mut position, ctx.at).await?;

    pool.cycle_total_deposits += &amount;
    save_reconciled(app_state, &mut pool, ctx.at).await
}

pub async fn asset_claimed(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &AssetClaimed,
) -> Result<(), Error> {
    let Some(mut pool) = load_pool(app_state, ctx.source).await? else {
        return Ok(());
    };

    let amount = BigDecimal::from_str(&item.amount)?;
    let cycle_index: i64 = item.cycle_index.parse()?;
    let mut position = position_or_new(app_state, &item.user, &pool, ctx.at).await?;

    position.asset_amount += &amount;
    finish_position(app_state, &pool, &mut position, ctx.at).await?;

    complete_request(
        app_state,
        &item.user,
        &pool.address,
        cycle_index,
        RequestKind::Deposit,
        ctx.at,
    )
    .await?;

    save_reconciled(app_state, &mut pool, ctx.at).await
}

pub async fn redeem_requested(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &RedeemRequested,
) -> Result<(), Error> {
    let Some(mut pool) = load_pool(app_state, ctx.source).await? else {
        return Ok(());
    };

    let amount = BigDecimal::from_str(&item.amount)?;
    let cycle_index: i64 = item.cycle_index.parse()?;
    let request = UserRequest::new(
        item.user.clone(),
        pool.address.clone(),
        cycle_index,
        RequestKind::Redeem,
        amount.clone(),
        ctx.at,
    );
    app_state.store.save_user_request(&request).await?;

    pool.cycle_total_redemptions += &amount;
    save_reconciled(app_state, &mut pool, ctx.at).await
}

pub async fn reserve_withdrawn(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &ReserveWithdrawn,
) -> Result<(), Error> {
    let Some(mut pool) = load_pool(app_state, ctx.source).await? else {
        return Ok(());
    };
    let Some(mut position) =
        load_position(app_state, &item.user, &pool).await?
    else {
        return Ok(());
    };

    let cycle_index: i64 = item.cycle_index.parse()?;

    settle_position(app_state, &pool, &mut position).await;
    finish_position(app_state, &pool, &mut position, ctx.at).await?;

    complete_request(
        app_state,
        &item.user,
        &pool.address,
        cycle_index,
        RequestKind::Redeem,
        ctx.at,
    )
    .await?;

    save_reconciled(app_state, &mut pool, ctx.at).await
}

pub async fn liquidation_requested(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &LiquidationRequested,
) -> Result<(), Error> {
    let Some(pool) = load_pool(app_state, ctx.source).await? else {
        return Ok(());
    };
    let Some(mut position) =
        load_position(app_state, &item.user, &pool).await?
    else {
        return Ok(());
    };

    let cycle_index: i64 = item.cycle_index.parse()?;
    let mut request = UserRequest::new(
        item.user.clone(),
        pool.address.clone(),
        cycle_index,
        RequestKind::Liquidate,
        BigDecimal::from(0),
        ctx.at,
    );
    request.liquidator = Some(item.liquidator.clone());
    app_state.store.save_user_request(&request).await?;

    position.liquidator = Some(item.liquidator.clone());
    position.updated_at = ctx.at;
    app_state.store.save_user_position(&position).await
}

pub async fn liquidation_claimed(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &LiquidationClaimed,
) -> Result<(), Error> {
    let Some(mut pool) = load_pool(app_state, ctx.source).await? else {
        return Ok(());
    };
    let Some(mut position) =
        load_position(app_state, &item.user, &pool).await?
    else {
        return Ok(());
    };

    let cycle_index: i64 = item.cycle_index.parse()?;

    settle_position(app_state, &pool, &mut position).await;
    position.liquidator = None;
    finish_position(app_state, &pool, &mut position, ctx.at).await?;

    complete_request(
        app_state,
        &item.user,
        &pool.address,
        cycle_index,
        RequestKind::Liquidate,
        ctx.at,
    )
    .await?;

    save_reconciled(app_state, &mut pool, ctx.at).await
}

pub async fn liquidation_cancelled(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &LiquidationCancelled,
) -> Result<(), Error> {
    let Some(pool) = load_pool(app_state, ctx.source).await? else {
        return Ok(());
    };

    let cycle_index: i64 = item.cycle_index.parse()?;
    let id = UserRequest::id_for(&item.user, &pool.address, cycle_index);

    if let Some(mut request) = app_state.store.load_user_request(&id).await? {
        if request.kind == RequestKind::Liquidate
            && request.status == RequestStatus::Pending
        {
            request.status = RequestStatus::Cancelled;
            request.resolved_at = Some(ctx.at);
            app_state.store.save_user_request(&request).await?;
        }
    }

    if let Some(mut position) =
        load_position(app_state, &item.user, &pool).await?
    {
        position.liquidator = None;
        position.updated_at = ctx.at;
        app_state.store.save_user_position(&position).await?;
    }

    Ok(())
}

async fn load_pool(
    app_state: &AppState<State>,
    source: &str,
) -> Result<Option<Pool>, Error> {
    let pool = app_state.store.load_pool(source).await?;
    if pool.is_none() {
        debug!("event from untracked pool {}", source);
    }

    Ok(pool)
}

async fn load_position(
    app_state: &AppState<State>,
    user: &str,
    pool: &Pool,
) -> Result<Option<UserPosition>, Error> {
    let id = UserPosition::id_for(user, &pool.address);
    let position = app_state.store.load_user_position(&id).await?;
    if position.is_none() {
        debug!("no position {} to mutate", id);
    }

    Ok(position)
}

async fn position_or_new(
    app_state: &AppState<State>,
    user: &str,
    pool: &Pool,
    at: DateTime<Utc>,
) -> Result<UserPosition, Error> {
    let id = UserPosition::id_for(user, &pool.address);

    Ok(app_state
        .store
        .load_user_position(&id)
        .await?
        .unwrap_or_else(|| {
            UserPosition::new(user.to_owned(), pool.address.clone(), at)
        }))
}

/// Replaces the position's balances with the authoritative contract state;
/// a failed read keeps every cached value.
async fn settle_position(
    app_state: &AppState<State>,
    pool: &Pool,
    position: &mut UserPosition,
) {
    if let Some(state) = app_state
        .query_api
        .user_position_state(&pool.address, &position.user)
        .await
    {
        position.deposit_amount = state.deposit_amount;
        position.asset_amount = state.asset_amount;
        position.collateral_amount = state.collateral_amount;
    } else {
        debug!("settlement read failed for position {}", position.id);
    }
}

/// Health recompute + timestamp + save, run after every balance change.
async fn finish_position(
    app_state: &AppState<State>,
    pool: &Pool,
    position: &mut UserPosition,
    at: DateTime<Utc>,
) -> Result<(), Error> {
    let strategy = strategy_of(app_state, pool).await?;
    let (healthy, liquidation) = user_thresholds(strategy.as_ref());

    position.health = classify_health(
        &position.collateral_amount,
        &position.asset_amount,
        &healthy,
        &liquidation,
    );
    position.updated_at = at;

    app_state.store.save_user_position(position).await
}

async fn complete_request(
    app_state: &AppState<State>,
    user: &str,
    pool: &str,
    cycle_index: i64,
    kind: RequestKind,
    at: DateTime<Utc>,
) -> Result<(), Error> {
    let id = UserRequest::id_for(user, pool, cycle_index);

    match app_state.store.load_user_request(&id).await? {
        Some(mut request)
            if request.kind == kind
                && request.status == RequestStatus::Pending =>
        {
            request.status = RequestStatus::Completed;
            request.resolved_at = Some(at);
            app_state.store.save_user_request(&request).await
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
        asset_claimed, collateral_deposited, collateral_withdrawn,
        deposit_requested, liquidation_cancelled, liquidation_claimed,
        liquidation_requested, redeem_requested, reserve_withdrawn,
    };
    use crate::{
        dao::{EntityStore, MemoryStore},
        handler::testing::{app_with, ctx, ScriptedQuery, EPOCH},
        model::{Pool, RequestStatus, UserPosition, UserRequest},
        types::{
            AssetClaimed, CollateralDeposited, CollateralWithdrawn,
            DepositRequested, LiquidationCancelled, LiquidationClaimed,
            LiquidationRequested, RedeemRequested, ReserveWithdrawn,
            UserPositionState, UserRequestState,
        },
    };

    const POOL: &str = "0xpool";
    const USER: &str = "0xuser";

    async fn seed_pool(store: &MemoryStore) {
        let at = Utc.timestamp_opt(EPOCH, 0).unwrap();
        let pool = Pool::new(
            String::from(POOL),
            String::from("0xoracle"),
            String::from("0xusdc"),
            String::from("BTC"),
            at,
        );
        store.save_pool(&pool).await.unwrap();
    }

    async fn position(store: &MemoryStore) -> UserPosition {
        store
            .load_user_position(&UserPosition::id_for(USER, POOL))
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn deposit_then_claim_completes_the_request() {
        let (app, store) = app_with(ScriptedQuery::default());
        seed_pool(&store).await;

        deposit_requested(
            &app,
            &ctx(POOL),
            &DepositRequested {
                user: String::from(USER),
                amount: String::from("100"),
                cycle_index: String::from("1"),
            },
        )
        .await
        .unwrap();

        asset_claimed(
            &app,
            &ctx(POOL),
            &AssetClaimed {
                user: String::from(USER),
                amount: String::from("100"),
                cycle_index: String::from("1"),
            },
        )
        .await
        .unwrap();

        let position = position(&store).await;
        assert_eq!(position.asset_amount, BigDecimal::from(100));
        assert_eq!(position.deposit_amount, BigDecimal::from(100));

        let request = store
            .load_user_request(&UserRequest::id_for(USER, POOL, 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.status, RequestStatus::Completed);
        assert!(request.resolved_at.is_some());
        assert_eq!(store.user_request_count().await, 1);
    }

    #[tokio::test]
    async fn deposit_request_absorbs_accessor_collateral() {
        let (app, store) = app_with(ScriptedQuery {
            user_request_state: Some(UserRequestState {
                amount: BigDecimal::from(100),
                collateral_amount: BigDecimal::from(20),
            }),
            ..ScriptedQuery::default()
        });
        seed_pool(&store).await;

        deposit_requested(
            &app,
            &ctx(POOL),
            &DepositRequested {
                user: String::from(USER),
                amount: String::from("100"),
                cycle_index: String::from("1"),
            },
        )
        .await
        .unwrap();

        let position = position(&store).await;
        assert_eq!(position.collateral_amount, BigDecimal::from(20));

        let request = store
            .load_user_request(&UserRequest::id_for(USER, POOL, 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.collateral_amount, BigDecimal::from(20));

        let pool = store.load_pool(POOL).await.unwrap().unwrap();
        assert_eq!(pool.cycle_total_deposits, BigDecimal::from(100));
    }

    #[tokio::test]
    async fn collateral_withdrawal_underflow_is_fatal() {
        let (app, store) = app_with(ScriptedQuery::default());
        seed_pool(&store).await;

        collateral_deposited(
            &app,
            &ctx(POOL),
            &CollateralDeposited {
                user: String::from(USER),
                amount: String::from("50"),
            },
        )
        .await
        .unwrap();

        collateral_withdrawn(
            &app,
            &ctx(POOL),
            &CollateralWithdrawn {
                user: String::from(USER),
                amount: String::from("40"),
            },
        )
        .await
        .unwrap();

        assert_eq!(position(&store).await.collateral_amount, BigDecimal::from(10));

        let err = collateral_withdrawn(
            &app,
            &ctx(POOL),
            &CollateralWithdrawn {
                user: String::from(USER),
                amount: String::from("20"),
            },
        )
        .await;
        assert!(err.is_err());
        // balance untouched by the failed event
        assert_eq!(position(&store).await.collateral_amount, BigDecimal::from(10));
    }

    #[tokio::test]
    async fn redemption_settles_from_authoritative_state() {
        let (app, store) = app_with(ScriptedQuery {
            user_position_state: Some(UserPositionState {
                deposit_amount: BigDecimal::from(60),
                asset_amount: BigDecimal::from(40),
                collateral_amount: BigDecimal::from(12),
            }),
            ..ScriptedQuery::default()
        });
        seed_pool(&store).await;

        deposit_requested(
            &app,
            &ctx(POOL),
            &DepositRequested {
                user: String::from(USER),
                amount: String::from("100"),
                cycle_index: String::from("1"),
            },
        )
        .await
        .unwrap();

        redeem_requested(
            &app,
            &ctx(POOL),
            &RedeemRequested {
                user: String::from(USER),
                amount: String::from("40"),
                cycle_index: String::from("2"),
            },
        )
        .await
        .unwrap();

        reserve_withdrawn(
            &app,
            &ctx(POOL),
            &ReserveWithdrawn {
                user: String::from(USER),
                amount: String::from("40"),
                cycle_index: String::from("2"),
            },
        )
        .await
        .unwrap();

        let position = position(&store).await;
        assert_eq!(position.deposit_amount, BigDecimal::from(60));
        assert_eq!(position.asset_amount, BigDecimal::from(40));
        assert_eq!(position.collateral_amount, BigDecimal::from(12));

        let request = store
            .load_user_request(&UserRequest::id_for(USER, POOL, 2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.status, RequestStatus::Completed);
    }

    #[tokio::test]
    async fn liquidation_round_trip_and_cancel() {
        let (app, store) = app_with(ScriptedQuery::default());
        seed_pool(&store).await;

        collateral_deposited(
            &app,
            &ctx(POOL),
            &CollateralDeposited {
                user: String::from(USER),
                amount: String::from("30"),
            },
        )
        .await
        .unwrap();

        liquidation_requested(
            &app,
            &ctx(POOL),
            &LiquidationRequested {
                user: String::from(USER),
                liquidator: String::from("0xliq"),
                cycle_index: String::from("3"),
            },
        )
        .await
        .unwrap();

        assert_eq!(position(&store).await.liquidator.as_deref(), Some("0xliq"));

        liquidation_cancelled(
            &app,
            &ctx(POOL),
            &LiquidationCancelled {
                user: String::from(USER),
                cycle_index: String::from("3"),
            },
        )
        .await
        .unwrap();

        let after = position(&store).await;
        assert!(after.liquidator.is_none());
        // cancel leaves balances exactly as before the request
        assert_eq!(after.collateral_amount, BigDecimal::from(30));

        let request = store
            .load_user_request(&UserRequest::id_for(USER, POOL, 3))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.status, RequestStatus::Cancelled);

        // a fresh request in a later cycle gets its own record and settles
        liquidation_requested(
            &app,
            &ctx(POOL),
            &LiquidationRequested {
                user: String::from(USER),
                liquidator: String::from("0xliq"),
                cycle_index: String::from("4"),
            },
        )
        .await
        .unwrap();

        liquidation_claimed(
            &app,
            &ctx(POOL),
            &LiquidationClaimed {
                user: String::from(USER),
                liquidator: String::from("0xliq"),
                amount: String::from("30"),
                cycle_index: String::from("4"),
            },
        )
        .await
        .unwrap();

        let request = store
            .load_user_request(&UserRequest::id_for(USER, POOL, 4))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.status, RequestStatus::Completed);
        assert!(position(&store).await.liquidator.is_none());
        assert_eq!(store.user_request_count().await, 2);
    }

    #[tokio::test]
    async fn events_for_untracked_pools_are_noops() {
        let (app, store) = app_with(ScriptedQuery::default());

        collateral_deposited(
            &app,
            &ctx("0xunknown"),
            &CollateralDeposited {
                user: String::from(USER),
                amount: String::from("5"),
            },
        )
        .await
        .unwrap();

        assert!(store
            .load_user_position(&UserPosition::id_for(USER, "0xunknown"))
            .await
            .unwrap()
            .is_none());
    }
}
