//! Cycle manager events: the per-pool cycle state machine. The manager is
//! deployed per pool and its events carry no pool reference; the
//! back-reference written at pool creation resolves the target.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use tracing::{debug, info};

use crate::{
    configuration::{AppState, State},
    dispatch::EventCtx,
    error::Error,
    helpers::{classify_health, lp_thresholds, to_date_time},
    model::{
        log_id, Cycle, CycleState, LPPosition, LPRebalance,
    },
    types::{CycleStarted, InterestAccrued, RebalanceInitiated, Rebalanced},
};

use super::{pool_for_cycle_manager, strategy_of};

pub async fn cycle_started(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &CycleStarted,
) -> Result<(), Error> {
    let Some(mut pool) = pool_for_cycle_manager(app_state, ctx.source).await?
    else {
        return Ok(());
    };

    let incoming: i64 = item.cycle_index.parse()?;
    if incoming <= pool.cycle_index {
        return Err(Error::CycleOrder {
            pool: pool.address.clone(),
            current: pool.cycle_index,
            incoming,
        });
    }

    let started_at = to_date_time(item.timestamp.parse()?)?;
    let query = &app_state.query_api;

    // Close the outgoing cycle: freeze the pool's per-cycle counters into
    // the snapshot and settle its rebalance price from the contract.
    let closing = Cycle::id_for(&pool.address, pool.cycle_index);
    match app_state.store.load_cycle(&closing).await? {
        Some(mut cycle) => {
            cycle.ended_at = Some(started_at);
            cycle.state = pool.cycle_state;
            cycle.price_high = pool.cycle_price_high.clone();
            cycle.price_low = pool.cycle_price_low.clone();
            cycle.total_deposits = pool.cycle_total_deposits.clone();
            cycle.total_redemptions = pool.cycle_total_redemptions.clone();
            cycle.total_add_liquidity_amount =
                pool.cycle_total_add_liquidity_amount.clone();
            cycle.total_reduce_liquidity_amount =
                pool.cycle_total_reduce_liquidity_amount.clone();
            cycle.interest_amount = pool.cycle_interest_amount.clone();
            cycle.lp_count = pool.lp_count;
            cycle.rebalanced_lps = pool.rebalanced_lps;

            if let Some(price) = query
                .cycle_rebalance_price(ctx.source, pool.cycle_index)
                .await
            {
                cycle.rebalance_price = price.clone();
                pool.prev_rebalance_price = price;
            }

            app_state.store.save_cycle(&cycle).await?;
        },
        None => debug!("no cycle snapshot {} to close", closing),
    }

    let next =
        Cycle::new(pool.address.clone(), incoming, pool.lp_count, started_at);
    app_state.store.save_cycle(&next).await?;

    pool.cycle_index = incoming;
    pool.cycle_state = CycleState::Active;
    pool.reset_cycle_counters();
    pool.cycle_price_high = BigDecimal::from(0);
    pool.cycle_price_low = BigDecimal::from(0);

    if let Some(manager) = pool.liquidity_manager.clone() {
        if let Some(value) = query.total_lp_liquidity_commited(&manager).await
        {
            pool.total_lp_liquidity_commited = value;
        }
    }
    if let Some(strategy) = pool.strategy.clone() {
        if let Some(rate) =
            query.pool_interest_rate(&strategy, &pool.address).await
        {
            pool.interest_rate = rate;
        }
        if let Some(ratio) =
            query.pool_utilization_ratio(&strategy, &pool.address).await
        {
            pool.utilization_ratio = ratio;
        }
    }

    pool.last_cycle_action_at = started_at;
    pool.updated_at = ctx.at;
    app_state.store.save_pool(&pool).await?;

    info!("pool {} entered cycle {}", pool.address, incoming);

    Ok(())
}

pub async fn rebalance_initiated(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &RebalanceInitiated,
) -> Result<(), Error> {
    let Some(mut pool) = pool_for_cycle_manager(app_state, ctx.source).await?
    else {
        return Ok(());
    };

    let state = CycleState::from_code(item.cycle_state.parse()?)?;
    pool.cycle_state = state;

    // Price bounds exist only once the onchain phase opens.
    if state == CycleState::RebalancingOnchain {
        let query = &app_state.query_api;
        if let Some(high) = query.cycle_price_high(ctx.source).await {
            pool.cycle_price_high = high;
        }
        if let Some(low) = query.cycle_price_low(ctx.source).await {
            pool.cycle_price_low = low;
        }
    }

    let open = Cycle::id_for(&pool.address, pool.cycle_index);
    if let Some(mut cycle) = app_state.store.load_cycle(&open).await? {
        cycle.state = state;
        cycle.price_high = pool.cycle_price_high.clone();
        cycle.price_low = pool.cycle_price_low.clone();
        app_state.store.save_cycle(&cycle).await?;
    }

    pool.last_cycle_action_at = ctx.at;
    pool.updated_at = ctx.at;
    app_state.store.save_pool(&pool).await
}

pub async fn rebalanced(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &Rebalanced,
) -> Result<(), Error> {
    let Some(mut pool) = pool_for_cycle_manager(app_state, ctx.source).await?
    else {
        return Ok(());
    };

    let position_id = LPPosition::id_for(&item.lp, &pool.address);
    let Some(mut position) =
        app_state.store.load_lp_position(&position_id).await?
    else {
        debug!("rebalance for unknown LP position {}", position_id);
        return Ok(());
    };

    let cycle_index: i64 = item.cycle_index.parse()?;
    let price = BigDecimal::from_str(&item.rebalance_price)?;
    let amount = BigDecimal::from_str(&item.amount)?;
    let query = &app_state.query_api;

    pool.rebalanced_lps += 1;
    let open = Cycle::id_for(&pool.address, pool.cycle_index);
    if let Some(mut cycle) = app_state.store.load_cycle(&open).await? {
        cycle.rebalanced_lps += 1;
        app_state.store.save_cycle(&cycle).await?;
    }

    position.last_rebalance_cycle = cycle_index;
    position.last_rebalance_price = price.clone();

    if let Some(manager) = &pool.liquidity_manager {
        if let Some(share) = query.lp_asset_share(manager, &item.lp).await {
            position.asset_share = share;
        }
    }

    // Prefer the strategy contract's own health verdict; fall back to the
    // local classification when the call fails.
    let remote_health = match (&pool.strategy, &pool.liquidity_manager) {
        (Some(strategy), Some(manager)) => {
            query.lp_liquidity_health(strategy, manager, &item.lp).await
        },
        _ => None,
    };
    position.health = match remote_health {
        Some(health) => health,
        None => {
            let strategy = strategy_of(app_state, &pool).await?;
            let (healthy, liquidation) = lp_thresholds(strategy.as_ref());
            classify_health(
                &position.collateral_amount,
                &position.liquidity_commitment,
                &healthy,
                &liquidation,
            )
        },
    };

    position.is_active = position.liquidity_commitment > BigDecimal::from(0);
    position.updated_at = ctx.at;
    app_state.store.save_lp_position(&position).await?;

    app_state
        .store
        .save_lp_rebalance(&LPRebalance {
            id: log_id(ctx.tx_hash, ctx.log_index),
            position: position.id.clone(),
            cycle: Cycle::id_for(&pool.address, cycle_index),
            lp: item.lp.clone(),
            pool: pool.address.clone(),
            cycle_index,
            rebalance_price: price,
            amount,
            is_deposit: item.is_deposit,
            was_settled: false,
            created_at: ctx.at,
        })
        .await?;

    pool.updated_at = ctx.at;
    app_state.store.save_pool(&pool).await
}

pub async fn interest_accrued(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &InterestAccrued,
) -> Result<(), Error> {
    let Some(mut pool) = pool_for_cycle_manager(app_state, ctx.source).await?
    else {
        return Ok(());
    };

    let amount = BigDecimal::from_str(&item.amount)?;
    pool.cycle_interest_amount += &amount;

    let open = Cycle::id_for(&pool.address, pool.cycle_index);
    if let Some(mut cycle) = app_state.store.load_cycle(&open).await? {
        cycle.interest_amount = pool.cycle_interest_amount.clone();
        app_state.store.save_cycle(&cycle).await?;
    }

    pool.updated_at = ctx.at;
    app_state.store.save_pool(&pool).await
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use chrono::{TimeZone, Utc};

    use super::{
        cycle_started, interest_accrued, rebalance_initiated, rebalanced,
    };
    use crate::{
        dao::{EntityStore, MemoryStore},
        handler::testing::{app_with, ctx, ScriptedQuery, EPOCH},
        model::{
            Cycle, CycleManagerPool, CycleState, LPPosition, PositionHealth,
            Pool,
        },
        types::{
            CycleStarted, InterestAccrued, RebalanceInitiated, Rebalanced,
        },
    };

    const POOL: &str = "0xpool";
    const CM: &str = "0xcm";
    const LP: &str = "0xlp";

    async fn seed(store: &MemoryStore) {
        let at = Utc.timestamp_opt(EPOCH, 0).unwrap();
        let mut pool = Pool::new(
            String::from(POOL),
            String::from("0xoracle"),
            String::from("0xusdc"),
            String::from("BTC"),
            at,
        );
        pool.cycle_manager = Some(String::from(CM));
        pool.lp_count = 4;
        pool.cycle_total_deposits = BigDecimal::from(500);
        store.save_pool(&pool).await.unwrap();
        store
            .save_cycle_manager_pool(&CycleManagerPool {
                address: String::from(CM),
                pool: String::from(POOL),
            })
            .await
            .unwrap();
        store
            .save_cycle(&Cycle::new(String::from(POOL), 1, 4, at))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cycle_start_closes_previous_and_opens_next() {
        let (app, store) = app_with(ScriptedQuery {
            cycle_rebalance_price: Some(BigDecimal::from(66_000)),
            total_lp_liquidity_commited: Some(BigDecimal::from(9_000)),
            pool_interest_rate: Some(BigDecimal::from(450)),
            pool_utilization_ratio: Some(BigDecimal::from(7_200)),
            ..ScriptedQuery::default()
        });
        seed(&store).await;

        // only reconciled fields need the strategy/manager wiring
        let mut pool = store.load_pool(POOL).await.unwrap().unwrap();
        pool.liquidity_manager = Some(String::from("0xlm"));
        pool.strategy = Some(String::from("0xstrat"));
        store.save_pool(&pool).await.unwrap();

        cycle_started(
            &app,
            &ctx(CM),
            &CycleStarted {
                cycle_index: String::from("2"),
                timestamp: (EPOCH + 3_600).to_string(),
            },
        )
        .await
        .unwrap();

        let closed = store
            .load_cycle(&Cycle::id_for(POOL, 1))
            .await
            .unwrap()
            .unwrap();
        assert!(closed.ended_at.is_some());
        assert_eq!(closed.total_deposits, BigDecimal::from(500));
        assert_eq!(closed.rebalance_price, BigDecimal::from(66_000));

        let open = store
            .load_cycle(&Cycle::id_for(POOL, 2))
            .await
            .unwrap()
            .unwrap();
        assert!(open.ended_at.is_none());
        assert_eq!(open.total_deposits, BigDecimal::from(0));
        assert_eq!(open.lp_count, 4);

        let pool = store.load_pool(POOL).await.unwrap().unwrap();
        assert_eq!(pool.cycle_index, 2);
        assert_eq!(pool.cycle_state, CycleState::Active);
        assert_eq!(pool.cycle_total_deposits, BigDecimal::from(0));
        assert_eq!(pool.prev_rebalance_price, BigDecimal::from(66_000));
        assert_eq!(pool.total_lp_liquidity_commited, BigDecimal::from(9_000));
        assert_eq!(pool.interest_rate, BigDecimal::from(450));
        assert_eq!(pool.utilization_ratio, BigDecimal::from(7_200));
    }

    #[tokio::test]
    async fn cycle_index_must_advance() {
        let (app, store) = app_with(ScriptedQuery::default());
        seed(&store).await;

        let err = cycle_started(
            &app,
            &ctx(CM),
            &CycleStarted {
                cycle_index: String::from("1"),
                timestamp: EPOCH.to_string(),
            },
        )
        .await;

        assert!(err.is_err());
        let pool = store.load_pool(POOL).await.unwrap().unwrap();
        assert_eq!(pool.cycle_index, 1);
    }

    #[tokio::test]
    async fn onchain_phase_records_price_bounds() {
        let (app, store) = app_with(ScriptedQuery {
            cycle_price_high: Some(BigDecimal::from(70_000)),
            cycle_price_low: Some(BigDecimal::from(60_000)),
            ..ScriptedQuery::default()
        });
        seed(&store).await;

        // offchain first: no bounds yet
        rebalance_initiated(
            &app,
            &ctx(CM),
            &RebalanceInitiated {
                cycle_index: String::from("1"),
                cycle_state: String::from("1"),
            },
        )
        .await
        .unwrap();

        let pool = store.load_pool(POOL).await.unwrap().unwrap();
        assert_eq!(pool.cycle_state, CycleState::RebalancingOffchain);
        assert_eq!(pool.cycle_price_high, BigDecimal::from(0));

        rebalance_initiated(
            &app,
            &ctx(CM),
            &RebalanceInitiated {
                cycle_index: String::from("1"),
                cycle_state: String::from("2"),
            },
        )
        .await
        .unwrap();

        let pool = store.load_pool(POOL).await.unwrap().unwrap();
        assert_eq!(pool.cycle_state, CycleState::RebalancingOnchain);
        assert_eq!(pool.cycle_price_high, BigDecimal::from(70_000));
        assert_eq!(pool.cycle_price_low, BigDecimal::from(60_000));

        let cycle = store
            .load_cycle(&Cycle::id_for(POOL, 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cycle.state, CycleState::RebalancingOnchain);
        assert_eq!(cycle.price_high, BigDecimal::from(70_000));
    }

    #[tokio::test]
    async fn unknown_state_code_is_fatal() {
        let (app, store) = app_with(ScriptedQuery::default());
        seed(&store).await;

        let err = rebalance_initiated(
            &app,
            &ctx(CM),
            &RebalanceInitiated {
                cycle_index: String::from("1"),
                cycle_state: String::from("7"),
            },
        )
        .await;

        assert!(err.is_err());
    }

    #[tokio::test]
    async fn rebalance_settles_the_lp_and_appends_a_record() {
        let (app, store) = app_with(ScriptedQuery {
            lp_liquidity_health: Some(PositionHealth::Warning),
            lp_asset_share: Some(BigDecimal::from(150)),
            ..ScriptedQuery::default()
        });
        seed(&store).await;

        let at = Utc.timestamp_opt(EPOCH, 0).unwrap();
        let mut pool = store.load_pool(POOL).await.unwrap().unwrap();
        pool.liquidity_manager = Some(String::from("0xlm"));
        pool.strategy = Some(String::from("0xstrat"));
        store.save_pool(&pool).await.unwrap();

        let mut position =
            LPPosition::new(String::from(LP), String::from(POOL), at);
        position.liquidity_commitment = BigDecimal::from(500);
        position.collateral_amount = BigDecimal::from(100);
        store.save_lp_position(&position).await.unwrap();

        rebalanced(
            &app,
            &ctx(CM),
            &Rebalanced {
                lp: String::from(LP),
                cycle_index: String::from("1"),
                rebalance_price: String::from("66000"),
                amount: String::from("25"),
                is_deposit: true,
            },
        )
        .await
        .unwrap();

        let pool = store.load_pool(POOL).await.unwrap().unwrap();
        assert_eq!(pool.rebalanced_lps, 1);

        let cycle = store
            .load_cycle(&Cycle::id_for(POOL, 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cycle.rebalanced_lps, 1);

        let position = store
            .load_lp_position(&LPPosition::id_for(LP, POOL))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(position.last_rebalance_cycle, 1);
        assert_eq!(position.last_rebalance_price, BigDecimal::from(66_000));
        assert_eq!(position.health, PositionHealth::Warning);
        assert_eq!(position.asset_share, BigDecimal::from(150));
        assert!(position.is_active);

        let rebalances = store.lp_rebalances().await;
        assert_eq!(rebalances.len(), 1);
        assert!(!rebalances[0].was_settled);
        assert_eq!(rebalances[0].cycle, Cycle::id_for(POOL, 1));
        assert_eq!(rebalances[0].position, LPPosition::id_for(LP, POOL));
    }

    #[tokio::test]
    async fn interest_accrual_accumulates() {
        let (app, store) = app_with(ScriptedQuery::default());
        seed(&store).await;

        for amount in ["10", "15"] {
            interest_accrued(
                &app,
                &ctx(CM),
                &InterestAccrued {
                    amount: String::from(amount),
                },
            )
            .await
            .unwrap();
        }

        let pool = store.load_pool(POOL).await.unwrap().unwrap();
        assert_eq!(pool.cycle_interest_amount, BigDecimal::from(25));

        let cycle = store
            .load_cycle(&Cycle::id_for(POOL, 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cycle.interest_amount, BigDecimal::from(25));
    }

    #[tokio::test]
    async fn unwired_manager_is_a_noop() {
        let (app, store) = app_with(ScriptedQuery::default());

        interest_accrued(
            &app,
            &ctx("0xstray"),
            &InterestAccrued {
                amount: String::from("10"),
            },
        )
        .await
        .unwrap();

        assert_eq!(store.pool_count().await, 0);
    }
}
