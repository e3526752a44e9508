//! Pool factory events: oracle and pool creation, plus the relationship
//! wiring discovered at creation time. Discovery calls are individually
//! optional; whatever resolved gets wired, the rest stays empty and the
//! affected manager's future events no-op on their pool lookup.

use tracing::{debug, info};

use crate::{
    configuration::{AppState, State},
    dispatch::EventCtx,
    error::Error,
    model::{
        log_id, Cycle, CycleManagerPool, LiquidityManagerPool, Oracle, Pool,
        ProtocolEvent, ProtocolEventKind,
    },
    types::{OracleCreated, PoolCreated},
};

pub async fn oracle_created(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &OracleCreated,
) -> Result<(), Error> {
    if app_state.store.load_oracle(&item.oracle).await?.is_none() {
        let oracle = Oracle::new(
            item.oracle.clone(),
            item.asset_symbol.clone(),
            ctx.at,
        );
        app_state.store.save_oracle(&oracle).await?;
        info!("oracle {} created for {}", item.oracle, item.asset_symbol);
    } else {
        debug!("oracle {} already known", item.oracle);
    }

    append_protocol_event(
        app_state,
        ctx,
        ProtocolEventKind::OracleCreated,
        &item.oracle,
    )
    .await
}

pub async fn pool_created(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &PoolCreated,
) -> Result<(), Error> {
    let mut pool = match app_state.store.load_pool(&item.pool).await? {
        Some(existing) => {
            debug!("pool {} already known", item.pool);
            existing
        },
        None => Pool::new(
            item.pool.clone(),
            item.oracle.clone(),
            item.reserve_token.clone(),
            item.asset_symbol.clone(),
            ctx.at,
        ),
    };

    discover_relationships(app_state, &mut pool).await?;

    pool.updated_at = ctx.at;
    app_state.store.save_pool(&pool).await?;

    // The request tracker and rebalance rows need a Cycle to link to from
    // the very first event, so cycle #1 opens with the pool.
    let first_cycle = Cycle::id_for(&pool.address, 1);
    if app_state.store.load_cycle(&first_cycle).await?.is_none() {
        let cycle = Cycle::new(pool.address.clone(), 1, pool.lp_count, ctx.at);
        app_state.store.save_cycle(&cycle).await?;
    }

    match app_state.store.load_oracle(&item.oracle).await? {
        Some(mut oracle) => {
            oracle.pool = Some(pool.address.clone());
            oracle.updated_at = ctx.at;
            app_state.store.save_oracle(&oracle).await?;
        },
        None => {
            debug!("pool {} references unknown oracle {}", item.pool, item.oracle)
        },
    }

    info!("pool {} created, asset {}", item.pool, item.asset_symbol);

    append_protocol_event(
        app_state,
        ctx,
        ProtocolEventKind::PoolCreated,
        &item.pool,
    )
    .await
}

/// Reads the pool's collaborator addresses from the authoritative contract
/// and writes a manager back-reference for each one that resolved.
async fn discover_relationships(
    app_state: &AppState<State>,
    pool: &mut Pool,
) -> Result<(), Error> {
    let query = &app_state.query_api;

    if let Some(token) = query.asset_token(&pool.address).await {
        pool.asset_token = Some(token);
    } else {
        debug!("asset token discovery failed for pool {}", pool.address);
    }

    if let Some(manager) = query.pool_cycle_manager(&pool.address).await {
        app_state
            .store
            .save_cycle_manager_pool(&CycleManagerPool {
                address: manager.clone(),
                pool: pool.address.clone(),
            })
            .await?;
        pool.cycle_manager = Some(manager);
    } else {
        debug!("cycle manager discovery failed for pool {}", pool.address);
    }

    if let Some(manager) = query.pool_liquidity_manager(&pool.address).await {
        app_state
            .store
            .save_liquidity_manager_pool(&LiquidityManagerPool {
                address: manager.clone(),
                pool: pool.address.clone(),
            })
            .await?;
        pool.liquidity_manager = Some(manager);
    } else {
        debug!("liquidity manager discovery failed for pool {}", pool.address);
    }

    if let Some(strategy) = query.pool_strategy(&pool.address).await {
        pool.strategy = Some(strategy);
    } else {
        debug!("strategy discovery failed for pool {}", pool.address);
    }

    Ok(())
}

async fn append_protocol_event(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    kind: ProtocolEventKind,
    subject: &str,
) -> Result<(), Error> {
    app_state
        .store
        .save_protocol_event(&ProtocolEvent {
            id: log_id(ctx.tx_hash, ctx.log_index),
            kind,
            subject: subject.to_owned(),
            verified: None,
            previous_owner: None,
            new_owner: None,
            block_number: ctx.block_number,
            tx_hash: ctx.tx_hash.to_owned(),
            log_index: ctx.log_index,
            created_at: ctx.at,
        })
        .await
}
