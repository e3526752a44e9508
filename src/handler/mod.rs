//! One module per emitting contract. Every handler is a free async fn
//! taking the shared state, the event envelope context, and the typed
//! parameters; a missing relationship makes it a no-op, an underflow stops
//! the pipeline.

pub mod cycle_manager;
pub mod factory;
pub mod liquidity_manager;
pub mod oracle;
pub mod pool;
pub mod pool_state;
pub mod registry;
pub mod strategy;

use tracing::debug;

use crate::{
    configuration::{AppState, State},
    error::Error,
    model::{Pool, Strategy},
};

/// Pool owning a cycle manager contract. Manager events carry no pool
/// reference, so the back-reference written at pool creation is the only
/// way home; an absent link means the caller no-ops.
pub(crate) async fn pool_for_cycle_manager(
    app_state: &AppState<State>,
    source: &str,
) -> Result<Option<Pool>, Error> {
    let Some(link) = app_state.store.load_cycle_manager_pool(source).await?
    else {
        debug!("no pool wired for cycle manager {}", source);
        return Ok(None);
    };

    let pool = app_state.store.load_pool(&link.pool).await?;
    if pool.is_none() {
        debug!("cycle manager {} points at missing pool {}", source, link.pool);
    }

    Ok(pool)
}

pub(crate) async fn pool_for_liquidity_manager(
    app_state: &AppState<State>,
    source: &str,
) -> Result<Option<Pool>, Error> {
    let Some(link) =
        app_state.store.load_liquidity_manager_pool(source).await?
    else {
        debug!("no pool wired for liquidity manager {}", source);
        return Ok(None);
    };

    let pool = app_state.store.load_pool(&link.pool).await?;
    if pool.is_none() {
        debug!(
            "liquidity manager {} points at missing pool {}",
            source, link.pool
        );
    }

    Ok(pool)
}

/// The pool's strategy record, when one was discovered and indexed.
pub(crate) async fn strategy_of(
    app_state: &AppState<State>,
    pool: &Pool,
) -> Result<Option<Strategy>, Error> {
    match &pool.strategy {
        Some(address) => app_state.store.load_strategy(address).await,
        None => Ok(None),
    }
}
