//! Protocol registry events: verification flags and ownership changes.
//! A strategy seen here for the first time is created lazily and filled in
//! one reconciliation pass over every accessor parameter group.

use tracing::{debug, info};

use crate::{
    configuration::{AppState, State},
    dispatch::EventCtx,
    error::Error,
    model::{log_id, ProtocolEvent, ProtocolEventKind, Strategy},
    types::{
        OracleVerificationUpdated, OwnershipTransferred,
        PoolVerificationUpdated, RegistryUpdated,
        StrategyVerificationUpdated,
    },
};

pub async fn oracle_verification_updated(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &OracleVerificationUpdated,
) -> Result<(), Error> {
    match app_state.store.load_oracle(&item.oracle).await? {
        Some(mut oracle) => {
            oracle.is_verified = item.is_verified;
            oracle.updated_at = ctx.at;
            app_state.store.save_oracle(&oracle).await?;
        },
        None => debug!("verification for unknown oracle {}", item.oracle),
    }

    append_verification(
        app_state,
        ctx,
        ProtocolEventKind::OracleVerification,
        &item.oracle,
        item.is_verified,
    )
    .await
}

pub async fn pool_verification_updated(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &PoolVerificationUpdated,
) -> Result<(), Error> {
    match app_state.store.load_pool(&item.pool).await? {
        Some(mut pool) => {
            pool.is_verified = item.is_verified;
            pool.updated_at = ctx.at;
            app_state.store.save_pool(&pool).await?;
        },
        None => debug!("verification for unknown pool {}", item.pool),
    }

    append_verification(
        app_state,
        ctx,
        ProtocolEventKind::PoolVerification,
        &item.pool,
        item.is_verified,
    )
    .await
}

pub async fn strategy_verification_updated(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &StrategyVerificationUpdated,
) -> Result<(), Error> {
    let mut strategy =
        match app_state.store.load_strategy(&item.strategy).await? {
            Some(existing) => existing,
            None => {
                // First sighting of this strategy; pull every parameter
                // group once so health thresholds and rate curves are
                // populated before its pools need them.
                let mut created =
                    Strategy::new(item.strategy.clone(), ctx.at);
                reconcile_strategy_params(app_state, &mut created).await;
                info!("strategy {} created from verification", item.strategy);
                created
            },
        };

    strategy.is_verified = item.is_verified;
    strategy.updated_at = ctx.at;
    app_state.store.save_strategy(&strategy).await?;

    append_verification(
        app_state,
        ctx,
        ProtocolEventKind::StrategyVerification,
        &item.strategy,
        item.is_verified,
    )
    .await
}

pub async fn ownership_transferred(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &OwnershipTransferred,
) -> Result<(), Error> {
    app_state
        .store
        .save_protocol_event(&ProtocolEvent {
            id: log_id(ctx.tx_hash, ctx.log_index),
            kind: ProtocolEventKind::OwnershipTransferred,
            subject: ctx.source.to_owned(),
            verified: None,
            previous_owner: Some(item.previous_owner.clone()),
            new_owner: Some(item.new_owner.clone()),
            block_number: ctx.block_number,
            tx_hash: ctx.tx_hash.to_owned(),
            log_index: ctx.log_index,
            created_at: ctx.at,
        })
        .await
}

/// The factory swapping its registry contract is audit-only, like an
/// ownership transfer: the old and new addresses ride the owner columns.
pub async fn registry_updated(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &RegistryUpdated,
) -> Result<(), Error> {
    app_state
        .store
        .save_protocol_event(&ProtocolEvent {
            id: log_id(ctx.tx_hash, ctx.log_index),
            kind: ProtocolEventKind::RegistryUpdated,
            subject: ctx.source.to_owned(),
            verified: None,
            previous_owner: Some(item.old_registry.clone()),
            new_owner: Some(item.new_registry.clone()),
            block_number: ctx.block_number,
            tx_hash: ctx.tx_hash.to_owned(),
            log_index: ctx.log_index,
            created_at: ctx.at,
        })
        .await
}

/// One pass over all seven accessor parameter groups, each apply-if-Some.
pub(crate) async fn reconcile_strategy_params(
    app_state: &AppState<State>,
    strategy: &mut Strategy,
) {
    let query = &app_state.query_api;
    let address = strategy.address.clone();

    if let Some(params) = query.interest_rate_params(&address).await {
        strategy.base_interest_rate = params.base_interest_rate;
        strategy.interest_rate_1 = params.interest_rate_1;
        strategy.max_interest_rate = params.max_interest_rate;
        strategy.utilization_tier_1 = params.utilization_tier_1;
        strategy.utilization_tier_2 = params.utilization_tier_2;
    }

    if let Some(params) = query.user_collateral_params(&address).await {
        strategy.user_healthy_collateral_ratio = params.healthy_ratio;
        strategy.user_liquidation_threshold = params.liquidation_threshold;
    }

    if let Some(params) = query.lp_collateral_params(&address).await {
        strategy.lp_healthy_collateral_ratio = params.healthy_ratio;
        strategy.lp_liquidation_threshold = params.liquidation_threshold;
        strategy.lp_liquidation_reward = params.liquidation_reward;
    }

    if let Some(params) = query.cycle_params(&address).await {
        strategy.rebalance_length = params.rebalance_length;
        strategy.oracle_update_threshold = params.oracle_update_threshold;
    }

    if let Some(params) = query.halt_params(&address).await {
        strategy.halt_threshold = params.halt_threshold;
        strategy.halt_liquidity_percent = params.liquidity_percent;
        strategy.halt_fee_percent = params.fee_percent;
        strategy.halt_request_threshold = params.request_threshold;
    }

    if let Some(params) = query.fee_params(&address).await {
        strategy.protocol_fee = params.protocol_fee;
        strategy.fee_recipient = Some(params.fee_recipient);
    }

    if let Some(flag) = query.is_yield_bearing(&address).await {
        strategy.is_yield_bearing = flag;
    }
}

async fn append_verification(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    kind: ProtocolEventKind,
    subject: &str,
    verified: bool,
) -> Result<(), Error> {
    app_state
        .store
        .save_protocol_event(&ProtocolEvent {
            id: log_id(ctx.tx_hash, ctx.log_index),
            kind,
            subject: subject.to_owned(),
            verified: Some(verified),
            previous_owner: None,
            new_owner: None,
            block_number: ctx.block_number,
            tx_hash: ctx.tx_hash.to_owned(),
            log_index: ctx.log_index,
            created_at: ctx.at,
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::{
        ownership_transferred, pool_verification_updated, registry_updated,
        strategy_verification_updated,
    };
    use crate::{
        dao::EntityStore,
        handler::testing::{app_with, ctx, ScriptedQuery},
        model::ProtocolEventKind,
        types::{
            OwnershipTransferred, PoolVerificationUpdated, RegistryUpdated,
            StrategyVerificationUpdated,
        },
    };

    #[tokio::test]
    async fn unseen_strategy_is_created_and_verified() {
        let (app, store) = app_with(ScriptedQuery::default());

        strategy_verification_updated(
            &app,
            &ctx("0xregistry"),
            &StrategyVerificationUpdated {
                strategy: String::from("0xstrat"),
                is_verified: true,
            },
        )
        .await
        .unwrap();

        let strategy = store.load_strategy("0xstrat").await.unwrap().unwrap();
        assert!(strategy.is_verified);

        let events = store.protocol_events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ProtocolEventKind::StrategyVerification);
        assert_eq!(events[0].verified, Some(true));
    }

    #[tokio::test]
    async fn verification_for_unknown_pool_is_a_noop() {
        let (app, store) = app_with(ScriptedQuery::default());

        pool_verification_updated(
            &app,
            &ctx("0xregistry"),
            &PoolVerificationUpdated {
                pool: String::from("0xmissing"),
                is_verified: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(store.pool_count().await, 0);
        // the audit record is still appended
        assert_eq!(store.protocol_events().await.len(), 1);
    }

    #[tokio::test]
    async fn registry_swap_records_both_addresses() {
        let (app, store) = app_with(ScriptedQuery::default());

        registry_updated(
            &app,
            &ctx("0xfactory"),
            &RegistryUpdated {
                old_registry: String::from("0xreg1"),
                new_registry: String::from("0xreg2"),
            },
        )
        .await
        .unwrap();

        let events = store.protocol_events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ProtocolEventKind::RegistryUpdated);
        assert_eq!(events[0].subject, "0xfactory");
        assert_eq!(events[0].previous_owner.as_deref(), Some("0xreg1"));
        assert_eq!(events[0].new_owner.as_deref(), Some("0xreg2"));
        // no pool or oracle state is touched
        assert_eq!(store.pool_count().await, 0);
    }

    #[tokio::test]
    async fn ownership_transfer_is_audit_only() {
        let (app, store) = app_with(ScriptedQuery::default());

        ownership_transferred(
            &app,
            &ctx("0xregistry"),
            &OwnershipTransferred {
                previous_owner: String::from("0xold"),
                new_owner: String::from("0xnew"),
            },
        )
        .await
        .unwrap();

        let events = store.protocol_events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].previous_owner.as_deref(), Some("0xold"));
        assert_eq!(events[0].new_owner.as_deref(), Some("0xnew"));
        assert_eq!(events[0].subject, "0xregistry");
    }
}
