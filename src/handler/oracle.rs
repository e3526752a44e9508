//! Asset oracle events. The oracle is keyed by the emitting contract; price
//! moves mirror into the owning pool's cached `current_asset_price` through
//! the back-reference set at pool creation.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use tracing::debug;

use crate::{
    configuration::{AppState, State},
    dispatch::EventCtx,
    error::Error,
    helpers::to_date_time,
    model::Oracle,
    types::{OhlcUpdated, PriceSplitDetected, PriceUpdated},
};

pub async fn price_updated(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &PriceUpdated,
) -> Result<(), Error> {
    let Some(mut oracle) = app_state.store.load_oracle(ctx.source).await?
    else {
        debug!("price update from unknown oracle {}", ctx.source);
        return Ok(());
    };

    let price = BigDecimal::from_str(&item.price)?;
    oracle.asset_price = price.clone();
    oracle.last_price_update_at =
        Some(to_date_time(item.timestamp.parse()?)?);
    oracle.updated_at = ctx.at;
    app_state.store.save_oracle(&oracle).await?;

    mirror_price(app_state, ctx, &oracle, price).await
}

pub async fn ohlc_updated(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &OhlcUpdated,
) -> Result<(), Error> {
    let Some(mut oracle) = app_state.store.load_oracle(ctx.source).await?
    else {
        debug!("OHLC update from unknown oracle {}", ctx.source);
        return Ok(());
    };

    oracle.ohlc_open = BigDecimal::from_str(&item.open)?;
    oracle.ohlc_high = BigDecimal::from_str(&item.high)?;
    oracle.ohlc_low = BigDecimal::from_str(&item.low)?;
    oracle.ohlc_close = BigDecimal::from_str(&item.close)?;
    oracle.ohlc_updated_at = Some(to_date_time(item.timestamp.parse()?)?);
    oracle.updated_at = ctx.at;

    app_state.store.save_oracle(&oracle).await
}

pub async fn price_split_detected(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    item: &PriceSplitDetected,
) -> Result<(), Error> {
    let Some(mut oracle) = app_state.store.load_oracle(ctx.source).await?
    else {
        debug!("split detected on unknown oracle {}", ctx.source);
        return Ok(());
    };

    let new_price = BigDecimal::from_str(&item.new_price)?;
    oracle.split_detected = true;
    oracle.pre_split_price = BigDecimal::from_str(&item.previous_price)?;
    oracle.asset_price = new_price.clone();
    oracle.last_price_update_at =
        Some(to_date_time(item.timestamp.parse()?)?);
    oracle.updated_at = ctx.at;
    app_state.store.save_oracle(&oracle).await?;

    mirror_price(app_state, ctx, &oracle, new_price).await
}

async fn mirror_price(
    app_state: &AppState<State>,
    ctx: &EventCtx<'_>,
    oracle: &Oracle,
    price: BigDecimal,
) -> Result<(), Error> {
    let Some(pool_address) = &oracle.pool else {
        return Ok(());
    };

    match app_state.store.load_pool(pool_address).await? {
        Some(mut pool) => {
            pool.current_asset_price = price;
            pool.updated_at = ctx.at;
            app_state.store.save_pool(&pool).await
        },
        None => {
            debug!(
                "oracle {} back-references missing pool {}",
                oracle.address, pool_address
            );
            Ok(())
        },
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::{TimeZone, Utc};

    use super::{ohlc_updated, price_split_detected, price_updated};
    use crate::{
        dao::EntityStore,
        handler::testing::{app_with, ctx, ScriptedQuery, EPOCH},
        model::{Oracle, Pool},
        types::{OhlcUpdated, PriceSplitDetected, PriceUpdated},
    };

    async fn seed_linked_oracle(store: &crate::dao::MemoryStore) {
        let at = Utc.timestamp_opt(EPOCH, 0).unwrap();
        let mut oracle =
            Oracle::new(String::from("0xoracle"), String::from("BTC"), at);
        oracle.pool = Some(String::from("0xpool"));
        store.save_oracle(&oracle).await.unwrap();

        let pool = Pool::new(
            String::from("0xpool"),
            String::from("0xoracle"),
            String::from("0xusdc"),
            String::from("BTC"),
            at,
        );
        store.save_pool(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn price_mirrors_into_the_owning_pool() {
        let (app, store) = app_with(ScriptedQuery::default());
        seed_linked_oracle(&store).await;

        price_updated(
            &app,
            &ctx("0xoracle"),
            &PriceUpdated {
                price: String::from("65000"),
                timestamp: EPOCH.to_string(),
            },
        )
        .await
        .unwrap();

        let oracle = store.load_oracle("0xoracle").await.unwrap().unwrap();
        assert_eq!(oracle.asset_price, BigDecimal::from(65_000));
        assert!(oracle.last_price_update_at.is_some());

        let pool = store.load_pool("0xpool").await.unwrap().unwrap();
        assert_eq!(pool.current_asset_price, BigDecimal::from(65_000));
    }

    #[tokio::test]
    async fn unknown_oracle_is_a_noop() {
        let (app, store) = app_with(ScriptedQuery::default());

        price_updated(
            &app,
            &ctx("0xghost"),
            &PriceUpdated {
                price: String::from("1"),
                timestamp: EPOCH.to_string(),
            },
        )
        .await
        .unwrap();

        assert!(store.load_oracle("0xghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ohlc_snapshot_is_stored() {
        let (app, store) = app_with(ScriptedQuery::default());
        seed_linked_oracle(&store).await;

        ohlc_updated(
            &app,
            &ctx("0xoracle"),
            &OhlcUpdated {
                open: String::from("100"),
                high: String::from("120"),
                low: String::from("90"),
                close: String::from("110"),
                timestamp: EPOCH.to_string(),
            },
        )
        .await
        .unwrap();

        let oracle = store.load_oracle("0xoracle").await.unwrap().unwrap();
        assert_eq!(oracle.ohlc_open, BigDecimal::from(100));
        assert_eq!(oracle.ohlc_high, BigDecimal::from(120));
        assert_eq!(oracle.ohlc_low, BigDecimal::from(90));
        assert_eq!(oracle.ohlc_close, BigDecimal::from(110));
        assert!(oracle.ohlc_updated_at.is_some());
    }

    #[tokio::test]
    async fn split_keeps_the_pre_split_price() {
        let (app, store) = app_with(ScriptedQuery::default());
        seed_linked_oracle(&store).await;

        price_split_detected(
            &app,
            &ctx("0xoracle"),
            &PriceSplitDetected {
                previous_price: String::from("64000"),
                new_price: String::from("3200"),
                timestamp: EPOCH.to_string(),
            },
        )
        .await
        .unwrap();

        let oracle = store.load_oracle("0xoracle").await.unwrap().unwrap();
        assert!(oracle.split_detected);
        assert_eq!(
            oracle.pre_split_price,
            BigDecimal::from_str("64000").unwrap()
        );
        assert_eq!(oracle.asset_price, BigDecimal::from(3_200));

        let pool = store.load_pool("0xpool").await.unwrap().unwrap();
        assert_eq!(pool.current_asset_price, BigDecimal::from(3_200));
    }
}
