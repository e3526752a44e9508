#![cfg(not(feature = "postgres"))]

//! End-to-end replay over the in-memory store: a short ordered feed goes
//! through file reading, envelope decoding, dispatch, and the handlers,
//! and the derived entities come out the other side.

use std::io::Write;

use bigdecimal::BigDecimal;
use tempfile::NamedTempFile;

use xpool_etl::{
    configuration::{AppState, Config, State},
    dao::{EntityStore, MemoryStore},
    error::Error,
    model::{RequestStatus, UserPosition, UserRequest},
    provider::{NullQuery, Replay},
};

const FACTORY: &str = "0xfac";
const ORACLE: &str = "0xoracle";
const POOL: &str = "0xpool";
const USER: &str = "0xuser";

fn line(source: &str, log_index: i64, kind: &str, params: &str) -> String {
    format!(
        r#"{{"source":"{}","block_number":{},"block_timestamp":1700000000,"tx_hash":"0xabc","log_index":{},"type":"{}","params":{}}}"#,
        source,
        100 + log_index,
        log_index,
        kind,
        params,
    )
}

fn replay_over(events: &[String]) -> (Replay, MemoryStore, NamedTempFile) {
    let mut file = NamedTempFile::new().unwrap();
    for event in events {
        writeln!(file, "{}", event).unwrap();
    }
    // replay skips blank lines
    writeln!(file).unwrap();
    file.flush().unwrap();

    let config = Config {
        host: String::from("http://localhost:8545"),
        timeout: 1,
        events_file: file.path().to_string_lossy().into_owned(),
        offline: true,
    };

    let store = MemoryStore::new();
    let state = State::new(
        config,
        Box::new(store.clone()),
        Box::new(NullQuery),
    );

    (Replay::new(AppState::new(state)), store, file)
}

#[tokio::test]
async fn ordered_feed_builds_the_derived_entities() {
    let events = [
        line(
            FACTORY,
            1,
            "OracleCreated",
            r#"{"oracle":"0xoracle","asset_symbol":"BTC"}"#,
        ),
        line(
            FACTORY,
            2,
            "PoolCreated",
            r#"{"pool":"0xpool","oracle":"0xoracle","reserve_token":"0xusdc","asset_symbol":"BTC"}"#,
        ),
        line(
            ORACLE,
            3,
            "PriceUpdated",
            r#"{"price":"65000","timestamp":"1700000000"}"#,
        ),
        line(
            POOL,
            4,
            "CollateralDeposited",
            r#"{"user":"0xuser","amount":"100"}"#,
        ),
        line(
            POOL,
            5,
            "DepositRequested",
            r#"{"user":"0xuser","amount":"40","cycle_index":"1"}"#,
        ),
        line(
            POOL,
            6,
            "AssetClaimed",
            r#"{"user":"0xuser","amount":"40","cycle_index":"1"}"#,
        ),
    ];

    let (replay, store, _file) = replay_over(&events);
    let applied = replay.run().await.unwrap();
    assert_eq!(applied, 6);

    let pool = store.load_pool(POOL).await.unwrap().unwrap();
    assert_eq!(pool.oracle, ORACLE);
    assert_eq!(pool.current_asset_price, BigDecimal::from(65_000));
    assert_eq!(pool.cycle_total_deposits, BigDecimal::from(40));

    let position = store
        .load_user_position(&UserPosition::id_for(USER, POOL))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(position.collateral_amount, BigDecimal::from(100));
    assert_eq!(position.deposit_amount, BigDecimal::from(40));
    assert_eq!(position.asset_amount, BigDecimal::from(40));

    let request = store
        .load_user_request(&UserRequest::id_for(USER, POOL, 1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(request.status, RequestStatus::Completed);
}

#[tokio::test]
async fn underflow_stops_the_replay_with_event_context() {
    let events = [
        line(
            FACTORY,
            1,
            "PoolCreated",
            r#"{"pool":"0xpool","oracle":"0xoracle","reserve_token":"0xusdc","asset_symbol":"BTC"}"#,
        ),
        line(
            POOL,
            2,
            "CollateralDeposited",
            r#"{"user":"0xuser","amount":"10"}"#,
        ),
        line(
            POOL,
            3,
            "CollateralWithdrawn",
            r#"{"user":"0xuser","amount":"50"}"#,
        ),
    ];

    let (replay, store, _file) = replay_over(&events);
    let err = replay.run().await.unwrap_err();

    match err {
        Error::EventApply {
            kind,
            source_address,
            cause,
            ..
        } => {
            assert_eq!(kind, "CollateralWithdrawn");
            assert_eq!(source_address, POOL);
            assert!(matches!(*cause, Error::Underflow { .. }));
        },
        other => panic!("unexpected error: {}", other),
    }

    // the failed event left the balance untouched
    let position = store
        .load_user_position(&UserPosition::id_for(USER, POOL))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(position.collateral_amount, BigDecimal::from(10));
}

#[tokio::test]
async fn events_from_untracked_contracts_are_skipped() {
    let events = [line(
        "0xghost",
        1,
        "CollateralDeposited",
        r#"{"user":"0xuser","amount":"100"}"#,
    )];

    let (replay, store, _file) = replay_over(&events);
    let applied = replay.run().await.unwrap();

    assert_eq!(applied, 1);
    assert_eq!(store.pool_count().await, 0);
}
