use std::{
    env::VarError, io::Error as IO_ERROR, num::ParseIntError,
    str::ParseBoolError as PARSE_BOOL_ERROR,
};

use anyhow::Error as ANYHOW_ERROR;
use bigdecimal::ParseBigDecimalError as BIG_DECIMAL_ERROR;
use reqwest::Error as REQWEST_ERROR;
use serde_json::Error as JSON_ERROR;
use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError as TRACING_GLOBAL_DEFAULT_ERROR;
use url::ParseError as URL_ERROR;

#[cfg(feature = "postgres")]
use sqlx::error::Error as SQL_ERROR;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] IO_ERROR),

    #[error("{0}")]
    URL(#[from] URL_ERROR),

    #[error("{0}")]
    INT(#[from] ParseIntError),

    #[cfg(feature = "postgres")]
    #[error("{0}")]
    SQL(#[from] SQL_ERROR),

    #[error("{0}")]
    VAR(#[from] VarError),

    #[error("{0}")]
    BigDecimalError(#[from] BIG_DECIMAL_ERROR),

    #[error("{0}")]
    JsonError(#[from] JSON_ERROR),

    #[error("{0}")]
    ReqwestError(#[from] REQWEST_ERROR),

    #[error("{0}")]
    ParseBoolError(#[from] PARSE_BOOL_ERROR),

    #[error("Tracing error: {0}")]
    SetGlobalDefaultError(#[from] TRACING_GLOBAL_DEFAULT_ERROR),

    #[error("{0}")]
    AnyHowError(#[from] ANYHOW_ERROR),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Decode datetime: {0}")]
    DecodeDateTimeError(String),

    #[error("Balance underflow on {entity} {field}: have {balance}, subtract {amount}")]
    Underflow {
        entity: String,
        field: &'static str,
        balance: String,
        amount: String,
    },

    #[error(
        "Cycle index must advance on pool {pool}: current {current}, incoming {incoming}"
    )]
    CycleOrder {
        pool: String,
        current: i64,
        incoming: i64,
    },

    #[error("Unknown cycle state code: {0}")]
    UnknownCycleState(i64),

    #[error(
        "Apply {kind} from {source_address} at block {block_number} (tx {tx_hash}): {cause}"
    )]
    EventApply {
        kind: String,
        source_address: String,
        block_number: i64,
        tx_hash: String,
        #[source]
        cause: Box<Error>,
    },
}
