use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};

use crate::{
    error::Error,
    model::{PositionHealth, Strategy},
};

/// Ratio scale shared with the strategy contracts.
pub const BASIS_POINTS: i64 = 10_000;

/// Fallback thresholds used until a pool's strategy params are known.
pub const USER_HEALTHY_RATIO_BP: i64 = 2_000;
pub const USER_LIQUIDATION_THRESHOLD_BP: i64 = 1_250;
pub const LP_HEALTHY_RATIO_BP: i64 = 3_000;
pub const LP_LIQUIDATION_THRESHOLD_BP: i64 = 2_000;

pub fn to_date_time(sec: i64) -> Result<DateTime<Utc>, Error> {
    DateTime::from_timestamp(sec, 0).ok_or_else(|| {
        Error::DecodeDateTimeError(format!("timestamp out of range: {}", sec))
    })
}

/// Subtraction that refuses to drive a balance negative. An underflow here
/// means the upstream feed delivered events out of order.
pub fn checked_sub(
    balance: &BigDecimal,
    amount: &BigDecimal,
    entity: &str,
    field: &'static str,
) -> Result<BigDecimal, Error> {
    if amount > balance {
        return Err(Error::Underflow {
            entity: entity.to_owned(),
            field,
            balance: balance.to_string(),
            amount: amount.to_string(),
        });
    }

    Ok(balance - amount)
}

/// Classifies a position from its collateral-to-holding ratio in basis
/// points. A zero holding has nothing at risk and is always healthy. The
/// compare is cross-multiplied, which matches the contracts' truncating
/// integer division against whole-bp thresholds without dividing.
pub fn classify_health(
    collateral: &BigDecimal,
    holding: &BigDecimal,
    healthy_bp: &BigDecimal,
    liquidation_bp: &BigDecimal,
) -> PositionHealth {
    if holding.is_zero() {
        return PositionHealth::Healthy;
    }

    let scaled = collateral * BigDecimal::from(BASIS_POINTS);

    if scaled >= healthy_bp * holding {
        PositionHealth::Healthy
    } else if scaled >= liquidation_bp * holding {
        PositionHealth::Warning
    } else {
        PositionHealth::Liquidatable
    }
}

/// User-side thresholds, preferring the pool's strategy record.
pub fn user_thresholds(strategy: Option<&Strategy>) -> (BigDecimal, BigDecimal) {
    match strategy {
        Some(s) if !s.user_healthy_collateral_ratio.is_zero() => (
            s.user_healthy_collateral_ratio.clone(),
            s.user_liquidation_threshold.clone(),
        ),
        _ => (
            BigDecimal::from(USER_HEALTHY_RATIO_BP),
            BigDecimal::from(USER_LIQUIDATION_THRESHOLD_BP),
        ),
    }
}

/// LP-side thresholds, preferring the pool's strategy record.
pub fn lp_thresholds(strategy: Option<&Strategy>) -> (BigDecimal, BigDecimal) {
    match strategy {
        Some(s) if !s.lp_healthy_collateral_ratio.is_zero() => (
            s.lp_healthy_collateral_ratio.clone(),
            s.lp_liquidation_threshold.clone(),
        ),
        _ => (
            BigDecimal::from(LP_HEALTHY_RATIO_BP),
            BigDecimal::from(LP_LIQUIDATION_THRESHOLD_BP),
        ),
    }
}
