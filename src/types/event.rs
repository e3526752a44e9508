use std::fmt;

use serde::Deserialize;

use super::{
    cycle_manager::{
        CycleStarted, InterestAccrued, RebalanceInitiated, Rebalanced,
    },
    factory::{OracleCreated, PoolCreated},
    liquidity_manager::{
        CollateralAdded, CollateralReduced, DelegateSet, FeeDeducted,
        InterestClaimed, InterestDistributed, LiquidityAdded,
        LiquidityAdditionRequested, LiquidityReduced,
        LiquidityReductionRequested, LpAdded, LpLiquidationCancelled,
        LpLiquidationExecuted, LpLiquidationRequested, LpRemoved,
    },
    oracle::{OhlcUpdated, PriceSplitDetected, PriceUpdated},
    pool::{
        AssetClaimed, CollateralDeposited, CollateralWithdrawn,
        DepositRequested, LiquidationCancelled, LiquidationClaimed,
        LiquidationRequested, RedeemRequested, ReserveWithdrawn,
    },
    registry::{
        OracleVerificationUpdated, OwnershipTransferred,
        PoolVerificationUpdated, RegistryUpdated,
        StrategyVerificationUpdated,
    },
    strategy::{
        CycleParamsUpdated, FeeParamsUpdated, HaltParamsUpdated,
        InterestRateParamsUpdated, LpCollateralParamsUpdated,
        UserCollateralParamsUpdated, YieldBearingUpdated,
    },
};

/// One decoded log, already totally ordered by the upstream feed.
#[derive(Debug, Deserialize)]
pub struct ChainEvent {
    /// Emitting contract address.
    pub source: String,
    pub block_number: i64,
    /// Epoch seconds.
    pub block_timestamp: i64,
    pub tx_hash: String,
    pub log_index: i64,
    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum EventKind {
    // factory
    OracleCreated(OracleCreated),
    PoolCreated(PoolCreated),

    // registry
    OracleVerificationUpdated(OracleVerificationUpdated),
    PoolVerificationUpdated(PoolVerificationUpdated),
    StrategyVerificationUpdated(StrategyVerificationUpdated),
    OwnershipTransferred(OwnershipTransferred),
    RegistryUpdated(RegistryUpdated),

    // oracle
    PriceUpdated(PriceUpdated),
    OhlcUpdated(OhlcUpdated),
    PriceSplitDetected(PriceSplitDetected),

    // pool, user side
    CollateralDeposited(CollateralDeposited),
    CollateralWithdrawn(CollateralWithdrawn),
    DepositRequested(DepositRequested),
    AssetClaimed(AssetClaimed),
    RedeemRequested(RedeemRequested),
    ReserveWithdrawn(ReserveWithdrawn),
    LiquidationRequested(LiquidationRequested),
    LiquidationClaimed(LiquidationClaimed),
    LiquidationCancelled(LiquidationCancelled),

    // cycle manager
    CycleStarted(CycleStarted),
    RebalanceInitiated(RebalanceInitiated),
    Rebalanced(Rebalanced),
    InterestAccrued(InterestAccrued),

    // liquidity manager, LP side
    LpAdded(LpAdded),
    LpRemoved(LpRemoved),
    LiquidityAdditionRequested(LiquidityAdditionRequested),
    LiquidityReductionRequested(LiquidityReductionRequested),
    LiquidityAdded(LiquidityAdded),
    LiquidityReduced(LiquidityReduced),
    CollateralAdded(CollateralAdded),
    CollateralReduced(CollateralReduced),
    InterestClaimed(InterestClaimed),
    InterestDistributed(InterestDistributed),
    FeeDeducted(FeeDeducted),
    LpLiquidationRequested(LpLiquidationRequested),
    LpLiquidationExecuted(LpLiquidationExecuted),
    LpLiquidationCancelled(LpLiquidationCancelled),
    DelegateSet(DelegateSet),

    // strategy
    InterestRateParamsUpdated(InterestRateParamsUpdated),
    UserCollateralParamsUpdated(UserCollateralParamsUpdated),
    LpCollateralParamsUpdated(LpCollateralParamsUpdated),
    CycleParamsUpdated(CycleParamsUpdated),
    HaltParamsUpdated(HaltParamsUpdated),
    FeeParamsUpdated(FeeParamsUpdated),
    YieldBearingUpdated(YieldBearingUpdated),
}

impl EventKind {
    /// Canonical name, matching the wire `type` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::OracleCreated(_) => "OracleCreated",
            EventKind::PoolCreated(_) => "PoolCreated",
            EventKind::OracleVerificationUpdated(_) => {
                "OracleVerificationUpdated"
            },
            EventKind::PoolVerificationUpdated(_) => "PoolVerificationUpdated",
            EventKind::StrategyVerificationUpdated(_) => {
                "StrategyVerificationUpdated"
            },
            EventKind::OwnershipTransferred(_) => "OwnershipTransferred",
            EventKind::RegistryUpdated(_) => "RegistryUpdated",
            EventKind::PriceUpdated(_) => "PriceUpdated",
            EventKind::OhlcUpdated(_) => "OhlcUpdated",
            EventKind::PriceSplitDetected(_) => "PriceSplitDetected",
            EventKind::CollateralDeposited(_) => "CollateralDeposited",
            EventKind::CollateralWithdrawn(_) => "CollateralWithdrawn",
            EventKind::DepositRequested(_) => "DepositRequested",
            EventKind::AssetClaimed(_) => "AssetClaimed",
            EventKind::RedeemRequested(_) => "RedeemRequested",
            EventKind::ReserveWithdrawn(_) => "ReserveWithdrawn",
            EventKind::LiquidationRequested(_) => "LiquidationRequested",
            EventKind::LiquidationClaimed(_) => "LiquidationClaimed",
            EventKind::LiquidationCancelled(_) => "LiquidationCancelled",
            EventKind::CycleStarted(_) => "CycleStarted",
            EventKind::RebalanceInitiated(_) => "RebalanceInitiated",
            EventKind::Rebalanced(_) => "Rebalanced",
            EventKind::InterestAccrued(_) => "InterestAccrued",
            EventKind::LpAdded(_) => "LpAdded",
            EventKind::LpRemoved(_) => "LpRemoved",
            EventKind::LiquidityAdditionRequested(_) => {
                "LiquidityAdditionRequested"
            },
            EventKind::LiquidityReductionRequested(_) => {
                "LiquidityReductionRequested"
            },
            EventKind::LiquidityAdded(_) => "LiquidityAdded",
            EventKind::LiquidityReduced(_) => "LiquidityReduced",
            EventKind::CollateralAdded(_) => "CollateralAdded",
            EventKind::CollateralReduced(_) => "CollateralReduced",
            EventKind::InterestClaimed(_) => "InterestClaimed",
            EventKind::InterestDistributed(_) => "InterestDistributed",
            EventKind::FeeDeducted(_) => "FeeDeducted",
            EventKind::LpLiquidationRequested(_) => "LpLiquidationRequested",
            EventKind::LpLiquidationExecuted(_) => "LpLiquidationExecuted",
            EventKind::LpLiquidationCancelled(_) => "LpLiquidationCancelled",
            EventKind::DelegateSet(_) => "DelegateSet",
            EventKind::InterestRateParamsUpdated(_) => {
                "InterestRateParamsUpdated"
            },
            EventKind::UserCollateralParamsUpdated(_) => {
                "UserCollateralParamsUpdated"
            },
            EventKind::LpCollateralParamsUpdated(_) => {
                "LpCollateralParamsUpdated"
            },
            EventKind::CycleParamsUpdated(_) => "CycleParamsUpdated",
            EventKind::HaltParamsUpdated(_) => "HaltParamsUpdated",
            EventKind::FeeParamsUpdated(_) => "FeeParamsUpdated",
            EventKind::YieldBearingUpdated(_) => "YieldBearingUpdated",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{ChainEvent, EventKind};

    #[test]
    fn envelope_deserializes_tagged_params() {
        let line = r#"{
            "source": "0xfac",
            "block_number": 12,
            "block_timestamp": 1700000000,
            "tx_hash": "0xabc",
            "log_index": 3,
            "type": "PoolCreated",
            "params": {
                "pool": "0xp",
                "oracle": "0xo",
                "reserve_token": "0xd",
                "asset_symbol": "BTC"
            }
        }"#;

        let event: ChainEvent = serde_json::from_str(line).unwrap();
        assert_eq!(event.source, "0xfac");
        assert_eq!(event.log_index, 3);
        match event.kind {
            EventKind::PoolCreated(p) => {
                assert_eq!(p.pool, "0xp");
                assert_eq!(p.asset_symbol, "BTC");
            },
            other => panic!("wrong kind: {}", other),
        }
    }

    #[test]
    fn unknown_tag_is_rejected_upstream() {
        let line = r#"{
            "source": "0xfac",
            "block_number": 12,
            "block_timestamp": 1700000000,
            "tx_hash": "0xabc",
            "log_index": 3,
            "type": "SomethingElse",
            "params": {}
        }"#;

        assert!(serde_json::from_str::<ChainEvent>(line).is_err());
    }
}
