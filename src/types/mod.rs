mod cycle_manager;
mod event;
mod factory;
mod liquidity_manager;
mod oracle;
mod pool;
mod query;
mod registry;
mod strategy;

pub use self::{
    cycle_manager::{
        CycleStarted, InterestAccrued, RebalanceInitiated, Rebalanced,
    },
    event::{ChainEvent, EventKind},
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
    query::{
        CycleParams, FeeParams, HaltParams, InterestRateParams,
        LpCollateralParams, UserCollateralParams, UserPositionState,
        UserRequestState,
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
