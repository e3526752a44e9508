//! Multi-word return bundles decoded from authoritative contract reads.

use bigdecimal::BigDecimal;

#[derive(Debug, Clone, PartialEq)]
pub struct UserRequestState {
    pub amount: BigDecimal,
    pub collateral_amount: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserPositionState {
    pub deposit_amount: BigDecimal,
    pub asset_amount: BigDecimal,
    pub collateral_amount: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterestRateParams {
    pub base_interest_rate: BigDecimal,
    pub interest_rate_1: BigDecimal,
    pub max_interest_rate: BigDecimal,
    pub utilization_tier_1: BigDecimal,
    pub utilization_tier_2: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserCollateralParams {
    pub healthy_ratio: BigDecimal,
    pub liquidation_threshold: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LpCollateralParams {
    pub healthy_ratio: BigDecimal,
    pub liquidation_threshold: BigDecimal,
    pub liquidation_reward: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleParams {
    pub rebalance_length: BigDecimal,
    pub oracle_update_threshold: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HaltParams {
    pub halt_threshold: BigDecimal,
    pub liquidity_percent: BigDecimal,
    pub fee_percent: BigDecimal,
    pub request_threshold: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeeParams {
    pub protocol_fee: BigDecimal,
    pub fee_recipient: String,
}
