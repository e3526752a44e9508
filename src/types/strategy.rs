use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct InterestRateParamsUpdated {
    pub base_interest_rate: String,
    pub interest_rate_1: String,
    pub max_interest_rate: String,
    pub utilization_tier_1: String,
    pub utilization_tier_2: String,
}

#[derive(Debug, Deserialize)]
pub struct UserCollateralParamsUpdated {
    pub healthy_ratio: String,
    pub liquidation_threshold: String,
}

#[derive(Debug, Deserialize)]
pub struct LpCollateralParamsUpdated {
    pub healthy_ratio: String,
    pub liquidation_threshold: String,
    pub liquidation_reward: String,
}

#[derive(Debug, Deserialize)]
pub struct CycleParamsUpdated {
    pub rebalance_length: String,
    pub oracle_update_threshold: String,
}

#[derive(Debug, Deserialize)]
pub struct HaltParamsUpdated {
    pub halt_threshold: String,
    pub liquidity_percent: String,
    pub fee_percent: String,
    pub request_threshold: String,
}

#[derive(Debug, Deserialize)]
pub struct FeeParamsUpdated {
    pub protocol_fee: String,
    pub fee_recipient: String,
}

#[derive(Debug, Deserialize)]
pub struct YieldBearingUpdated {
    pub is_yield_bearing: bool,
}
