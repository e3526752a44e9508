use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LpAdded {
    pub lp: String,
    pub liquidity_amount: String,
    pub collateral_amount: String,
}

#[derive(Debug, Deserialize)]
pub struct LpRemoved {
    pub lp: String,
}

#[derive(Debug, Deserialize)]
pub struct LiquidityAdditionRequested {
    pub lp: String,
    pub amount: String,
    pub cycle_index: String,
}

#[derive(Debug, Deserialize)]
pub struct LiquidityReductionRequested {
    pub lp: String,
    pub amount: String,
    pub cycle_index: String,
}

#[derive(Debug, Deserialize)]
pub struct LiquidityAdded {
    pub lp: String,
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct LiquidityReduced {
    pub lp: String,
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct CollateralAdded {
    pub lp: String,
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct CollateralReduced {
    pub lp: String,
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct InterestClaimed {
    pub lp: String,
}

#[derive(Debug, Deserialize)]
pub struct InterestDistributed {
    pub lp: String,
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct FeeDeducted {
    pub lp: String,
    pub amount: String,
    pub fee_type: String,
}

#[derive(Debug, Deserialize)]
pub struct LpLiquidationRequested {
    pub lp: String,
    pub liquidator: String,
    pub cycle_index: String,
}

#[derive(Debug, Deserialize)]
pub struct LpLiquidationExecuted {
    pub lp: String,
    pub amount: String,
    pub cycle_index: String,
}

#[derive(Debug, Deserialize)]
pub struct LpLiquidationCancelled {
    pub lp: String,
    pub cycle_index: String,
}

#[derive(Debug, Deserialize)]
pub struct DelegateSet {
    pub lp: String,
    pub delegate: String,
}
