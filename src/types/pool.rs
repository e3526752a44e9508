use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CollateralDeposited {
    pub user: String,
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct CollateralWithdrawn {
    pub user: String,
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct DepositRequested {
    pub user: String,
    pub amount: String,
    pub cycle_index: String,
}

#[derive(Debug, Deserialize)]
pub struct AssetClaimed {
    pub user: String,
    pub amount: String,
    pub cycle_index: String,
}

#[derive(Debug, Deserialize)]
pub struct RedeemRequested {
    pub user: String,
    pub amount: String,
    pub cycle_index: String,
}

#[derive(Debug, Deserialize)]
pub struct ReserveWithdrawn {
    pub user: String,
    pub amount: String,
    pub cycle_index: String,
}

#[derive(Debug, Deserialize)]
pub struct LiquidationRequested {
    pub user: String,
    pub liquidator: String,
    pub cycle_index: String,
}

#[derive(Debug, Deserialize)]
pub struct LiquidationClaimed {
    pub user: String,
    pub liquidator: String,
    pub amount: String,
    pub cycle_index: String,
}

#[derive(Debug, Deserialize)]
pub struct LiquidationCancelled {
    pub user: String,
    pub cycle_index: String,
}
