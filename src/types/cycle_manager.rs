use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CycleStarted {
    pub cycle_index: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct RebalanceInitiated {
    pub cycle_index: String,
    pub cycle_state: String,
}

#[derive(Debug, Deserialize)]
pub struct Rebalanced {
    pub lp: String,
    pub cycle_index: String,
    pub rebalance_price: String,
    pub amount: String,
    pub is_deposit: bool,
}

#[derive(Debug, Deserialize)]
pub struct InterestAccrued {
    pub amount: String,
}
