use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PriceUpdated {
    pub price: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct OhlcUpdated {
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct PriceSplitDetected {
    pub previous_price: String,
    pub new_price: String,
    pub timestamp: String,
}
