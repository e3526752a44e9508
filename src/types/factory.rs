use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct OracleCreated {
    pub oracle: String,
    pub asset_symbol: String,
}

#[derive(Debug, Deserialize)]
pub struct PoolCreated {
    pub pool: String,
    pub oracle: String,
    pub reserve_token: String,
    pub asset_symbol: String,
}
