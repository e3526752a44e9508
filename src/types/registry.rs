use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct OracleVerificationUpdated {
    pub oracle: String,
    pub is_verified: bool,
}

#[derive(Debug, Deserialize)]
pub struct PoolVerificationUpdated {
    pub pool: String,
    pub is_verified: bool,
}

#[derive(Debug, Deserialize)]
pub struct StrategyVerificationUpdated {
    pub strategy: String,
    pub is_verified: bool,
}

#[derive(Debug, Deserialize)]
pub struct OwnershipTransferred {
    pub previous_owner: String,
    pub new_owner: String,
}

#[derive(Debug, Deserialize)]
pub struct RegistryUpdated {
    pub old_registry: String,
    pub new_registry: String,
}
