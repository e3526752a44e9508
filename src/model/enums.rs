use std::{fmt, io, str::FromStr};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Active,
    RebalancingOffchain,
    RebalancingOnchain,
    Halted,
}

impl CycleState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CycleState::Active => "ACTIVE",
            CycleState::RebalancingOffchain => "REBALANCING_OFFCHAIN",
            CycleState::RebalancingOnchain => "REBALANCING_ONCHAIN",
            CycleState::Halted => "HALTED",
        }
    }

    /// Maps the numeric state codes emitted by cycle manager contracts.
    pub fn from_code(code: i64) -> Result<CycleState, Error> {
        match code {
            0 => Ok(CycleState::Active),
            1 => Ok(CycleState::RebalancingOffchain),
            2 => Ok(CycleState::RebalancingOnchain),
            3 => Ok(CycleState::Halted),
            _ => Err(Error::UnknownCycleState(code)),
        }
    }
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<CycleState> for String {
    fn from(value: CycleState) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for CycleState {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<CycleState, Self::Err> {
        match value {
            "ACTIVE" => Ok(CycleState::Active),
            "REBALANCING_OFFCHAIN" => Ok(CycleState::RebalancingOffchain),
            "REBALANCING_ONCHAIN" => Ok(CycleState::RebalancingOnchain),
            "HALTED" => Ok(CycleState::Halted),
            _ => Err(io::Error::other("CycleState not supported")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Deposit,
    Redeem,
    Liquidate,
    AddLiquidity,
    ReduceLiquidity,
}

impl RequestKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Deposit => "DEPOSIT",
            RequestKind::Redeem => "REDEEM",
            RequestKind::Liquidate => "LIQUIDATE",
            RequestKind::AddLiquidity => "ADD_LIQUIDITY",
            RequestKind::ReduceLiquidity => "REDUCE_LIQUIDITY",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<RequestKind> for String {
    fn from(value: RequestKind) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for RequestKind {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<RequestKind, Self::Err> {
        match value {
            "DEPOSIT" => Ok(RequestKind::Deposit),
            "REDEEM" => Ok(RequestKind::Redeem),
            "LIQUIDATE" => Ok(RequestKind::Liquidate),
            "ADD_LIQUIDITY" => Ok(RequestKind::AddLiquidity),
            "REDUCE_LIQUIDITY" => Ok(RequestKind::ReduceLiquidity),
            _ => Err(io::Error::other("RequestKind not supported")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Completed => "COMPLETED",
            RequestStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<RequestStatus> for String {
    fn from(value: RequestStatus) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for RequestStatus {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<RequestStatus, Self::Err> {
        match value {
            "PENDING" => Ok(RequestStatus::Pending),
            "COMPLETED" => Ok(RequestStatus::Completed),
            "CANCELLED" => Ok(RequestStatus::Cancelled),
            _ => Err(io::Error::other("RequestStatus not supported")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionHealth {
    Healthy,
    Warning,
    Liquidatable,
}

impl PositionHealth {
    /// Numeric codes as reported by strategy contracts.
    pub const fn code(&self) -> i16 {
        match self {
            PositionHealth::Healthy => 3,
            PositionHealth::Warning => 2,
            PositionHealth::Liquidatable => 1,
        }
    }

    pub const fn from_code(code: i64) -> Option<PositionHealth> {
        match code {
            3 => Some(PositionHealth::Healthy),
            2 => Some(PositionHealth::Warning),
            1 => Some(PositionHealth::Liquidatable),
            _ => None,
        }
    }
}

impl fmt::Display for PositionHealth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PositionHealth::Healthy => write!(f, "HEALTHY"),
            PositionHealth::Warning => write!(f, "WARNING"),
            PositionHealth::Liquidatable => write!(f, "LIQUIDATABLE"),
        }
    }
}

impl From<PositionHealth> for String {
    fn from(value: PositionHealth) -> Self {
        value.to_string()
    }
}

impl FromStr for PositionHealth {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<PositionHealth, Self::Err> {
        match value {
            "HEALTHY" => Ok(PositionHealth::Healthy),
            "WARNING" => Ok(PositionHealth::Warning),
            "LIQUIDATABLE" => Ok(PositionHealth::Liquidatable),
            _ => Err(io::Error::other("PositionHealth not supported")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolEventKind {
    OracleCreated,
    PoolCreated,
    OracleVerification,
    PoolVerification,
    StrategyVerification,
    OwnershipTransferred,
    RegistryUpdated,
}

impl ProtocolEventKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProtocolEventKind::OracleCreated => "ORACLE_CREATED",
            ProtocolEventKind::PoolCreated => "POOL_CREATED",
            ProtocolEventKind::OracleVerification => "ORACLE_VERIFICATION",
            ProtocolEventKind::PoolVerification => "POOL_VERIFICATION",
            ProtocolEventKind::StrategyVerification => "STRATEGY_VERIFICATION",
            ProtocolEventKind::OwnershipTransferred => "OWNERSHIP_TRANSFERRED",
            ProtocolEventKind::RegistryUpdated => "REGISTRY_UPDATED",
        }
    }
}

impl fmt::Display for ProtocolEventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ProtocolEventKind> for String {
    fn from(value: ProtocolEventKind) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for ProtocolEventKind {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<ProtocolEventKind, Self::Err> {
        match value {
            "ORACLE_CREATED" => Ok(ProtocolEventKind::OracleCreated),
            "POOL_CREATED" => Ok(ProtocolEventKind::PoolCreated),
            "ORACLE_VERIFICATION" => Ok(ProtocolEventKind::OracleVerification),
            "POOL_VERIFICATION" => Ok(ProtocolEventKind::PoolVerification),
            "STRATEGY_VERIFICATION" => {
                Ok(ProtocolEventKind::StrategyVerification)
            },
            "OWNERSHIP_TRANSFERRED" => {
                Ok(ProtocolEventKind::OwnershipTransferred)
            },
            "REGISTRY_UPDATED" => Ok(ProtocolEventKind::RegistryUpdated),
            _ => Err(io::Error::other("ProtocolEventKind not supported")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{CycleState, PositionHealth, RequestStatus};

    #[test]
    fn cycle_state_codes_map_to_contract_values() {
        assert_eq!(CycleState::from_code(0).unwrap(), CycleState::Active);
        assert_eq!(
            CycleState::from_code(1).unwrap(),
            CycleState::RebalancingOffchain
        );
        assert_eq!(
            CycleState::from_code(2).unwrap(),
            CycleState::RebalancingOnchain
        );
        assert_eq!(CycleState::from_code(3).unwrap(), CycleState::Halted);
        assert!(CycleState::from_code(4).is_err());
    }

    #[test]
    fn cycle_state_round_trips_through_strings() {
        for state in [
            CycleState::Active,
            CycleState::RebalancingOffchain,
            CycleState::RebalancingOnchain,
            CycleState::Halted,
        ] {
            assert_eq!(CycleState::from_str(state.as_str()).unwrap(), state);
        }
    }

    #[test]
    fn health_codes_match_strategy_contract() {
        assert_eq!(PositionHealth::Healthy.code(), 3);
        assert_eq!(PositionHealth::Warning.code(), 2);
        assert_eq!(PositionHealth::Liquidatable.code(), 1);
        assert_eq!(
            PositionHealth::from_code(2),
            Some(PositionHealth::Warning)
        );
        assert_eq!(PositionHealth::from_code(0), None);
    }

    #[test]
    fn request_status_rejects_unknown_values() {
        assert!(RequestStatus::from_str("PENDING").is_ok());
        assert!(RequestStatus::from_str("DONE").is_err());
    }
}
