//! Consolidated entity models
//!
//! Every derived record the reducers maintain, organized by domain sections.
//! Keys are lowercase hex addresses or composite `a-b` strings; amounts are
//! arbitrary-precision decimals that never go negative.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use super::enums::{
    CycleState, PositionHealth, ProtocolEventKind, RequestKind, RequestStatus,
};

// =============================================================================
// POOL DOMAIN
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Pool {
    pub address: String,
    pub asset_symbol: String,
    pub reserve_token: String,
    pub oracle: String,
    /// Discovered at creation time; `None` when the lookup reverted.
    pub asset_token: Option<String>,
    pub cycle_manager: Option<String>,
    pub liquidity_manager: Option<String>,
    pub strategy: Option<String>,
    pub is_verified: bool,

    pub total_user_deposits: BigDecimal,
    pub total_user_collateral: BigDecimal,
    pub reserve_backing_asset: BigDecimal,
    pub aggregate_pool_reserves: BigDecimal,
    pub asset_supply: BigDecimal,
    pub reserve_yield_accrued: BigDecimal,
    pub total_lp_liquidity_commited: BigDecimal,
    pub total_lp_collateral: BigDecimal,
    pub lp_count: i64,

    pub cycle_total_deposits: BigDecimal,
    pub cycle_total_redemptions: BigDecimal,
    pub cycle_total_add_liquidity_amount: BigDecimal,
    pub cycle_total_reduce_liquidity_amount: BigDecimal,
    pub cycle_interest_amount: BigDecimal,
    pub rebalanced_lps: i64,

    pub cycle_index: i64,
    pub cycle_state: CycleState,
    pub cycle_price_high: BigDecimal,
    pub cycle_price_low: BigDecimal,
    pub prev_rebalance_price: BigDecimal,
    pub current_asset_price: BigDecimal,
    pub interest_rate: BigDecimal,
    pub utilization_ratio: BigDecimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_cycle_action_at: DateTime<Utc>,
}

impl Pool {
    pub fn new(
        address: String,
        oracle: String,
        reserve_token: String,
        asset_symbol: String,
        at: DateTime<Utc>,
    ) -> Pool {
        Pool {
            address,
            asset_symbol,
            reserve_token,
            oracle,
            asset_token: None,
            cycle_manager: None,
            liquidity_manager: None,
            strategy: None,
            is_verified: false,
            total_user_deposits: BigDecimal::from(0),
            total_user_collateral: BigDecimal::from(0),
            reserve_backing_asset: BigDecimal::from(0),
            aggregate_pool_reserves: BigDecimal::from(0),
            asset_supply: BigDecimal::from(0),
            reserve_yield_accrued: BigDecimal::from(0),
            total_lp_liquidity_commited: BigDecimal::from(0),
            total_lp_collateral: BigDecimal::from(0),
            lp_count: 0,
            cycle_total_deposits: BigDecimal::from(0),
            cycle_total_redemptions: BigDecimal::from(0),
            cycle_total_add_liquidity_amount: BigDecimal::from(0),
            cycle_total_reduce_liquidity_amount: BigDecimal::from(0),
            cycle_interest_amount: BigDecimal::from(0),
            rebalanced_lps: 0,
            cycle_index: 1,
            cycle_state: CycleState::Active,
            cycle_price_high: BigDecimal::from(0),
            cycle_price_low: BigDecimal::from(0),
            prev_rebalance_price: BigDecimal::from(0),
            current_asset_price: BigDecimal::from(0),
            interest_rate: BigDecimal::from(0),
            utilization_ratio: BigDecimal::from(0),
            created_at: at,
            updated_at: at,
            last_cycle_action_at: at,
        }
    }

    /// Zeroes the counters that restart with every cycle.
    pub fn reset_cycle_counters(&mut self) {
        self.cycle_total_deposits = BigDecimal::from(0);
        self.cycle_total_redemptions = BigDecimal::from(0);
        self.cycle_total_add_liquidity_amount = BigDecimal::from(0);
        self.cycle_total_reduce_liquidity_amount = BigDecimal::from(0);
        self.cycle_interest_amount = BigDecimal::from(0);
        self.rebalanced_lps = 0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    pub id: String,
    pub pool: String,
    pub cycle_index: i64,
    pub state: CycleState,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub price_high: BigDecimal,
    pub price_low: BigDecimal,
    pub rebalance_price: BigDecimal,
    pub total_deposits: BigDecimal,
    pub total_redemptions: BigDecimal,
    pub total_add_liquidity_amount: BigDecimal,
    pub total_reduce_liquidity_amount: BigDecimal,
    pub interest_amount: BigDecimal,
    pub lp_count: i64,
    pub rebalanced_lps: i64,
}

impl Cycle {
    pub fn id_for(pool: &str, cycle_index: i64) -> String {
        format!("{}-{}", pool, cycle_index)
    }

    pub fn new(
        pool: String,
        cycle_index: i64,
        lp_count: i64,
        at: DateTime<Utc>,
    ) -> Cycle {
        Cycle {
            id: Cycle::id_for(&pool, cycle_index),
            pool,
            cycle_index,
            state: CycleState::Active,
            started_at: at,
            ended_at: None,
            price_high: BigDecimal::from(0),
            price_low: BigDecimal::from(0),
            rebalance_price: BigDecimal::from(0),
            total_deposits: BigDecimal::from(0),
            total_redemptions: BigDecimal::from(0),
            total_add_liquidity_amount: BigDecimal::from(0),
            total_reduce_liquidity_amount: BigDecimal::from(0),
            interest_amount: BigDecimal::from(0),
            lp_count,
            rebalanced_lps: 0,
        }
    }
}

/// Back-reference from a per-pool cycle manager contract to its pool.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleManagerPool {
    pub address: String,
    pub pool: String,
}

/// Back-reference from a per-pool liquidity manager contract to its pool.
#[derive(Debug, Clone, PartialEq)]
pub struct LiquidityManagerPool {
    pub address: String,
    pub pool: String,
}

// =============================================================================
// REGISTRY DOMAIN
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Oracle {
    pub address: String,
    pub asset_symbol: String,
    pub asset_price: BigDecimal,
    pub ohlc_open: BigDecimal,
    pub ohlc_high: BigDecimal,
    pub ohlc_low: BigDecimal,
    pub ohlc_close: BigDecimal,
    pub ohlc_updated_at: Option<DateTime<Utc>>,
    pub split_detected: bool,
    pub pre_split_price: BigDecimal,
    pub is_verified: bool,
    /// Set once the owning pool's creation event arrives.
    pub pool: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_price_update_at: Option<DateTime<Utc>>,
}

impl Oracle {
    pub fn new(
        address: String,
        asset_symbol: String,
        at: DateTime<Utc>,
    ) -> Oracle {
        Oracle {
            address,
            asset_symbol,
            asset_price: BigDecimal::from(0),
            ohlc_open: BigDecimal::from(0),
            ohlc_high: BigDecimal::from(0),
            ohlc_low: BigDecimal::from(0),
            ohlc_close: BigDecimal::from(0),
            ohlc_updated_at: None,
            split_detected: false,
            pre_split_price: BigDecimal::from(0),
            is_verified: false,
            pool: None,
            created_at: at,
            updated_at: at,
            last_price_update_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub address: String,
    pub base_interest_rate: BigDecimal,
    pub interest_rate_1: BigDecimal,
    pub max_interest_rate: BigDecimal,
    pub utilization_tier_1: BigDecimal,
    pub utilization_tier_2: BigDecimal,
    pub user_healthy_collateral_ratio: BigDecimal,
    pub user_liquidation_threshold: BigDecimal,
    pub lp_healthy_collateral_ratio: BigDecimal,
    pub lp_liquidation_threshold: BigDecimal,
    pub lp_liquidation_reward: BigDecimal,
    pub rebalance_length: BigDecimal,
    pub oracle_update_threshold: BigDecimal,
    pub halt_threshold: BigDecimal,
    pub halt_liquidity_percent: BigDecimal,
    pub halt_fee_percent: BigDecimal,
    pub halt_request_threshold: BigDecimal,
    pub protocol_fee: BigDecimal,
    pub fee_recipient: Option<String>,
    pub is_yield_bearing: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Strategy {
    pub fn new(address: String, at: DateTime<Utc>) -> Strategy {
        Strategy {
            address,
            base_interest_rate: BigDecimal::from(0),
            interest_rate_1: BigDecimal::from(0),
            max_interest_rate: BigDecimal::from(0),
            utilization_tier_1: BigDecimal::from(0),
            utilization_tier_2: BigDecimal::from(0),
            user_healthy_collateral_ratio: BigDecimal::from(0),
            user_liquidation_threshold: BigDecimal::from(0),
            lp_healthy_collateral_ratio: BigDecimal::from(0),
            lp_liquidation_threshold: BigDecimal::from(0),
            lp_liquidation_reward: BigDecimal::from(0),
            rebalance_length: BigDecimal::from(0),
            oracle_update_threshold: BigDecimal::from(0),
            halt_threshold: BigDecimal::from(0),
            halt_liquidity_percent: BigDecimal::from(0),
            halt_fee_percent: BigDecimal::from(0),
            halt_request_threshold: BigDecimal::from(0),
            protocol_fee: BigDecimal::from(0),
            fee_recipient: None,
            is_yield_bearing: false,
            is_verified: false,
            created_at: at,
            updated_at: at,
        }
    }
}

// =============================================================================
// POSITION DOMAIN
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct UserPosition {
    pub id: String,
    pub user: String,
    pub pool: String,
    pub deposit_amount: BigDecimal,
    pub asset_amount: BigDecimal,
    pub collateral_amount: BigDecimal,
    pub health: PositionHealth,
    pub liquidator: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserPosition {
    pub fn id_for(user: &str, pool: &str) -> String {
        format!("{}-{}", user, pool)
    }

    pub fn new(user: String, pool: String, at: DateTime<Utc>) -> UserPosition {
        UserPosition {
            id: UserPosition::id_for(&user, &pool),
            user,
            pool,
            deposit_amount: BigDecimal::from(0),
            asset_amount: BigDecimal::from(0),
            collateral_amount: BigDecimal::from(0),
            health: PositionHealth::Healthy,
            liquidator: None,
            created_at: at,
            updated_at: at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LPPosition {
    pub id: String,
    pub lp: String,
    pub pool: String,
    pub liquidity_commitment: BigDecimal,
    pub collateral_amount: BigDecimal,
    pub interest_accrued: BigDecimal,
    pub asset_share: BigDecimal,
    pub health: PositionHealth,
    pub is_active: bool,
    pub delegate: Option<String>,
    pub liquidator: Option<String>,
    pub last_rebalance_cycle: i64,
    pub last_rebalance_price: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LPPosition {
    pub fn id_for(lp: &str, pool: &str) -> String {
        format!("{}-{}", lp, pool)
    }

    pub fn new(lp: String, pool: String, at: DateTime<Utc>) -> LPPosition {
        LPPosition {
            id: LPPosition::id_for(&lp, &pool),
            lp,
            pool,
            liquidity_commitment: BigDecimal::from(0),
            collateral_amount: BigDecimal::from(0),
            interest_accrued: BigDecimal::from(0),
            asset_share: BigDecimal::from(0),
            health: PositionHealth::Healthy,
            is_active: false,
            delegate: None,
            liquidator: None,
            last_rebalance_cycle: 0,
            last_rebalance_price: BigDecimal::from(0),
            created_at: at,
            updated_at: at,
        }
    }

    /// Full exit: balances go to zero but the record stays for history.
    pub fn clear_balances(&mut self) {
        self.liquidity_commitment = BigDecimal::from(0);
        self.collateral_amount = BigDecimal::from(0);
        self.interest_accrued = BigDecimal::from(0);
        self.asset_share = BigDecimal::from(0);
        self.is_active = false;
    }
}

/// One per-LP settlement row appended at every rebalance.
#[derive(Debug, Clone, PartialEq)]
pub struct LPRebalance {
    pub id: String,
    pub position: String,
    pub cycle: String,
    pub lp: String,
    pub pool: String,
    pub cycle_index: i64,
    pub rebalance_price: BigDecimal,
    pub amount: BigDecimal,
    pub is_deposit: bool,
    pub was_settled: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// REQUEST DOMAIN
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct UserRequest {
    pub id: String,
    pub user: String,
    pub pool: String,
    pub cycle_index: i64,
    pub kind: RequestKind,
    pub amount: BigDecimal,
    pub collateral_amount: BigDecimal,
    pub liquidator: Option<String>,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl UserRequest {
    pub fn id_for(user: &str, pool: &str, cycle_index: i64) -> String {
        format!("{}-{}-{}", user, pool, cycle_index)
    }

    pub fn new(
        user: String,
        pool: String,
        cycle_index: i64,
        kind: RequestKind,
        amount: BigDecimal,
        at: DateTime<Utc>,
    ) -> UserRequest {
        UserRequest {
            id: UserRequest::id_for(&user, &pool, cycle_index),
            user,
            pool,
            cycle_index,
            kind,
            amount,
            collateral_amount: BigDecimal::from(0),
            liquidator: None,
            status: RequestStatus::Pending,
            requested_at: at,
            resolved_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LPRequest {
    pub id: String,
    pub lp: String,
    pub pool: String,
    pub cycle_index: i64,
    pub kind: RequestKind,
    pub amount: BigDecimal,
    pub liquidator: Option<String>,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl LPRequest {
    pub fn id_for(lp: &str, pool: &str, cycle_index: i64) -> String {
        format!("{}-{}-{}", lp, pool, cycle_index)
    }

    pub fn new(
        lp: String,
        pool: String,
        cycle_index: i64,
        kind: RequestKind,
        amount: BigDecimal,
        at: DateTime<Utc>,
    ) -> LPRequest {
        LPRequest {
            id: LPRequest::id_for(&lp, &pool, cycle_index),
            lp,
            pool,
            cycle_index,
            kind,
            amount,
            liquidator: None,
            status: RequestStatus::Pending,
            requested_at: at,
            resolved_at: None,
        }
    }
}

// =============================================================================
// AUDIT DOMAIN
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FeeEvent {
    pub id: String,
    pub lp: String,
    pub pool: String,
    pub amount: BigDecimal,
    pub fee_type: String,
    pub block_number: i64,
    pub tx_hash: String,
    pub log_index: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolEvent {
    pub id: String,
    pub kind: ProtocolEventKind,
    pub subject: String,
    pub verified: Option<bool>,
    pub previous_owner: Option<String>,
    pub new_owner: Option<String>,
    pub block_number: i64,
    pub tx_hash: String,
    pub log_index: i64,
    pub created_at: DateTime<Utc>,
}

pub fn log_id(tx_hash: &str, log_index: i64) -> String {
    format!("{}-{}", tx_hash, log_index)
}
