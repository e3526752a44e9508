//! External State Accessor: read-only `eth_call` reads against the
//! authoritative contracts. Every method answers `Option<T>` where `None`
//! means the call failed or reverted; callers leave their cached field
//! unchanged in that case and never abort the event.

use std::time::Duration;

use async_trait::async_trait;
use bigdecimal::{num_bigint::BigInt, BigDecimal, ToPrimitive, Zero};
use reqwest::Client;
use serde_json::{json, Value};
use sha3::{Digest, Keccak256};
use tracing::debug;

use crate::{
    configuration::Config,
    error::Error,
    model::PositionHealth,
    types::{
        CycleParams, FeeParams, HaltParams, InterestRateParams,
        LpCollateralParams, UserCollateralParams, UserPositionState,
        UserRequestState,
    },
};

/// One read per (contract, method, args). Default bodies answer `None`, so
/// an implementation only overrides what it can actually serve; the offline
/// `NullQuery` overrides nothing.
#[allow(unused_variables)]
#[async_trait]
pub trait StateQuery: Send + Sync {
    // pool contract
    async fn asset_token(&self, pool: &str) -> Option<String> {
        None
    }
    async fn pool_cycle_manager(&self, pool: &str) -> Option<String> {
        None
    }
    async fn pool_liquidity_manager(&self, pool: &str) -> Option<String> {
        None
    }
    async fn pool_strategy(&self, pool: &str) -> Option<String> {
        None
    }
    async fn total_user_deposits(&self, pool: &str) -> Option<BigDecimal> {
        None
    }
    async fn total_user_collateral(&self, pool: &str) -> Option<BigDecimal> {
        None
    }
    async fn reserve_backing_asset(&self, pool: &str) -> Option<BigDecimal> {
        None
    }
    async fn aggregate_pool_reserves(&self, pool: &str) -> Option<BigDecimal> {
        None
    }
    async fn cycle_total_deposits(&self, pool: &str) -> Option<BigDecimal> {
        None
    }
    async fn cycle_total_redemptions(&self, pool: &str) -> Option<BigDecimal> {
        None
    }
    async fn reserve_yield_accrued(&self, pool: &str) -> Option<BigDecimal> {
        None
    }
    async fn user_request_state(
        &self,
        pool: &str,
        user: &str,
    ) -> Option<UserRequestState> {
        None
    }
    async fn user_position_state(
        &self,
        pool: &str,
        user: &str,
    ) -> Option<UserPositionState> {
        None
    }

    // liquidity manager contract
    async fn total_lp_liquidity_commited(
        &self,
        manager: &str,
    ) -> Option<BigDecimal> {
        None
    }
    async fn total_lp_collateral(&self, manager: &str) -> Option<BigDecimal> {
        None
    }
    async fn cycle_total_add_liquidity_amount(
        &self,
        manager: &str,
    ) -> Option<BigDecimal> {
        None
    }
    async fn cycle_total_reduce_liquidity_amount(
        &self,
        manager: &str,
    ) -> Option<BigDecimal> {
        None
    }
    async fn lp_count(&self, manager: &str) -> Option<i64> {
        None
    }
    async fn lp_asset_share(
        &self,
        manager: &str,
        lp: &str,
    ) -> Option<BigDecimal> {
        None
    }

    // cycle manager contract
    async fn cycle_rebalance_price(
        &self,
        manager: &str,
        cycle_index: i64,
    ) -> Option<BigDecimal> {
        None
    }
    async fn cycle_price_high(&self, manager: &str) -> Option<BigDecimal> {
        None
    }
    async fn cycle_price_low(&self, manager: &str) -> Option<BigDecimal> {
        None
    }

    // strategy contract
    async fn pool_interest_rate(
        &self,
        strategy: &str,
        pool: &str,
    ) -> Option<BigDecimal> {
        None
    }
    async fn pool_utilization_ratio(
        &self,
        strategy: &str,
        pool: &str,
    ) -> Option<BigDecimal> {
        None
    }
    async fn lp_liquidity_health(
        &self,
        strategy: &str,
        manager: &str,
        lp: &str,
    ) -> Option<PositionHealth> {
        None
    }
    async fn interest_rate_params(
        &self,
        strategy: &str,
    ) -> Option<InterestRateParams> {
        None
    }
    async fn user_collateral_params(
        &self,
        strategy: &str,
    ) -> Option<UserCollateralParams> {
        None
    }
    async fn lp_collateral_params(
        &self,
        strategy: &str,
    ) -> Option<LpCollateralParams> {
        None
    }
    async fn cycle_params(&self, strategy: &str) -> Option<CycleParams> {
        None
    }
    async fn halt_params(&self, strategy: &str) -> Option<HaltParams> {
        None
    }
    async fn fee_params(&self, strategy: &str) -> Option<FeeParams> {
        None
    }
    async fn is_yield_bearing(&self, strategy: &str) -> Option<bool> {
        None
    }

    // token contract
    async fn total_supply(&self, token: &str) -> Option<BigDecimal> {
        None
    }
}

/// Accessor for offline replays: every read is absent, so handlers run on
/// event payloads alone.
#[derive(Debug, Default, Clone)]
pub struct NullQuery;

#[async_trait]
impl StateQuery for NullQuery {}

/// JSON-RPC `eth_call` accessor. Calldata is the Keccak-256 selector of the
/// canonical signature followed by 32-byte argument words; returns decode
/// word by word. Any transport, revert, or decode problem surfaces as `None`.
#[derive(Debug)]
pub struct QueryApi {
    config: Config,
    http: Client,
}

impl QueryApi {
    pub fn new(config: Config) -> Result<QueryApi, Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(QueryApi { config, http })
    }

    async fn eth_call(&self, to: &str, data: String) -> Option<String> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [{ "to": to, "data": format!("0x{}", data) }, "latest"],
        });

        let response = match self
            .http
            .post(&self.config.host)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!("eth_call to {} failed: {}", to, e);
                return None;
            },
        };

        let payload: Value = match response.json().await {
            Ok(payload) => payload,
            Err(e) => {
                debug!("eth_call to {} returned bad body: {}", to, e);
                return None;
            },
        };

        if let Some(error) = payload.get("error") {
            debug!("eth_call to {} reverted: {}", to, error);
            return None;
        }

        let result = payload.get("result")?.as_str()?;
        let hex = result.strip_prefix("0x").unwrap_or(result);

        if hex.is_empty() {
            return None;
        }

        Some(hex.to_lowercase())
    }

    async fn call_uint(&self, to: &str, data: String) -> Option<BigDecimal> {
        let hex = self.eth_call(to, data).await?;
        word_uint(&hex, 0)
    }

    async fn call_address(&self, to: &str, data: String) -> Option<String> {
        let hex = self.eth_call(to, data).await?;
        word_address(&hex, 0)
    }
}

/// First four Keccak-256 bytes of the canonical signature, hex encoded.
fn selector(signature: &str) -> String {
    let mut hasher = Keccak256::new();
    hasher.update(signature.as_bytes());
    let digest = hasher.finalize();

    hex::encode(&digest[..4])
}

fn encode_address(address: &str) -> String {
    let bare = address.strip_prefix("0x").unwrap_or(address);
    format!("{:0>64}", bare.to_lowercase())
}

fn encode_uint(value: i64) -> String {
    format!("{:064x}", value)
}

fn word(hex: &str, index: usize) -> Option<&str> {
    let start = index * 64;
    hex.get(start..start + 64)
}

fn word_uint(hex: &str, index: usize) -> Option<BigDecimal> {
    BigInt::parse_bytes(word(hex, index)?.as_bytes(), 16).map(BigDecimal::from)
}

/// Address from bytes 12..32 of the word. An all-zero word reads as absent:
/// the contract has nothing wired at that slot.
fn word_address(hex: &str, index: usize) -> Option<String> {
    let value = word(hex, index)?;
    if value.bytes().all(|b| b == b'0') {
        return None;
    }

    Some(format!("0x{}", &value[24..]))
}

fn word_bool(hex: &str, index: usize) -> Option<bool> {
    word_uint(hex, index).map(|value| !value.is_zero())
}

fn word_i64(hex: &str, index: usize) -> Option<i64> {
    word_uint(hex, index).and_then(|value| value.to_i64())
}

#[async_trait]
impl StateQuery for QueryApi {
    async fn asset_token(&self, pool: &str) -> Option<String> {
        self.call_address(pool, selector("assetToken()")).await
    }

    async fn pool_cycle_manager(&self, pool: &str) -> Option<String> {
        self.call_address(pool, selector("poolCycleManager()")).await
    }

    async fn pool_liquidity_manager(&self, pool: &str) -> Option<String> {
        self.call_address(pool, selector("poolLiquidityManager()"))
            .await
    }

    async fn pool_strategy(&self, pool: &str) -> Option<String> {
        self.call_address(pool, selector("poolStrategy()")).await
    }

    async fn total_user_deposits(&self, pool: &str) -> Option<BigDecimal> {
        self.call_uint(pool, selector("totalUserDeposits()")).await
    }

    async fn total_user_collateral(&self, pool: &str) -> Option<BigDecimal> {
        self.call_uint(pool, selector("totalUserCollateral()")).await
    }

    async fn reserve_backing_asset(&self, pool: &str) -> Option<BigDecimal> {
        self.call_uint(pool, selector("reserveBackingAsset()")).await
    }

    async fn aggregate_pool_reserves(&self, pool: &str) -> Option<BigDecimal> {
        self.call_uint(pool, selector("aggregatePoolReserves()"))
            .await
    }

    async fn cycle_total_deposits(&self, pool: &str) -> Option<BigDecimal> {
        self.call_uint(pool, selector("cycleTotalDeposits()")).await
    }

    async fn cycle_total_redemptions(&self, pool: &str) -> Option<BigDecimal> {
        self.call_uint(pool, selector("cycleTotalRedemptions()"))
            .await
    }

    async fn reserve_yield_accrued(&self, pool: &str) -> Option<BigDecimal> {
        self.call_uint(pool, selector("reserveYieldAccrued()")).await
    }

    async fn user_request_state(
        &self,
        pool: &str,
        user: &str,
    ) -> Option<UserRequestState> {
        let data = format!(
            "{}{}",
            selector("userRequests(address)"),
            encode_address(user)
        );
        let hex = self.eth_call(pool, data).await?;

        Some(UserRequestState {
            amount: word_uint(&hex, 0)?,
            collateral_amount: word_uint(&hex, 1)?,
        })
    }

    async fn user_position_state(
        &self,
        pool: &str,
        user: &str,
    ) -> Option<UserPositionState> {
        let data = format!(
            "{}{}",
            selector("userPositions(address)"),
            encode_address(user)
        );
        let hex = self.eth_call(pool, data).await?;

        Some(UserPositionState {
            deposit_amount: word_uint(&hex, 0)?,
            asset_amount: word_uint(&hex, 1)?,
            collateral_amount: word_uint(&hex, 2)?,
        })
    }

    async fn total_lp_liquidity_commited(
        &self,
        manager: &str,
    ) -> Option<BigDecimal> {
        self.call_uint(manager, selector("totalLPLiquidityCommited()"))
            .await
    }

    async fn total_lp_collateral(&self, manager: &str) -> Option<BigDecimal> {
        self.call_uint(manager, selector("totalLPCollateral()")).await
    }

    async fn cycle_total_add_liquidity_amount(
        &self,
        manager: &str,
    ) -> Option<BigDecimal> {
        self.call_uint(manager, selector("cycleTotalAddLiquidityAmount()"))
            .await
    }

    async fn cycle_total_reduce_liquidity_amount(
        &self,
        manager: &str,
    ) -> Option<BigDecimal> {
        self.call_uint(manager, selector("cycleTotalReduceLiquidityAmount()"))
            .await
    }

    async fn lp_count(&self, manager: &str) -> Option<i64> {
        let hex = self.eth_call(manager, selector("lpCount()")).await?;
        word_i64(&hex, 0)
    }

    async fn lp_asset_share(
        &self,
        manager: &str,
        lp: &str,
    ) -> Option<BigDecimal> {
        let data = format!(
            "{}{}",
            selector("lpAssetShare(address)"),
            encode_address(lp)
        );
        self.call_uint(manager, data).await
    }

    async fn cycle_rebalance_price(
        &self,
        manager: &str,
        cycle_index: i64,
    ) -> Option<BigDecimal> {
        let data = format!(
            "{}{}",
            selector("cycleRebalancePrice(uint256)"),
            encode_uint(cycle_index)
        );
        self.call_uint(manager, data).await
    }

    async fn cycle_price_high(&self, manager: &str) -> Option<BigDecimal> {
        self.call_uint(manager, selector("cyclePriceHigh()")).await
    }

    async fn cycle_price_low(&self, manager: &str) -> Option<BigDecimal> {
        self.call_uint(manager, selector("cyclePriceLow()")).await
    }

    async fn pool_interest_rate(
        &self,
        strategy: &str,
        pool: &str,
    ) -> Option<BigDecimal> {
        let data = format!(
            "{}{}",
            selector("calculatePoolInterestRate(address)"),
            encode_address(pool)
        );
        self.call_uint(strategy, data).await
    }

    async fn pool_utilization_ratio(
        &self,
        strategy: &str,
        pool: &str,
    ) -> Option<BigDecimal> {
        let data = format!(
            "{}{}",
            selector("calculatePoolUtilizationRatio(address)"),
            encode_address(pool)
        );
        self.call_uint(strategy, data).await
    }

    async fn lp_liquidity_health(
        &self,
        strategy: &str,
        manager: &str,
        lp: &str,
    ) -> Option<PositionHealth> {
        let data = format!(
            "{}{}{}",
            selector("getLPLiquidityHealth(address,address)"),
            encode_address(manager),
            encode_address(lp)
        );
        let hex = self.eth_call(strategy, data).await?;

        PositionHealth::from_code(word_i64(&hex, 0)?)
    }

    async fn interest_rate_params(
        &self,
        strategy: &str,
    ) -> Option<InterestRateParams> {
        let hex = self
            .eth_call(strategy, selector("getInterestRateParams()"))
            .await?;

        Some(InterestRateParams {
            base_interest_rate: word_uint(&hex, 0)?,
            interest_rate_1: word_uint(&hex, 1)?,
            max_interest_rate: word_uint(&hex, 2)?,
            utilization_tier_1: word_uint(&hex, 3)?,
            utilization_tier_2: word_uint(&hex, 4)?,
        })
    }

    async fn user_collateral_params(
        &self,
        strategy: &str,
    ) -> Option<UserCollateralParams> {
        let hex = self
            .eth_call(strategy, selector("getUserCollateralParams()"))
            .await?;

        Some(UserCollateralParams {
            healthy_ratio: word_uint(&hex, 0)?,
            liquidation_threshold: word_uint(&hex, 1)?,
        })
    }

    async fn lp_collateral_params(
        &self,
        strategy: &str,
    ) -> Option<LpCollateralParams> {
        let hex = self
            .eth_call(strategy, selector("getLPCollateralParams()"))
            .await?;

        Some(LpCollateralParams {
            healthy_ratio: word_uint(&hex, 0)?,
            liquidation_threshold: word_uint(&hex, 1)?,
            liquidation_reward: word_uint(&hex, 2)?,
        })
    }

    async fn cycle_params(&self, strategy: &str) -> Option<CycleParams> {
        let hex =
            self.eth_call(strategy, selector("getCycleParams()")).await?;

        Some(CycleParams {
            rebalance_length: word_uint(&hex, 0)?,
            oracle_update_threshold: word_uint(&hex, 1)?,
        })
    }

    async fn halt_params(&self, strategy: &str) -> Option<HaltParams> {
        let hex = self.eth_call(strategy, selector("getHaltParams()")).await?;

        Some(HaltParams {
            halt_threshold: word_uint(&hex, 0)?,
            liquidity_percent: word_uint(&hex, 1)?,
            fee_percent: word_uint(&hex, 2)?,
            request_threshold: word_uint(&hex, 3)?,
        })
    }

    async fn fee_params(&self, strategy: &str) -> Option<FeeParams> {
        let hex = self.eth_call(strategy, selector("getFeeParams()")).await?;

        Some(FeeParams {
            protocol_fee: word_uint(&hex, 0)?,
            fee_recipient: word_address(&hex, 1)?,
        })
    }

    async fn is_yield_bearing(&self, strategy: &str) -> Option<bool> {
        let hex =
            self.eth_call(strategy, selector("isYieldBearing()")).await?;
        word_bool(&hex, 0)
    }

    async fn total_supply(&self, token: &str) -> Option<BigDecimal> {
        self.call_uint(token, selector("totalSupply()")).await
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;

    use super::{
        encode_address, encode_uint, selector, word_address, word_bool,
        word_uint,
    };

    #[test]
    fn selector_matches_known_keccak() {
        assert_eq!(selector("totalSupply()"), "18160ddd");
        assert_eq!(selector("balanceOf(address)"), "70a08231");
    }

    #[test]
    fn address_args_are_left_padded_words() {
        let encoded =
            encode_address("0xAbCd00000000000000000000000000000000eF12");
        assert_eq!(encoded.len(), 64);
        assert!(encoded.starts_with("000000000000000000000000abcd"));
        assert!(encoded.ends_with("ef12"));

        assert_eq!(encode_uint(5).len(), 64);
        assert!(encode_uint(5).ends_with("05"));
    }

    #[test]
    fn words_decode_uint_address_bool() {
        let hex = format!(
            "{:064x}{}{:064x}",
            1_500u64,
            encode_address("0x00000000000000000000000000000000000000aa"),
            1u64,
        );

        assert_eq!(word_uint(&hex, 0), Some(BigDecimal::from(1_500)));
        assert_eq!(
            word_address(&hex, 1),
            Some(String::from("0x00000000000000000000000000000000000000aa"))
        );
        assert_eq!(word_bool(&hex, 2), Some(true));
        assert_eq!(word_uint(&hex, 3), None);
    }

    #[test]
    fn zero_address_word_reads_as_absent() {
        let hex = format!("{:064x}", 0);
        assert_eq!(word_address(&hex, 0), None);
    }
}
