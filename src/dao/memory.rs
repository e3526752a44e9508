use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::EntityStore;
use crate::{
    error::Error,
    model::{
        Cycle, CycleManagerPool, FeeEvent, LPPosition, LPRebalance, LPRequest,
        LiquidityManagerPool, Oracle, Pool, ProtocolEvent, Strategy,
        UserPosition, UserRequest,
    },
};

/// Map-backed store. The default for replays without a database and the
/// store every reducer test runs against. Clones share the same maps, so a
/// test can keep a handle and inspect what the engine wrote.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pools: Arc<Mutex<HashMap<String, Pool>>>,
    oracles: Arc<Mutex<HashMap<String, Oracle>>>,
    strategies: Arc<Mutex<HashMap<String, Strategy>>>,
    cycles: Arc<Mutex<HashMap<String, Cycle>>>,
    user_positions: Arc<Mutex<HashMap<String, UserPosition>>>,
    lp_positions: Arc<Mutex<HashMap<String, LPPosition>>>,
    user_requests: Arc<Mutex<HashMap<String, UserRequest>>>,
    lp_requests: Arc<Mutex<HashMap<String, LPRequest>>>,
    cycle_manager_pools: Arc<Mutex<HashMap<String, CycleManagerPool>>>,
    liquidity_manager_pools: Arc<Mutex<HashMap<String, LiquidityManagerPool>>>,
    fee_events: Arc<Mutex<Vec<FeeEvent>>>,
    protocol_events: Arc<Mutex<Vec<ProtocolEvent>>>,
    lp_rebalances: Arc<Mutex<Vec<LPRebalance>>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub async fn fee_events(&self) -> Vec<FeeEvent> {
        self.fee_events.lock().await.clone()
    }

    pub async fn protocol_events(&self) -> Vec<ProtocolEvent> {
        self.protocol_events.lock().await.clone()
    }

    pub async fn lp_rebalances(&self) -> Vec<LPRebalance> {
        self.lp_rebalances.lock().await.clone()
    }

    pub async fn pool_count(&self) -> usize {
        self.pools.lock().await.len()
    }

    pub async fn user_request_count(&self) -> usize {
        self.user_requests.lock().await.len()
    }

    pub async fn lp_request_count(&self) -> usize {
        self.lp_requests.lock().await.len()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn load_pool(&self, address: &str) -> Result<Option<Pool>, Error> {
        Ok(self.pools.lock().await.get(address).cloned())
    }

    async fn save_pool(&self, pool: &Pool) -> Result<(), Error> {
        self.pools
            .lock()
            .await
            .insert(pool.address.clone(), pool.clone());
        Ok(())
    }

    async fn load_oracle(
        &self,
        address: &str,
    ) -> Result<Option<Oracle>, Error> {
        Ok(self.oracles.lock().await.get(address).cloned())
    }

    async fn save_oracle(&self, oracle: &Oracle) -> Result<(), Error> {
        self.oracles
            .lock()
            .await
            .insert(oracle.address.clone(), oracle.clone());
        Ok(())
    }

    async fn load_strategy(
        &self,
        address: &str,
    ) -> Result<Option<Strategy>, Error> {
        Ok(self.strategies.lock().await.get(address).cloned())
    }

    async fn save_strategy(&self, strategy: &Strategy) -> Result<(), Error> {
        self.strategies
            .lock()
            .await
            .insert(strategy.address.clone(), strategy.clone());
        Ok(())
    }

    async fn load_cycle(&self, id: &str) -> Result<Option<Cycle>, Error> {
        Ok(self.cycles.lock().await.get(id).cloned())
    }

    async fn save_cycle(&self, cycle: &Cycle) -> Result<(), Error> {
        self.cycles
            .lock()
            .await
            .insert(cycle.id.clone(), cycle.clone());
        Ok(())
    }

    async fn load_user_position(
        &self,
        id: &str,
    ) -> Result<Option<UserPosition>, Error> {
        Ok(self.user_positions.lock().await.get(id).cloned())
    }

    async fn save_user_position(
        &self,
        position: &UserPosition,
    ) -> Result<(), Error> {
        self.user_positions
            .lock()
            .await
            .insert(position.id.clone(), position.clone());
        Ok(())
    }

    async fn load_lp_position(
        &self,
        id: &str,
    ) -> Result<Option<LPPosition>, Error> {
        Ok(self.lp_positions.lock().await.get(id).cloned())
    }

    async fn save_lp_position(
        &self,
        position: &LPPosition,
    ) -> Result<(), Error> {
        self.lp_positions
            .lock()
            .await
            .insert(position.id.clone(), position.clone());
        Ok(())
    }

    async fn load_user_request(
        &self,
        id: &str,
    ) -> Result<Option<UserRequest>, Error> {
        Ok(self.user_requests.lock().await.get(id).cloned())
    }

    async fn save_user_request(
        &self,
        request: &UserRequest,
    ) -> Result<(), Error> {
        self.user_requests
            .lock()
            .await
            .insert(request.id.clone(), request.clone());
        Ok(())
    }

    async fn load_lp_request(
        &self,
        id: &str,
    ) -> Result<Option<LPRequest>, Error> {
        Ok(self.lp_requests.lock().await.get(id).cloned())
    }

    async fn save_lp_request(&self, request: &LPRequest) -> Result<(), Error> {
        self.lp_requests
            .lock()
            .await
            .insert(request.id.clone(), request.clone());
        Ok(())
    }

    async fn load_cycle_manager_pool(
        &self,
        address: &str,
    ) -> Result<Option<CycleManagerPool>, Error> {
        Ok(self.cycle_manager_pools.lock().await.get(address).cloned())
    }

    async fn save_cycle_manager_pool(
        &self,
        link: &CycleManagerPool,
    ) -> Result<(), Error> {
        self.cycle_manager_pools
            .lock()
            .await
            .insert(link.address.clone(), link.clone());
        Ok(())
    }

    async fn load_liquidity_manager_pool(
        &self,
        address: &str,
    ) -> Result<Option<LiquidityManagerPool>, Error> {
        Ok(self
            .liquidity_manager_pools
            .lock()
            .await
            .get(address)
            .cloned())
    }

    async fn save_liquidity_manager_pool(
        &self,
        link: &LiquidityManagerPool,
    ) -> Result<(), Error> {
        self.liquidity_manager_pools
            .lock()
            .await
            .insert(link.address.clone(), link.clone());
        Ok(())
    }

    async fn save_fee_event(&self, event: &FeeEvent) -> Result<(), Error> {
        self.fee_events.lock().await.push(event.clone());
        Ok(())
    }

    async fn save_protocol_event(
        &self,
        event: &ProtocolEvent,
    ) -> Result<(), Error> {
        self.protocol_events.lock().await.push(event.clone());
        Ok(())
    }

    async fn save_lp_rebalance(
        &self,
        rebalance: &LPRebalance,
    ) -> Result<(), Error> {
        self.lp_rebalances.lock().await.push(rebalance.clone());
        Ok(())
    }
}
