mod memory;

#[cfg(feature = "postgres")]
mod postgre;

pub use memory::MemoryStore;

#[cfg(feature = "postgres")]
pub use postgre::PostgresStore;

use async_trait::async_trait;

use crate::{
    error::Error,
    model::{
        Cycle, CycleManagerPool, FeeEvent, LPPosition, LPRebalance, LPRequest,
        LiquidityManagerPool, Oracle, Pool, ProtocolEvent, Strategy,
        UserPosition, UserRequest,
    },
};

/// Persistence boundary for derived entities: load by key, save as upsert,
/// no delete. A save must be visible to every later load in the same event
/// (read-your-writes).
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn load_pool(&self, address: &str) -> Result<Option<Pool>, Error>;
    async fn save_pool(&self, pool: &Pool) -> Result<(), Error>;

    async fn load_oracle(&self, address: &str)
        -> Result<Option<Oracle>, Error>;
    async fn save_oracle(&self, oracle: &Oracle) -> Result<(), Error>;

    async fn load_strategy(
        &self,
        address: &str,
    ) -> Result<Option<Strategy>, Error>;
    async fn save_strategy(&self, strategy: &Strategy) -> Result<(), Error>;

    async fn load_cycle(&self, id: &str) -> Result<Option<Cycle>, Error>;
    async fn save_cycle(&self, cycle: &Cycle) -> Result<(), Error>;

    async fn load_user_position(
        &self,
        id: &str,
    ) -> Result<Option<UserPosition>, Error>;
    async fn save_user_position(
        &self,
        position: &UserPosition,
    ) -> Result<(), Error>;

    async fn load_lp_position(
        &self,
        id: &str,
    ) -> Result<Option<LPPosition>, Error>;
    async fn save_lp_position(
        &self,
        position: &LPPosition,
    ) -> Result<(), Error>;

    async fn load_user_request(
        &self,
        id: &str,
    ) -> Result<Option<UserRequest>, Error>;
    async fn save_user_request(
        &self,
        request: &UserRequest,
    ) -> Result<(), Error>;

    async fn load_lp_request(
        &self,
        id: &str,
    ) -> Result<Option<LPRequest>, Error>;
    async fn save_lp_request(&self, request: &LPRequest) -> Result<(), Error>;

    async fn load_cycle_manager_pool(
        &self,
        address: &str,
    ) -> Result<Option<CycleManagerPool>, Error>;
    async fn save_cycle_manager_pool(
        &self,
        link: &CycleManagerPool,
    ) -> Result<(), Error>;

    async fn load_liquidity_manager_pool(
        &self,
        address: &str,
    ) -> Result<Option<LiquidityManagerPool>, Error>;
    async fn save_liquidity_manager_pool(
        &self,
        link: &LiquidityManagerPool,
    ) -> Result<(), Error>;

    // Append-only audit records; reducers never read these back.
    async fn save_fee_event(&self, event: &FeeEvent) -> Result<(), Error>;
    async fn save_protocol_event(
        &self,
        event: &ProtocolEvent,
    ) -> Result<(), Error>;
    async fn save_lp_rebalance(
        &self,
        rebalance: &LPRebalance,
    ) -> Result<(), Error>;
}
