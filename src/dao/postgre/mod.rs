mod audit;
mod pool;
mod position;
mod registry;
mod request;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use super::EntityStore;
use crate::{
    error::Error,
    model::{
        Cycle, CycleManagerPool, FeeEvent, LPPosition, LPRebalance, LPRequest,
        LiquidityManagerPool, Oracle, Pool, ProtocolEvent, Strategy,
        UserPosition, UserRequest,
    },
};

const MIGRATIONS: &[&str] = &[
    "pool.sql",
    "cycle.sql",
    "cycle_manager_pool.sql",
    "liquidity_manager_pool.sql",
    "oracle.sql",
    "strategy.sql",
    "user_position.sql",
    "lp_position.sql",
    "user_request.sql",
    "lp_request.sql",
    "fee_event.sql",
    "protocol_event.sql",
    "lp_rebalance.sql",
];

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connects and applies the idempotent table DDL.
    pub async fn new(
        database_url: &str,
        max_connections: u32,
    ) -> Result<PostgresStore, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        let store = PostgresStore { pool };
        store.init_migrations().await?;

        Ok(store)
    }

    async fn init_migrations(&self) -> Result<(), Error> {
        let dir = env!("CARGO_MANIFEST_DIR");

        for file in MIGRATIONS {
            let path = format!("{}/migrations/{}", dir, file);
            let ddl = std::fs::read_to_string(path)?;
            sqlx::query(ddl.as_str()).execute(&self.pool).await?;
        }

        Ok(())
    }

    pub(super) fn pg(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl EntityStore for PostgresStore {
    async fn load_pool(&self, address: &str) -> Result<Option<Pool>, Error> {
        self.find_pool(address).await
    }

    async fn save_pool(&self, pool: &Pool) -> Result<(), Error> {
        self.upsert_pool(pool).await
    }

    async fn load_oracle(
        &self,
        address: &str,
    ) -> Result<Option<Oracle>, Error> {
        self.find_oracle(address).await
    }

    async fn save_oracle(&self, oracle: &Oracle) -> Result<(), Error> {
        self.upsert_oracle(oracle).await
    }

    async fn load_strategy(
        &self,
        address: &str,
    ) -> Result<Option<Strategy>, Error> {
        self.find_strategy(address).await
    }

    async fn save_strategy(&self, strategy: &Strategy) -> Result<(), Error> {
        self.upsert_strategy(strategy).await
    }

    async fn load_cycle(&self, id: &str) -> Result<Option<Cycle>, Error> {
        self.find_cycle(id).await
    }

    async fn save_cycle(&self, cycle: &Cycle) -> Result<(), Error> {
        self.upsert_cycle(cycle).await
    }

    async fn load_user_position(
        &self,
        id: &str,
    ) -> Result<Option<UserPosition>, Error> {
        self.find_user_position(id).await
    }

    async fn save_user_position(
        &self,
        position: &UserPosition,
    ) -> Result<(), Error> {
        self.upsert_user_position(position).await
    }

    async fn load_lp_position(
        &self,
        id: &str,
    ) -> Result<Option<LPPosition>, Error> {
        self.find_lp_position(id).await
    }

    async fn save_lp_position(
        &self,
        position: &LPPosition,
    ) -> Result<(), Error> {
        self.upsert_lp_position(position).await
    }

    async fn load_user_request(
        &self,
        id: &str,
    ) -> Result<Option<UserRequest>, Error> {
        self.find_user_request(id).await
    }

    async fn save_user_request(
        &self,
        request: &UserRequest,
    ) -> Result<(), Error> {
        self.upsert_user_request(request).await
    }

    async fn load_lp_request(
        &self,
        id: &str,
    ) -> Result<Option<LPRequest>, Error> {
        self.find_lp_request(id).await
    }

    async fn save_lp_request(&self, request: &LPRequest) -> Result<(), Error> {
        self.upsert_lp_request(request).await
    }

    async fn load_cycle_manager_pool(
        &self,
        address: &str,
    ) -> Result<Option<CycleManagerPool>, Error> {
        self.find_cycle_manager_pool(address).await
    }

    async fn save_cycle_manager_pool(
        &self,
        link: &CycleManagerPool,
    ) -> Result<(), Error> {
        self.upsert_cycle_manager_pool(link).await
    }

    async fn load_liquidity_manager_pool(
        &self,
        address: &str,
    ) -> Result<Option<LiquidityManagerPool>, Error> {
        self.find_liquidity_manager_pool(address).await
    }

    async fn save_liquidity_manager_pool(
        &self,
        link: &LiquidityManagerPool,
    ) -> Result<(), Error> {
        self.upsert_liquidity_manager_pool(link).await
    }

    async fn save_fee_event(&self, event: &FeeEvent) -> Result<(), Error> {
        self.insert_fee_event(event).await
    }

    async fn save_protocol_event(
        &self,
        event: &ProtocolEvent,
    ) -> Result<(), Error> {
        self.insert_protocol_event(event).await
    }

    async fn save_lp_rebalance(
        &self,
        rebalance: &LPRebalance,
    ) -> Result<(), Error> {
        self.insert_lp_rebalance(rebalance).await
    }
}
