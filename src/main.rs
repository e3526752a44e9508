use tracing::{error, info, Level};

use xpool_etl::{
    configuration::{
        get_configuration, set_configuration, AppState, Config, State,
    },
    dao::EntityStore,
    error::Error,
    provider::{NullQuery, QueryApi, Replay, StateQuery},
};

#[cfg(feature = "postgres")]
use xpool_etl::dao::PostgresStore;

#[cfg(not(feature = "postgres"))]
use xpool_etl::dao::MemoryStore;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let result = app_main().await;

    if let Err(err) = &result {
        error!("{}", err);
    }

    result
}

async fn app_main() -> Result<(), Error> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level(Level::INFO)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    set_configuration()?;
    let config = get_configuration()?;

    let store = init_store(&config).await?;
    let query_api = init_query(&config)?;

    let state = State::new(config, store, query_api);
    let app_state = AppState::new(state);

    let applied = Replay::new(app_state).run().await?;
    info!("done, {} events applied", applied);

    Ok(())
}

#[cfg(feature = "postgres")]
async fn init_store(config: &Config) -> Result<Box<dyn EntityStore>, Error> {
    let store =
        PostgresStore::new(&config.database_url, config.max_connections)
            .await?;

    Ok(Box::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn init_store(_config: &Config) -> Result<Box<dyn EntityStore>, Error> {
    Ok(Box::new(MemoryStore::new()))
}

fn init_query(config: &Config) -> Result<Box<dyn StateQuery>, Error> {
    if config.offline {
        info!("offline mode, contract reads disabled");
        return Ok(Box::new(NullQuery));
    }

    Ok(Box::new(QueryApi::new(config.clone())?))
}
