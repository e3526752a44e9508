use std::{env, fs, ops::Deref, sync::Arc};

use url::Url;

use crate::{dao::EntityStore, error::Error, provider::StateQuery};

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

pub struct State {
    pub config: Config,
    pub store: Box<dyn EntityStore>,
    pub query_api: Box<dyn StateQuery>,
}

impl State {
    pub fn new(
        config: Config,
        store: Box<dyn EntityStore>,
        query_api: Box<dyn StateQuery>,
    ) -> State {
        State {
            config,
            store,
            query_api,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub timeout: u64,
    pub events_file: String,
    pub offline: bool,
    #[cfg(feature = "postgres")]
    pub database_url: String,
    #[cfg(feature = "postgres")]
    pub max_connections: u32,
}

pub fn get_configuration() -> Result<Config, Error> {
    let host = env::var("HOST")?;
    Url::parse(&host)?;

    let timeout = env::var("TIMEOUT")?.parse()?;
    let events_file = env::var("EVENTS_FILE")?;
    let offline = env::var("OFFLINE")
        .unwrap_or_else(|_| String::from("false"))
        .parse()?;

    #[cfg(feature = "postgres")]
    let database_url = env::var("DATABASE_URL")?;
    #[cfg(feature = "postgres")]
    let max_connections = env::var("MAX_CONNECTIONS")
        .unwrap_or_else(|_| String::from("5"))
        .parse()?;

    Ok(Config {
        host,
        timeout,
        events_file,
        offline,
        #[cfg(feature = "postgres")]
        database_url,
        #[cfg(feature = "postgres")]
        max_connections,
    })
}

/// Loads `.env` from the manifest directory into the process environment.
/// A missing file is not an error; variables may come from the caller.
pub fn set_configuration() -> Result<(), Error> {
    let config_file: &str = ".env";

    let directory = env!("CARGO_MANIFEST_DIR");
    let path = format!("{}/{}", directory, config_file);

    match fs::read_to_string(path) {
        Ok(config_string) => parse_config_string(config_string),
        Err(_) => Ok(()),
    }
}

fn parse_config_string(config: String) -> Result<(), Error> {
    let params: Vec<Option<(&str, &str)>> = config
        .split('\n')
        .map(|s| {
            let element = s.find('=');
            if let Some(e) = element {
                return Some(s.split_at(e));
            }
            None
        })
        .map(|value| {
            if let Some((k, v)) = value {
                return Some((k, &v[1..]));
            }
            None
        })
        .collect();

    for (key, value) in params.into_iter().flatten() {
        env::set_var(key, value);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_config_string;

    #[test]
    fn parse_keeps_equals_signs_in_values() {
        let raw = String::from(
            "XPOOL_TEST_HOST=http://localhost:8545\nXPOOL_TEST_OPTS=a=b\nno_delimiter_line",
        );

        parse_config_string(raw).unwrap();

        assert_eq!(
            std::env::var("XPOOL_TEST_HOST").unwrap(),
            "http://localhost:8545"
        );
        assert_eq!(std::env::var("XPOOL_TEST_OPTS").unwrap(), "a=b");
    }
}
