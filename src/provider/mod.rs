pub use self::{
    query_api::{NullQuery, QueryApi, StateQuery},
    replay::Replay,
};

mod query_api;
mod replay;
