//! Built-in handlers and the default route table.

pub mod basic;
pub mod files;

use std::path::PathBuf;

use crate::http::RequestContext;
use crate::routing::{PatternError, Router};

pub use files::FileStore;

/// The server's route table. Order matters: first match wins.
pub fn routes(directory: Option<PathBuf>) -> Result<Router, PatternError> {
    let store = FileStore::new(directory);
    let read_store = store.clone();
    let write_store = store;

    let router = Router::builder()
        .get("/", basic::ping)?
        .get("/echo/{message}", basic::echo)?
        .get("/user-agent", basic::user_agent)?
        .get("/files/{filename}", move |ctx: RequestContext| {
            let store = read_store.clone();
            async move { store.read(ctx).await }
        })?
        .post("/files/{filename}", move |ctx: RequestContext| {
            let store = write_store.clone();
            async move { store.write(ctx).await }
        })?
        .build();
    Ok(router)
}
