//! Shared helper functions

use crate::HelperError;
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

pub type HelperFuture = BoxFuture<'static, Result<Value, HelperError>>;

/// Asynchronous helper; every instance holds its own binding to the same function
pub type Helper = Arc<dyn Fn(Vec<Value>) -> HelperFuture + Send + Sync>;

/// Wrap an async closure as a [`Helper`]
pub fn helper<F, Fut>(f: F) -> Helper
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, HelperError>> + Send + 'static,
{
    Arc::new(move |args| f(args).boxed())
}
