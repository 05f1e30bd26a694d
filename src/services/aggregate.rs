//! Named concurrent reads joined into one result map.
//!
//! Every task starts at once; the join resolves when all of them have
//! succeeded or as soon as one fails, in which case the other tasks are
//! dropped and the error is returned as is.

use futures::future::{try_join_all, BoxFuture};
use indexmap::IndexMap;

use crate::error::AppResult;

/// Named tasks for [`parallel`]
pub struct Tasks<'a, T> {
    tasks: Vec<(&'static str, BoxFuture<'a, AppResult<T>>)>,
}

impl<'a, T> Default for Tasks<'a, T> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<'a, T: Send + 'a> Tasks<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(mut self, name: &'static str, task: F) -> Self
    where
        F: std::future::Future<Output = AppResult<T>> + Send + 'a,
    {
        self.tasks.push((name, Box::pin(task)));
        self
    }
}

/// Run every task concurrently; results are keyed by task name in the order
/// the tasks were added.
pub async fn parallel<'a, T: Send + 'a>(tasks: Tasks<'a, T>) -> AppResult<IndexMap<&'static str, T>> {
    let (names, futures): (Vec<_>, Vec<_>) = tasks.tasks.into_iter().unzip();
    let results = try_join_all(futures).await?;
    Ok(names.into_iter().zip(results).collect())
}
