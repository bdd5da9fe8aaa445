//! Bulk cleanup of test accounts
//!
//! A sweeper lists every resource of one kind in one locality and deletes
//! them, carrying on past individual failures. The per-API sweepers live
//! next to their API (`api::*::sweepers`); this module holds the shared
//! helper and [`sweep_all`], which runs all of them everywhere.

use std::future::Future;

use tracing::{info, warn};

use crate::api::{block, container, instance};
use crate::client::ScwClient;
use crate::error::{ErrorList, Result, ResultExt};

/// Run `action` on every item, one after the other
///
/// Each failure is wrapped with `describe(&item)` as context and kept; the
/// remaining items are still processed.
pub async fn act_on_all<T, D, F, Fut>(
    items: impl IntoIterator<Item = T>,
    describe: D,
    mut action: F,
) -> Result<()>
where
    D: Fn(&T) -> String,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut errs = ErrorList::new();
    for item in items {
        let context = describe(&item);
        errs.record(action(item).await.context(context));
    }
    errs.into_result()
}

/// Sweep block, container and instance resources in every known locality
pub async fn sweep_all(client: &ScwClient) -> Result<()> {
    warn!("sweeper: destroying every block, container and instance resource");
    let mut errs = ErrorList::new();
    errs.record(block::sweepers::sweep_all_localities(client).await);
    errs.record(container::sweepers::sweep_all_localities(client).await);
    errs.record(instance::sweepers::sweep_all_localities(client).await);
    if errs.is_empty() {
        info!("sweep finished cleanly");
    } else {
        warn!(failures = errs.len(), "sweep finished with failures");
    }
    errs.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScwError;

    #[tokio::test]
    async fn test_act_on_all_keeps_going() {
        let mut seen = Vec::new();
        let err = act_on_all(
            vec!["a", "b", "c"],
            |id| format!("error deleting thing {id}"),
            |id| {
                seen.push(id);
                async move {
                    if id == "b" {
                        Err(ScwError::from_status(409, "busy".into(), None))
                    } else {
                        Ok(())
                    }
                }
            },
        )
        .await
        .unwrap_err();

        assert_eq!(seen, vec!["a", "b", "c"]);
        assert_eq!(err.to_string(), "error deleting thing b: Conflict: busy");
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_act_on_all_empty_is_ok() {
        let result = act_on_all(
            Vec::<String>::new(),
            |id| id.clone(),
            |_| async { Ok(()) },
        )
        .await;
        assert!(result.is_ok());
    }
}
