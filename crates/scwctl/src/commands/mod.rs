//! Command implementations

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use scwctl_core::{ProgressCallback, ProgressEvent, ScwClient, WaitOptions};

use crate::cli::{OutputFormat, WaitArgs};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;

pub mod api;
pub mod block;
pub mod container;
pub mod instance;
pub mod profile;
pub mod sweep;

/// Global flags every handler needs
pub struct CommandContext<'a> {
    pub conn_mgr: &'a ConnectionManager,
    pub profile: Option<&'a str>,
    pub output: OutputFormat,
    pub query: Option<&'a str>,
}

impl CommandContext<'_> {
    pub fn client(&self) -> CliResult<ScwClient> {
        self.conn_mgr.create_client(self.profile)
    }

    /// Print a single resource
    pub fn print<T: serde::Serialize>(&self, data: T) -> CliResult<()> {
        crate::output::print_output(
            data,
            crate::output::OutputFormat::resolve(self.output),
            self.query,
        )
    }

    /// Print a list of resources, one table row per item in `auto` mode
    pub fn print_list<T: serde::Serialize>(&self, items: &[T], columns: &[&str]) -> CliResult<()> {
        crate::output::print_list(items, columns, self.output, self.query)
    }
}

/// Polling settings for a `wait` command
///
/// `None` when neither flag is given, so the profile's settings apply.
pub fn wait_options(args: &WaitArgs, client: &ScwClient) -> Option<WaitOptions> {
    if args.timeout.is_none() && args.interval.is_none() {
        return None;
    }
    let base = client.wait_options();
    let interval = args.interval.map(Duration::from_secs).unwrap_or(base.interval);
    let timeout = args.timeout.map(Duration::from_secs).unwrap_or(base.budget());
    Some(WaitOptions::with_timeout(timeout, interval))
}

/// Spinner driven by waiter progress events, drawn on stderr
pub fn progress_spinner() -> (ProgressBar, ProgressCallback) {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let pb_clone = pb.clone();
    let callback: ProgressCallback = Box::new(move |event| match event {
        ProgressEvent::Started { resource, id } => {
            pb_clone.set_message(format!("Waiting for {resource} {id}"));
        }
        ProgressEvent::Polling {
            resource,
            id,
            status,
            attempt,
            ..
        } => {
            pb_clone.set_message(format!("{resource} {id}: {status} (poll {attempt})"));
        }
        ProgressEvent::Completed {
            resource,
            id,
            status,
        } => {
            pb_clone.finish_with_message(format!("{resource} {id} is {status}"));
        }
        ProgressEvent::Failed {
            resource,
            id,
            error,
        } => {
            pb_clone.finish_with_message(format!("{resource} {id}: {error}"));
        }
    });
    (pb, callback)
}

/// Run a wait with a spinner, clearing it when the wait errors out early
pub async fn with_spinner<T, F, Fut>(wait: F) -> CliResult<T>
where
    F: FnOnce(ProgressCallback) -> Fut,
    Fut: std::future::Future<Output = scwctl_core::Result<T>>,
{
    let (pb, callback) = progress_spinner();
    let result = wait(callback).await;
    if !pb.is_finished() {
        pb.finish_and_clear();
    }
    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ScwClient {
        ScwClient::builder()
            .secret_key("secret")
            .wait_options(WaitOptions::new(Duration::from_secs(2), 10))
            .build()
            .unwrap()
    }

    #[test]
    fn test_wait_options_default_to_profile() {
        assert_eq!(wait_options(&WaitArgs::default(), &client()), None);
    }

    #[test]
    fn test_wait_options_override() {
        let opts = wait_options(
            &WaitArgs {
                timeout: Some(60),
                interval: None,
            },
            &client(),
        )
        .unwrap();
        assert_eq!(opts.interval, Duration::from_secs(2));
        assert_eq!(opts.max_retries, 30);

        let opts = wait_options(
            &WaitArgs {
                timeout: None,
                interval: Some(4),
            },
            &client(),
        )
        .unwrap();
        assert_eq!(opts.interval, Duration::from_secs(4));
        assert_eq!(opts.max_retries, 5);
    }
}
