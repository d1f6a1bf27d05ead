//! Cascading fallback search: "first non-empty wins" over an ordered list of queries.
//!
//! Independent of the transport: the caller supplies the attempt function and
//! the emptiness test, so the combinator can be tested with plain futures.

use std::fmt::Display;
use std::future::Future;

use tracing::{info, warn};

/// How a cascade ended.
#[derive(Debug)]
pub enum CascadeOutcome<T, E> {
    /// Query at `index` (0 = primary) returned a usable value.
    Found { index: usize, value: T },
    /// At least one attempt succeeded, but none returned anything usable.
    Exhausted,
    /// Every attempt errored. Carries the last error.
    AllFailed(E),
    /// No queries were supplied.
    Empty,
}

#[derive(Debug)]
pub struct Cascade<T, E> {
    /// Number of queries actually executed.
    pub attempts: usize,
    pub outcome: CascadeOutcome<T, E>,
}

/// Runs `attempt` for each query in order and stops at the first result for
/// which `is_usable` holds. Queries after the winner are never executed.
/// Errors and unusable results both move on to the next query.
pub async fn run_cascade<'a, Q, T, E, F, Fut>(
    queries: impl IntoIterator<Item = &'a Q>,
    mut attempt: F,
    is_usable: impl Fn(&T) -> bool,
) -> Cascade<T, E>
where
    Q: 'a,
    E: Display,
    F: FnMut(&'a Q) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempts = 0;
    let mut any_succeeded = false;
    let mut last_error = None;

    for (index, query) in queries.into_iter().enumerate() {
        attempts += 1;
        if index > 0 {
            info!("Trying fallback search {index}");
        }

        match attempt(query).await {
            Ok(value) if is_usable(&value) => {
                return Cascade {
                    attempts,
                    outcome: CascadeOutcome::Found { index, value },
                };
            }
            Ok(_) => {
                any_succeeded = true;
                info!("Search {index} returned no candidates");
            }
            Err(e) => {
                warn!("Search {index} failed: {e}");
                last_error = Some(e);
            }
        }
    }

    let outcome = match last_error {
        _ if any_succeeded => CascadeOutcome::Exhausted,
        Some(e) => CascadeOutcome::AllFailed(e),
        None => CascadeOutcome::Empty,
    };

    Cascade { attempts, outcome }
}
