//! Startup readiness: bring the database to a migrated, connectable state.
//!
//! The service may start before the database accepts connections (container
//! start-up races). The readiness sequence retries the migrate-and-connect
//! attempt a bounded number of times with a fixed delay, but only for
//! connection-class failures. Anything structural (bad migration, bad
//! credentials, a database that could not be created) aborts immediately.
//!
//! Attempts are strictly sequential: attempt `k + 1` starts only after
//! attempt `k` has resolved and its delay has fully elapsed.

use std::future::Future;
use std::time::Duration;

use sea_orm::{sqlx, DbErr, RuntimeErr};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{CONNECT_RETRY_DELAY_MS, MAX_CONNECT_RETRIES};

/// Attempt budget and fixed inter-attempt delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            MAX_CONNECT_RETRIES,
            Duration::from_millis(CONNECT_RETRY_DELAY_MS),
        )
    }
}

/// Outcome of a single failed attempt, classified for the retry decision.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// Database not reachable yet; worth another attempt.
    #[error("transient connection error: {0}")]
    TransientConnection(#[source] DbErr),

    /// Structural failure; retrying cannot help.
    #[error("fatal migration error: {0}")]
    FatalMigration(#[source] DbErr),
}

impl From<DbErr> for AttemptError {
    fn from(err: DbErr) -> Self {
        if is_connection_class(&err) {
            AttemptError::TransientConnection(err)
        } else {
            AttemptError::FatalMigration(err)
        }
    }
}

/// Terminal failure of the readiness sequence. Always fatal to the process.
#[derive(Debug, Error)]
pub enum ReadinessError {
    #[error("database unavailable after {attempts} attempts")]
    DatabaseUnavailable {
        attempts: u32,
        #[source]
        last_error: Option<DbErr>,
    },

    #[error("fatal error while migrating the database")]
    FatalMigration(#[source] DbErr),

    #[error("database readiness cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

/// Connection attempt state, local to one readiness run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub attempts: u32,
    pub connected: bool,
}

impl Readiness {
    fn should_attempt(&self, policy: &RetryPolicy) -> bool {
        !self.connected && self.attempts < policy.max_retries
    }
}

/// Run `attempt` until it succeeds, fails fatally, or the budget runs out.
pub async fn wait_until_ready<T, F, Fut>(
    policy: &RetryPolicy,
    attempt: F,
) -> Result<T, ReadinessError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    wait_until_ready_or_shutdown(policy, attempt, std::future::pending()).await
}

/// Same as [`wait_until_ready`], but gives up when `shutdown` resolves.
///
/// Shutdown is only observed during the inter-attempt delay; an attempt that
/// is already running always resolves first.
pub async fn wait_until_ready_or_shutdown<T, F, Fut, S>(
    policy: &RetryPolicy,
    mut attempt: F,
    shutdown: S,
) -> Result<T, ReadinessError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let mut state = Readiness::default();
    let mut handle = None;
    let mut last_error = None;

    while state.should_attempt(policy) {
        state.attempts += 1;
        info!(
            attempt = state.attempts,
            max_retries = policy.max_retries,
            "Attempting to connect to the database"
        );

        match attempt().await.map_err(AttemptError::from) {
            Ok(connected) => {
                state.connected = true;
                handle = Some(connected);
                info!(attempts = state.attempts, "Connected to the database");
            }
            Err(AttemptError::FatalMigration(err)) => {
                error!(
                    attempt = state.attempts,
                    error = %err,
                    "Fatal error while migrating the database"
                );
                return Err(ReadinessError::FatalMigration(err));
            }
            Err(AttemptError::TransientConnection(err)) => {
                warn!(
                    attempt = state.attempts,
                    max_retries = policy.max_retries,
                    error = %err,
                    "Failed to connect to the database, retrying"
                );
                last_error = Some(err);

                if state.attempts < policy.max_retries {
                    tokio::select! {
                        _ = tokio::time::sleep(policy.delay) => {}
                        _ = &mut shutdown => {
                            warn!(attempts = state.attempts, "Shutdown requested during database readiness");
                            return Err(ReadinessError::Cancelled { attempts: state.attempts });
                        }
                    }
                }
            }
        }
    }

    handle.ok_or_else(|| {
        error!(
            attempts = state.attempts,
            "Unable to connect to the database after multiple attempts"
        );
        ReadinessError::DatabaseUnavailable {
            attempts: state.attempts,
            last_error,
        }
    })
}

// =============================================================================
// Failure classification
// =============================================================================

fn is_connection_class(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) => true,
        DbErr::Conn(runtime) => match driver_error(runtime) {
            Some(driver) => !is_structural_driver_error(driver),
            None => true,
        },
        DbErr::Exec(runtime) | DbErr::Query(runtime) => {
            driver_error(runtime).is_some_and(is_transient_driver_error)
        }
        _ => false,
    }
}

/// SQLSTATE 3D000: the server is up but the target database does not exist.
pub(crate) fn is_unknown_database(err: &DbErr) -> bool {
    sqlstate(err).is_some_and(|code| code == UNKNOWN_DATABASE)
}

/// SQLSTATE 42P04: a concurrent `CREATE DATABASE` won the race.
pub(crate) fn is_duplicate_database(err: &DbErr) -> bool {
    sqlstate(err).is_some_and(|code| code == DUPLICATE_DATABASE)
}

const UNKNOWN_DATABASE: &str = "3D000";
const DUPLICATE_DATABASE: &str = "42P04";

fn sqlstate(err: &DbErr) -> Option<String> {
    let runtime = match err {
        DbErr::Conn(runtime) | DbErr::Exec(runtime) | DbErr::Query(runtime) => runtime,
        _ => return None,
    };
    match driver_error(runtime)? {
        sqlx::Error::Database(db) => db.code().map(|code| code.into_owned()),
        _ => None,
    }
}

fn driver_error(runtime: &RuntimeErr) -> Option<&sqlx::Error> {
    match runtime {
        RuntimeErr::SqlxError(err) => Some(err),
        _ => None,
    }
}

fn is_transient_driver_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db) => db.code().is_some_and(|code| is_transient_sqlstate(&code)),
        _ => false,
    }
}

fn is_structural_driver_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Configuration(_) | sqlx::Error::Tls(_) => true,
        sqlx::Error::Database(db) => db.code().is_some_and(|code| is_structural_sqlstate(&code)),
        _ => false,
    }
}

/// Class 08 (connection exception) and 57P01..57P03 (shutdown / starting up).
fn is_transient_sqlstate(code: &str) -> bool {
    code.starts_with("08") || code.starts_with("57P0")
}

/// Class 28 (invalid authorization) and 3D000 (unknown database).
fn is_structural_sqlstate(code: &str) -> bool {
    code.starts_with("28") || code == UNKNOWN_DATABASE
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::borrow::Cow;
    use std::io;
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::time::Instant;

    const DELAY: Duration = Duration::from_millis(CONNECT_RETRY_DELAY_MS);

    fn refused() -> DbErr {
        DbErr::Conn(RuntimeErr::SqlxError(sqlx::Error::Io(io::Error::from(
            io::ErrorKind::ConnectionRefused,
        ))))
    }

    fn bad_script() -> DbErr {
        DbErr::Migration("syntax error at or near \"CREAT\"".to_string())
    }

    /// Server-side error carrying a SQLSTATE, as the Postgres driver reports it.
    #[derive(Debug, Error)]
    #[error("{message}")]
    struct ServerError {
        code: &'static str,
        message: &'static str,
    }

    impl sqlx::error::DatabaseError for ServerError {
        fn message(&self) -> &str {
            self.message
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::Other
        }
    }

    fn server_error(code: &'static str, message: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(ServerError { code, message }))
    }

    fn unknown_database() -> DbErr {
        DbErr::Conn(RuntimeErr::SqlxError(server_error(
            "3D000",
            "database \"catalog\" does not exist",
        )))
    }

    fn is_transient(err: DbErr) -> bool {
        matches!(AttemptError::from(err), AttemptError::TransientConnection(_))
    }

    #[test]
    fn test_default_policy_uses_named_constants() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 10);
        assert_eq!(policy.delay, Duration::from_millis(2000));
    }

    #[test]
    fn test_classify_connection_failures_as_transient() {
        assert!(is_transient(refused()));
        assert!(is_transient(DbErr::Conn(RuntimeErr::Internal(
            "connection reset".to_string()
        ))));
        assert!(is_transient(DbErr::Exec(RuntimeErr::SqlxError(
            sqlx::Error::PoolTimedOut
        ))));
        assert!(is_transient(DbErr::Conn(RuntimeErr::SqlxError(
            server_error("57P03", "the database system is starting up")
        ))));
    }

    #[test]
    fn test_classify_structural_failures_as_fatal() {
        assert!(!is_transient(bad_script()));
        assert!(!is_transient(DbErr::Exec(RuntimeErr::Internal(
            "relation already exists".to_string()
        ))));
        assert!(!is_transient(DbErr::Conn(RuntimeErr::SqlxError(
            sqlx::Error::Configuration("invalid port number".into())
        ))));
        assert!(!is_transient(DbErr::Custom("unexpected".to_string())));
        assert!(!is_transient(unknown_database()));
    }

    #[test]
    fn test_sqlstate_classes() {
        assert!(is_transient_sqlstate("08006"));
        assert!(is_transient_sqlstate("57P03"));
        assert!(!is_transient_sqlstate("42601"));
        assert!(is_structural_sqlstate("28P01"));
        assert!(is_structural_sqlstate("3D000"));
        assert!(!is_structural_sqlstate("08001"));
    }

    #[test]
    fn test_unknown_database_is_detected_for_creation() {
        assert!(is_unknown_database(&unknown_database()));
        assert!(!is_unknown_database(&refused()));
        assert!(!is_unknown_database(&DbErr::Conn(RuntimeErr::SqlxError(
            server_error("28P01", "password authentication failed")
        ))));
    }

    #[test]
    fn test_duplicate_database_is_detected() {
        let raced = DbErr::Exec(RuntimeErr::SqlxError(server_error(
            "42P04",
            "database \"catalog\" already exists",
        )));

        assert!(is_duplicate_database(&raced));
        assert!(!is_duplicate_database(&unknown_database()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_first_attempt_without_waiting() {
        let start = Instant::now();
        let calls = AtomicU32::new(0);

        let result = wait_until_ready(&RetryPolicy::default(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, DbErr>("db") }
        })
        .await;

        assert_eq!(result.unwrap(), "db");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_n_transient_failures() {
        let policy = RetryPolicy::default();

        for failures in 0..policy.max_retries {
            let start = Instant::now();
            let calls = AtomicU32::new(0);

            let result = wait_until_ready(&policy, || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n <= failures {
                        Err(refused())
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

            assert_eq!(result.unwrap(), failures + 1);
            assert_eq!(calls.load(Ordering::SeqCst), failures + 1);
            assert!(start.elapsed() >= DELAY * failures);
            assert!(start.elapsed() < DELAY * (failures + 1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_refused_three_times_then_accepts_after_six_seconds() {
        let start = Instant::now();
        let calls = AtomicU32::new(0);

        let result = wait_until_ready(&RetryPolicy::default(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n <= 3 {
                    Err(refused())
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_is_database_unavailable() {
        let calls = AtomicU32::new(0);

        let result = wait_until_ready(&RetryPolicy::default(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(refused()) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), MAX_CONNECT_RETRIES);
        match result {
            Err(ReadinessError::DatabaseUnavailable {
                attempts,
                last_error,
            }) => {
                assert_eq!(attempts, MAX_CONNECT_RETRIES);
                assert!(last_error.is_some());
            }
            other => panic!("expected DatabaseUnavailable, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_failure_aborts_without_retry() {
        let start = Instant::now();
        let calls = AtomicU32::new(0);

        let result = wait_until_ready(&RetryPolicy::default(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n == 1 {
                    Err::<(), _>(refused())
                } else {
                    Err(bad_script())
                }
            }
        })
        .await;

        assert!(matches!(result, Err(ReadinessError::FatalMigration(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(start.elapsed(), DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_migrated_store_succeeds_every_time() {
        let policy = RetryPolicy::default();

        for _ in 0..2 {
            let result = wait_until_ready(&policy, || async { Ok::<_, DbErr>(()) }).await;
            assert!(result.is_ok());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_between_attempts() {
        let calls = AtomicU32::new(0);
        let shutdown = tokio::time::sleep(Duration::from_secs(3));

        let result = wait_until_ready_or_shutdown(
            &RetryPolicy::default(),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(refused()) }
            },
            shutdown,
        )
        .await;

        assert!(matches!(
            result,
            Err(ReadinessError::Cancelled { attempts: 2 })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_budget_reports_unavailable_without_attempting() {
        let policy = RetryPolicy::new(0, DELAY);

        let result = wait_until_ready(&policy, || async { Ok::<_, DbErr>(()) }).await;

        assert!(matches!(
            result,
            Err(ReadinessError::DatabaseUnavailable {
                attempts: 0,
                last_error: None
            })
        ));
    }
}
