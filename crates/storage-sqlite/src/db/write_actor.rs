use super::DbPool;
use crate::errors::{IntoCore, StorageError};
use diesel::SqliteConnection;
use log::debug;
use roster_core::errors::{DatabaseError, Error, Result};
use std::any::Any;
use tokio::sync::{mpsc, oneshot};

// A write job runs against the writer's dedicated connection.
// It returns the core Result so storage and domain errors (e.g. a row that
// vanished) reach the caller with their original variant.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

// Jobs of every return type share one channel, so the return value is
// erased to Box<dyn Any + Send> on the way in and downcast on the way out.
type ErasedJob = Job<Box<dyn Any + Send + 'static>>;
type ErasedReply = oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>;

/// Handle for sending jobs to the writer actor.
///
/// All writes funnel through one connection, so at most one write
/// transaction is open at any time.
#[derive(Clone)]
pub struct WriteHandle {
    // Each message pairs the erased job with the oneshot sender for its reply.
    tx: mpsc::Sender<(ErasedJob, ErasedReply)>,
}

impl WriteHandle {
    /// Executes a database job on the writer actor's dedicated connection.
    ///
    /// The job runs inside an `IMMEDIATE` transaction; returning an error
    /// rolls it back and hands the error to the caller unchanged.
    ///
    /// # Arguments
    /// * `job`: A closure that takes a mutable reference to `SqliteConnection`
    ///   and performs database operations.
    ///
    /// # Returns
    /// A `Result<T>` containing the outcome of the job.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        // Create a oneshot channel for receiving the result from the actor.
        let (ret_tx, ret_rx) = oneshot::channel();

        // Send the job to the writer actor, boxing its value for type erasure.
        // A closed channel means the actor has stopped.
        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .map_err(|_| writer_stopped())?;

        // The outer `?` covers the actor dropping the reply sender; the inner
        // one is the job's own outcome.
        let boxed = ret_rx.await.map_err(|_| writer_stopped())??;

        // Unwrap the Box<dyn Any + Send> back to the job's return type.
        boxed
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| Error::Unexpected("Writer actor returned an unexpected type".to_string()))
    }
}

fn writer_stopped() -> Error {
    Error::Database(DatabaseError::Internal(
        "Database writer is no longer running".to_string(),
    ))
}

/// Spawns a background Tokio task that acts as the single writer to the database.
/// This actor owns one database connection from the pool and processes write jobs serially.
///
/// # Arguments
/// * `pool`: The database connection pool.
///
/// # Returns
/// A `WriteHandle` to send jobs to the spawned actor, or an error if no
/// connection could be taken from the pool.
pub fn spawn_writer(pool: DbPool) -> Result<WriteHandle> {
    // Acquire the actor's connection before spawning so a misconfigured pool
    // fails at startup. It is held for the lifetime of the actor.
    let mut conn = pool.get().into_core()?;

    // Bounded job queue; senders wait once 1024 jobs are pending.
    let (tx, mut rx) = mpsc::channel::<(ErasedJob, ErasedReply)>(1024);

    tokio::spawn(async move {
        // Receive and process jobs one at a time.
        while let Some((job, reply_tx)) = rx.recv().await {
            // Execute the job within an immediate transaction. The job's core
            // error is carried through StorageError::Core and converted back
            // without losing its variant.
            let result: Result<Box<dyn Any + Send + 'static>> = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(|e: StorageError| e.into());

            if let Err(e) = &result {
                debug!("Write job rolled back: {}", e);
            }

            // The requester may have gone away (e.g. timed out); nothing to do then.
            let _ = reply_tx.send(result);
        }
        // rx.recv() returned None: every WriteHandle was dropped.
        debug!("Database writer stopped: all write handles dropped");
    });

    Ok(WriteHandle { tx })
}

// Note: DbConnection (PooledConnection) derefs to SqliteConnection, which
// provides immediate_transaction through the Connection trait.
