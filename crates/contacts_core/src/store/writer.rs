//! Background write queue.
//!
//! # Responsibility
//! - Own the only thread that mutates the `contacts` table.
//! - Report each command's outcome to an optional waiter and to the log.
//!
//! # Invariants
//! - Commands are applied strictly in queue order.
//! - A barrier (`None` command) resolves only after every earlier command.

use super::{apply_command, Command, StoreShared};
use crate::repo::contact_repo::{RepoError, RepoResult, SqliteContactRepository};
use log::{debug, error};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};

const WRITER_THREAD_NAME: &str = "contacts-writer";

pub(crate) struct WriteRequest {
    command: Option<Command>,
    reply: oneshot::Sender<RepoResult<()>>,
}

/// Handle to a submitted write.
///
/// Dropping it is the fire-and-forget path: the write still runs, and a
/// failure is only logged.
#[derive(Debug)]
pub struct PendingWrite {
    reply: oneshot::Receiver<RepoResult<()>>,
}

impl PendingWrite {
    /// Waits for the write to be applied and returns its outcome.
    ///
    /// # Errors
    /// - Any repository error raised while applying the command.
    /// - `WriterStopped` when the writer exited before handling it.
    pub async fn wait(self) -> RepoResult<()> {
        self.reply.await.unwrap_or(Err(RepoError::WriterStopped))
    }
}

pub(super) fn spawn_writer(
    shared: Arc<StoreShared>,
) -> RepoResult<mpsc::UnboundedSender<WriteRequest>> {
    let (sender, receiver) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name(WRITER_THREAD_NAME.to_string())
        .spawn(move || run_writer(shared, receiver))
        .map_err(RepoError::WriterSpawn)?;
    Ok(sender)
}

pub(super) fn enqueue(
    commands: &mpsc::UnboundedSender<WriteRequest>,
    command: Option<Command>,
) -> PendingWrite {
    let (reply, receiver) = oneshot::channel();
    if let Err(mpsc::error::SendError(rejected)) = commands.send(WriteRequest { command, reply }) {
        error!("event=contact_write module=store status=error error_code=writer_stopped");
        let _ = rejected.reply.send(Err(RepoError::WriterStopped));
    }
    PendingWrite { reply: receiver }
}

fn run_writer(shared: Arc<StoreShared>, mut receiver: mpsc::UnboundedReceiver<WriteRequest>) {
    debug!("event=writer_start module=store status=ok");
    while let Some(request) = receiver.blocking_recv() {
        let outcome = match &request.command {
            Some(command) => apply_logged(&shared, command),
            None => Ok(()),
        };
        // The caller may have dropped its handle; that is the normal
        // fire-and-forget path.
        let _ = request.reply.send(outcome);
    }
    debug!("event=writer_stop module=store status=ok");
}

fn apply_logged(shared: &StoreShared, command: &Command) -> RepoResult<()> {
    let started_at = Instant::now();
    let result = {
        let conn = shared.conn.lock();
        apply_command(&SqliteContactRepository::new(&conn), command)
    };

    match result {
        Ok(changed) => {
            debug!(
                "event=contact_write module=store status=ok op={} changed={} duration_ms={}",
                command.op_name(),
                changed,
                started_at.elapsed().as_millis()
            );
            if changed {
                shared.notify_changed();
            }
            Ok(())
        }
        Err(err) => {
            error!(
                "event=contact_write module=store status=error op={} duration_ms={} error={}",
                command.op_name(),
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}
