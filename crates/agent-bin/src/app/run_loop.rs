//! The loop that keeps the agent alive while the child runs.

use child_supervisor::{ChildHandle, ChildStatus};
use tracing::debug;

/// Serve requests until the child exits, then return its status.
///
/// Bus dispatch and completions run as tasks on the same runtime while this
/// waits. After the exit one more turn of the loop lets already scheduled
/// completions run before teardown.
pub async fn run_until_exit(child: &mut ChildHandle) -> ChildStatus {
    let status = child.wait_for_exit().await;
    debug!(pid = child.pid(), status = ?status, "Stop flag set");

    tokio::task::yield_now().await;
    status
}
