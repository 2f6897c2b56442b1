//! Join barrier for one tier of worker tasks

use tokio::task::JoinHandle;

/// Tasks of one worker tier, joined together
#[derive(Debug)]
pub struct TierHandle {
    name: &'static str,
    tasks: Vec<JoinHandle<()>>,
}

impl TierHandle {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            tasks: Vec::new(),
        }
    }

    pub fn push(&mut self, task: JoinHandle<()>) {
        self.tasks.push(task);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every task of the tier to finish
    ///
    /// Returns the number of tasks that panicked or were aborted. A failed
    /// task never sent its report, which the aggregator then flags as an
    /// incomplete tally.
    pub async fn join(self) -> usize {
        let mut failed = 0;
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!(tier = self.name, error = %e, "worker task failed");
                failed += 1;
            }
        }
        tracing::debug!(tier = self.name, failed, "tier joined");
        failed
    }
}
