//! Serialized rebuilds.
//!
//! One loop owns the rebuild: it waits for a change, lets the burst settle
//! for the debounce window, drains everything queued and builds once. Changes
//! that arrive while a build runs wait in the channel and are drained
//! together afterwards, so they cost exactly one follow-up build and never
//! interrupt the running one.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::dev::FileChange;

/// Something that can rebuild after a set of paths changed.
#[async_trait]
pub trait Rebuild: Send + Sync {
    /// Returns whether the build succeeded.
    async fn rebuild(&self, changed: &[PathBuf]) -> bool;
}

pub struct RebuildLoop {
    debounce: Duration,
}

impl RebuildLoop {
    pub fn new(debounce: Duration) -> Self {
        Self { debounce }
    }

    /// Run until the change channel closes. Returns the number of builds.
    pub async fn run<R: Rebuild + ?Sized>(
        &self,
        mut changes: mpsc::Receiver<FileChange>,
        builder: &R,
    ) -> usize {
        let mut builds = 0;

        while let Some(first) = changes.recv().await {
            let mut batch = vec![first.path().to_path_buf()];
            if !self.debounce.is_zero() {
                tokio::time::sleep(self.debounce).await;
            }
            while let Ok(change) = changes.try_recv() {
                batch.push(change.path().to_path_buf());
            }
            batch.sort();
            batch.dedup();

            tracing::debug!(files = batch.len(), "rebuilding");
            builder.rebuild(&batch).await;
            builds += 1;
        }

        builds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct SlowBuilder {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        batches: Mutex<Vec<Vec<PathBuf>>>,
    }

    #[async_trait]
    impl Rebuild for SlowBuilder {
        async fn rebuild(&self, changed: &[PathBuf]) -> bool {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.batches.lock().push(changed.to_vec());
            tokio::time::sleep(Duration::from_millis(200)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            true
        }
    }

    fn modified(path: &str) -> FileChange {
        FileChange::Modified(PathBuf::from(path))
    }

    #[tokio::test]
    async fn test_changes_during_build_coalesce_into_one_follow_up() {
        let builder = SlowBuilder::default();
        let (tx, rx) = mpsc::channel(16);
        tx.send(modified("/goban/src/goban/index.ts")).await.unwrap();

        let looper = RebuildLoop::new(Duration::ZERO);
        let (builds, ()) = tokio::join!(looper.run(rx, &builder), async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            tx.send(modified("/goban/src/engine/a.ts")).await.unwrap();
            tx.send(modified("/goban/src/engine/b.ts")).await.unwrap();
            tx.send(modified("/goban/src/engine/a.ts")).await.unwrap();
        });

        assert_eq!(builds, 2);
        assert_eq!(builder.max_in_flight.load(Ordering::SeqCst), 1);
        let batches = builder.batches.lock();
        assert_eq!(batches[0], vec![PathBuf::from("/goban/src/goban/index.ts")]);
        assert_eq!(
            batches[1],
            vec![
                PathBuf::from("/goban/src/engine/a.ts"),
                PathBuf::from("/goban/src/engine/b.ts"),
            ]
        );
    }

    #[tokio::test]
    async fn test_burst_before_build_is_debounced() {
        let builder = SlowBuilder::default();
        let (tx, rx) = mpsc::channel(16);
        for i in 0..5 {
            tx.send(modified(&format!("/goban/src/f{i}.ts"))).await.unwrap();
        }
        drop(tx);

        let builds = RebuildLoop::new(Duration::from_millis(10)).run(rx, &builder).await;

        assert_eq!(builds, 1);
        assert_eq!(builder.batches.lock()[0].len(), 5);
    }

    #[tokio::test]
    async fn test_closed_channel_ends_loop() {
        let builder = SlowBuilder::default();
        let (tx, rx) = mpsc::channel::<FileChange>(1);
        drop(tx);
        assert_eq!(RebuildLoop::new(Duration::ZERO).run(rx, &builder).await, 0);
    }
}
