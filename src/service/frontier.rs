//! Crawl frontier: a FIFO queue of `(url, depth)` with a dedupe set.
//!
//! `enqueue` is a no-op for URLs already queued or visited; a URL is marked
//! visited when popped. Workers must pair every successful `next()` with a
//! `task_done()` so the frontier can tell an idle pool from a draining one.

use dashmap::DashSet;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;
use url::Url;

#[derive(Default)]
pub struct Frontier {
    queue: Mutex<VecDeque<(Url, u32)>>,
    /// URLs ever enqueued (queued or already popped).
    seen: DashSet<String>,
    /// URLs popped by a worker.
    visited: DashSet<String>,
    in_flight: AtomicUsize,
    closed: AtomicBool,
    notify: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a URL at the given depth. No-op when the URL was already
    /// queued or visited, or the frontier is closed.
    pub fn enqueue(&self, mut url: Url, depth: u32) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        url.set_fragment(None);
        if !self.seen.insert(url.to_string()) {
            return;
        }
        self.queue
            .lock()
            .expect("frontier queue poisoned")
            .push_back((url, depth));
        self.notify.notify_waiters();
    }

    /// Pop the next URL in FIFO order, waiting while other workers may still
    /// discover links. Returns `None` once the frontier is closed or drained
    /// with no work in flight.
    pub async fn next(&self) -> Option<(Url, u32)> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut queue = self.queue.lock().expect("frontier queue poisoned");
                if let Some((url, depth)) = queue.pop_front() {
                    self.in_flight.fetch_add(1, Ordering::AcqRel);
                    self.visited.insert(url.to_string());
                    return Some((url, depth));
                }
            }
            if self.closed.load(Ordering::Acquire) || self.in_flight.load(Ordering::Acquire) == 0 {
                return None;
            }

            notified.await;
        }
    }

    /// Signal that the item returned by the matching `next()` is finished.
    pub fn task_done(&self) {
        if self.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.notify.notify_waiters();
        }
    }

    /// Stop handing out work; waiting workers drain and exit.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn was_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test]
    async fn pops_in_fifo_order() {
        let frontier = Frontier::new();
        frontier.enqueue(url("https://example.com/a"), 0);
        frontier.enqueue(url("https://example.com/b"), 1);

        let (first, d0) = frontier.next().await.unwrap();
        let (second, d1) = frontier.next().await.unwrap();
        assert_eq!(first.as_str(), "https://example.com/a");
        assert_eq!(second.as_str(), "https://example.com/b");
        assert_eq!((d0, d1), (0, 1));
    }

    #[tokio::test]
    async fn duplicate_enqueue_is_a_noop() {
        let frontier = Frontier::new();
        frontier.enqueue(url("https://example.com/a"), 0);
        frontier.enqueue(url("https://example.com/a"), 3);
        frontier.enqueue(url("https://example.com/a#section"), 5);

        assert!(frontier.next().await.is_some());
        frontier.task_done();
        assert!(frontier.next().await.is_none());
    }

    #[tokio::test]
    async fn visited_urls_are_not_requeued() {
        let frontier = Frontier::new();
        frontier.enqueue(url("https://example.com/a"), 0);
        let _ = frontier.next().await.unwrap();
        frontier.task_done();

        frontier.enqueue(url("https://example.com/a"), 1);
        assert!(frontier.next().await.is_none());
        assert_eq!(frontier.visited_count(), 1);
    }

    #[tokio::test]
    async fn drains_when_in_flight_work_finishes() {
        let frontier = Arc::new(Frontier::new());
        frontier.enqueue(url("https://example.com/a"), 0);

        let worker = {
            let frontier = frontier.clone();
            tokio::spawn(async move {
                let mut popped = Vec::new();
                while let Some((u, depth)) = frontier.next().await {
                    popped.push(u.to_string());
                    if depth == 0 {
                        frontier.enqueue(url("https://example.com/b"), 1);
                    }
                    frontier.task_done();
                }
                popped
            })
        };

        let popped = worker.await.unwrap();
        assert_eq!(popped.len(), 2);
    }

    #[tokio::test]
    async fn close_releases_waiting_workers() {
        let frontier = Arc::new(Frontier::new());
        let waiter = {
            let frontier = frontier.clone();
            tokio::spawn(async move { frontier.next().await })
        };
        // The queue is empty and nothing is in flight, so next() returns
        // immediately; close() covers the explicit-shutdown path too.
        frontier.close();
        assert!(waiter.await.unwrap().is_none());
    }
}
