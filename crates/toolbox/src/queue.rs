use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use tracing::debug;

struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

/// A multi-producer, multi-consumer queue that is consumed by iterating.
///
/// Producers call [`IterableQueue::no_more_input`] when done; iteration then
/// ends once the queue is drained. Items put after that are dropped.
pub struct IterableQueue<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for IterableQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> IterableQueue<T> {
    /// A queue holding at most `capacity` items; 0 means unbounded.
    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    items: VecDeque::new(),
                    closed: false,
                }),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
                capacity,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an item, blocking while the queue is full.
    pub fn put(&self, item: T) {
        let shared = &self.shared;
        let mut state = self.lock();
        loop {
            if state.closed {
                debug!("queue closed, dropping item");
                return;
            }
            if shared.capacity == 0 || state.items.len() < shared.capacity {
                state.items.push_back(item);
                shared.not_empty.notify_one();
                return;
            }
            state = shared
                .not_full
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Mark that no more input will arrive. Cannot be undone.
    pub fn no_more_input(&self) {
        self.lock().closed = true;
        self.shared.not_empty.notify_all();
        self.shared.not_full.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Next item, blocking until one arrives or input is closed and drained.
    fn next_item(&self) -> Option<T> {
        let shared = &self.shared;
        let mut state = self.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                shared.not_full.notify_one();
                return Some(item);
            }
            if state.closed {
                return None;
            }
            state = shared
                .not_empty
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter { queue: self }
    }
}

pub struct Iter<'a, T> {
    queue: &'a IterableQueue<T>,
}

impl<T> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.queue.next_item()
    }
}

impl<'a, T> IntoIterator for &'a IterableQueue<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
