//! Observable State Containers
//!
//! `Atom` is a small reactive cell: it holds one immutable value behind an
//! `Arc`, replaces it wholesale on every write, and notifies listeners with
//! the new snapshot.
//!
//! # Guarantees
//!
//! - A new listener is called with the current value before `subscribe`
//!   returns, then once per later write.
//! - Writes are serialized; listeners observe them in the order they were
//!   committed.
//! - The write lock is re-entrant, so a listener may read or write the same
//!   atom from inside its callback. Listeners run without the value or
//!   listener locks held.
//! - Snapshots handed out are never mutated afterwards.

mod results;

use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::{ReentrantMutex, RwLock};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

pub use results::{ProfileSnapshot, ProfileStore, StoreEpoch};

type Listener<T> = Arc<dyn Fn(&Arc<T>) + Send + Sync>;

struct Shared<T> {
    value: RwLock<Arc<T>>,
    listeners: RwLock<Vec<(u64, Listener<T>)>>,
    next_listener_id: AtomicU64,
    writer: ReentrantMutex<()>,
}

// =============================================================================
// Atom
// =============================================================================

/// Observable, atomically replaced value.
///
/// Clones share the same underlying cell.
pub struct Atom<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Atom<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Default + Send + Sync + 'static> Default for Atom<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Atom<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Atom")
            .field("value", &*self.shared.value.read())
            .field("listeners", &self.shared.listeners.read().len())
            .finish()
    }
}

impl<T: Send + Sync + 'static> Atom<T> {
    /// Create an atom holding `initial`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            shared: Arc::new(Shared {
                value: RwLock::new(Arc::new(initial)),
                listeners: RwLock::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
                writer: ReentrantMutex::new(()),
            }),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn get(&self) -> Arc<T> {
        Arc::clone(&self.shared.value.read())
    }

    /// Replace the value and notify listeners.
    pub fn set(&self, value: T) {
        let _writer = self.shared.writer.lock();
        self.commit(value);
    }

    /// Derive the next value from the current one and commit it.
    pub fn update<F>(&self, f: F) -> Arc<T>
    where
        F: FnOnce(&T) -> T,
    {
        let _writer = self.shared.writer.lock();
        let current = self.get();
        let next = f(current.as_ref());
        self.commit(next)
    }

    /// Like [`Atom::update`], but `f` may decline the write by returning
    /// `None`, in which case nothing is committed and nobody is notified.
    pub fn try_update<F>(&self, f: F) -> Option<Arc<T>>
    where
        F: FnOnce(&T) -> Option<T>,
    {
        let _writer = self.shared.writer.lock();
        let current = self.get();
        let next = f(current.as_ref())?;
        Some(self.commit(next))
    }

    /// Register a listener. It is called immediately with the current value
    /// and then after every write, until the returned guard is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription<T>
    where
        F: Fn(&Arc<T>) + Send + Sync + 'static,
    {
        let _writer = self.shared.writer.lock();
        let listener: Listener<T> = Arc::new(listener);
        listener(&self.get());

        let id = self.shared.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.shared.listeners.write().push((id, listener));

        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Stream of snapshots: the current value first, then every write.
    ///
    /// Values are buffered, so a slow reader still sees each snapshot.
    #[must_use]
    pub fn changes(&self) -> Changes<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.subscribe(move |value| {
            let _ = tx.send(Arc::clone(value));
        });

        Changes {
            inner: UnboundedReceiverStream::new(rx),
            _subscription: subscription,
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.shared.listeners.read().len()
    }

    // Caller must hold the writer lock.
    fn commit(&self, next: T) -> Arc<T> {
        let next = Arc::new(next);
        *self.shared.value.write() = Arc::clone(&next);

        let listeners: Vec<(u64, Listener<T>)> = self
            .shared
            .listeners
            .read()
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();

        for (id, listener) in listeners {
            if self.is_registered(id) {
                listener(&next);
            }
        }

        next
    }

    fn is_registered(&self, id: u64) -> bool {
        self.shared
            .listeners
            .read()
            .iter()
            .any(|(registered, _)| *registered == id)
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// Listener registration guard. Dropping it unsubscribes.
///
/// A listener is skipped by any write that reaches it after the guard is
/// dropped. A write on another thread that has already started calling it
/// may still finish that one call after `drop` returns.
#[must_use = "dropping a subscription unsubscribes the listener"]
pub struct Subscription<T> {
    id: u64,
    shared: Weak<Shared<T>>,
}

impl<T> Subscription<T> {
    /// Unsubscribe now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.listeners.write().retain(|(id, _)| *id != self.id);
        }
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

// =============================================================================
// Change Stream
// =============================================================================

/// Async stream of atom snapshots. Unsubscribes when dropped.
pub struct Changes<T> {
    inner: UnboundedReceiverStream<Arc<T>>,
    _subscription: Subscription<T>,
}

impl<T> Stream for Changes<T> {
    type Item = Arc<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl<T> fmt::Debug for Changes<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Changes").finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
