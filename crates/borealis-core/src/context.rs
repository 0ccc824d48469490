//! The UI-thread main context.
//!
//! A [`MainContext`] is the single-threaded cooperative loop that owns timer
//! firing and the hand-off queue. Every thread has a default context, created
//! on first use; widgets register their timers there, and the application
//! drains it from the UI thread.
//!
//! Other threads never touch widgets directly. They post closures through a
//! [`UiSender`], which the context runs in FIFO order during
//! [`MainContext::iteration`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use borealis_core::{ControlFlow, MainContext};
//!
//! let context = MainContext::new();
//! let id = context.add_timeout(Duration::from_millis(100), || ControlFlow::Break);
//!
//! // Fire the timer deterministically, without waiting.
//! assert!(context.fire_timer(id));
//! assert!(!context.is_timer_active(id));
//!
//! let sender = context.ui_sender();
//! std::thread::spawn(move || {
//!     sender.post(|| println!("runs on the UI thread"));
//! })
//! .join()
//! .unwrap();
//! assert_eq!(context.dispatch_pending(), 1);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use parking_lot::Mutex;

use crate::thread_check::ThreadAffinity;
use crate::timer::{ControlFlow, TimerId, TimerManager};

/// A boxed closure handed to the UI thread.
type UiTask = Box<dyn FnOnce() + Send + 'static>;

thread_local! {
    static THREAD_DEFAULT: RefCell<Option<MainContext>> = const { RefCell::new(None) };
}

struct ContextInner {
    affinity: ThreadAffinity,
    timers: Mutex<TimerManager>,
    sender: Sender<UiTask>,
    receiver: Receiver<UiTask>,
    should_quit: AtomicBool,
}

/// A single-threaded cooperative loop: timers plus a hand-off queue.
///
/// Cloning yields another handle to the same context.
#[derive(Clone)]
pub struct MainContext {
    inner: Arc<ContextInner>,
}

/// A cloneable, thread-safe handle for posting work to a [`MainContext`].
#[derive(Clone)]
pub struct UiSender {
    sender: Sender<UiTask>,
}

impl UiSender {
    /// Post a closure to run on the UI thread.
    ///
    /// Fire-and-forget: never blocks. Returns `false` if the context has
    /// been dropped.
    pub fn post<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender.send(Box::new(task)).is_ok()
    }
}

impl fmt::Debug for UiSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiSender")
            .field("queued", &self.sender.len())
            .finish()
    }
}

impl MainContext {
    /// Create a new context owned by the current thread.
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            inner: Arc::new(ContextInner {
                affinity: ThreadAffinity::current(),
                timers: Mutex::new(TimerManager::new()),
                sender,
                receiver,
                should_quit: AtomicBool::new(false),
            }),
        }
    }

    /// The current thread's default context, created on first use.
    pub fn thread_default() -> Self {
        THREAD_DEFAULT.with(|cell| cell.borrow_mut().get_or_insert_with(Self::new).clone())
    }

    /// Whether the current thread owns this context.
    pub fn is_owner(&self) -> bool {
        self.inner.affinity.is_same_thread()
    }

    /// Whether two handles refer to the same context.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// A sender for posting work from any thread.
    pub fn ui_sender(&self) -> UiSender {
        UiSender {
            sender: self.inner.sender.clone(),
        }
    }

    /// Post a closure to run during the next iteration.
    pub fn invoke<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        // The context holds its own receiver, so this cannot disconnect.
        let _ = self.inner.sender.send(Box::new(task));
    }

    /// Number of closures waiting to run.
    pub fn pending(&self) -> usize {
        self.inner.receiver.len()
    }

    // -------------------------------------------------------------------------
    // Timer API
    // -------------------------------------------------------------------------

    /// Add a timer that fires every `interval` while its callback returns
    /// [`ControlFlow::Continue`].
    pub fn add_timeout<F>(&self, interval: Duration, callback: F) -> TimerId
    where
        F: FnMut() -> ControlFlow + Send + 'static,
    {
        self.inner.timers.lock().add(interval, Box::new(callback))
    }

    /// Remove a timer. Returns `true` if it was live.
    pub fn remove_timer(&self, id: TimerId) -> bool {
        self.inner.timers.lock().remove(id)
    }

    /// Check if a timer is live.
    pub fn is_timer_active(&self, id: TimerId) -> bool {
        self.inner.timers.lock().is_active(id)
    }

    /// Number of live timers.
    pub fn active_timer_count(&self) -> usize {
        self.inner.timers.lock().active_count()
    }

    /// Fire a timer now, regardless of its schedule.
    ///
    /// Returns `false` if the timer is not live (or is already running), in
    /// which case nothing happens.
    pub fn fire_timer(&self, id: TimerId) -> bool {
        self.inner.affinity.assert_same_thread("MainContext::fire_timer");
        let Some(mut callback) = self.inner.timers.lock().take_callback(id) else {
            return false;
        };
        tracing::trace!(target: "borealis_core::timer", ?id, "timer fired");
        let flow = callback();
        self.inner.timers.lock().finish(id, callback, flow);
        true
    }

    // -------------------------------------------------------------------------
    // Loop API
    // -------------------------------------------------------------------------

    /// Run the closures queued so far, in FIFO order.
    ///
    /// Closures queued while draining wait for the next call.
    pub fn dispatch_pending(&self) -> usize {
        self.inner.affinity.assert_same_thread("MainContext::dispatch_pending");
        let count = self.inner.receiver.len();
        let mut ran = 0;
        for _ in 0..count {
            match self.inner.receiver.try_recv() {
                Ok(task) => {
                    task();
                    ran += 1;
                }
                Err(_) => break,
            }
        }
        ran
    }

    /// Fire every timer due at `now`.
    pub fn dispatch_timers(&self, now: Instant) -> usize {
        let due = self.inner.timers.lock().take_expired(now);
        if !due.is_empty() {
            tracing::trace!(target: "borealis_core::context", count = due.len(), "processing timers");
        }
        due.into_iter().filter(|id| self.fire_timer(*id)).count()
    }

    /// Run one loop iteration.
    ///
    /// Drains the queue and fires due timers. If nothing was ready and
    /// `may_block` is set, waits for the next queued closure or timer.
    pub fn iteration(&self, may_block: bool) -> usize {
        let mut count = self.dispatch_pending() + self.dispatch_timers(Instant::now());
        if count > 0 || !may_block || self.should_quit() {
            return count;
        }

        let wait = self.inner.timers.lock().time_until_next();
        let task = match wait {
            Some(timeout) => match self.inner.receiver.recv_timeout(timeout) {
                Ok(task) => Some(task),
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
            },
            None => self.inner.receiver.recv().ok(),
        };
        if let Some(task) = task {
            task();
            count += 1;
        }
        count + self.dispatch_timers(Instant::now())
    }

    /// Run until [`quit`](Self::quit) is called.
    ///
    /// A quit requested before `run` makes it return after one
    /// non-blocking pass. The request is consumed on exit.
    #[tracing::instrument(skip(self), target = "borealis_core::context", level = "debug")]
    pub fn run(&self) {
        tracing::info!(target: "borealis_core::context", "starting main loop");
        while !self.should_quit() {
            self.iteration(true);
        }
        self.dispatch_pending();
        self.inner.should_quit.store(false, Ordering::SeqCst);
        tracing::info!(target: "borealis_core::context", "main loop exited");
    }

    /// Ask [`run`](Self::run) to return. Safe to call from any thread.
    pub fn quit(&self) {
        tracing::debug!(target: "borealis_core::context", "quit requested");
        self.inner.should_quit.store(true, Ordering::SeqCst);
        // Wake a blocked iteration.
        self.invoke(|| {});
    }

    /// Check if a quit has been requested.
    pub fn should_quit(&self) -> bool {
        self.inner.should_quit.load(Ordering::SeqCst)
    }

    /// Wait up to `timeout` for queued work and run it.
    ///
    /// Used by tests that exercise real worker threads.
    pub fn dispatch_within(&self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut ran = self.dispatch_pending();
        if ran > 0 {
            return ran;
        }
        if let Ok(task) = self
            .inner
            .receiver
            .recv_timeout(deadline.saturating_duration_since(Instant::now()))
        {
            task();
            ran += 1;
        }
        ran + self.dispatch_pending()
    }
}

impl Default for MainContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MainContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainContext")
            .field("thread", &self.inner.affinity.thread_id())
            .field("pending", &self.pending())
            .field("timers", &self.active_timer_count())
            .finish()
    }
}

static_assertions::assert_impl_all!(MainContext: Send, Sync, Clone);
static_assertions::assert_impl_all!(UiSender: Send, Sync, Clone);
