//! Sentinel-driven "load more" trigger.
//!
//! [`ViewportObserver`] tracks a scroll viewport and notifies subscribers when
//! a sentinel element enters or leaves it (widened by a root margin).
//! [`ScrollTrigger`] subscribes the sentinel at the bottom of the table and
//! asks the listing for the next page whenever it becomes visible, and again
//! after every page lands while it is still visible.
//!
//! Subscriptions are owned by [`Observation`] guards: dropping the guard
//! unregisters the callback, so replacing or tearing down a trigger never
//! leaves a stale subscriber behind.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use marquee_core::{defaults, logging};

use crate::hook::InfiniteFavorites;

static NEXT_SENTINEL: AtomicU64 = AtomicU64::new(1);

/// Identity of a sentinel element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SentinelId(u64);

/// An element whose visibility is observed, positioned by its offset from the
/// top of the scroll content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sentinel {
    pub id: SentinelId,
    pub offset_top: f64,
}

impl Sentinel {
    pub fn new(offset_top: f64) -> Self {
        Self {
            id: SentinelId(NEXT_SENTINEL.fetch_add(1, Ordering::Relaxed)),
            offset_top,
        }
    }
}

type Callback = Arc<dyn Fn(bool) + Send + Sync>;

struct Registration {
    sentinel: Sentinel,
    root_margin: f64,
    visible: bool,
    callback: Callback,
}

struct ObserverState {
    scroll_top: f64,
    height: f64,
    next_token: u64,
    registrations: HashMap<u64, Registration>,
}

fn within(scroll_top: f64, height: f64, root_margin: f64, offset_top: f64) -> bool {
    offset_top >= scroll_top - root_margin && offset_top <= scroll_top + height + root_margin
}

impl ObserverState {
    fn is_visible(&self, sentinel: &Sentinel, root_margin: f64) -> bool {
        within(self.scroll_top, self.height, root_margin, sentinel.offset_top)
    }

    /// Recompute visibility; return the callbacks whose state flipped.
    fn transitions(&mut self) -> Vec<(Callback, bool)> {
        let (scroll_top, height) = (self.scroll_top, self.height);
        let mut fired = Vec::new();
        for reg in self.registrations.values_mut() {
            let visible = within(scroll_top, height, reg.root_margin, reg.sentinel.offset_top);
            if visible != reg.visible {
                reg.visible = visible;
                fired.push((reg.callback.clone(), visible));
            }
        }
        fired
    }
}

/// A scroll viewport that reports sentinel visibility changes.
#[derive(Clone)]
pub struct ViewportObserver {
    state: Arc<Mutex<ObserverState>>,
}

impl ViewportObserver {
    /// Viewport of `height` scrolled to the top.
    pub fn new(height: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(ObserverState {
                scroll_top: 0.0,
                height,
                next_token: 0,
                registrations: HashMap::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ObserverState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Subscribe `callback` to visibility changes of `sentinel`.
    ///
    /// The callback runs once immediately with the current visibility, then
    /// on every change, until the returned guard is dropped.
    pub fn observe<F>(&self, sentinel: Sentinel, root_margin: f64, callback: F) -> Observation
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let callback: Callback = Arc::new(callback);
        let (token, visible) = {
            let mut state = self.lock();
            let token = state.next_token;
            state.next_token += 1;
            let visible = state.is_visible(&sentinel, root_margin);
            state.registrations.insert(
                token,
                Registration {
                    sentinel,
                    root_margin,
                    visible,
                    callback: callback.clone(),
                },
            );
            (token, visible)
        };
        trace!(
            subsystem = logging::SUBSYSTEM_CLIENT,
            component = "viewport",
            token,
            visible,
            "Sentinel observed"
        );
        callback(visible);

        Observation {
            token,
            state: Arc::downgrade(&self.state),
        }
    }

    pub fn scroll_to(&self, scroll_top: f64) {
        self.update(|state| state.scroll_top = scroll_top.max(0.0));
    }

    pub fn resize(&self, height: f64) {
        self.update(|state| state.height = height.max(0.0));
    }

    /// Move a sentinel, e.g. after rows were appended above it.
    pub fn move_sentinel(&self, id: SentinelId, offset_top: f64) {
        self.update(|state| {
            for reg in state.registrations.values_mut() {
                if reg.sentinel.id == id {
                    reg.sentinel.offset_top = offset_top;
                }
            }
        });
    }

    /// Number of live subscriptions.
    pub fn observation_count(&self) -> usize {
        self.lock().registrations.len()
    }

    fn update(&self, change: impl FnOnce(&mut ObserverState)) {
        let fired = {
            let mut state = self.lock();
            change(&mut state);
            state.transitions()
        };
        // Callbacks may call back into the observer.
        for (callback, visible) in fired {
            callback(visible);
        }
    }
}

/// Live subscription; unregisters on drop.
pub struct Observation {
    token: u64,
    state: Weak<Mutex<ObserverState>>,
}

impl Drop for Observation {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            let mut state = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            state.registrations.remove(&self.token);
        }
    }
}

/// Claim and spawn the next page fetch, unless the listing has nothing more
/// or a fetch is already in flight.
fn request_next_page(hook: &Arc<InfiniteFavorites>, runtime: &Handle, reason: &str) -> bool {
    if !hook.has_next_page() {
        return false;
    }
    match hook.begin_fetch() {
        Ok(ticket) => {
            debug!(
                subsystem = logging::SUBSYSTEM_CLIENT,
                component = "scroll_trigger",
                reason,
                cursor = ?ticket.cursor(),
                "Sentinel visible, fetching next page"
            );
            let hook = hook.clone();
            runtime.spawn(async move {
                hook.complete(ticket).await;
            });
            true
        }
        Err(outcome) => {
            trace!(
                subsystem = logging::SUBSYSTEM_CLIENT,
                component = "scroll_trigger",
                reason,
                outcome = ?outcome,
                "Sentinel visible, fetch skipped"
            );
            false
        }
    }
}

/// An attached sentinel: its subscription, last known visibility, and the
/// task re-checking after each landed page.
struct Attachment {
    _observation: Observation,
    visible: Arc<AtomicBool>,
    rearm: JoinHandle<()>,
}

impl Drop for Attachment {
    fn drop(&mut self) {
        self.rearm.abort();
    }
}

/// Fetches the next page when the bottom sentinel becomes visible.
///
/// A sentinel that stays visible keeps loading: each landed page (including
/// the first page of a refetch) re-checks visibility and `has_next_page`.
pub struct ScrollTrigger {
    hook: Arc<InfiniteFavorites>,
    observer: ViewportObserver,
    attachment: Mutex<Option<Attachment>>,
    root_margin: f64,
    runtime: Handle,
}

impl ScrollTrigger {
    /// Trigger spawning its fetches on `runtime`, with the default 200px
    /// lookahead.
    pub fn new(hook: Arc<InfiniteFavorites>, observer: ViewportObserver, runtime: Handle) -> Self {
        Self {
            hook,
            observer,
            attachment: Mutex::new(None),
            root_margin: defaults::SCROLL_ROOT_MARGIN_PX,
            runtime,
        }
    }

    pub fn with_root_margin(mut self, root_margin: f64) -> Self {
        self.root_margin = root_margin;
        self
    }

    fn slot(&self) -> MutexGuard<'_, Option<Attachment>> {
        self.attachment
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Observe `sentinel`, replacing any previously attached one.
    pub fn attach(&self, sentinel: Sentinel) {
        let mut slot = self.slot();
        // Release the old subscription before registering the new one.
        drop(slot.take());

        // Subscribe before observing so no page landing in between is missed.
        let mut landed = self.hook.subscribe_pages();
        let visible = Arc::new(AtomicBool::new(false));

        let observation = self.observer.observe(sentinel, self.root_margin, {
            let hook = self.hook.clone();
            let runtime = self.runtime.clone();
            let visible = visible.clone();
            move |now_visible| {
                visible.store(now_visible, Ordering::SeqCst);
                if now_visible {
                    request_next_page(&hook, &runtime, "visible");
                }
            }
        });

        let rearm = self.runtime.spawn({
            let hook = self.hook.clone();
            let runtime = self.runtime.clone();
            let visible = visible.clone();
            async move {
                while landed.changed().await.is_ok() {
                    if visible.load(Ordering::SeqCst) {
                        request_next_page(&hook, &runtime, "page_landed");
                    }
                }
            }
        });

        *slot = Some(Attachment {
            _observation: observation,
            visible,
            rearm,
        });
    }

    /// Re-evaluate the attached sentinel: fetch the next page if it is
    /// visible and more pages exist. Returns whether a fetch was started.
    pub fn recheck(&self) -> bool {
        let visible = self
            .slot()
            .as_ref()
            .map_or(false, |attachment| attachment.visible.load(Ordering::SeqCst));
        visible && request_next_page(&self.hook, &self.runtime, "recheck")
    }

    /// Stop observing.
    pub fn detach(&self) {
        drop(self.slot().take());
    }

    pub fn is_attached(&self) -> bool {
        self.slot().is_some()
    }
}
