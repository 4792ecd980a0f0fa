//! # Action Proxies
//!
//! An [`Actionator`] stands between an input source (menu item, hotkey,
//! toolbar button) and the handlers that do the work. It aggregates any
//! number of delegates behind one callable and derives its own
//! enabled/disabled state from theirs.
//!
//! Handlers use interior mutability behind shared [`HandlerRef`] handles,
//! so enabled-change notifications can flow without mutable borrows
//! crossing object boundaries.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::graph::GraphQuery;
use crate::loader::Loader;
use crate::types::{GraftError, Node, Term};
use crate::vocab;

// =============================================================================
// EVENTS & HANDLERS
// =============================================================================

/// The event forwarded through action proxies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionEvent {
    /// The command string carried with the event.
    pub command: Option<String>,
}

impl ActionEvent {
    /// An event carrying a command string.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
        }
    }

    /// An event with no command.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Shared handle to an event handler.
pub type HandlerRef = Rc<dyn Handler>;

/// Callback invoked when a handler's enabled flag may have changed.
pub type EnabledWatcher = Rc<dyn Fn()>;

/// The single-method invoke contract of event handlers.
pub trait Handler {
    /// Handle one event.
    fn perform(&self, event: &ActionEvent);

    /// The handler's enabled flag; `None` when the handler does not expose
    /// one. Flagless handlers never affect a proxy's aggregate state.
    fn enabled(&self) -> Option<bool> {
        None
    }

    /// Subscribe to enabled-flag changes. Handlers without a flag ignore
    /// this.
    fn watch_enabled(&self, _watcher: EnabledWatcher) {}

    /// Unsubscribe a watcher previously passed to
    /// [`Handler::watch_enabled`], by identity.
    fn unwatch_enabled(&self, _watcher: &EnabledWatcher) {}
}

fn same_handler(a: &HandlerRef, b: &HandlerRef) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

fn same_watcher(a: &EnabledWatcher, b: &EnabledWatcher) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

// =============================================================================
// ACTIONATOR
// =============================================================================

/// An action proxy that forwards invocations to its delegates and derives
/// an aggregate enabled flag.
///
/// The aggregate is the OR of every delegate that exposes a flag; with no
/// flag-bearing delegates the proxy defaults to enabled. Its own watchers
/// fire only when the aggregate actually flips.
pub struct Actionator {
    command: RefCell<Option<String>>,
    description: RefCell<Option<String>>,
    delegates: RefCell<Vec<HandlerRef>>,
    enabled: Cell<bool>,
    watchers: RefCell<Vec<EnabledWatcher>>,
    /// The watcher this proxy hangs on flag-bearing delegates; holds a
    /// weak self-reference so delegate lists never keep a dead proxy alive.
    probe: RefCell<Option<EnabledWatcher>>,
}

impl Actionator {
    /// Create an empty proxy. Starts enabled, with no delegates.
    #[must_use]
    pub fn new() -> Rc<Self> {
        let proxy = Rc::new(Self {
            command: RefCell::new(None),
            description: RefCell::new(None),
            delegates: RefCell::new(Vec::new()),
            enabled: Cell::new(true),
            watchers: RefCell::new(Vec::new()),
            probe: RefCell::new(None),
        });
        let weak: Weak<Self> = Rc::downgrade(&proxy);
        let probe: EnabledWatcher = Rc::new(move || {
            if let Some(strong) = weak.upgrade() {
                strong.refresh();
            }
        });
        *proxy.probe.borrow_mut() = Some(probe);
        proxy
    }

    /// Append a delegate; flag-bearing delegates are watched for
    /// enabled-flag changes.
    pub fn add_delegate(&self, handler: HandlerRef) {
        if handler.enabled().is_some() {
            if let Some(probe) = self.probe.borrow().as_ref() {
                handler.watch_enabled(Rc::clone(probe));
            }
        }
        self.delegates.borrow_mut().push(handler);
        self.refresh();
    }

    /// Remove a delegate by identity; unsubscribes when applicable.
    pub fn remove_delegate(&self, handler: &HandlerRef) {
        let removed = {
            let mut delegates = self.delegates.borrow_mut();
            delegates
                .iter()
                .position(|h| same_handler(h, handler))
                .map(|pos| delegates.remove(pos))
        };
        let Some(removed) = removed else { return };
        if removed.enabled().is_some() {
            if let Some(probe) = self.probe.borrow().as_ref() {
                removed.unwatch_enabled(probe);
            }
        }
        self.refresh();
    }

    /// Number of delegates currently attached.
    #[must_use]
    pub fn delegate_count(&self) -> usize {
        self.delegates.borrow().len()
    }

    /// The current aggregate enabled state.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// This proxy always treats the triggering input as handled.
    #[must_use]
    pub fn always_consumes(&self) -> bool {
        true
    }

    /// The command string sent to delegates.
    #[must_use]
    pub fn command(&self) -> Option<String> {
        self.command.borrow().clone()
    }

    /// Set the command passed to delegates on every invocation.
    pub fn set_command(&self, command: impl Into<String>) {
        *self.command.borrow_mut() = Some(command.into());
    }

    /// The localized description, if one was configured.
    #[must_use]
    pub fn description(&self) -> Option<String> {
        self.description.borrow().clone()
    }

    /// Set the description.
    pub fn set_description(&self, description: impl Into<String>) {
        *self.description.borrow_mut() = Some(description.into());
    }

    /// Recompute the aggregate flag, notifying watchers only on a flip.
    fn refresh(&self) {
        let previous = self.enabled.get();
        let mut has_flag = false;
        let mut aggregate = false;
        for handler in self.delegates.borrow().iter() {
            if let Some(flag) = handler.enabled() {
                has_flag = true;
                aggregate = aggregate || flag;
            }
        }
        let current = if has_flag { aggregate } else { true };
        if current != previous {
            self.enabled.set(current);
            let watchers: Vec<EnabledWatcher> = self.watchers.borrow().clone();
            for watcher in watchers {
                watcher();
            }
        }
    }

    /// Build a proxy from an action-typed graph node.
    ///
    /// Reads the optional command string, resolves every `sendsTo`
    /// delegate (none at all is a logged warning, and the proxy is left
    /// empty), and takes the description from the decor collaborator.
    pub fn from_node<G: GraphQuery>(
        loader: &mut Loader<G>,
        node: &Node,
    ) -> Result<Rc<Self>, GraftError> {
        let proxy = Self::new();

        if let Some(term) = loader.graph().first_edge(node, vocab::ACTION_COMMAND) {
            match term {
                Term::Literal(lit) => proxy.set_command(lit.lexical()),
                Term::Node(n) => proxy.set_command(n.to_string()),
            }
        }

        let delegates = loader.graph().edges(node, vocab::SENDS_TO);
        if delegates.is_empty() {
            tracing::warn!(action = %node, "missing recipient for action");
        }
        for term in delegates {
            let delegate_node = match &term {
                Term::Node(n) => n.clone(),
                Term::Literal(_) => node.clone(),
            };
            let value = loader.resolve_nested(&term, None)?;
            let handler = value
                .as_handler()
                .cloned()
                .ok_or(GraftError::NotAHandler(delegate_node))?;
            proxy.add_delegate(handler);
        }

        if let Some(description) = loader.decor().and_then(|d| d.description(node)) {
            proxy.set_description(description);
        }

        tracing::info!(action = %node, command = ?proxy.command(), "created action proxy");
        Ok(proxy)
    }
}

impl Handler for Actionator {
    /// Forward the event to every delegate, most recently added first.
    /// The proxy's own command string, when set, replaces the event's.
    fn perform(&self, event: &ActionEvent) {
        tracing::debug!(command = ?event.command, "action event received");
        let effective = match self.command.borrow().clone() {
            Some(command) => ActionEvent::new(command),
            None => event.clone(),
        };
        let delegates: Vec<HandlerRef> = self.delegates.borrow().clone();
        for handler in delegates.iter().rev() {
            handler.perform(&effective);
        }
    }

    fn enabled(&self) -> Option<bool> {
        Some(self.enabled.get())
    }

    fn watch_enabled(&self, watcher: EnabledWatcher) {
        self.watchers.borrow_mut().push(watcher);
    }

    fn unwatch_enabled(&self, watcher: &EnabledWatcher) {
        self.watchers
            .borrow_mut()
            .retain(|w| !same_watcher(w, watcher));
    }
}

// =============================================================================
// TESTS
// =============================================================================
