//! # graft-core
//!
//! The declarative object-graph loader - THE ENGINE.
//!
//! A graph document describes a set of beans (application objects), their
//! dependencies, their properties, and the event wiring between them. This
//! crate turns that description into a running object graph:
//!
//! - [`order`] schedules construction so dependencies come first
//! - [`Loader::resolve`] interprets descriptor nodes into runtime values
//!   (literals, beans, lists, property reads, method invocations)
//! - [`Loader::load_all`] drives the two-phase lifecycle
//!   (instantiate-all-then-initialize-all) with per-bean failure isolation
//! - [`Actionator`] aggregates event handlers behind one callable with a
//!   derived enabled flag
//!
//! ## Architectural Constraints
//!
//! - The backing store is external: the engine reads through [`GraphQuery`]
//!   and never writes the graph
//! - Construction is explicit: type names map to registered factories, and
//!   beans expose their surface through the [`Bean`] trait rather than
//!   being probed reflectively
//! - Single-threaded and synchronous: one load pass runs to completion on
//!   the calling thread; `&mut Loader` enforces one pass at a time
//! - Deterministic: `BTreeMap` only, no floats, no randomness

// =============================================================================
// MODULES
// =============================================================================

pub mod action;
pub mod bean;
pub mod binder;
pub mod graph;
pub mod host;
pub mod loader;
pub mod order;
pub mod types;
pub mod value;
pub mod vocab;

// =============================================================================
// RE-EXPORTS: Data Model
// =============================================================================

pub use types::{BeanError, Datatype, GraftError, Literal, Node, Term};
pub use value::{Signature, TypeTag, Value};

// =============================================================================
// RE-EXPORTS: Graph Access
// =============================================================================

pub use graph::{GraphQuery, MemoryGraph};

// =============================================================================
// RE-EXPORTS: Bean Surface
// =============================================================================

pub use bean::{Bean, BeanHandle, Container, Factory, FactoryRegistry, Windowed, handle};
pub use host::{Decor, DecorRef, InputSink, InputSinkRef};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use action::{ActionEvent, Actionator, EnabledWatcher, Handler, HandlerRef};
pub use loader::{Loader, MAX_RESOLVE_DEPTH, Registry};
pub use order::dependency_order;
