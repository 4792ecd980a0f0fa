//! # The Loader
//!
//! [`Loader`] is the load context: it owns the graph handle, the bean
//! registry, the factory registry, and the host collaborators, and threads
//! them explicitly through resolution — no ambient global state.
//!
//! Two entry styles share the same machinery:
//! - [`Loader::load_all`] runs the full two-phase driver at startup:
//!   order, instantiate everything, then initialize everything with
//!   per-bean failure isolation.
//! - [`Loader::resolve`] interprets a single descriptor on demand, for
//!   values and beans first referenced after startup.
//!
//! A load pass is synchronous and single-threaded; `&mut Loader` makes one
//! pass at a time a compile-time guarantee. Embedders sharing a loader
//! across threads wrap the whole thing in one `Mutex` held across a call.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::action::Actionator;
use crate::bean::{Bean, BeanHandle, FactoryRegistry};
use crate::binder;
use crate::graph::GraphQuery;
use crate::host::{DecorRef, InputSinkRef};
use crate::order;
use crate::types::{BeanError, GraftError, Node, Term};
use crate::value::{Signature, TypeTag, Value};
use crate::vocab;

/// Ceiling on descriptor nesting within one top-level resolution.
///
/// Legitimate configurations stay far below this; the limit exists so a
/// malformed graph surfaces as [`GraftError::ResolutionDepth`] instead of
/// exhausting the stack.
pub const MAX_RESOLVE_DEPTH: usize = 512;

// =============================================================================
// REGISTRY
// =============================================================================

/// The node-to-value memoization table for a load session.
///
/// Holds at most one live value per named, non-temporary bean node (and
/// per action node). Anonymous and temporary beans never appear here.
#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<Node, Value>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The registered value for a node. Cloning a value clones the handle,
    /// not the instance.
    #[must_use]
    pub fn get(&self, node: &Node) -> Option<Value> {
        self.entries.get(node).cloned()
    }

    /// Record a value under a node, replacing any previous entry. Existing
    /// holders of the old value keep it.
    pub fn insert(&mut self, node: Node, value: Value) {
        self.entries.insert(node, value);
    }

    /// Whether the node has a registered value.
    #[must_use]
    pub fn contains(&self, node: &Node) -> bool {
        self.entries.contains_key(node)
    }

    /// Reverse lookup: the node a value was registered under. Instances
    /// and handlers compare by identity.
    #[must_use]
    pub fn node_for(&self, value: &Value) -> Option<Node> {
        self.entries
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(node, _)| node.clone())
    }

    /// Registered nodes, in deterministic order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.entries.keys()
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// LOADER
// =============================================================================

/// The object-graph resolution and wiring engine.
pub struct Loader<G: GraphQuery> {
    graph: G,
    registry: Registry,
    factories: FactoryRegistry,
    decor: Option<DecorRef>,
    input: Option<InputSinkRef>,
    /// Nodes currently being resolved, innermost last. Scoped to one
    /// top-level resolution; detects runaway recursion without outlawing
    /// the intentional re-resolution of temporary beans.
    eval: Vec<Node>,
}

impl<G: GraphQuery> Loader<G> {
    /// Create a loader over a graph document.
    #[must_use]
    pub fn new(graph: G) -> Self {
        Self {
            graph,
            registry: Registry::new(),
            factories: FactoryRegistry::new(),
            decor: None,
            input: None,
            eval: Vec::new(),
        }
    }

    /// The graph being loaded from.
    #[must_use]
    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// The bean registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The factory registry.
    #[must_use]
    pub fn factories(&self) -> &FactoryRegistry {
        &self.factories
    }

    /// Mutable access to the factory registry, for host registration.
    pub fn factories_mut(&mut self) -> &mut FactoryRegistry {
        &mut self.factories
    }

    /// Install the decor collaborator.
    pub fn set_decor(&mut self, decor: DecorRef) {
        self.decor = Some(decor);
    }

    pub(crate) fn decor(&self) -> Option<&DecorRef> {
        self.decor.as_ref()
    }

    /// Install the input-binding collaborator.
    pub fn set_input_sink(&mut self, sink: InputSinkRef) {
        self.input = Some(sink);
    }

    // =========================================================================
    // REGISTRY ACCESS
    // =========================================================================

    /// The registered value for a node, if it has been loaded.
    #[must_use]
    pub fn get_registered(&self, node: &Node) -> Option<Value> {
        self.registry.get(node)
    }

    /// Record a value constructed outside the normal flow, such as the
    /// designated root singleton.
    pub fn register(&mut self, node: &Node, value: Value) {
        self.registry.insert(node.clone(), value);
    }

    /// The node a loaded value was registered under, if any.
    #[must_use]
    pub fn node_for(&self, value: &Value) -> Option<Node> {
        self.registry.node_for(value)
    }

    /// Resolve a named node by URI.
    pub fn bean(&mut self, uri: &str) -> Result<Value, GraftError> {
        self.resolve(&Term::Node(Node::named(uri)), None)
    }

    // =========================================================================
    // VALUE RESOLUTION
    // =========================================================================

    /// Resolve a descriptor into a runtime value.
    ///
    /// `parent` is the enclosing bean context satisfying relative
    /// references. Resolution is referentially transparent for registered
    /// bean nodes and side-effecting for everything temporary, anonymous,
    /// or method-shaped.
    pub fn resolve(&mut self, term: &Term, parent: Option<&Value>) -> Result<Value, GraftError> {
        let result = self.resolve_nested(term, parent);
        self.eval.clear();
        result
    }

    /// Resolution entry that keeps the current evaluation stack, for
    /// recursive use inside an ongoing resolution.
    pub(crate) fn resolve_nested(
        &mut self,
        term: &Term,
        parent: Option<&Value>,
    ) -> Result<Value, GraftError> {
        match term {
            Term::Literal(literal) => literal.parse(),
            Term::Node(node) => self.resolve_node(node, parent),
        }
    }

    fn resolve_node(&mut self, node: &Node, parent: Option<&Value>) -> Result<Value, GraftError> {
        // The parent marker carries no frame; it cannot recurse.
        if *node == vocab::parent_marker() {
            return Ok(parent.cloned().unwrap_or(Value::Null));
        }
        self.enter(node)?;
        let result = self.dispatch(node, parent);
        self.leave(node);
        result
    }

    fn enter(&mut self, node: &Node) -> Result<(), GraftError> {
        if self.eval.contains(node) {
            return Err(GraftError::RecursiveDefinition(node.clone()));
        }
        if self.eval.len() >= MAX_RESOLVE_DEPTH {
            return Err(GraftError::ResolutionDepth(node.clone()));
        }
        self.eval.push(node.clone());
        Ok(())
    }

    fn leave(&mut self, node: &Node) {
        if self.eval.last() == Some(node) {
            self.eval.pop();
        }
    }

    /// Dispatch over the shape of the node's edges. First match wins; this
    /// priority order is a contract, not an accident.
    fn dispatch(&mut self, node: &Node, parent: Option<&Value>) -> Result<Value, GraftError> {
        if let Some(term) = self.graph.first_edge(node, vocab::ADDRESS_OF) {
            // Pass the raw graph reference through uninstantiated.
            let target = term.as_node().ok_or(GraftError::NotANode {
                node: node.clone(),
                relation: vocab::ADDRESS_OF,
            })?;
            return Ok(Value::Node(target.clone()));
        }
        if self.graph.has_edge(node, vocab::LISTENER_BEAN) {
            return self.resolve_listener(node, parent);
        }
        if self.graph.has_edge(node, vocab::PROPERTY_NAME) {
            return self.resolve_property_read(node, parent);
        }
        if vocab::is_bean(&self.graph, node) {
            return self.resolve_bean(node, parent);
        }
        if self.graph.has_edge(node, vocab::REST) {
            return self.resolve_cell(node, parent);
        }
        if *node == vocab::nil() {
            return Ok(Value::List(Vec::new()));
        }
        if self.graph.is_of_type(node, vocab::ACTION) {
            return self.resolve_action(node);
        }
        if self.graph.has_edge(node, vocab::METHOD_NAME) {
            return self.resolve_invocation(node, parent);
        }
        // Unknown shape: the caller knows what to do with the reference.
        Ok(Value::Node(node.clone()))
    }

    fn resolve_listener(
        &mut self,
        node: &Node,
        parent: Option<&Value>,
    ) -> Result<Value, GraftError> {
        let bean_term = self
            .graph
            .first_edge(node, vocab::LISTENER_BEAN)
            .ok_or(GraftError::MissingEdge {
                node: node.clone(),
                relation: vocab::LISTENER_BEAN,
            })?;
        let property = self.literal_text(node, vocab::LISTENER_TYPE)?;

        let owner = self.resolve_nested(&bean_term, parent)?;
        let handle = owner.as_object().ok_or_else(|| GraftError::NotAnInstance {
            context: format!("listener {node}"),
            found: owner.kind().to_string(),
        })?;
        let listener = binder::get_property(handle, &property)?;
        match listener {
            Value::Handler(_) => Ok(listener),
            _ => Err(GraftError::NotAHandler(node.clone())),
        }
    }

    fn resolve_property_read(
        &mut self,
        node: &Node,
        parent: Option<&Value>,
    ) -> Result<Value, GraftError> {
        let property = self.literal_text(node, vocab::PROPERTY_NAME)?;
        let owner = match self.graph.first_edge(node, vocab::PROPERTY_OF) {
            Some(owner_term) => self.resolve_nested(&owner_term, parent)?,
            None => parent.cloned().ok_or_else(|| GraftError::MissingContext {
                node: node.clone(),
                property: property.clone(),
            })?,
        };
        let handle = owner.as_object().ok_or_else(|| GraftError::NotAnInstance {
            context: format!("property {property:?} of {node}"),
            found: owner.kind().to_string(),
        })?;
        binder::get_property(handle, &property)
    }

    fn resolve_bean(&mut self, node: &Node, parent: Option<&Value>) -> Result<Value, GraftError> {
        if let Some(existing) = self.registry.get(node) {
            return Ok(existing);
        }
        let value = self.construct_bean(node, parent)?;
        self.initialize(&value, parent, node)?;
        if !node.is_anonymous() && !vocab::is_temporary_bean(&self.graph, node) {
            self.registry.insert(node.clone(), value.clone());
        }
        Ok(value)
    }

    fn construct_bean(
        &mut self,
        node: &Node,
        parent: Option<&Value>,
    ) -> Result<Value, GraftError> {
        if self.graph.has_edge(node, vocab::TYPE_NAME) {
            let type_name = self.literal_text(node, vocab::TYPE_NAME)?;
            let handle = self.factories.construct(&type_name)?;
            Ok(Value::Object(handle))
        } else if self.graph.has_edge(node, vocab::PROPERTY_NAME) {
            // Inline bean: defined as the value of another bean's property.
            self.resolve_property_read(node, parent)
        } else {
            Err(GraftError::InvalidBean(node.clone()))
        }
    }

    fn resolve_cell(&mut self, node: &Node, parent: Option<&Value>) -> Result<Value, GraftError> {
        let first_term =
            self.graph
                .first_edge(node, vocab::FIRST)
                .ok_or(GraftError::MissingEdge {
                    node: node.clone(),
                    relation: vocab::FIRST,
                })?;
        let rest_term =
            self.graph
                .first_edge(node, vocab::REST)
                .ok_or(GraftError::MissingEdge {
                    node: node.clone(),
                    relation: vocab::REST,
                })?;

        let head = self.resolve_nested(&first_term, parent)?;
        let tail = self.resolve_nested(&rest_term, parent)?;
        match tail {
            Value::List(mut items) => {
                items.insert(0, head);
                Ok(Value::List(items))
            }
            other => Err(GraftError::NotAList {
                context: format!("tail of list cell {node}"),
                found: other.kind().to_string(),
            }),
        }
    }

    fn resolve_action(&mut self, node: &Node) -> Result<Value, GraftError> {
        if let Some(existing) = self.registry.get(node) {
            return match existing {
                Value::Handler(_) => Ok(existing),
                _ => Err(GraftError::NotAHandler(node.clone())),
            };
        }
        let proxy = Actionator::from_node(self, node)?;
        let value = Value::Handler(proxy);
        self.registry.insert(node.clone(), value.clone());
        Ok(value)
    }

    fn resolve_invocation(
        &mut self,
        node: &Node,
        parent: Option<&Value>,
    ) -> Result<Value, GraftError> {
        let method = self.literal_text(node, vocab::METHOD_NAME)?;

        let target = match self.graph.first_edge(node, vocab::INVOKED_ON) {
            Some(target_term) => self.resolve_nested(&target_term, parent)?,
            None => parent.cloned().unwrap_or(Value::Null),
        };

        let args = match self.graph.first_edge(node, vocab::PARAMETERS) {
            Some(params_term) => {
                let resolved = self.resolve_nested(&params_term, parent)?;
                match resolved {
                    Value::List(items) => items,
                    other => {
                        return Err(GraftError::NotAList {
                            context: format!("parameters of {node}"),
                            found: other.kind().to_string(),
                        });
                    }
                }
            }
            None => Vec::new(),
        };

        let signature = match self.graph.first_edge(node, vocab::PARAMETER_TYPES) {
            Some(types_term) => {
                let resolved = self.resolve_nested(&types_term, parent)?;
                let entries = match resolved {
                    Value::List(items) => items,
                    other => {
                        return Err(GraftError::NotAList {
                            context: format!("parameter types of {node}"),
                            found: other.kind().to_string(),
                        });
                    }
                };
                let mut slots = Vec::with_capacity(entries.len());
                for entry in &entries {
                    // A type name selects the slot; any other entry stands
                    // in for a value of its own type.
                    match entry {
                        Value::Str(name) => slots.push(TypeTag::parse(name)?),
                        other => slots.push(TypeTag::of(other)),
                    }
                }
                Signature::new(slots)
            }
            None => Signature::infer(&args),
        };

        let handle = target
            .as_object()
            .ok_or_else(|| GraftError::NotAnInstance {
                context: format!("invoking {method:?} from {node}"),
                found: target.kind().to_string(),
            })?
            .clone();
        binder::invoke_method(&handle, &method, &signature, args)
    }

    fn literal_text(&self, node: &Node, relation: &'static str) -> Result<String, GraftError> {
        let term = self
            .graph
            .first_edge(node, relation)
            .ok_or_else(|| GraftError::MissingEdge {
                node: node.clone(),
                relation,
            })?;
        match term {
            Term::Literal(literal) => Ok(literal.lexical().to_string()),
            Term::Node(_) => Err(GraftError::NotALiteral {
                node: node.clone(),
                relation,
            }),
        }
    }

    // =========================================================================
    // TWO-PHASE LIFECYCLE
    // =========================================================================

    /// Load and initialize every bean reachable from `root` through
    /// `relation` edges.
    ///
    /// Ordering and instantiation failures abort the whole load before any
    /// partial registration. Initialization failures are confined to their
    /// bean: logged, skipped, and the load still succeeds with that bean
    /// left partially configured.
    ///
    /// The root itself maps to a pre-registered value; register the core
    /// singleton before calling this.
    pub fn load_all(&mut self, root: &Node, relation: &str) -> Result<Vec<Node>, GraftError> {
        let members = self.collect_members(root, relation);
        let ordered = order::dependency_order(&self.graph, members, relation)?;

        let mut loaded: Vec<(Node, Value)> = Vec::with_capacity(ordered.len());
        for node in &ordered {
            tracing::debug!(bean = %node, "loading bean");
            let value = if node == root {
                self.registry
                    .get(node)
                    .ok_or_else(|| GraftError::UnregisteredRoot(node.clone()))?
            } else {
                self.instantiate(node)?
            };
            if !node.is_anonymous() && !vocab::is_temporary_bean(&self.graph, node) {
                self.registry.insert(node.clone(), value.clone());
            }
            loaded.push((node.clone(), value));
        }

        for (node, value) in &loaded {
            tracing::debug!(bean = %node, "initializing bean");
            if let Err(error) = self.initialize(value, None, node) {
                tracing::error!(bean = %node, %error, "bean left partially configured");
            }
        }

        Ok(ordered)
    }

    /// Bean nodes reachable from the root through the dependency relation.
    /// Non-bean edge targets are left out here; ordering reports them as
    /// foreign requirements.
    fn collect_members(&self, root: &Node, relation: &str) -> BTreeSet<Node> {
        let mut members = BTreeSet::from([root.clone()]);
        let mut pending = vec![root.clone()];
        while let Some(node) = pending.pop() {
            for term in self.graph.edges(&node, relation) {
                if let Term::Node(target) = term {
                    if !members.contains(&target) && vocab::is_bean(&self.graph, &target) {
                        members.insert(target.clone());
                        pending.push(target);
                    }
                }
            }
        }
        members
    }

    /// Construct a bean instance from its node, without initializing or
    /// registering it.
    pub fn instantiate(&mut self, node: &Node) -> Result<Value, GraftError> {
        self.enter(node)?;
        let result = self.construct_bean(node, None);
        self.leave(node);
        result
    }

    /// Configure a constructed bean from its node: apply properties in
    /// listed order, run invocations, dress and attach windows and
    /// widgets, and forward input bindings.
    ///
    /// `parent` is the enclosing context for relative references in
    /// property values; when absent, the bean itself is the context.
    pub fn initialize(
        &mut self,
        value: &Value,
        parent: Option<&Value>,
        node: &Node,
    ) -> Result<(), GraftError> {
        for term in self.graph.edges(node, vocab::SET_PROPERTY) {
            let descriptor = term
                .as_node()
                .ok_or(GraftError::NotANode {
                    node: node.clone(),
                    relation: vocab::SET_PROPERTY,
                })?
                .clone();
            let context = parent.unwrap_or(value);
            self.apply_property(value, context, node, &descriptor)?;
        }

        for term in self.graph.edges(node, vocab::INVOKE) {
            // Side-effecting invocation; the result is discarded.
            self.resolve_nested(&term, Some(value))?;
        }

        if let Value::Object(handle) = value {
            self.dress_window(handle, node);
            self.attach_to_containers(handle, node)?;
        }

        self.register_bindings(node);
        Ok(())
    }

    fn apply_property(
        &mut self,
        bean_value: &Value,
        context: &Value,
        owner: &Node,
        descriptor: &Node,
    ) -> Result<(), GraftError> {
        let property = self.literal_text(descriptor, vocab::PROPERTY_NAME)?;

        let resolved = if let Some(value_term) =
            self.graph.first_edge(descriptor, vocab::PROPERTY_VALUE)
        {
            self.resolve_nested(&value_term, Some(context))?
        } else if self.graph.has_edge(descriptor, vocab::ICON) {
            match self.decor.as_ref().and_then(|d| d.icon(descriptor)) {
                Some(icon) => icon,
                None => {
                    tracing::debug!(property = %property, bean = %owner, "no icon available");
                    return Ok(());
                }
            }
        } else {
            tracing::warn!(property = %property, bean = %owner, "cannot set property without a value");
            return Ok(());
        };

        let handle = bean_value
            .as_object()
            .ok_or_else(|| GraftError::NotAnInstance {
                context: format!("setting {property:?} on {owner}"),
                found: bean_value.kind().to_string(),
            })?;
        binder::set_property(handle, &property, resolved)
    }

    fn dress_window(&self, handle: &BeanHandle, node: &Node) {
        let Some(decor) = self.decor.as_ref() else {
            return;
        };
        let label = decor.label(node);
        let icon = decor.icon(node);
        let mut bean = handle.borrow_mut();
        let Some(window) = bean.as_window() else {
            return;
        };
        if let Some(label) = label {
            if !label.is_empty() {
                window.set_title(&label);
            }
        }
        if let Some(icon) = icon {
            window.set_icon(icon);
        }
    }

    fn attach_to_containers(&mut self, child: &BeanHandle, node: &Node) -> Result<(), GraftError> {
        for term in self.graph.edges(node, vocab::ADD_TO) {
            let holder_node = term
                .as_node()
                .ok_or(GraftError::NotANode {
                    node: node.clone(),
                    relation: vocab::ADD_TO,
                })?
                .clone();
            let holder_value =
                self.registry
                    .get(&holder_node)
                    .ok_or_else(|| GraftError::UnknownContainer {
                        child: node.clone(),
                        holder: holder_node.clone(),
                    })?;
            let holder = holder_value
                .as_object()
                .ok_or_else(|| GraftError::NotAContainer {
                    child: node.clone(),
                    holder: holder_node.clone(),
                })?;
            if std::ptr::addr_eq(Rc::as_ptr(holder), Rc::as_ptr(child)) {
                return Err(GraftError::SelfAttachment(node.clone()));
            }

            let mut holder_bean = holder.borrow_mut();
            match attach_into(&mut *holder_bean, Rc::clone(child)) {
                Some(Ok(())) => {}
                Some(Err(source)) => {
                    return Err(GraftError::target(
                        format!("attaching {node} to {holder_node}"),
                        source,
                    ));
                }
                None => {
                    return Err(GraftError::NotAContainer {
                        child: node.clone(),
                        holder: holder_node,
                    });
                }
            }
        }
        Ok(())
    }

    fn register_bindings(&self, node: &Node) {
        for relation in vocab::INPUT_TYPES {
            for term in self.graph.edges(node, relation) {
                match &self.input {
                    Some(sink) => sink.bind(node, relation, &term),
                    None => {
                        tracing::debug!(bean = %node, relation, "no input sink; binding skipped");
                    }
                }
            }
        }
    }
}

/// Route an attachment into a bean's container surface: its own, or its
/// window's content area. `None` when the bean has neither.
fn attach_into(bean: &mut dyn Bean, child: BeanHandle) -> Option<Result<(), BeanError>> {
    if let Some(container) = bean.as_container() {
        return Some(container.attach(child));
    }
    let container = bean.as_window()?.content()?;
    Some(container.attach(child))
}

// =============================================================================
// TESTS
// =============================================================================
