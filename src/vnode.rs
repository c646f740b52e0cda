//! Virtual nodes - the declarative description of a desired tree.
//!
//! A [`VNode`] describes one presentation unit: an element, a text run, a
//! comment, a fragment of siblings, or a component. Descriptions are built
//! by the caller each render; the engine diffs a description against its
//! predecessor and mutates the host to match.
//!
//! Two slots on a node are *not* descriptive: the host handle and the
//! component instance. They are back-references populated by the mount path
//! and carried forward by the patch path, so the next diff can find the real
//! host node (and the live instance) behind the previous description.
//! Cloning a `VNode` is cheap and clones alias these slots.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use ripple_signals::Value;

use crate::component::{ComponentDefinition, ComponentInstance};
use crate::host::NodeRef;

// =============================================================================
// Kind
// =============================================================================

/// What a [`VNode`] describes.
///
/// A proper tagged union: element tags, the text/comment/fragment sentinels
/// and component definitions are distinct variants, never one overloaded
/// field.
#[derive(Clone)]
pub enum VNodeKind {
    /// A host element with the given tag.
    Element(String),
    /// A text node; the payload lives in [`Children::Text`].
    Text,
    /// A comment node. Comments carry no diffable content.
    Comment,
    /// A sequence of children with no host node of its own.
    Fragment,
    /// A component; many nodes may share one definition.
    Component(Rc<ComponentDefinition>),
}

impl VNodeKind {
    /// Same-slot comparison: may the two kinds be diffed against each other?
    ///
    /// Elements match by tag, components by definition identity. Anything
    /// else is a full teardown followed by a fresh mount.
    pub fn same(&self, other: &VNodeKind) -> bool {
        match (self, other) {
            (VNodeKind::Element(a), VNodeKind::Element(b)) => a == b,
            (VNodeKind::Text, VNodeKind::Text) => true,
            (VNodeKind::Comment, VNodeKind::Comment) => true,
            (VNodeKind::Fragment, VNodeKind::Fragment) => true,
            (VNodeKind::Component(a), VNodeKind::Component(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for VNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VNodeKind::Element(tag) => write!(f, "Element({tag})"),
            VNodeKind::Text => write!(f, "Text"),
            VNodeKind::Comment => write!(f, "Comment"),
            VNodeKind::Fragment => write!(f, "Fragment"),
            VNodeKind::Component(def) => write!(f, "Component({})", def.name()),
        }
    }
}

// =============================================================================
// Key
// =============================================================================

/// Stable identity token for keyed child diffing, unique among siblings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(value as i64)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

// =============================================================================
// Children
// =============================================================================

/// The three children shapes a node can carry.
#[derive(Clone, Debug)]
pub enum Children {
    /// No children.
    None,
    /// A single text payload.
    Text(String),
    /// An ordered child list.
    Nodes(Vec<VNode>),
}

// =============================================================================
// VNode
// =============================================================================

/// One node of a virtual tree. See the module docs for the slot semantics.
#[derive(Clone)]
pub struct VNode {
    pub(crate) kind: VNodeKind,
    pub(crate) props: IndexMap<String, Value>,
    pub(crate) children: Children,
    pub(crate) key: Option<Key>,
    host: Rc<RefCell<Option<NodeRef>>>,
    instance: Rc<RefCell<Option<ComponentInstance>>>,
}

impl VNode {
    fn new(kind: VNodeKind) -> Self {
        VNode {
            kind,
            props: IndexMap::new(),
            children: Children::None,
            key: None,
            host: Rc::new(RefCell::new(None)),
            instance: Rc::new(RefCell::new(None)),
        }
    }

    // =========================================================================
    // Builders
    // =========================================================================

    /// Set one prop.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    /// Set the diffing key.
    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Append one child node.
    pub fn child(mut self, node: VNode) -> Self {
        match &mut self.children {
            Children::Nodes(nodes) => nodes.push(node),
            _ => self.children = Children::Nodes(vec![node]),
        }
        self
    }

    /// Replace the children with an ordered list.
    pub fn children(mut self, nodes: Vec<VNode>) -> Self {
        self.children = Children::Nodes(nodes);
        self
    }

    /// Replace the children with a single text payload.
    pub fn text(mut self, content: impl Into<String>) -> Self {
        self.children = Children::Text(content.into());
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn kind(&self) -> &VNodeKind {
        &self.kind
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn props(&self) -> &IndexMap<String, Value> {
        &self.props
    }

    /// Same-slot comparison; see [`VNodeKind::same`].
    pub fn same_kind(&self, other: &VNode) -> bool {
        self.kind.same(&other.kind)
    }

    /// The live component instance, once mounted (component kind only).
    pub fn instance(&self) -> Option<ComponentInstance> {
        self.instance.borrow().clone()
    }

    /// The host handle this node produced, once mounted.
    pub fn host(&self) -> Option<NodeRef> {
        self.host.borrow().clone()
    }

    pub(crate) fn set_host(&self, node: NodeRef) {
        *self.host.borrow_mut() = Some(node);
    }

    pub(crate) fn set_instance(&self, instance: ComponentInstance) {
        *self.instance.borrow_mut() = Some(instance);
    }

    /// Text payload for text-children nodes; empty otherwise.
    pub(crate) fn text_payload(&self) -> &str {
        match &self.children {
            Children::Text(content) => content,
            _ => "",
        }
    }

    /// Resolve the concrete host node behind this description, for
    /// anchoring and moves.
    ///
    /// Fragments resolve through their first child, components through their
    /// instance's current subtree. A multi-root fragment therefore moves via
    /// its first host node only; minimal-move guarantees apply to
    /// single-root children.
    pub fn host_node(&self) -> Option<NodeRef> {
        match &self.kind {
            VNodeKind::Fragment => match &self.children {
                Children::Nodes(nodes) => nodes.first()?.host_node(),
                _ => None,
            },
            VNodeKind::Component(_) => {
                let instance = self.instance.borrow().clone()?;
                let sub_tree = instance.sub_tree()?;
                sub_tree.host_node()
            }
            _ => self.host.borrow().clone(),
        }
    }
}

// Keeping Debug readable without dumping the whole subtree.
impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("VNode");
        out.field("kind", &self.kind);
        if let Some(key) = &self.key {
            out.field("key", key);
        }
        out.finish_non_exhaustive()
    }
}

// =============================================================================
// Constructors
// =============================================================================

/// Describe a host element.
pub fn element(tag: impl Into<String>) -> VNode {
    VNode::new(VNodeKind::Element(tag.into()))
}

/// Describe a text node.
pub fn text(content: impl Into<String>) -> VNode {
    let mut node = VNode::new(VNodeKind::Text);
    node.children = Children::Text(content.into());
    node
}

/// Describe a comment node.
pub fn comment() -> VNode {
    VNode::new(VNodeKind::Comment)
}

/// Describe a fragment: children mounted directly into the parent, with no
/// host node of their own.
pub fn fragment(children: Vec<VNode>) -> VNode {
    let mut node = VNode::new(VNodeKind::Fragment);
    node.children = Children::Nodes(children);
    node
}

/// Describe a component occurrence of `definition`.
pub fn component(definition: &Rc<ComponentDefinition>) -> VNode {
    VNode::new(VNodeKind::Component(definition.clone()))
}

// =============================================================================
// Tests
// =============================================================================
