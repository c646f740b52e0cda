//! Host operations interface.
//!
//! The engine never touches a concrete presentation layer. Every mutation it
//! wants goes through [`HostOps`], a small set of synchronous primitives the
//! embedder implements for its target (a browser DOM, a terminal scene
//! graph, a test double). All operations are assumed infallible at this
//! layer; host-level failures are the embedder's problem.
//!
//! Host nodes are opaque to the engine: it stores and forwards [`NodeRef`]
//! handles, compares them by identity, and never looks inside.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use ripple_signals::Value;

/// An opaque, cloneable handle to one host node.
///
/// The embedder puts whatever node representation it likes inside; the
/// engine only clones, stores and compares handles. Identity is handle
/// identity ([`NodeRef::ptr_eq`]), so two handles to the same host node must
/// be clones of one `NodeRef`.
#[derive(Clone)]
pub struct NodeRef(Rc<dyn Any>);

impl NodeRef {
    /// Wrap a host node value.
    pub fn new<T: Any>(node: T) -> Self {
        NodeRef(Rc::new(node))
    }

    /// Borrow the underlying node, if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Do two handles refer to the same host node?
    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeRef({:p})", Rc::as_ptr(&self.0))
    }
}

/// The primitive mutation operations the engine drives a host with.
///
/// Implementations must be synchronous and side-effecting; the engine calls
/// them in the exact order its diff decides and never retries.
pub trait HostOps {
    /// Create an element node for `tag`.
    fn create_element(&self, tag: &str) -> NodeRef;

    /// Replace the entire text content of an element.
    fn set_element_text(&self, node: &NodeRef, text: &str);

    /// Insert `node` into `parent`, before `anchor` (append when `None`).
    ///
    /// Inserting an already-attached node moves it: the host must detach it
    /// from its current parent first.
    fn insert(&self, node: &NodeRef, parent: &NodeRef, anchor: Option<&NodeRef>);

    /// The node's current parent, if attached.
    fn parent(&self, node: &NodeRef) -> Option<NodeRef>;

    /// Detach `node` from `parent`.
    fn remove_child(&self, node: &NodeRef, parent: &NodeRef);

    /// Apply one property/attribute change. `next == None` signals removal,
    /// so stale attributes are cleared rather than left behind.
    ///
    /// Convention for hosts with typed fields: a boolean-typed field
    /// receiving an empty-string value is coerced to `true`, supporting
    /// presence-shorthand authoring (`disabled=""`).
    fn patch_prop(&self, node: &NodeRef, key: &str, prev: Option<&Value>, next: Option<&Value>);

    /// Create a text node.
    fn create_text(&self, text: &str) -> NodeRef;

    /// Update a text node's content in place.
    fn set_text(&self, node: &NodeRef, text: &str);

    /// Create a comment node.
    fn create_comment(&self) -> NodeRef;

    /// The node's next sibling, if any.
    fn next_sibling(&self, node: &NodeRef) -> Option<NodeRef>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ref_identity() {
        let a = NodeRef::new(1u32);
        let b = a.clone();
        let c = NodeRef::new(1u32);

        assert!(a.ptr_eq(&b), "clones share identity");
        assert!(!a.ptr_eq(&c), "distinct handles differ even with equal payloads");
    }

    #[test]
    fn test_node_ref_downcast() {
        let node = NodeRef::new("payload".to_string());
        assert_eq!(node.downcast_ref::<String>().map(String::as_str), Some("payload"));
        assert!(node.downcast_ref::<u32>().is_none());
    }
}
