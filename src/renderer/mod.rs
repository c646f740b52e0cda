//! Renderer - the patch engine over a host.
//!
//! The renderer owns no tree. It compares a new description against the
//! previous one and issues the minimal host mutations that turn the live
//! tree into the new description; the previous description itself is kept
//! on the [`Container`].
//!
//! # Control Flow
//!
//! ```text
//! render(tree, container)
//!   → patch(previous, next, container.node)
//!       Element/Text/Comment: direct host mutation
//!       Fragment:             children diffed in the container
//!       Component:            component runtime (effect-driven subtree)
//! ```
//!
//! Re-entrant `render` calls on a container while a flush for a component
//! inside it is still pending are a caller error; nothing enforces this at
//! runtime (there is no parallelism to guard against, only interleaving the
//! caller controls).

pub mod children;
pub mod patch;

use std::cell::RefCell;
use std::rc::Rc;

use crate::host::{HostOps, NodeRef};
use crate::vnode::VNode;

/// A host node the engine renders into, plus the persisted "last rendered
/// tree" slot that makes successive [`Renderer::render`] calls diffs.
pub struct Container {
    node: NodeRef,
    tree: RefCell<Option<VNode>>,
}

impl Container {
    pub fn new(node: NodeRef) -> Self {
        Container {
            node,
            tree: RefCell::new(None),
        }
    }

    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    /// The description currently mounted in this container, if any.
    pub fn rendered(&self) -> Option<VNode> {
        self.tree.borrow().clone()
    }
}

/// The patch engine, bound to one host implementation.
///
/// Cheap to clone; component render effects hold clones so their subtree
/// patches go through the same host.
#[derive(Clone)]
pub struct Renderer {
    pub(crate) host: Rc<dyn HostOps>,
}

impl Renderer {
    pub fn new(host: impl HostOps + 'static) -> Self {
        Renderer {
            host: Rc::new(host),
        }
    }

    /// Reconcile `container` towards `vnode`.
    ///
    /// `Some(tree)` mounts (first call) or updates (later calls);
    /// `None` unmounts whatever the container last held, a no-op when it
    /// held nothing.
    pub fn render(&self, vnode: Option<VNode>, container: &Container) {
        let previous = container.tree.borrow().clone();
        match vnode {
            Some(next) => {
                self.patch(previous.as_ref(), &next, &container.node, None);
                *container.tree.borrow_mut() = Some(next);
            }
            None => {
                if let Some(previous) = previous {
                    self.unmount(&previous);
                }
                *container.tree.borrow_mut() = None;
            }
        }
    }
}
