//! Patch dispatch - mount or update one node against its predecessor.
//!
//! `patch` is the single entry every reconciliation step goes through: the
//! root render, each child slot of the keyed differ, and each component
//! subtree. Dispatch is by node kind; a kind mismatch is never diffed, the
//! old subtree is torn down and the new one freshly mounted in its place.

use indexmap::IndexMap;
use tracing::warn;

use ripple_signals::Value;

use crate::component::runtime;
use crate::host::NodeRef;
use crate::renderer::Renderer;
use crate::vnode::{Children, VNode, VNodeKind};

impl Renderer {
    /// Mount (`prev == None`) or update one node. `anchor` positions fresh
    /// mounts inside `container`; `None` appends.
    pub(crate) fn patch(
        &self,
        prev: Option<&VNode>,
        next: &VNode,
        container: &NodeRef,
        anchor: Option<&NodeRef>,
    ) {
        // Kind mismatch: tear down and re-enter as a fresh mount, anchored
        // where the old subtree stood.
        let mut reanchor = None;
        let prev = match prev {
            Some(previous) if !previous.same_kind(next) => {
                reanchor = previous
                    .host_node()
                    .and_then(|node| self.host.next_sibling(&node));
                self.unmount(previous);
                None
            }
            other => other,
        };
        let anchor = reanchor.as_ref().or(anchor);

        match &next.kind {
            VNodeKind::Element(_) => match prev {
                None => self.mount_element(next, container, anchor),
                Some(previous) => self.patch_element(previous, next, container, anchor),
            },
            VNodeKind::Text => match prev {
                None => {
                    let node = self.host.create_text(next.text_payload());
                    next.set_host(node.clone());
                    self.host.insert(&node, container, anchor);
                }
                Some(previous) => match previous.host() {
                    Some(node) => {
                        next.set_host(node.clone());
                        if previous.text_payload() != next.text_payload() {
                            self.host.set_text(&node, next.text_payload());
                        }
                    }
                    None => {
                        warn!("text vnode lost its host handle; remounting");
                        self.patch(None, next, container, anchor);
                    }
                },
            },
            VNodeKind::Comment => match prev.and_then(VNode::host) {
                Some(node) => next.set_host(node),
                None => {
                    let node = self.host.create_comment();
                    next.set_host(node.clone());
                    self.host.insert(&node, container, anchor);
                }
            },
            VNodeKind::Fragment => match prev {
                None => {
                    if let Children::Nodes(nodes) = &next.children {
                        self.mount_children(nodes, container, anchor);
                    }
                }
                // Fragments own no host node; only their children diff,
                // directly against the surrounding container.
                Some(previous) => self.patch_children(previous, next, container),
            },
            VNodeKind::Component(_) => match prev {
                None => runtime::mount_component(self, next, container, anchor),
                Some(previous) => runtime::patch_component(self, previous, next),
            },
        }
    }

    fn mount_element(&self, vnode: &VNode, container: &NodeRef, anchor: Option<&NodeRef>) {
        let VNodeKind::Element(tag) = &vnode.kind else {
            return;
        };
        let element = self.host.create_element(tag);
        vnode.set_host(element.clone());

        match &vnode.children {
            Children::Text(content) => self.host.set_element_text(&element, content),
            Children::Nodes(nodes) => {
                for child in nodes {
                    self.patch(None, child, &element, None);
                }
            }
            Children::None => {}
        }

        for (name, value) in &vnode.props {
            self.host.patch_prop(&element, name, None, Some(value));
        }

        self.host.insert(&element, container, anchor);
    }

    fn patch_element(
        &self,
        prev: &VNode,
        next: &VNode,
        container: &NodeRef,
        anchor: Option<&NodeRef>,
    ) {
        let Some(element) = prev.host() else {
            warn!("element vnode lost its host handle; remounting");
            self.patch(None, next, container, anchor);
            return;
        };
        next.set_host(element.clone());
        self.patch_props(&element, &prev.props, &next.props);
        self.patch_children(prev, next, &element);
    }

    /// Apply prop differences: changed and added keys are set, keys absent
    /// from the new props are removed (`next == None`), so nothing stale
    /// survives on the host node.
    fn patch_props(
        &self,
        element: &NodeRef,
        prev: &IndexMap<String, Value>,
        next: &IndexMap<String, Value>,
    ) {
        for (name, value) in next {
            let old = prev.get(name);
            if old != Some(value) {
                self.host.patch_prop(element, name, old, Some(value));
            }
        }
        for (name, value) in prev {
            if !next.contains_key(name) {
                self.host.patch_prop(element, name, Some(value), None);
            }
        }
    }

    pub(crate) fn mount_children(
        &self,
        nodes: &[VNode],
        container: &NodeRef,
        anchor: Option<&NodeRef>,
    ) {
        for child in nodes {
            self.patch(None, child, container, anchor);
        }
    }

    /// Tear one subtree down.
    ///
    /// Fragments unmount child by child; components dispose their render
    /// effect before their subtree goes (no post-unmount callbacks can
    /// fire); host-owning nodes detach from their host parent, after every
    /// component buried in their children has been deactivated.
    pub(crate) fn unmount(&self, vnode: &VNode) {
        match &vnode.kind {
            VNodeKind::Fragment => {
                if let Children::Nodes(nodes) = &vnode.children {
                    for child in nodes {
                        self.unmount(child);
                    }
                }
            }
            VNodeKind::Component(_) => {
                if let Some(instance) = vnode.instance() {
                    instance.dispose_effect();
                    if let Some(sub_tree) = instance.take_sub_tree() {
                        self.unmount(&sub_tree);
                    }
                    instance.set_mounted(false);
                }
            }
            VNodeKind::Element(_) => {
                if let Children::Nodes(nodes) = &vnode.children {
                    for child in nodes {
                        self.deactivate(child);
                    }
                }
                self.remove_host_node(vnode);
            }
            VNodeKind::Text | VNodeKind::Comment => self.remove_host_node(vnode),
        }
    }

    /// Dispose every component render effect in a subtree without touching
    /// the host: the subtree's root host node is being removed wholesale,
    /// so individual removals would be wasted host calls.
    fn deactivate(&self, vnode: &VNode) {
        if let VNodeKind::Component(_) = &vnode.kind {
            if let Some(instance) = vnode.instance() {
                instance.dispose_effect();
                if let Some(sub_tree) = instance.take_sub_tree() {
                    self.deactivate(&sub_tree);
                }
                instance.set_mounted(false);
            }
            return;
        }
        if let Children::Nodes(nodes) = &vnode.children {
            for child in nodes {
                self.deactivate(child);
            }
        }
    }

    fn remove_host_node(&self, vnode: &VNode) {
        if let Some(node) = vnode.host() {
            if let Some(parent) = self.host.parent(&node) {
                self.host.remove_child(&node, &parent);
            }
        }
    }
}
