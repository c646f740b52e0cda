//! Component instances - per-mount runtime records.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ripple_signals::{Effect, MapEntries, ReactiveMap};

use crate::component::context::RenderContext;
use crate::component::definition::ComponentDefinition;
use crate::vnode::VNode;

/// The runtime record behind one mounted component-kind vnode.
///
/// Cloning clones the handle; the patch path clones instances from the
/// previous vnode onto the next one so identity (and all state) carries
/// forward across re-renders. The instance lives exactly as long as its
/// owning vnode stays mounted: unmounting disposes the render effect, which
/// is what prevents any further scheduled update from touching the host.
#[derive(Clone)]
pub struct ComponentInstance {
    inner: Rc<InstanceInner>,
}

struct InstanceInner {
    definition: Rc<ComponentDefinition>,
    state: ReactiveMap,
    props: ReactiveMap,
    attrs: RefCell<MapEntries>,
    mounted: Cell<bool>,
    sub_tree: RefCell<Option<VNode>>,
    effect: RefCell<Option<Effect>>,
}

impl ComponentInstance {
    pub(crate) fn new(
        definition: Rc<ComponentDefinition>,
        state: ReactiveMap,
        props: ReactiveMap,
        attrs: MapEntries,
    ) -> Self {
        ComponentInstance {
            inner: Rc::new(InstanceInner {
                definition,
                state,
                props,
                attrs: RefCell::new(attrs),
                mounted: Cell::new(false),
                sub_tree: RefCell::new(None),
                effect: RefCell::new(None),
            }),
        }
    }

    pub fn definition(&self) -> &ComponentDefinition {
        &self.inner.definition
    }

    /// The reactive local-state container.
    pub fn state(&self) -> &ReactiveMap {
        &self.inner.state
    }

    /// The reactive props container (declared props only).
    pub fn props(&self) -> &ReactiveMap {
        &self.inner.props
    }

    /// Snapshot of the passthrough attributes that did not match a declared
    /// prop name. Forwarding them anywhere is the embedder's business.
    pub fn attrs(&self) -> MapEntries {
        self.inner.attrs.borrow().clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.get()
    }

    /// The most recently rendered subtree, the "previous" side of the next
    /// reconciliation.
    pub fn sub_tree(&self) -> Option<VNode> {
        self.inner.sub_tree.borrow().clone()
    }

    /// The merged state/props view handed to render and lifecycle code.
    pub fn context(&self) -> RenderContext {
        RenderContext::new(self.clone())
    }

    /// Identity comparison between handles.
    pub fn ptr_eq(&self, other: &ComponentInstance) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn set_mounted(&self, mounted: bool) {
        self.inner.mounted.set(mounted);
    }

    pub(crate) fn set_sub_tree(&self, sub_tree: VNode) {
        *self.inner.sub_tree.borrow_mut() = Some(sub_tree);
    }

    pub(crate) fn take_sub_tree(&self) -> Option<VNode> {
        self.inner.sub_tree.borrow_mut().take()
    }

    pub(crate) fn set_attrs(&self, attrs: MapEntries) {
        *self.inner.attrs.borrow_mut() = attrs;
    }

    pub(crate) fn set_effect(&self, effect: Effect) {
        *self.inner.effect.borrow_mut() = Some(effect);
    }

    /// Stop and drop the render effect. Dropping the handle is what lets
    /// the effect's captures (including this instance) be freed; the
    /// instance→effect→instance cycle is broken exactly here.
    pub(crate) fn dispose_effect(&self) {
        if let Some(effect) = self.inner.effect.borrow_mut().take() {
            effect.stop();
        }
    }
}
