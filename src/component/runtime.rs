//! Component mount/update machinery.
//!
//! Called from the renderer's kind dispatch. Mounting builds the instance
//! in the fixed lifecycle order and registers the render effect; updating
//! re-resolves props onto the existing instance and lets reactivity carry
//! the change into the next scheduled render.
//!
//! # Lifecycle ordering
//!
//! ```text
//! before_create
//!   → reactive(data()) → shallow_reactive(props) → context → created
//!   → render effect registered (scheduler-routed)
//!     first run:  before_mount → patch(None, subtree) → mounted
//!     later runs: before_update → patch(old, new subtree) → updated
//! ```

use indexmap::IndexMap;
use tracing::{trace, warn};

use ripple_signals::{effect_with_scheduler, reactive, shallow_reactive, untrack, MapEntries, Value};

use crate::component::definition::{ComponentDefinition, Lifecycle};
use crate::component::instance::ComponentInstance;
use crate::host::NodeRef;
use crate::renderer::Renderer;
use crate::scheduler::queue_job;
use crate::vnode::{VNode, VNodeKind};

/// Mount a component-kind vnode: build the instance, run the creation
/// lifecycle, register the scheduler-routed render effect (whose immediate
/// first run mounts the subtree).
pub(crate) fn mount_component(
    renderer: &Renderer,
    vnode: &VNode,
    container: &NodeRef,
    anchor: Option<&NodeRef>,
) {
    let VNodeKind::Component(definition) = &vnode.kind else {
        return;
    };
    let definition = definition.clone();
    trace!(component = definition.name(), "mounting component");

    let (declared, attrs) = partition_props(&definition, &vnode.props);

    definition.emit_before_create();
    let state = reactive(definition.initial_data());
    let props = shallow_reactive(declared);
    let instance = ComponentInstance::new(definition.clone(), state, props, attrs);
    let context = instance.context();
    definition.emit(Lifecycle::Created, &context);

    vnode.set_instance(instance.clone());

    let job_renderer = renderer.clone();
    let job_instance = instance.clone();
    let job_container = container.clone();
    let job_anchor = anchor.cloned();
    let render_effect = effect_with_scheduler(
        move || run_render_job(&job_renderer, &job_instance, &job_container, job_anchor.as_ref()),
        |job| queue_job(job.clone()),
    );
    instance.set_effect(render_effect);
}

/// One run of a component's render effect: mount on the first run, diff the
/// subtree against its predecessor on every later one.
fn run_render_job(
    renderer: &Renderer,
    instance: &ComponentInstance,
    container: &NodeRef,
    anchor: Option<&NodeRef>,
) {
    let definition = instance.definition();
    let context = instance.context();

    if !instance.is_mounted() {
        definition.emit(Lifecycle::BeforeMount, &context);
        let sub_tree = definition.render(&context);
        renderer.patch(None, &sub_tree, container, anchor);
        instance.set_sub_tree(sub_tree);
        instance.set_mounted(true);
        definition.emit(Lifecycle::Mounted, &context);
    } else {
        definition.emit(Lifecycle::BeforeUpdate, &context);
        let next = definition.render(&context);
        let previous = instance.sub_tree();
        renderer.patch(previous.as_ref(), &next, container, anchor);
        instance.set_sub_tree(next);
        definition.emit(Lifecycle::Updated, &context);
    }
}

/// Update a component-kind vnode in place: carry the instance forward and
/// re-resolve props onto its reactive props container. Each changed prop
/// write is independently observable; the render effect picks the batch up
/// through the scheduler.
pub(crate) fn patch_component(_renderer: &Renderer, prev: &VNode, next: &VNode) {
    let Some(instance) = prev.instance() else {
        warn!("component vnode patched before it was mounted; skipping");
        return;
    };
    next.set_instance(instance.clone());

    if !props_changed(&prev.props, &next.props) {
        return;
    }
    trace!(component = instance.definition().name(), "props changed, re-resolving");

    let (declared, attrs) = partition_props(instance.definition(), &next.props);
    // Prop re-resolution may run inside an ancestor's render effect; the
    // bookkeeping reads here must not subscribe it to this child's props.
    untrack(|| {
        for (name, value) in &declared {
            instance.props().insert(name, value.clone());
        }
        let stale: Vec<String> = instance
            .props()
            .keys()
            .into_iter()
            .filter(|name| !declared.contains_key(name))
            .collect();
        for name in stale {
            instance.props().remove(&name);
        }
    });
    instance.set_attrs(attrs);
}

/// Split incoming vnode props into (declared props, passthrough attrs).
pub(crate) fn partition_props(
    definition: &ComponentDefinition,
    incoming: &IndexMap<String, Value>,
) -> (MapEntries, MapEntries) {
    let mut declared = MapEntries::new();
    let mut attrs = MapEntries::new();
    for (name, value) in incoming {
        if definition.declares_prop(name) {
            declared.insert(name.clone(), value.clone());
        } else {
            attrs.insert(name.clone(), value.clone());
        }
    }
    (declared, attrs)
}

/// Did the props change between two descriptions of the same component?
///
/// Key-set size mismatch is an immediate yes; otherwise any value differing
/// by equality (identity for map-valued props) is a yes.
fn props_changed(prev: &IndexMap<String, Value>, next: &IndexMap<String, Value>) -> bool {
    if prev.len() != next.len() {
        return true;
    }
    next.iter().any(|(name, value)| prev.get(name) != Some(value))
}

// =============================================================================
// Tests
// =============================================================================
