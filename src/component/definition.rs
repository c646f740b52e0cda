//! Component definitions - the static description of a component type.

use ripple_signals::MapEntries;

use crate::component::context::RenderContext;
use crate::vnode::VNode;

type DataFactory = Box<dyn Fn() -> MapEntries>;
type RenderFn = Box<dyn Fn(&RenderContext) -> VNode>;
type Hook = Box<dyn Fn(&RenderContext)>;

/// The lifecycle stages that receive a render context.
///
/// `before_create` is not here: it fires before any state exists, so it
/// takes no context and is emitted separately.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    Created,
    BeforeMount,
    Mounted,
    BeforeUpdate,
    Updated,
}

/// Static description of a component type.
///
/// Immutable once built; many instances may share one definition through an
/// `Rc`. Definition identity (not structure) decides whether two
/// component vnodes describe the same component type.
///
/// # Example
///
/// ```ignore
/// use ripple_render::{element, ComponentDefinition};
/// use ripple_signals::Value;
/// use indexmap::indexmap;
///
/// let counter = ComponentDefinition::new("counter", |ctx| {
///     element("p").text(format!("{:?}", ctx.get("count")))
/// })
/// .props(["label"])
/// .data(|| indexmap! { "count".to_string() => Value::Int(0) })
/// .on_mounted(|ctx| ctx.set("count", Value::Int(1)));
/// ```
pub struct ComponentDefinition {
    name: String,
    prop_names: Vec<String>,
    data: Option<DataFactory>,
    render: RenderFn,
    before_create: Option<Box<dyn Fn()>>,
    created: Option<Hook>,
    before_mount: Option<Hook>,
    mounted: Option<Hook>,
    before_update: Option<Hook>,
    updated: Option<Hook>,
}

impl ComponentDefinition {
    /// Create a definition from its name and render function.
    pub fn new(name: impl Into<String>, render: impl Fn(&RenderContext) -> VNode + 'static) -> Self {
        ComponentDefinition {
            name: name.into(),
            prop_names: Vec::new(),
            data: None,
            render: Box::new(render),
            before_create: None,
            created: None,
            before_mount: None,
            mounted: None,
            before_update: None,
            updated: None,
        }
    }

    /// Declare the prop names this component accepts. Incoming vnode props
    /// outside this set land in the instance's attrs bag instead.
    pub fn props<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.prop_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the factory producing the initial local state.
    pub fn data(mut self, factory: impl Fn() -> MapEntries + 'static) -> Self {
        self.data = Some(Box::new(factory));
        self
    }

    /// Runs before the instance's state is constructed.
    pub fn on_before_create(mut self, hook: impl Fn() + 'static) -> Self {
        self.before_create = Some(Box::new(hook));
        self
    }

    /// Runs once state and props exist, before the first render.
    pub fn on_created(mut self, hook: impl Fn(&RenderContext) + 'static) -> Self {
        self.created = Some(Box::new(hook));
        self
    }

    /// Runs right before the first subtree mount.
    pub fn on_before_mount(mut self, hook: impl Fn(&RenderContext) + 'static) -> Self {
        self.before_mount = Some(Box::new(hook));
        self
    }

    /// Runs right after the first subtree mount.
    pub fn on_mounted(mut self, hook: impl Fn(&RenderContext) + 'static) -> Self {
        self.mounted = Some(Box::new(hook));
        self
    }

    /// Runs before every re-render triggered by a state or prop change.
    pub fn on_before_update(mut self, hook: impl Fn(&RenderContext) + 'static) -> Self {
        self.before_update = Some(Box::new(hook));
        self
    }

    /// Runs after every re-render.
    pub fn on_updated(mut self, hook: impl Fn(&RenderContext) + 'static) -> Self {
        self.updated = Some(Box::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Is `name` a declared prop?
    pub fn declares_prop(&self, name: &str) -> bool {
        self.prop_names.iter().any(|p| p == name)
    }

    pub(crate) fn initial_data(&self) -> MapEntries {
        match &self.data {
            Some(factory) => factory(),
            None => MapEntries::new(),
        }
    }

    pub(crate) fn render(&self, context: &RenderContext) -> VNode {
        (self.render)(context)
    }

    pub(crate) fn emit_before_create(&self) {
        if let Some(hook) = &self.before_create {
            hook();
        }
    }

    pub(crate) fn emit(&self, stage: Lifecycle, context: &RenderContext) {
        let hook = match stage {
            Lifecycle::Created => &self.created,
            Lifecycle::BeforeMount => &self.before_mount,
            Lifecycle::Mounted => &self.mounted,
            Lifecycle::BeforeUpdate => &self.before_update,
            Lifecycle::Updated => &self.updated,
        };
        if let Some(hook) = hook {
            hook(context);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vnode::text;

    #[test]
    fn test_declares_prop() {
        let def = ComponentDefinition::new("card", |_| text("x")).props(["title", "body"]);

        assert!(def.declares_prop("title"));
        assert!(def.declares_prop("body"));
        assert!(!def.declares_prop("class"));
    }

    #[test]
    fn test_initial_data_defaults_empty() {
        let def = ComponentDefinition::new("bare", |_| text("x"));
        assert!(def.initial_data().is_empty());
    }
}
