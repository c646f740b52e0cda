//! Scripted host double for integration tests.
//!
//! `TestHost` implements the host operations against an in-memory node
//! tree and records every operation it performs, so tests can assert both
//! the resulting tree shape and the *cost* of getting there (creates vs
//! moves).

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use ripple_render::{Container, HostOps, NodeRef, Value};

/// Host prop names treated as boolean-typed fields: an empty-string value
/// coerces to `true` (presence-shorthand convention).
const BOOL_FIELDS: &[&str] = &["disabled", "checked", "selected", "multiple"];

#[derive(Debug, Clone, PartialEq)]
pub enum HostOp {
    CreateElement(String),
    CreateText(String),
    CreateComment,
    Insert,
    Remove,
    SetText(String),
    SetElementText(String),
    PatchProp(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostKind {
    Element(String),
    Text,
    Comment,
}

#[derive(Debug)]
pub struct HostNodeData {
    pub kind: HostKind,
    pub attrs: IndexMap<String, Value>,
    pub text: String,
    pub children: Vec<NodeRef>,
    pub parent: Option<NodeRef>,
}

/// Shared handle to the op log, kept by the test after the host moves into
/// the renderer.
#[derive(Clone, Default)]
pub struct OpLog {
    ops: Rc<RefCell<Vec<HostOp>>>,
}

impl OpLog {
    /// Drain and return everything recorded so far.
    pub fn take(&self) -> Vec<HostOp> {
        self.ops.borrow_mut().drain(..).collect()
    }

    pub fn count(&self, predicate: impl Fn(&HostOp) -> bool) -> usize {
        self.ops.borrow().iter().filter(|op| predicate(op)).count()
    }

    fn record(&self, op: HostOp) {
        self.ops.borrow_mut().push(op);
    }
}

#[derive(Default)]
pub struct TestHost {
    log: OpLog,
}

impl TestHost {
    pub fn new() -> Self {
        TestHost::default()
    }

    pub fn log(&self) -> OpLog {
        self.log.clone()
    }

    fn make_node(kind: HostKind, text: &str) -> NodeRef {
        NodeRef::new(RefCell::new(HostNodeData {
            kind,
            attrs: IndexMap::new(),
            text: text.to_string(),
            children: Vec::new(),
            parent: None,
        }))
    }
}

fn data(node: &NodeRef) -> &RefCell<HostNodeData> {
    node.downcast_ref::<RefCell<HostNodeData>>()
        .expect("foreign node handle passed to TestHost")
}

fn detach(node: &NodeRef) {
    let parent = data(node).borrow().parent.clone();
    if let Some(parent) = parent {
        data(&parent)
            .borrow_mut()
            .children
            .retain(|child| !child.ptr_eq(node));
        data(node).borrow_mut().parent = None;
    }
}

impl HostOps for TestHost {
    fn create_element(&self, tag: &str) -> NodeRef {
        self.log.record(HostOp::CreateElement(tag.to_string()));
        TestHost::make_node(HostKind::Element(tag.to_string()), "")
    }

    fn set_element_text(&self, node: &NodeRef, text: &str) {
        self.log.record(HostOp::SetElementText(text.to_string()));
        let mut inner = data(node).borrow_mut();
        inner.children.clear();
        inner.text = text.to_string();
    }

    fn insert(&self, node: &NodeRef, parent: &NodeRef, anchor: Option<&NodeRef>) {
        self.log.record(HostOp::Insert);
        detach(node);
        {
            let mut parent_data = data(parent).borrow_mut();
            let index = anchor
                .and_then(|anchor| parent_data.children.iter().position(|c| c.ptr_eq(anchor)))
                .unwrap_or(parent_data.children.len());
            parent_data.children.insert(index, node.clone());
        }
        data(node).borrow_mut().parent = Some(parent.clone());
    }

    fn parent(&self, node: &NodeRef) -> Option<NodeRef> {
        data(node).borrow().parent.clone()
    }

    fn remove_child(&self, node: &NodeRef, parent: &NodeRef) {
        self.log.record(HostOp::Remove);
        data(parent)
            .borrow_mut()
            .children
            .retain(|child| !child.ptr_eq(node));
        data(node).borrow_mut().parent = None;
    }

    fn patch_prop(&self, node: &NodeRef, key: &str, _prev: Option<&Value>, next: Option<&Value>) {
        self.log.record(HostOp::PatchProp(key.to_string()));
        let mut inner = data(node).borrow_mut();
        match next {
            None => {
                inner.attrs.shift_remove(key);
            }
            Some(value) => {
                let coerced = if BOOL_FIELDS.contains(&key)
                    && matches!(value, Value::Str(s) if s.is_empty())
                {
                    Value::Bool(true)
                } else {
                    value.clone()
                };
                inner.attrs.insert(key.to_string(), coerced);
            }
        }
    }

    fn create_text(&self, text: &str) -> NodeRef {
        self.log.record(HostOp::CreateText(text.to_string()));
        TestHost::make_node(HostKind::Text, text)
    }

    fn set_text(&self, node: &NodeRef, text: &str) {
        self.log.record(HostOp::SetText(text.to_string()));
        data(node).borrow_mut().text = text.to_string();
    }

    fn create_comment(&self) -> NodeRef {
        self.log.record(HostOp::CreateComment);
        TestHost::make_node(HostKind::Comment, "")
    }

    fn next_sibling(&self, node: &NodeRef) -> Option<NodeRef> {
        let parent = data(node).borrow().parent.clone()?;
        let parent_data = data(&parent).borrow();
        let index = parent_data.children.iter().position(|c| c.ptr_eq(node))?;
        parent_data.children.get(index + 1).cloned()
    }
}

// =============================================================================
// Fixtures and assertions
// =============================================================================

/// A fresh root element wrapped as a container, with the renderer's host
/// op log on the side.
pub fn setup() -> (ripple_render::Renderer, Container, OpLog) {
    let host = TestHost::new();
    let log = host.log();
    let root = TestHost::make_node(HostKind::Element("root".to_string()), "");
    let container = Container::new(root);
    (ripple_render::Renderer::new(host), container, log)
}

pub fn children_of(node: &NodeRef) -> Vec<NodeRef> {
    data(node).borrow().children.clone()
}

pub fn tag_of(node: &NodeRef) -> Option<String> {
    match &data(node).borrow().kind {
        HostKind::Element(tag) => Some(tag.clone()),
        _ => None,
    }
}

pub fn text_of(node: &NodeRef) -> String {
    data(node).borrow().text.clone()
}

pub fn attr_of(node: &NodeRef, key: &str) -> Option<Value> {
    data(node).borrow().attrs.get(key).cloned()
}

/// Serialize a host subtree to a compact markup string for shape
/// assertions: `<tag attr="…">…</tag>`, bare text, `<!---->` for comments.
pub fn to_markup(node: &NodeRef) -> String {
    let inner = data(node).borrow();
    match &inner.kind {
        HostKind::Text => inner.text.clone(),
        HostKind::Comment => "<!---->".to_string(),
        HostKind::Element(tag) => {
            let mut out = format!("<{tag}");
            for (key, value) in &inner.attrs {
                out.push_str(&format!(" {key}={}", format_value(value)));
            }
            out.push('>');
            if inner.children.is_empty() {
                out.push_str(&inner.text);
            } else {
                for child in &inner.children {
                    out.push_str(&to_markup(child));
                }
            }
            out.push_str(&format!("</{tag}>"));
            out
        }
    }
}

/// Markup of everything inside the container's root node.
pub fn container_markup(container: &Container) -> String {
    children_of(container.node())
        .iter()
        .map(to_markup)
        .collect()
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Str(s) => format!("{s:?}"),
        Value::Int(n) => n.to_string(),
        Value::Float(x) => x.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => format!("{other:?}"),
    }
}
