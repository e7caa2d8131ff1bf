//! Canvas outline rendering
//!
//! Maps each node discriminator to a rendering strategy through a lookup
//! table. Kinds without a registered strategy use the generic renderer.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use weft_ast::{Body, Category, Node, NodeId, NodeKind, Tier, Value};

/// One outline row on the canvas
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanvasRow {
    pub id: NodeId,
    /// Roots are depth 0
    pub depth: usize,
    /// Field of the parent holding this node; `None` for roots
    pub slot: Option<String>,
    pub label: String,
    pub tier: Tier,
}

/// Rendering strategy for a family of node kinds
pub trait NodeRenderer: Send + Sync {
    /// Strategy name, for diagnostics
    fn name(&self) -> &'static str;

    /// One-line caption for `node`
    fn label(&self, node: &Node) -> String;
}

fn text<'a>(node: &'a Node, key: &str) -> &'a str {
    node.get(key).and_then(Value::as_str).unwrap_or("")
}

fn or_blank(raw: &str) -> &str {
    if raw.is_empty() {
        "_"
    } else {
        raw
    }
}

/// Control-flow statements
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementRenderer;

impl NodeRenderer for StatementRenderer {
    fn name(&self) -> &'static str {
        "statement"
    }

    fn label(&self, node: &Node) -> String {
        match node.kind() {
            NodeKind::LetStatement => {
                let keyword = if node.get("mutable").and_then(Value::as_bool) == Some(true) {
                    "let mut"
                } else {
                    "let"
                };
                format!("{keyword} {}", or_blank(text(node, "name")))
            }
            NodeKind::ForStatement => format!("for {}", or_blank(text(node, "variable"))),
            NodeKind::TryCatchStatement => format!("try / catch {}", or_blank(text(node, "catchParam"))),
            NodeKind::MatchStatement => format!("match ({} arms)", node.slot("arms").len()),
            kind => kind.label().to_string(),
        }
    }
}

/// Database, HTTP, and crypto primitives
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainRenderer;

impl NodeRenderer for DomainRenderer {
    fn name(&self) -> &'static str {
        "domain"
    }

    fn label(&self, node: &Node) -> String {
        match node.kind() {
            NodeKind::DbQuery | NodeKind::DbMutate => {
                format!("{}.{}", or_blank(text(node, "model")), or_blank(text(node, "operation")))
            }
            NodeKind::HttpRespond => {
                let status = node.get("status").and_then(Value::as_i64).unwrap_or(200);
                format!("respond {status}")
            }
            NodeKind::CtxGet => format!("{}.{}", or_blank(text(node, "source")), or_blank(text(node, "key"))),
            NodeKind::SignToken => format!("sign token ({})", or_blank(text(node, "expiresIn"))),
            kind => kind.label().to_string(),
        }
    }
}

/// Opaque target-specific code
#[derive(Debug, Clone, Copy, Default)]
pub struct BridgeRenderer;

impl NodeRenderer for BridgeRenderer {
    fn name(&self) -> &'static str {
        "bridge"
    }

    fn label(&self, node: &Node) -> String {
        let lines = text(node, "code").lines().count();
        format!("native {} ({lines} lines)", or_blank(text(node, "language")))
    }
}

/// Fallback for everything else
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericRenderer;

impl NodeRenderer for GenericRenderer {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn label(&self, node: &Node) -> String {
        match node.kind() {
            NodeKind::Identifier => or_blank(text(node, "name")).to_string(),
            NodeKind::BinaryExpression => format!("binary {}", text(node, "operator")),
            NodeKind::Literal => match node.get("value") {
                Some(Value::String(raw)) => format!("{raw:?}"),
                Some(Value::Number(number)) => number.to_string(),
                Some(Value::Bool(flag)) => flag.to_string(),
                _ => "null".to_string(),
            },
            kind => kind.label().to_string(),
        }
    }
}

/// Discriminator to renderer lookup
#[derive(Clone)]
pub struct RendererRegistry {
    renderers: HashMap<String, Arc<dyn NodeRenderer>>,
    fallback: Arc<dyn NodeRenderer>,
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("registered", &self.renderers.len())
            .field("fallback", &self.fallback.name())
            .finish()
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl RendererRegistry {
    /// Empty registry; every kind renders generically
    #[must_use]
    pub fn new() -> Self {
        Self {
            renderers: HashMap::new(),
            fallback: Arc::new(GenericRenderer),
        }
    }

    /// Built-in strategies by category; expressions stay generic
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let statement: Arc<dyn NodeRenderer> = Arc::new(StatementRenderer);
        let domain: Arc<dyn NodeRenderer> = Arc::new(DomainRenderer);
        let bridge: Arc<dyn NodeRenderer> = Arc::new(BridgeRenderer);
        for kind in NodeKind::ALL {
            let renderer = match kind.category() {
                Category::Statement => &statement,
                Category::Domain => &domain,
                Category::Bridge => &bridge,
                Category::Expression => continue,
            };
            registry.register(kind.type_name(), Arc::clone(renderer));
        }
        registry
    }

    /// Register or replace the strategy for `type_name`
    pub fn register(&mut self, type_name: &str, renderer: Arc<dyn NodeRenderer>) {
        self.renderers.insert(type_name.to_string(), renderer);
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.renderers.contains_key(type_name)
    }

    /// Strategy for `type_name`, falling back to the generic one
    #[must_use]
    pub fn renderer_for(&self, type_name: &str) -> &dyn NodeRenderer {
        self.renderers
            .get(type_name)
            .unwrap_or(&self.fallback)
            .as_ref()
    }

    #[must_use]
    pub fn label(&self, node: &Node) -> String {
        self.renderer_for(node.type_name()).label(node)
    }

    /// Depth-first outline of `body`, fields in key order
    #[must_use]
    pub fn outline(&self, body: &Body) -> Vec<CanvasRow> {
        let mut rows = Vec::new();
        for root in body {
            self.push_rows(root, 0, None, &mut rows);
        }
        rows
    }

    fn push_rows(&self, node: &Node, depth: usize, slot: Option<&str>, rows: &mut Vec<CanvasRow>) {
        rows.push(CanvasRow {
            id: node.id().clone(),
            depth,
            slot: slot.map(str::to_string),
            label: self.label(node),
            tier: node.tier(),
        });
        for (key, value) in node.fields() {
            for child in value.child_nodes() {
                self.push_rows(child, depth + 1, Some(key.as_str()), rows);
            }
        }
    }
}
