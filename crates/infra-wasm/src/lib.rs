//! WASM bridge for Infra Draft: exposes the graph store and the HCL
//! generator to the browser diagram editor.
//!
//! Compiled via `wasm-pack build --target web`. Every payload crosses the
//! boundary as a JSON string in the editor's wire shape; failures come back
//! as `false`, an empty string, or a `{"ok":false,"error":"..."}` object.

use infra_core::{Connection, NodeData, NodeId, Position, ResourceNode};
use infra_editor::{GraphStore, StoreConfig};
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

/// The JS-facing editor state.
///
/// Holds one `GraphStore`. All mutations from the canvas, the palette and
/// the attribute panel go through this struct.
#[wasm_bindgen]
pub struct DiagramEditor {
    store: GraphStore,
}

#[wasm_bindgen]
impl DiagramEditor {
    /// Create an empty editor. `config_json` is a `StoreConfig` object;
    /// an empty string or `{}` selects the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Self {
        console_error_panic_hook_setup();

        let config = if config_json.trim().is_empty() {
            StoreConfig::default()
        } else {
            decode::<StoreConfig>("config", config_json).unwrap_or_default()
        };
        Self {
            store: GraphStore::new(config),
        }
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Append one node. Returns `false` on bad JSON or a duplicate id.
    pub fn add_node(&mut self, node_json: &str) -> bool {
        let Some(node) = decode::<ResourceNode>("node", node_json) else {
            return false;
        };
        match self.store.add_node(node) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("add_node rejected: {e}");
                false
            }
        }
    }

    /// Remove a node and its connections. Returns `false` if it was absent.
    pub fn remove_node(&mut self, id: &str) -> bool {
        self.store.remove_node(NodeId::intern(id))
    }

    /// Replace the whole node list.
    pub fn update_nodes(&mut self, nodes_json: &str) -> bool {
        let Some(nodes) = decode::<Vec<ResourceNode>>("nodes", nodes_json) else {
            return false;
        };
        self.store.update_nodes(nodes);
        true
    }

    /// Replace the whole connection list.
    pub fn update_edges(&mut self, edges_json: &str) -> bool {
        let Some(edges) = decode::<Vec<Connection>>("edges", edges_json) else {
            return false;
        };
        self.store.update_edges(edges);
        true
    }

    /// Drop a palette resource (`vpc`, `ec2`, `s3`) at `(x, y)`.
    /// Returns the new node id, or an empty string for an unknown kind.
    pub fn add_resource(&mut self, kind: &str, x: f64, y: f64) -> String {
        match self.store.add_resource_tagged(kind, Position::new(x, y)) {
            Ok(id) => id.to_string(),
            Err(e) => {
                log::warn!("add_resource rejected: {e}");
                String::new()
            }
        }
    }

    /// Connect `source` into `target`. Returns the connection id, or an
    /// empty string if the pair is already connected.
    pub fn connect(&mut self, source: &str, target: &str) -> String {
        self.store
            .connect(NodeId::intern(source), NodeId::intern(target))
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    /// Replace one node's `{ "type", "data" }` payload.
    pub fn update_attributes(&mut self, id: &str, data_json: &str) -> bool {
        let Some(value) = decode::<serde_json::Value>("attributes", data_json) else {
            return false;
        };
        match self
            .store
            .update_attributes(NodeId::intern(id), NodeData::from_value(value))
        {
            Ok(()) => true,
            Err(e) => {
                log::warn!("update_attributes rejected: {e}");
                false
            }
        }
    }

    pub fn move_node(&mut self, id: &str, x: f64, y: f64) -> bool {
        match self
            .store
            .move_node(NodeId::intern(id), Position::new(x, y))
        {
            Ok(()) => true,
            Err(e) => {
                log::warn!("move_node rejected: {e}");
                false
            }
        }
    }

    /// Show hand-edited text in the code pane. Not parsed back.
    pub fn override_code(&mut self, text: &str) {
        self.store.override_generated_code(text);
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.store.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.store.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// The code pane contents.
    pub fn code(&self) -> String {
        self.store.code().to_string()
    }

    pub fn nodes_json(&self) -> String {
        serde_json::to_string(self.store.nodes()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn edges_json(&self) -> String {
        serde_json::to_string(self.store.edges()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn diagnostics_json(&self) -> String {
        serde_json::to_string(&self.store.diagnostics()).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Decode a JSON payload, logging the failure.
fn decode<T: DeserializeOwned>(what: &str, json: &str) -> Option<T> {
    match serde_json::from_str(json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("invalid {what} JSON: {e}");
            None
        }
    }
}

/// Set up a panic hook that logs to the browser console.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Infra Draft WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone generation (no editor state) ─────────────────────────────

/// Generate HCL for a diagram. Returns JSON `{"ok":true,"code":"..."}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn generate(nodes_json: &str, edges_json: &str) -> String {
    let nodes = match serde_json::from_str::<Vec<ResourceNode>>(nodes_json) {
        Ok(nodes) => nodes,
        Err(e) => return failure(&format!("nodes: {e}")),
    };
    let edges = match serde_json::from_str::<Vec<Connection>>(edges_json) {
        Ok(edges) => edges,
        Err(e) => return failure(&format!("edges: {e}")),
    };
    let code = infra_core::generate(&nodes, &edges);
    serde_json::json!({ "ok": true, "code": code }).to_string()
}

fn failure(error: &str) -> String {
    serde_json::json!({ "ok": false, "error": error }).to_string()
}
