use famlay::{
    FamilyGraph, FilterOptions, LayoutConfig, LayoutEngine, assign_edge_handles, filter_visible,
    sync_relationships,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FamilyLayoutOptions {
    focus: Option<String>,
    ancestor_depth: Option<u32>,
    descendant_depth: Option<u32>,
    sibling_hop_depth: Option<u32>,
    skip_layout: Option<bool>,
    layout: Option<LayoutConfig>,
}

fn lay_out_document(document: FamilyGraph, options: FamilyLayoutOptions) -> FamilyGraph {
    let nodes = sync_relationships(&document.nodes, &document.edges);
    let edges = assign_edge_handles(&nodes, &document.edges);
    let mut graph = match options.focus.as_deref() {
        Some(focus) => {
            let filter = FilterOptions {
                ancestor_depth: options.ancestor_depth.unwrap_or(u32::MAX),
                descendant_depth: options.descendant_depth.unwrap_or(u32::MAX),
                sibling_hop_depth: options.sibling_hop_depth,
            };
            filter_visible(&nodes, &edges, focus, &filter)
        }
        None => FamilyGraph { nodes, edges },
    };

    if !options.skip_layout.unwrap_or(false) {
        let engine = LayoutEngine::new(options.layout.unwrap_or_default());
        graph.nodes = futures::executor::block_on(engine.layout(&graph.nodes, &graph.edges));
    }
    graph
}

#[wasm_bindgen]
pub fn layout_family_tree(document_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let document = serde_json::from_str::<FamilyGraph>(document_json)
        .map_err(|error| JsValue::from_str(&error.to_string()))?;
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<FamilyLayoutOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        FamilyLayoutOptions::default()
    };

    let graph = lay_out_document(document, options);
    serde_json::to_string(&graph).map_err(|error| JsValue::from_str(&error.to_string()))
}
