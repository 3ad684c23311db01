use crate::config::{LayoutConfig, load_config};
use crate::generation::{FilterOptions, filter_visible};
use crate::handles::assign_edge_handles;
use crate::ir::FamilyGraph;
use crate::layout::LayoutEngine;
use crate::layout_dump::write_layout_dump;
use crate::sync::sync_relationships;
use anyhow::Result;
use clap::Parser;
use std::env;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "famlay",
    version,
    about = "Synchronize and auto-layout a family tree document"
)]
pub struct Args {
    /// Input document (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output document. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Layout config JSON file (nodeWidth, partnerSpacing, ...)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Only keep people visible from this person
    #[arg(long = "focus")]
    pub focus: Option<String>,

    /// Generations above the focus person to keep
    #[arg(long = "ancestors", default_value_t = u32::MAX, requires = "focus")]
    pub ancestors: u32,

    /// Generations below the focus person to keep
    #[arg(long = "descendants", default_value_t = u32::MAX, requires = "focus")]
    pub descendants: u32,

    /// Sibling hops to keep (1 = own siblings, 2 = aunts and uncles); all when omitted
    #[arg(long = "sibling-hops", requires = "focus")]
    pub sibling_hops: Option<u32>,

    /// Write a layout dump (positions, depths, ports) to this path
    #[arg(long = "dump")]
    pub dump: Option<PathBuf>,

    /// Synchronize relationships and ports without moving anyone
    #[arg(long = "no-layout")]
    pub no_layout: bool,
}

impl Args {
    fn view(&self) -> Option<(&str, FilterOptions)> {
        let focus = self.focus.as_deref()?;
        let options = FilterOptions {
            ancestor_depth: self.ancestors,
            descendant_depth: self.descendants,
            sibling_hop_depth: self.sibling_hops,
        };
        Some((focus, options))
    }
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let document = parse_document(&input)?;
    tracing::info!(
        nodes = document.nodes.len(),
        edges = document.edges.len(),
        "loaded family document"
    );

    let result = process_document(document, args.view(), !args.no_layout, &config);
    if let Some((focus, _)) = args.view() {
        if result.nodes.is_empty() {
            return Err(anyhow::anyhow!("Person '{}' not found in input", focus));
        }
    }

    write_output(&result, args.output.as_deref())?;
    if let Some(path) = args.dump.as_deref() {
        write_layout_dump(path, &result.nodes, &result.edges, &config)?;
    }
    Ok(())
}

/// Sync, assign ports, optionally filter to a view, then lay out.
pub fn process_document(
    document: FamilyGraph,
    view: Option<(&str, FilterOptions)>,
    layout: bool,
    config: &LayoutConfig,
) -> FamilyGraph {
    let nodes = sync_relationships(&document.nodes, &document.edges);
    let edges = assign_edge_handles(&nodes, &document.edges);
    let mut graph = match view {
        Some((focus, options)) => filter_visible(&nodes, &edges, focus, &options),
        None => FamilyGraph { nodes, edges },
    };
    if layout {
        let engine = LayoutEngine::new(config.clone());
        graph.nodes = futures::executor::block_on(engine.layout(&graph.nodes, &graph.edges));
    }
    graph
}

/// Parses a document as JSON, falling back to JSON5.
pub fn parse_document(input: &str) -> Result<FamilyGraph> {
    match serde_json::from_str::<FamilyGraph>(input) {
        Ok(graph) => Ok(graph),
        Err(json_err) => json5::from_str::<FamilyGraph>(input).map_err(|json5_err| {
            anyhow::anyhow!("Invalid family document: {json_err} (as JSON5: {json5_err})")
        }),
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_output(graph: &FamilyGraph, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(graph)?;
    match output {
        Some(path) => std::fs::write(path, json)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FAMLAY_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "famlay=debug,info"
        } else {
            "famlay=info,warn"
        })
    });

    let format = env::var("FAMLAY_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "nodes": [
            { "id": "mom", "position": { "x": 0, "y": 0 }, "data": { "name": "Mom" } },
            { "id": "dad", "position": { "x": 0, "y": 0 }, "data": {} },
            { "id": "kid", "position": { "x": 0, "y": 0 }, "data": { "parents": ["stale"] } },
            { "id": "stranger", "position": { "x": 0, "y": 0 } }
        ],
        "edges": [
            { "id": "e1", "source": "mom", "target": "kid", "data": { "relationship": "Parent" } },
            { "id": "e2", "source": "dad", "target": "kid", "data": { "relationship": "Parent" } },
            { "id": "e3", "source": "mom", "target": "dad", "data": { "relationship": "Partner", "dateOfMarriage": "1990-01-01" } }
        ]
    }"#;

    #[test]
    fn parses_json5_documents() {
        let graph = parse_document(
            "{ nodes: [ { id: 'a', position: { x: 1, y: 2 }, }, ], edges: [], // trailing\n }",
        )
        .unwrap();
        assert_eq!(graph.nodes[0].id, "a");
        assert!(parse_document("not a document").is_err());
    }

    #[test]
    fn syncs_and_assigns_ports_without_layout() {
        let document = parse_document(DOCUMENT).unwrap();
        let out = process_document(document, None, false, &LayoutConfig::default());
        let kid = out.node("kid").unwrap();
        assert_eq!(kid.data.parents(), ["dad", "mom"]);
        assert_eq!(kid.position.x, 0.0);
        assert!(out.edges.iter().filter(|edge| edge.is_parent()).all(|edge| {
            edge.source_handle.as_deref() == Some("child-0")
        }));
        let mom = out.node("mom").unwrap();
        assert_eq!(mom.data.attributes["name"], "Mom");
    }

    #[test]
    fn focus_view_drops_unrelated_people() {
        let document = parse_document(DOCUMENT).unwrap();
        let view = FilterOptions::new(1, 1);
        let out = process_document(document, Some(("kid", view)), false, &LayoutConfig::default());
        assert!(out.node("stranger").is_none());
        assert_eq!(out.nodes.len(), 3);
        assert_eq!(out.edges.len(), 3);
    }

    #[test]
    fn args_require_focus_for_depths() {
        assert!(Args::try_parse_from(["famlay", "--ancestors", "2"]).is_err());
        let args = Args::try_parse_from(["famlay", "--focus", "kid", "--sibling-hops", "1"]).unwrap();
        let (focus, options) = args.view().unwrap();
        assert_eq!(focus, "kid");
        assert_eq!(options.sibling_hop_depth, Some(1));
        assert_eq!(options.ancestor_depth, u32::MAX);
    }
}
