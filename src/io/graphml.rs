//! GraphML writing operations.

use std::{collections::BTreeMap, io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Result};
use quick_xml::{Writer, events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event}};

use crate::{common::PendingWrite, graph::{AttrValue, RoadGraph}};

const GRAPHML_NS: &str = "http://graphml.graphdrawing.org/xmlns";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str =
    "http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd";

/// Graph-level metadata written with every file.
const GRAPH_CRS: &str = "epsg:4326";
const CREATED_WITH: &str = concat!("cityroads ", env!("CARGO_PKG_VERSION"));

/// A declared `<key>`: its id and value type.
struct KeySpec {
    id: String,
    ty: &'static str,
}

/// Declared keys by attribute name for one domain (graph, node or edge).
type KeyTable = BTreeMap<String, KeySpec>;

/// Write `graph` to `path` as GraphML. The file appears atomically once fully written.
pub fn write_graphml(graph: &RoadGraph, path: &Path) -> Result<()> {
    let mut sink = PendingWrite::open(path, true)?;
    {
        let mut buffered = BufWriter::new(&mut sink);
        write_graphml_to(graph, &mut buffered)
            .with_context(|| format!("[io::graphml] Failed to write {}", path.display()))?;
        buffered.flush()
            .with_context(|| format!("[io::graphml] Failed to flush {}", path.display()))?;
    }
    sink.finalize()
}

/// Write `graph` as a GraphML document to any writer.
pub(crate) fn write_graphml_to<W: Write>(graph: &RoadGraph, out: W) -> Result<()> {
    let mut next_id = 0usize;
    let mut declare = |types: BTreeMap<String, &'static str>| -> KeyTable {
        types.into_iter()
            .map(|(name, ty)| {
                let spec = KeySpec { id: format!("d{next_id}"), ty };
                next_id += 1;
                (name, spec)
            })
            .collect()
    };

    let graph_keys = declare(BTreeMap::from([
        ("created_with".to_string(), "string"),
        ("crs".to_string(), "string"),
    ]));
    let mut node_types = infer_types(graph.nodes().iter().flat_map(|n| n.attrs.iter()));
    node_types.insert("x".into(), "double");
    node_types.insert("y".into(), "double");
    let node_keys = declare(node_types);
    let edge_keys = declare(infer_types(graph.edges().iter().flat_map(|e| e.attrs.iter())));

    let mut writer = Writer::new_with_indent(out, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("graphml").with_attributes([
        ("xmlns", GRAPHML_NS),
        ("xmlns:xsi", XSI_NS),
        ("xsi:schemaLocation", SCHEMA_LOCATION),
    ])))?;

    for (domain, keys) in [("graph", &graph_keys), ("node", &node_keys), ("edge", &edge_keys)] {
        for (name, spec) in keys {
            writer.write_event(Event::Empty(BytesStart::new("key").with_attributes([
                ("id", spec.id.as_str()),
                ("for", domain),
                ("attr.name", name.as_str()),
                ("attr.type", spec.ty),
            ])))?;
        }
    }

    let edgedefault = if graph.is_directed() { "directed" } else { "undirected" };
    writer.write_event(Event::Start(BytesStart::new("graph").with_attributes([("edgedefault", edgedefault)])))?;
    write_data(&mut writer, &graph_keys["created_with"].id, CREATED_WITH)?;
    write_data(&mut writer, &graph_keys["crs"].id, GRAPH_CRS)?;

    for node in graph.nodes() {
        let id = node.osmid.to_string();
        writer.write_event(Event::Start(BytesStart::new("node").with_attributes([("id", id.as_str())])))?;
        write_data(&mut writer, &node_keys["y"].id, &node.y.to_string())?;
        write_data(&mut writer, &node_keys["x"].id, &node.x.to_string())?;
        for (name, value) in &node.attrs {
            if name == "x" || name == "y" { continue }
            write_data(&mut writer, &node_keys[name].id, &format_value(value, node_keys[name].ty))?;
        }
        writer.write_event(Event::End(BytesEnd::new("node")))?;
    }

    let nodes = graph.nodes();
    for edge in graph.edges() {
        let (source, target, key) = (nodes[edge.u].osmid.to_string(), nodes[edge.v].osmid.to_string(), edge.key.to_string());
        writer.write_event(Event::Start(BytesStart::new("edge").with_attributes([
            ("source", source.as_str()),
            ("target", target.as_str()),
            ("id", key.as_str()),
        ])))?;
        for (name, value) in &edge.attrs {
            write_data(&mut writer, &edge_keys[name].id, &format_value(value, edge_keys[name].ty))?;
        }
        writer.write_event(Event::End(BytesEnd::new("edge")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("graph")))?;
    writer.write_event(Event::End(BytesEnd::new("graphml")))?;
    Ok(())
}

/// Write one `<data key="...">value</data>` element.
fn write_data<W: Write>(writer: &mut Writer<W>, key: &str, value: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("data").with_attributes([("key", key)])))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new("data")))?;
    Ok(())
}

/// One type per attribute name: the common type if all values agree,
/// "double" for a mix of integers and floats, else "string".
fn infer_types<'a>(attrs: impl Iterator<Item = (&'a String, &'a AttrValue)>) -> BTreeMap<String, &'static str> {
    let mut types: BTreeMap<String, &'static str> = BTreeMap::new();
    for (name, value) in attrs {
        let ty = value.graphml_type();
        types.entry(name.clone())
            .and_modify(|current| {
                *current = match (*current, ty) {
                    (a, b) if a == b => a,
                    ("long", "double") | ("double", "long") => "double",
                    _ => "string",
                }
            })
            .or_insert(ty);
    }
    types
}

/// Render a value for a key of type `ty`; integers under a double key are written as floats.
fn format_value(value: &AttrValue, ty: &str) -> String {
    match (value, ty) {
        (AttrValue::Int(i), "double") => format!("{:?}", *i as f64),
        _ => value.to_string(),
    }
}
