use crate::layout::{HeatmapLayout, LayoutMetrics};
use crate::legend::Legend;
use crate::tree::{Circle, NodeId};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f64,
    pub actual_height: f64,
    pub metrics: LayoutMetrics,
    pub nodes: Vec<NodeDump>,
    pub legend: Option<Legend>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub depth: usize,
    pub name: Option<String>,
    pub value: Option<f64>,
    pub placeholder: bool,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub color: Option<String>,
    pub circle: Option<Circle>,
}

impl LayoutDump {
    pub fn from_layout(layout: &HeatmapLayout, legend: Option<&Legend>) -> Self {
        let nodes = layout
            .nodes()
            .map(|node| NodeDump {
                id: node.id,
                parent: node.parent,
                depth: node.depth,
                name: node.name().map(str::to_string),
                value: node.value(),
                placeholder: node.is_placeholder(),
                x0: node.rect.x0,
                x1: node.rect.x1,
                y0: node.rect.y0,
                y1: node.rect.y1,
                color: node.color.map(|c| c.to_hex()),
                circle: node.circle,
            })
            .collect();

        LayoutDump {
            width: layout.width(),
            actual_height: layout.actual_height(),
            metrics: layout.metrics,
            nodes,
            legend: legend.cloned(),
        }
    }
}

pub fn write_layout_dump(
    path: Option<&Path>,
    layout: &HeatmapLayout,
    legend: Option<&Legend>,
) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout, legend);
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => println!("{}", serde_json::to_string_pretty(&dump)?),
    }
    Ok(())
}
