use crate::color::{Color, ColorScale};
use crate::tree::{Circle, Hierarchy};

pub(super) struct Palette<'a> {
    pub group: &'a ColorScale,
    pub cell: &'a ColorScale,
    pub empty: Color,
}

/// Inset every rectangle, assign fills, and give every leaf the same
/// inscribed circle.
pub(super) fn finalize(hierarchy: &mut Hierarchy, levels: usize, padding: f64, palette: &Palette) {
    let header_depth = levels.saturating_sub(2);
    for id in hierarchy.descendants() {
        let node = hierarchy.node_mut(id);
        node.rect = node.rect.inset(padding);
        node.color = Some(match &node.data {
            None => palette.empty,
            Some(_) if node.depth <= header_depth => palette.group.apply(node.depth as f64),
            Some(datum) => match datum.value {
                Some(value) => palette.cell.apply(value),
                None => palette.empty,
            },
        });
    }

    // Every leaf shares the post-inset size of the first one.
    let leaves = hierarchy.leaves();
    let Some(&sample) = leaves.first() else {
        return;
    };
    let rect = hierarchy.node(sample).rect;
    let (hx, hy) = (rect.width() / 2.0, rect.height() / 2.0);
    let circle = Circle {
        cx: hx,
        cy: hy,
        r: hx.min(hy),
    };
    for id in leaves {
        hierarchy.node_mut(id).circle = Some(circle);
    }
}
