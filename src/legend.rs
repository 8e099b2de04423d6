use serde::Serialize;
use tracing::debug;

use crate::color::Color;
use crate::config::HeatmapConfig;
use crate::format::NumberFormat;
use crate::layout::{HeatmapLayout, LayoutError};

pub const OPEN_CEILING: f64 = f64::INFINITY;

/// A `[floor, ceiling)` value range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bucket {
    pub floor: f64,
    pub ceiling: f64,
}

impl Bucket {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.floor && value < self.ceiling
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendCell {
    pub x: f64,
    pub width: f64,
    pub label: String,
    pub color: Color,
    pub floor: f64,
    pub ceiling: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Legend {
    pub width: f64,
    pub cells: Vec<LegendCell>,
}

/// Round down to two significant digits: `1234 -> 1200`, `0.0351 -> 0.035`,
/// `-1234 -> -1300`.
pub fn nice_floor(value: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let exponent = decimal_exponent(value);
    if exponent >= 1 {
        let step = 10f64.powi(exponent - 1);
        snap(value / step).floor() * step
    } else {
        let scale = 10f64.powi(1 - exponent);
        snap(value * scale).floor() / scale
    }
}

fn decimal_exponent(value: f64) -> i32 {
    let magnitude = value.abs();
    let exponent = magnitude.log10().floor() as i32;
    if 10f64.powi(exponent + 1) <= magnitude {
        exponent + 1
    } else {
        exponent
    }
}

// `0.29 * 100.0` is `28.999999999999996`; drop that noise before flooring.
fn snap(scaled: f64) -> f64 {
    (scaled * 1e9).round() / 1e9
}

// First value above `floor` at which `nice_floor` can exceed `floor`.
fn next_nice_boundary(floor: f64) -> f64 {
    if floor == 0.0 || !floor.is_finite() {
        return floor;
    }
    let mut grid = 10f64.powi(decimal_exponent(floor) - 1);
    // Just above `-10^n` the grid is already one digit finer.
    if snap(floor / grid) == -10.0 {
        grid /= 10.0;
    }
    (snap(floor / grid).floor() + 1.0) * grid
}

/// Contiguous buckets from `min`, cut at [`nice_floor`]ed steps of
/// `(max - min) / segments` and closed by `[max, OPEN_CEILING)`.
pub fn bucket_boundaries(min: f64, max: f64, segments: usize) -> Result<Vec<Bucket>, LayoutError> {
    if segments == 0 {
        return Err(LayoutError::InvalidSegments);
    }
    let gap = (max - min) / segments as f64;
    let mut buckets = Vec::new();
    let mut floor = min;
    let mut k = 1usize;
    loop {
        let step = min + gap * k as f64;
        if !(step < max - gap) {
            break;
        }
        let boundary = nice_floor(step);
        if boundary > floor && boundary < max {
            buckets.push(Bucket {
                floor,
                ceiling: boundary,
            });
            floor = boundary;
        }
        // Steps short of the next grid line round back onto `floor`; skip them.
        let target = ((next_nice_boundary(floor) - min) / gap).ceil();
        k = if target.is_finite() && target > k as f64 + 1.0 {
            target as usize
        } else {
            match k.checked_add(1) {
                Some(next) => next,
                None => break,
            }
        };
    }
    buckets.push(Bucket {
        floor,
        ceiling: max,
    });
    buckets.push(Bucket {
        floor: max,
        ceiling: OPEN_CEILING,
    });
    Ok(buckets)
}

pub fn compute_legend(
    layout: &HeatmapLayout,
    config: &HeatmapConfig,
    segments: usize,
    format: &NumberFormat,
) -> Result<Legend, LayoutError> {
    if segments == 0 {
        return Err(LayoutError::InvalidSegments);
    }
    let values = layout.hierarchy.leaf_values();
    let Some((min, max)) = layout.hierarchy.value_extent() else {
        return Ok(Legend::default());
    };

    let buckets = bucket_boundaries(min, max, segments)?;
    let raw = buckets.len();
    let populated: Vec<Bucket> = buckets
        .into_iter()
        .filter(|bucket| values.iter().any(|v| bucket.contains(*v)))
        .collect();
    debug!(raw, populated = populated.len(), "legend buckets");

    let cell_width = config.legend_cell_width;
    let cells = populated
        .into_iter()
        .enumerate()
        .map(|(i, bucket)| LegendCell {
            x: i as f64 * cell_width,
            width: cell_width,
            label: format.format(bucket.floor),
            color: layout.cell_scale.apply(bucket.floor),
            floor: bucket.floor,
            ceiling: bucket.ceiling,
        })
        .collect::<Vec<_>>();

    Ok(Legend {
        width: cells.len() as f64 * cell_width,
        cells,
    })
}
