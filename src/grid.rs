//! Grid renderer: seven modes over an infinite world, emitted only for
//! the visible rectangle.

use crate::camera::Camera;
use crate::geometry::{Color, WorldPoint};
use serde::{Deserialize, Serialize};

pub const CELL: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridType {
    None,
    Square,
    Dot,
    Ruled,
    Isometric,
    Graph,
    Hex,
}

impl Default for GridType {
    fn default() -> Self {
        GridType::None
    }
}

/// One piece of grid geometry, expressed in world coordinates; widths are
/// already divided by zoom so lines render as hairlines regardless of
/// camera scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridPrimitive {
    Line {
        from: WorldPoint,
        to: WorldPoint,
        width: f32,
        color: Color,
        alpha: f32,
    },
    Disk {
        center: WorldPoint,
        radius: f32,
        color: Color,
        alpha: f32,
    },
}

const GRID_COLOR: Color = [160, 160, 160];
const RULED_COLOR: Color = [220, 80, 80];

pub fn emit(grid: GridType, camera: &Camera, width: f32, height: f32) -> Vec<GridPrimitive> {
    if grid == GridType::None {
        return vec![];
    }
    let (min, max) = camera.visible_world_rect(width, height);
    let hairline = 1.0 / camera.zoom;

    match grid {
        GridType::None => vec![],
        GridType::Square => square_lines(min, max, hairline, GRID_COLOR, 0.3),
        GridType::Dot => dots(min, max, 1.5 / camera.zoom),
        GridType::Ruled => ruled(min, max, hairline),
        GridType::Isometric => isometric(min, max, hairline),
        GridType::Graph => graph(min, max, hairline),
        GridType::Hex => hex(min, max, hairline),
    }
}

fn first_multiple_at_or_above(v: f32, step: f32) -> f32 {
    (v / step).floor() * step
}

fn square_lines(min: WorldPoint, max: WorldPoint, w: f32, color: Color, alpha: f32) -> Vec<GridPrimitive> {
    let mut out = Vec::new();
    let mut x = first_multiple_at_or_above(min.x, CELL);
    while x <= max.x {
        out.push(GridPrimitive::Line {
            from: WorldPoint::new(x, min.y),
            to: WorldPoint::new(x, max.y),
            width: w,
            color,
            alpha,
        });
        x += CELL;
    }
    let mut y = first_multiple_at_or_above(min.y, CELL);
    while y <= max.y {
        out.push(GridPrimitive::Line {
            from: WorldPoint::new(min.x, y),
            to: WorldPoint::new(max.x, y),
            width: w,
            color,
            alpha,
        });
        y += CELL;
    }
    out
}

fn dots(min: WorldPoint, max: WorldPoint, radius: f32) -> Vec<GridPrimitive> {
    let mut out = Vec::new();
    let mut y = first_multiple_at_or_above(min.y, CELL);
    while y <= max.y {
        let mut x = first_multiple_at_or_above(min.x, CELL);
        while x <= max.x {
            out.push(GridPrimitive::Disk {
                center: WorldPoint::new(x, y),
                radius,
                color: GRID_COLOR,
                alpha: 0.4,
            });
            x += CELL;
        }
        y += CELL;
    }
    out
}

fn ruled(min: WorldPoint, max: WorldPoint, w: f32) -> Vec<GridPrimitive> {
    let mut out = Vec::new();
    let mut y = first_multiple_at_or_above(min.y, CELL);
    while y <= max.y {
        out.push(GridPrimitive::Line {
            from: WorldPoint::new(min.x, y),
            to: WorldPoint::new(max.x, y),
            width: w,
            color: RULED_COLOR,
            alpha: 0.3,
        });
        y += CELL;
    }
    out.push(GridPrimitive::Line {
        from: WorldPoint::new(2.0 * CELL, min.y),
        to: WorldPoint::new(2.0 * CELL, max.y),
        width: w,
        color: RULED_COLOR,
        alpha: 0.3,
    });
    out
}

fn isometric(min: WorldPoint, max: WorldPoint, w: f32) -> Vec<GridPrimitive> {
    let mut out = Vec::new();
    let spacing = CELL * 3f32.sqrt() / 2.0;

    let mut y = first_multiple_at_or_above(min.y, spacing);
    while y <= max.y {
        out.push(GridPrimitive::Line {
            from: WorldPoint::new(min.x, y),
            to: WorldPoint::new(max.x, y),
            width: w,
            color: GRID_COLOR,
            alpha: 0.3,
        });
        y += spacing;
    }

    // Diagonals at +-60 deg: a line through (x0, min.y) with slope
    // tan(60deg) reaches x = x0 + dy/tan(60deg) at y = max.y.
    let run = (max.y - min.y) / 60f32.to_radians().tan();
    let span = run.abs() + CELL;
    let mut x = first_multiple_at_or_above(min.x - span, CELL);
    while x <= max.x + span {
        out.push(GridPrimitive::Line {
            from: WorldPoint::new(x, min.y),
            to: WorldPoint::new(x + run, max.y),
            width: w,
            color: GRID_COLOR,
            alpha: 0.3,
        });
        out.push(GridPrimitive::Line {
            from: WorldPoint::new(x, min.y),
            to: WorldPoint::new(x - run, max.y),
            width: w,
            color: GRID_COLOR,
            alpha: 0.3,
        });
        x += CELL;
    }
    out
}

fn graph(min: WorldPoint, max: WorldPoint, w: f32) -> Vec<GridPrimitive> {
    let mut out = square_lines(min, max, w, GRID_COLOR, 0.15);
    let minor_cell = CELL / 4.0;
    let mut minor = Vec::new();
    let mut x = first_multiple_at_or_above(min.x, minor_cell);
    while x <= max.x {
        minor.push(GridPrimitive::Line {
            from: WorldPoint::new(x, min.y),
            to: WorldPoint::new(x, max.y),
            width: w,
            color: GRID_COLOR,
            alpha: 0.08,
        });
        x += minor_cell;
    }
    let mut y = first_multiple_at_or_above(min.y, minor_cell);
    while y <= max.y {
        minor.push(GridPrimitive::Line {
            from: WorldPoint::new(min.x, y),
            to: WorldPoint::new(max.x, y),
            width: w,
            color: GRID_COLOR,
            alpha: 0.08,
        });
        y += minor_cell;
    }
    // minor layered under major: emitted first.
    minor.extend(out.drain(..));
    minor
}

fn hex(min: WorldPoint, max: WorldPoint, w: f32) -> Vec<GridPrimitive> {
    let radius = 0.6 * CELL;
    let row_spacing = 1.5 * radius;
    let col_spacing = 3f32.sqrt() * radius;

    let mut out = Vec::new();
    let mut row = (min.y / row_spacing).floor() as i64;
    loop {
        let y = row as f32 * row_spacing;
        if y > max.y + row_spacing {
            break;
        }
        let offset = if row.rem_euclid(2) == 1 { col_spacing / 2.0 } else { 0.0 };
        let mut col = ((min.x - offset) / col_spacing).floor() as i64;
        loop {
            let cx = col as f32 * col_spacing + offset;
            if cx > max.x + col_spacing {
                break;
            }
            if cx >= min.x - col_spacing && y >= min.y - row_spacing {
                out.extend(hex_outline(WorldPoint::new(cx, y), radius, w));
            }
            col += 1;
        }
        row += 1;
    }
    out
}

fn hex_outline(center: WorldPoint, radius: f32, w: f32) -> Vec<GridPrimitive> {
    let mut pts = Vec::with_capacity(6);
    for i in 0..6 {
        let angle = std::f32::consts::FRAC_PI_3 * i as f32 + std::f32::consts::FRAC_PI_2;
        pts.push(WorldPoint::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        ));
    }
    (0..6)
        .map(|i| GridPrimitive::Line {
            from: pts[i],
            to: pts[(i + 1) % 6],
            width: w,
            color: GRID_COLOR,
            alpha: 0.3,
        })
        .collect()
}
