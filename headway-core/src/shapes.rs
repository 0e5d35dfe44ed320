//! Geometric trimming of line polylines. A ride segment covers only part of
//! its line, so its polyline is the substring of the full shape between the
//! arc-length projections of the segment's first and last stop. If the ride
//! runs against the polyline's drawing direction the two projections are
//! swapped.

use geo::{Coord, LineString, Point};

/// Substring of `shape` between the projections of `first` and `last` onto
/// it. Returns `None` when the polyline is degenerate (fewer than two
/// coordinates or zero length); callers fall back to the full shape.
#[must_use]
pub fn trim_between(shape: &LineString, first: Point, last: Point) -> Option<LineString> {
    let from = locate(shape, first)?;
    let to = locate(shape, last)?;
    let (start, end) = if from <= to { (from, to) } else { (to, from) };
    substring(shape, start, end)
}

/// Arc-length position along `line` of the point on it closest to `point`.
fn locate(line: &LineString, point: Point) -> Option<f64> {
    let coords = &line.0;
    if coords.len() < 2 {
        return None;
    }

    let target: Coord = point.into();
    let mut walked = 0.0;
    let mut best: Option<(f64, f64)> = None; // (squared distance, arc position)

    for pair in coords.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let seg = Coord {
            x: b.x - a.x,
            y: b.y - a.y,
        };
        let seg_len2 = seg.x * seg.x + seg.y * seg.y;
        let t = if seg_len2 > 0.0 {
            (((target.x - a.x) * seg.x + (target.y - a.y) * seg.y) / seg_len2).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let closest = Coord {
            x: a.x + t * seg.x,
            y: a.y + t * seg.y,
        };
        let dx = target.x - closest.x;
        let dy = target.y - closest.y;
        let dist2 = dx * dx + dy * dy;
        let seg_len = seg_len2.sqrt();

        if best.is_none_or(|(best_d2, _)| dist2 < best_d2) {
            best = Some((dist2, walked + t * seg_len));
        }
        walked += seg_len;
    }

    if walked > 0.0 {
        best.map(|(_, position)| position)
    } else {
        None
    }
}

/// The part of `line` between arc-length positions `start` and `end`
/// (`start <= end`), endpoints interpolated.
fn substring(line: &LineString, start: f64, end: f64) -> Option<LineString> {
    let coords = &line.0;
    if coords.len() < 2 {
        return None;
    }

    let mut result: Vec<Coord> = Vec::new();
    let mut walked = 0.0;

    for pair in coords.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let seg_len = {
            let dx = b.x - a.x;
            let dy = b.y - a.y;
            (dx * dx + dy * dy).sqrt()
        };
        let seg_start = walked;
        let seg_end = walked + seg_len;

        if seg_len > 0.0 && seg_end >= start && seg_start <= end {
            let enter = ((start - seg_start) / seg_len).clamp(0.0, 1.0);
            let exit = ((end - seg_start) / seg_len).clamp(0.0, 1.0);
            push_interpolated(&mut result, a, b, enter);
            if exit > enter {
                push_interpolated(&mut result, a, b, exit);
            }
        }
        walked = seg_end;
    }

    match result.len() {
        0 => None,
        // both positions collapsed onto a single vertex
        1 => Some(LineString::new(vec![result[0], result[0]])),
        _ => Some(LineString::new(result)),
    }
}

fn push_interpolated(result: &mut Vec<Coord>, a: Coord, b: Coord, t: f64) {
    let coord = Coord {
        x: a.x + t * (b.x - a.x),
        y: a.y + t * (b.y - a.y),
    };
    let close_enough = |previous: &Coord| {
        (previous.x - coord.x).abs() < 1e-9 && (previous.y - coord.y).abs() < 1e-9
    };
    if !result.last().is_some_and(close_enough) {
        result.push(coord);
    }
}
