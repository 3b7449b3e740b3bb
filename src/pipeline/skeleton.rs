use crate::{
    config::{LEFT_SHOULDER, LOWER_LIMIT, POSE_CONNECTIONS, RIGHT_SHOULDER, UPPER_LIMIT},
    types::{Frame, Pose},
};

pub const SKELETON_LINE_THICKNESS: i32 = 3;
pub const LIMIT_LINE_THICKNESS: i32 = 5;

const SKELETON_COLOR: [u8; 4] = [56, 189, 248, 255];
const POINT_COLOR: [u8; 4] = [248, 113, 113, 255];
const LIMIT_COLOR: [u8; 4] = [255, 0, 0, 255];
const MIN_DRAW_VISIBILITY: f32 = 0.5;

/// Preview overlay: pose skeleton, shoulder line and the two control limits.
pub fn draw_overlay(frame: &mut Frame, pose: Option<&Pose>) {
    if let Some(pose) = pose {
        draw_pose(frame, pose);
    }
    draw_limit_lines(frame);
}

pub fn draw_pose(frame: &mut Frame, pose: &Pose) {
    let (width, height) = (frame.width, frame.height);
    let points: Vec<Option<(f32, f32)>> = pose
        .landmarks
        .iter()
        .map(|lm| (lm.visibility >= MIN_DRAW_VISIBILITY).then(|| lm.to_pixels(width, height)))
        .collect();

    for &(a, b) in POSE_CONNECTIONS {
        if (a, b) == (LEFT_SHOULDER, RIGHT_SHOULDER) {
            continue;
        }
        if let (Some(Some(pa)), Some(Some(pb))) = (points.get(a), points.get(b)) {
            draw_line(
                &mut frame.rgba,
                width,
                height,
                pa,
                pb,
                SKELETON_COLOR,
                SKELETON_LINE_THICKNESS,
            );
        }
    }

    // The shoulder line is what drives the game, so it is always drawn.
    if let (Some(left), Some(right)) = (
        pose.landmark(LEFT_SHOULDER),
        pose.landmark(RIGHT_SHOULDER),
    ) {
        draw_line(
            &mut frame.rgba,
            width,
            height,
            &left.to_pixels(width, height),
            &right.to_pixels(width, height),
            LIMIT_COLOR,
            LIMIT_LINE_THICKNESS,
        );
    }

    let point_radius = (SKELETON_LINE_THICKNESS / 2).max(2) + 1;
    for &(x, y) in points.iter().flatten() {
        draw_circle(
            &mut frame.rgba,
            width,
            height,
            (x as i32, y as i32),
            point_radius,
            POINT_COLOR,
        );
    }
}

pub fn draw_limit_lines(frame: &mut Frame) {
    let (width, height) = (frame.width, frame.height);
    for limit in [UPPER_LIMIT, LOWER_LIMIT] {
        draw_line(
            &mut frame.rgba,
            width,
            height,
            &(0.0, limit),
            &(width as f32, limit),
            LIMIT_COLOR,
            LIMIT_LINE_THICKNESS,
        );
    }
}

fn draw_line(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    p0: &(f32, f32),
    p1: &(f32, f32),
    color: [u8; 4],
    thickness: i32,
) {
    let radius = (thickness.max(1) - 1) / 2;
    let Some((p0, p1)) = clip_segment(*p0, *p1, width, height, radius) else {
        return;
    };

    let (mut x0, mut y0) = (p0.0 as i32, p0.1 as i32);
    let (x1, y1) = (p1.0 as i32, p1.1 as i32);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        for ox in -radius..=radius {
            for oy in -radius..=radius {
                if ox.abs() + oy.abs() <= radius {
                    put_pixel_safe(buffer, width, height, x0 + ox, y0 + oy, color);
                }
            }
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Liang-Barsky clip against the frame grown by `margin` px on every side.
fn clip_segment(
    p0: (f32, f32),
    p1: (f32, f32),
    width: u32,
    height: u32,
    margin: i32,
) -> Option<((f32, f32), (f32, f32))> {
    if ![p0.0, p0.1, p1.0, p1.1].iter().all(|v| v.is_finite()) {
        return None;
    }

    let margin = f64::from(margin);
    let (min, max_x, max_y) = (
        -margin,
        f64::from(width) - 1.0 + margin,
        f64::from(height) - 1.0 + margin,
    );
    let (x0, y0) = (f64::from(p0.0), f64::from(p0.1));
    let (dx, dy) = (f64::from(p1.0) - x0, f64::from(p1.1) - y0);

    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [
        (-dx, x0 - min),
        (dx, max_x - x0),
        (-dy, y0 - min),
        (dy, max_y - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    // Clipped ends snap to whole pixels so float error cannot drop the edge column.
    let at = |t: f64| {
        (
            (x0 + t * dx).round() as f32,
            (y0 + t * dy).round() as f32,
        )
    };
    let start = if t0 > 0.0 { at(t0) } else { p0 };
    let end = if t1 < 1.0 { at(t1) } else { p1 };
    Some((start, end))
}

fn draw_circle(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    center: (i32, i32),
    radius: i32,
    color: [u8; 4],
) {
    let (cx, cy) = center;
    if cx < -radius || cy < -radius || cx > width as i32 + radius || cy > height as i32 + radius {
        return;
    }
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel_safe(buffer, width, height, cx + dx, cy + dy, color);
            }
        }
    }
}

fn put_pixel_safe(buffer: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let (ux, uy) = (x as u32, y as u32);
    if ux >= width || uy >= height {
        return;
    }
    let idx = ((uy * width + ux) as usize) * 4;
    if idx + 3 < buffer.len() {
        buffer[idx..idx + 4].copy_from_slice(&color);
    }
}
