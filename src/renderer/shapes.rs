//! Triangle-list primitives for the tactical map
//!
//! All positions are map coordinates: world x to the right, world z up.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

/// Axis-aligned filled rectangle
pub fn rect(min: Vec2, max: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, max.y, color),
        Vertex::new(min.x, max.y, color),
    ]
}

/// Thick line segment
pub fn segment(a: Vec2, b: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = (b - a).normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }
    let perp = dir.perp() * (width * 0.5);
    let (a1, a2, b1, b2) = (a + perp, a - perp, b + perp, b - perp);
    vec![
        Vertex::new(a1.x, a1.y, color),
        Vertex::new(a2.x, a2.y, color),
        Vertex::new(b1.x, b1.y, color),
        Vertex::new(b1.x, b1.y, color),
        Vertex::new(a2.x, a2.y, color),
        Vertex::new(b2.x, b2.y, color),
    ]
}

/// Rectangle outline with the given stroke width
pub fn outline(min: Vec2, max: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let corners = [
        min,
        Vec2::new(max.x, min.y),
        max,
        Vec2::new(min.x, max.y),
    ];
    let mut vertices = Vec::with_capacity(24);
    for i in 0..4 {
        vertices.extend(segment(corners[i], corners[(i + 1) % 4], width, color));
    }
    vertices
}

/// Filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;
        let p1 = center + Vec2::from_angle(theta1) * radius;
        let p2 = center + Vec2::from_angle(theta2) * radius;

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(p1.x, p1.y, color));
        vertices.push(Vertex::new(p2.x, p2.y, color));
    }

    vertices
}

/// Hollow circle
pub fn ring(center: Vec2, inner: f32, outer: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let d1 = Vec2::from_angle((i as f32 / segments as f32) * 2.0 * PI);
        let d2 = Vec2::from_angle(((i + 1) as f32 / segments as f32) * 2.0 * PI);
        let (i1, o1) = (center + d1 * inner, center + d1 * outer);
        let (i2, o2) = (center + d2 * inner, center + d2 * outer);

        vertices.push(Vertex::new(i1.x, i1.y, color));
        vertices.push(Vertex::new(o1.x, o1.y, color));
        vertices.push(Vertex::new(i2.x, i2.y, color));

        vertices.push(Vertex::new(i2.x, i2.y, color));
        vertices.push(Vertex::new(o1.x, o1.y, color));
        vertices.push(Vertex::new(o2.x, o2.y, color));
    }

    vertices
}

/// Facing wedge: a triangle pointing along `dir` from `center`
pub fn wedge(center: Vec2, dir: Vec2, length: f32, half_width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = dir.normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }
    let tip = center + dir * length;
    let side = dir.perp() * half_width;
    let (l, r) = (center + side, center - side);
    vec![
        Vertex::new(l.x, l.y, color),
        Vertex::new(r.x, r.y, color),
        Vertex::new(tip.x, tip.y, color),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapes_are_triangle_lists() {
        let c = [1.0; 4];
        assert_eq!(rect(Vec2::ZERO, Vec2::ONE, c).len() % 3, 0);
        assert_eq!(outline(Vec2::ZERO, Vec2::ONE, 0.1, c).len(), 24);
        assert_eq!(circle(Vec2::ZERO, 1.0, c, 12).len(), 36);
        assert_eq!(ring(Vec2::ZERO, 0.5, 1.0, c, 12).len(), 72);
        assert_eq!(wedge(Vec2::ZERO, Vec2::Y, 2.0, 0.5, c).len(), 3);
    }

    #[test]
    fn test_degenerate_inputs_draw_nothing() {
        let c = [1.0; 4];
        assert!(segment(Vec2::ONE, Vec2::ONE, 1.0, c).is_empty());
        assert!(wedge(Vec2::ZERO, Vec2::ZERO, 1.0, 1.0, c).is_empty());
    }

    #[test]
    fn test_wedge_points_along_direction() {
        let v = wedge(Vec2::ZERO, Vec2::new(0.0, 3.0), 5.0, 1.0, [1.0; 4]);
        assert_eq!(v[2].position, [0.0, 5.0]);
    }
}
