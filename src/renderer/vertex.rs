//! Vertex types for the tactical map

use bytemuck::{Pod, Zeroable};

/// 2D map vertex with position (world x, world z) and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Map palette
pub mod colors {
    pub const SEA: [f32; 4] = [0.10, 0.32, 0.55, 1.0];
    pub const SAND: [f32; 4] = [0.86, 0.78, 0.56, 1.0];
    pub const DUNE_CREST: [f32; 4] = [0.62, 0.50, 0.30, 1.0];
    pub const BACK_LINE: [f32; 4] = [0.85, 0.15, 0.15, 0.9];
    pub const BORDER: [f32; 4] = [1.0, 0.85, 0.3, 1.0];
    pub const PLAYER: [f32; 4] = [0.2, 0.9, 0.4, 1.0];
    pub const LIGHT_GHOST: [f32; 4] = [0.8, 0.95, 1.0, 1.0];
    pub const HEAVY_GHOST: [f32; 4] = [0.55, 0.1, 0.2, 1.0];
    pub const ATTACK_RING: [f32; 4] = [1.0, 0.3, 0.1, 0.8];
    pub const SPARK: [f32; 4] = [1.0, 0.95, 0.6, 1.0];
    pub const TRAIL_OUTER: [f32; 4] = [1.0, 0.6, 0.2, 1.0];
    pub const TRAIL_INNER: [f32; 4] = [1.0, 1.0, 0.9, 1.0];
    pub const BACKGROUND: [f32; 4] = [0.02, 0.02, 0.05, 1.0];

    /// Same color with alpha scaled
    pub fn fade(color: [f32; 4], alpha: f32) -> [f32; 4] {
        [color[0], color[1], color[2], color[3] * alpha.clamp(0.0, 1.0)]
    }

    /// Linear blend between two colors
    pub fn mix(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
        let t = t.clamp(0.0, 1.0);
        [
            a[0] + (b[0] - a[0]) * t,
            a[1] + (b[1] - a[1]) * t,
            a[2] + (b[2] - a[2]) * t,
            a[3] + (b[3] - a[3]) * t,
        ]
    }
}
