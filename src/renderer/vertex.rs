//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
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

/// Colors for game elements
pub mod colors {
    use crate::sim::{PowerUpKind, ShapeType};

    /// `0xRRGGBB` to linear-ish RGBA
    pub const fn rgb(hex: u32) -> [f32; 4] {
        [
            ((hex >> 16) & 0xff) as f32 / 255.0,
            ((hex >> 8) & 0xff) as f32 / 255.0,
            (hex & 0xff) as f32 / 255.0,
            1.0,
        ]
    }

    pub const fn with_alpha(c: [f32; 4], a: f32) -> [f32; 4] {
        [c[0], c[1], c[2], a]
    }

    pub const BACKGROUND: [f32; 4] = rgb(0x212121);
    pub const TEXT: [f32; 4] = rgb(0xE0E0E0);
    pub const HEALTH_RED: [f32; 4] = rgb(0xD32F2F);
    pub const SUCCESS_GREEN: [f32; 4] = rgb(0x388E3C);
    pub const ACCENT_YELLOW: [f32; 4] = rgb(0xFBC02D);
    pub const BAR_TRACK: [f32; 4] = rgb(0x333333);
    pub const SPEED_BLUE: [f32; 4] = rgb(0x7FDBFF);
    pub const PANEL: [f32; 4] = rgb(0x222222);
    pub const WHITE: [f32; 4] = [1.0; 4];

    /// Duel ownership tint
    pub const DUEL_P1: [f32; 4] = rgb(0x039BE5);
    pub const DUEL_P2: [f32; 4] = rgb(0xD32F2F);

    pub const PLAYER_CIRCLE: [f32; 4] = rgb(0x039BE5);
    pub const PLAYER_TRIANGLE: [f32; 4] = rgb(0x00796B);
    pub const PLAYER_CUBE: [f32; 4] = rgb(0x8E24AA);

    pub const ENEMY_CIRCLE: [f32; 4] = rgb(0xFF5722);
    pub const ENEMY_TRIANGLE: [f32; 4] = rgb(0x9C27B0);
    pub const ENEMY_CUBE: [f32; 4] = rgb(0xD32F2F);

    pub fn player(shape: ShapeType) -> [f32; 4] {
        match shape {
            ShapeType::Circle => PLAYER_CIRCLE,
            ShapeType::Triangle => PLAYER_TRIANGLE,
            ShapeType::Cube => PLAYER_CUBE,
        }
    }

    pub fn enemy(shape: ShapeType) -> [f32; 4] {
        match shape {
            ShapeType::Circle => ENEMY_CIRCLE,
            ShapeType::Triangle => ENEMY_TRIANGLE,
            ShapeType::Cube => ENEMY_CUBE,
        }
    }

    pub fn duel_player(id: u8) -> [f32; 4] {
        if id == 1 { DUEL_P1 } else { DUEL_P2 }
    }

    /// Health fill by remaining fraction
    pub fn health(fraction: f32) -> [f32; 4] {
        if fraction > 0.6 {
            SUCCESS_GREEN
        } else if fraction > 0.3 {
            ACCENT_YELLOW
        } else {
            HEALTH_RED
        }
    }

    pub fn power_up(kind: PowerUpKind) -> [f32; 4] {
        match kind {
            PowerUpKind::Health => SUCCESS_GREEN,
            PowerUpKind::Shield => ACCENT_YELLOW,
            PowerUpKind::Speed => SPEED_BLUE,
        }
    }
}
