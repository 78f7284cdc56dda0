//! Procedural meshes.
//!
//! All generators produce counter-clockwise front faces, outward normals and
//! texture coordinates with v pointing down (wgpu convention).

use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector3};

use crate::data_structures::model::{Mesh, ModelVertex};

/// CPU-side geometry before upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn upload(&self, device: &wgpu::Device, name: &str) -> Mesh {
        Mesh::new(device, name, &self.vertices, &self.indices)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis aligned bounds as (min, max).
    pub fn bounds(&self) -> ([f32; 3], [f32; 3]) {
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        for v in &self.vertices {
            for axis in 0..3 {
                min[axis] = min[axis].min(v.position[axis]);
                max[axis] = max[axis].max(v.position[axis]);
            }
        }
        (min, max)
    }
}

/// A box centred at the origin.
pub fn cuboid(width: f32, height: f32, depth: f32) -> MeshData {
    let half = Vector3::new(width / 2.0, height / 2.0, depth / 2.0);
    // (normal, u axis, v axis) with u x v == normal so the quads wind CCW from outside
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];
    let extent = |axis: Vector3<f32>| {
        axis.x.abs() * half.x + axis.y.abs() * half.y + axis.z.abs() * half.z
    };

    let mut data = MeshData::default();
    for (normal, u, v) in faces {
        let (n, u, v): (Vector3<f32>, Vector3<f32>, Vector3<f32>) = (normal.into(), u.into(), v.into());
        let base = data.vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = n * extent(n) + u * (su * extent(u)) + v * (sv * extent(v));
            data.vertices.push(ModelVertex {
                position: position.into(),
                tex_coords: [(su + 1.0) / 2.0, 1.0 - (sv + 1.0) / 2.0],
                normal,
            });
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    data
}

/// A single quad in the XY plane facing +Z.
pub fn plane(width: f32, height: f32) -> MeshData {
    let (hw, hh) = (width / 2.0, height / 2.0);
    let corners = [(-hw, -hh, 0.0, 1.0), (hw, -hh, 1.0, 1.0), (hw, hh, 1.0, 0.0), (-hw, hh, 0.0, 0.0)];
    MeshData {
        vertices: corners
            .iter()
            .map(|&(x, y, u, v)| ModelVertex {
                position: [x, y, 0.0],
                tex_coords: [u, v],
                normal: [0.0, 0.0, 1.0],
            })
            .collect(),
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

/// A UV sphere. Seams share positions but not texture coordinates.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let mut data = MeshData::default();

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let (sin_theta, cos_theta) = (v * PI).sin_cos();
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let (sin_phi, cos_phi) = (u * 2.0 * PI).sin_cos();
            let position = Vector3::new(
                -radius * cos_phi * sin_theta,
                radius * cos_theta,
                radius * sin_phi * sin_theta,
            );
            let normal = if position.magnitude2() > 0.0 {
                position.normalize()
            } else {
                Vector3::unit_y()
            };
            data.vertices.push(ModelVertex {
                position: position.into(),
                tex_coords: [u, v],
                normal: normal.into(),
            });
        }
    }

    let row = width_segments + 1;
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            // the pole rows collapse to a single triangle
            if iy != 0 {
                data.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                data.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    data
}

/// A torus in the XY plane around the Z axis.
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let radial_segments = radial_segments.max(3);
    let tubular_segments = tubular_segments.max(3);
    let mut data = MeshData::default();

    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * 2.0 * PI;
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * 2.0 * PI;
            let position = Vector3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let centre = Vector3::new(radius * u.cos(), radius * u.sin(), 0.0);
            let normal = (position - centre).normalize();
            data.vertices.push(ModelVertex {
                position: position.into(),
                tex_coords: [
                    i as f32 / tubular_segments as f32,
                    1.0 - j as f32 / radial_segments as f32,
                ],
                normal: normal.into(),
            });
        }
    }

    let row = tubular_segments + 1;
    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            data.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    data
}
