use cgmath::{InnerSpace, Vector3};
use neon_city::{
    config::CityConfig,
    data_structures::scene_graph::MeshKey,
    resources::{
        build_mesh,
        geometry::{MeshData, cuboid, plane, sphere, torus},
    },
};

fn v(p: [f32; 3]) -> Vector3<f32> {
    p.into()
}

/// Every non-degenerate triangle must face away from `inside`.
fn assert_faces_outward(mesh: &MeshData, inside: Vector3<f32>) {
    for tri in mesh.indices.chunks(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| v(mesh.vertices[i as usize].position));
        let normal = (b - a).cross(c - a);
        if normal.magnitude() < 1e-6 {
            continue;
        }
        let centroid = (a + b + c) / 3.0;
        assert!(normal.dot(centroid - inside) > 0.0, "triangle {:?} faces inward", tri);
    }
}

fn assert_unit_normals(mesh: &MeshData) {
    for vertex in &mesh.vertices {
        let length = v(vertex.normal).magnitude();
        assert!((length - 1.0).abs() < 1e-4, "normal length {}", length);
    }
}

fn assert_indices_in_range(mesh: &MeshData) {
    assert_eq!(mesh.indices.len() % 3, 0);
    let count = mesh.vertices.len() as u32;
    assert!(mesh.indices.iter().all(|&i| i < count));
}

#[test]
fn cuboid_is_closed_and_centred() {
    let mesh = cuboid(5.0, 25.0, 5.0);
    assert_eq!(mesh.vertices.len(), 24);
    assert_eq!(mesh.triangle_count(), 12);
    assert_indices_in_range(&mesh);
    assert_unit_normals(&mesh);
    assert_faces_outward(&mesh, Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(mesh.bounds(), ([-2.5, -12.5, -2.5], [2.5, 12.5, 2.5]));
}

#[test]
fn plane_faces_positive_z() {
    let mesh = plane(400.0, 400.0);
    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(mesh.triangle_count(), 2);
    assert_faces_outward(&mesh, Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(mesh.bounds(), ([-200.0, -200.0, 0.0], [200.0, 200.0, 0.0]));
}

#[test]
fn sphere_vertices_lie_on_the_radius() {
    let mesh = sphere(200.0, 64, 64);
    assert_eq!(mesh.vertices.len(), 65 * 65);
    // two triangles per quad, one per quad in the two pole rows
    assert_eq!(mesh.triangle_count(), 64 * (2 * 64 - 2));
    assert_indices_in_range(&mesh);
    assert_unit_normals(&mesh);
    for vertex in &mesh.vertices {
        let r = v(vertex.position).magnitude();
        assert!((r - 200.0).abs() < 1e-2, "radius {}", r);
    }
    assert_faces_outward(&mesh, Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn sphere_uvs_span_the_unit_square() {
    let mesh = sphere(1.0, 8, 6);
    let (mut u_max, mut v_max) = (0.0f32, 0.0f32);
    for vertex in &mesh.vertices {
        let [u, v] = vertex.tex_coords;
        assert!((0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v));
        u_max = u_max.max(u);
        v_max = v_max.max(v);
    }
    assert_eq!((u_max, v_max), (1.0, 1.0));
}

#[test]
fn torus_surrounds_its_centre_circle() {
    let (radius, tube) = (3.0, 0.2);
    let mesh = torus(radius, tube, 16, 100);
    assert_eq!(mesh.vertices.len(), 17 * 101);
    assert_eq!(mesh.triangle_count(), 2 * 16 * 100);
    assert_indices_in_range(&mesh);
    assert_unit_normals(&mesh);

    for vertex in &mesh.vertices {
        let p = v(vertex.position);
        let ring = Vector3::new(p.x, p.y, 0.0);
        let centre = if ring.magnitude() > 0.0 {
            ring.normalize() * radius
        } else {
            ring
        };
        assert!(((p - centre).magnitude() - tube).abs() < 1e-4);
    }

    let (min, max) = mesh.bounds();
    assert!((max[0] - (radius + tube)).abs() < 1e-4);
    assert!((min[0] + (radius + tube)).abs() < 1e-4);
    assert!((max[2] - tube).abs() < 1e-4);
}

#[test]
fn mesh_keys_build_the_configured_sizes() {
    let city = CityConfig::default();

    let (min, max) = build_mesh(MeshKey::Tower(20), &city).bounds();
    assert_eq!((min[1], max[1]), (-10.0, 10.0));
    assert_eq!((min[0], max[0]), (-2.5, 2.5));

    let (min, max) = build_mesh(MeshKey::Ground, &city).bounds();
    assert_eq!((min[0], max[0]), (-200.0, 200.0));

    let sky = build_mesh(MeshKey::SkySphere, &city);
    let (_, max) = sky.bounds();
    assert!((max[1] - city.sky_radius).abs() < 1e-3);

    let ring = build_mesh(MeshKey::Ring, &city);
    assert_eq!(ring.triangle_count(), 3200);
}
