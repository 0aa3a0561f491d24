use glam::Vec3;
use tracing::warn;

use crate::model::IndexedMesh;

/// Replaces every vertex normal with the normalized sum of the unit face
/// normals of the triangles that use it. Winding follows the right-hand rule,
/// so a counter-clockwise triangle in the XY plane faces +Z.
///
/// Triangles with zero area contribute nothing. Vertices no triangle
/// references end up with a zero normal.
pub fn synthesize_normals(mesh: &mut IndexedMesh) {
    let mut accumulated = vec![Vec3::ZERO; mesh.vertices.len()];
    let mut degenerate = 0usize;

    for [i0, i1, i2] in mesh.triangles() {
        let (i0, i1, i2) = (i0 as usize, i1 as usize, i2 as usize);
        let p0 = Vec3::from(mesh.vertices[i0].p);
        let e1 = Vec3::from(mesh.vertices[i1].p) - p0;
        let e2 = Vec3::from(mesh.vertices[i2].p) - p0;

        let n = match e1.cross(e2).try_normalize() {
            Some(n) => n,
            None => {
                degenerate += 1;
                continue;
            }
        };
        accumulated[i0] += n;
        accumulated[i1] += n;
        accumulated[i2] += n;
    }

    if degenerate > 0 {
        warn!(degenerate, "skipped degenerate triangles while generating normals");
    }

    for (vertex, n) in mesh.vertices.iter_mut().zip(accumulated) {
        vertex.normal = n.try_normalize().unwrap_or(Vec3::ZERO).to_array();
    }
}
