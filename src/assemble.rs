use std::convert::TryFrom;

use tracing::debug;

use crate::error::{AttributeKind, ObjError};
use crate::model::{IndexedMesh, Vertex};
use crate::normals::synthesize_normals;
use crate::options::LoadOptions;
use crate::raw::{push_doubling, IndexTriple, RawGeometry};

fn lookup<T: Copy>(items: &[T], index: i64, kind: AttributeKind) -> Result<T, ObjError> {
    if index < 0 || index as u64 >= items.len() as u64 {
        return Err(ObjError::IndexOutOfRange {
            kind,
            index,
            bound: items.len(),
        });
    }
    Ok(items[index as usize])
}

fn corner_vertex(raw: &RawGeometry, corner: &IndexTriple) -> Result<Vertex, ObjError> {
    let mut vertex = Vertex {
        p: lookup(&raw.positions, corner.position, AttributeKind::Position)?.to_array(),
        ..Vertex::default()
    };

    if raw.has_uvs {
        if let Some(i) = corner.uv {
            vertex.uv = lookup(&raw.uvs, i, AttributeKind::TexCoord)?.to_array();
        }
    }
    if raw.has_normals {
        if let Some(i) = corner.normal {
            vertex.normal = lookup(&raw.normals, i, AttributeKind::Normal)?.to_array();
        }
    }
    Ok(vertex)
}

fn vertex_index(count: usize) -> Result<u32, ObjError> {
    u32::try_from(count).map_err(|_| ObjError::TooManyVertices { count })
}

/// Appends the fan `(0,1,2), (0,2,3), ..., (0,n-2,n-1)` for a face whose
/// corners start at vertex `first`.
fn fan_triangulate(first: usize, corners: usize, indices: &mut Vec<u32>) -> Result<(), ObjError> {
    if corners < 3 {
        return Ok(());
    }
    let anchor = vertex_index(first)?;
    let last = vertex_index(first + corners - 1)?;

    for j in anchor + 2..=last {
        push_doubling(indices, anchor)?;
        push_doubling(indices, j - 1)?;
        push_doubling(indices, j)?;
    }
    Ok(())
}

/// Builds the flat triangle mesh from parsed geometry. Each face corner
/// becomes its own vertex; nothing is shared between faces.
pub fn assemble(raw: RawGeometry, options: &LoadOptions) -> Result<IndexedMesh, ObjError> {
    let mut vertices = Vec::new();
    vertices.try_reserve_exact(raw.face_corners.len())?;
    let mut indices = Vec::new();
    indices.try_reserve_exact(raw.face_corners.len())?;

    for corners in raw.faces() {
        let first = vertices.len();
        for corner in corners {
            vertices.push(corner_vertex(&raw, corner)?);
        }
        fan_triangulate(first, corners.len(), &mut indices)?;
    }

    let mut mesh = IndexedMesh { vertices, indices };
    debug!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "assembled mesh"
    );

    if !raw.has_normals && options.generate_normals {
        synthesize_normals(&mut mesh);
    }
    Ok(mesh)
}
