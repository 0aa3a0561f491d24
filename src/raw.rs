use glam::{Vec2, Vec3};

use crate::error::ObjError;

/// A face corner after relative indices have been resolved. Values are
/// zero-based but unchecked: a bad file can yield negatives or indices past
/// the end, which assembly reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexTriple {
    pub position: i64,
    pub uv: Option<i64>,
    pub normal: Option<i64>,
}

impl IndexTriple {
    pub fn new(position: i64, uv: Option<i64>, normal: Option<i64>) -> Self {
        IndexTriple {
            position,
            uv,
            normal,
        }
    }
}

/// Appends `value`, doubling the capacity first when the buffer is full.
pub(crate) fn push_doubling<T>(buffer: &mut Vec<T>, value: T) -> Result<(), ObjError> {
    if buffer.len() == buffer.capacity() {
        let additional = buffer.capacity().max(1);
        buffer.try_reserve_exact(additional)?;
    }
    buffer.push(value);
    Ok(())
}

fn with_capacity<T>(capacity: usize) -> Result<Vec<T>, ObjError> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(capacity)?;
    Ok(buffer)
}

/// Everything read out of an OBJ file before triangulation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGeometry {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub face_corners: Vec<IndexTriple>,
    pub corners_per_face: Vec<u32>,
    pub has_uvs: bool,
    pub has_normals: bool,
}

impl RawGeometry {
    pub fn with_capacity(vertices: usize, indices: usize) -> Result<Self, ObjError> {
        Ok(RawGeometry {
            positions: with_capacity(vertices)?,
            uvs: with_capacity(vertices)?,
            normals: with_capacity(vertices)?,
            face_corners: with_capacity(indices)?,
            corners_per_face: with_capacity(indices / 3)?,
            has_uvs: false,
            has_normals: false,
        })
    }

    pub fn push_position(&mut self, p: Vec3) -> Result<(), ObjError> {
        push_doubling(&mut self.positions, p)
    }

    pub fn push_uv(&mut self, uv: Vec2) -> Result<(), ObjError> {
        self.has_uvs = true;
        push_doubling(&mut self.uvs, uv)
    }

    pub fn push_normal(&mut self, n: Vec3) -> Result<(), ObjError> {
        self.has_normals = true;
        push_doubling(&mut self.normals, n)
    }

    pub fn push_face(&mut self, corners: &[IndexTriple]) -> Result<(), ObjError> {
        for &corner in corners {
            push_doubling(&mut self.face_corners, corner)?;
        }
        push_doubling(&mut self.corners_per_face, corners.len() as u32)
    }

    pub fn face_count(&self) -> usize {
        self.corners_per_face.len()
    }

    /// Iterates over the corners of each face in declaration order.
    pub fn faces(&self) -> Faces<'_> {
        Faces {
            raw: self,
            face: 0,
            offset: 0,
        }
    }
}

pub struct Faces<'a> {
    raw: &'a RawGeometry,
    face: usize,
    offset: usize,
}

impl<'a> Iterator for Faces<'a> {
    type Item = &'a [IndexTriple];

    fn next(&mut self) -> Option<Self::Item> {
        let count = *self.raw.corners_per_face.get(self.face)? as usize;
        let corners = &self.raw.face_corners[self.offset..self.offset + count];
        self.face += 1;
        self.offset += count;
        Some(corners)
    }
}
