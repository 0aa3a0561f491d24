/// Knobs for a single load. `Default` mirrors the engine's historical limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Faces with more corners than this are rejected.
    pub max_face_corners: usize,
    /// Starting capacity of the position, uv and normal arrays.
    pub initial_vertex_capacity: usize,
    /// Starting capacity of the face corner list.
    pub initial_index_capacity: usize,
    /// Synthesize normals from triangle geometry when the file has no `vn`.
    pub generate_normals: bool,
}

pub const DEFAULT_MAX_FACE_CORNERS: usize = 16;
pub const DEFAULT_INITIAL_CAPACITY: usize = 10_000;

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            max_face_corners: DEFAULT_MAX_FACE_CORNERS,
            initial_vertex_capacity: DEFAULT_INITIAL_CAPACITY,
            initial_index_capacity: DEFAULT_INITIAL_CAPACITY,
            generate_normals: true,
        }
    }
}

impl LoadOptions {
    pub fn with_max_face_corners(mut self, limit: usize) -> Self {
        self.max_face_corners = limit;
        self
    }

    pub fn with_initial_capacity(mut self, vertices: usize, indices: usize) -> Self {
        self.initial_vertex_capacity = vertices;
        self.initial_index_capacity = indices;
        self
    }

    pub fn with_generate_normals(mut self, enabled: bool) -> Self {
        self.generate_normals = enabled;
        self
    }
}
