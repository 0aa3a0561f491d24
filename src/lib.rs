//! Wavefront OBJ loading.
//!
//! Reads `v`, `vt`, `vn` and `f` directives, fan-triangulates every face and
//! returns a flat [`IndexedMesh`] ready for upload. Normals are generated from
//! the triangles when the file has none.

extern crate nom;

mod assemble;
mod error;
mod normals;
mod obj;
mod options;
mod raw;
mod scanner;
pub mod model;

use std::path::Path;

use tracing::info;

pub use self::assemble::assemble;
pub use self::error::{AttributeKind, ObjError};
pub use self::model::{IndexedMesh, Vertex};
pub use self::normals::synthesize_normals;
pub use self::obj::{parse_raw, parse_raw_bytes};
pub use self::options::LoadOptions;
pub use self::raw::{IndexTriple, RawGeometry};

/// Parses OBJ text held in memory.
pub fn parse_obj_str(source: &str, options: &LoadOptions) -> Result<IndexedMesh, ObjError> {
    parse_obj_bytes(source.as_bytes(), options)
}

/// Parses an OBJ buffer without requiring it to be UTF-8 as a whole. Comments
/// and other skipped lines may use any encoding.
pub fn parse_obj_bytes(source: &[u8], options: &LoadOptions) -> Result<IndexedMesh, ObjError> {
    let raw = parse_raw_bytes(source, options)?;
    assemble(raw, options)
}

/// Loads an OBJ file with [`LoadOptions::default`].
pub fn load_obj_file<P: AsRef<Path>>(path: P) -> Result<IndexedMesh, ObjError> {
    load_obj_file_with(path, &LoadOptions::default())
}

/// Loads an OBJ file. The file is read whole and closed before parsing starts.
pub fn load_obj_file_with<P: AsRef<Path>>(
    path: P,
    options: &LoadOptions,
) -> Result<IndexedMesh, ObjError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| ObjError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mesh = parse_obj_bytes(&bytes, options).map_err(|e| {
        tracing::error!("Failed to load mesh {}: {}", path.display(), e);
        e
    })?;
    info!("Loaded mesh: {}", path.display());
    Ok(mesh)
}
