use glam::{Vec2, Vec3};
use nom::branch::alt;
use nom::character::complete::{char, digit1, one_of, space0, space1};
use nom::combinator::{eof, map_res, opt, peek, recognize, value};
use nom::number::complete::float;
use nom::sequence::{pair, preceded, terminated};
use nom::IResult;
use tracing::{debug, trace};

use crate::error::ObjError;
use crate::options::LoadOptions;
use crate::raw::{IndexTriple, RawGeometry};
use crate::scanner::{Directive, Line, Scanner};

/*
    Basic Parsers
*/

/// Succeeds without consuming if a token ends here.
fn token_end(input: &str) -> IResult<&str, ()> {
    peek(alt((value((), space1), value((), char('#')), value((), eof))))(input)
}

fn line_end(input: &str) -> IResult<&str, ()> {
    preceded(space0, alt((value((), char('#')), value((), eof))))(input)
}

/*
    Vertex Attributes
*/

fn component(input: &str) -> IResult<&str, f32> {
    preceded(space1, terminated(float, token_end))(input)
}

/// Reads `out.len()` whitespace-separated floats from the body of a
/// `v`/`vt`/`vn` line. Anything after them (a `w` component, a comment) is
/// ignored.
fn parse_components(body: &str, out: &mut [f32], line: usize) -> Result<(), ObjError> {
    let mut rest = body;
    for slot in out.iter_mut() {
        let (remainder, v) = component(rest).map_err(|_| ObjError::MalformedNumber { line })?;
        *slot = v;
        rest = remainder;
    }
    Ok(())
}

pub fn parse_vec3(body: &str, line: usize) -> Result<Vec3, ObjError> {
    let mut c = [0.0; 3];
    parse_components(body, &mut c, line)?;
    Ok(Vec3::from(c))
}

pub fn parse_vec2(body: &str, line: usize) -> Result<Vec2, ObjError> {
    let mut c = [0.0; 2];
    parse_components(body, &mut c, line)?;
    Ok(Vec2::from(c))
}

/*
    Faces
*/

fn face_index(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(one_of("+-")), digit1)), |s: &str| {
        s.parse::<i64>()
    })(input)
}

/// `v`, `v/vt`, `v/vt/vn` or `v//vn`.
fn face_corner(input: &str) -> IResult<&str, (i64, Option<i64>, Option<i64>)> {
    let (input, v) = face_index(input)?;
    let (input, rest) = opt(preceded(
        char('/'),
        pair(opt(face_index), opt(preceded(char('/'), face_index))),
    ))(input)?;
    let (input, _) = token_end(input)?;

    let (vt, vn) = rest.unwrap_or((None, None));
    Ok((input, (v, vt, vn)))
}

/// Turns a 1-based or negative OBJ index into a zero-based one, given how
/// many elements of that kind were declared before the face.
pub fn resolve_index(value: i64, declared: usize) -> i64 {
    if value < 0 {
        declared as i64 + value
    } else {
        value - 1
    }
}

/// Counts of each attribute declared before the face being parsed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Declared {
    pub positions: usize,
    pub uvs: usize,
    pub normals: usize,
}

/// Parses the body of an `f` line into `corners`, which is cleared first.
pub fn parse_face(
    body: &str,
    line: usize,
    declared: Declared,
    max_corners: usize,
    corners: &mut Vec<IndexTriple>,
) -> Result<(), ObjError> {
    corners.clear();
    let malformed = |_| ObjError::MalformedIndex { line };

    let mut rest = body;
    loop {
        if line_end(rest).is_ok() {
            break;
        }
        let (remainder, _) = space1::<_, nom::error::Error<&str>>(rest).map_err(malformed)?;
        if line_end(remainder).is_ok() {
            break;
        }
        let (remainder, (v, vt, vn)) = face_corner(remainder).map_err(malformed)?;
        rest = remainder;

        if v == 0 || vt == Some(0) || vn == Some(0) {
            return Err(ObjError::MalformedIndex { line });
        }
        if corners.len() == max_corners {
            return Err(ObjError::FaceTooLarge {
                line,
                limit: max_corners,
            });
        }

        corners.push(IndexTriple::new(
            resolve_index(v, declared.positions),
            vt.map(|i| resolve_index(i, declared.uvs)),
            vn.map(|i| resolve_index(i, declared.normals)),
        ));
    }

    if corners.len() < 3 {
        return Err(ObjError::FaceTooSmall { line });
    }
    Ok(())
}

/*
    File
*/

/// Decodes the body of a line the loader reads. Only these lines need to be
/// text; everything else is skipped as raw bytes.
fn line_body<'a>(source: &'a [u8], line: &Line) -> Result<&'a str, ObjError> {
    std::str::from_utf8(line.body(source)).map_err(|_| match line.directive {
        Directive::Face => ObjError::MalformedIndex { line: line.number },
        _ => ObjError::MalformedNumber { line: line.number },
    })
}

fn parse_line(
    source: &[u8],
    line: &Line,
    options: &LoadOptions,
    raw: &mut RawGeometry,
    scratch: &mut Vec<IndexTriple>,
) -> Result<(), ObjError> {
    match line.directive {
        Directive::Position => {
            let p = parse_vec3(line_body(source, line)?, line.number)?;
            raw.push_position(p)
        }
        Directive::TexCoord => {
            let uv = parse_vec2(line_body(source, line)?, line.number)?;
            raw.push_uv(uv)
        }
        Directive::Normal => {
            let n = parse_vec3(line_body(source, line)?, line.number)?;
            raw.push_normal(n)
        }
        Directive::Face => {
            let body = line_body(source, line)?;
            let declared = Declared {
                positions: raw.positions.len(),
                uvs: raw.uvs.len(),
                normals: raw.normals.len(),
            };
            parse_face(body, line.number, declared, options.max_face_corners, scratch)?;
            raw.push_face(scratch.as_slice())
        }
        Directive::Other => {
            trace!(
                line = line.number,
                "skipping {:?}",
                String::from_utf8_lossy(line.text(source))
            );
            Ok(())
        }
    }
}

/// Reads every supported directive of `source` into a [`RawGeometry`].
pub fn parse_raw(source: &str, options: &LoadOptions) -> Result<RawGeometry, ObjError> {
    parse_raw_bytes(source.as_bytes(), options)
}

/// Like [`parse_raw`], for a buffer that is not known to be UTF-8. Only the
/// `v`, `vt`, `vn` and `f` lines have to decode.
pub fn parse_raw_bytes(source: &[u8], options: &LoadOptions) -> Result<RawGeometry, ObjError> {
    let mut raw = RawGeometry::with_capacity(
        options.initial_vertex_capacity,
        options.initial_index_capacity,
    )?;
    let mut scratch = Vec::new();
    scratch.try_reserve_exact(options.max_face_corners)?;

    for line in Scanner::new(source) {
        parse_line(source, &line, options, &mut raw, &mut scratch)?;
    }

    debug!(
        positions = raw.positions.len(),
        uvs = raw.uvs.len(),
        normals = raw.normals.len(),
        faces = raw.face_count(),
        "parsed OBJ source"
    );
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> LoadOptions {
        LoadOptions::default().with_initial_capacity(1, 1)
    }

    fn positions(raw: &RawGeometry, face: usize) -> Vec<i64> {
        raw.faces().nth(face).unwrap().iter().map(|c| c.position).collect()
    }

    #[test]
    fn test_parse_vertex() {
        let v = parse_vec3(" 1.000000 1.000000 -1.000000", 1).unwrap();
        assert_eq!(v, Vec3::new(1.0, 1.0, -1.0));
    }

    #[test]
    fn test_parse_vertex_with_comment() {
        let v = parse_vec3(" 1.000000 1.000000 -1.000000 #Vertex 1", 1).unwrap();
        assert_eq!(v, Vec3::new(1.0, 1.0, -1.0));
    }

    #[test]
    fn test_parse_vertex_with_extra_spacing_and_w() {
        let v = parse_vec3("  2.5\t-3e2   4 1.0", 1).unwrap();
        assert_eq!(v, Vec3::new(2.5, -300.0, 4.0));
    }

    #[test]
    fn test_parse_texture_coordinates() {
        let uv = parse_vec2(" 0.333134 0.000200", 1).unwrap();
        assert_eq!(uv, Vec2::new(0.333134, 0.000200));
    }

    #[test]
    fn test_parse_vertex_missing_component() {
        match parse_vec3(" 1.0 2.0", 7) {
            Err(ObjError::MalformedNumber { line }) => assert_eq!(line, 7),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_vertex_garbage_component() {
        assert!(matches!(
            parse_vec3(" 1.0 2.0x 3.0", 2),
            Err(ObjError::MalformedNumber { line: 2 })
        ));
        assert!(matches!(
            parse_vec2(" abc 1", 3),
            Err(ObjError::MalformedNumber { line: 3 })
        ));
    }

    #[test]
    fn test_parse_face_index() {
        assert_eq!(face_corner("1/16/10005 "), Ok((" ", (1, Some(16), Some(10005)))));
        assert_eq!(face_corner("5//1"), Ok(("", (5, None, Some(1)))));
        assert_eq!(face_corner("5/2"), Ok(("", (5, Some(2), None))));
        assert_eq!(face_corner("-3"), Ok(("", (-3, None, None))));
    }

    #[test]
    fn test_parse_face_index_rejects_trailing_garbage() {
        assert!(face_corner("1/2/").is_err());
        assert!(face_corner("1x").is_err());
        assert!(face_corner("/1").is_err());
    }

    #[test]
    fn test_parse_face() {
        let declared = Declared { positions: 5, uvs: 3, normals: 1 };
        let mut corners = Vec::new();
        parse_face(" 5/1/1 3/2/1 1/3/1", 1, declared, 16, &mut corners).unwrap();

        assert_eq!(
            corners,
            vec![
                IndexTriple::new(4, Some(0), Some(0)),
                IndexTriple::new(2, Some(1), Some(0)),
                IndexTriple::new(0, Some(2), Some(0)),
            ]
        );
    }

    #[test]
    fn test_parse_face_missing_texture_coordinates() {
        let declared = Declared { positions: 5, uvs: 0, normals: 1 };
        let mut corners = Vec::new();
        parse_face(" 5//1 3//1 1//1 # tri", 1, declared, 16, &mut corners).unwrap();

        let uvs: Vec<Option<i64>> = corners.iter().map(|c| c.uv).collect();
        let normals: Vec<Option<i64>> = corners.iter().map(|c| c.normal).collect();
        assert_eq!(uvs, vec![None, None, None]);
        assert_eq!(normals, vec![Some(0), Some(0), Some(0)]);
    }

    #[test]
    fn test_negative_indices_resolve_against_declared_count() {
        let raw = parse_raw("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf -1 -2 -3\n", &small()).unwrap();
        assert_eq!(positions(&raw, 0), vec![3, 2, 1]);
    }

    #[test]
    fn test_negative_indices_use_count_at_face_line() {
        let input = "v 0 0 0\nv 1 0 0\nv 1 1 0\nf -3 -2 -1\nv 0 1 0\nv 5 5 5\nf -3 -2 -1\n";
        let raw = parse_raw(input, &small()).unwrap();

        assert_eq!(positions(&raw, 0), vec![0, 1, 2]);
        assert_eq!(positions(&raw, 1), vec![2, 3, 4]);
    }

    #[test]
    fn test_face_too_small() {
        let result = parse_raw("v 0 0 0\nv 1 0 0\nf 1 2\n", &small());
        assert!(matches!(result, Err(ObjError::FaceTooSmall { line: 3 })));
    }

    #[test]
    fn test_face_too_large() {
        let options = small().with_max_face_corners(4);
        let result = parse_raw("f 1 2 3 4 5\n", &options);
        assert!(matches!(
            result,
            Err(ObjError::FaceTooLarge { line: 1, limit: 4 })
        ));
    }

    #[test]
    fn test_face_at_corner_limit() {
        let options = small().with_max_face_corners(4);
        let raw = parse_raw("f 1 2 3 4\n", &options).unwrap();
        assert_eq!(raw.corners_per_face, vec![4]);
    }

    #[test]
    fn test_zero_index_is_malformed() {
        let result = parse_raw("f 0 1 2\n", &small());
        assert!(matches!(result, Err(ObjError::MalformedIndex { line: 1 })));
    }

    #[test]
    fn test_garbage_corner_is_malformed() {
        let result = parse_raw("v 0 0 0\n\nf 1 a 2\n", &small());
        assert!(matches!(result, Err(ObjError::MalformedIndex { line: 3 })));
    }

    #[test]
    fn test_unsupported_directives_are_skipped() {
        let input = "# comment\nmtllib cube.mtl\no Cube\ng group\ns off\nusemtl Material\nl 1 2\nv 1 2 3\n";
        let raw = parse_raw(input, &small()).unwrap();

        assert_eq!(raw.positions, vec![Vec3::new(1.0, 2.0, 3.0)]);
        assert_eq!(raw.face_count(), 0);
        assert!(!raw.has_uvs);
        assert!(!raw.has_normals);
    }

    #[test]
    fn test_latin1_comment_is_skipped() {
        let input = b"# Autor: M\xFCller\nusemtl caf\xE9\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let raw = parse_raw_bytes(input, &small()).unwrap();

        assert_eq!(raw.positions.len(), 3);
        assert_eq!(raw.corners_per_face, vec![3]);
    }

    #[test]
    fn test_non_utf8_attribute_line() {
        let result = parse_raw_bytes(b"v 0 0 0\nv 1 \xFF 0\n", &small());
        assert!(matches!(result, Err(ObjError::MalformedNumber { line: 2 })));
    }

    #[test]
    fn test_non_utf8_face_line() {
        let result = parse_raw_bytes(b"v 0 0 0\nf 1 1 \xFF1\n", &small());
        assert!(matches!(result, Err(ObjError::MalformedIndex { line: 2 })));
    }

    #[test]
    fn test_mixed_attributes() {
        let input = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nvn 0 0 1\nf 1/1/1 2/2/1 3/3/1\n";
        let raw = parse_raw(input, &small()).unwrap();

        assert_eq!(raw.positions.len(), 3);
        assert_eq!(raw.uvs.len(), 3);
        assert_eq!(raw.normals, vec![Vec3::Z]);
        assert!(raw.has_uvs && raw.has_normals);
        assert_eq!(raw.corners_per_face, vec![3]);
        assert_eq!(raw.face_corners[2], IndexTriple::new(2, Some(2), Some(0)));
    }
}
