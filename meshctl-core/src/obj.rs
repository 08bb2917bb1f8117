/// Wavefront OBJ loader for triangle meshes
use std::fs;
use std::path::Path;

use nalgebra::Point3;
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::{i64 as signed, space0, space1},
    combinator::{all_consuming, opt},
    multi::{many0, many1},
    number::complete::double,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

use crate::error::LoadError;
use crate::geometry::Mesh;

/// Read and parse an OBJ file.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh, LoadError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "reading mesh");

    let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mesh = parse_obj(&source)?;

    tracing::info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "loaded mesh"
    );
    Ok(mesh)
}

/// Parse OBJ source text. Polygons are fan-triangulated; texture
/// coordinates, normals, groups and materials are ignored.
pub fn parse_obj(source: &str) -> Result<Mesh, LoadError> {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    for (number, raw) in source.lines().enumerate() {
        let line_no = number + 1;
        let line = strip_comment(raw).trim();
        let Some(keyword) = line.split_whitespace().next() else {
            continue;
        };

        match keyword {
            "v" => {
                let (_, position) = all_consuming(parse_vertex)(line)
                    .map_err(|e| parse_error(line_no, "malformed vertex", e))?;
                vertices.push(position);
            }
            "f" => {
                let (_, corners) = all_consuming(parse_face)(line)
                    .map_err(|e| parse_error(line_no, "malformed face", e))?;
                if corners.len() < 3 {
                    return Err(LoadError::Parse {
                        line: line_no,
                        message: format!("face has {} corners, need at least 3", corners.len()),
                    });
                }

                let resolved = corners
                    .iter()
                    .map(|&index| resolve_index(index, vertices.len(), line_no))
                    .collect::<Result<Vec<_>, _>>()?;

                // Fan around the first corner
                for window in resolved[1..].windows(2) {
                    faces.push([resolved[0], window[0], window[1]]);
                }
            }
            _ => {}
        }
    }

    if vertices.is_empty() {
        return Err(LoadError::Empty);
    }

    Ok(Mesh::new(vertices, faces)?)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(at) => &line[..at],
        None => line,
    }
}

/// Convert a 1-based (or negative, relative) OBJ index into a buffer index.
fn resolve_index(index: i64, vertex_count: usize, line: usize) -> Result<usize, LoadError> {
    let out_of_range = || LoadError::IndexOutOfRange {
        line,
        index,
        vertex_count,
    };

    let resolved = match index {
        0 => return Err(out_of_range()),
        i if i > 0 => usize::try_from(i - 1).map_err(|_| out_of_range())?,
        i => {
            let back = usize::try_from(i.unsigned_abs()).map_err(|_| out_of_range())?;
            vertex_count.checked_sub(back).ok_or_else(out_of_range)?
        }
    };

    if resolved < vertex_count {
        Ok(resolved)
    } else {
        Err(out_of_range())
    }
}

fn parse_error(line: usize, what: &str, err: nom::Err<nom::error::Error<&str>>) -> LoadError {
    let message = match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            format!("{what} near {:?}", e.input.trim())
        }
        nom::Err::Incomplete(_) => format!("{what}: unexpected end of line"),
    };
    LoadError::Parse { line, message }
}

/// `v x y z` with optional trailing components (w, or vertex colors).
fn parse_vertex(input: &str) -> IResult<&str, Point3<f64>> {
    let (input, (_, x, y, z)) = tuple((
        tag("v"),
        preceded(space1, double),
        preceded(space1, double),
        preceded(space1, double),
    ))(input)?;
    let (input, _) = terminated(many0(preceded(space1, double)), space0)(input)?;
    Ok((input, Point3::new(x, y, z)))
}

/// `f a b c ...` where each corner is `i`, `i/t`, `i//n` or `i/t/n`.
fn parse_face(input: &str) -> IResult<&str, Vec<i64>> {
    let (input, _) = tag("f")(input)?;
    terminated(many1(preceded(space1, parse_corner)), space0)(input)
}

fn parse_corner(input: &str) -> IResult<&str, i64> {
    let (input, index) = signed(input)?;
    let (input, _) = opt(pair(tag("/"), take_till(|c: char| c.is_whitespace())))(input)?;
    Ok((input, index))
}
