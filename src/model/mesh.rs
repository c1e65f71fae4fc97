use std::collections::HashSet;

use thiserror::Error;

/// Failure while reading OBJ text. Line numbers are 1-based.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObjError {
    #[error("line {line}: expected at least 3 coordinates")]
    MissingCoordinate { line: usize },
    #[error("line {line}: invalid number `{token}`")]
    InvalidNumber { line: usize, token: String },
    #[error("line {line}: invalid face index `{token}`")]
    InvalidIndex { line: usize, token: String },
    #[error("line {line}: vertex index {index} out of range")]
    IndexOutOfRange { line: usize, index: i64 },
    #[error("line {line}: face has {count} vertices, expected 3 or 4")]
    UnsupportedFace { line: usize, count: usize },
    #[error("mesh contains no faces")]
    Empty,
}

/// CPU-side mesh: positions plus triangle and edge index lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// Triangle list; quads are split along their first diagonal.
    pub triangles: Vec<u32>,
    /// Line list of unique polygon edges (quad diagonals excluded).
    pub edges: Vec<u32>,
}

impl MeshData {
    pub fn face_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// Reference grid on the XZ plane, `2 * half_cells` cells per side.
    pub fn grid(half_cells: u32, spacing: f32) -> Self {
        let n = half_cells as i32;
        let extent = n as f32 * spacing;
        let mut positions = Vec::new();
        let mut edges = Vec::new();

        for i in -n..=n {
            let offset = i as f32 * spacing;
            let base = positions.len() as u32;
            positions.push([offset, 0.0, -extent]);
            positions.push([offset, 0.0, extent]);
            positions.push([-extent, 0.0, offset]);
            positions.push([extent, 0.0, offset]);
            edges.extend_from_slice(&[base, base + 1, base + 2, base + 3]);
        }

        Self { positions, normals: Vec::new(), triangles: Vec::new(), edges }
    }
}

fn parse_vec3(line: usize, tokens: &[&str]) -> Result<[f32; 3], ObjError> {
    if tokens.len() < 3 {
        return Err(ObjError::MissingCoordinate { line });
    }
    let mut out = [0.0; 3];
    for (slot, token) in out.iter_mut().zip(tokens) {
        *slot = token.parse().map_err(|_| ObjError::InvalidNumber {
            line,
            token: (*token).to_string(),
        })?;
    }
    Ok(out)
}

/// Resolves one face token (`i`, `i/t`, `i//n`, `i/t/n`) to a 0-based
/// position index. Negative indices count back from the latest vertex.
fn resolve_index(line: usize, token: &str, vertex_count: usize) -> Result<u32, ObjError> {
    let raw = token.split('/').next().unwrap_or_default();
    let index: i64 = raw.parse().map_err(|_| ObjError::InvalidIndex {
        line,
        token: token.to_string(),
    })?;
    let resolved = match index {
        i if i > 0 => i - 1,
        i if i < 0 => vertex_count as i64 + i,
        _ => return Err(ObjError::IndexOutOfRange { line, index }),
    };
    if resolved < 0 || resolved >= vertex_count as i64 {
        return Err(ObjError::IndexOutOfRange { line, index });
    }
    Ok(resolved as u32)
}

/// Parses Wavefront OBJ text with triangle and quad faces.
pub fn parse_obj(source: &str) -> Result<MeshData, ObjError> {
    let mut mesh = MeshData::default();
    let mut seen_edges = HashSet::new();

    for (number, raw_line) in source.lines().enumerate() {
        let line = number + 1;
        let content = raw_line.split('#').next().unwrap_or_default();
        let mut tokens = content.split_whitespace();
        let Some(keyword) = tokens.next() else { continue };
        let rest: Vec<&str> = tokens.collect();

        match keyword {
            "v" => mesh.positions.push(parse_vec3(line, &rest)?),
            "vn" => mesh.normals.push(parse_vec3(line, &rest)?),
            "f" => {
                if rest.len() != 3 && rest.len() != 4 {
                    return Err(ObjError::UnsupportedFace { line, count: rest.len() });
                }
                let face = rest
                    .iter()
                    .map(|token| resolve_index(line, token, mesh.positions.len()))
                    .collect::<Result<Vec<u32>, _>>()?;

                mesh.triangles.extend_from_slice(&[face[0], face[1], face[2]]);
                if face.len() == 4 {
                    mesh.triangles.extend_from_slice(&[face[0], face[2], face[3]]);
                }

                for (i, &a) in face.iter().enumerate() {
                    let b = face[(i + 1) % face.len()];
                    if a != b && seen_edges.insert((a.min(b), a.max(b))) {
                        mesh.edges.extend_from_slice(&[a, b]);
                    }
                }
            }
            // vt, o, g, s, usemtl, mtllib and friends carry nothing we draw
            _ => {}
        }
    }

    if mesh.triangles.is_empty() {
        return Err(ObjError::Empty);
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_AND_TRI: &str = "
# a unit quad with a triangle hanging off it
o sample
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 2 0 0
vn 0 0 1
vt 0 0
f 1/1/1 2/1/1 3/1/1 4/1/1
f 2//1 5//1 3//1
";

    #[test]
    fn parses_quads_and_triangles() {
        let mesh = parse_obj(QUAD_AND_TRI).unwrap();
        assert_eq!(mesh.positions.len(), 5);
        assert_eq!(mesh.normals, vec![[0.0, 0.0, 1.0]]);
        assert_eq!(mesh.triangles, vec![0, 1, 2, 0, 2, 3, 1, 4, 2]);
        assert_eq!(mesh.face_count(), 3);
    }

    #[test]
    fn edges_are_unique_and_skip_quad_diagonals() {
        let mesh = parse_obj(QUAD_AND_TRI).unwrap();
        // quad outline (4) + triangle's two new edges; 1-2 is shared
        assert_eq!(mesh.edge_count(), 6);
        let pairs: Vec<(u32, u32)> = mesh
            .edges
            .chunks(2)
            .map(|e| (e[0].min(e[1]), e[0].max(e[1])))
            .collect();
        assert!(!pairs.contains(&(0, 2)));
        assert_eq!(pairs.iter().filter(|&&p| p == (1, 2)).count(), 1);
    }

    #[test]
    fn negative_indices_are_relative() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();
        assert_eq!(mesh.triangles, vec![0, 1, 2]);
    }

    #[test]
    fn reports_line_of_bad_number() {
        let err = parse_obj("v 0 0 0\nv 1 zero 0\n").unwrap_err();
        assert_eq!(err, ObjError::InvalidNumber { line: 2, token: "zero".into() });
    }

    #[test]
    fn rejects_out_of_range_and_zero_indices() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n";
        assert_eq!(parse_obj(src).unwrap_err(), ObjError::IndexOutOfRange { line: 4, index: 4 });
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n";
        assert_eq!(parse_obj(src).unwrap_err(), ObjError::IndexOutOfRange { line: 4, index: 0 });
    }

    #[test]
    fn rejects_polygons_beyond_quads() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv 0 2 0\nf 1 2 3 4 5\n";
        assert_eq!(parse_obj(src).unwrap_err(), ObjError::UnsupportedFace { line: 6, count: 5 });
    }

    #[test]
    fn requires_at_least_one_face() {
        assert_eq!(parse_obj("v 0 0 0\n").unwrap_err(), ObjError::Empty);
        assert_eq!(parse_obj("").unwrap_err(), ObjError::Empty);
    }

    #[test]
    fn short_vertex_is_an_error() {
        assert_eq!(parse_obj("v 1 2\n").unwrap_err(), ObjError::MissingCoordinate { line: 1 });
    }

    #[test]
    fn grid_has_two_lines_per_step() {
        let grid = MeshData::grid(2, 0.5);
        assert_eq!(grid.edge_count(), 10);
        assert_eq!(grid.positions.len(), 20);
        assert!(grid.triangles.is_empty());
        assert!(grid.positions.iter().all(|p| p[1] == 0.0 && p[0].abs() <= 1.0 && p[2].abs() <= 1.0));
    }
}
