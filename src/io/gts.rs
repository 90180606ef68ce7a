//! GTS text format.
//!
//! ```text
//! nv ne nf [class names]
//! x y z            (nv lines)
//! v1 v2            (ne lines, 1-based vertex indices)
//! e1 e2 e3         (nf lines, 1-based edge indices)
//! ```
//!
//! Lines starting with `#` and blank lines are ignored; tokens past the
//! ones listed above are ignored too. The order of the edges of a face
//! gives its orientation.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{FormatError, Result, TrisurfError};
use crate::math::Point3;
use crate::topology::{SegmentId, SurfaceId, TopologyStore, TriangleInput, VertexId};

/// Writes a surface in GTS format.
///
/// # Errors
///
/// Returns an error if the surface does not exist or writing fails.
pub fn write_gts<W: Write>(store: &TopologyStore, surface: SurfaceId, mut writer: W) -> Result<()> {
    let vertices = store.surface_vertices(surface)?;
    let edges = store.surface_edges(surface)?;
    let faces = store.surface_faces(surface)?;
    let vindex: HashMap<VertexId, usize> = vertices.iter().enumerate().map(|(i, &v)| (v, i + 1)).collect();
    let eindex: HashMap<SegmentId, usize> = edges.iter().enumerate().map(|(i, &e)| (e, i + 1)).collect();

    let mut out = String::new();
    out.push_str(&format!(
        "{} {} {} GtsSurface GtsFace GtsEdge GtsVertex\n",
        vertices.len(),
        edges.len(),
        faces.len()
    ));
    for &v in &vertices {
        let p = store.point(v)?;
        out.push_str(&format!("{} {} {}\n", p.x, p.y, p.z));
    }
    for &e in &edges {
        let seg = store.segment(e)?;
        out.push_str(&format!("{} {}\n", vindex[&seg.v1], vindex[&seg.v2]));
    }
    for &f in faces {
        let [a, b, c] = store.triangle(f)?.edges.map(|e| eindex[&e]);
        out.push_str(&format!("{a} {b} {c}\n"));
    }
    writer.write_all(out.as_bytes()).map_err(FormatError::from)?;
    writer.flush().map_err(FormatError::from)?;
    Ok(())
}

/// Saves a surface to a GTS file.
///
/// # Errors
///
/// Returns an error if the surface does not exist or the file cannot be
/// written.
pub fn save_gts<P: AsRef<Path>>(store: &TopologyStore, surface: SurfaceId, path: P) -> Result<()> {
    let file = File::create(path).map_err(FormatError::from)?;
    write_gts(store, surface, BufWriter::new(file))
}

/// Reads a GTS surface into the store, returning a new surface held by
/// one handle.
///
/// Duplicate edges and duplicate faces collapse onto one entity. On error
/// every entity created by the read is destroyed again, leaving the store
/// as it was.
///
/// # Errors
///
/// Returns [`FormatError::Parse`] on malformed input (including edges or
/// faces that are degenerate) and [`FormatError::Io`] if reading fails.
pub fn read_gts<R: BufRead>(store: &mut TopologyStore, reader: R) -> Result<SurfaceId> {
    let surface = store.add_surface();
    let mut vertices = Vec::new();
    let mut edges = Vec::new();
    let run = read_surface(store, Lines::new(reader), surface, &mut vertices, &mut edges);
    if let Err(err) = run {
        store.release_surface(surface)?;
        for e in edges {
            store.collect_segment(e);
        }
        for v in vertices {
            store.collect_vertex(v);
        }
        return Err(err);
    }

    // Entities listed but unused by any face.
    for e in edges {
        store.collect_segment(e);
    }
    for v in vertices {
        store.collect_vertex(v);
    }
    info!(faces = store.face_count(surface)?, "GTS surface read");
    Ok(surface)
}

fn read_surface<R: BufRead>(
    store: &mut TopologyStore,
    mut lines: Lines<R>,
    surface: SurfaceId,
    vertices: &mut Vec<VertexId>,
    edges: &mut Vec<SegmentId>,
) -> Result<()> {
    let (line, header) = lines.next_tokens()?.ok_or_else(|| parse_error(0, "missing header"))?;
    if header.len() < 3 {
        return Err(parse_error(line, "header needs vertex, edge and face counts"));
    }
    let nv: usize = parse(line, &header[0])?;
    let ne: usize = parse(line, &header[1])?;
    let nf: usize = parse(line, &header[2])?;
    debug!(nv, ne, nf, "GTS header counts");

    for _ in 0..nv {
        let (line, t) = lines.expect("vertex")?;
        if t.len() < 3 {
            return Err(parse_error(line, "vertex needs three coordinates"));
        }
        let p = Point3::new(parse(line, &t[0])?, parse(line, &t[1])?, parse(line, &t[2])?);
        vertices.push(store.new_vertex(p));
    }

    for _ in 0..ne {
        let (line, t) = lines.expect("edge")?;
        if t.len() < 2 {
            return Err(parse_error(line, "edge needs two vertex indices"));
        }
        let a = index(line, &t[0], vertices)?;
        let b = index(line, &t[1], vertices)?;
        let e = store
            .new_edge(a, b)
            .map_err(|err| parse_error(line, &err.to_string()))?;
        edges.push(e);
    }

    for _ in 0..nf {
        let (line, t) = lines.expect("face")?;
        if t.len() < 3 {
            return Err(parse_error(line, "face needs three edge indices"));
        }
        let tri = [index(line, &t[0], edges)?, index(line, &t[1], edges)?, index(line, &t[2], edges)?];
        let f = store
            .add_face(TriangleInput::Edges(tri))
            .map_err(|err| parse_error(line, &err.to_string()))?;
        let added = store.surface_add(surface, f);
        store.release_triangle(f)?;
        added?;
    }
    Ok(())
}

/// Loads a GTS file.
///
/// # Errors
///
/// Same conditions as [`read_gts`], plus failure to open the file.
pub fn load_gts<P: AsRef<Path>>(store: &mut TopologyStore, path: P) -> Result<SurfaceId> {
    let file = File::open(path).map_err(FormatError::from)?;
    read_gts(store, BufReader::new(file))
}

/// Iterates over the meaningful lines of a GTS stream.
struct Lines<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    fn next_tokens(&mut self) -> Result<Option<(usize, Vec<String>)>> {
        loop {
            self.buf.clear();
            let n = self.reader.read_line(&mut self.buf).map_err(FormatError::from)?;
            if n == 0 {
                return Ok(None);
            }
            self.line += 1;
            let trimmed = self.buf.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let tokens = trimmed.split_whitespace().map(str::to_owned).collect();
            return Ok(Some((self.line, tokens)));
        }
    }

    fn expect(&mut self, what: &str) -> Result<(usize, Vec<String>)> {
        let line = self.line;
        self.next_tokens()?
            .ok_or_else(|| parse_error(line + 1, &format!("unexpected end of input, expected {what}")))
    }
}

fn parse_error(line: usize, message: &str) -> TrisurfError {
    FormatError::Parse {
        line,
        message: message.to_owned(),
    }
    .into()
}

fn parse<T: std::str::FromStr>(line: usize, token: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| parse_error(line, &format!("invalid number `{token}`")))
}

fn index<T: Copy>(line: usize, token: &str, items: &[T]) -> Result<T> {
    let i: usize = parse(line, token)?;
    i.checked_sub(1)
        .and_then(|i| items.get(i).copied())
        .ok_or_else(|| parse_error(line, &format!("index {i} out of range 1..={}", items.len())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::{MakeCube, MakeTetrahedron};
    use crate::operations::query::Volume;
    use approx::assert_relative_eq;

    fn face_sets(store: &TopologyStore, s: SurfaceId) -> Vec<Vec<[u64; 3]>> {
        let mut out = Vec::new();
        for &f in store.surface_faces(s).unwrap() {
            let mut pts: Vec<[u64; 3]> = store
                .triangle_points(f)
                .unwrap()
                .iter()
                .map(|p| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()])
                .collect();
            pts.sort_unstable();
            out.push(pts);
        }
        out.sort();
        out
    }

    #[test]
    fn round_trip_preserves_faces_and_orientation() {
        let mut store = TopologyStore::new();
        let tet = MakeTetrahedron::new().execute(&mut store).unwrap();
        let mut buf = Vec::new();
        write_gts(&store, tet, &mut buf).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("4 6 4"));

        let back = read_gts(&mut store, buf.as_slice()).unwrap();
        assert_eq!(face_sets(&store, tet), face_sets(&store, back));
        assert!(store.is_closed(back).unwrap());
        assert_relative_eq!(Volume::new(back).execute(&store).unwrap(), 8.0 / 3.0, epsilon = 1e-12);
        assert!(store.is_ok());
    }

    #[test]
    fn comments_and_duplicates() {
        let text = "# two copies of one face\n\
                    3 4 2\n\
                    0 0 0\n1 0 0\n0 1 0\n\
                    # edges\n\
                    1 2\n2 3\n3 1\n2 1\n\
                    1 2 3\n4 2 3\n";
        let mut store = TopologyStore::new();
        let s = read_gts(&mut store, text.as_bytes()).unwrap();
        assert_eq!(store.face_count(s).unwrap(), 1);
        assert_eq!(store.edge_count(s).unwrap(), 3);
        assert_eq!(store.segment_count(), 3);
    }

    fn counts(store: &TopologyStore) -> [usize; 3] {
        [store.vertex_count(), store.segment_count(), store.triangle_count()]
    }

    #[test]
    fn out_of_range_index_reports_line() {
        let text = "3 3 1\n0 0 0\n1 0 0\n0 1 0\n1 2\n2 3\n3 9\n1 2 3\n";
        let mut store = TopologyStore::new();
        let err = read_gts(&mut store, text.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            TrisurfError::Format(FormatError::Parse { line: 7, .. })
        ));
        assert_eq!(counts(&store), [0, 0, 0]);
        assert!(store.is_ok());
    }

    #[test]
    fn failed_read_leaves_the_store_untouched() {
        let mut store = TopologyStore::new();
        let tet = MakeTetrahedron::new().execute(&mut store).unwrap();
        let before = counts(&store);

        let bad_face = "3 3 1\n0 0 0\n1 0 0\n0 1 0\n1 2\n2 3\n3 1\n1 2 9\n";
        let err = read_gts(&mut store, bad_face.as_bytes()).unwrap_err();
        assert!(matches!(err, TrisurfError::Format(FormatError::Parse { line: 8, .. })));
        assert_eq!(counts(&store), before);
        assert!(store.is_ok());

        // The second face is degenerate after the first one was added.
        let late_failure = "4 5 2\n0 0 0\n1 0 0\n0 1 0\n0 0 1\n1 2\n2 3\n3 1\n1 4\n2 4\n1 2 3\n1 1 5\n";
        assert!(read_gts(&mut store, late_failure.as_bytes()).is_err());
        assert_eq!(counts(&store), before);
        assert!(store.is_ok());
        assert_eq!(store.face_count(tet).unwrap(), 4);
    }

    #[test]
    fn huge_header_is_a_parse_error() {
        let mut store = TopologyStore::new();
        let err = read_gts(&mut store, "1152921504606846976 0 0\n0 0 0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TrisurfError::Format(FormatError::Parse { line: 3, .. })));
        assert_eq!(counts(&store), [0, 0, 0]);
        assert!(store.is_ok());
    }

    #[test]
    fn open_surface_round_trip() {
        let mut store = TopologyStore::new();
        let cube = MakeCube::new().execute(&mut store).unwrap();
        let f = store.surface_faces(cube).unwrap()[0];
        store.surface_remove(cube, f).unwrap();
        assert!(!store.is_closed(cube).unwrap());

        let mut buf = Vec::new();
        write_gts(&store, cube, &mut buf).unwrap();
        assert!(String::from_utf8(buf.clone()).unwrap().starts_with("8 18 11"));
        let mut other = TopologyStore::new();
        let back = read_gts(&mut other, buf.as_slice()).unwrap();
        assert_eq!(face_sets(&store, cube), face_sets(&other, back));
        assert!(!other.is_closed(back).unwrap());
        assert!(other.is_orientable(back).unwrap());
        assert!(other.is_ok());
    }

    #[test]
    fn truncated_input_is_rejected() {
        let mut store = TopologyStore::new();
        let cube = MakeCube::new().execute(&mut store).unwrap();
        let mut buf = Vec::new();
        write_gts(&store, cube, &mut buf).unwrap();
        buf.truncate(buf.len() / 2);
        let before = counts(&store);
        let err = read_gts(&mut store, buf.as_slice()).unwrap_err();
        assert!(matches!(err, TrisurfError::Format(FormatError::Parse { .. })));
        assert_eq!(counts(&store), before);
        assert!(store.is_ok());
    }
}
