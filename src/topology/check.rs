//! Consistency self-check of the whole store.
//!
//! Walks every entity and verifies the back-references, the
//! deduplication indices and the triangle cycles. This is a diagnostic:
//! it is quadratic in places and nothing in the library depends on it.

use std::collections::HashSet;

use super::{segment_key, triangle_key, TopologyStore};

impl TopologyStore {
    /// Returns `true` if the store passes every consistency check.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.check().is_ok()
    }

    /// Runs every consistency check and describes the first violation.
    pub(crate) fn check(&self) -> std::result::Result<(), String> {
        self.check_vertices()?;
        self.check_segments()?;
        self.check_triangles()?;
        self.check_surfaces()
    }

    fn check_vertices(&self) -> std::result::Result<(), String> {
        for (v, vd) in &self.vertices {
            let mut seen = HashSet::new();
            for &s in &vd.segments {
                let seg = self
                    .segments
                    .get(s)
                    .ok_or_else(|| format!("vertex {v:?} lists a dead segment"))?;
                if !seg.has_vertex(v) {
                    return Err(format!("vertex {v:?} lists a segment it is not on"));
                }
                if !seen.insert(s) {
                    return Err(format!("vertex {v:?} lists a segment twice"));
                }
            }
        }
        Ok(())
    }

    fn check_segments(&self) -> std::result::Result<(), String> {
        for (s, seg) in &self.segments {
            if seg.v1 == seg.v2 {
                return Err(format!("segment {s:?} is degenerate"));
            }
            for v in [seg.v1, seg.v2] {
                let vd = self
                    .vertices
                    .get(v)
                    .ok_or_else(|| format!("segment {s:?} has a dead endpoint"))?;
                if !vd.segments.contains(&s) {
                    return Err(format!("segment {s:?} missing from its endpoint"));
                }
            }
            if self.segment_index.get(&segment_key(seg.kind, seg.v1, seg.v2)) != Some(&s) {
                return Err(format!("segment {s:?} is duplicated or unindexed"));
            }
            for &t in &seg.triangles {
                let tri = self
                    .triangles
                    .get(t)
                    .ok_or_else(|| format!("segment {s:?} lists a dead triangle"))?;
                if !tri.edges.contains(&s) {
                    return Err(format!("segment {s:?} lists a triangle it does not bound"));
                }
            }
            if seg.handles == 0 && seg.triangles.is_empty() {
                return Err(format!("segment {s:?} is owned by nothing"));
            }
        }
        if self.segment_index.len() != self.segments.len() {
            return Err("segment index is out of sync".into());
        }
        Ok(())
    }

    fn check_triangles(&self) -> std::result::Result<(), String> {
        for (t, tri) in &self.triangles {
            if self.validate_cycle(tri.edges).is_err() {
                return Err(format!("triangle {t:?} edges do not form a cycle"));
            }
            for e in tri.edges {
                let seg = self
                    .segments
                    .get(e)
                    .ok_or_else(|| format!("triangle {t:?} has a dead edge"))?;
                if !seg.triangles.contains(&t) {
                    return Err(format!("triangle {t:?} missing from its edge"));
                }
            }
            if self.triangle_index.get(&triangle_key(tri.kind, tri.edges)) != Some(&t) {
                return Err(format!("triangle {t:?} is duplicated or unindexed"));
            }
            for &s in &tri.surfaces {
                let surface = self
                    .surfaces
                    .get(s)
                    .ok_or_else(|| format!("face {t:?} lists a dead surface"))?;
                if !surface.contains(t) {
                    return Err(format!("face {t:?} lists a surface it is not in"));
                }
            }
            if tri.handles == 0 && tri.surfaces.is_empty() {
                return Err(format!("triangle {t:?} is owned by nothing"));
            }
        }
        Ok(())
    }

    fn check_surfaces(&self) -> std::result::Result<(), String> {
        for (s, surface) in &self.surfaces {
            for &f in &surface.faces {
                let fd = self
                    .triangles
                    .get(f)
                    .ok_or_else(|| format!("surface {s:?} holds a dead face"))?;
                if fd.surfaces.iter().filter(|&&x| x == s).count() != 1 {
                    return Err(format!("surface {s:?} membership of {f:?} is miscounted"));
                }
            }
        }
        Ok(())
    }
}
