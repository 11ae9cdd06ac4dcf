// Copyright @yucwang 2026

use crate::core::mesh::InvalidMeshError;

use std::collections::HashSet;

/// Line-list edges of a triangle list: `(a,b)`, `(b,c)`, `(c,a)` per
/// triangle. Edges shared by neighbouring triangles appear once per triangle.
pub fn extract_edges(indices: &[u32]) -> Result<Vec<(u32, u32)>, InvalidMeshError> {
    if indices.len() % 3 != 0 {
        return Err(InvalidMeshError::IndexCount { count: indices.len() });
    }

    let mut edges = Vec::with_capacity(indices.len());
    for tri in indices.chunks_exact(3) {
        edges.push((tri[0], tri[1]));
        edges.push((tri[1], tri[2]));
        edges.push((tri[2], tri[0]));
    }
    Ok(edges)
}

/// Flat index buffer of [`extract_edges`], ready for a line-list draw.
pub fn edge_line_indices(indices: &[u32]) -> Result<Vec<u32>, InvalidMeshError> {
    let edges = extract_edges(indices)?;
    Ok(edges.into_iter().flat_map(|(a, b)| [a, b]).collect())
}

/// Every undirected edge once, as `(min, max)`, in first-seen order.
pub fn unique_edges(indices: &[u32]) -> Result<Vec<(u32, u32)>, InvalidMeshError> {
    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    for (a, b) in extract_edges(indices)? {
        let key = (a.min(b), a.max(b));
        if seen.insert(key) {
            edges.push(key);
        }
    }
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_triangle() {
        let edges = extract_edges(&[0, 1, 2]).unwrap();
        assert_eq!(edges, vec![(0, 1), (1, 2), (2, 0)]);
        assert_eq!(edge_line_indices(&[0, 1, 2]).unwrap(), vec![0, 1, 1, 2, 2, 0]);
    }

    #[test]
    fn test_shared_edge_is_kept_twice() {
        let quad = [0, 1, 2, 0, 2, 3];
        let edges = extract_edges(&quad).unwrap();
        assert_eq!(edges.len(), 6);
        assert_eq!(edges.iter().filter(|e| **e == (2, 0) || **e == (0, 2)).count(), 2);
    }

    #[test]
    fn test_unique_edges() {
        let quad = [0, 1, 2, 0, 2, 3];
        assert_eq!(unique_edges(&quad).unwrap(), vec![(0, 1), (1, 2), (0, 2), (2, 3), (0, 3)]);
    }

    #[test]
    fn test_bad_index_count() {
        assert_eq!(extract_edges(&[0, 1]), Err(InvalidMeshError::IndexCount { count: 2 }));
    }
}
