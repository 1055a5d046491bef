use std::collections::BTreeMap;

use array_tool::vec::Intersect;

/// Repairs checkerboard-colorability of a closed mesh.
///
/// Faces are swept breadth-first from face 0; two adjacent faces landing on
/// the same BFS level would receive the same color under the bipartition by
/// level, so one of their shared edges is emitted as a doubled edge. The
/// inserted 2-gon breaks the monochromatic adjacency.
///
/// Returns the undirected edge list (normalized vertex pairs in sorted
/// order, which fixes the edge-id assignment) and the doubled edges in
/// detection order.
pub fn make_checkerboard(faces: &[Vec<usize>]) -> (Vec<(usize, usize)>, Vec<(usize, usize)>) {
    let mut edge_to_faces: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();
    for (i, f) in faces.iter().enumerate() {
        for j in 0..f.len() {
            let e = normalized(f[j], f[(j + 1) % f.len()]);
            edge_to_faces.entry(e).or_insert_with(Vec::new).push(i);
        }
    }

    let mut face_adj: Vec<Vec<usize>> = vec![Vec::new(); faces.len()];
    for face_pair in edge_to_faces.values() {
        match face_pair.as_slice() {
            [f1, f2] => {
                face_adj[*f1].push(*f2);
                face_adj[*f2].push(*f1);
            }
            _ => panic!("every edge of a closed mesh must bound exactly two faces"),
        }
    }

    let edges = edge_to_faces.keys().cloned().collect();
    if faces.is_empty() {
        return (edges, Vec::new());
    }

    // Frontier-at-a-time BFS over faces; faces discovered together share a
    // level and an implicit color.
    let mut visited = vec![false; faces.len()];
    visited[0] = true;
    let mut level_faces = vec![0usize];
    let mut same_level_pairs: Vec<(usize, usize)> = Vec::new();

    while !level_faces.is_empty() {
        let mut q = level_faces.clone();
        level_faces.clear();

        while let Some(s) = q.pop() {
            for &nb in &face_adj[s] {
                if !visited[nb] {
                    visited[nb] = true;
                    level_faces.push(nb);
                }
            }
        }

        for (i, &f) in level_faces.iter().enumerate() {
            let later = level_faces[i + 1..].to_vec();
            for nb in later.intersect(face_adj[f].clone()) {
                same_level_pairs.push((f.min(nb), f.max(nb)));
            }
        }
    }

    // One shared edge per offending pair; map traversal order makes the
    // choice deterministic when a pair shares several edges.
    let mut double_edges = Vec::new();
    for (f1, f2) in same_level_pairs {
        let shared = edge_to_faces
            .iter()
            .find(|(_, fs)| fs.as_slice() == [f1, f2]);
        match shared {
            Some((&e, _)) => double_edges.push(e),
            None => panic!("adjacent faces without a shared edge"),
        }
    }

    (edges, double_edges)
}

fn normalized(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
