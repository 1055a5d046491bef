use std::collections::BTreeMap;

use bimap::BiMap;

use crate::graph::indices::EdgeI;

/// Builds the rotation system of the mesh: for every vertex, the cyclic
/// order of incident edge ids consistent with the face orientation.
///
/// Edge ids are the positions within `edges`; the d-th doubled edge gets id
/// `edges.len() + d` and is spliced into the rotation right next to its
/// sibling, after it at one endpoint and before it at the other, so the two
/// parallel edges bound a 2-gon with opposing darts.
pub fn build_rotation(
    vertex_count: usize,
    faces: &[Vec<usize>],
    edges: &[(usize, usize)],
    double_edges: &[(usize, usize)],
) -> Vec<Vec<EdgeI>> {
    // vertex -> incident faces, in face-id order
    let mut face_list: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];
    for (i, f) in faces.iter().enumerate() {
        for &v in f {
            face_list[v].push(i);
        }
    }

    let mut edge_ids: BiMap<(usize, usize), usize> = BiMap::new();
    for (id, &e) in edges.iter().enumerate() {
        edge_ids.insert(e, id);
    }
    let eid = |a: usize, b: usize| -> EdgeI {
        match edge_ids.get_by_left(&normalized(a, b)) {
            Some(&id) => EdgeI(id),
            None => panic!("face walk crossed an unknown edge"),
        }
    };

    // normalized pair -> the two faces it bounds
    let mut edge_faces: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();
    for (i, f) in faces.iter().enumerate() {
        for j in 0..f.len() {
            let e = normalized(f[j], f[(j + 1) % f.len()]);
            edge_faces.entry(e).or_insert_with(Vec::new).push(i);
        }
    }

    let mut rotation: Vec<Vec<EdgeI>> = vec![Vec::new(); vertex_count];
    for v in 0..vertex_count {
        // seed with the two edges flanking v in some incident face
        let mut curr_face = face_list[v][0];
        let f = &faces[curr_face];
        let v_ind = position_of(f, v);
        let u = f[(v_ind + f.len() - 1) % f.len()];
        let mut w = f[(v_ind + 1) % f.len()];

        let first_edge = eid(u, v);
        rotation[v].push(first_edge);
        rotation[v].push(eid(v, w));

        // walk around the vertex star, face by face
        loop {
            let pair = &edge_faces[&normalized(v, w)];
            curr_face = if pair[0] == curr_face { pair[1] } else { pair[0] };

            let f = &faces[curr_face];
            let v_ind = position_of(f, v);
            w = f[(v_ind + 1) % f.len()];

            let next_edge = eid(v, w);
            if next_edge == first_edge {
                break;
            }
            rotation[v].push(next_edge);
        }
    }

    for (d, &(u, v)) in double_edges.iter().enumerate() {
        let id = EdgeI(edges.len() + d);
        let sibling = eid(u, v);

        let pos = slot_of(&rotation[u], sibling);
        rotation[u].insert(pos + 1, id);
        let pos = slot_of(&rotation[v], sibling);
        rotation[v].insert(pos, id);
    }

    rotation
}

fn normalized(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn position_of(face: &[usize], v: usize) -> usize {
    match face.iter().position(|&x| x == v) {
        Some(p) => p,
        None => panic!("vertex not on its own incident face"),
    }
}

fn slot_of(rotation: &[EdgeI], e: EdgeI) -> usize {
    match rotation.iter().position(|&x| x == e) {
        Some(p) => p,
        None => panic!("doubled edge without a sibling slot"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkerboard::make_checkerboard;
    use itertools::Itertools;

    fn tetrahedron() -> Vec<Vec<usize>> {
        vec![vec![0, 1, 2], vec![0, 2, 3], vec![0, 3, 1], vec![1, 3, 2]]
    }

    fn octahedron() -> Vec<Vec<usize>> {
        vec![
            vec![0, 1, 2],
            vec![0, 2, 3],
            vec![0, 3, 4],
            vec![0, 4, 1],
            vec![5, 2, 1],
            vec![5, 3, 2],
            vec![5, 4, 3],
            vec![5, 1, 4],
        ]
    }

    #[test]
    fn octahedron_rotations_have_degree_four() {
        let faces = octahedron();
        let (edges, doubles) = make_checkerboard(&faces);
        let rotation = build_rotation(6, &faces, &edges, &doubles);

        for v in 0..6 {
            assert_eq!(rotation[v].len(), 4, "vertex {} degree", v);
            assert_eq!(rotation[v].iter().unique().count(), 4);
            for &e in &rotation[v] {
                let (a, b) = *edges.get(e.0).unwrap();
                assert!(a == v || b == v);
            }
        }
    }

    #[test]
    fn rotation_multiset_matches_incident_edges_with_doubles() {
        let faces = tetrahedron();
        let (edges, doubles) = make_checkerboard(&faces);
        let rotation = build_rotation(4, &faces, &edges, &doubles);

        // per-vertex degree counts doubled edges twice
        let mut expected = vec![0usize; 4];
        for &(a, b) in edges.iter().chain(doubles.iter()) {
            expected[a] += 1;
            expected[b] += 1;
        }
        for v in 0..4 {
            assert_eq!(rotation[v].len(), expected[v], "vertex {} degree", v);
            assert_eq!(
                rotation[v].iter().unique().count(),
                rotation[v].len(),
                "edge ids repeat at vertex {}",
                v
            );
        }
    }

    #[test]
    fn doubled_edge_sits_next_to_its_sibling() {
        let faces = tetrahedron();
        let (edges, doubles) = make_checkerboard(&faces);
        let rotation = build_rotation(4, &faces, &edges, &doubles);

        for (d, &(u, v)) in doubles.iter().enumerate() {
            let id = EdgeI(edges.len() + d);
            let sibling = EdgeI(edges.iter().position(|&e| e == (u, v)).unwrap());

            let pos_u = rotation[u].iter().position(|&e| e == sibling).unwrap();
            assert_eq!(rotation[u][pos_u + 1], id, "after the sibling at {}", u);

            let pos_v = rotation[v].iter().position(|&e| e == id).unwrap();
            assert_eq!(rotation[v][pos_v + 1], sibling, "before the sibling at {}", v);
        }
    }
}
