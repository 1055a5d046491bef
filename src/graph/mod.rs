use std::collections::VecDeque;
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};

use itertools::Itertools;

use self::indices::{EdgeI, FaceI, VertexI};

pub mod indices;

macro_rules! obstructed {
    () => {
        panic!("referential integrity of the embedding obstructed")
    };
}

/// Checkerboard face color. `Blue` is the color assigned to face 0 by the
/// coloring DFS; the numeric flags (0 = blue, 1 = red) appear on the CLI
/// and in checkpoint files.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FaceColor {
    Blue,
    Red,
}

impl FaceColor {
    pub fn opposite(self) -> FaceColor {
        match self {
            FaceColor::Blue => FaceColor::Red,
            FaceColor::Red => FaceColor::Blue,
        }
    }

    pub fn flag(self) -> usize {
        match self {
            FaceColor::Blue => 0,
            FaceColor::Red => 1,
        }
    }

    pub fn from_flag(flag: usize) -> Option<FaceColor> {
        match flag {
            0 => Some(FaceColor::Blue),
            1 => Some(FaceColor::Red),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FaceColor::Blue => "blue",
            FaceColor::Red => "red",
        }
    }
}

impl std::fmt::Display for FaceColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Undirected edge with endpoints normalized to `v1 < v2`. Equality is on
/// the id alone; a doubled edge and its sibling connect the same vertex
/// pair under different ids.
#[derive(Copy, Clone)]
pub struct Edge {
    pub id: EdgeI,
    pub v1: VertexI,
    pub v2: VertexI,
}

impl Edge {
    pub fn new(id: EdgeI, a: VertexI, b: VertexI) -> Edge {
        let (v1, v2) = if a.0 <= b.0 { (a, b) } else { (b, a) };
        Edge { id, v1, v2 }
    }

    pub fn other(&self, this: VertexI) -> VertexI {
        if this == self.v1 {
            self.v2
        } else if this == self.v2 {
            self.v1
        } else {
            obstructed!()
        }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl Debug for Edge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} -- {}", self.id, self.v1, self.v2)
    }
}

/// One directed traversal of an edge, as it occurs in a face cycle or in
/// the A-trail.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Dart {
    pub edge: EdgeI,
    pub tail: VertexI,
    pub head: VertexI,
}

impl Dart {
    pub fn reversed(&self) -> Dart {
        Dart {
            edge: self.edge,
            tail: self.head,
            head: self.tail,
        }
    }
}

impl Debug for Dart {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} -> {}", self.edge, self.tail, self.head)
    }
}

/// Face of the embedding: a closed directed walk of darts, consistently
/// oriented, plus its checkerboard color.
pub struct Face {
    pub id: FaceI,
    pub darts: Vec<Dart>,
    color: Option<FaceColor>,
}

impl Face {
    pub fn len(&self) -> usize {
        self.darts.len()
    }

    pub fn color(&self) -> FaceColor {
        match self.color {
            Some(c) => c,
            None => obstructed!(),
        }
    }

    pub fn contains_vertex(&self, v: VertexI) -> bool {
        self.darts.iter().any(|d| d.tail == v || d.head == v)
    }

    pub fn dart_position(&self, e: EdgeI) -> Option<usize> {
        self.darts.iter().position(|d| d.edge == e)
    }
}

impl Debug for Face {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (", self.id)?;
        match self.color {
            Some(c) => write!(f, "{}", c)?,
            None => write!(f, "?")?,
        }
        write!(f, "):")?;
        for d in &self.darts {
            write!(f, " {:?} ;", d)?;
        }
        Ok(())
    }
}

/// The combinatorial embedding, frozen after construction.
///
/// Everything is an arena indexed by integer id; the search workers share
/// one instance behind an `Arc` and never mutate it.
pub struct EmbeddedGraph {
    vertex_count: usize,
    rotation: Vec<Vec<EdgeI>>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
    face_adj: Vec<Vec<FaceI>>,
    vertex_adj: Vec<Vec<VertexI>>,
    vertex_ordering: Vec<VertexI>,
    blue_faces: Vec<FaceI>,
    red_faces: Vec<FaceI>,
    // per vertex, positions within blue_faces / red_faces
    blue_face_vertices: Vec<Vec<usize>>,
    red_face_vertices: Vec<Vec<usize>>,
    // per edge, the unique incident face of each color
    edge_color_faces: Vec<[Option<FaceI>; 2]>,
}

impl EmbeddedGraph {
    /// Recovers the full embedding from the rotation system alone: edges,
    /// faces (cyclic-successor walks), adjacencies, the face 2-coloring,
    /// and the BFS vertex ordering the search will follow.
    pub fn from_rotation(rotation: Vec<Vec<EdgeI>>) -> EmbeddedGraph {
        let vertex_count = rotation.len();
        let edges = recover_edges(&rotation);
        let faces = recover_faces(&rotation, &edges);
        let face_adj = face_adjacency(&faces, edges.len());
        let vertex_adj = vertex_adjacency(&edges, vertex_count);

        let mut eg = EmbeddedGraph {
            vertex_count,
            rotation,
            edges,
            faces,
            face_adj,
            vertex_adj,
            vertex_ordering: Vec::new(),
            blue_faces: Vec::new(),
            red_faces: Vec::new(),
            blue_face_vertices: Vec::new(),
            red_face_vertices: Vec::new(),
            edge_color_faces: Vec::new(),
        };

        eg.color_faces();
        eg.order_vertices();
        eg.index_colored_faces();
        eg
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn edge(&self, e: EdgeI) -> &Edge {
        &self.edges[e.0]
    }

    pub fn face(&self, f: FaceI) -> &Face {
        &self.faces[f.0]
    }

    pub fn faces(&self) -> &Vec<Face> {
        &self.faces
    }

    pub fn rotation(&self, v: VertexI) -> &Vec<EdgeI> {
        &self.rotation[v.0]
    }

    pub fn face_neighbors(&self, f: FaceI) -> &Vec<FaceI> {
        &self.face_adj[f.0]
    }

    pub fn vertex_neighbors(&self, v: VertexI) -> &Vec<VertexI> {
        &self.vertex_adj[v.0]
    }

    /// BFS ordering from vertex 0; the covering-tree search decides
    /// vertices in exactly this order.
    pub fn vertex_ordering(&self) -> &Vec<VertexI> {
        &self.vertex_ordering
    }

    pub fn faces_of(&self, color: FaceColor) -> &Vec<FaceI> {
        match color {
            FaceColor::Blue => &self.blue_faces,
            FaceColor::Red => &self.red_faces,
        }
    }

    /// For every vertex, the positions (within `faces_of(color)`) of the
    /// faces of that color incident to it. No duplicates.
    pub fn face_vertices_of(&self, color: FaceColor) -> &Vec<Vec<usize>> {
        match color {
            FaceColor::Blue => &self.blue_face_vertices,
            FaceColor::Red => &self.red_face_vertices,
        }
    }

    /// The unique face of the given color bordering `e`. Well-defined on a
    /// checkerboard-colorable embedding, where the two faces of every edge
    /// carry opposite colors.
    pub fn colored_face_of_edge(&self, color: FaceColor, e: EdgeI) -> FaceI {
        match self.edge_color_faces[e.0][color.flag()] {
            Some(f) => f,
            None => obstructed!(),
        }
    }

    fn color_faces(&mut self) {
        let mut visited = vec![false; self.faces.len()];
        if !self.faces.is_empty() {
            self.color_faces_from(FaceI(0), FaceColor::Blue, &mut visited);
        }
    }

    fn color_faces_from(&mut self, f: FaceI, color: FaceColor, visited: &mut Vec<bool>) {
        visited[f.0] = true;
        self.faces[f.0].color = Some(color);
        for i in 0..self.face_adj[f.0].len() {
            let nb = self.face_adj[f.0][i];
            if !visited[nb.0] {
                self.color_faces_from(nb, color.opposite(), visited);
            } else {
                debug_assert!(
                    self.faces[nb.0].color != Some(color),
                    "face adjacency graph is not bipartite"
                );
            }
        }
    }

    fn order_vertices(&mut self) {
        let mut visited = vec![false; self.vertex_count];
        let mut queue = VecDeque::new();
        visited[0] = true;
        queue.push_back(VertexI(0));

        while let Some(v) = queue.pop_front() {
            self.vertex_ordering.push(v);
            for &nb in &self.vertex_adj[v.0] {
                if !visited[nb.0] {
                    visited[nb.0] = true;
                    queue.push_back(nb);
                }
            }
        }
    }

    fn index_colored_faces(&mut self) {
        for f in &self.faces {
            match f.color() {
                FaceColor::Blue => self.blue_faces.push(f.id),
                FaceColor::Red => self.red_faces.push(f.id),
            }
        }

        self.blue_face_vertices = vec![Vec::new(); self.vertex_count];
        self.red_face_vertices = vec![Vec::new(); self.vertex_count];
        for (color, list) in &[
            (FaceColor::Blue, &self.blue_faces),
            (FaceColor::Red, &self.red_faces),
        ] {
            for (pos, &fid) in list.iter().enumerate() {
                for v in 0..self.vertex_count {
                    if self.faces[fid.0].contains_vertex(VertexI(v)) {
                        match color {
                            FaceColor::Blue => self.blue_face_vertices[v].push(pos),
                            FaceColor::Red => self.red_face_vertices[v].push(pos),
                        }
                    }
                }
            }
        }

        self.edge_color_faces = vec![[None, None]; self.edges.len()];
        for f in &self.faces {
            let flag = f.color().flag();
            for d in &f.darts {
                debug_assert!(
                    self.edge_color_faces[d.edge.0][flag].is_none(),
                    "two faces of one color border {}",
                    d.edge
                );
                self.edge_color_faces[d.edge.0][flag] = Some(f.id);
            }
        }
    }
}

/// Every edge id in the rotation lists, with its endpoints. Ids must be
/// dense and appear in exactly two lists.
fn recover_edges(rotation: &Vec<Vec<EdgeI>>) -> Vec<Edge> {
    let mut endpoints: Vec<Vec<VertexI>> = Vec::new();
    for (v, slots) in rotation.iter().enumerate() {
        for &e in slots {
            if endpoints.len() <= e.0 {
                endpoints.resize(e.0 + 1, Vec::new());
            }
            endpoints[e.0].push(VertexI(v));
        }
    }

    endpoints
        .into_iter()
        .enumerate()
        .map(|(id, vs)| match vs.as_slice() {
            [a, b] => Edge::new(EdgeI(id), *a, *b),
            _ => obstructed!(),
        })
        .collect_vec()
}

/// Face recovery by the cyclic-successor rule: from a dart, cross the edge
/// and continue with the next slot in the far endpoint's rotation. Each
/// orbit is one face; orbits partition the darts.
fn recover_faces(rotation: &Vec<Vec<EdgeI>>, edges: &[Edge]) -> Vec<Face> {
    let mut faces = Vec::new();
    let mut visited = rotation
        .iter()
        .map(|slots| vec![false; slots.len()])
        .collect_vec();

    for v in 0..rotation.len() {
        for j in 0..rotation[v].len() {
            if visited[v][j] {
                continue;
            }

            let mut darts = Vec::new();
            let mut curr_v = v;
            let mut curr_slot = j;
            loop {
                visited[curr_v][curr_slot] = true;
                let e = rotation[curr_v][curr_slot];
                let w = edges[e.0].other(VertexI(curr_v));
                darts.push(Dart {
                    edge: e,
                    tail: VertexI(curr_v),
                    head: w,
                });

                let pos = match rotation[w.0].iter().position(|&x| x == e) {
                    Some(p) => p,
                    None => obstructed!(),
                };
                curr_v = w.0;
                curr_slot = (pos + 1) % rotation[w.0].len();

                if curr_v == v && curr_slot == j {
                    break;
                }
            }

            faces.push(Face {
                id: FaceI(faces.len()),
                darts,
                color: None,
            });
        }
    }

    faces
}

fn face_adjacency(faces: &[Face], edge_count: usize) -> Vec<Vec<FaceI>> {
    let mut edge_to_faces: Vec<Vec<FaceI>> = vec![Vec::new(); edge_count];
    for f in faces {
        for d in &f.darts {
            edge_to_faces[d.edge.0].push(f.id);
        }
    }

    let mut adj: Vec<Vec<FaceI>> = vec![Vec::new(); faces.len()];
    for pair in &edge_to_faces {
        match pair.as_slice() {
            [f1, f2] => {
                adj[f1.0].push(*f2);
                adj[f2.0].push(*f1);
            }
            _ => obstructed!(),
        }
    }

    for list in adj.iter_mut() {
        list.sort();
        list.dedup();
    }
    adj
}

fn vertex_adjacency(edges: &[Edge], vertex_count: usize) -> Vec<Vec<VertexI>> {
    let mut adj: Vec<Vec<VertexI>> = vec![Vec::new(); vertex_count];
    for e in edges {
        adj[e.v1.0].push(e.v2);
        adj[e.v2.0].push(e.v1);
    }
    for list in adj.iter_mut() {
        list.sort();
        list.dedup();
    }
    adj
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkerboard::make_checkerboard;
    use crate::rotation::build_rotation;

    fn tetrahedron_faces() -> Vec<Vec<usize>> {
        vec![vec![0, 1, 2], vec![0, 2, 3], vec![0, 3, 1], vec![1, 3, 2]]
    }

    fn octahedron_faces() -> Vec<Vec<usize>> {
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

    fn embed(faces: Vec<Vec<usize>>, vertex_count: usize) -> EmbeddedGraph {
        let (edges, double_edges) = make_checkerboard(&faces);
        let rotation = build_rotation(vertex_count, &faces, &edges, &double_edges);
        EmbeddedGraph::from_rotation(rotation)
    }

    #[test]
    fn tetrahedron_counts() {
        let eg = embed(tetrahedron_faces(), 4);
        // three doubled edges repair the K4 face graph
        assert_eq!(eg.vertex_count(), 4);
        assert_eq!(eg.edge_count(), 9);
        assert_eq!(eg.face_count(), 7);
        // Euler characteristic of the sphere
        assert_eq!(
            eg.vertex_count() as isize - eg.edge_count() as isize + eg.face_count() as isize,
            2
        );
    }

    #[test]
    fn octahedron_counts() {
        let eg = embed(octahedron_faces(), 6);
        // face graph of the octahedron is already bipartite
        assert_eq!(eg.vertex_count(), 6);
        assert_eq!(eg.edge_count(), 12);
        assert_eq!(eg.face_count(), 8);
    }

    #[test]
    fn rotation_lists_every_incident_edge_once() {
        let eg = embed(tetrahedron_faces(), 4);
        for v in 0..eg.vertex_count() {
            let v = VertexI(v);
            let mut from_rotation = eg.rotation(v).clone();
            from_rotation.sort();

            let mut incident = (0..eg.edge_count())
                .map(EdgeI)
                .filter(|&e| eg.edge(e).v1 == v || eg.edge(e).v2 == v)
                .collect_vec();
            incident.sort();

            assert_eq!(from_rotation, incident);
        }
    }

    #[test]
    fn faces_close_and_pair_up() {
        for eg in [embed(tetrahedron_faces(), 4), embed(octahedron_faces(), 6)] {
            let mut edge_uses = vec![Vec::new(); eg.edge_count()];
            for f in eg.faces() {
                for (i, d) in f.darts.iter().enumerate() {
                    let next = &f.darts[(i + 1) % f.len()];
                    assert_eq!(d.head, next.tail, "face cycle of {} broken", f.id);
                    edge_uses[d.edge.0].push(*d);
                }
            }
            // every undirected edge lies in two faces, as opposite darts
            for (e, uses) in edge_uses.iter().enumerate() {
                assert_eq!(uses.len(), 2, "e{} not in exactly two faces", e);
                assert_eq!(uses[0], uses[1].reversed());
            }
        }
    }

    #[test]
    fn coloring_is_checkerboard() {
        for eg in [embed(tetrahedron_faces(), 4), embed(octahedron_faces(), 6)] {
            for f in eg.faces() {
                for &nb in eg.face_neighbors(f.id) {
                    assert_ne!(f.color(), eg.face(nb).color());
                }
            }
            assert_eq!(
                eg.faces_of(FaceColor::Red).len() + eg.faces_of(FaceColor::Blue).len(),
                eg.face_count()
            );
        }
    }

    #[test]
    fn bfs_ordering_starts_at_zero_and_spans() {
        let eg = embed(octahedron_faces(), 6);
        let order = eg.vertex_ordering();
        assert_eq!(order[0], VertexI(0));
        assert_eq!(order.len(), eg.vertex_count());
        assert_eq!(order.iter().unique().count(), eg.vertex_count());
    }

    #[test]
    fn colored_face_index_has_no_duplicates() {
        let eg = embed(tetrahedron_faces(), 4);
        for color in [FaceColor::Blue, FaceColor::Red] {
            let list = eg.faces_of(color);
            for (v, positions) in eg.face_vertices_of(color).iter().enumerate() {
                assert_eq!(positions.iter().unique().count(), positions.len());
                for &pos in positions {
                    assert!(eg.face(list[pos]).contains_vertex(VertexI(v)));
                }
            }
        }
    }

    #[test]
    fn edges_know_their_two_face_colors() {
        let eg = embed(octahedron_faces(), 6);
        for e in 0..eg.edge_count() {
            let e = EdgeI(e);
            let blue = eg.colored_face_of_edge(FaceColor::Blue, e);
            let red = eg.colored_face_of_edge(FaceColor::Red, e);
            assert_ne!(blue, red);
            assert!(eg.face(blue).dart_position(e).is_some());
            assert!(eg.face(red).dart_position(e).is_some());
        }
    }
}
