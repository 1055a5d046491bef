use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use bitvec::prelude::*;
use itertools::Itertools;

use crate::graph::indices::VertexI;
use crate::graph::{Dart, EmbeddedGraph, FaceColor};
use crate::{output, trail};

use self::checkpoint::{checkpoint_path, Checkpoint};

pub mod checkpoint;

/// Progress is reported and (when enabled) a checkpoint written every this
/// many search iterations.
pub const CHECKPOINT_INTERVAL: u64 = 10_000_000;

/// A covering tree found by one branch, with its routed trail.
pub struct Solution {
    pub vertices: Vec<VertexI>,
    pub a_trail: Vec<Dart>,
    pub crossing: bool,
}

pub struct BranchOutcome {
    pub branch: usize,
    pub color: FaceColor,
    pub solution: Option<Solution>,
}

/// One worker's branch-and-bound over inclusion/exclusion of vertices, in
/// BFS-ordering order. All mutable state lives here; the embedded graph is
/// only read.
pub struct CoveringTreeSearch<'a> {
    eg: &'a EmbeddedGraph,
    color: FaceColor,
    branch: usize,
    prefix_len: usize,
    stack: Vec<usize>,
    iterations: u64,
    stopwatch: Instant,
    checkpoint_file: Option<PathBuf>,
}

impl<'a> CoveringTreeSearch<'a> {
    /// Serial search over the full decision tree.
    pub fn serial(eg: &'a EmbeddedGraph, color: FaceColor) -> Self {
        CoveringTreeSearch {
            eg,
            color,
            branch: 0,
            prefix_len: 0,
            stack: Vec::new(),
            iterations: 0,
            stopwatch: Instant::now(),
            checkpoint_file: None,
        }
    }

    /// Worker `branch` of a parallel fan-out: the low bit selects the face
    /// color, the remaining bits fix the include/exclude decisions for the
    /// first `prefix_len` slots of the vertex ordering.
    pub fn for_branch(
        eg: &'a EmbeddedGraph,
        branch: usize,
        prefix_len: usize,
        checkpoint_file: Option<PathBuf>,
    ) -> Self {
        let color = FaceColor::from_flag(branch % 2).unwrap();
        let prefix = branch / 2;
        let bits = prefix.view_bits::<Lsb0>();
        let stack = (0..prefix_len).filter(|&j| bits[j]).collect_vec();

        CoveringTreeSearch {
            eg,
            color,
            branch,
            prefix_len,
            stack,
            iterations: 0,
            stopwatch: Instant::now(),
            checkpoint_file,
        }
    }

    /// Worker seeded from a checkpointed stack position.
    pub fn from_checkpoint(
        eg: &'a EmbeddedGraph,
        snapshot: Checkpoint,
        prefix_len: usize,
        checkpoint_file: Option<PathBuf>,
    ) -> Self {
        CoveringTreeSearch {
            eg,
            color: snapshot.color,
            branch: snapshot.branch,
            prefix_len,
            stack: snapshot.stack,
            iterations: 0,
            stopwatch: Instant::now(),
            checkpoint_file,
        }
    }

    pub fn color(&self) -> FaceColor {
        self.color
    }

    pub fn branch(&self) -> usize {
        self.branch
    }

    pub fn stack(&self) -> &Vec<usize> {
        &self.stack
    }

    /// The covering-tree vertices as absolute vertex ids.
    pub fn chosen_vertices(&self) -> Vec<VertexI> {
        let v_order = self.eg.vertex_ordering();
        self.stack.iter().map(|&slot| v_order[slot]).collect_vec()
    }

    /// Runs the search from `start_cursor` (the prefix length on a fresh
    /// branch, the checkpointed cursor on a resumed one).
    ///
    /// Include is tried before exclude, so every stack member above the
    /// fan-out prefix still owes its exclude-sibling subtree; after the
    /// current subtree is exhausted those siblings are replayed deepest
    /// first, which makes a resumed search cover exactly the remainder of
    /// an uninterrupted one.
    pub fn run(&mut self, start_cursor: usize) -> bool {
        if self.descend(start_cursor) {
            return true;
        }
        while let Some(&top) = self.stack.last() {
            if top < self.prefix_len {
                break;
            }
            self.stack.pop();
            if self.descend(top + 1) {
                return true;
            }
        }
        false
    }

    fn descend(&mut self, cursor: usize) -> bool {
        self.tick(cursor);

        let (is_full_tree, candidate) = self.full_tree_test();
        if has_cycle(&candidate) {
            // more vertices only add more incidences; a cycle never heals
            return false;
        }
        if is_full_tree {
            println!("[branch {}] found", self.branch);
            return true;
        }
        if cursor >= self.eg.vertex_count() {
            return false;
        }

        self.stack.push(cursor);
        if self.descend(cursor + 1) {
            return true;
        }
        self.stack.pop();
        self.descend(cursor + 1)
    }

    /// Builds the bipartite incidence graph between the chosen vertices and
    /// the faces of the target color: nodes `0..s` are stack positions,
    /// nodes `s..s+F` the color's faces. Returns whether it spans all nodes
    /// and is connected, along with the graph for the cycle test.
    fn full_tree_test(&self) -> (bool, Vec<Vec<usize>>) {
        let v_order = self.eg.vertex_ordering();
        let face_vertices = self.eg.face_vertices_of(self.color);
        let color_face_count = self.eg.faces_of(self.color).len();
        let s = self.stack.len();

        let mut candidate: Vec<Vec<usize>> = vec![Vec::new(); s + color_face_count];
        for (i, &slot) in self.stack.iter().enumerate() {
            let v = v_order[slot];
            for &fpos in &face_vertices[v.0] {
                candidate[i].push(s + fpos);
                candidate[s + fpos].push(i);
            }
        }

        let spans =
            s > 0 && color_face_count > 0 && candidate.iter().all(|row| !row.is_empty());
        (spans && is_connected(&candidate), candidate)
    }

    fn tick(&mut self, cursor: usize) {
        self.iterations += 1;
        if self.iterations % CHECKPOINT_INTERVAL != 0 {
            return;
        }

        println!(
            "[branch {}] {}: {} ms",
            self.branch,
            self.iterations,
            self.stopwatch.elapsed().as_millis()
        );
        self.stopwatch = Instant::now();

        if let Some(path) = &self.checkpoint_file {
            let last_choice = if cursor > 0 && self.stack.last() == Some(&(cursor - 1)) {
                1
            } else {
                0
            };
            let snapshot = Checkpoint {
                stack: self.stack.clone(),
                cursor,
                last_choice,
                color: self.color,
                branch: self.branch,
            };
            if let Err(e) = snapshot.write_to(path) {
                eprintln!(
                    "WARNING - Checkpoint could not be written to '{}': {}",
                    path.display(),
                    e
                );
            }
        }
    }
}

fn is_connected(graph: &[Vec<usize>]) -> bool {
    if graph.is_empty() {
        return false;
    }
    let mut visited = vec![false; graph.len()];
    let mut stack = vec![0];
    while let Some(v) = stack.pop() {
        if !visited[v] {
            visited[v] = true;
            for &nb in &graph[v] {
                if !visited[nb] {
                    stack.push(nb);
                }
            }
        }
    }
    visited.iter().filter(|&&x| x).count() == graph.len()
}

fn has_cycle(graph: &[Vec<usize>]) -> bool {
    let mut visited = vec![false; graph.len()];
    for i in 0..graph.len() {
        if !visited[i] && cycle_dfs(graph, i, usize::MAX, &mut visited) {
            return true;
        }
    }
    false
}

fn cycle_dfs(graph: &[Vec<usize>], v: usize, parent: usize, visited: &mut Vec<bool>) -> bool {
    visited[v] = true;
    for &nb in &graph[v] {
        if !visited[nb] {
            if cycle_dfs(graph, nb, v, visited) {
                return true;
            }
        } else if nb != parent {
            return true;
        }
    }
    false
}

/// Completes one branch: search, and on success trail extraction, staple
/// classification and file output, all on the calling thread.
fn run_worker(
    eg: &EmbeddedGraph,
    mut search: CoveringTreeSearch,
    start_cursor: usize,
    shape: &str,
    dir: &Path,
) -> BranchOutcome {
    let branch = search.branch();
    let color = search.color();
    println!(
        "Searching for covering tree ({}, branch {}) ...",
        color, branch
    );

    if !search.run(start_cursor) {
        return BranchOutcome {
            branch,
            color,
            solution: None,
        };
    }

    let vertices = search.chosen_vertices();
    println!(
        "[branch {}] Covering tree vertices: {}",
        branch,
        vertices.iter().map(|v| v.0.to_string()).join(" ")
    );

    let a_trail = trail::find_a_trail(eg, &vertices, color);
    let crossing = trail::check_crossing_staples(eg, &a_trail);
    if let Err(e) = output::write_trail_files(dir, shape, branch, color, crossing, &a_trail) {
        eprintln!("Trail files could not be written: {}", e);
    }

    BranchOutcome {
        branch,
        color,
        solution: Some(Solution {
            vertices,
            a_trail,
            crossing,
        }),
    }
}

/// Serial mode: searches `first_color` over the whole decision tree, then
/// falls back to the opposite color. The reported color is the one the
/// covering tree was actually found for.
pub fn serial_search(
    eg: &EmbeddedGraph,
    first_color: FaceColor,
    shape: &str,
    dir: &Path,
    write_checkpoints: bool,
) -> Option<BranchOutcome> {
    for color in [first_color, first_color.opposite()] {
        let checkpoint_file = if write_checkpoints {
            Some(checkpoint_path(dir, shape, 0))
        } else {
            None
        };
        let mut search = CoveringTreeSearch::serial(eg, color);
        search.checkpoint_file = checkpoint_file;

        let outcome = run_worker(eg, search, 0, shape, dir);
        if outcome.solution.is_some() {
            return Some(outcome);
        }
    }
    None
}

/// Parallel fan-out over `branches` workers (a power of two), or over the
/// given checkpoints when resuming. Workers share the embedded graph read
/// only and join at the end; outcomes come back in spawn order.
pub fn parallel_search(
    eg: &Arc<EmbeddedGraph>,
    branches: usize,
    shape: &str,
    dir: &Path,
    write_checkpoints: bool,
    resume: Vec<Checkpoint>,
) -> Vec<BranchOutcome> {
    let prefix_len = if branches >= 2 {
        (branches / 2).trailing_zeros() as usize
    } else {
        0
    };

    let mut handles = Vec::new();
    if resume.is_empty() {
        for branch in 0..branches {
            let eg = Arc::clone(eg);
            let shape = shape.to_string();
            let dir = dir.to_path_buf();
            handles.push(thread::spawn(move || {
                let checkpoint_file = if write_checkpoints {
                    Some(checkpoint_path(&dir, &shape, branch))
                } else {
                    None
                };
                let search =
                    CoveringTreeSearch::for_branch(&eg, branch, prefix_len, checkpoint_file);
                run_worker(&eg, search, prefix_len, &shape, &dir)
            }));
        }
    } else {
        for snapshot in resume {
            if snapshot.cursor > eg.vertex_count()
                || snapshot.stack.iter().any(|&s| s >= eg.vertex_count())
            {
                eprintln!(
                    "WARNING - Skipping checkpoint for branch {}: positions do not fit this mesh.",
                    snapshot.branch
                );
                continue;
            }
            let eg = Arc::clone(eg);
            let shape = shape.to_string();
            let dir = dir.to_path_buf();
            handles.push(thread::spawn(move || {
                let checkpoint_file = if write_checkpoints {
                    Some(checkpoint_path(&dir, &shape, snapshot.branch))
                } else {
                    None
                };
                let cursor = snapshot.cursor;
                let search =
                    CoveringTreeSearch::from_checkpoint(&eg, snapshot, prefix_len, checkpoint_file);
                run_worker(&eg, search, cursor, &shape, &dir)
            }));
        }
    }

    handles
        .into_iter()
        .map(|h| h.join().expect("search worker panicked"))
        .collect_vec()
}
