use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use itertools::Itertools;

use crate::graph::{Dart, FaceColor};

lazy_static! {
    // parallel workers finish at unpredictable times; file writes take turns
    static ref TRAIL_FILE_LOCK: Mutex<()> = Mutex::new(());
}

pub fn trail_file_names(
    shape: &str,
    branch: usize,
    color: FaceColor,
    crossing: bool,
) -> (String, String) {
    let staples = if crossing { "crossing" } else { "no_crossing" };
    let base = format!("{}_{}_{}_{}_staples", shape, branch, color, staples);
    (format!("{}.txt", base), format!("{}.ntrail", base))
}

/// Writes the trail as a vertex sequence, once 1-based (`.txt`) and once
/// 0-based (`.ntrail`): the tail of every trail dart, then the final head.
pub fn write_trail_files(
    dir: &Path,
    shape: &str,
    branch: usize,
    color: FaceColor,
    crossing: bool,
    a_trail: &[Dart],
) -> io::Result<(PathBuf, PathBuf)> {
    let (txt_name, ntrail_name) = trail_file_names(shape, branch, color, crossing);
    let txt_path = dir.join(txt_name);
    let ntrail_path = dir.join(ntrail_name);

    let _guard = TRAIL_FILE_LOCK.lock().unwrap();
    write_vertex_sequence(&txt_path, a_trail, 1)?;
    write_vertex_sequence(&ntrail_path, a_trail, 0)?;
    Ok((txt_path, ntrail_path))
}

fn write_vertex_sequence(path: &Path, a_trail: &[Dart], base: usize) -> io::Result<()> {
    let sequence = a_trail
        .iter()
        .map(|d| d.tail.0 + base)
        .chain(a_trail.last().map(|d| d.head.0 + base))
        .join(" ");

    let mut file = File::create(path)?;
    write!(file, "{}", sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::indices::{EdgeI, VertexI};

    fn dart(e: usize, tail: usize, head: usize) -> Dart {
        Dart {
            edge: EdgeI(e),
            tail: VertexI(tail),
            head: VertexI(head),
        }
    }

    #[test]
    fn file_names_carry_branch_color_and_staple_class() {
        let (txt, ntrail) = trail_file_names("torus", 3, FaceColor::Red, false);
        assert_eq!(txt, "torus_3_red_no_crossing_staples.txt");
        assert_eq!(ntrail, "torus_3_red_no_crossing_staples.ntrail");

        let (txt, _) = trail_file_names("torus", 0, FaceColor::Blue, true);
        assert_eq!(txt, "torus_0_blue_crossing_staples.txt");
    }

    #[test]
    fn sequences_are_written_one_and_zero_based() {
        let dir = std::env::temp_dir();
        let a_trail = vec![dart(0, 0, 1), dart(1, 1, 2), dart(2, 2, 0)];

        let shape = format!("erdos_out_{}", std::process::id());
        let (txt, ntrail) =
            write_trail_files(&dir, &shape, 0, FaceColor::Blue, false, &a_trail).unwrap();

        assert_eq!(std::fs::read_to_string(&txt).unwrap(), "1 2 3 1");
        assert_eq!(std::fs::read_to_string(&ntrail).unwrap(), "0 1 2 0");

        std::fs::remove_file(txt).ok();
        std::fs::remove_file(ntrail).ok();
    }
}
