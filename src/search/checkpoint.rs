use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;

use crate::error::{RouteErr, RouteResult};
use crate::graph::FaceColor;

/// Snapshot of one worker's search position.
///
/// Serialized as a single whitespace-separated line: the vertex stack (as
/// indices into the BFS vertex ordering) terminated by `|`, then the cursor,
/// the last include/exclude choice, the target color flag, and the branch
/// id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    pub stack: Vec<usize>,
    pub cursor: usize,
    pub last_choice: u8,
    pub color: FaceColor,
    pub branch: usize,
}

impl Checkpoint {
    pub fn to_line(&self) -> String {
        let stack = self.stack.iter().map(|s| s.to_string()).join(" ");
        let sep = if stack.is_empty() { "|" } else { " |" }.to_string();
        format!(
            "{}{} {} {} {} {}",
            stack,
            sep,
            self.cursor,
            self.last_choice,
            self.color.flag(),
            self.branch
        )
    }

    pub fn from_line(line: &str) -> RouteResult<Checkpoint> {
        let tokens = line.split_whitespace().collect_vec();
        let bar = tokens
            .iter()
            .position(|&t| t == "|")
            .ok_or_else(|| RouteErr::malformed_checkpoint("no stack terminator in checkpoint"))?;

        let stack = tokens[..bar]
            .iter()
            .map(|t| t.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| RouteErr::malformed_checkpoint("stack token is not a number"))?;

        let rest = &tokens[bar + 1..];
        if rest.len() != 4 {
            return Err(RouteErr::malformed_checkpoint(
                "expected cursor, choice, color and branch after the stack",
            ));
        }
        let numbers = rest
            .iter()
            .map(|t| t.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| RouteErr::malformed_checkpoint("state token is not a number"))?;

        let last_choice = match numbers[1] {
            0 | 1 => numbers[1] as u8,
            _ => return Err(RouteErr::malformed_checkpoint("choice must be 0 or 1")),
        };
        let color = FaceColor::from_flag(numbers[2])
            .ok_or_else(|| RouteErr::malformed_checkpoint("color must be 0 or 1"))?;

        Ok(Checkpoint {
            stack,
            cursor: numbers[0],
            last_choice,
            color,
            branch: numbers[3],
        })
    }

    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        fs::write(path, format!("{}\n", self.to_line()))
    }

    pub fn read_from(path: &Path) -> RouteResult<Checkpoint> {
        let content = fs::read_to_string(path).map_err(|e| {
            RouteErr::malformed_checkpoint(&format!(
                "cannot read checkpoint file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Checkpoint::from_line(content.trim())
    }
}

pub fn checkpoint_path(dir: &Path, shape: &str, branch: usize) -> PathBuf {
    dir.join(format!("{}_checkpoint_{}.txt", shape, branch))
}

/// Reads every given checkpoint file, skipping malformed ones with a
/// warning so the remaining workers can still be seeded.
pub fn load_checkpoints(paths: &[PathBuf]) -> Vec<Checkpoint> {
    let mut checkpoints = Vec::new();
    for path in paths {
        match Checkpoint::read_from(path) {
            Ok(c) => checkpoints.push(c),
            Err(e) => eprintln!(
                "WARNING - Skipping checkpoint file '{}': {}",
                path.display(),
                e
            ),
        }
    }
    checkpoints
}
