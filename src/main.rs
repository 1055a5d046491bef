use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::App;
use itertools::Itertools;

use erdos::checkerboard::make_checkerboard;
use erdos::graph::{EmbeddedGraph, FaceColor};
use erdos::ply::read_ply;
use erdos::rotation::build_rotation;
use erdos::round_down_pow2;
use erdos::search::{checkpoint, parallel_search, serial_search};

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let matches = App::new("erdos")
        .version("0.9.0")
        .about("Eulerian routing of DNA origami scaffolds: A-trails for toroidal polyhedra")
        .arg("[PLY] 'Path to the ascii ply mesh file'")
        .arg("[SHAPE] 'Shape name used for the output files'")
        .arg("[BRANCHES] 'Parallel search branches, rounded down to a power of two; 1 or less searches serially'")
        .arg("[USE_CHECKPOINTS] 'Write checkpoint files during the search (0 or 1)'")
        .arg("[CHECKPOINT_FILES]... 'Checkpoint files of an earlier run to resume from'")
        .get_matches();

    let file_name = matches
        .value_of("PLY")
        .map(str::to_string)
        .unwrap_or_else(|| prompt("No file given. Please input file name."));
    let shape = matches
        .value_of("SHAPE")
        .map(str::to_string)
        .unwrap_or_else(|| prompt("No shape name given. Please input desired shape name."));
    let branches_raw = matches
        .value_of("BRANCHES")
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or_else(|| prompt_number("No branch count given. Please input the number of branches."));
    let use_checkpoints = matches
        .value_of("USE_CHECKPOINTS")
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or_else(|| {
            prompt_number("Please input whether checkpoints should be written (0 or 1).")
        })
        != 0;
    let checkpoint_files = matches
        .values_of("CHECKPOINT_FILES")
        .map(|values| values.map(PathBuf::from).collect_vec())
        .unwrap_or_default();

    println!("Reading ply file ...");
    let mesh = match read_ply(Path::new(&file_name)) {
        Ok(mesh) => mesh,
        Err(e) => {
            eprintln!("ERROR - {}", e);
            return 1;
        }
    };

    println!("Running checkerboard augmentation ...");
    let (edges, double_edges) = make_checkerboard(&mesh.faces);

    println!("Building rotation system ...");
    let rotation = build_rotation(mesh.vertices.len(), &mesh.faces, &edges, &double_edges);

    println!("Creating embedded graph ...");
    let eg = EmbeddedGraph::from_rotation(rotation);

    let branches = round_down_pow2(branches_raw);
    let dir = Path::new(".");

    if !checkpoint_files.is_empty() && !use_checkpoints {
        eprintln!("WARNING - Checkpoint files given; resuming without writing new checkpoints.");
    }
    let resume = checkpoint::load_checkpoints(&checkpoint_files);
    if !checkpoint_files.is_empty() && resume.is_empty() {
        eprintln!("WARNING - None of the checkpoint files is usable; starting fresh.");
    }

    let found = if branches <= 1 && resume.is_empty() {
        let first_color = prompt_color();
        serial_search(&eg, first_color, &shape, dir, use_checkpoints).is_some()
    } else {
        let eg = Arc::new(eg);
        let outcomes = parallel_search(&eg, branches, &shape, dir, use_checkpoints, resume);
        outcomes.iter().any(|o| o.solution.is_some())
    };

    if !found {
        println!("No covering tree was found. Exiting program.");
    }
    0
}

fn prompt(message: &str) -> String {
    eprintln!("{}", message);
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(_) => line.trim().to_string(),
        Err(_) => String::new(),
    }
}

fn prompt_number(message: &str) -> usize {
    loop {
        let line = prompt(message);
        if line.is_empty() {
            // stdin closed; fall back to the conservative default
            return 0;
        }
        match line.parse() {
            Ok(n) => return n,
            Err(_) => eprintln!("Please input a number."),
        }
    }
}

fn prompt_color() -> FaceColor {
    loop {
        let flag = prompt_number("Please input the first color to search (0 = blue, 1 = red).");
        match FaceColor::from_flag(flag) {
            Some(color) => return color,
            None => eprintln!("Please input 0 or 1."),
        }
    }
}
