use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use regex::Regex;

use crate::error::{RouteErr, RouteResult};

/// The raw polygon soup of an ascii PLY file: opaque vertex coordinates and
/// faces as cyclic vertex-index lists (CCW per outward normal).
#[derive(Debug)]
pub struct PlyMesh {
    pub vertices: Vec<Vec<f64>>,
    pub faces: Vec<Vec<usize>>,
}

/// Reads an ascii PLY file.
///
/// Only the `ply` magic, the two `element` counts and `end_header` are
/// interpreted; every other header line is ignored. Vertex lines may carry
/// extra properties, so every parseable float is kept. Face lines start
/// with the vertex count of the face followed by that many zero-based
/// indices.
pub fn read_ply(path: &Path) -> RouteResult<PlyMesh> {
    let file = File::open(path).map_err(|_| {
        RouteErr::input_unreadable(&format!(
            "Cannot open specified file: {}",
            path.display()
        ))
    })?;
    let mut lines = BufReader::new(file).lines();
    let mut next_line = || -> RouteResult<Option<String>> {
        match lines.next() {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(e)) => Err(RouteErr::input_unreadable(&format!("{}", e))),
            None => Ok(None),
        }
    };

    match next_line()? {
        Some(magic) if magic.starts_with("ply") => {}
        _ => return Err(RouteErr::input_unreadable("File is not a PLY file")),
    }

    let vertex_re = Regex::new(r"^element\s+vertex\s+(\d+)").unwrap();
    let face_re = Regex::new(r"^element\s+face\s+(\d+)").unwrap();

    let mut vertex_count: Option<usize> = None;
    let mut face_count: Option<usize> = None;
    loop {
        let line = match next_line()? {
            Some(line) => line,
            None => {
                return Err(RouteErr::input_unreadable(
                    "PLY header has no end_header line",
                ))
            }
        };

        if let Some(caps) = vertex_re.captures(&line) {
            vertex_count = caps[1].parse().ok();
        } else if let Some(caps) = face_re.captures(&line) {
            face_count = caps[1].parse().ok();
        } else if line.starts_with("end_header") {
            break;
        }
    }

    let vertex_count = vertex_count
        .ok_or_else(|| RouteErr::input_unreadable("PLY header declares no vertex count"))?;
    let face_count = face_count
        .ok_or_else(|| RouteErr::input_unreadable("PLY header declares no face count"))?;
    println!("There are {} vertices", vertex_count);
    println!("There are {} faces.", face_count);

    let mut vertices = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        let line = next_line()?
            .ok_or_else(|| RouteErr::input_unreadable("PLY vertex section ends early"))?;
        let coords = line
            .split_whitespace()
            .filter_map(|t| t.parse::<f64>().ok())
            .collect();
        vertices.push(coords);
    }

    let mut faces = Vec::with_capacity(face_count);
    for _ in 0..face_count {
        let line = next_line()?
            .ok_or_else(|| RouteErr::input_unreadable("PLY face section ends early"))?;
        let mut tokens = line.split_whitespace();
        let n: usize = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| RouteErr::input_unreadable("face line has no vertex count"))?;
        let indices: Vec<usize> = tokens.filter_map(|t| t.parse().ok()).take(n).collect();
        if indices.len() != n {
            return Err(RouteErr::input_unreadable(&format!(
                "face line promises {} vertices but carries {}",
                n,
                indices.len()
            )));
        }
        faces.push(indices);
    }

    Ok(PlyMesh { vertices, faces })
}
