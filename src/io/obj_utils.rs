// Copyright @yucwang 2026

use crate::math::constants::Vector3f;
use crate::shapes::triangle::Triangle;

use std::fs;
use std::path::Path;

use thiserror::Error;
use wavefront_obj::{ obj, ParseError };

#[derive(Debug, Error)]
pub enum ObjLoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(ParseError),
    #[error("face references missing vertex {0}")]
    MissingVertex(usize),
}

impl From<ParseError> for ObjLoadError {
    fn from(err: ParseError) -> Self {
        ObjLoadError::Parse(err)
    }
}

pub fn load_obj_from_str<S: AsRef<str>>(input: S) -> Result<obj::ObjSet, ParseError> {
    obj::parse(triangulate_faces(input.as_ref()))
}

/// All triangles of every object in an OBJ string, in file order.
pub fn load_triangles_from_str<S: AsRef<str>>(input: S) -> Result<Vec<Triangle>, ObjLoadError> {
    let obj_set = load_obj_from_str(input)?;
    let mut triangles = Vec::new();

    for object in &obj_set.objects {
        let vertex = |idx: usize| -> Result<Vector3f, ObjLoadError> {
            object.vertices.get(idx)
                .map(|v| Vector3f::new(v.x as f32, v.y as f32, v.z as f32))
                .ok_or(ObjLoadError::MissingVertex(idx))
        };

        for geom in &object.geometry {
            for shape in &geom.shapes {
                if let obj::Primitive::Triangle(a, b, c) = &shape.primitive {
                    triangles.push(Triangle::new(vertex(a.0)?, vertex(b.0)?, vertex(c.0)?));
                }
            }
        }
    }

    log::debug!("Parsed {} triangles from {} OBJ objects.", triangles.len(), obj_set.objects.len());
    Ok(triangles)
}

pub fn load_triangles_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Triangle>, ObjLoadError> {
    let path = path.as_ref();
    log::info!("Loading OBJ mesh from: {}.", path.display());
    let data = fs::read_to_string(path)?;
    load_triangles_from_str(data)
}

// wavefront_obj only accepts triangles and lines, so fan-split larger polygons.
fn triangulate_faces(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 4);
    for line in input.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("f ") || trimmed.starts_with("f\t") {
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            if parts.len() > 4 {
                for i in 2..(parts.len() - 1) {
                    out.push_str(&format!("f {} {} {}\n", parts[1], parts[i], parts[i + 1]));
                }
                continue;
            }
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}
