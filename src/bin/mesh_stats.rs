use meshframe::core::edges::unique_edges;
use meshframe::core::mesh::Mesh;
use meshframe::core::tangent_space::build_tangent_space;
use meshframe::io::obj_utils::load_mesh_from_obj;
use meshframe::io::ply_utils::load_mesh_from_ply;
use meshframe::math::constants::Vector3f;

use std::path::Path;

fn load(path: &Path) -> Result<Mesh, String> {
    match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref() {
        Some("obj") => load_mesh_from_obj(path).map_err(|e| e.to_string()),
        Some("ply") => load_mesh_from_ply(path).map_err(|e| e.to_string()),
        _ => Err(format!("unsupported mesh format: {}", path.display())),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <mesh.obj|mesh.ply>", args[0]);
        std::process::exit(1);
    }

    let mut mesh = load(Path::new(&args[1])).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    let mut min = Vector3f::repeat(f32::INFINITY);
    let mut max = Vector3f::repeat(f32::NEG_INFINITY);
    for p in &mesh.positions {
        min = min.inf(p);
        max = max.sup(p);
    }

    println!("Name: {}", mesh.name);
    println!("Vertices: {}", mesh.vertex_count());
    println!("Triangles: {}", mesh.triangle_count());
    println!("Colors: {}", mesh.colors.is_some());
    println!("Tangents: {}", mesh.has_tangents());
    if mesh.vertex_count() > 0 {
        println!("Bounds: ({:.4}, {:.4}, {:.4}) - ({:.4}, {:.4}, {:.4})",
                 min.x, min.y, min.z, max.x, max.y, max.z);
    }

    match unique_edges(&mesh.indices) {
        Ok(edges) => println!("Unique edges: {}", edges.len()),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }

    // Degenerate UV triangles are only reported by a fresh build.
    mesh.strip_tangents();
    match build_tangent_space(&mesh) {
        Ok(result) => println!("Degenerate UV triangles: {}", result.degenerate.len()),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
