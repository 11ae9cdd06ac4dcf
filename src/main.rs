// Copyright 2020 TwoCookingMice

use meshframe::core::batch_loader::{ load_batch, MeshJob };
use meshframe::core::edges::{ extract_edges, unique_edges };
use meshframe::core::lines::FRAME_LINE_SCALE;
use meshframe::core::tangent_space::{ DegeneratePolicy, TangentSpaceBuilder };
use meshframe::io::ply_utils::write_mesh_to_ply;
use meshframe::math::constants::Float;

use console::style;
use indicatif::{ ProgressBar, ProgressStyle };

use std::env;

struct JobReport {
    name: String,
    vertices: usize,
    triangles: usize,
    edges: usize,
    degenerate: usize,
    output: Option<String>,
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <batch.xml> [--threads N] [--epsilon E] [--policy skip|normal]", program);
    std::process::exit(1);
}

fn run_job(job: &MeshJob, builder: &TangentSpaceBuilder, dedup_edges: bool) -> Result<JobReport, String> {
    let mesh = job.load_mesh().map_err(|e| e.to_string())?;
    let result = builder.build(&mesh).map_err(|e| format!("{}: {}", mesh.name, e))?;

    for d in &result.degenerate {
        log::debug!("{}: degenerate triangle {} {:?}, det = {:e}.",
                    mesh.name, d.triangle, d.vertices, d.determinant);
    }
    if log::log_enabled!(log::Level::Debug) {
        log::debug!("{}: {} frame line segments.",
                    mesh.name, result.frame_lines(FRAME_LINE_SCALE).segment_count());
    }

    let edges = if dedup_edges {
        unique_edges(&mesh.indices)
    } else {
        extract_edges(&mesh.indices)
    }.map_err(|e| format!("{}: {}", mesh.name, e))?;

    let output = match &job.output {
        Some(path) => {
            write_mesh_to_ply(&result.mesh, path).map_err(|e| format!("{}: {}", path.display(), e))?;
            Some(path.display().to_string())
        }
        None => None,
    };

    Ok(JobReport {
        name: mesh.name.clone(),
        vertices: mesh.vertex_count(),
        triangles: mesh.triangle_count(),
        edges: edges.len(),
        degenerate: result.degenerate.len(),
        output,
    })
}

fn main() {
    env::set_var("RUST_LOG", "info");
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage(&args[0]);
    }

    let input_path = &args[1];
    let mut threads_override: Option<usize> = None;
    let mut epsilon_override: Option<Float> = None;
    let mut policy_override: Option<DegeneratePolicy> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--threads" => {
                i += 1;
                threads_override = Some(args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or_else(|| usage(&args[0])));
            }
            "--epsilon" => {
                i += 1;
                epsilon_override = Some(args.get(i).and_then(|v| v.parse::<Float>().ok()).unwrap_or_else(|| usage(&args[0])));
            }
            "--policy" => {
                i += 1;
                policy_override = Some(args.get(i).and_then(|v| DegeneratePolicy::from_name(v)).unwrap_or_else(|| usage(&args[0])));
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                usage(&args[0]);
            }
        }
        i += 1;
    }

    let batch = match load_batch(input_path) {
        Ok(batch) => batch,
        Err(e) => {
            eprintln!("{} {}: {}", style("error:").red().bold(), input_path, e);
            std::process::exit(1);
        }
    };

    let mut builder = batch.settings.builder();
    if let Some(threads) = threads_override {
        builder = builder.with_threads(threads);
    }
    if let Some(epsilon) = epsilon_override {
        builder = builder.with_epsilon(epsilon);
    }
    if let Some(policy) = policy_override {
        builder = builder.with_degenerate_policy(policy);
    }
    log::info!("Tangent space settings: epsilon = {:e}, policy = {}, threads = {}.",
               builder.epsilon(), builder.degenerate_policy().name(), builder.threads());

    let progress = ProgressBar::new(batch.jobs.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} meshes")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut reports = Vec::with_capacity(batch.jobs.len());
    for job in &batch.jobs {
        reports.push(run_job(job, &builder, batch.settings.unique_edges));
        progress.inc(1);
    }
    progress.finish_and_clear();

    let mut failures = 0;
    for report in &reports {
        match report {
            Ok(r) => {
                let status = if r.degenerate == 0 {
                    style("ok".to_string()).green()
                } else {
                    style(format!("{} degenerate", r.degenerate)).yellow()
                };
                println!("{:<24} {:>8} vertices {:>8} triangles {:>8} edges  {}",
                         style(&r.name).bold(), r.vertices, r.triangles, r.edges, status);
                if let Some(output) = &r.output {
                    println!("{:<24} -> {}", "", output);
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("{} {}", style("error:").red().bold(), e);
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
}
