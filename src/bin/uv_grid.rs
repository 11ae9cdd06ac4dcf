use meshframe::textures::image::TextureImage;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <out.png> [size] [step]", args[0]);
        std::process::exit(1);
    }

    let parse = |idx: usize, default: u32| -> u32 {
        match args.get(idx) {
            Some(v) => v.parse::<u32>().unwrap_or_else(|_| {
                eprintln!("Invalid number: {}", v);
                std::process::exit(1);
            }),
            None => default,
        }
    };
    let size = parse(2, 512);
    let step = parse(3, 32);
    if size == 0 || step == 0 {
        eprintln!("Size and step must be positive.");
        std::process::exit(1);
    }

    let grid = TextureImage::uv_grid(size, step);
    if let Err(e) = grid.save(&args[1]) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    println!("Wrote {}x{} grid (step {}) to {}", size, size, step, args[1]);
}
