use meshframe::math::color::{ hex_to_rgb, hsl_to_rgb, hsv_to_rgb, rgb_to_hex, rgb_to_hsl, rgb_to_hsv };
use meshframe::math::constants::{ Float, Vector3f };

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <hex|rgb|hsl|hsv> <values...>", program);
    eprintln!("  hex takes #rrggbb, the others three components in [0, 1].");
    std::process::exit(1);
}

fn parse_triple(values: &[String], program: &str) -> Vector3f {
    if values.len() != 3 {
        usage(program);
    }
    let mut out = Vector3f::zeros();
    for (i, v) in values.iter().enumerate() {
        out[i] = v.parse::<Float>().unwrap_or_else(|_| {
            eprintln!("Invalid component: {}", v);
            std::process::exit(1);
        });
    }
    out
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        usage(&args[0]);
    }

    let rgb = match args[1].as_str() {
        "hex" => hex_to_rgb(&args[2]).unwrap_or_else(|e| {
            eprintln!("{}", e);
            std::process::exit(1);
        }),
        "rgb" => parse_triple(&args[2..], &args[0]),
        "hsl" => hsl_to_rgb(&parse_triple(&args[2..], &args[0])),
        "hsv" => hsv_to_rgb(&parse_triple(&args[2..], &args[0])),
        _ => usage(&args[0]),
    };

    let hsl = rgb_to_hsl(&rgb);
    let hsv = rgb_to_hsv(&rgb);
    println!("hex: {}", rgb_to_hex(&rgb));
    println!("rgb: {:.4} {:.4} {:.4}", rgb.x, rgb.y, rgb.z);
    println!("hsl: {:.4} {:.4} {:.4}", hsl.x, hsl.y, hsl.z);
    println!("hsv: {:.4} {:.4} {:.4}", hsv.x, hsv.y, hsv.z);
}
