use std::env;
use std::fs;
use std::io;
use std::process;

use tracing_subscriber::EnvFilter;

use psalter::EngineConfig;

fn usage() -> ! {
    eprintln!("Usage: psalter [--config <settings.yaml>] <chapter> <payload.json> [output.json]");
    eprintln!("       psalter --transliterate <text>");
    process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        usage();
    }

    if args[0] == "--transliterate" {
        if args.len() < 2 {
            usage();
        }
        println!("{}", psalter::transliterate(&args[1..].join(" ")));
        return;
    }

    // Parse flags
    let mut rest = args.as_slice();
    let mut config = EngineConfig::default();
    if rest[0] == "--config" {
        let Some(path) = rest.get(1) else { usage() };
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading config '{}': {}", path, e);
                process::exit(1);
            }
        };
        config = match EngineConfig::from_yaml(&content) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        };
        rest = &rest[2..];
    }

    if rest.len() < 2 {
        usage();
    }

    let chapter: u16 = match rest[0].parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("Error: '{}' is not a chapter number", rest[0]);
            process::exit(1);
        }
    };
    let input_path = &rest[1];
    let output_path = rest.get(2);

    // Read payload
    let payload = match fs::read_to_string(input_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", input_path, e);
            process::exit(1);
        }
    };

    let chapter = match psalter::build_chapter(chapter, &payload, &config) {
        Ok(chapter) => chapter,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let json = match serde_json::to_string_pretty(&chapter) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing chapter: {}", e);
            process::exit(1);
        }
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing to '{}': {}", path, e);
                process::exit(1);
            }
            eprintln!("Wrote {} verses to {}", chapter.verses.len(), path);
        }
        None => {
            println!("{}", json);
        }
    }
}
