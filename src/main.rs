//! Thin command-line plumbing over the litepack library operations.

use std::env;
use std::path::Path;
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use litepack::{compress, decompress, read_one, LitepackError, TrainerConfig};

fn usage(program: &str) -> ! {
    eprintln!("litepack {}", litepack::VERSION);
    eprintln!("Usage: {} <command> [options] <args>", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  compress [-d|--dict] <source> <dest>   compress a store with zstandard");
    eprintln!("  decompress <source> <dest>             decompress a store (codec auto-detected)");
    eprintln!("  read <db>                              print one decoded entry");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} compress app.db app-packed.db", program);
    eprintln!("  {} compress --dict app.db app-packed.db", program);
    eprintln!("  {} decompress app-packed.db app.db", program);
    process::exit(1);
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("litepack");
    if args.len() < 2 {
        usage(program);
    }

    let result = match args[1].as_str() {
        "compress" | "c" => {
            let mut use_dictionary = false;
            let mut paths = Vec::new();
            for arg in &args[2..] {
                match arg.as_str() {
                    "-d" | "--dict" => use_dictionary = true,
                    _ => paths.push(arg.as_str()),
                }
            }
            if paths.len() != 2 {
                usage(program);
            }
            compress(
                Path::new(paths[0]),
                Path::new(paths[1]),
                use_dictionary,
                &TrainerConfig::default(),
            )
        }
        "decompress" | "d" => {
            if args.len() != 4 {
                usage(program);
            }
            decompress(Path::new(&args[2]), Path::new(&args[3]))
        }
        "read" | "r" => {
            if args.len() != 3 {
                usage(program);
            }
            read_entry(Path::new(&args[2]))
        }
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            usage(program);
        }
    };

    if let Err(err) = result {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}

/// Prints one decoded entry older than "now", rendering the JSON `message`
/// field when the payload is JSON and falling back to lossy UTF-8 otherwise.
fn read_entry(db_path: &Path) -> Result<(), LitepackError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(i64::MAX);

    match read_one(db_path, now)? {
        None => {
            println!("no entries found in {}", db_path.display());
        }
        Some(entry) => {
            let message = serde_json::from_slice::<serde_json::Value>(&entry.content)
                .ok()
                .and_then(|json| json["message"].as_str().map(str::to_owned))
                .unwrap_or_else(|| String::from_utf8_lossy(&entry.content).into_owned());
            println!(
                "epoch_secs = {} level = {} message = {}",
                entry.epoch_secs, entry.level, message
            );
        }
    }
    Ok(())
}
