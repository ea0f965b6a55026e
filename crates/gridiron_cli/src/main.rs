use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use gridiron_cli::{run, RunOptions};

fn main() -> ExitCode {
    init_tracing();
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn run_cli() -> Result<(), String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        return Err(usage_text());
    }
    if args[0] == "-h" || args[0] == "--help" {
        print_usage();
        return Ok(());
    }

    let mut options = RunOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--assets" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --assets".to_string())?;
                options.assets = PathBuf::from(value);
                index += 2;
            }
            "--level" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --level".to_string())?;
                options.levels.push(PathBuf::from(value));
                index += 2;
            }
            "--start" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --start".to_string())?;
                options.start_level = value
                    .parse::<usize>()
                    .map_err(|_| format!("invalid --start value '{value}' (expected usize)"))?;
                index += 2;
            }
            "--seconds" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --seconds".to_string())?;
                options.seconds = value
                    .parse::<f32>()
                    .map_err(|_| format!("invalid --seconds value '{value}' (expected f32)"))?;
                index += 2;
            }
            "--tick" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --tick".to_string())?;
                options.tick = value
                    .parse::<f32>()
                    .map_err(|_| format!("invalid --tick value '{value}' (expected f32)"))?;
                if options.tick <= 0.0 {
                    return Err("--tick must be positive".to_string());
                }
                index += 2;
            }
            "--walk" => {
                options.walk_right = true;
                index += 1;
            }
            "--jump-every" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --jump-every".to_string())?;
                let every = value
                    .parse::<f32>()
                    .map_err(|_| format!("invalid --jump-every value '{value}' (expected f32)"))?;
                options.jump_every = Some(every);
                index += 2;
            }
            "--save-in" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --save-in".to_string())?;
                options.save_in = Some(PathBuf::from(value));
                index += 2;
            }
            "--save-out" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --save-out".to_string())?;
                options.save_out = Some(PathBuf::from(value));
                index += 2;
            }
            other => return Err(format!("unknown argument '{other}'\n\n{}", usage_text())),
        }
    }

    if options.levels.is_empty() {
        return Err("at least one --level is required".to_string());
    }

    run(options, &mut io::stdout()).map_err(|error| error.to_string())
}

fn print_usage() {
    println!("{}", usage_text());
}

fn usage_text() -> String {
    [
        "gridiron_cli - headless platformer runner",
        "",
        "Usage:",
        "  gridiron_cli --level <file> [--level <file>...] [options]",
        "",
        "Options:",
        "  --assets <dir>       image root directory (default .)",
        "  --start <n>          playlist index to load first (default 0)",
        "  --seconds <f32>      seconds of play to simulate (default 10)",
        "  --tick <f32>         seconds per input tick (default 1/60)",
        "  --walk               hold the right intent for the whole run",
        "  --jump-every <f32>   press jump every N seconds",
        "  --save-in <file>     restore a session snapshot before running",
        "  --save-out <file>    write a session snapshot after running",
    ]
    .join("\n")
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
