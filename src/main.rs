use anyhow::{Context, Result};
use fsicdata::convert::{convert_file, ConvertOptions};
use glob::glob;
use std::{env, fs, fs::File, path::PathBuf};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let args: Vec<String> = env::args().collect();
    if !(3..=4).contains(&args.len()) {
        eprintln!("Usage: {} <input-glob> <out-dir> [options.json]", args[0]);
        std::process::exit(1);
    }

    // ─── 2) options + output dir ─────────────────────────────────────
    let opts: ConvertOptions = match args.get(3) {
        Some(p) => {
            let f = File::open(p).with_context(|| format!("opening options {}", p))?;
            serde_json::from_reader(f).with_context(|| format!("parsing options {}", p))?
        }
        None => ConvertOptions::default(),
    };
    let out_dir = PathBuf::from(&args[2]);
    fs::create_dir_all(&out_dir).with_context(|| format!("creating {:?}", out_dir))?;
    info!(?opts, out_dir = %out_dir.display(), "startup");

    // ─── 3) convert every match, one at a time ───────────────────────
    let mut converted = 0usize;
    let mut failed = 0usize;
    for entry in glob(&args[1]).with_context(|| format!("bad glob {}", args[1]))? {
        let path = match entry {
            Ok(p) => p,
            Err(e) => {
                error!("unreadable match: {}", e);
                failed += 1;
                continue;
            }
        };
        match convert_file(&path, &out_dir, &opts) {
            Ok(_) => converted += 1,
            Err(e) => {
                error!("{} failed: {:#}", path.display(), e);
                failed += 1;
            }
        }
    }

    info!(converted, failed, "all done");
    if failed > 0 {
        std::process::exit(2);
    }
    Ok(())
}
