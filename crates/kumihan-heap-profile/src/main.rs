//! DHAT heap profiler for kumihan.
//!
//! Profiles allocation patterns of the line breaking pipeline:
//! scan -> solve -> typeset.
//!
//! Usage:
//!   cargo run -p kumihan-heap-profile --release -- [OPTIONS] [TEXT_FILES...]
//!
//! Outputs dhat-<phase>.json in the output directory (default: target/memory).
//! Open in https://nnethercote.github.io/dh_view/dh_view.html

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::path::{Path, PathBuf};

use kumihan::{BreakPointScanner, OptimalBreakSolver, Style, TypesettingEngine};

const LINE_WIDTH: f64 = 420.0;

const DEFAULT_FIXTURES: &[&str] = &["tests/fixtures/wagahai.txt", "tests/fixtures/mixed.txt"];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Scan,
    Solve,
    Typeset,
}

impl Phase {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "scan" => Some(Self::Scan),
            "solve" => Some(Self::Solve),
            "typeset" => Some(Self::Typeset),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Solve => "solve",
            Self::Typeset => "typeset",
        }
    }
}

fn profile_text(engine: &TypesettingEngine, text: &[char], phase: Phase) -> usize {
    let style = Style::default();
    match phase {
        Phase::Scan => BreakPointScanner::new(engine.rules())
            .find_break_points(text)
            .len(),
        Phase::Solve => {
            let points = BreakPointScanner::new(engine.rules()).find_break_points(text);
            OptimalBreakSolver::new()
                .calculate_optimal_breaks(
                    text,
                    &points,
                    |ch| engine.character_width(ch, &style, false),
                    LINE_WIDTH,
                )
                .len()
        }
        Phase::Typeset => engine.typeset_text(text, &style, LINE_WIDTH, false).lines.len(),
    }
}

fn load_text(path: &Path, repeat: usize) -> Vec<char> {
    let raw = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", path.display(), e);
        std::process::exit(1);
    });
    let mut out = Vec::with_capacity(raw.len() * repeat);
    for _ in 0..repeat {
        out.extend(raw.chars());
    }
    out
}

fn usage() {
    eprintln!("Usage: heap-profile [OPTIONS] [TEXT_FILES...]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --phase <scan|solve|typeset>  Pipeline phase to profile (default: typeset)");
    eprintln!("  --out-dir <DIR>               Output directory for dhat JSON (default: target/memory)");
    eprintln!("  --repeat <N>                  Concatenate each input N times (default: 8)");
    eprintln!();
    eprintln!("If no files are given, profiles the bundled text fixtures.");
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut phase = Phase::Typeset;
    let mut out_dir = PathBuf::from("target/memory");
    let mut repeat = 8usize;
    let mut files: Vec<PathBuf> = Vec::with_capacity(4);
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--phase" | "--out-dir" | "--repeat" if i + 1 >= args.len() => {
                eprintln!("{} requires a value", args[i]);
                usage();
                std::process::exit(1);
            }
            "--phase" => {
                i += 1;
                phase = Phase::from_str(&args[i]).unwrap_or_else(|| {
                    eprintln!("Unknown phase: {}", args[i]);
                    usage();
                    std::process::exit(1);
                });
            }
            "--out-dir" => {
                i += 1;
                out_dir = PathBuf::from(&args[i]);
            }
            "--repeat" => {
                i += 1;
                repeat = args[i].parse().unwrap_or_else(|_| {
                    eprintln!("Invalid repeat count: {}", args[i]);
                    std::process::exit(1);
                });
            }
            "--help" | "-h" => {
                usage();
                std::process::exit(0);
            }
            other => files.push(PathBuf::from(other)),
        }
        i += 1;
    }

    if files.is_empty() {
        files.extend(
            DEFAULT_FIXTURES
                .iter()
                .map(PathBuf::from)
                .filter(|p| p.exists()),
        );
    }
    if files.is_empty() {
        eprintln!("No text files found. Provide paths or run from the repository root.");
        std::process::exit(1);
    }

    std::fs::create_dir_all(&out_dir).unwrap_or_else(|e| {
        eprintln!("Failed to create output dir {}: {}", out_dir.display(), e);
        std::process::exit(1);
    });

    // Inputs and engine are built before profiling starts.
    let engine = TypesettingEngine::new();
    let texts: Vec<(PathBuf, Vec<char>)> = files
        .into_iter()
        .map(|path| {
            let text = load_text(&path, repeat.max(1));
            (path, text)
        })
        .collect();

    let json_path = out_dir.join(format!("dhat-{}.json", phase.name()));
    eprintln!(
        "heap-profile: phase={}, files={}, repeat={}, out={}",
        phase.name(),
        texts.len(),
        repeat,
        out_dir.display()
    );

    let profiler = dhat::Profiler::builder()
        .file_name(json_path.clone())
        .build();

    for (path, text) in &texts {
        let produced = profile_text(&engine, text, phase);
        eprintln!(
            "  {}: {} chars -> {} items",
            path.display(),
            text.len(),
            produced
        );
    }

    // Writes the JSON profile.
    drop(profiler);
    eprintln!(
        "Done. Open {} in https://nnethercote.github.io/dh_view/dh_view.html",
        json_path.display()
    );
}
