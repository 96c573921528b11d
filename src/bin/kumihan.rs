use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use kumihan::vertical::to_vertical_string;
use kumihan::{RuleSet, Style, TextAlignment, TextBlock, TypesetConfig, TypesettingEngine};

const DEFAULT_WIDTH: f64 = 420.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Debug)]
struct Args {
    input_path: Option<String>,
    out_path: Option<String>,
    width: f64,
    font_size: Option<f64>,
    line_height: Option<f64>,
    align: Option<TextAlignment>,
    vertical: bool,
    rules_path: Option<String>,
    style_path: Option<String>,
    config_path: Option<String>,
    dump_rules_path: Option<String>,
    format: OutputFormat,
    verbose: bool,
}

fn main() -> ExitCode {
    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) if msg == "help requested" => {
            println!("{}", help_text());
            ExitCode::SUCCESS
        }
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", help_text());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let cli = parse_args(args)?;
    init_logging(cli.verbose);

    let mut engine = TypesettingEngine::new();
    if let Some(path) = cli.config_path.as_deref() {
        let config = TypesetConfig::load_from_file(path).map_err(|e| e.to_string())?;
        engine.set_config(config);
    }
    if let Some(path) = cli.rules_path.as_deref() {
        let mut rules = RuleSet::empty();
        let summary = rules.load_from_file(path).map_err(|e| e.to_string())?;
        log::info!(
            "loaded rules from {}: {} line(s) applied, {} skipped",
            path,
            summary.applied_lines,
            summary.skipped_lines
        );
        engine.set_rules(rules);
    }
    if let Some(path) = cli.dump_rules_path.as_deref() {
        engine
            .rules()
            .save_to_file(path)
            .map_err(|e| e.to_string())?;
        log::info!("wrote rules to {}", path);
        if cli.input_path.is_none() {
            return Ok(());
        }
    }

    let style = build_style(&cli)?;
    let source = read_input(cli.input_path.as_deref())?;
    let text: Vec<char> = source.chars().collect();
    let block = engine.typeset_text(&text, &style, cli.width, cli.vertical);

    let rendered = match cli.format {
        OutputFormat::Text => render_text(&block, cli.vertical),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&block).map_err(|e| e.to_string())?;
            json.push('\n');
            json
        }
    };
    match cli.out_path.as_deref() {
        Some(path) => fs::write(path, rendered).map_err(|e| format!("write {}: {}", path, e)),
        None => io::stdout()
            .lock()
            .write_all(rendered.as_bytes())
            .map_err(|e| e.to_string()),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn build_style(cli: &Args) -> Result<Style, String> {
    let mut style = Style::default();
    if let Some(path) = cli.style_path.as_deref() {
        let summary = style.load_from_file(path).map_err(|e| e.to_string())?;
        log::info!(
            "loaded style from {}: {} line(s) applied, {} skipped",
            path,
            summary.applied_lines,
            summary.skipped_lines
        );
    }
    if let Some(size) = cli.font_size {
        style.font_size = size;
    }
    if let Some(height) = cli.line_height {
        style.line_height = height;
    }
    if let Some(align) = cli.align {
        style.text_alignment = align;
    }
    Ok(style)
}

fn read_input(path: Option<&str>) -> Result<String, String> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|e| format!("read {}: {}", path, e)),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("read stdin: {}", e))?;
            Ok(buf)
        }
    }
}

fn render_text(block: &TextBlock<'_>, vertical: bool) -> String {
    let mut out = String::new();
    for line in &block.lines {
        let text = line.text();
        if vertical {
            out.push_str(&to_vertical_string(&text));
        } else {
            out.push_str(&text);
        }
        out.push('\n');
    }
    out
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h") {
        return Err("help requested".to_string());
    }

    let has_positional_input = args.get(1).is_some_and(|v| !v.starts_with('-'));

    let mut cfg = Args {
        input_path: has_positional_input.then(|| args[1].clone()),
        out_path: None,
        width: DEFAULT_WIDTH,
        font_size: None,
        line_height: None,
        align: None,
        vertical: false,
        rules_path: None,
        style_path: None,
        config_path: None,
        dump_rules_path: None,
        format: OutputFormat::Text,
        verbose: false,
    };

    let mut i = if has_positional_input { 2usize } else { 1usize };
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--vertical" => {
                cfg.vertical = true;
                i += 1;
            }
            "--horizontal" => {
                cfg.vertical = false;
                i += 1;
            }
            "--verbose" | "-v" => {
                cfg.verbose = true;
                i += 1;
            }
            "--help" | "-h" => return Err("help requested".to_string()),
            _ => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| format!("{} requires a value", flag))?;
                match flag {
                    "--out" => cfg.out_path = Some(v.clone()),
                    "--width" => cfg.width = parse_positive(flag, v)?,
                    "--font-size" => cfg.font_size = Some(parse_positive(flag, v)?),
                    "--line-height" => cfg.line_height = Some(parse_positive(flag, v)?),
                    "--align" => {
                        cfg.align = Some(
                            v.parse::<TextAlignment>()
                                .map_err(|_| format!("invalid --align value '{}'", v))?,
                        )
                    }
                    "--rules" => cfg.rules_path = Some(v.clone()),
                    "--style" => cfg.style_path = Some(v.clone()),
                    "--config" => cfg.config_path = Some(v.clone()),
                    "--dump-rules" => cfg.dump_rules_path = Some(v.clone()),
                    "--format" => {
                        cfg.format = match v.as_str() {
                            "text" => OutputFormat::Text,
                            "json" => OutputFormat::Json,
                            _ => return Err(format!("invalid --format value '{}'", v)),
                        }
                    }
                    _ => return Err(format!("unknown argument '{}'", flag)),
                }
                i += 2;
            }
        }
    }

    Ok(cfg)
}

fn parse_positive(flag: &str, v: &str) -> Result<f64, String> {
    v.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n > 0.0)
        .ok_or_else(|| format!("invalid {} value '{}'", flag, v))
}

fn help_text() -> &'static str {
    r#"kumihan - Japanese line breaking with JIS X 4051 kinsoku rules

USAGE:
  kumihan [input] [options]

  Reads UTF-8 text from [input] (stdin when omitted) and prints one line per
  typeset line.

OPTIONS:
  --out <file>              write output to a file instead of stdout
  --width <n>               line width in points (default: 420)
  --font-size <n>           font size in points (default: 10.5)
  --line-height <n>         line pitch as a multiple of the font size (default: 1.5)
  --align <mode>            left | right | center | justify (default: justify)
  --vertical                vertical writing: substitute vertical glyph forms
  --horizontal              horizontal writing (default)
  --rules <file>            kinsoku rules file; replaces the built-in rules
  --style <file>            style file of `Key: Value` lines
  --config <file>           JSON engine config (penalties, prohibition, hanging)
  --dump-rules <file>       write the effective rules file; exits if no input given
  --format <fmt>            text | json (default: text)
  --verbose, -v             debug logging (RUST_LOG overrides)
  --help, -h                show this help"#
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("kumihan")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn defaults_read_stdin_as_text() {
        let cli = parse_args(args(&[])).unwrap();
        assert_eq!(cli.input_path, None);
        assert_eq!(cli.width, DEFAULT_WIDTH);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.vertical);
    }

    #[test]
    fn positional_input_and_flags() {
        let cli = parse_args(args(&[
            "book.txt",
            "--width",
            "210",
            "--align",
            "left",
            "--vertical",
            "--format",
            "json",
            "--rules",
            "custom.rules",
        ]))
        .unwrap();
        assert_eq!(cli.input_path.as_deref(), Some("book.txt"));
        assert_eq!(cli.width, 210.0);
        assert_eq!(cli.align, Some(TextAlignment::Left));
        assert!(cli.vertical);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.rules_path.as_deref(), Some("custom.rules"));
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(parse_args(args(&["--width"])).is_err());
        assert!(parse_args(args(&["--width", "-5"])).is_err());
        assert!(parse_args(args(&["--align", "sideways"])).is_err());
        assert!(parse_args(args(&["--format", "pdf"])).is_err());
        assert!(parse_args(args(&["--bogus", "1"])).is_err());
        assert_eq!(
            parse_args(args(&["--help"])).unwrap_err(),
            "help requested"
        );
    }

    #[test]
    fn vertical_text_output_substitutes_forms() {
        let engine = TypesettingEngine::new();
        let text: Vec<char> = "(注)".chars().collect();
        let block = engine.typeset_text(&text, &Style::default(), 420.0, true);
        assert_eq!(render_text(&block, true), "︵注︶\n");
        assert_eq!(render_text(&block, false), "(注)\n");
    }
}
