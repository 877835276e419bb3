use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use nerference::{AnnotatedText, Color, Error, RenderConfig};

#[derive(Parser, Debug)]
#[command(name = "nerference")]
#[command(about = "Render named-entity annotations into a color-highlighted PDF")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render annotated JSON Lines into a PDF
    Render {
        /// JSON Lines file, one {"text", "entities"} object per line
        input: PathBuf,

        /// Output PDF path
        #[arg(short, long, default_value = "ner_results.pdf")]
        output: PathBuf,

        /// TrueType/OpenType font to embed instead of Helvetica
        #[arg(long, env = "NERFERENCE_FONT")]
        font_file: Option<PathBuf>,

        /// Font size in points
        #[arg(long, default_value_t = 10.0)]
        font_size: f32,

        /// Maximum line width in points
        #[arg(long, default_value_t = 460.0)]
        max_width: f32,

        /// Label color override, e.g. PER=0000ff (repeatable)
        #[arg(long = "color", value_parser = parse_label_color)]
        colors: Vec<(String, Color)>,

        /// Log each text's entities grouped by label
        #[arg(long)]
        summary: bool,
    },
    /// Clean every *.txt file in a directory into pipeline-ready JSON Lines
    Clean {
        input_dir: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
}

fn parse_label_color(s: &str) -> Result<(String, Color), String> {
    let (label, hex) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=RRGGBB, got {s:?}"))?;
    let color = Color::from_hex(hex).ok_or_else(|| format!("invalid color {hex:?}"))?;
    Ok((label.to_string(), color))
}

fn clean_dir(input_dir: &Path, output: &Path) -> Result<usize, Error> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(input_dir)
        .map_err(Error::Io)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case("txt")))
        .collect();
    files.sort();

    if let Some(dir) = output.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir).map_err(Error::Io)?;
    }
    let mut out = std::io::BufWriter::new(std::fs::File::create(output).map_err(Error::Io)?);
    for path in &files {
        let raw = std::fs::read_to_string(path).map_err(Error::Io)?;
        let doc = AnnotatedText {
            text: nerference::preprocess_text(&raw),
            entities: Vec::new(),
        };
        let line = serde_json::to_string(&doc)
            .map_err(|e| Error::InvalidInput(format!("{}: {e}", path.display())))?;
        writeln!(out, "{line}").map_err(Error::Io)?;
        log::debug!("cleaned {}", path.display());
    }
    out.flush().map_err(Error::Io)?;
    Ok(files.len())
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Command::Render {
            input,
            output,
            font_file,
            font_size,
            max_width,
            colors,
            summary,
        } => {
            let mut config = RenderConfig {
                font_file,
                font_size,
                max_width,
                ..RenderConfig::default()
            };
            for (label, color) in colors {
                config.palette = config.palette.with_color(&label, color);
            }
            let docs = nerference::load_annotated(&input)?;
            if summary {
                for (i, doc) in docs.iter().enumerate() {
                    for (label, texts) in nerference::entity_summary(doc) {
                        log::info!("text {i}: {label}: {texts}");
                    }
                }
            }
            let stats = nerference::render_to_pdf(&docs, &config, &output)?;
            println!(
                "Rendered {} texts ({} highlighted spans) → {} [{} pages]",
                stats.blocks,
                stats.highlighted,
                output.display(),
                stats.pages
            );
        }
        Command::Clean { input_dir, output } => {
            let n = clean_dir(&input_dir, &output)?;
            println!("Cleaned {n} files → {}", output.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_color_accepts_hex_with_or_without_hash() {
        assert_eq!(
            parse_label_color("PER=0000ff").unwrap(),
            ("PER".to_string(), Color::BLUE)
        );
        assert_eq!(
            parse_label_color("ORG=#00FF00").unwrap(),
            ("ORG".to_string(), Color([0, 255, 0]))
        );
    }

    #[test]
    fn label_color_rejects_malformed_values() {
        assert!(parse_label_color("PER").unwrap_err().contains("LABEL=RRGGBB"));
        assert!(parse_label_color("PER=00gg00").unwrap_err().contains("invalid color"));
        assert!(parse_label_color("PER=fff").is_err());
    }

    #[test]
    fn clean_dir_writes_sorted_json_lines() {
        let dir = PathBuf::from("tests/output/clean_dir");
        let _ = std::fs::remove_dir_all(&dir);
        let input = dir.join("raw");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(input.join("b.txt"), "Szeged   a Tisza\npartján.").unwrap();
        std::fs::write(input.join("a.TXT"), "Buda-\npest, 1873!").unwrap();
        std::fs::write(input.join("notes.md"), "skipped").unwrap();

        let output = dir.join("out").join("clean.jsonl");
        assert_eq!(clean_dir(&input, &output).unwrap(), 2);

        let docs = nerference::load_annotated(&output).unwrap();
        let texts: Vec<&str> = docs.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, ["Budapest 1873", "Szeged a Tisza partján"]);
        assert!(docs.iter().all(|d| d.entities.is_empty()));
    }

    #[test]
    fn clean_dir_missing_input_is_io_error() {
        let err = clean_dir(
            Path::new("tests/output/no-such-dir"),
            Path::new("tests/output/unused.jsonl"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
