//! Merjong CLI - render mpsz notation from the command line
//!
//! Commands: themes, parse, render
//! Outputs markup or JSON to stdout, errors as JSON

use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use merjong::{
    parse, Renderer, RenderRequest, ThemeConfig,
    theme::ThemeRegistry,
};

#[derive(Parser)]
#[command(name = "merjong-cli")]
#[command(about = "Merjong CLI - mahjong hand notation to SVG")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to themes directory
    #[arg(short, long, default_value = "themes")]
    themes_dir: PathBuf,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List available themes
    Themes,

    /// Print the render instructions for a notation
    Parse {
        notation: String,
    },

    /// Render notation to an SVG fragment
    Render {
        /// Notation such as 123m456p'-789s
        notation: Option<String>,

        /// File with one notation per line, `-` for stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Theme ID
        #[arg(long)]
        theme: Option<String>,

        /// Base URL for relative design overrides
        #[arg(long)]
        base_url: Option<String>,

        /// Tile design override, repeatable
        #[arg(long = "design", value_name = "KEY=URL", value_parser = parse_design)]
        designs: Vec<(String, String)>,

        /// Print the full render manifest as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_design(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, url)) if !key.is_empty() && !url.is_empty() => {
            Ok((key.to_string(), url.to_string()))
        }
        _ => Err(format!("expected KEY=URL, got {:?}", s)),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .try_init();
}

fn print_error(message: impl std::fmt::Display) {
    let output = serde_json::json!({
        "success": false,
        "error": message.to_string(),
    });
    println!("{}", output);
}

fn read_notations(notation: Option<String>, input: Option<PathBuf>) -> Result<Vec<String>, String> {
    if let Some(n) = notation {
        return Ok(vec![n]);
    }
    let path = input.ok_or_else(|| "Neither a notation nor --input was given".to_string())?;

    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        buf
    } else {
        fs::read_to_string(&path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?
    };

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let registry = match ThemeRegistry::load_from_dir(&cli.themes_dir) {
        Ok(r) => r,
        Err(e) => {
            print_error(format!("Failed to load themes: {}", e));
            return ExitCode::FAILURE;
        }
    };

    let renderer = Renderer::new(registry);

    match cli.command {
        Commands::Themes => {
            let themes: Vec<_> = renderer.list_themes()
                .iter()
                .map(|t| serde_json::json!({
                    "id": t.id,
                    "name": t.name,
                    "tileWidth": t.tile_width,
                    "tileHeight": t.tile_height,
                    "tileGap": t.tile_gap,
                    "spaceWidth": t.space_width,
                }))
                .collect();

            match serde_json::to_string_pretty(&themes) {
                Ok(s) => {
                    println!("{}", s);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    print_error(e);
                    ExitCode::FAILURE
                }
            }
        }

        Commands::Parse { notation } => match serde_json::to_string_pretty(&parse(&notation)) {
            Ok(s) => {
                println!("{}", s);
                ExitCode::SUCCESS
            }
            Err(e) => {
                print_error(e);
                ExitCode::FAILURE
            }
        },

        Commands::Render { notation, input, theme, base_url, designs, json } => {
            let notations = match read_notations(notation, input) {
                Ok(n) => n,
                Err(e) => {
                    print_error(e);
                    return ExitCode::FAILURE;
                }
            };

            let overrides = if base_url.is_none() && designs.is_empty() {
                None
            } else {
                Some(ThemeConfig {
                    base_url,
                    tile_designs: designs.into_iter().collect::<BTreeMap<_, _>>(),
                })
            };

            for notation in notations {
                let request = RenderRequest {
                    notation,
                    theme: theme.clone(),
                    overrides: overrides.clone(),
                };

                let hand = match renderer.render(&request) {
                    Ok(h) => h,
                    Err(e) => {
                        print_error(e);
                        return ExitCode::from(2);
                    }
                };

                if json {
                    match serde_json::to_string(&hand) {
                        Ok(s) => println!("{}", s),
                        Err(e) => {
                            print_error(e);
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", hand.markup);
                }
            }
            ExitCode::SUCCESS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_notation_source_is_an_error() {
        let err = read_notations(None, None).unwrap_err();
        assert!(err.contains("Neither a notation nor --input"));
    }

    #[test]
    fn test_notation_argument_wins_over_input() {
        let notations = read_notations(Some("123m".to_string()), Some(PathBuf::from("missing.txt"))).unwrap();
        assert_eq!(notations, vec!["123m".to_string()]);
    }

    #[test]
    fn test_input_file_lines_trimmed_and_blank_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hands.txt");
        fs::write(&path, "  123m456p  \n\n\t789s-11z\n   \n1'p\n").unwrap();

        let notations = read_notations(None, Some(path)).unwrap();
        assert_eq!(notations, vec!["123m456p", "789s-11z", "1'p"]);
    }

    #[test]
    fn test_unreadable_input_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_notations(None, Some(dir.path().join("absent.txt"))).unwrap_err();
        assert!(err.contains("Failed to read"));
    }

    #[test]
    fn test_parse_design() {
        assert_eq!(
            parse_design("5p=aka/5p.svg").unwrap(),
            ("5p".to_string(), "aka/5p.svg".to_string())
        );
        assert_eq!(
            parse_design("base=https://cdn.example/b.svg?v=2").unwrap(),
            ("base".to_string(), "https://cdn.example/b.svg?v=2".to_string())
        );
        assert!(parse_design("x").is_err());
        assert!(parse_design("=a.svg").is_err());
        assert!(parse_design("1m=").is_err());
    }

    #[test]
    fn test_design_flags_collected() {
        let cli = Cli::try_parse_from([
            "merjong-cli", "render", "1m", "--design", "1m=a.svg", "--design", "2m=b.svg",
        ])
        .unwrap();
        match cli.command {
            Commands::Render { notation, designs, .. } => {
                assert_eq!(notation.as_deref(), Some("1m"));
                assert_eq!(designs.len(), 2);
            }
            _ => panic!("expected render command"),
        }
        assert!(Cli::try_parse_from(["merjong-cli", "render", "--design", "nokey"]).is_err());
    }
}
