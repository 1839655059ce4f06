use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tryon_contracts::assets::AssetSlot;
use tryon_contracts::catalog::GarmentCatalog;
use tryon_contracts::events::EventWriter;
use tryon_contracts::repl::{parse_intent, Intent, SESSION_HELP_COMMANDS};
use tryon_contracts::session::{Phase, SessionState};
use tryon_engine::{GeminiClient, SessionEngine, TRYON_MODEL_ID};

#[derive(Debug, Parser)]
#[command(name = "tryon", version, about = "Virtual try-on against a hosted image model")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive session: load images, pick garments, generate.
    Session(SessionArgs),
    /// One-shot generation for scripted use.
    Run(RunArgs),
    /// Connectivity test: list models that support content generation.
    Models(ModelsArgs),
}

#[derive(Debug, Parser)]
struct SessionArgs {
    /// Output directory for saved results and the event log.
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    events: Option<PathBuf>,
    /// API key; falls back to GEMINI_API_KEY / GOOGLE_API_KEY.
    #[arg(long)]
    api_key: Option<String>,
    /// Directory holding the catalog garment images.
    #[arg(long, default_value = "images")]
    garments: PathBuf,
}

#[derive(Debug, Parser)]
struct RunArgs {
    #[arg(long)]
    person: PathBuf,
    /// Garment image path; alternative to --pick.
    #[arg(long, conflicts_with = "pick")]
    garment: Option<PathBuf>,
    /// Catalog index of the garment to wear.
    #[arg(long)]
    pick: Option<usize>,
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long, default_value = "images")]
    garments: PathBuf,
}

#[derive(Debug, Parser)]
struct ModelsArgs {
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long)]
    events: Option<PathBuf>,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("tryon error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Session(args) => {
            run_session(args)?;
            Ok(0)
        }
        Command::Run(args) => run_once(args),
        Command::Models(args) => run_models(args),
    }
}

fn build_engine(
    garments: &Path,
    api_key: Option<&str>,
    events_path: Option<PathBuf>,
) -> SessionEngine {
    let events = events_path.map(|path| {
        let session_id = uuid::Uuid::new_v4().to_string();
        EventWriter::new(path, session_id)
    });
    let mut engine = SessionEngine::new(
        Box::new(GeminiClient::new()),
        GarmentCatalog::builtin(),
        garments,
        events,
    );
    if let Some(credential) = resolve_credential(api_key) {
        engine.set_credential(credential);
    }
    engine
}

fn resolve_credential(flag: Option<&str>) -> Option<String> {
    flag.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(GeminiClient::api_key_from_env)
}

fn run_session(args: SessionArgs) -> Result<()> {
    let events_path = args
        .events
        .clone()
        .unwrap_or_else(|| args.out.join("events.jsonl"));
    let mut engine = build_engine(&args.garments, args.api_key.as_deref(), Some(events_path));

    let stdin = io::stdin();
    let mut line = String::new();

    println!("Virtual try-on session started. Type /help for commands.");
    if engine.state().credential.is_empty() {
        println!("No API key yet; set one with /key <api-key>.");
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        let read = match stdin.read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        let input = line.trim_end_matches(['\n', '\r']);
        let intent = parse_intent(input);
        match intent.action.as_str() {
            "noop" => continue,
            "quit" => break,
            "help" => {
                println!("Commands: {}", SESSION_HELP_COMMANDS.join(" "));
            }
            "set_credential" => {
                let credential = string_arg(&intent, "credential");
                if credential.is_empty() {
                    println!("/key requires a value");
                    continue;
                }
                engine.set_credential(credential);
                println!("API key set.");
            }
            "load_person" => {
                let path = string_arg(&intent, "path");
                if path.is_empty() {
                    println!("/person requires a path");
                    continue;
                }
                let before = engine.state().error.clone();
                engine.load_person(Path::new(&path));
                print_op_feedback(engine.state(), &before, "Person image loaded.");
            }
            "load_garment" => {
                let path = string_arg(&intent, "path");
                if path.is_empty() {
                    println!("/garment requires a path");
                    continue;
                }
                let before = engine.state().error.clone();
                engine.load_garment(Path::new(&path));
                print_op_feedback(engine.state(), &before, "Garment image loaded.");
            }
            "drop_file" => {
                let slot = AssetSlot::parse(&string_arg(&intent, "slot"));
                let path = string_arg(&intent, "path");
                let (Some(slot), false) = (slot, path.is_empty()) else {
                    println!("Usage: /drop <person|garment> <path>");
                    continue;
                };
                let before = engine.state().error.clone();
                engine.drop_file(slot, Path::new(&path));
                print_op_feedback(
                    engine.state(),
                    &before,
                    &format!("{} image loaded.", capitalize(slot.label())),
                );
            }
            "show_catalog" => {
                for entry in engine.catalog().entries() {
                    let marker = if engine.state().selected_garment.as_deref()
                        == Some(entry.filename.as_str())
                    {
                        "*"
                    } else {
                        " "
                    };
                    println!("{marker} [{}] {}", entry.display_index, entry.filename);
                }
            }
            "pick_garment" => {
                let Some(index) = intent.command_args.get("index").and_then(Value::as_u64)
                else {
                    println!("Usage: /pick <index>");
                    continue;
                };
                let before = engine.state().error.clone();
                engine.pick_garment_by_index(index as usize);
                print_op_feedback(engine.state(), &before, "Garment selected.");
            }
            "clear_slot" => {
                let Some(slot) = AssetSlot::parse(&string_arg(&intent, "slot")) else {
                    println!("Usage: /clear <person|garment>");
                    continue;
                };
                engine.clear(slot);
                println!("Cleared {}.", slot.label());
            }
            "generate" => {
                if engine.state().is_loading() {
                    println!("A generation is already in flight.");
                    continue;
                }
                println!("Generating with {TRYON_MODEL_ID}...");
                engine.submit();
                print_submit_outcome(engine.state());
            }
            "list_models" => {
                engine.list_models();
                print_model_listing(engine.state());
            }
            "save_result" => {
                let dir = match intent.command_args.get("dir").and_then(Value::as_str) {
                    Some(dir) => PathBuf::from(dir),
                    None => args.out.clone(),
                };
                match engine.save_result(&dir) {
                    Ok(path) => println!("Saved {}", path.display()),
                    Err(err) => println!("Save failed: {err:#}"),
                }
            }
            "status" => {
                for line in format_status_lines(engine.state()) {
                    println!("{line}");
                }
            }
            "unknown" => {
                println!(
                    "Unknown command /{}. Type /help for commands.",
                    string_arg(&intent, "command")
                );
            }
            _ => {
                println!("Commands start with /. Type /help for the list.");
            }
        }
    }

    Ok(())
}

fn run_once(args: RunArgs) -> Result<i32> {
    let events_path = args
        .events
        .clone()
        .unwrap_or_else(|| args.out.join("events.jsonl"));
    let mut engine = build_engine(&args.garments, args.api_key.as_deref(), Some(events_path));

    engine.load_person(&args.person);
    if let Some(error) = engine.state().error.as_deref() {
        eprintln!("Error: {error}");
        return Ok(1);
    }

    match (&args.garment, args.pick) {
        (Some(path), None) => engine.load_garment(path),
        (None, Some(index)) => engine.pick_garment_by_index(index),
        (None, None) => bail!("provide --garment <path> or --pick <index>"),
        (Some(_), Some(_)) => unreachable!("clap rejects --garment with --pick"),
    }
    if let Some(error) = engine.state().error.as_deref() {
        eprintln!("Error: {error}");
        return Ok(1);
    }

    engine.submit();
    match engine.state().phase {
        Phase::Succeeded => {
            let path = engine.save_result(&args.out)?;
            println!("Saved {}", path.display());
            Ok(0)
        }
        _ => {
            eprintln!(
                "Error: {}",
                engine
                    .state()
                    .error
                    .as_deref()
                    .unwrap_or("generation did not complete")
            );
            Ok(1)
        }
    }
}

fn run_models(args: ModelsArgs) -> Result<i32> {
    let mut engine = build_engine(Path::new("images"), args.api_key.as_deref(), args.events);
    engine.list_models();

    if engine.state().model_listing.is_some() {
        print_model_listing(engine.state());
        Ok(0)
    } else {
        eprintln!(
            "Error: {}",
            engine
                .state()
                .error
                .as_deref()
                .unwrap_or("model listing did not complete")
        );
        Ok(1)
    }
}

fn string_arg(intent: &Intent, key: &str) -> String {
    intent
        .command_args
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Per-command feedback: a fresh error wins, otherwise the confirmation.
fn op_feedback(state: &SessionState, error_before: &Option<String>, ok_message: &str) -> String {
    match state.error.as_deref() {
        Some(error) if state.error != *error_before => format!("Error: {error}"),
        _ => ok_message.to_string(),
    }
}

fn print_op_feedback(state: &SessionState, error_before: &Option<String>, ok_message: &str) {
    println!("{}", op_feedback(state, error_before, ok_message));
}

fn print_submit_outcome(state: &SessionState) {
    if let Some(error) = state.error.as_deref() {
        println!("Error: {error}");
        return;
    }
    if let Some(success) = state.success.as_deref() {
        println!("{success}");
        if state.result.is_some() {
            println!("Use /save [dir] to write the image to disk.");
        }
    }
}

fn print_model_listing(state: &SessionState) {
    if let Some(error) = state.error.as_deref() {
        println!("Error: {error}");
        return;
    }
    let Some(listing) = state.model_listing.as_deref() else {
        return;
    };
    println!("Available models:");
    for name in listing {
        println!("{name}");
    }
}

fn format_status_lines(state: &SessionState) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("phase: {}", phase_label(state.phase)));
    lines.push(format!(
        "api key: {}",
        if state.credential.trim().is_empty() {
            "not set"
        } else {
            "set"
        }
    ));
    lines.push(match state.person.as_ref() {
        Some(asset) => format!(
            "person: {} ({} bytes, {})",
            asset.source().label(),
            asset.raw_bytes().len(),
            asset.mime_type()
        ),
        None => "person: none".to_string(),
    });
    lines.push(match state.garment.as_ref() {
        Some(asset) => {
            let mut line = format!(
                "garment: {} ({} bytes, {})",
                asset.source().label(),
                asset.raw_bytes().len(),
                asset.mime_type()
            );
            if let Some(selected) = state.selected_garment.as_deref() {
                line.push_str(&format!(" [{selected}]"));
            }
            line
        }
        None => "garment: none".to_string(),
    });
    lines.push(match state.result.as_ref() {
        Some(result) => format!("result: ready ({})", result.mime_type),
        None => "result: none".to_string(),
    });
    lines
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "idle",
        Phase::Loading => "loading",
        Phase::Succeeded => "succeeded",
        Phase::Failed => "failed",
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use tryon_contracts::assets::{AssetSource, ImageAsset};
    use tryon_contracts::session::{GenerationResult, Phase, SessionState};

    use super::{capitalize, format_status_lines, op_feedback, phase_label};

    #[test]
    fn status_lines_cover_empty_session() {
        let lines = format_status_lines(&SessionState::default());
        assert_eq!(
            lines,
            vec![
                "phase: idle",
                "api key: not set",
                "person: none",
                "garment: none",
                "result: none",
            ]
        );
    }

    #[test]
    fn status_lines_show_loaded_assets_and_selection() {
        let state = SessionState {
            credential: "key".to_string(),
            person: Some(ImageAsset::new(
                vec![0; 3],
                "image/jpeg",
                AssetSource::Upload,
            )),
            garment: Some(ImageAsset::new(
                vec![0; 5],
                "image/webp",
                AssetSource::CatalogFetch,
            )),
            selected_garment: Some("a.webp".to_string()),
            result: Some(GenerationResult {
                image_data: "QQ==".to_string(),
                mime_type: "image/png".to_string(),
            }),
            phase: Phase::Succeeded,
            ..SessionState::default()
        };
        let lines = format_status_lines(&state);
        assert_eq!(lines[0], "phase: succeeded");
        assert_eq!(lines[1], "api key: set");
        assert_eq!(lines[2], "person: upload (3 bytes, image/jpeg)");
        assert_eq!(lines[3], "garment: catalog_fetch (5 bytes, image/webp) [a.webp]");
        assert_eq!(lines[4], "result: ready (image/png)");
    }

    #[test]
    fn phase_labels_are_lowercase() {
        assert_eq!(phase_label(Phase::Idle), "idle");
        assert_eq!(phase_label(Phase::Loading), "loading");
        assert_eq!(phase_label(Phase::Failed), "failed");
    }

    #[test]
    fn capitalize_first_letter_only() {
        assert_eq!(capitalize("person"), "Person");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn fresh_error_beats_the_confirmation() {
        let mut state = SessionState::default();
        assert_eq!(op_feedback(&state, &None, "ok"), "ok");

        state.error = Some("boom".to_string());
        assert_eq!(op_feedback(&state, &None, "ok"), "Error: boom");

        // Stale error from an earlier command does not mask success.
        assert_eq!(
            op_feedback(&state, &Some("boom".to_string()), "ok"),
            "ok"
        );
    }
}
