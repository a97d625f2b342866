use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tic_core::{DEFAULT_GENERATED_AT, DecoderConfig, decode_capture_file};

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read entry: {}", err))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let input = path.join("input.tic");
        if !input.exists() {
            continue;
        }
        let output = path.join("expected_report.json");
        regenerate_one(&input, &output)?;
    }

    Ok(())
}

fn regenerate_one(input: &Path, output: &Path) -> Result<(), String> {
    let mut report = decode_capture_file(input, DecoderConfig::default())
        .map_err(|err| format!("decoding failed for {}: {}", input.display(), err))?;
    report.generated_at = DEFAULT_GENERATED_AT.to_string();
    report.input.path = "input.tic".to_string();
    let json = serde_json::to_string_pretty(&report)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    fs::write(output, json)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    Ok(())
}
