use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use rallyscope::analysis::{self, SetScoreConfig, parse_score_pair};
use rallyscope::export;
use rallyscope::rows::parse_event_rows_str;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let input = arg_value(&args, "--input")
        .or_else(|| std::env::var("MATCH_CSV").ok().filter(|v| !v.trim().is_empty()))
        .map(PathBuf::from)
        .context("no input file; pass --input <csv> or set MATCH_CSV")?;

    let raw = fs::read_to_string(&input)
        .with_context(|| format!("read event export {}", input.display()))?;
    let rows = parse_event_rows_str(&raw)?;

    let set1 = parse_score_arg(&args, "--set1")?;
    let set2 = parse_score_arg(&args, "--set2")?;

    // Without scores this is the upload flow: report team discovery only, so
    // the caller can come back with final set scores.
    let (Some(set1), Some(set2)) = (set1, set2) else {
        let teams = analysis::extract_teams(&rows)?;
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "teams": teams }))?);
        return Ok(());
    };

    let teams = analysis::extract_teams(&rows)?;
    let config = SetScoreConfig::from_pairs(&teams, set1, set2);
    let result = analysis::analyze_match(&rows, config)?;

    let payload = serde_json::to_string_pretty(&result)?;
    match arg_value(&args, "--out") {
        Some(path) => {
            let path = PathBuf::from(path);
            fs::write(&path, payload)
                .with_context(|| format!("write analysis to {}", path.display()))?;
            println!("Analysis written to {}", path.display());
        }
        None => println!("{payload}"),
    }

    if let Some(path) = arg_value(&args, "--xlsx") {
        let path = PathBuf::from(path);
        let report = export::export_analysis(&path, &result)?;
        println!(
            "Workbook written to {} ({} sheets, {} rallies, {} finishers)",
            path.display(),
            report.sheets,
            report.rally_rows,
            report.finisher_rows
        );
    }

    Ok(())
}

fn arg_value(args: &[String], name: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&format!("{name}=")) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

fn parse_score_arg(args: &[String], name: &str) -> Result<Option<(u32, u32)>> {
    let Some(raw) = arg_value(args, name) else {
        return Ok(None);
    };
    parse_score_pair(&raw)
        .map(Some)
        .ok_or_else(|| anyhow!("{name} expects a score pair like 21-18, got `{raw}`"))
}
