//! `lumipileup pileup-json` — per-bunch CSV → pileup JSON.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use lumi_pileup::{PileupConfig, SlotFilter, build_pileup_document, to_json_string};

pub fn cmd_pileup_json(input: &Path, output: Option<&Path>, sel_bx: Option<&str>) -> Result<()> {
    let filter = sel_bx.map(SlotFilter::parse_list).unwrap_or_default();
    tracing::info!("processing {} with {filter}", input.display());

    let file = File::open(input)
        .with_context(|| format!("failed to open input file {}", input.display()))?;
    let report = build_pileup_document(BufReader::new(file), PileupConfig::with_filter(filter))
        .with_context(|| format!("failed to process {}", input.display()))?;

    if report.stats.implausible_slots > 0 {
        tracing::warn!(
            bunches = report.stats.implausible_slots,
            "bunches with mean pileup > 100 were found"
        );
    }

    let json = to_json_string(&report.document)?;
    match output {
        Some(path) => {
            write_atomic(path, json.as_bytes())?;
            eprintln!(
                "Output written to {} ({} runs, {} lumi sections, {} skipped lines)",
                path.display(),
                report.document.len(),
                report.stats.intervals,
                report.stats.malformed,
            );
        }
        None => {
            println!("{json}");
            eprintln!("Output written to stdout");
        }
    }
    Ok(())
}

/// Write to a hidden sibling file, then rename over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_sibling(path)?;
    std::fs::write(&tmp, bytes)
        .with_context(|| format!("could not open '{}' as an output JSON file", path.display()))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e)
            .with_context(|| format!("could not move output into place at {}", path.display()));
    }
    Ok(())
}

fn tmp_sibling(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .with_context(|| format!("output path has no file name: {}", path.display()))?;
    let mut tmp = OsString::from(".");
    tmp.push(name);
    tmp.push(format!(".{}.tmp", std::process::id()));
    Ok(path.with_file_name(tmp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_sibling_stays_in_same_directory() {
        let tmp = tmp_sibling(Path::new("/data/out/pileup.json")).unwrap();
        assert_eq!(tmp.parent(), Some(Path::new("/data/out")));
        let name = tmp.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".pileup.json."));
        assert!(name.ends_with(".tmp"));
    }

    #[test]
    fn tmp_sibling_rejects_directory_like_path() {
        assert!(tmp_sibling(Path::new("/")).is_err());
    }
}
