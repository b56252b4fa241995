use crate::convert::walk::basename;
use crate::error::{Result, ScansortError};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Merges each `*Screen_Save` directory's per-slice captures into one
/// montage and relocates it into the matching acquisition directory.
///
/// The acquisition number is the last two digits of the directory name's
/// first `_`-separated token, leading zero stripped; the target is the
/// first directory (in sorted order) whose name starts with `<number>_`.
/// When several acquisitions share the numeric prefix the first one wins.
/// Requires the ImageMagick `montage` tool on PATH.
pub fn process(dirs: &[PathBuf]) -> Result<()> {
    let screen_saves: Vec<&PathBuf> = dirs
        .iter()
        .filter(|d| basename(d).ends_with("Screen_Save"))
        .collect();
    info!("... {} screen save(s) to process", screen_saves.len());

    for dir in screen_saves {
        let pngs = collect_pngs(dir)?;
        if pngs.is_empty() {
            return Err(ScansortError::ScreenSave(format!(
                "{} contains no .png images",
                dir.display()
            )));
        }

        let montage_path = montage_name(&pngs[0]);
        run_montage(&pngs, &montage_path)?;

        let number = acquisition_number(dir)?;
        let target = find_acquisition_dir(dirs, &number, dir)?;
        let dest = target.join(basename(&montage_path));
        fs::rename(&montage_path, &dest)?;
        fs::remove_dir_all(dir)?;
    }
    Ok(())
}

fn collect_pngs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pngs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map_or(false, |e| e.eq_ignore_ascii_case("png")) {
            pngs.push(path);
        }
    }
    pngs.sort();
    Ok(pngs)
}

/// Output name derived from the first png: its path with the trailing
/// `N.png` replaced by `montage.png`
fn montage_name(first_png: &Path) -> PathBuf {
    let s = first_png.to_string_lossy();
    let cut = s.len().saturating_sub(5);
    PathBuf::from(format!("{}montage.png", &s[..cut]))
}

fn run_montage(pngs: &[PathBuf], output: &Path) -> Result<()> {
    let status = Command::new("montage")
        .arg("-geometry")
        .arg("+4+4")
        .args(pngs)
        .arg(output)
        .status()
        .map_err(|e| ScansortError::Montage(format!("failed to run 'montage': {}", e)))?;
    if !status.success() {
        return Err(ScansortError::Montage(format!(
            "'montage' exited with {} for {}",
            status,
            output.display()
        )));
    }
    Ok(())
}

/// Parses the two-digit acquisition number out of a screen-save directory
/// name, dropping a leading zero.
fn acquisition_number(dir: &Path) -> Result<String> {
    let name = basename(dir);
    let token = name.split('_').next().unwrap_or("");
    let chars: Vec<char> = token.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(2)..].iter().collect();
    let number = tail.trim_start_matches('0');
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(ScansortError::ScreenSave(format!(
            "cannot parse an acquisition number from {}",
            dir.display()
        )));
    }
    Ok(number.to_string())
}

fn find_acquisition_dir<'a>(
    dirs: &'a [PathBuf],
    number: &str,
    screen_save: &Path,
) -> Result<&'a PathBuf> {
    let prefix = format!("{}_", number);
    dirs.iter()
        .find(|d| d.as_path() != screen_save && basename(d).starts_with(&prefix))
        .ok_or_else(|| {
            ScansortError::ScreenSave(format!(
                "no acquisition directory with prefix '{}' for {}",
                prefix,
                screen_save.display()
            ))
        })
}
