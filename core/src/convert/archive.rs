use crate::error::{Result, ScansortError};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Opens a tar stream, transparently ungzipping when the file starts with
/// the gzip magic bytes (1F 8B 08). Detection is by content, not extension.
fn open_tar(path: &Path) -> Result<tar::Archive<Box<dyn Read>>> {
    let mut file = File::open(path)?;
    let mut head = [0u8; 3];
    let n = file.read(&mut head)?;

    // Put the sniffed bytes back in front using a cursor chain
    let prefix = Cursor::new(head[..n].to_vec());
    let chained = prefix.chain(file);

    let is_gzip = n >= 3 && head[0] == 0x1F && head[1] == 0x8B && head[2] == 0x08;
    let reader: Box<dyn Read> = if is_gzip {
        Box::new(GzDecoder::new(chained))
    } else {
        Box::new(chained)
    };
    Ok(tar::Archive::new(reader))
}

/// Extracts a (possibly gzipped) tar archive under `dest` and returns the
/// path of its single top-level directory.
///
/// The single-top-level shape is a precondition of every archive this
/// pipeline consumes; archives with zero or several top-level entries are
/// rejected up front instead of producing bogus downstream paths.
pub fn untar(archive: &Path, dest: &Path) -> Result<PathBuf> {
    let root = tar_root_name(archive)?;
    let mut tar = open_tar(archive)?;
    tar.unpack(dest).map_err(|e| {
        ScansortError::Archive(format!("failed to extract {}: {}", archive.display(), e))
    })?;
    Ok(dest.join(root))
}

/// Reads the member list and returns the single top-level entry name
fn tar_root_name(archive: &Path) -> Result<String> {
    let mut tar = open_tar(archive)?;
    let entries = tar.entries().map_err(|e| {
        ScansortError::Archive(format!("{} is not a tar archive: {}", archive.display(), e))
    })?;

    let mut roots = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            ScansortError::Archive(format!("{} is not a tar archive: {}", archive.display(), e))
        })?;
        let path = entry.path().map_err(|e| {
            ScansortError::Archive(format!(
                "bad member path in {}: {}",
                archive.display(),
                e
            ))
        })?;
        if let Some(Component::Normal(first)) = path.components().next() {
            roots.insert(first.to_string_lossy().into_owned());
        }
    }

    match roots.len() {
        1 => Ok(roots.into_iter().next().unwrap()),
        0 => Err(ScansortError::Archive(format!(
            "{} contains no members",
            archive.display()
        ))),
        n => Err(ScansortError::Archive(format!(
            "{} must contain exactly one top-level directory, found {}: {}",
            archive.display(),
            n,
            roots.into_iter().collect::<Vec<_>>().join(", ")
        ))),
    }
}

/// Gzip-compresses `src` into `dst`
pub fn gzip_file(src: &Path, dst: &Path) -> Result<()> {
    let mut input = File::open(src)?;
    let mut encoder = GzEncoder::new(File::create(dst)?, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;
    Ok(())
}

/// Decompresses a gzip file `src` into `dst`
pub fn gunzip_file(src: &Path, dst: &Path) -> Result<()> {
    let mut decoder = GzDecoder::new(File::open(src)?);
    let mut output = File::create(dst)?;
    io::copy(&mut decoder, &mut output).map_err(|e| {
        ScansortError::Archive(format!("failed to gunzip {}: {}", src.display(), e))
    })?;
    Ok(())
}

/// Zips the contents of `dir` into `zip_path` (deflate), with every entry
/// stored under `arc_base/` the way the downstream ingester expects.
pub fn zip_dir(dir: &Path, zip_path: &Path, arc_base: &str) -> Result<()> {
    let mut zip = ZipWriter::new(File::create(zip_path)?);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.add_directory(arc_base, options)?;
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| ScansortError::Archive(e.to_string()))?;
        let name = format!("{}/{}", arc_base, rel.to_string_lossy());
        zip.start_file(name, options)?;
        let mut input = File::open(entry.path())?;
        io::copy(&mut input, &mut zip)?;
    }
    zip.finish()?;
    Ok(())
}

/// Builds a .tgz at `dest` with the given (member name, bytes) entries
#[cfg(test)]
pub(crate) fn make_tgz(dest: &Path, entries: &[(&str, &[u8])]) {
    let encoder = GzEncoder::new(File::create(dest).unwrap(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_untar_returns_single_root() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("bundle.tgz");
        make_tgz(
            &archive,
            &[("stuff/a.txt", b"a" as &[u8]), ("stuff/sub/b.txt", b"b")],
        );

        let root = untar(&archive, tmp.path()).unwrap();
        assert_eq!(root, tmp.path().join("stuff"));
        assert_eq!(fs::read(root.join("a.txt")).unwrap(), b"a");
        assert_eq!(fs::read(root.join("sub/b.txt")).unwrap(), b"b");
    }

    #[test]
    fn test_untar_plain_tar() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("bundle.tar");
        let mut builder = tar::Builder::new(File::create(&archive).unwrap());
        let mut header = tar::Header::new_gnu();
        header.set_size(5);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "top/data.bin", &b"hello"[..])
            .unwrap();
        builder.finish().unwrap();

        let root = untar(&archive, tmp.path()).unwrap();
        assert_eq!(root, tmp.path().join("top"));
    }

    #[test]
    fn test_untar_rejects_multiple_roots() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("bad.tgz");
        make_tgz(&archive, &[("one/a", b"a" as &[u8]), ("two/b", b"b")]);

        let err = untar(&archive, tmp.path()).unwrap_err();
        assert!(err.to_string().contains("exactly one top-level directory"));
    }

    #[test]
    fn test_untar_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("not_a.tar");
        fs::write(&archive, b"definitely not tar data").unwrap();

        assert!(untar(&archive, tmp.path()).is_err());
    }

    #[test]
    fn test_gzip_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let plain = tmp.path().join("data.7");
        let gz = tmp.path().join("data.7.gz");
        let back = tmp.path().join("data.7.out");
        fs::write(&plain, b"pfile payload").unwrap();

        gzip_file(&plain, &gz).unwrap();
        gunzip_file(&gz, &back).unwrap();
        assert_eq!(fs::read(&back).unwrap(), b"pfile payload");
    }

    #[test]
    fn test_zip_dir_layout() {
        let tmp = TempDir::new().unwrap();
        let content = tmp.path().join("physio");
        fs::create_dir(&content).unwrap();
        fs::write(content.join("resp.dat"), b"resp").unwrap();
        fs::write(content.join("ppg.dat"), b"ppg").unwrap();

        let zip_path = tmp.path().join("physio.zip");
        zip_dir(&content, &zip_path, "physio").unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.iter().any(|n| n == "physio/resp.dat"));
        assert!(names.iter().any(|n| n == "physio/ppg.dat"));
    }
}
