use anyhow::Context;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use unitrun_core::Unit;
use uuid::Uuid;
use walkdir::WalkDir;

pub const DIRECTORY_DIGEST_ID: Uuid = Uuid::from_u128(0x9a41_d7c0_5e2b_4f6a_b183_27c4_e0f9_5d12);

/// Prints `sha256  path` for every regular file under each argument path.
pub struct DirectoryDigest;

impl Unit for DirectoryDigest {
  fn id(&self) -> Uuid {
    DIRECTORY_DIGEST_ID
  }

  fn name(&self) -> &str {
    "Directory Digest"
  }

  fn run(&self, args: &[String]) -> anyhow::Result<()> {
    if args.is_empty() {
      return Err(anyhow::anyhow!("expected at least one path to digest"));
    }
    if let Err(e) = crate::priority::set_low_priority() {
      tracing::debug!(error = %e, "could not lower process priority");
    }

    let roots: Vec<PathBuf> = args.iter().map(PathBuf::from).collect();
    let stdout = std::io::stdout();
    let hashed = digest_paths(&roots, &mut stdout.lock())?;
    tracing::info!(roots = roots.len(), files = hashed, "directory digest complete");
    Ok(())
  }
}

pub fn digest_paths(roots: &[PathBuf], out: &mut dyn Write) -> anyhow::Result<usize> {
  let mut hashed = 0;
  for root in roots {
    if !root.exists() {
      return Err(anyhow::anyhow!("path does not exist: {}", root.display()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
      .follow_links(false)
      .into_iter()
      .flatten()
      .filter(|e| e.file_type().is_file())
      .map(|e| e.into_path())
      .collect();
    files.sort();

    for path in files {
      match sha256_hex(&path) {
        Ok(hash) => {
          writeln!(out, "{hash}  {}", path.display())?;
          hashed += 1;
        }
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file"),
      }
    }
  }
  out.flush()?;
  Ok(hashed)
}

fn sha256_hex(path: &Path) -> anyhow::Result<String> {
  let mut file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
  let mut hasher = Sha256::new();
  let mut buf = [0u8; 64 * 1024];
  loop {
    let n = file.read(&mut buf)?;
    if n == 0 {
      break;
    }
    hasher.update(&buf[..n]);
  }
  Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn digests_files_in_sorted_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("b.txt"), "abc").unwrap();
    fs::write(dir.path().join("sub").join("a.txt"), "").unwrap();

    let mut out = Vec::new();
    let n = digest_paths(&[dir.path().to_path_buf()], &mut out).unwrap();
    assert_eq!(n, 2);

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert!(lines[0].starts_with("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad  "));
    assert!(lines[0].ends_with("b.txt"));
    assert!(lines[1].starts_with("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855  "));
  }

  #[test]
  fn missing_root_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut out = Vec::new();
    assert!(digest_paths(&[dir.path().join("nope")], &mut out).is_err());
  }

  #[test]
  fn no_arguments_is_an_error() {
    assert!(DirectoryDigest.run(&[]).is_err());
  }
}
