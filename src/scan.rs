use anyhow::Result;
use ignore::WalkBuilder;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub rel_path: String,
    pub abs_path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    pub no_ignore: bool,
}

impl ScanOptions {
    pub fn new(no_ignore: bool) -> Self {
        Self { no_ignore }
    }
}

static CSHARP_EXTENSIONS: &[&str] = &["cs"];

/// C# sources under `root`, sorted by relative path.
pub fn scan_sources(root: &Path, options: ScanOptions) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    let mut builder = WalkBuilder::new(root);
    if options.no_ignore {
        builder
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false);
    } else {
        builder
            .ignore(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .parents(true)
            .require_git(false);
    }
    let walker = builder
        .hidden(false)
        .filter_entry(|entry| !is_ignored_entry(entry))
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(value) => value,
            Err(err) => {
                warn!("walk error: {err}");
                continue;
            }
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        if !is_csharp(path) {
            continue;
        }
        let rel_path = crate::util::normalize_rel_path(root, path)?;
        files.push(SourceFile {
            rel_path,
            abs_path: path.to_path_buf(),
        });
    }
    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(files)
}

/// Build output and VCS directories never hold sources worth scanning.
fn is_ignored_entry(entry: &ignore::DirEntry) -> bool {
    let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
    match entry.file_name() {
        name if name == OsStr::new(".git") => true,
        name if is_dir && (name == OsStr::new("bin") || name == OsStr::new("obj")) => true,
        _ => false,
    }
}

fn is_csharp(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CSHARP_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_sources_and_skips_build_output() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Controllers")).unwrap();
        fs::create_dir_all(root.join("obj/Debug")).unwrap();
        fs::create_dir_all(root.join("Generated")).unwrap();
        fs::write(root.join("Controllers/HomeController.cs"), "class A {}").unwrap();
        fs::write(root.join("Program.cs"), "class B {}").unwrap();
        fs::write(root.join("obj/Debug/Gen.cs"), "class C {}").unwrap();
        fs::write(root.join("Generated/Skip.cs"), "class D {}").unwrap();
        fs::write(root.join("notes.md"), "# notes").unwrap();
        fs::write(root.join(".ignore"), "Generated/\n").unwrap();

        let files = scan_sources(root, ScanOptions::default()).unwrap();
        let rel: Vec<_> = files.iter().map(|f| f.rel_path.as_str()).collect();
        assert_eq!(rel, vec!["Controllers/HomeController.cs", "Program.cs"]);

        let files = scan_sources(root, ScanOptions::new(true)).unwrap();
        let rel: Vec<_> = files.iter().map(|f| f.rel_path.as_str()).collect();
        assert_eq!(
            rel,
            vec!["Controllers/HomeController.cs", "Generated/Skip.cs", "Program.cs"]
        );
    }
}
