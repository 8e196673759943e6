//! Discovery of installed applications.
//!
//! Walks a list of roots looking for `.app` bundles. Hidden entries are
//! skipped and bundles are never descended into. Roots that do not exist are
//! ignored; anything else that goes wrong is collected into the report rather
//! than aborting the scan.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::AppMenuError;
use crate::item::default_app_name;
use crate::tree::normalize_location;

/// The places macOS keeps applications
pub fn default_roots() -> Vec<PathBuf> {
    [
        "/Applications",
        "/Applications/Utilities",
        "/System/Applications",
        "/System/Applications/Utilities",
        "/System/Library/CoreServices",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

/// One discovered application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppCandidate {
    pub name: String,
    pub location: PathBuf,
}

impl AppCandidate {
    /// Case-insensitive substring match on the name or the bundle file name
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        let file_name = self
            .location
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        self.name.to_lowercase().contains(&query) || file_name.contains(&query)
    }
}

#[derive(Debug, Default)]
pub struct ScanReport {
    /// Deduplicated by normalized location, sorted case-insensitively by name
    pub apps: Vec<AppCandidate>,
    pub errors: Vec<AppMenuError>,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

pub fn scan_applications(roots: &[PathBuf]) -> ScanReport {
    let mut found: HashMap<PathBuf, AppCandidate> = HashMap::new();
    let mut errors = Vec::new();

    for root in roots {
        if !root.is_dir() {
            debug!("Skipping unreachable scan root {}", root.display());
            continue;
        }
        scan_root(root, &mut found, &mut errors);
    }

    let mut apps: Vec<AppCandidate> = found.into_values().collect();
    apps.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.location.cmp(&b.location))
    });

    debug!("Scan found {} application(s), {} error(s)", apps.len(), errors.len());
    ScanReport { apps, errors }
}

fn scan_root(
    root: &Path,
    found: &mut HashMap<PathBuf, AppCandidate>,
    errors: &mut Vec<AppMenuError>,
) {
    let mut walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    while let Some(next) = walker.next() {
        let entry = match next {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                warn!("Scan error under {}: {}", path.display(), e);
                errors.push(AppMenuError::scan(path, e.to_string()));
                continue;
            }
        };

        if entry.depth() == 0 || !is_app_bundle(entry.path()) {
            continue;
        }
        if entry.file_type().is_dir() {
            walker.skip_current_dir();
        }
        if entry.path().to_str().is_none() {
            warn!("Skipping application with a non UTF-8 path: {}", entry.path().display());
            errors.push(AppMenuError::scan(entry.path(), "path is not valid UTF-8"));
            continue;
        }

        let location = normalize_location(entry.path());
        found.entry(location.clone()).or_insert_with(|| AppCandidate {
            name: display_name(&location),
            location,
        });
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn is_app_bundle(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("app"))
        .unwrap_or(false)
}

static DISPLAY_NAME_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<key>CFBundleDisplayName</key>\s*<string>([^<]+)</string>")
        .expect("valid display name regex")
});

static BUNDLE_NAME_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<key>CFBundleName</key>\s*<string>([^<]+)</string>")
        .expect("valid bundle name regex")
});

/// Bundle display name, then bundle name, then the file stem
///
/// Only XML property lists are understood; binary ones fall through to the
/// file stem.
pub fn display_name(location: &Path) -> String {
    bundle_name(location).unwrap_or_else(|| default_app_name(location))
}

fn bundle_name(location: &Path) -> Option<String> {
    let plist = fs::read_to_string(location.join("Contents").join("Info.plist")).ok()?;
    [&*DISPLAY_NAME_KEY, &*BUNDLE_NAME_KEY]
        .into_iter()
        .filter_map(|re| re.captures(&plist))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .find(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_bundle(root: &Path, rel: &str, plist: Option<&str>) -> PathBuf {
        let bundle = root.join(rel);
        fs::create_dir_all(bundle.join("Contents")).unwrap();
        if let Some(plist) = plist {
            fs::write(bundle.join("Contents").join("Info.plist"), plist).unwrap();
        }
        bundle
    }

    fn plist(display: Option<&str>, name: Option<&str>) -> String {
        let mut body = String::from("<?xml version=\"1.0\"?>\n<plist version=\"1.0\"><dict>\n");
        if let Some(display) = display {
            body.push_str(&format!(
                "<key>CFBundleDisplayName</key>\n\t<string>{}</string>\n",
                display
            ));
        }
        if let Some(name) = name {
            body.push_str(&format!("<key>CFBundleName</key>\n\t<string>{}</string>\n", name));
        }
        body.push_str("</dict></plist>\n");
        body
    }

    #[test]
    fn test_display_name_prefers_display_then_bundle_then_stem() {
        let dir = tempdir().unwrap();
        let both = make_bundle(
            dir.path(),
            "a.app",
            Some(&plist(Some("Alpha"), Some("alpha"))),
        );
        let only_name = make_bundle(dir.path(), "b.app", Some(&plist(None, Some("Beta"))));
        let bare = make_bundle(dir.path(), "Gamma.app", None);

        assert_eq!(display_name(&both), "Alpha");
        assert_eq!(display_name(&only_name), "Beta");
        assert_eq!(display_name(&bare), "Gamma");
    }

    #[test]
    fn test_scan_finds_sorted_apps_and_skips_bundle_contents() {
        let dir = tempdir().unwrap();
        make_bundle(dir.path(), "zeta.app", None);
        make_bundle(dir.path(), "Alpha.app", None);
        make_bundle(dir.path(), "Utilities/beta.app", None);
        // Nested helper inside a bundle must not be reported
        make_bundle(dir.path(), "Alpha.app/Contents/Helpers/Helper.app", None);
        make_bundle(dir.path(), ".hidden/Secret.app", None);
        fs::write(dir.path().join("notes.txt"), b"not an app").unwrap();

        let report = scan_applications(&[dir.path().to_path_buf()]);
        let names: Vec<_> = report.apps.iter().map(|app| app.name.as_str()).collect();

        assert_eq!(names, vec!["Alpha", "beta", "zeta"]);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_overlapping_roots_are_deduplicated() {
        let dir = tempdir().unwrap();
        make_bundle(dir.path(), "Utilities/Console.app", None);
        let roots = vec![
            dir.path().to_path_buf(),
            dir.path().join("Utilities"),
            dir.path().join("Utilities/../Utilities"),
        ];

        let report = scan_applications(&roots);
        assert_eq!(report.apps.len(), 1);
        assert_eq!(report.apps[0].name, "Console");
    }

    #[test]
    fn test_candidate_matches_name_or_file_name() {
        let code = AppCandidate {
            name: "Code".into(),
            location: "/Applications/Visual Studio Code.app".into(),
        };
        assert!(code.matches("CODE"));
        assert!(code.matches("visual"));
        assert!(code.matches(".app"));
        assert!(!code.matches("xcode"));
    }

    #[test]
    fn test_missing_roots_yield_empty_report() {
        let dir = tempdir().unwrap();
        let report = scan_applications(&[dir.path().join("does-not-exist")]);
        assert!(report.is_empty());
        assert!(report.errors.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_bundles_are_reported_not_returned() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        make_bundle(dir.path(), "Good.app", None);
        let bad = dir.path().join(OsStr::from_bytes(b"Bad\xff.app"));
        fs::create_dir_all(bad.join("Contents")).unwrap();

        let report = scan_applications(&[dir.path().to_path_buf()]);
        let names: Vec<_> = report.apps.iter().map(|app| app.name.as_str()).collect();
        assert_eq!(names, vec!["Good"]);
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(&report.errors[0], AppMenuError::Scan { path, .. } if *path == bad));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_is_collected_as_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        make_bundle(dir.path(), "Open.app", None);
        let locked = dir.path().join("Locked");
        make_bundle(&locked, "Hidden.app", None);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not apply to root
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let report = scan_applications(&[dir.path().to_path_buf()]);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let names: Vec<_> = report.apps.iter().map(|app| app.name.as_str()).collect();
        assert_eq!(names, vec!["Open"]);
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(&report.errors[0], AppMenuError::Scan { path, .. } if *path == locked));
    }
}
