//! Shared fixtures: an in-process runtime provider and a recording resource editor.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use zip::{ZipWriter, write::SimpleFileOptions};

use kodegen_bundler_launcher::bundler::{
    Bundler, Error, Platform, ResourceEditor, Result, RuntimeProvider, RuntimeRequest,
    SettingsBuilder, Settings, VersionResource,
};

pub const RUNTIME_INFO_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>CFBundleExecutable</key>
	<string>launchui</string>
	<key>CFBundleIconFile</key>
	<string>launchui</string>
	<key>CFBundleName</key>
	<string>launchui</string>
	<key>CFBundlePackageType</key>
	<string>APPL</string>
</dict>
</plist>
"#;

/// Writes a runtime archive laid out like a LaunchUI release for `platform`.
pub fn write_runtime_zip(path: &Path, platform: &Platform) -> Result<()> {
    let mut zip = ZipWriter::new(File::create(path)?);
    let exe = SimpleFileOptions::default().unix_permissions(0o755);
    let data = SimpleFileOptions::default().unix_permissions(0o644);

    match platform {
        Platform::Win32 => {
            zip.start_file("launchui.exe", exe)?;
            zip.write_all(b"MZ fake runtime")?;
            zip.start_file("libui.dll", data)?;
            zip.write_all(b"dll")?;
        }
        Platform::Darwin => {
            zip.add_directory("launchui.app/Contents/Resources/", data)?;
            zip.start_file("launchui.app/Contents/Info.plist", data)?;
            zip.write_all(RUNTIME_INFO_PLIST.as_bytes())?;
            zip.start_file("launchui.app/Contents/MacOS/launchui", exe)?;
            zip.write_all(b"fake mach-o")?;
        }
        _ => {
            zip.start_file("launchui", exe)?;
            zip.write_all(b"#!/bin/sh\necho fake runtime\n")?;
        }
    }

    zip.finish()?;
    Ok(())
}

/// Serves runtime archives built on demand and counts fetches.
pub struct FakeRuntime {
    dir: PathBuf,
    calls: AtomicUsize,
    cancel_on_fetch: Option<CancellationToken>,
}

impl FakeRuntime {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            calls: AtomicUsize::new(0),
            cancel_on_fetch: None,
        }
    }

    /// Cancels `token` while serving the first fetch.
    pub fn cancelling(dir: &Path, token: CancellationToken) -> Self {
        Self {
            cancel_on_fetch: Some(token),
            ..Self::new(dir)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RuntimeProvider for FakeRuntime {
    async fn fetch(&self, request: &RuntimeRequest) -> Result<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let path = self
            .dir
            .join(format!("launchui-{}-{}.zip", request.platform, request.arch));
        if !path.exists() {
            write_runtime_zip(&path, &request.platform)?;
        }
        if let Some(token) = &self.cancel_on_fetch {
            token.cancel();
        }
        Ok(path)
    }
}

/// Provider that is always offline.
pub struct OfflineRuntime;

#[async_trait]
impl RuntimeProvider for OfflineRuntime {
    async fn fetch(&self, _request: &RuntimeRequest) -> Result<PathBuf> {
        Err(Error::Runtime("network unreachable".into()))
    }
}

/// Records every resource edit instead of running rcedit.
#[derive(Default)]
pub struct RecordingEditor {
    edits: Mutex<Vec<(PathBuf, VersionResource)>>,
}

impl RecordingEditor {
    pub fn edits(&self) -> Vec<(PathBuf, VersionResource)> {
        self.edits.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceEditor for RecordingEditor {
    async fn edit(&self, executable: &Path, resource: &VersionResource) -> Result<()> {
        assert!(executable.is_file(), "edited executable must exist");
        self.edits
            .lock()
            .unwrap()
            .push((executable.to_path_buf(), resource.clone()));
        Ok(())
    }
}

/// Temporary workspace with an entry script, an output directory and fakes.
pub struct Fixture {
    pub root: TempDir,
    pub out: PathBuf,
    pub entry: PathBuf,
    pub runtime: Arc<FakeRuntime>,
    pub editor: Arc<RecordingEditor>,
}

impl Fixture {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let out = root.path().join("out");
        let cache = root.path().join("runtime");
        std::fs::create_dir(&out).unwrap();
        std::fs::create_dir(&cache).unwrap();

        let entry = root.path().join("index.js");
        std::fs::write(&entry, "console.log('hello');\n").unwrap();

        Self {
            runtime: Arc::new(FakeRuntime::new(&cache)),
            editor: Arc::new(RecordingEditor::default()),
            root,
            out,
            entry,
        }
    }

    /// Builder for `demo` 1.0.0 on `platform`-x64 into the fixture output.
    pub fn settings(&self, platform: &str) -> SettingsBuilder {
        SettingsBuilder::new()
            .name("demo")
            .version("1.0.0")
            .entry_script(&self.entry)
            .output_dir(&self.out)
            .platform(platform)
            .arch("x64")
    }

    pub fn bundler(&self, settings: Settings) -> Bundler {
        Bundler::new(settings)
            .with_provider(self.runtime.clone())
            .with_editor(self.editor.clone())
    }

    pub fn package_dir(&self, platform: &str) -> PathBuf {
        self.out.join(format!("demo-v1.0.0-{platform}-x64"))
    }

    /// Creates `dir` under the fixture root with the given files.
    pub fn tree(&self, dir: &str, files: &[(&str, &str)]) -> PathBuf {
        let base = self.root.path().join(dir);
        for (name, contents) in files {
            let path = base.join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, contents).unwrap();
        }
        base
    }
}

/// Sorted entry names of a zip archive.
pub fn zip_entries(path: &Path) -> Vec<String> {
    let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(String::from).collect();
    names.sort();
    names
}
