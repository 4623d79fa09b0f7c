mod common;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kodegen_bundler_launcher::bundler::{BundleSettings, Bundler, Error};
    use plist::Value;
    use tokio_util::sync::CancellationToken;

    use crate::common::{FakeRuntime, Fixture, OfflineRuntime, zip_entries};

    fn plist_string(dict: &plist::Dictionary, key: &str) -> Option<String> {
        dict.get(key).and_then(Value::as_string).map(String::from)
    }

    #[tokio::test]
    async fn test_linux_package_layout() {
        let fx = Fixture::new();
        let settings = fx.settings("linux").build().unwrap();

        let path = fx.bundler(settings).bundle().await.unwrap();

        let dir = fx.package_dir("linux");
        assert_eq!(path, dir);
        assert!(dir.join("demo").is_file());
        assert!(!dir.join("launchui").exists());
        assert_eq!(
            std::fs::read_to_string(dir.join("app/main.js")).unwrap(),
            "console.log('hello');\n"
        );
        assert!(!fx.out.join("demo-v1.0.0-linux-x64.incomplete").exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(dir.join("demo")).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[tokio::test]
    async fn test_second_run_reuses_directory() {
        let fx = Fixture::new();

        let first = fx.bundler(fx.settings("linux").build().unwrap()).bundle().await.unwrap();
        std::fs::write(first.join("sentinel"), b"keep").unwrap();
        let second = fx.bundler(fx.settings("linux").build().unwrap()).bundle().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(fx.runtime.calls(), 1);
        assert!(second.join("sentinel").exists());
    }

    #[tokio::test]
    async fn test_overwrite_rebuilds_from_scratch() {
        let fx = Fixture::new();
        let dir = fx.bundler(fx.settings("linux").build().unwrap()).bundle().await.unwrap();
        std::fs::write(dir.join("sentinel"), b"stale").unwrap();

        let settings = fx.settings("linux").overwrite(true).build().unwrap();
        let rebuilt = fx.bundler(settings).bundle().await.unwrap();

        assert_eq!(rebuilt, dir);
        assert!(!dir.join("sentinel").exists());
        assert!(dir.join("app/main.js").is_file());
        assert_eq!(fx.runtime.calls(), 2);
    }

    #[tokio::test]
    async fn test_existing_archive_short_circuits() {
        let fx = Fixture::new();
        let archive = fx.out.join("demo-v1.0.0-linux-x64.zip");
        std::fs::write(&archive, b"previous archive").unwrap();

        let settings = fx.settings("linux").pack("zip").build().unwrap();
        let path = fx.bundler(settings).bundle().await.unwrap();

        assert_eq!(path, archive);
        assert_eq!(std::fs::read(&archive).unwrap(), b"previous archive");
        assert!(!fx.package_dir("linux").exists());
        assert_eq!(fx.runtime.calls(), 0);
    }

    #[tokio::test]
    async fn test_existing_directory_is_packed_without_rebuild() {
        let fx = Fixture::new();
        fx.bundler(fx.settings("linux").build().unwrap()).bundle().await.unwrap();

        let settings = fx.settings("linux").pack("zip").build().unwrap();
        let path = fx.bundler(settings).bundle().await.unwrap();

        assert_eq!(path, fx.out.join("demo-v1.0.0-linux-x64.zip"));
        assert_eq!(fx.runtime.calls(), 1);
        assert_eq!(zip_entries(&path), ["app/main.js", "demo"]);
    }

    #[tokio::test]
    async fn test_full_build_with_pack() {
        let fx = Fixture::new();
        let settings = fx.settings("linux").pack("zip").build().unwrap();

        let path = fx.bundler(settings).bundle().await.unwrap();

        assert_eq!(path, fx.out.join("demo-v1.0.0-linux-x64.zip"));
        assert!(fx.package_dir("linux").is_dir());
        assert!(zip_entries(&path).contains(&"app/main.js".to_string()));
        assert!(!fx.out.join("demo-v1.0.0-linux-x64.zip.partial").exists());
    }

    #[tokio::test]
    async fn test_incomplete_directory_is_rebuilt() {
        let fx = Fixture::new();
        let dir = fx.package_dir("linux");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("half-written"), b"").unwrap();
        std::fs::write(fx.out.join("demo-v1.0.0-linux-x64.incomplete"), b"").unwrap();

        let path = fx.bundler(fx.settings("linux").build().unwrap()).bundle().await.unwrap();

        assert_eq!(path, dir);
        assert_eq!(fx.runtime.calls(), 1);
        assert!(!dir.join("half-written").exists());
        assert!(dir.join("demo").is_file());
        assert!(!fx.out.join("demo-v1.0.0-linux-x64.incomplete").exists());
    }

    #[tokio::test]
    async fn test_failed_payload_leaves_directory_marked_incomplete() {
        let fx = Fixture::new();
        let settings = fx
            .settings("linux")
            .entry_script(fx.root.path().join("missing.js"))
            .build()
            .unwrap();

        assert!(fx.bundler(settings).bundle().await.is_err());
        assert!(fx.package_dir("linux").is_dir());
        assert!(fx.out.join("demo-v1.0.0-linux-x64.incomplete").exists());

        // The next run must not reuse the broken directory.
        fx.bundler(fx.settings("linux").build().unwrap()).bundle().await.unwrap();
        assert_eq!(fx.runtime.calls(), 2);
        assert!(fx.package_dir("linux").join("app/main.js").is_file());
    }

    #[tokio::test]
    async fn test_win32_package() {
        let fx = Fixture::new();
        let license = fx.tree("legal", &[("LICENSE.txt", "MIT")]).join("LICENSE.txt");
        let settings = fx
            .settings("win32")
            .bundle_settings(BundleSettings {
                company: Some("Acme".into()),
                license: Some(license),
                ..Default::default()
            })
            .build()
            .unwrap();

        let path = fx.bundler(settings).bundle().await.unwrap();

        assert!(path.join("demo.exe").is_file());
        assert!(!path.join("launchui.exe").exists());
        assert!(path.join("libui.dll").is_file());
        assert!(path.join("app/main.js").is_file());
        assert_eq!(std::fs::read_to_string(path.join("LICENSE")).unwrap(), "MIT");

        let edits = fx.editor.edits();
        assert_eq!(edits.len(), 1);
        let (exe, resource) = &edits[0];
        assert_eq!(exe, &path.join("demo.exe"));
        assert_eq!(resource.file_version, "1.0.0");
        assert_eq!(resource.product_version, "1.0.0");
        assert_eq!(resource.version_strings["ProductName"], "demo");
        assert_eq!(resource.version_strings["CompanyName"], "Acme");
        assert!(!resource.version_strings.contains_key("LegalCopyright"));
    }

    #[tokio::test]
    async fn test_darwin_bundle() {
        let fx = Fixture::new();
        let icon = fx.tree("assets", &[("demo.icns", "icns data")]).join("demo.icns");
        let settings = fx
            .settings("darwin")
            .bundle_settings(BundleSettings {
                copyright: Some("(c) Demo".into()),
                icon: Some(icon),
                ..Default::default()
            })
            .build()
            .unwrap();

        let path = fx.bundler(settings).bundle().await.unwrap();

        let contents = path.join("demo.app/Contents");
        assert!(!path.join("launchui.app").exists());
        assert!(contents.join("MacOS/demo").is_file());
        assert!(!contents.join("MacOS/launchui").exists());
        assert!(contents.join("Resources/app/main.js").is_file());
        assert_eq!(
            std::fs::read_to_string(contents.join("Resources/launchui.icns")).unwrap(),
            "icns data"
        );

        let dict = Value::from_file(contents.join("Info.plist"))
            .unwrap()
            .into_dictionary()
            .unwrap();
        assert_eq!(plist_string(&dict, "CFBundleName").as_deref(), Some("demo"));
        assert_eq!(plist_string(&dict, "CFBundleExecutable").as_deref(), Some("demo"));
        assert_eq!(plist_string(&dict, "CFBundleVersion").as_deref(), Some("1.0.0"));
        assert_eq!(
            plist_string(&dict, "CFBundleShortVersionString").as_deref(),
            Some("1.0.0")
        );
        assert!(plist_string(&dict, "CFBundleIdentifier").unwrap().contains("demo"));
        assert_eq!(
            plist_string(&dict, "NSHumanReadableCopyright").as_deref(),
            Some("(c) Demo")
        );
        assert!(dict.get("LSApplicationCategoryType").is_none());
        assert!(fx.editor.edits().is_empty());
    }

    #[tokio::test]
    async fn test_darwin_bundle_without_icon() {
        let fx = Fixture::new();
        let settings = fx
            .settings("darwin")
            .bundle_settings(BundleSettings {
                category: Some("public.app-category.games".into()),
                ..Default::default()
            })
            .build()
            .unwrap();

        let path = fx.bundler(settings).bundle().await.unwrap();

        let contents = path.join("demo.app/Contents");
        assert!(contents.join("MacOS/demo").is_file());
        let icons: Vec<_> = std::fs::read_dir(contents.join("Resources"))
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "icns"))
            .collect();
        assert!(icons.is_empty(), "unexpected icons: {icons:?}");

        let dict = Value::from_file(contents.join("Info.plist"))
            .unwrap()
            .into_dictionary()
            .unwrap();
        assert_eq!(
            plist_string(&dict, "LSApplicationCategoryType").as_deref(),
            Some("public.app-category.games")
        );
        assert_eq!(plist_string(&dict, "CFBundleIconFile").as_deref(), Some("launchui"));
        assert!(dict.get("NSHumanReadableCopyright").is_none());
    }

    #[tokio::test]
    async fn test_resources_are_copied_with_default_pattern() {
        let fx = Fixture::new();
        let resources = fx.tree("res", &[("a.txt", "a"), ("sub/b.txt", "b")]);
        let settings = fx
            .settings("linux")
            .bundle_settings(BundleSettings {
                resource_dir: Some(resources),
                ..Default::default()
            })
            .build()
            .unwrap();

        let path = fx.bundler(settings).bundle().await.unwrap();

        assert_eq!(std::fs::read_to_string(path.join("app/a.txt")).unwrap(), "a");
        assert_eq!(std::fs::read_to_string(path.join("app/sub/b.txt")).unwrap(), "b");
    }

    #[tokio::test]
    async fn test_relative_resource_dir() {
        let fx = Fixture::new();
        let assets = tempfile::Builder::new().tempdir_in(".").unwrap();
        std::fs::create_dir(assets.path().join("css")).unwrap();
        std::fs::write(assets.path().join("css/site.css"), "body {}").unwrap();
        let relative = format!("./{}/", assets.path().file_name().unwrap().to_string_lossy());

        let settings = fx
            .settings("linux")
            .bundle_settings(BundleSettings {
                resource_dir: Some(relative.into()),
                ..Default::default()
            })
            .build()
            .unwrap();
        let path = fx.bundler(settings).bundle().await.unwrap();

        assert_eq!(
            std::fs::read_to_string(path.join("app/css/site.css")).unwrap(),
            "body {}"
        );
    }

    #[tokio::test]
    async fn test_resource_patterns_select_files() {
        let fx = Fixture::new();
        let resources = fx.tree(
            "res",
            &[("a.txt", "a"), ("sub/b.txt", "b"), ("img/logo.png", "png")],
        );
        let settings = fx
            .settings("linux")
            .bundle_settings(BundleSettings {
                resource_dir: Some(resources),
                resource_patterns: vec!["*.txt".into(), "img/**".into(), "*.none".into()],
                ..Default::default()
            })
            .build()
            .unwrap();

        let path = fx.bundler(settings).bundle().await.unwrap();

        assert!(path.join("app/a.txt").is_file());
        assert!(path.join("app/img/logo.png").is_file());
        assert!(!path.join("app/sub/b.txt").exists());
    }

    #[tokio::test]
    async fn test_provider_failure_is_surfaced() {
        let fx = Fixture::new();
        let bundler = Bundler::new(fx.settings("linux").build().unwrap())
            .with_provider(Arc::new(OfflineRuntime));

        let err = bundler.bundle().await.unwrap_err();

        assert!(matches!(err, Error::Runtime(_)));
        assert!(!fx.package_dir("linux").exists());
        assert!(!fx.out.join("demo-v1.0.0-linux-x64.incomplete").exists());
    }

    #[tokio::test]
    async fn test_cancellation_removes_partial_output() {
        let fx = Fixture::new();
        let token = CancellationToken::new();
        let runtime = Arc::new(FakeRuntime::cancelling(
            &fx.root.path().join("runtime"),
            token.clone(),
        ));
        let bundler = Bundler::new(fx.settings("linux").build().unwrap()).with_provider(runtime);

        let err = bundler.bundle_with_cancel(&token).await.unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert!(!fx.package_dir("linux").exists());
        assert!(!fx.out.join("demo-v1.0.0-linux-x64.incomplete").exists());
    }

    #[tokio::test]
    async fn test_unknown_platform_uses_plain_layout() {
        let fx = Fixture::new();
        let settings = fx.settings("freebsd").build().unwrap();

        let path = fx.bundler(settings).bundle().await.unwrap();

        assert_eq!(path, fx.package_dir("freebsd"));
        assert!(path.join("demo").is_file());
        assert!(path.join("app/main.js").is_file());
    }
}
