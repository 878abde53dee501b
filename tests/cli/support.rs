use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Temporary working directory with an empty plugin directory inside
pub struct TestContext {
    pub temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::create_dir_all(temp_dir.path().join("plugins"))
            .expect("Failed to create plugins dir");
        TestContext { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn plugins_dir(&self) -> PathBuf {
        self.root().join("plugins")
    }

    /// Write a code-free package whose manifest is `manifest`
    pub fn add_package(&self, file: &str, manifest: &str) -> PathBuf {
        let path = self.plugins_dir().join(file);
        let mut writer =
            zip::ZipWriter::new(std::fs::File::create(&path).expect("Failed to create archive"));
        writer
            .start_file("package.toml", SimpleFileOptions::default())
            .expect("Failed to start entry");
        writer
            .write_all(manifest.as_bytes())
            .expect("Failed to write manifest");
        writer.finish().expect("Failed to finish archive");
        path
    }

    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd =
            assert_cmd::Command::cargo_bin("plugin-host").expect("Failed to find binary");
        cmd.current_dir(self.root())
            .env_remove("PLUGIN_HOST_DIR")
            .env_remove("RUST_LOG")
            .arg("--plugins-dir")
            .arg(self.plugins_dir());
        cmd
    }
}
