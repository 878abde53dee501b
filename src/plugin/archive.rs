use super::api::{PluginError, PluginResult};
use super::manifest::PackageManifest;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

/// Entry name of the package manifest inside an archive
pub const MANIFEST_ENTRY: &str = "package.toml";

/// An open plugin archive: a zip container of named entries.
pub struct PackageArchive<R> {
    path: PathBuf,
    zip: ZipArchive<R>,
}

impl PackageArchive<File> {
    /// Open the archive at `path`
    pub fn open(path: &Path) -> PluginResult<Self> {
        let file = File::open(path)
            .map_err(|e| PluginError::Archive(format!("Failed to open {:?}: {}", path, e)))?;
        Self::from_reader(file, path)
    }
}

impl<R: Read + Seek> PackageArchive<R> {
    /// Read an archive from any seekable source. `path` is only used to
    /// identify the archive in errors.
    pub fn from_reader(reader: R, path: &Path) -> PluginResult<Self> {
        let zip = ZipArchive::new(reader).map_err(|e| {
            PluginError::Archive(format!("Failed to read {:?} as an archive: {}", path, e))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            zip,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of every entry, in central directory order
    pub fn entry_names(&self) -> Vec<String> {
        self.zip.file_names().map(str::to_string).collect()
    }

    /// Read one entry fully into memory
    pub fn read_entry(&mut self, name: &str) -> PluginResult<Vec<u8>> {
        let mut entry = self.zip.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => {
                PluginError::NotFound(format!("Entry '{}' in {:?}", name, self.path))
            }
            other => PluginError::Archive(format!(
                "Failed to read entry '{}' in {:?}: {}",
                name, self.path, other
            )),
        })?;

        let mut buf = Vec::with_capacity(entry.size().min(1 << 20) as usize);
        entry.read_to_end(&mut buf).map_err(|e| {
            PluginError::Archive(format!(
                "Failed to read entry '{}' in {:?}: {}",
                name, self.path, e
            ))
        })?;
        Ok(buf)
    }

    /// Read and parse the package manifest
    pub fn manifest(&mut self) -> PluginResult<PackageManifest> {
        let bytes = self.read_entry(MANIFEST_ENTRY)?;
        let contents = String::from_utf8(bytes).map_err(|_| {
            PluginError::Invalid(format!("{} in {:?} is not UTF-8", MANIFEST_ENTRY, self.path))
        })?;
        PackageManifest::from_toml_str(&contents)
    }
}
