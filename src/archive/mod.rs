// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{NopackageError, Result};
use crate::platform::file_ops;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::Archive as TarArchive;
use zip::ZipArchive;

const DEB_DATA_MEMBER: &str = "data.tar";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveType {
    TarGz,
    TarBz2,
    TarXz,
    Zip,
    /// Debian package: an `ar` container holding `data.tar.*`.
    Deb,
}

impl ArchiveType {
    /// Archive type implied by a file name, if any.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveType::TarGz)
        } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
            Some(ArchiveType::TarBz2)
        } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            Some(ArchiveType::TarXz)
        } else if name.ends_with(".zip") {
            Some(ArchiveType::Zip)
        } else if name.ends_with(".deb") {
            Some(ArchiveType::Deb)
        } else {
            None
        }
    }
}

/// Extract an archive to the specified destination.
///
/// For a `.deb` only the `data.tar.*` payload is unpacked, so the
/// destination receives the package's filesystem tree (`usr/`, `opt/`).
pub fn extract_archive(archive_path: &Path, destination: &Path) -> Result<()> {
    fs::create_dir_all(destination)?;

    let archive_type = detect_archive_type(archive_path)?;
    verify_integrity(archive_path, archive_type)?;

    match archive_type {
        ArchiveType::TarGz => {
            let file = File::open(archive_path)?;
            extract_tar(flate2::read::GzDecoder::new(file), destination)
        }
        ArchiveType::TarBz2 => {
            let file = File::open(archive_path)?;
            extract_tar(bzip2::read::BzDecoder::new(file), destination)
        }
        ArchiveType::TarXz => {
            let file = File::open(archive_path)?;
            extract_tar(xz2::read::XzDecoder::new(file), destination)
        }
        ArchiveType::Zip => extract_zip(archive_path, destination),
        ArchiveType::Deb => extract_deb_data(archive_path, destination),
    }
}

pub fn detect_archive_type(path: &Path) -> Result<ArchiveType> {
    // First try by extension
    if let Some(name) = path.file_name().and_then(|n| n.to_str())
        && let Some(archive_type) = ArchiveType::from_file_name(name)
    {
        return Ok(archive_type);
    }

    detect_by_content(path)
}

fn detect_by_content(path: &Path) -> Result<ArchiveType> {
    let mut magic_bytes = Vec::with_capacity(8);
    File::open(path)?.take(8).read_to_end(&mut magic_bytes)?;

    if magic_bytes.len() < 4 {
        return Err(NopackageError::ValidationError(format!(
            "Cannot read file to determine archive type: {path:?}"
        )));
    }

    if magic_bytes.starts_with(&[0x1f, 0x8b]) {
        return Ok(ArchiveType::TarGz);
    }
    if magic_bytes.starts_with(b"BZh") {
        return Ok(ArchiveType::TarBz2);
    }
    if magic_bytes.starts_with(&[0xfd, b'7', b'z', b'X', b'Z', 0x00]) {
        return Ok(ArchiveType::TarXz);
    }
    // ZIP local header, empty archive or spanned marker
    if magic_bytes[0] == 0x50
        && magic_bytes[1] == 0x4b
        && (magic_bytes[2] == 0x03 || magic_bytes[2] == 0x05 || magic_bytes[2] == 0x07)
    {
        return Ok(ArchiveType::Zip);
    }
    if magic_bytes.starts_with(b"!<arch>\n") {
        return Ok(ArchiveType::Deb);
    }

    Err(NopackageError::UnsupportedSource(format!(
        "{} is not a tar.gz, tar.bz2, tar.xz, zip or deb archive",
        path.display()
    )))
}

fn verify_integrity(archive_path: &Path, archive_type: ArchiveType) -> Result<()> {
    match archive_type {
        ArchiveType::TarGz => {
            let file = File::open(archive_path)?;
            verify_tar(flate2::read::GzDecoder::new(file))
        }
        ArchiveType::TarBz2 => {
            let file = File::open(archive_path)?;
            verify_tar(bzip2::read::BzDecoder::new(file))
        }
        ArchiveType::TarXz => {
            let file = File::open(archive_path)?;
            verify_tar(xz2::read::XzDecoder::new(file))
        }
        ArchiveType::Zip => {
            let file = File::open(archive_path)?;
            let archive = ZipArchive::new(file)?;
            if archive.is_empty() {
                return Err(NopackageError::ValidationError(
                    "Zip archive is empty".to_string(),
                ));
            }
            Ok(())
        }
        ArchiveType::Deb => {
            let file = File::open(archive_path)?;
            let mut archive = ar::Archive::new(file);
            while let Some(entry) = archive.next_entry() {
                let entry = entry?;
                if member_name(entry.header().identifier()).starts_with(DEB_DATA_MEMBER) {
                    return Ok(());
                }
            }
            Err(NopackageError::Extract(format!(
                "{} has no {DEB_DATA_MEMBER}.* member",
                archive_path.display()
            )))
        }
    }
}

fn verify_tar<R: Read>(reader: R) -> Result<()> {
    let mut archive = TarArchive::new(reader);
    let mut entries = archive
        .entries()
        .map_err(|e| NopackageError::Extract(format!("Invalid tar stream: {e}")))?;
    if let Some(entry) = entries.next() {
        entry.map_err(|e| NopackageError::Extract(format!("Invalid tar stream: {e}")))?;
    }
    Ok(())
}

fn extract_tar<R: Read>(reader: R, destination: &Path) -> Result<()> {
    let mut archive = TarArchive::new(reader);

    archive.set_preserve_permissions(true);
    archive.set_preserve_mtime(true);
    archive.set_overwrite(true);

    let mut extracted_count = 0;
    let entries = archive.entries()?;

    for entry in entries {
        let mut entry = entry?;
        let path = entry.path()?;

        // Security check: ensure paths don't escape destination
        validate_entry_path(&path)?;
        let path = path.into_owned();

        let entry_type = entry.header().entry_type();
        if entry_type.is_symlink() || entry_type.is_hard_link() {
            // Hard-link targets are relative to the archive root
            let base = if entry_type.is_hard_link() {
                Path::new("")
            } else {
                path.as_path()
            };
            let target = entry.link_name()?.map(|target| target.into_owned());
            if let Some(target) = target
                && link_escapes(base, &target)
            {
                log::warn!(
                    "Skipping link {} -> {} that points outside the archive",
                    path.display(),
                    target.display()
                );
                continue;
            }
        }

        // unpack_in refuses to write through links that leave `destination`
        if !entry.unpack_in(destination)? {
            return Err(NopackageError::SecurityError(format!(
                "Archive entry would extract outside destination: {path:?}"
            )));
        }
        extracted_count += 1;

        if extracted_count % 100 == 0 {
            log::debug!("Extracted {extracted_count} files...");
        }
    }

    log::info!("Extracted {extracted_count} files from tar archive");
    Ok(())
}

fn extract_zip(archive_path: &Path, destination: &Path) -> Result<()> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    let total_files = archive.len();

    for i in 0..total_files {
        let mut file = archive.by_index(i)?;
        let outpath = match file.enclosed_name() {
            Some(path) => {
                validate_entry_path(&path)?;
                destination.join(path)
            }
            None => {
                log::warn!("Skipping file with invalid name at index {i}");
                continue;
            }
        };

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)?;
        }

        if file.is_dir() {
            fs::create_dir_all(&outpath)?;
        } else {
            let mut outfile = File::create(&outpath)?;
            std::io::copy(&mut file, &mut outfile)?;
        }

        if let Some(mode) = file.unix_mode() {
            file_ops::set_permissions_from_mode(&outpath, mode)?;
        }

        if (i + 1) % 100 == 0 {
            log::debug!("Extracted {}/{} files...", i + 1, total_files);
        }
    }

    log::info!("Extracted {total_files} files from zip archive");
    Ok(())
}

/// Unpack the `data.tar.{xz,gz,bz2}` member of a Debian package.
pub fn extract_deb_data(deb_path: &Path, destination: &Path) -> Result<()> {
    let file = File::open(deb_path)?;
    let mut archive = ar::Archive::new(file);

    while let Some(entry) = archive.next_entry() {
        let entry = entry?;
        let name = member_name(entry.header().identifier());
        if !name.starts_with(DEB_DATA_MEMBER) {
            log::debug!("Skipping deb member {name}");
            continue;
        }

        log::debug!("Unpacking deb member {name} from {}", deb_path.display());
        return match name.as_str() {
            "data.tar.xz" => extract_tar(xz2::read::XzDecoder::new(entry), destination),
            "data.tar.gz" => extract_tar(flate2::read::GzDecoder::new(entry), destination),
            "data.tar.bz2" => extract_tar(bzip2::read::BzDecoder::new(entry), destination),
            "data.tar" => extract_tar(entry, destination),
            other => Err(NopackageError::Extract(format!(
                "Unsupported deb payload compression: {other}"
            ))),
        };
    }

    Err(NopackageError::Extract(format!(
        "{} has no {DEB_DATA_MEMBER}.* member",
        deb_path.display()
    )))
}

fn member_name(identifier: &[u8]) -> String {
    String::from_utf8_lossy(identifier)
        .trim_end_matches('/')
        .to_string()
}

/// The single top-level directory of an extracted tree, if that is all
/// the tree contains.
pub fn detect_program_root(extracted_dir: &Path) -> Result<Option<PathBuf>> {
    let mut entries = fs::read_dir(extracted_dir)?.collect::<std::io::Result<Vec<_>>>()?;
    if entries.len() != 1 {
        return Ok(None);
    }
    let only = entries.remove(0).path();
    Ok(only.is_dir().then_some(only))
}

fn validate_entry_path(entry_path: &Path) -> Result<()> {
    for component in entry_path.components() {
        match component {
            std::path::Component::ParentDir => {
                return Err(NopackageError::SecurityError(format!(
                    "Archive contains path traversal: {entry_path:?}"
                )));
            }
            std::path::Component::RootDir => {
                return Err(NopackageError::SecurityError(format!(
                    "Archive contains absolute path: {entry_path:?}"
                )));
            }
            _ => {}
        }
    }

    let normalized = normalize_path(entry_path);
    if normalized.starts_with("..") || normalized.starts_with("/") || normalized.starts_with("\\") {
        return Err(NopackageError::SecurityError(format!(
            "Archive entry would extract outside destination: {entry_path:?}"
        )));
    }

    Ok(())
}

/// Whether `target`, read from the directory holding `entry_path`, resolves
/// outside the extraction root. Absolute targets always do.
fn link_escapes(entry_path: &Path, target: &Path) -> bool {
    let mut depth = entry_path
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter(|c| matches!(c, std::path::Component::Normal(_)))
                .count()
        })
        .unwrap_or(0);

    for component in target.components() {
        match component {
            std::path::Component::Normal(_) => depth += 1,
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => match depth.checked_sub(1) {
                Some(parent) => depth = parent,
                None => return true,
            },
            std::path::Component::RootDir | std::path::Component::Prefix(_) => return true,
        }
    }
    false
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            std::path::Component::Normal(c) => normalized.push(c),
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            std::path::Component::RootDir => normalized.push("/"),
            std::path::Component::Prefix(_) => {}
        }
    }

    normalized
}
