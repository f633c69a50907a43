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

//! Placing programs under the prefix and undoing it.
//!
//! An install classifies the source name, moves the program into the
//! programs directory when needed, writes a desktop shortcut and records
//! everything in the registry so that `remove` can find it again.

pub mod binary;
pub mod deb;
pub mod staging;

pub use binary::{detect_binary, detect_deb_binary};
pub use deb::{DebProgram, move_icons};
pub use staging::StagingArea;

use crate::archive::{self, ArchiveType};
use crate::config::NopackageConfig;
use crate::error::{NopackageError, Result};
use crate::icons::{Icon, IconResolver};
use crate::naming::package_info::strip_package_extension;
use crate::naming::{ClassifyOptions, Classifier, NamingTables, PackageInfo};
use crate::platform::file_ops;
use crate::registry::{MoveWhat, ProgramRecord, Registry};
use crate::shortcut::{
    BundledShortcut, DesktopEntry, ShortcutInstaller, legacy_shortcut_name, shortcut_caption,
    shortcut_name,
};
use chrono::Utc;
use log::{debug, info, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const APPIMAGE_EXTENSION: &str = ".appimage";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    AppImage,
    Deb,
    Archive(ArchiveType),
    Directory,
    File,
}

impl SourceKind {
    pub fn detect(path: &Path) -> Self {
        Self::from_path(path, path.is_dir())
    }

    /// Kind implied by the name alone, for sources that no longer exist.
    pub fn from_path(path: &Path, is_dir: bool) -> Self {
        if is_dir {
            return SourceKind::Directory;
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.to_lowercase().ends_with(APPIMAGE_EXTENSION) {
            return SourceKind::AppImage;
        }
        match ArchiveType::from_file_name(&name) {
            Some(ArchiveType::Deb) => SourceKind::Deb,
            Some(archive_type) => SourceKind::Archive(archive_type),
            None => SourceKind::File,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, SourceKind::Directory)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InstallRequest {
    /// Path to the program, or the id of an installed one.
    pub source: PathBuf,
    pub caption: Option<String>,
    pub version: Option<String>,
    pub name: Option<String>,
    pub luid: Option<String>,
    /// Move a plain file or directory into the programs directory instead
    /// of installing it in place.
    pub move_files: bool,
    pub multi_version: bool,
    pub dry_run: bool,
    pub reinstall: bool,
}

impl InstallRequest {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }
}

/// What an install did, or would do for a dry run.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub info: PackageInfo,
    pub luid: String,
    pub shortcut_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_dirpath: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sc_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UninstallReport {
    pub luid: String,
    pub removed: Vec<PathBuf>,
}

struct ResolvedSource {
    path: PathBuf,
    kind: SourceKind,
    record: Option<ProgramRecord>,
}

/// Where the program ended up, before the shortcut and registry steps.
#[derive(Default)]
struct Placement {
    binary: PathBuf,
    dst_path: Option<PathBuf>,
    dst_dirpath: Option<PathBuf>,
    move_what: Option<MoveWhat>,
    icon: Option<PathBuf>,
    icon_paths: Vec<PathBuf>,
}

pub struct Installer<'a> {
    config: &'a NopackageConfig,
    tables: NamingTables,
}

impl<'a> Installer<'a> {
    pub fn new(config: &'a NopackageConfig) -> Self {
        Self {
            config,
            tables: config.naming_tables(),
        }
    }

    pub fn reinstall(&self, request: &InstallRequest) -> Result<InstallReport> {
        let request = InstallRequest {
            reinstall: true,
            ..request.clone()
        };
        self.install(&request)
    }

    pub fn install(&self, request: &InstallRequest) -> Result<InstallReport> {
        let mut registry = Registry::load(&self.config.registry_path())?;
        let source = self.resolve_source(&registry, &request.source)?;
        if !source.path.exists() {
            return Err(NopackageError::UnsupportedSource(format!(
                "{} does not exist",
                source.path.display()
            )));
        }
        let options = self.classify_options(request, source.record.as_ref());
        debug!("Installing {} as {:?}", source.path.display(), source.kind);

        let mut detected_binary = None;
        let info = if source.kind.is_dir() {
            let binary = detect_binary(&source.path, &self.tables.hyphenated_names)?;
            let info = self.classify_first_versioned(&source.path, &binary, &options)?;
            detected_binary = Some(binary);
            info
        } else {
            self.classify(&source.path, false, &options)?
        };
        if info.luid.is_empty() {
            return Err(NopackageError::NameParse {
                source_name: source.path.display().to_string(),
                reason: "no program name was found before the version; pass --name or --luid"
                    .to_string(),
            });
        }
        registry.luid_mut().compute(info.luid.as_str())?;

        if request.dry_run {
            return self.preview(&mut registry, request, info, detected_binary);
        }

        let (info, placement) = match source.kind {
            SourceKind::Deb => self.place_deb(&source, request, info)?,
            SourceKind::Archive(_) => {
                let placement = self.place_archive(&source, request, &info)?;
                (info, placement)
            }
            SourceKind::AppImage => {
                let placement = self.place_file(&source, request, &info, true)?;
                (info, placement)
            }
            SourceKind::File => {
                let placement = self.place_file(&source, request, &info, request.move_files)?;
                (info, placement)
            }
            SourceKind::Directory => {
                let binary = match detected_binary {
                    Some(binary) => binary,
                    None => detect_binary(&source.path, &self.tables.hyphenated_names)?,
                };
                let placement = self.place_directory(&source, request, &info, binary)?;
                (info, placement)
            }
        };

        self.finish(&mut registry, request, &source, info, placement)
    }

    pub fn uninstall(&self, request: &InstallRequest) -> Result<UninstallReport> {
        let mut registry = Registry::load(&self.config.registry_path())?;
        let source = self.resolve_source(&registry, &request.source)?;

        let (luid, version, suffix) = match &source.record {
            Some(record) => (
                record.luid.clone(),
                record.version.clone(),
                record.suffix.clone().unwrap_or_default(),
            ),
            None => {
                let options = ClassifyOptions {
                    dry_run: true,
                    ..self.classify_options(request, None)
                };
                let info = self.classify(&source.path, source.kind.is_dir(), &options)?;
                (info.luid, info.version, info.suffix)
            }
        };

        registry.luid_mut().compute(luid.as_str())?;
        let luid = registry.luid_mut().finalize()?.to_string();
        let record = registry
            .program()?
            .cloned()
            .ok_or_else(|| NopackageError::ProgramNotFound(luid.clone()))?;
        if !record.is_installed() {
            info!("{luid} is already marked as uninstalled, removing leftovers");
        }

        let multi_version = request.multi_version || self.config.is_multi_version(&luid);
        let sc_name = shortcut_name(&luid, &suffix, version.as_deref(), multi_version);
        let package = registry.package(&sc_name).cloned();
        let (sc_path, dst_dirpath) = match &package {
            Some(package) => (package.sc_path.clone(), package.dst_dirpath.clone()),
            None => (record.sc_path.clone(), record.dst_dirpath.clone()),
        };

        let mut removed = Vec::new();
        let src_path = record.src_path.as_deref();
        for target in [record.dst_path.as_deref(), dst_dirpath.as_deref()]
            .into_iter()
            .flatten()
        {
            if Some(target) == src_path {
                debug!("{} is the source itself, keeping it", target.display());
                continue;
            }
            if file_ops::remove_path(target)? {
                info!("Removed {}", target.display());
                removed.push(target.to_path_buf());
            }
        }

        for icon in &record.icon_paths {
            if file_ops::remove_path(icon)? {
                debug!("Removed icon {}", icon.display());
                removed.push(icon.clone());
            }
        }

        let shortcuts = self.shortcut_installer()?;
        let mut sc_paths: Vec<PathBuf> = sc_path.into_iter().collect();
        sc_paths.push(shortcuts.shortcut_path(&sc_name));
        if let Some(legacy) = legacy_shortcut_name(&luid, version.as_deref()) {
            sc_paths.push(shortcuts.shortcut_path(&legacy));
        }
        sc_paths.dedup();
        for sc_path in sc_paths {
            if shortcuts.uninstall(&sc_path)? {
                removed.push(sc_path);
            }
        }

        let now = Utc::now();
        {
            let record = registry.program_mut()?;
            record.installed = Some(false);
            record.uninstall_date = Some(now);
        }
        if package.is_some() {
            let package = registry.package_mut(&sc_name);
            package.installed = Some(false);
            package.uninstall_dates.push(now);
        }
        registry.save()?;

        Ok(UninstallReport { luid, removed })
    }

    fn resolve_source(&self, registry: &Registry, source: &Path) -> Result<ResolvedSource> {
        if source.exists() {
            return Ok(ResolvedSource {
                path: source.to_path_buf(),
                kind: SourceKind::detect(source),
                record: None,
            });
        }

        let luid = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let Some(record) = registry.find(&luid).cloned() else {
            return Err(NopackageError::ProgramNotFound(source.display().to_string()));
        };
        debug!("{luid} is a registered program");

        // The recorded source may have been moved into place.
        let path = [&record.src_path, &record.dst_path, &record.dst_dirpath]
            .into_iter()
            .flatten()
            .find(|path| path.exists())
            .or(record.src_path.as_ref())
            .cloned()
            .ok_or_else(|| {
                NopackageError::Registry(format!("The record for {luid} has no source path"))
            })?;
        let is_dir = record.is_dir.unwrap_or_else(|| path.is_dir());
        Ok(ResolvedSource {
            kind: SourceKind::from_path(&path, is_dir),
            path,
            record: Some(record),
        })
    }

    fn classify_options(
        &self,
        request: &InstallRequest,
        record: Option<&ProgramRecord>,
    ) -> ClassifyOptions {
        ClassifyOptions {
            cased_name: request.name.clone(),
            version: request
                .version
                .clone()
                .or_else(|| record.and_then(|r| r.version.clone())),
            luid: request
                .luid
                .clone()
                .or_else(|| record.map(|r| r.luid.clone())),
            caption: request
                .caption
                .clone()
                .or_else(|| record.and_then(|r| r.caption.clone())),
            dry_run: request.dry_run,
        }
    }

    fn classify(&self, path: &Path, is_dir: bool, options: &ClassifyOptions) -> Result<PackageInfo> {
        Classifier::new(&self.tables).classify(&path.to_string_lossy(), is_dir, options)
    }

    /// Classify the directory, then the binary, keeping the first result
    /// that has a version.
    fn classify_first_versioned(
        &self,
        dir: &Path,
        binary: &Path,
        options: &ClassifyOptions,
    ) -> Result<PackageInfo> {
        let lenient = ClassifyOptions {
            dry_run: true,
            ..options.clone()
        };
        let mut first = None;
        for (path, is_dir) in [(dir, true), (binary, false)] {
            match self.classify(path, is_dir, &lenient) {
                Ok(info) if info.version.is_some() => return Ok(info),
                Ok(info) => {
                    first.get_or_insert(info);
                }
                Err(e) => debug!("Could not classify {}: {e}", path.display()),
            }
        }

        match first {
            Some(info) if options.dry_run => Ok(info),
            // Repeat strictly so the error names the directory.
            _ => self.classify(dir, true, options),
        }
    }

    fn preview(
        &self,
        registry: &mut Registry,
        request: &InstallRequest,
        info: PackageInfo,
        binary: Option<PathBuf>,
    ) -> Result<InstallReport> {
        let luid = registry.luid_mut().finalize()?.to_string();
        let multi_version = request.multi_version || self.config.is_multi_version(&luid);
        Ok(InstallReport {
            shortcut_name: shortcut_name(&luid, &info.suffix, info.version.as_deref(), multi_version),
            luid,
            info,
            binary,
            dst_path: None,
            dst_dirpath: None,
            sc_path: None,
            icon: None,
            dry_run: true,
        })
    }

    fn place_file(
        &self,
        source: &ResolvedSource,
        request: &InstallRequest,
        info: &PackageInfo,
        move_file: bool,
    ) -> Result<Placement> {
        if !move_file {
            debug!("Installing {} in place", source.path.display());
            file_ops::make_executable(&source.path)?;
            return Ok(Placement {
                binary: source.path.clone(),
                move_what: None,
                ..Default::default()
            });
        }

        let file_name = source.path.file_name().ok_or_else(|| {
            NopackageError::UnsupportedSource(format!("{} has no file name", source.path.display()))
        })?;
        let dst_path = self.config.programs_dir()?.join(file_name);
        if dst_path != source.path {
            self.put_in_place(&source.path, &dst_path, request.reinstall, &info.luid)?;
        }
        file_ops::make_executable(&dst_path)?;

        Ok(Placement {
            binary: dst_path.clone(),
            dst_path: Some(dst_path),
            move_what: Some(MoveWhat::File),
            ..Default::default()
        })
    }

    fn place_directory(
        &self,
        source: &ResolvedSource,
        request: &InstallRequest,
        info: &PackageInfo,
        binary: PathBuf,
    ) -> Result<Placement> {
        if !request.move_files {
            debug!("Installing {} in place", source.path.display());
            file_ops::make_executable(&binary)?;
            return Ok(Placement {
                binary,
                ..Default::default()
            });
        }

        let dir_name = source.path.file_name().ok_or_else(|| {
            NopackageError::UnsupportedSource(format!("{} has no name", source.path.display()))
        })?;
        let dst_dirpath = self.config.programs_dir()?.join(dir_name);
        let binary = rebase(&binary, &source.path, &dst_dirpath)?;
        if dst_dirpath != source.path {
            self.put_in_place(&source.path, &dst_dirpath, request.reinstall, &info.luid)?;
        }
        file_ops::make_executable(&binary)?;

        Ok(Placement {
            binary,
            dst_dirpath: Some(dst_dirpath),
            move_what: Some(MoveWhat::Directory),
            ..Default::default()
        })
    }

    fn place_archive(
        &self,
        source: &ResolvedSource,
        request: &InstallRequest,
        info: &PackageInfo,
    ) -> Result<Placement> {
        let programs_dir = self.config.programs_dir()?;
        let staging = StagingArea::create(&programs_dir, &info.luid)?;
        let extracted = staging.path().join("extracted");
        info!("Extracting {}", source.path.display());
        archive::extract_archive(&source.path, &extracted)?;

        let file_name = source
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let program_dir = staging.program_dir(&extracted, strip_package_extension(&file_name))?;
        let binary = detect_binary(&program_dir, &self.tables.hyphenated_names)?;

        let dir_name = program_dir.file_name().ok_or_else(|| {
            NopackageError::Extract(format!("{} has no name", program_dir.display()))
        })?;
        let dst_dirpath = programs_dir.join(dir_name);
        let binary = rebase(&binary, &program_dir, &dst_dirpath)?;
        self.put_in_place(&program_dir, &dst_dirpath, request.reinstall, &info.luid)?;
        file_ops::make_executable(&binary)?;

        Ok(Placement {
            binary,
            dst_dirpath: Some(dst_dirpath),
            move_what: Some(MoveWhat::Directory),
            ..Default::default()
        })
    }

    fn place_deb(
        &self,
        source: &ResolvedSource,
        request: &InstallRequest,
        info: PackageInfo,
    ) -> Result<(PackageInfo, Placement)> {
        let prefix = self.config.prefix()?;
        let staging = StagingArea::create(&self.config.programs_dir()?, &info.luid)?;
        let unpacked = staging.path().join("unpacked");
        info!("Unpacking {}", source.path.display());
        archive::extract_deb_data(&source.path, &unpacked)?;

        let program = DebProgram::locate(&unpacked)?;
        let binary = detect_deb_binary(&program.program_dir)?;
        let icon_paths = move_icons(&unpacked, &self.config.pixmaps_dir()?)?;

        // The unpacked directory name has no version, so the identity read
        // from the package file name is carried over.
        let options = ClassifyOptions {
            cased_name: Some(info.cased_name.clone()),
            version: info.version.clone(),
            luid: Some(info.luid.clone()),
            caption: Some(
                request
                    .caption
                    .clone()
                    .unwrap_or_else(|| format!("{} (deb)", program.name())),
            ),
            dry_run: true,
        };
        let mut program_info = self.classify(&program.program_dir, true, &options)?;
        program_info.suffix = info.suffix.clone();
        program_info.arch = program_info.arch.or(info.arch);
        program_info.platform = program_info.platform.or(info.platform);

        let dst_dirpath = prefix
            .join(program.programs_dir_name)
            .join(program.name());
        let binary = rebase(&binary, &program.program_dir, &dst_dirpath)?;
        self.put_in_place(&program.program_dir, &dst_dirpath, true, &program_info.luid)?;
        file_ops::make_executable(&binary)?;

        Ok((
            program_info,
            Placement {
                binary,
                dst_dirpath: Some(dst_dirpath),
                move_what: Some(MoveWhat::Directory),
                icon: icon_paths.last().cloned(),
                icon_paths,
                ..Default::default()
            },
        ))
    }

    /// Move `from` to `to`, replacing `to` only when reinstalling.
    fn put_in_place(&self, from: &Path, to: &Path, reinstall: bool, luid: &str) -> Result<()> {
        if to.symlink_metadata().is_ok() {
            if !reinstall {
                return Err(NopackageError::AlreadyExists(format!(
                    "{luid} is already installed at {}",
                    to.display()
                )));
            }
            info!("Removing previous install {}", to.display());
            file_ops::remove_path(to)?;
        }
        file_ops::move_path(from, to)?;
        info!("Moved {} to {}", from.display(), to.display());
        Ok(())
    }

    fn shortcut_installer(&self) -> Result<ShortcutInstaller> {
        Ok(ShortcutInstaller::new(
            self.config.applications_dir()?,
            self.config.install.use_xdg_desktop_menu,
        ))
    }

    fn finish(
        &self,
        registry: &mut Registry,
        request: &InstallRequest,
        source: &ResolvedSource,
        info: PackageInfo,
        placement: Placement,
    ) -> Result<InstallReport> {
        registry.luid_mut().compute(info.luid.as_str())?;
        let luid = registry.luid_mut().finalize()?.to_string();
        let multi_version = request.multi_version || self.config.is_multi_version(&luid);
        let sc_name = shortcut_name(&luid, &info.suffix, info.version.as_deref(), multi_version);
        let caption = shortcut_caption(&info.caption);

        let bundled = BundledShortcut::find(&placement.binary);
        let icon = match placement
            .icon
            .clone()
            .or_else(|| bundled.as_ref().and_then(|b| b.icon.clone()))
        {
            Some(path) => Icon::File(path),
            None => IconResolver::from_config(self.config, self.config.pixmaps_dir()?).resolve(&luid),
        };
        let exec = placement.binary.display().to_string();
        let contents = match &bundled {
            Some(bundled) => bundled.render(&caption, &exec, &icon.desktop_value())?,
            None => None,
        };
        let contents = match contents {
            Some(contents) => {
                debug!("Using the desktop file bundled with {luid}");
                contents
            }
            None => DesktopEntry::new(caption.as_str(), exec.as_str(), icon.desktop_value())
                .with_metadata_for(&luid)
                .render(),
        };

        let shortcuts = self.shortcut_installer()?;
        if let Some(legacy) = legacy_shortcut_name(&luid, info.version.as_deref())
            && legacy != sc_name
        {
            let legacy_path = shortcuts.shortcut_path(&legacy);
            if legacy_path.exists() {
                warn!("Replacing old shortcut {}", legacy_path.display());
                shortcuts.uninstall(&legacy_path)?;
            }
        }
        let sc_path = shortcuts.install(&sc_name, &contents)?;

        // Reinstalling from the installed copy keeps the original source.
        let src_path = match &source.record {
            Some(previous)
                if previous.dst_path.as_ref() == Some(&source.path)
                    || previous.dst_dirpath.as_ref() == Some(&source.path) =>
            {
                previous.src_path.clone()
            }
            _ => Some(absolute(&source.path)),
        };

        let now = Utc::now();
        {
            let record = registry.program_mut()?;
            record.caption = Some(caption.clone());
            record.version = info.version.clone();
            record.suffix = Some(info.suffix.clone()).filter(|s| !s.is_empty());
            record.src_path = src_path;
            record.dst_path = placement.dst_path.clone();
            record.dst_dirpath = placement.dst_dirpath.clone();
            record.sc_path = Some(sc_path.clone());
            record.is_dir = Some(source.kind.is_dir());
            record.move_what = placement.move_what;
            record.installed = Some(true);
            record.install_date = Some(now);
            record.uninstall_date = None;
            record.icon_paths = placement.icon_paths.clone();
            record.arch = info.arch;
            record.platform = info.platform;
        }
        if multi_version {
            let package = registry.package_mut(&sc_name);
            package.luid = Some(luid.clone());
            package.caption = Some(caption.clone());
            package.sc_path = Some(sc_path.clone());
            package.dst_dirpath = placement.dst_dirpath.clone();
            package.installed = Some(true);
            package.install_dates.push(now);
            package.move_what = placement.move_what;
        }
        registry.save()?;
        info!("Installed {luid} ({caption})");

        Ok(InstallReport {
            info,
            luid,
            shortcut_name: sc_name,
            binary: Some(placement.binary),
            dst_path: placement.dst_path,
            dst_dirpath: placement.dst_dirpath,
            sc_path: Some(sc_path),
            icon: Some(icon.desktop_value()),
            dry_run: false,
        })
    }
}

/// `path` moved from under `from` to under `to`.
fn rebase(path: &Path, from: &Path, to: &Path) -> Result<PathBuf> {
    let relative = path.strip_prefix(from).map_err(|_| {
        NopackageError::ValidationError(format!(
            "{} is not inside {}",
            path.display(),
            from.display()
        ))
    })?;
    Ok(to.join(relative))
}

fn absolute(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
