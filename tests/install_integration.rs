use nopackage::config::NopackageConfig;
use nopackage::error::NopackageError;
use nopackage::install::{InstallRequest, Installer};
use nopackage::registry::{MoveWhat, Registry};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct InstallTestSetup {
    temp_dir: TempDir,
    config: NopackageConfig,
}

impl InstallTestSetup {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut config = NopackageConfig::new(temp_dir.path().join("home"))
            .expect("Failed to create config");
        config.install.prefix = Some(temp_dir.path().join("prefix"));
        config.install.use_xdg_desktop_menu = false;
        Self { temp_dir, config }
    }

    fn downloads(&self) -> PathBuf {
        let dir = self.temp_dir.path().join("Downloads");
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn installer(&self) -> Installer<'_> {
        Installer::new(&self.config)
    }

    fn registry(&self) -> Registry {
        Registry::load(&self.config.registry_path()).unwrap()
    }

    fn shortcut(&self, name: &str) -> PathBuf {
        self.config.applications_dir().unwrap().join(name)
    }
}

fn tar_bytes(files: &[(&str, &[u8], u32)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, data, mode) in files {
        let mut header = tar::Header::new_gnu();
        header.set_path(path).unwrap();
        header.set_size(data.len() as u64);
        header.set_mode(*mode);
        header.set_cksum();
        builder.append(&header, *data).unwrap();
    }
    builder.into_inner().unwrap()
}

fn write_tar_gz(path: &Path, files: &[(&str, &[u8], u32)]) {
    let mut gz = flate2::write::GzEncoder::new(
        File::create(path).unwrap(),
        flate2::Compression::default(),
    );
    gz.write_all(&tar_bytes(files)).unwrap();
    gz.finish().unwrap();
}

fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let options: zip::write::FileOptions<'_, ()> = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Stored)
        .unix_permissions(0o644);
    for (name, data) in files {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

fn write_deb(path: &Path, files: &[(&str, &[u8], u32)]) {
    let mut xz = xz2::write::XzEncoder::new(Vec::new(), 6);
    xz.write_all(&tar_bytes(files)).unwrap();
    let data = xz.finish().unwrap();

    let mut builder = ar::Builder::new(File::create(path).unwrap());
    builder
        .append(&ar::Header::new(b"debian-binary".to_vec(), 4), &b"2.0\n"[..])
        .unwrap();
    builder
        .append(
            &ar::Header::new(b"data.tar.xz".to_vec(), data.len() as u64),
            data.as_slice(),
        )
        .unwrap();
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).unwrap().permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}

#[test]
fn test_appimage_install_reinstall_by_id_and_remove() {
    let setup = InstallTestSetup::new();
    let appimage = setup.downloads().join("Ultimaker_Cura-4.8.0.AppImage");
    fs::write(&appimage, "ELF").unwrap();

    let report = setup
        .installer()
        .install(&InstallRequest::new(&appimage))
        .unwrap();
    let dst = setup
        .config
        .programs_dir()
        .unwrap()
        .join("Ultimaker_Cura-4.8.0.AppImage");
    assert_eq!(report.luid, "ultimaker.cura");
    assert_eq!(report.shortcut_name, "ultimaker.cura-AppImage.desktop");
    assert!(dst.is_file());
    assert!(is_executable(&dst));

    let shortcut = fs::read_to_string(setup.shortcut("ultimaker.cura-AppImage.desktop")).unwrap();
    assert!(shortcut.starts_with("[Desktop Entry]\n"));
    assert!(shortcut.contains("Name=Ultimaker Cura 4.8.0 (AppImage)\n"));
    assert!(shortcut.contains("Terminal=false\n"));

    // The source was moved, so the recorded destination is reused.
    let report = setup
        .installer()
        .reinstall(&InstallRequest::new("ultimaker.cura"))
        .unwrap();
    assert_eq!(report.dst_path.as_deref(), Some(dst.as_path()));
    assert_eq!(report.info.caption, "Ultimaker Cura 4.8.0 (AppImage)");
    assert!(dst.is_file());

    setup
        .installer()
        .uninstall(&InstallRequest::new("ultimaker.cura"))
        .unwrap();
    assert!(!dst.exists());
    assert!(!setup.shortcut("ultimaker.cura-AppImage.desktop").exists());
    assert!(!setup.registry().find("ultimaker.cura").unwrap().is_installed());
}

#[test]
fn test_tar_gz_with_single_root_is_multi_version() {
    let setup = InstallTestSetup::new();
    let archive = setup.downloads().join("blender-2.79b-linux-x86_64.tar.gz");
    write_tar_gz(
        &archive,
        &[
            ("blender-2.79b-linux-x86_64/blender", &b"elf"[..], 0o644),
            ("blender-2.79b-linux-x86_64/readme.html", &b"<html>"[..], 0o644),
        ],
    );

    let report = setup
        .installer()
        .install(&InstallRequest::new(&archive))
        .unwrap();
    let dst_dir = setup
        .config
        .programs_dir()
        .unwrap()
        .join("blender-2.79b-linux-x86_64");
    assert_eq!(report.luid, "blender");
    assert_eq!(report.info.version.as_deref(), Some("2.79b"));
    assert_eq!(report.shortcut_name, "blender-2.79b.desktop");
    assert_eq!(report.dst_dirpath.as_deref(), Some(dst_dir.as_path()));
    assert!(is_executable(&dst_dir.join("blender")));
    assert!(archive.is_file());

    let registry = setup.registry();
    let package = registry.package("blender-2.79b.desktop").unwrap();
    assert_eq!(package.luid.as_deref(), Some("blender"));
    assert_eq!(package.move_what, Some(MoveWhat::Directory));
    assert_eq!(package.install_dates.len(), 1);

    assert!(matches!(
        setup.installer().install(&InstallRequest::new(&archive)),
        Err(NopackageError::AlreadyExists(_))
    ));

    setup
        .installer()
        .uninstall(&InstallRequest::new("blender"))
        .unwrap();
    assert!(!dst_dir.exists());
    assert!(!setup.shortcut("blender-2.79b.desktop").exists());
    let registry = setup.registry();
    assert_eq!(
        registry.package("blender-2.79b.desktop").unwrap().installed,
        Some(false)
    );
}

#[test]
fn test_zip_with_loose_entries_is_wrapped() {
    let setup = InstallTestSetup::new();
    let archive = setup.downloads().join("hexchat-2.14.3.zip");
    write_zip(
        &archive,
        &[("hexchat.sh", b"#!/bin/sh\n"), ("lib/libhexchat.so", b"so")],
    );

    let report = setup
        .installer()
        .install(&InstallRequest::new(&archive))
        .unwrap();
    let dst_dir = setup.config.programs_dir().unwrap().join("hexchat-2.14.3");
    assert_eq!(report.binary.as_deref(), Some(dst_dir.join("hexchat.sh").as_path()));
    assert!(dst_dir.join("lib/libhexchat.so").is_file());
    assert!(is_executable(&dst_dir.join("hexchat.sh")));
    assert!(setup.shortcut("hexchat.desktop").is_file());

    // Staging leftovers are cleaned up.
    let staging = setup.config.programs_dir().unwrap().join(".tmp");
    assert_eq!(fs::read_dir(staging).unwrap().count(), 0);
}

#[test]
fn test_directory_move_and_in_place() {
    let setup = InstallTestSetup::new();
    let dir = setup.downloads().join("pycharm-community-2021.1");
    fs::create_dir_all(dir.join("bin")).unwrap();
    fs::write(dir.join("bin/pycharm.sh"), "#!/bin/sh\n").unwrap();

    let request = InstallRequest {
        move_files: true,
        ..InstallRequest::new(&dir)
    };
    let report = setup.installer().install(&request).unwrap();
    let dst_dir = setup
        .config
        .programs_dir()
        .unwrap()
        .join("pycharm-community-2021.1");
    assert_eq!(report.info.version.as_deref(), Some("2021.1"));
    assert_eq!(
        report.binary.as_deref(),
        Some(dst_dir.join("bin/pycharm.sh").as_path())
    );
    assert!(!dir.exists());
    assert!(dst_dir.join("bin/pycharm.sh").is_file());

    let record = setup.registry().find(&report.luid).cloned().unwrap();
    assert_eq!(record.is_dir, Some(true));
    assert_eq!(record.move_what, Some(MoveWhat::Directory));

    setup
        .installer()
        .uninstall(&InstallRequest::new(&report.luid))
        .unwrap();
    assert!(!dst_dir.exists());
}

#[test]
fn test_deb_install_moves_icons_and_remove_cleans_up() {
    let setup = InstallTestSetup::new();
    let deb = setup.downloads().join("flashprint_4.6.2_amd64.deb");
    write_deb(
        &deb,
        &[
            ("usr/share/FlashPrint/FlashPrint", &b"elf"[..], 0o644),
            ("usr/share/FlashPrint/libextra.so", &b"so"[..], 0o644),
            (
                "usr/share/icons/hicolor/64x64/apps/flashprint.png",
                &b"png"[..],
                0o644,
            ),
            ("usr/share/doc/flashprint/copyright", &b"text"[..], 0o644),
        ],
    );

    let report = setup
        .installer()
        .install(&InstallRequest::new(&deb))
        .unwrap();
    let prefix = setup.config.prefix().unwrap();
    let dst_dir = prefix.join("share/FlashPrint");
    let icon = setup.config.pixmaps_dir().unwrap().join("flashprint.png");
    assert_eq!(report.luid, "flashprint");
    assert_eq!(report.info.caption, "FlashPrint (deb)");
    assert_eq!(report.info.version.as_deref(), Some("4.6.2"));
    assert_eq!(report.shortcut_name, "flashprint-deb.desktop");
    assert_eq!(report.dst_dirpath.as_deref(), Some(dst_dir.as_path()));
    assert!(is_executable(&dst_dir.join("FlashPrint")));
    assert!(icon.is_file());

    let shortcut = fs::read_to_string(setup.shortcut("flashprint-deb.desktop")).unwrap();
    assert!(shortcut.contains(&format!("Icon={}\n", icon.display())));
    assert!(shortcut.contains(&format!("Exec={}\n", dst_dir.join("FlashPrint").display())));

    // A deb always replaces the previous install.
    setup
        .installer()
        .install(&InstallRequest::new(&deb))
        .unwrap();

    let record = setup.registry().find("flashprint").cloned().unwrap();
    assert_eq!(record.icon_paths, vec![icon.clone()]);

    setup
        .installer()
        .uninstall(&InstallRequest::new(&deb))
        .unwrap();
    assert!(!dst_dir.exists());
    assert!(!icon.exists());
    assert!(!setup.shortcut("flashprint-deb.desktop").exists());
    assert!(deb.is_file());
}

#[test]
fn test_directory_without_binary_fails() {
    let setup = InstallTestSetup::new();
    let dir = setup.downloads().join("tool-1.0");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("a.sh"), "").unwrap();
    fs::write(dir.join("b.sh"), "").unwrap();

    assert!(matches!(
        setup.installer().install(&InstallRequest::new(&dir)),
        Err(NopackageError::BinaryNotFound { .. })
    ));
    assert!(!setup.config.registry_path().exists());
}
