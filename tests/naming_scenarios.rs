use nopackage::error::NopackageError;
use nopackage::models::{Arch, Platform};
use nopackage::naming::{ClassifyOptions, PackageInfo};

fn file(name: &str) -> PackageInfo {
    PackageInfo::classify(name, false, &ClassifyOptions::default())
        .unwrap_or_else(|e| panic!("{name}: {e}"))
}

fn dir(name: &str) -> PackageInfo {
    PackageInfo::classify(name, true, &ClassifyOptions::default())
        .unwrap_or_else(|e| panic!("{name}: {e}"))
}

#[test]
fn test_deb_packages() {
    for (name, caption) in [
        ("flashprint_4.6.2_amd64.deb", "FlashPrint 4.6.2 (deb)"),
        ("FlashPrint-4.5.1.deb", "FlashPrint 4.5.1 (deb)"),
    ] {
        let info = file(name);
        assert_eq!(info.luid, "flashprint");
        assert_eq!(format!("{}{}", info.luid, info.suffix), "flashprint-deb");
        assert_eq!(info.cased_name, "FlashPrint");
        assert_eq!(info.caption, caption);
    }
}

#[test]
fn test_blender_directories() {
    let info = dir("blender-2.79b-linux-glibc219-x86_64");
    assert_eq!(info.luid, "blender");
    assert_eq!(info.caption, "Blender 2.79b");
    assert_eq!(info.arch, Some(Arch::Bit64));
    assert_eq!(info.platform, Some(Platform::Linux));

    let info = dir("blender-2.79b-linux-glibc219-x86");
    assert_eq!(info.caption, "Blender 2.79b");
    assert_eq!(info.arch, Some(Arch::Bit32));

    let info = file("blender-2.49b-linux-glibc236-py26-x86_64.tar.bz2");
    assert_eq!(info.caption, "Blender 2.49b");
    assert_eq!(info.arch, Some(Arch::Bit64));
}

#[test]
fn test_paths_use_the_last_component() {
    let info = PackageInfo::classify(
        "/home/user/Downloads/someprogram-1.0",
        true,
        &ClassifyOptions::default(),
    )
    .unwrap();
    assert_eq!(info.luid, "someprogram");
    assert_eq!(info.version.as_deref(), Some("1.0"));

    let info = file("/tmp/some_program-1.0.0.dummy");
    assert_eq!(info.cased_name, "Some Program");
    assert_eq!(info.caption, "Some Program 1.0.0");
}

#[test]
fn test_appimages() {
    let info = file("FreeCAD_0.18-16131-Linux-Conda_Py3Qt5_glibc2.12-x86_64.AppImage");
    assert_eq!(info.caption, "FreeCAD 0.18-16131 (AppImage)");
    assert_eq!(info.arch, Some(Arch::Bit64));
    assert_eq!(info.platform, Some(Platform::Linux));

    let info = file("Mirage-v0.6.4-x86_64.AppImage");
    assert_eq!(info.caption, "Mirage 0.6.4 (AppImage)");
    assert_eq!(info.arch, Some(Arch::Bit64));

    let info = file("Slic3r-1.3.1-dev-2ef957d-x86_64.AppImage");
    assert_eq!(info.caption, "Slic3r 1.3.1 dev-2ef957d (AppImage)");
    assert_eq!(info.arch, Some(Arch::Bit64));

    let info = file("Slic3r-1.3.1-dev-2ef9570-x86_64.AppImage");
    assert_eq!(info.caption, "Slic3r 1.3.1 dev-2ef9570 (AppImage)");
    assert_eq!(info.version.as_deref(), Some("1.3.1 dev-2ef9570"));

    let info = file("Slic3r-master-latest.AppImage");
    assert_eq!(info.caption, "Slic3r master (AppImage)");
    assert_eq!(info.version.as_deref(), Some("master"));

    let info = file("PrusaSlicer-2.3.0+linux-x64-202101111322.AppImage");
    assert_eq!(info.platform, Some(Platform::Linux));
    assert_eq!(info.luid, "prusaslicer");
    assert_eq!(info.caption, "PrusaSlicer 2.3.0 (AppImage)");
    assert_eq!(info.version.as_deref(), Some("2.3.0"));
    assert_eq!(info.arch, Some(Arch::Bit64));
}

#[test]
fn test_leading_version_noise_is_skipped() {
    for name in [
        "Ultimaker_Cura-4.8.0.AppImage",
        "4.9_20210511_Ultimaker_Cura-4.9.1.AppImage",
    ] {
        let info = file(name);
        assert_eq!(info.luid, "ultimaker.cura");
        assert!(info.caption.starts_with("Ultimaker Cura 4."));
        assert!(info.caption.ends_with(" (AppImage)"));
    }
    assert_eq!(
        file("4.9_20210511_Ultimaker_Cura-4.9.1.AppImage").caption,
        "Ultimaker Cura 4.9.1 (AppImage)"
    );
}

#[test]
fn test_no_alphabetic_name_is_rejected() {
    let err = PackageInfo::classify(
        "4.9_20210511-4.9.1.AppImage",
        false,
        &ClassifyOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, NopackageError::NameParse { .. }));
    assert!(err.to_string().contains("no alphabetic"));
}

#[test]
fn test_rpm_packages() {
    let info = file("mfcl2740dwlpr-3.2.0-1.i386.rpm");
    assert_eq!(info.cased_name, "Mfcl2740Dwlpr");
    assert_eq!(info.luid, "mfcl2740dwlpr");
    assert_eq!(info.caption, "Mfcl2740Dwlpr 3.2.0-1");
    assert_eq!(info.arch, Some(Arch::Bit32));

    let info = file("brscan-skey-0.2.4-1.x86_64.rpm");
    assert_eq!(info.cased_name, "Brscan Skey");
    assert_eq!(info.luid, "brscan.skey");
    assert_eq!(info.caption, "Brscan Skey 0.2.4-1");
    assert_eq!(info.arch, Some(Arch::Bit64));

    let info = file("duplicati-2.0.4.5-2.0.4.5_beta_20181128.noarch.rpm");
    assert_eq!(info.cased_name, "Duplicati");
    assert_eq!(info.luid, "duplicati");
    assert_eq!(info.caption, "Duplicati 2.0.4.5-2.0.4.5 beta_20181128");
    assert_eq!(info.arch, Some(Arch::NoArch));
}

#[test]
fn test_compressed_tarballs() {
    let info = file("Meshroom-2019.2.0-linux.tar.gz");
    assert_eq!(info.cased_name, "Meshroom");
    assert_eq!(info.platform, Some(Platform::Linux));
    assert_eq!(info.luid, "meshroom");
    assert_eq!(info.caption, "Meshroom 2019.2.0");

    let info = file("tsetup.1.8.2.tar.xz");
    assert_eq!(info.cased_name, "Tsetup");
    assert_eq!(info.luid, "tsetup");
    assert_eq!(info.caption, "Tsetup 1.8.2");
    assert_eq!(info.version.as_deref(), Some("1.8.2"));

    let info = file("monero-gui-linux-x64-v0.17.1.9.tar.bz2");
    assert_eq!(info.cased_name, "Monero Gui");
    assert_eq!(info.platform, Some(Platform::Linux));
    assert_eq!(info.luid, "monero.gui");
    assert_eq!(info.caption, "Monero Gui 0.17.1.9");
    assert_eq!(info.version.as_deref(), Some("0.17.1.9"));
    assert_eq!(info.arch, Some(Arch::Bit64));
}

#[test]
fn test_version_keyword_joins_version() {
    let info = file("DAIN_APP Alpha 0.41.rar");
    assert_eq!(info.cased_name, "DAIN APP");
    assert_eq!(info.luid, "dain.app");
    assert_eq!(info.caption, "DAIN APP Alpha 0.41");
    assert_eq!(info.version.as_deref(), Some("Alpha 0.41"));
}

#[test]
fn test_cased_name_table() {
    let info = dir("bash2py-3.6");
    assert_eq!(info.cased_name, "Bash2Py");
    assert_eq!(info.luid, "bash2py");
    assert_eq!(info.caption, "Bash2Py 3.6");
    assert_eq!(info.version.as_deref(), Some("3.6"));

    let info = dir("blender-3.0.1-linux-x64");
    assert_eq!(info.cased_name, "Blender");
    assert_eq!(info.caption, "Blender 3.0.1");
    assert_eq!(info.version.as_deref(), Some("3.0.1"));
    assert_eq!(info.luid, "blender");
}

#[test]
fn test_repeated_delimiters_do_not_leak_into_the_name() {
    let info = file("Some Program - 1.0.AppImage");
    assert_eq!(info.luid, "some.program");
    assert_eq!(info.cased_name, "Some Program");
    assert_eq!(info.caption, "Some Program 1.0 (AppImage)");
    assert_eq!(info.version.as_deref(), Some("1.0"));

    assert_eq!(file("foo--1.0.AppImage").luid, "foo");
}
