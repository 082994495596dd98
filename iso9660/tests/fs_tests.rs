//! Mounted filesystem tests: path resolution, caching, name spaces

mod common;

use common::builder::{ucs2, Layout};
use common::{init_logging, IsoBuilder, MemoryBlockDevice, Record};
use iso9660::error::Iso9660Error;
use iso9660::{Errno, Iso9660Fs, MountOptions, Namespace};

/// Primary hierarchy at 20 (DOCS at 21), Joliet hierarchy at 22 (Docs at 23)
fn sample_image() -> IsoBuilder {
    let mut builder = IsoBuilder::new(64);
    builder
        .primary("SAMPLE", 20, 2048)
        .joliet(17, 22, 2048)
        .terminator(18)
        .directory(
            Layout::Iso,
            20,
            &[
                Record::dot(20, 2048),
                Record::dotdot(20, 2048),
                Record::dir("DOCS", 21, 2048),
                Record::dir("EMPTY", 0, 0),
                Record::file("README.TXT;1", 30, 12),
            ],
        )
        .directory(
            Layout::Iso,
            21,
            &[
                Record::dot(21, 2048),
                Record::dotdot(20, 2048),
                Record::file("GUIDE.PDF;1", 31, 100),
            ],
        )
        .directory(
            Layout::Iso,
            22,
            &[
                Record::dot(22, 2048),
                Record::dotdot(22, 2048),
                Record::new(&ucs2("Docs"), 23, 2048, 0x02),
                Record::new(&ucs2("Read Me.txt;1"), 30, 12, 0),
            ],
        )
        .directory(
            Layout::Iso,
            23,
            &[
                Record::dot(23, 2048),
                Record::dotdot(22, 2048),
                Record::new(&ucs2("User Guide.pdf"), 31, 100, 0),
            ],
        );
    builder
}

fn mount(namespace: Option<Namespace>) -> Iso9660Fs<MemoryBlockDevice> {
    init_logging();
    let options = MountOptions {
        namespace,
        ..MountOptions::default()
    };
    Iso9660Fs::mount(sample_image().build(), 0, options).expect("mount")
}

#[test]
fn test_default_namespace_is_joliet() {
    let mut fs = mount(None);

    assert_eq!(fs.namespace(), Namespace::Joliet);
    assert_eq!(fs.read_dir("/").expect("root"), vec!["Docs", "Read Me.txt"]);
    assert_eq!(fs.read_dir("/docs").expect("docs"), vec!["User Guide.pdf"]);
}

#[test]
fn test_normal_namespace() {
    let mut fs = mount(Some(Namespace::Normal));

    assert_eq!(fs.read_dir("").expect("root"), vec!["DOCS", "EMPTY", "README.TXT"]);
    assert_eq!(fs.read_dir("/DOCS/").expect("docs"), vec!["GUIDE.PDF"]);

    let entry = fs.stat("/readme.txt").expect("stat by display name");
    assert_eq!(entry.filename, "README.TXT;1");
    assert_eq!(entry.size, 12);

    let entry = fs.stat("/README.TXT;1").expect("stat by stored name");
    assert_eq!(entry.extents.first().map(|e| e.lba), Some(30));
}

#[test]
fn test_vms_namespace_keeps_versions() {
    let mut fs = mount(Some(Namespace::Vms));

    assert_eq!(fs.read_dir("/").expect("root"), vec!["DOCS", "EMPTY", "README.TXT;1"]);
}

#[test]
fn test_cache_idempotence() {
    let mut fs = mount(Some(Namespace::Normal));
    assert_eq!(fs.cached_directories(), 1);

    let first = fs.read_dir("/docs").expect("first listing");
    assert_eq!(fs.cached_directories(), 2);

    for _ in 0..3 {
        assert_eq!(fs.read_dir("/docs").expect("cached listing"), first);
        assert_eq!(fs.read_dir("/DOCS").expect("cached listing"), first);
    }
    assert_eq!(fs.cached_directories(), 2);

    let reads = fs.into_inner().reads;
    let mut fresh = mount(Some(Namespace::Normal));
    fresh.read_dir("/docs").expect("listing");
    assert_eq!(fresh.into_inner().reads, reads);
}

#[test]
fn test_resolution_errors() {
    let mut fs = mount(Some(Namespace::Normal));

    let missing = fs.read_dir("/nope");
    assert_eq!(missing.clone().unwrap_err(), Iso9660Error::NoSuchFile);
    assert_eq!(Errno::of(&missing), Errno::NoSuchFile);

    let not_directory = fs.read_dir("/readme.txt/inner");
    assert_eq!(not_directory.clone().unwrap_err(), Iso9660Error::NotDirectory);
    assert_eq!(Errno::of(&not_directory), Errno::NotDirectory);

    assert_eq!(fs.read_dir("/readme.txt").unwrap_err(), Iso9660Error::NotDirectory);

    let empty = fs.read_dir("/empty");
    assert_eq!(empty.clone().unwrap_err(), Iso9660Error::InvalidArgument);
    assert_eq!(Errno::of(&empty), Errno::InvalidArgument);

    assert_eq!(fs.stat("/docs/missing.txt").unwrap_err(), Iso9660Error::NoSuchFile);
    assert_eq!(Errno::of(&fs.read_dir("/")), Errno::NoError);
}

#[test]
fn test_repeated_separators() {
    let mut fs = mount(Some(Namespace::Normal));

    let expected = fs.read_dir("/docs").expect("docs");
    assert_eq!(fs.read_dir("//docs").expect("leading separators"), expected);
    assert_eq!(fs.read_dir("/docs//").expect("trailing separators"), expected);
    assert_eq!(fs.cached_directories(), 2);

    let entry = fs.stat("/docs//guide.pdf").expect("stat");
    assert_eq!(entry.extents.first().map(|e| e.lba), Some(31));
}

#[test]
fn test_repeated_separators_inside_path() {
    init_logging();
    let mut builder = IsoBuilder::new(64);
    builder
        .primary("NESTED", 20, 2048)
        .terminator(17)
        .directory(
            Layout::Iso,
            20,
            &[Record::dot(20, 2048), Record::dotdot(20, 2048), Record::dir("A", 21, 2048)],
        )
        .directory(
            Layout::Iso,
            21,
            &[Record::dot(21, 2048), Record::dotdot(20, 2048), Record::dir("B", 22, 2048)],
        )
        .directory(
            Layout::Iso,
            22,
            &[Record::dot(22, 2048), Record::dotdot(21, 2048), Record::file("X.TXT;1", 30, 3)],
        );
    let options = MountOptions {
        namespace: Some(Namespace::Normal),
        ..MountOptions::default()
    };
    let mut fs = Iso9660Fs::mount(builder.build(), 0, options).expect("mount");

    assert_eq!(fs.read_dir("/a//b").expect("doubled separator"), vec!["X.TXT"]);
    assert_eq!(fs.read_dir("/a/b").expect("single separator"), vec!["X.TXT"]);
    assert_eq!(fs.cached_directories(), 3);
}

#[test]
fn test_unmount() {
    let mut fs = mount(Some(Namespace::Normal));
    fs.read_dir("/docs").expect("listing");

    fs.unmount();
    assert!(!fs.is_mounted());
    assert_eq!(fs.cached_directories(), 0);

    let result = fs.read_dir("/");
    assert_eq!(Errno::of(&result), Errno::AccessDenied);
    assert_eq!(result.unwrap_err(), Iso9660Error::AccessDenied);
    assert_eq!(fs.stat("/docs").unwrap_err(), Iso9660Error::AccessDenied);
}

#[test]
fn test_stat_root() {
    let mut fs = mount(Some(Namespace::Normal));

    let root = fs.stat("/").expect("root");
    assert!(root.is_directory());
    assert_eq!(root.extents.first().map(|e| e.lba), Some(20));

    let joliet_root = mount(None).stat("").expect("root");
    assert_eq!(joliet_root.extents.first().map(|e| e.lba), Some(22));
}

#[test]
fn test_small_block_device() {
    init_logging();
    let device = MemoryBlockDevice::with_block_size(sample_image().image(), 512);
    let options = MountOptions {
        namespace: Some(Namespace::Normal),
        ..MountOptions::default()
    };
    let mut fs = Iso9660Fs::mount(device, 0, options).expect("mount on 512-byte blocks");

    assert_eq!(fs.volume().volume_id, "SAMPLE");
    assert_eq!(fs.read_dir("/docs").expect("docs"), vec!["GUIDE.PDF"]);
}

#[test]
fn test_unsupported_block_size() {
    let device = MemoryBlockDevice::with_block_size(sample_image().image(), 4096);

    let result = Iso9660Fs::mount(device, 0, MountOptions::default());
    assert_eq!(result.err(), Some(Iso9660Error::UnsupportedBlockSize));
}
