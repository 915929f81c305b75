use std::io::Cursor;
use std::path::Path;

use psarc_nx_core::{Archive, ErrorKind, FileStore, PsarcError, spec};

fn sample_archive() -> Archive {
    let mut archive = Archive::new();
    archive.add_file("texture.g1t", (0..=255).collect()).unwrap();
    archive.add_file("empty.bin", vec![]).unwrap();
    archive.add_file("script.ebm", b"hello world".to_vec()).unwrap();
    archive.add_file("Model.g1m", vec![0xCD; 1000]).unwrap();
    archive
}

#[test]
fn test_memory_round_trip() {
    let archive = sample_archive();
    let mut buf = Cursor::new(Vec::new());
    let written = archive.write_to(&mut buf).unwrap();
    assert_eq!(written, buf.get_ref().len() as u64);

    buf.set_position(0);
    let mut loaded = Archive::new();
    loaded.read_from(&mut buf).unwrap();
    assert_eq!(loaded.files(), archive.files());

    let names: Vec<_> = loaded.files().names().collect();
    assert_eq!(names, ["Model.g1m", "empty.bin", "script.ebm", "texture.g1t"]);
}

#[test]
fn test_two_file_scenario() {
    let mut archive = Archive::new();
    archive.add_file("a.bin", vec![1, 2, 3]).unwrap();
    archive.add_file("b.bin", vec![]).unwrap();

    let mut bytes = Vec::new();
    archive.write_to(&mut bytes).unwrap();

    let header = psarc_nx_core::read::read_header(&mut bytes.as_slice()).unwrap();
    assert_eq!(header.file_count, 2);
    assert_eq!(header.string_table_size, 14);
    assert_eq!(header.header_size, spec::HEADER_SIZE + 2 * spec::ENTRY_SIZE);

    let mut loaded = Archive::new();
    loaded.read_from(&mut Cursor::new(bytes)).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.get_file("a.bin"), Some(&[1u8, 2, 3][..]));
    assert_eq!(loaded.get_file("b.bin"), Some(&[][..]));
}

#[test]
fn test_bad_magic_leaves_store_empty() {
    let mut bytes = Vec::new();
    sample_archive().write_to(&mut bytes).unwrap();
    bytes[..4].copy_from_slice(b"PSAR");

    let mut loaded = Archive::new();
    let err = loaded.read_from(&mut Cursor::new(bytes)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(loaded.is_empty());
}

#[test]
fn test_duplicate_add_is_rejected() {
    let mut archive = sample_archive();
    let before = archive.files().clone();

    let err = archive.add_file("empty.bin", vec![1, 2, 3]).unwrap_err();
    assert_eq!(err.data, vec![1, 2, 3]);
    assert_eq!(PsarcError::from(err).kind(), ErrorKind::Conflict);
    assert_eq!(archive.files(), &before);
}

#[test]
fn test_remove_absent() {
    let mut archive = sample_archive();
    let err = archive.remove_file("missing.bin").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(archive.len(), 4);
}

#[test]
fn test_save_empty_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.psarc");

    let err = Archive::new().save(&path).unwrap_err();
    assert!(matches!(err, PsarcError::EmptyArchive));
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert!(!path.exists());

    let mut bytes = Vec::new();
    assert!(Archive::new().write_to(&mut bytes).is_err());
    assert!(bytes.is_empty());
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let archive = sample_archive();

    let saved = archive.save(dir.path().join("data")).unwrap();
    assert_eq!(saved, dir.path().join("data.psarc"));

    let loaded = Archive::open(&saved).unwrap();
    assert_eq!(loaded.source_path(), Some(saved.as_path()));
    assert_eq!(loaded.files(), archive.files());
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Archive::open(dir.path().join("missing.psarc")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_dump_to_stem_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut archive = Archive::new();
    archive.add_file("model.mesh", vec![7, 7, 7]).unwrap();
    let path = archive.save(dir.path().join("archive.psarc")).unwrap();

    let loaded = Archive::open(&path).unwrap();
    let target = loaded.dump(None).unwrap();
    assert_eq!(target, dir.path().join("archive"));
    assert_eq!(std::fs::read(target.join("model.mesh")).unwrap(), [7, 7, 7]);
}

#[test]
fn test_pack_directory_and_unpack() {
    let root = tempfile::tempdir().unwrap();
    let input = root.path().join("resources");
    std::fs::create_dir(&input).unwrap();
    std::fs::write(input.join("a.bin"), [1u8, 2, 3]).unwrap();
    std::fs::write(input.join("b.g1t"), b"texture").unwrap();
    std::fs::create_dir(input.join("sub")).unwrap();

    let mut packed = Archive::new();
    packed.fill(&input).unwrap();
    assert_eq!(packed.source_path(), Some(input.as_path()));
    assert_eq!(packed.len(), 2);

    let saved = packed.save(&input).unwrap();
    assert_eq!(saved, root.path().join("resources.psarc"));

    let unpacked = Archive::open(&saved).unwrap();
    let out = root.path().join("out");
    unpacked.dump(Some(&out)).unwrap();
    assert_eq!(
        FileStore::clone(unpacked.files()),
        psarc_nx_core::fs::fill_dir(&out).unwrap()
    );
}

#[test]
fn test_fill_missing_directory_keeps_contents() {
    let mut archive = sample_archive();
    let err = archive.fill(Path::new("/definitely/not/here")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(archive.len(), 4);
    assert_eq!(archive.source_path(), None);
}

mod round_trip_props {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use super::*;

    /// Names may hold anything but CR, including LF, non-ASCII text and the empty string
    fn file_sets() -> impl Strategy<Value = BTreeMap<String, Vec<u8>>> {
        prop::collection::btree_map("[^\r]*", prop::collection::vec(any::<u8>(), 0..256), 1..32)
    }

    proptest! {
        #[test]
        fn save_then_load_is_identity(files in file_sets()) {
            let mut store = FileStore::new();
            for (name, data) in &files {
                store.add_file(name.clone(), data.clone()).unwrap();
            }

            let mut bytes = Vec::new();
            let written = psarc_nx_core::write::write_archive(&mut bytes, &store).unwrap();
            prop_assert_eq!(written, bytes.len() as u64);

            let header = psarc_nx_core::read::read_header(&mut bytes.as_slice()).unwrap();
            prop_assert_eq!(header.file_count as usize, files.len());
            let names_len: usize = files.keys().map(|name| name.len() + 2).sum();
            prop_assert_eq!(header.string_table_size as usize, names_len);

            let loaded = psarc_nx_core::read::read_archive(&mut Cursor::new(bytes)).unwrap();
            prop_assert_eq!(&loaded, &store);
            let loaded: BTreeMap<String, Vec<u8>> = loaded
                .into_records()
                .map(|record| (record.name, record.data))
                .collect();
            prop_assert_eq!(loaded, files);
        }
    }
}
