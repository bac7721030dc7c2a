use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::RgbImage;
use pose2gesture::config::ClassTable;
use pose2gesture::verify::class_color;
use pose2gesture::{
    create_dataset_yaml, load_gesture_map, make_gesture_map, process_dataset,
    render_verification, DatasetStore, GestureError, GestureMap, LocalStore, MemoryStore,
};

const POSE_LABEL: &str = "0 0.4 0.4 0.3 0.3 0.1 0.2 2 0.3 0.4 2\n";

fn write_file(path: &Path, contents: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn shape_map() -> GestureMap {
    [("shapeA_fist", 3u32), ("b_c", 10), ("a_b_c", 4)]
        .into_iter()
        .collect()
}

/// Source pose dataset with one convertible image per split plus a few that get skipped
fn create_pose_dataset(root: &Path) {
    write_file(&root.join("images/train/shapeA_fist_03.png"), b"png-bytes");
    write_file(&root.join("labels/train/shapeA_fist_03.txt"), POSE_LABEL.as_bytes());

    // No key matches
    write_file(&root.join("images/train/unknown_07.jpg"), b"jpg-bytes");
    write_file(&root.join("labels/train/unknown_07.txt"), POSE_LABEL.as_bytes());

    // Matching key but no label
    write_file(&root.join("images/train/b_c_01.jpg"), b"jpg-bytes");

    // Matching key but blank label
    write_file(&root.join("images/train/b_c_02.jpg"), b"jpg-bytes");
    write_file(&root.join("labels/train/b_c_02.txt"), b"\n\n");

    write_file(&root.join("images/val/a_b_c_d.png"), b"val-png");
    write_file(&root.join("labels/val/a_b_c_d.txt"), POSE_LABEL.as_bytes());
}

#[test]
fn test_process_dataset_round_trip() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = temp_dir.path().join("pose");
    let dest = temp_dir.path().join("gesture");
    create_pose_dataset(&source);

    let stats = process_dataset(&LocalStore, &source, &dest, &shape_map()).unwrap();

    assert_eq!(stats.train, 1);
    assert_eq!(stats.val, 1);
    assert_eq!(stats.skipped, 3);
    assert_eq!(stats.skipped_no_match, 1);
    assert_eq!(stats.skipped_missing_label, 1);
    assert_eq!(stats.skipped_empty_label, 1);

    assert_eq!(
        fs::read(dest.join("images/train/shapeA_fist_03.png")).unwrap(),
        b"png-bytes"
    );
    assert_eq!(
        fs::read_to_string(dest.join("labels/train/shapeA_fist_03.txt")).unwrap(),
        "3 0.4 0.4 0.3 0.3\n"
    );
    // The longer key wins over the `b_c` it contains
    assert_eq!(
        fs::read_to_string(dest.join("labels/val/a_b_c_d.txt")).unwrap(),
        "4 0.4 0.4 0.3 0.3\n"
    );

    assert!(!dest.join("images/train/unknown_07.jpg").exists());
    assert!(!dest.join("labels/train/unknown_07.txt").exists());
    assert!(!dest.join("images/train/b_c_01.jpg").exists());
    assert!(!dest.join("images/train/b_c_02.jpg").exists());
    assert!(!dest.join("labels/train/b_c_02.txt").exists());
}

#[test]
fn test_process_dataset_is_idempotent() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = temp_dir.path().join("pose");
    let dest = temp_dir.path().join("gesture");
    create_pose_dataset(&source);

    let first = process_dataset(&LocalStore, &source, &dest, &shape_map()).unwrap();
    let listing = |dir: &Path| -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        files.sort();
        files
    };
    let train_labels = listing(&dest.join("labels/train"));
    let train_label = fs::read_to_string(dest.join("labels/train/shapeA_fist_03.txt")).unwrap();

    let second = process_dataset(&LocalStore, &source, &dest, &shape_map()).unwrap();

    assert_eq!(first, second);
    assert_eq!(listing(&dest.join("labels/train")), train_labels);
    assert_eq!(
        fs::read_to_string(dest.join("labels/train/shapeA_fist_03.txt")).unwrap(),
        train_label
    );
}

#[test]
fn test_process_dataset_missing_splits() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = temp_dir.path().join("empty_pose");
    let dest = temp_dir.path().join("gesture");
    fs::create_dir_all(&source).unwrap();

    let stats = process_dataset(&LocalStore, &source, &dest, &shape_map()).unwrap();

    assert_eq!(stats.train + stats.val + stats.skipped, 0);
    // Destination layout is created even when there is nothing to convert
    assert!(dest.join("images/train").is_dir());
    assert!(dest.join("labels/val").is_dir());
}

#[test]
fn test_process_dataset_in_memory() {
    let store = MemoryStore::new();
    let source = Path::new("/pose");
    let dest = Path::new("/gesture");
    store.add_file("/pose/images/train/shapeA_fist_03.png", b"png".to_vec());
    store.add_file("/pose/labels/train/shapeA_fist_03.txt", POSE_LABEL);
    store.add_file("/pose/images/val/nothing_here.png", b"png".to_vec());
    store.add_file("/pose/labels/val/nothing_here.txt", POSE_LABEL);

    let stats = process_dataset(&store, source, dest, &shape_map()).unwrap();

    assert_eq!(stats.train, 1);
    assert_eq!(stats.val, 0);
    assert_eq!(stats.skipped, 1);
    assert_eq!(
        store.contents("/gesture/labels/train/shapeA_fist_03.txt").unwrap(),
        b"3 0.4 0.4 0.3 0.3\n"
    );
    assert_eq!(
        store.contents("/gesture/images/train/shapeA_fist_03.png").unwrap(),
        b"png"
    );
    assert!(store.is_dir("/gesture/images/val"));
    assert!(store
        .file_paths()
        .iter()
        .filter(|path| path.starts_with(dest))
        .all(|path| !path.to_string_lossy().contains("nothing_here")));
}

/// Store whose image copies always fail
struct FailingCopyStore(MemoryStore);

impl DatasetStore for FailingCopyStore {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.0.create_dir_all(path)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        self.0.list_files(dir)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.0.is_file(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.0.read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.0.write(path, contents)
    }

    fn copy(&self, _from: &Path, _to: &Path) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.0.remove_file(path)
    }
}

#[test]
fn test_failed_copy_leaves_no_orphan_label() {
    let store = FailingCopyStore(MemoryStore::new());
    store
        .0
        .add_file("/pose/images/train/shapeA_fist_03.png", b"png".to_vec());
    store
        .0
        .add_file("/pose/labels/train/shapeA_fist_03.txt", POSE_LABEL);

    let stats = process_dataset(&store, Path::new("/pose"), Path::new("/gesture"), &shape_map())
        .unwrap();

    assert_eq!(stats.train, 0);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.failed_writes, 1);
    assert!(store
        .0
        .contents("/gesture/labels/train/shapeA_fist_03.txt")
        .is_none());
}

#[test]
fn test_shared_stem_images_are_skipped() {
    let store = MemoryStore::new();
    store.add_file("/pose/images/train/a_fist_01.png", b"png".to_vec());
    store.add_file("/pose/images/train/a_fist_01.jpg", b"jpg".to_vec());
    store.add_file("/pose/labels/train/a_fist_01.txt", POSE_LABEL);
    store.add_file("/pose/images/train/a_fist_02.png", b"png".to_vec());
    store.add_file("/pose/labels/train/a_fist_02.txt", POSE_LABEL);
    let map: GestureMap = [("a_fist", 3u32)].into_iter().collect();

    let stats = process_dataset(&store, Path::new("/pose"), Path::new("/gesture"), &map).unwrap();

    assert_eq!(stats.train, 1);
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.skipped_ambiguous_stem, 2);
    let outputs: Vec<PathBuf> = store
        .file_paths()
        .into_iter()
        .filter(|path| path.starts_with("/gesture"))
        .collect();
    assert_eq!(
        outputs,
        vec![
            PathBuf::from("/gesture/images/train/a_fist_02.png"),
            PathBuf::from("/gesture/labels/train/a_fist_02.txt"),
        ]
    );
}

/// Store whose label writes leave a truncated file behind and then fail
struct FailingWriteStore(MemoryStore);

impl DatasetStore for FailingWriteStore {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.0.create_dir_all(path)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        self.0.list_files(dir)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.0.is_file(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.0.read_to_string(path)
    }

    fn write(&self, path: &Path, _contents: &str) -> io::Result<()> {
        self.0.write(path, "")?;
        Err(io::Error::new(io::ErrorKind::Other, "no space left on device"))
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.0.copy(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.0.remove_file(path)
    }
}

#[test]
fn test_failed_write_leaves_no_partial_pair() {
    let store = FailingWriteStore(MemoryStore::new());
    store
        .0
        .add_file("/pose/images/train/shapeA_fist_03.png", b"png".to_vec());
    store
        .0
        .add_file("/pose/labels/train/shapeA_fist_03.txt", POSE_LABEL);
    // Left over from an earlier run
    store
        .0
        .add_file("/gesture/images/train/shapeA_fist_03.png", b"old".to_vec());

    let stats = process_dataset(&store, Path::new("/pose"), Path::new("/gesture"), &shape_map())
        .unwrap();

    assert_eq!(stats.train, 0);
    assert_eq!(stats.failed_writes, 1);
    assert!(store
        .0
        .contents("/gesture/labels/train/shapeA_fist_03.txt")
        .is_none());
    assert!(store
        .0
        .contents("/gesture/images/train/shapeA_fist_03.png")
        .is_none());
}

#[test]
fn test_failed_copy_on_rerun_removes_stale_image() {
    let store = FailingCopyStore(MemoryStore::new());
    store
        .0
        .add_file("/pose/images/train/shapeA_fist_03.png", b"png".to_vec());
    store
        .0
        .add_file("/pose/labels/train/shapeA_fist_03.txt", POSE_LABEL);
    store
        .0
        .add_file("/gesture/images/train/shapeA_fist_03.png", b"old".to_vec());
    store
        .0
        .add_file("/gesture/labels/train/shapeA_fist_03.txt", "3 0.4 0.4 0.3 0.3\n");

    let stats = process_dataset(&store, Path::new("/pose"), Path::new("/gesture"), &shape_map())
        .unwrap();

    assert_eq!(stats.failed_writes, 1);
    assert!(store
        .0
        .contents("/gesture/images/train/shapeA_fist_03.png")
        .is_none());
    assert!(store
        .0
        .contents("/gesture/labels/train/shapeA_fist_03.txt")
        .is_none());
}

#[test]
fn test_unreadable_label_is_skipped() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = temp_dir.path().join("pose");
    let dest = temp_dir.path().join("gesture");
    write_file(&source.join("images/train/shapeA_fist_03.png"), b"png-bytes");
    write_file(&source.join("labels/train/shapeA_fist_03.txt"), b"\xff\xfe 0.4 0.4 0.3 0.3\n");

    let stats = process_dataset(&LocalStore, &source, &dest, &shape_map()).unwrap();

    assert_eq!(stats.train, 0);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.skipped_empty_label, 1);
    assert!(!dest.join("labels/train/shapeA_fist_03.txt").exists());
    assert!(!dest.join("images/train/shapeA_fist_03.png").exists());
}

#[test]
fn test_local_store_list_files() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path().join("images");
    write_file(&dir.join("b.png"), b"");
    write_file(&dir.join("a.jpg"), b"");
    write_file(&dir.join("no_extension"), b"");
    fs::create_dir_all(dir.join("nested.dir")).unwrap();

    let files = LocalStore.list_files(&dir).unwrap();
    assert_eq!(files, vec![dir.join("a.jpg"), dir.join("b.png")]);

    assert!(LocalStore
        .list_files(&temp_dir.path().join("missing"))
        .unwrap()
        .is_empty());
}

#[test]
fn test_load_gesture_map_errors() {
    let temp_dir = tempfile::tempdir().unwrap();

    let missing = temp_dir.path().join("missing.txt");
    assert!(matches!(
        load_gesture_map(&missing),
        Err(GestureError::MapNotFound(_))
    ));

    let empty = temp_dir.path().join("empty.txt");
    write_file(&empty, b"# only comments\n\nbroken\nx/y no_id\n");
    assert!(matches!(
        load_gesture_map(&empty),
        Err(GestureError::EmptyMap(_))
    ));

    let valid = temp_dir.path().join("gesture_map.txt");
    write_file(&valid, b"shapeA/fist fist 3\n");
    let map = load_gesture_map(&valid).unwrap();
    assert_eq!(map.get("shapeA_fist"), Some(3));
}

#[test]
fn test_create_dataset_yaml() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dest = temp_dir.path().join("gesture");

    let yaml_path = create_dataset_yaml(&dest, &ClassTable::default(), &shape_map()).unwrap();

    assert_eq!(yaml_path, dest.join("dataset.yaml"));
    let yaml_content = fs::read_to_string(yaml_path).unwrap();
    assert!(yaml_content.contains("train: ./images/train"));
    assert!(yaml_content.contains("val: ./images/val"));
    assert!(yaml_content.contains("nc: 15"));
    assert!(yaml_content.contains("'MISSING_CLASS_6'"));
}

#[test]
fn test_class_table_from_json() {
    let temp_dir = tempfile::tempdir().unwrap();

    let path = temp_dir.path().join("classes.json");
    write_file(&path, br#"{"0": "wave", "2": "point"}"#);
    let classes = ClassTable::from_json_file(&path).unwrap();
    assert_eq!(classes.len(), 2);
    assert_eq!(classes.name(2), Some("point"));
    assert_eq!(classes.max_id(), Some(2));

    let broken = temp_dir.path().join("broken.json");
    write_file(&broken, b"[1, 2]");
    assert!(matches!(
        ClassTable::from_json_file(&broken),
        Err(GestureError::ClassTable { .. })
    ));

    assert!(matches!(
        ClassTable::load_or_default(Some(temp_dir.path().join("missing.json").as_path())),
        Err(GestureError::ClassTableNotFound(_))
    ));
    assert_eq!(ClassTable::load_or_default(None).unwrap(), ClassTable::default());
}

#[test]
fn test_make_gesture_map_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("original_gestures.txt");
    let output = temp_dir.path().join("gesture_map.txt");
    write_file(&input, b"shapeA/fist Fist\nshapeB/pinch open_pinch\nshapeC/wave wave\n");

    let stats = make_gesture_map(&input, &output, &ClassTable::default()).unwrap();
    assert_eq!(stats.converted, 2);
    assert_eq!(stats.failed, 1);

    let map = load_gesture_map(&output).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get("shapeA_fist"), Some(3));
    assert_eq!(map.get("shapeB_pinch"), Some(12));

    let missing = temp_dir.path().join("missing.txt");
    assert!(matches!(
        make_gesture_map(&missing, &output, &ClassTable::default()),
        Err(GestureError::Io { .. })
    ));
}

#[test]
fn test_render_verification() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dest = temp_dir.path().join("gesture");
    let out_dir = temp_dir.path().join("verify");

    fs::create_dir_all(dest.join("images/val")).unwrap();
    RgbImage::new(20, 20)
        .save(dest.join("images/val/a_b_c_d.png"))
        .unwrap();
    write_file(&dest.join("labels/val/a_b_c_d.txt"), b"0 0.5 0.5 0.5 0.5\n");

    // Not decodable, skipped
    write_file(&dest.join("images/val/broken.png"), b"not a png");
    write_file(&dest.join("labels/val/broken.txt"), b"0 0.5 0.5 0.5 0.5\n");

    let saved = render_verification(&dest, &out_dir, 5, 42, &ClassTable::default()).unwrap();
    assert_eq!(saved, 1);

    let rendered = image::open(out_dir.join("a_b_c_d.png")).unwrap().to_rgb8();
    assert_eq!(*rendered.get_pixel(10, 5), class_color(0));
    assert_eq!(*rendered.get_pixel(10, 10), image::Rgb([0, 0, 0]));
    assert!(!out_dir.join("broken.png").exists());
}

#[test]
fn test_render_verification_without_val_images() {
    let temp_dir = tempfile::tempdir().unwrap();
    let out_dir = temp_dir.path().join("verify");

    let saved = render_verification(
        &temp_dir.path().join("gesture"),
        &out_dir,
        5,
        42,
        &ClassTable::default(),
    )
    .unwrap();

    assert_eq!(saved, 0);
    assert!(!out_dir.exists());
}
