//! End-to-end COCO directory to YOLO directory conversions.

use std::fs;
use std::path::Path;

use odconvert::conversion::{convert_to_yolo, ConversionIssueCode, DatasetConverter, FormatWriter};
use odconvert::dataset::io_coco::read_coco_dir;
use odconvert::dataset::io_yolo::{YoloWriteOptions, YoloWriter};
use odconvert::dataset::DatasetType;
use odconvert::{ErrorKind, OdConvertError};

mod common;

fn read_label(root: &Path, partition: &str, stem: &str) -> String {
    fs::read_to_string(root.join("labels").join(partition).join(format!("{stem}.txt")))
        .expect("read label file")
}

#[test]
fn scenario_writes_expected_label_line() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let src = temp.path().join("coco");
    let out = temp.path().join("yolo");
    common::write_annotation_file(&src, "instances_train.json", common::scenario_json());

    let dataset = read_coco_dir(&src).expect("read coco");
    let report = convert_to_yolo(&dataset, &out, &YoloWriteOptions::default()).expect("convert");

    assert_eq!(
        read_label(&out, "train", "1"),
        "0 0.250000 0.200000 0.300000 0.200000\n"
    );
    assert!(out.join("images/train").is_dir());
    assert!(out.join("data.yaml").is_file());
    assert_eq!(report.total_label_files(), 1);
    assert_eq!(report.total_annotations(), 1);
}

#[test]
fn every_image_gets_exactly_one_label_file() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let src = temp.path().join("coco");
    let out = temp.path().join("yolo");
    common::write_annotation_file(
        &src,
        "instances_val.json",
        r#"{
            "categories": [{"id": 0, "name": "cat"}, {"id": 1, "name": "dog"}],
            "images": [
                {"id": 1, "file_name": "a.jpg", "width": 100, "height": 100},
                {"id": 2, "file_name": "b.jpg", "width": 100, "height": 100},
                {"id": 3, "file_name": "c.jpg"}
            ],
            "annotations": [
                {"id": 1, "image_id": 1, "category_id": 0, "bbox": [0, 0, 10, 10]},
                {"id": 2, "image_id": 2, "category_id": 1, "bbox": [50, 50, 50, 50]},
                {"id": 3, "image_id": 1, "category_id": 1, "bbox": [10, 10, 20, 20]}
            ]
        }"#,
    );

    let dataset = read_coco_dir(&src).expect("read coco");
    convert_to_yolo(&dataset, &out, &YoloWriteOptions::default()).expect("convert");

    let mut files: Vec<String> = fs::read_dir(out.join("labels/val"))
        .expect("list labels")
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(files, vec!["1.txt", "2.txt", "3.txt"]);

    assert_eq!(
        read_label(&out, "val", "1"),
        "0 0.050000 0.050000 0.100000 0.100000\n1 0.200000 0.200000 0.200000 0.200000\n"
    );
    assert_eq!(
        read_label(&out, "val", "2"),
        "1 0.750000 0.750000 0.500000 0.500000\n"
    );
    // No annotations, so no size is needed for c.jpg.
    assert_eq!(read_label(&out, "val", "3"), "");
}

#[test]
fn same_format_conversion_writes_nothing() {
    struct CocoTarget {
        root: std::path::PathBuf,
    }

    impl FormatWriter for CocoTarget {
        fn target(&self) -> DatasetType {
            DatasetType::Coco
        }

        fn output_root(&self) -> &Path {
            &self.root
        }

        fn additional_checks(
            &self,
            _handler: &odconvert::dataset::DatasetHandler,
        ) -> Result<bool, OdConvertError> {
            Ok(true)
        }

        fn convert_partition(
            &mut self,
            _partition: &dyn odconvert::dataset::DatasetPartition,
            _handler: &odconvert::dataset::DatasetHandler,
            _report: &mut odconvert::conversion::ConversionReport,
        ) -> Result<odconvert::conversion::PartitionSummary, OdConvertError> {
            fs::create_dir_all(&self.root)?;
            Ok(Default::default())
        }
    }

    let temp = tempfile::tempdir().expect("create temp dir");
    let src = temp.path().join("coco");
    let out = temp.path().join("out");
    common::write_annotation_file(&src, "instances_train.json", common::scenario_json());

    let dataset = read_coco_dir(&src).expect("read coco");
    let err = DatasetConverter::new(&dataset, CocoTarget { root: out.clone() })
        .expect("setup")
        .convert()
        .unwrap_err();

    assert!(matches!(err, OdConvertError::AlreadyInTargetFormat(DatasetType::Coco)));
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert!(!out.exists());
}

#[test]
fn unknown_category_leaves_no_label_file() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let src = temp.path().join("coco");
    let out = temp.path().join("yolo");
    common::write_annotation_file(
        &src,
        "instances_train.json",
        r#"{
            "categories": [{"id": 0, "name": "cat"}],
            "images": [{"id": 1, "file_name": "a.jpg", "width": 100, "height": 200}],
            "annotations": [{"id": 1, "image_id": 1, "category_id": 9, "bbox": [10, 20, 30, 40]}]
        }"#,
    );

    let dataset = read_coco_dir(&src).expect("read coco");
    let err = convert_to_yolo(&dataset, &out, &YoloWriteOptions::default()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert!(!out.join("labels/train/1.txt").exists());
}

#[test]
fn image_sizes_fall_back_to_file_headers() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let src = temp.path().join("coco");
    let out = temp.path().join("yolo");
    common::write_bmp(&src.join("images/train/a.bmp"), 40, 20);
    common::write_annotation_file(
        &src,
        "instances_train.json",
        r#"{
            "categories": [{"id": 0, "name": "cat"}],
            "images": [{"id": 5, "file_name": "a.bmp"}],
            "annotations": [{"id": 1, "image_id": 5, "category_id": 0, "bbox": [0, 0, 20, 10]}]
        }"#,
    );

    let dataset = read_coco_dir(&src).expect("read coco");
    let opts = YoloWriteOptions {
        copy_images: true,
        ..Default::default()
    };
    convert_to_yolo(&dataset, &out, &opts).expect("convert");

    assert_eq!(
        read_label(&out, "train", "5"),
        "0 0.250000 0.250000 0.500000 0.500000\n"
    );
    assert!(out.join("images/train/a.bmp").is_file());
}

#[test]
fn partitions_are_converted_in_file_order() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let src = temp.path().join("coco");
    let out = temp.path().join("yolo");
    common::write_annotation_file(&src, "instances_val.json", common::scenario_json());
    common::write_annotation_file(&src, "instances_train.json", common::scenario_json());

    let dataset = read_coco_dir(&src).expect("read coco");
    let report = convert_to_yolo(&dataset, &out, &YoloWriteOptions::default()).expect("convert");

    let names: Vec<&str> = report.partitions.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["train", "val"]);

    let yaml = fs::read_to_string(out.join("data.yaml")).expect("read data.yaml");
    assert!(yaml.contains("train: images/train"));
    assert!(yaml.contains("val: images/val"));
    assert!(yaml.contains("0: cat"));
}

#[test]
fn rerun_requires_overwrite() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let src = temp.path().join("coco");
    let out = temp.path().join("yolo");
    common::write_annotation_file(&src, "instances_train.json", common::scenario_json());

    let dataset = read_coco_dir(&src).expect("read coco");
    convert_to_yolo(&dataset, &out, &YoloWriteOptions::default()).expect("first run");

    let err = convert_to_yolo(&dataset, &out, &YoloWriteOptions::default()).unwrap_err();
    assert!(matches!(err, OdConvertError::OutputNotEmpty { .. }));

    let writer = YoloWriter::new(
        &out,
        YoloWriteOptions {
            overwrite: true,
            ..Default::default()
        },
    );
    let report = DatasetConverter::new(&dataset, writer)
        .expect("setup")
        .convert()
        .expect("overwrite run");
    assert!(report
        .issues
        .iter()
        .any(|i| i.code == ConversionIssueCode::ImagesNotCopied));
}

#[test]
fn converting_in_place_with_image_copy_keeps_images() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let root = temp.path();
    let image = root.join("images/train/a.bmp");
    common::write_bmp(&image, 4, 4);
    common::write_annotation_file(
        root,
        "instances_train.json",
        r#"{
            "categories": [{"id": 0, "name": "cat"}],
            "images": [{"id": 1, "file_name": "a.bmp"}],
            "annotations": [{"id": 1, "image_id": 1, "category_id": 0, "bbox": [0, 0, 2, 2]}]
        }"#,
    );

    let dataset = read_coco_dir(root).expect("read coco");
    let opts = YoloWriteOptions {
        copy_images: true,
        ..Default::default()
    };
    convert_to_yolo(&dataset, root, &opts).expect("convert");

    assert_eq!(fs::read(&image).expect("read image"), common::bmp_bytes(4, 4));
    assert_eq!(
        read_label(root, "train", "1"),
        "0 0.250000 0.250000 0.500000 0.500000\n"
    );
}

#[test]
fn split_named_like_a_data_yaml_key_is_refused() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let src = temp.path().join("coco");
    let out = temp.path().join("yolo");
    common::write_annotation_file(&src, "instances_names.json", common::scenario_json());

    let dataset = read_coco_dir(&src).expect("read coco");
    let err = convert_to_yolo(&dataset, &out, &YoloWriteOptions::default()).unwrap_err();

    assert!(matches!(
        err,
        OdConvertError::UnusablePartitionName { ref name, .. } if name == "names"
    ));
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert!(!out.exists());
}
