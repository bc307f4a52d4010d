#![allow(dead_code)]

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use serde_json::{json, Value};

pub const EPS_PIXEL: f64 = 1e-9;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// A generated COCO partition plus the facts tests check against.
#[derive(Clone, Debug)]
pub struct CocoFixture {
    pub json: Value,
    pub image_ids: Vec<u64>,
    /// Annotation count per entry of `image_ids`.
    pub per_image: Vec<usize>,
}

/// Corner coordinates in pixels with min <= max.
pub fn arb_corners() -> BoxedStrategy<(f64, f64, f64, f64)> {
    (0.0f64..2000.0, 0.0f64..2000.0, 0.0f64..2000.0, 0.0f64..2000.0)
        .prop_map(|(x0, y0, x1, y1)| (x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)))
        .boxed()
}

/// A COCO partition with up to `max_images` images (ids unique, non-contiguous),
/// up to `max_categories` categories and up to `max_annotations` boxes that all
/// reference existing images and categories.
pub fn arb_coco_partition(
    max_images: usize,
    max_categories: usize,
    max_annotations: usize,
) -> BoxedStrategy<CocoFixture> {
    (
        proptest::collection::btree_set(1u64..10_000, 1..=max_images),
        1..=max_categories,
    )
        .prop_flat_map(move |(image_ids, num_categories)| {
            let image_ids: Vec<u64> = image_ids.into_iter().collect();
            let num_images = image_ids.len();
            let anns = proptest::collection::vec(
                (
                    0..num_images,
                    0..num_categories,
                    1u32..500,
                    1u32..500,
                    0u8..=1,
                ),
                0..=max_annotations,
            );
            let sizes = proptest::collection::vec((1u32..4000, 1u32..4000), num_images);
            (Just(image_ids), Just(num_categories), sizes, anns)
        })
        .prop_map(|(image_ids, num_categories, sizes, anns)| {
            let categories: Vec<Value> = (0..num_categories)
                .map(|i| json!({"id": i as u64, "name": format!("class_{i}")}))
                .collect();
            let images: Vec<Value> = image_ids
                .iter()
                .zip(&sizes)
                .map(|(id, (w, h))| {
                    json!({"id": id, "file_name": format!("img_{id}.jpg"), "width": w, "height": h})
                })
                .collect();

            let mut per_image = vec![0usize; image_ids.len()];
            let annotations: Vec<Value> = anns
                .iter()
                .enumerate()
                .map(|(n, (img_idx, cat, w, h, crowd))| {
                    per_image[*img_idx] += 1;
                    json!({
                        "id": n as u64 + 1,
                        "image_id": image_ids[*img_idx],
                        "category_id": *cat as u64,
                        "bbox": [0.0, 0.0, *w as f64, *h as f64],
                        "iscrowd": crowd,
                    })
                })
                .collect();

            CocoFixture {
                json: json!({
                    "categories": categories,
                    "images": images,
                    "annotations": annotations,
                }),
                image_ids,
                per_image,
            }
        })
        .boxed()
}
