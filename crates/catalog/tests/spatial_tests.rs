//! Integration tests for bounding-box queries.

mod common;

use common::{TestCatalog, bbox, unique_file};
use eocat_core::NewProduct;

#[tokio::test]
async fn test_query_bbox_overlap() {
    let catalog = TestCatalog::in_memory().await.expect("Failed to create catalog");
    let store = catalog.store();

    let product = NewProduct::new("S2A_L1.tif", "L1").with_bbox(bbox(10.0, 20.0, 30.0, 40.0));
    let stored = store.register(&product).await.unwrap();

    let hits = store
        .query_bbox(&bbox(15.0, 16.0, 35.0, 36.0))
        .await
        .expect("Query failed");
    assert_eq!(hits, vec![stored]);

    let misses = store.query_bbox(&bbox(50.0, 60.0, 70.0, 80.0)).await.unwrap();
    assert!(misses.is_empty());
}

#[tokio::test]
async fn test_identical_and_touching_boxes_match() {
    let catalog = TestCatalog::in_memory().await.unwrap();
    let store = catalog.store();

    let boxes = [
        bbox(-12.345678, -11.0, 100.123456, 101.5),
        bbox(0.1, 0.2, 0.3, 0.4),
        bbox(89.0, 90.0, 179.0, 180.0),
        bbox(-90.0, -89.999999, -180.0, -179.999999),
    ];
    for (i, b) in boxes.iter().enumerate() {
        let product = NewProduct::new(unique_file("exact"), "L2").with_bbox(*b);
        let stored = store.register(&product).await.unwrap();
        let hits = store.query_bbox(b).await.unwrap();
        assert_eq!(hits.len(), 1, "box {i} not found by identical query");
        assert_eq!(hits[0].id, stored.id);
    }

    // Shared edge only
    let edge = store.query_bbox(&bbox(0.2, 0.5, 0.4, 0.5)).await.unwrap();
    assert_eq!(edge.len(), 1);

    // Strictly outside
    let outside = store.query_bbox(&bbox(0.2000001, 0.5, 0.4000001, 0.5)).await.unwrap();
    assert!(outside.is_empty());
}

#[tokio::test]
async fn test_query_results_in_id_order() {
    let catalog = TestCatalog::in_memory().await.unwrap();
    let store = catalog.store();

    let mut ids = Vec::new();
    for i in 0..5 {
        let offset = f64::from(i);
        let product = NewProduct::new(unique_file("tile"), "L2")
            .with_bbox(bbox(offset, offset + 2.0, offset, offset + 2.0));
        ids.push(store.register(&product).await.unwrap().id);
    }

    let hits = store.query_bbox(&bbox(-90.0, 90.0, -180.0, 180.0)).await.unwrap();
    let hit_ids: Vec<_> = hits.iter().map(|p| p.id).collect();
    assert_eq!(hit_ids, ids);

    let middle = store.query_bbox(&bbox(2.5, 3.5, 2.5, 3.5)).await.unwrap();
    let middle_ids: Vec<_> = middle.iter().map(|p| p.id).collect();
    assert_eq!(middle_ids, vec![ids[1], ids[2], ids[3]]);
}

#[tokio::test]
async fn test_query_point() {
    let catalog = TestCatalog::in_memory().await.unwrap();
    let store = catalog.store();

    let product = NewProduct::new("S1A_IW_GRDH.SAFE", "GRD").with_bbox(bbox(45.0, 47.0, 6.0, 10.0));
    let stored = store.register(&product).await.unwrap();

    assert_eq!(store.query_point(46.2, 7.4).await.unwrap(), vec![stored]);
    assert!(store.query_point(40.0, 7.4).await.unwrap().is_empty());
    assert!(store.query_point(f64::NAN, 7.4).await.is_err());
}

#[tokio::test]
async fn test_remove_leaves_no_orphans() {
    let catalog = TestCatalog::in_memory().await.unwrap();
    let store = catalog.store();

    let file = unique_file("orphan");
    store
        .register(&NewProduct::new(&file, "L1").with_bbox(bbox(10.0, 20.0, 30.0, 40.0)))
        .await
        .unwrap();
    store
        .register(&NewProduct::new(&file, "L2").with_bbox(bbox(10.0, 20.0, 30.0, 40.0)))
        .await
        .unwrap();
    assert_eq!(catalog.bbox_rows().await, 2);

    assert!(store.remove(&file, "L1").await.unwrap());

    assert_eq!(catalog.bbox_rows().await, 1);
    assert_eq!(store.indexed_count().await, 1);
    let hits = store.query_bbox(&bbox(15.0, 16.0, 35.0, 36.0)).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].product_type, "L2");

    let orphans: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM bbox_index WHERE product_id NOT IN (SELECT id FROM products)",
    )
    .fetch_one(catalog.pool())
    .await
    .unwrap();
    assert_eq!(orphans, 0);
}

#[tokio::test]
async fn test_reload_index_matches_table() {
    let catalog = TestCatalog::in_memory().await.unwrap();
    let store = catalog.store();

    for i in 0..3 {
        let offset = f64::from(i) * 10.0;
        store
            .register(
                &NewProduct::new(unique_file("reload"), "L2")
                    .with_bbox(bbox(offset, offset + 1.0, offset, offset + 1.0)),
            )
            .await
            .unwrap();
    }
    store
        .register(&NewProduct::new(unique_file("nobox"), "L2"))
        .await
        .unwrap();

    let loaded = catalog.sqlite().reload_index().await.expect("Reload failed");
    assert_eq!(loaded, 3);
    assert_eq!(store.indexed_count().await, 3);
    assert_eq!(
        store.query_bbox(&bbox(10.5, 10.6, 10.5, 10.6)).await.unwrap().len(),
        1
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reader_never_sees_box_out_of_step() {
    let catalog = TestCatalog::in_memory().await.unwrap();
    let store = catalog.store();

    let west = bbox(0.0, 10.0, 0.0, 10.0);
    let east = bbox(0.0, 10.0, 100.0, 110.0);
    store
        .register(&NewProduct::new("mover.nc", "L2").with_bbox(west))
        .await
        .unwrap();
    store
        .register(&NewProduct::new("anchor.nc", "L2").with_bbox(bbox(4.0, 5.0, 4.0, 5.0)))
        .await
        .unwrap();

    let writer = {
        let store = store.clone();
        tokio::spawn(async move {
            for i in 0..200 {
                let target = if i % 2 == 0 { east } else { west };
                store
                    .upsert(&NewProduct::new("mover.nc", "L2").with_bbox(target))
                    .await
                    .expect("Upsert failed");
            }
        })
    };

    let reader = {
        let store = store.clone();
        tokio::spawn(async move {
            for _ in 0..200 {
                let hits = store.query_bbox(&west).await.expect("Query failed");
                assert!(hits.iter().any(|p| p.file_path == "anchor.nc"));
                for product in hits {
                    assert!(
                        product.bbox.is_some_and(|b| b.intersects(&west)),
                        "{} returned with box {:?}",
                        product.file_path,
                        product.bbox
                    );
                }
                tokio::task::yield_now().await;
            }
        })
    };

    writer.await.expect("Writer task panicked");
    reader.await.expect("Reader task panicked");

    // Last upsert moved the product back west
    let hits = store.query_bbox(&west).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert!(store.query_bbox(&east).await.unwrap().is_empty());
    assert_eq!(store.indexed_count().await, 2);
    assert_eq!(catalog.bbox_rows().await, 2);
}
