use pots_core::seed;
use pots_db::pool;
use pots_db::queries::{areas, plants, plots};
use pots_test_utils::{create_test_db, drop_test_db};

#[tokio::test]
async fn seed_loads_sample_garden_once() {
    let (pool, db_name) = create_test_db().await;

    let summary = seed::seed(&pool).await.expect("seed should succeed");
    assert_eq!(summary.areas, 3);
    assert_eq!(summary.plots, 2);
    assert_eq!(summary.plant_types, 7);
    assert_eq!(summary.plants, 6);

    let counts = pool::table_counts(&pool).await.unwrap();
    assert_eq!(
        counts,
        vec![("areas", 3), ("plant_types", 7), ("plots", 2), ("plants", 6)]
    );

    let again = seed::seed(&pool).await.unwrap();
    assert!(again.is_empty());
    assert_eq!(areas::count_areas(&pool).await.unwrap(), 3);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn seeded_plants_sit_where_expected() {
    let (pool, db_name) = create_test_db().await;
    seed::seed(&pool).await.unwrap();

    let all_plots = plots::list_plots(&pool).await.unwrap();
    let tomato_bed = all_plots.iter().find(|p| p.name == "Tomato Bed").unwrap();
    let in_bed = plants::list_plants_for_plot(&pool, tomato_bed.id).await.unwrap();
    let mut cells: Vec<_> = in_bed.iter().map(|p| (p.name.as_str(), p.position())).collect();
    cells.sort();
    assert_eq!(
        cells,
        vec![("Big Boy", Some((2, 1))), ("Cherry Tom", Some((0, 0)))]
    );

    let living_room = areas::list_areas(&pool)
        .await
        .unwrap()
        .into_iter()
        .find(|a| a.name == "Living Room")
        .unwrap();
    let free = plants::list_free_standing_plants_for_area(&pool, living_room.id)
        .await
        .unwrap();
    assert_eq!(free.len(), 2);
    assert!(free.iter().all(|p| p.is_free_standing()));

    pool.close().await;
    drop_test_db(&db_name).await;
}
