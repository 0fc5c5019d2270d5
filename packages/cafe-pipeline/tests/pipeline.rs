//! End-to-end tests: collect from scripted pages, write the tables, export SQL.

use cafe_pipeline::pipeline::export::{check_dependency_order, RawTable};
use cafe_pipeline::tables;
use cafe_pipeline::testing::{cafe_state, StateBuilder};
use cafe_pipeline::{
    Category, CollectConfig, Collector, Dataset, MockFetcher, PacingConfig, RelationalExporter,
    ReplayFetcher, RetryConfig, TableKind,
};

fn test_config(queries: &[&str]) -> CollectConfig {
    CollectConfig::default()
        .with_queries(queries.iter().copied())
        .with_pacing(PacingConfig::disabled())
        .with_retry(RetryConfig::no_backoff(2))
}

fn seoul_fixture() -> MockFetcher {
    MockFetcher::new()
        .with_result(
            "성수 로스터리",
            "성수 로스터스",
            StateBuilder::place("11", "성수 로스터스", "서울특별시 성동구 연무장길 10")
                .with_category("카페")
                .with_coordinate(37.5432, 127.0565)
                .with_menu("아메리카노", "4,500")
                .with_menu("카페라떼", "5,000")
                .with_menu("바닐라 라떼", "5,500")
                .with_menu("치즈케이크", "6,500")
                .build(),
        )
        .with_result(
            "성수 로스터리",
            "성수 로스터스 2호점",
            cafe_state(
                "12",
                "성수 로스터스 2호점",
                "서울특별시 성동구 연무장길 10",
                &[("플랫화이트", "5,500")],
            ),
        )
        .with_result(
            "성수 로스터리",
            "판교 커피",
            cafe_state(
                "13",
                "판교 커피",
                "경기도 성남시 분당구 판교역로 1",
                &[("아메리카노", "4,000")],
            ),
        )
        .with_result(
            "성수 로스터리",
            "디저트 카페",
            cafe_state(
                "14",
                "디저트 카페",
                "서울특별시 성동구 서울숲길 3",
                &[("딸기 케이크", "7,000"), ("녹차", "5,000")],
            ),
        )
        .with_result(
            "합정 스페셜티",
            "합정 브루어스",
            StateBuilder::place("21", "합정 브루어스", "서울특별시 마포구 독막로 5")
                .with_menu("에티오피아 핸드드립", "7,000")
                .with_menu("콜드브루", "5,500")
                .with_menu("게이샤 드립", "25,000")
                .build(),
        )
}

#[tokio::test]
async fn collect_applies_acceptance_policy() {
    let fetcher = seoul_fixture();
    let outcome = Collector::new(fetcher, test_config(&["성수 로스터리", "합정 스페셜티"]))
        .run()
        .await;

    let names: Vec<_> = outcome.stores.iter().map(|s| s.place.name.as_str()).collect();
    assert_eq!(names, vec!["성수 로스터스", "합정 브루어스"]);

    // Cake rejected by keyword, the 25,000 drip by price
    assert_eq!(outcome.stores[0].menus.len(), 3);
    assert_eq!(outcome.stores[1].menus.len(), 2);

    let log = &outcome.log;
    assert_eq!(log.skipped_no_menu, 1);
    assert_eq!(log.queries[0].found, 4);
    assert_eq!(log.queries[0].added, 1);
    assert_eq!(log.queries[0].skipped, 1);
    assert_eq!(log.queries[1].added, 1);
    assert_eq!(log.total_stores, 2);
    assert_eq!(log.total_menus, 5);
    assert!(log.is_clean());
}

#[tokio::test]
async fn collect_survives_failing_query() {
    let fetcher = seoul_fixture().failing_search("망원 카페", 5);
    let outcome = Collector::new(
        fetcher.clone(),
        test_config(&["망원 카페", "성수 로스터리"]),
    )
    .run()
    .await;

    assert_eq!(outcome.log.errors.len(), 1);
    assert_eq!(outcome.log.errors[0].query, "망원 카페");
    assert_eq!(outcome.stores.len(), 1);
    assert_eq!(fetcher.search_calls().len(), 4);
}

#[tokio::test]
async fn collect_write_and_export() {
    let outcome = Collector::new(
        seoul_fixture(),
        test_config(&["성수 로스터리", "합정 스페셜티"]),
    )
    .run()
    .await;

    let tmp = tempfile::tempdir().unwrap();
    tables::write_collection(tmp.path(), &outcome.stores, &outcome.log).unwrap();

    let mut dataset = tables::read_dataset(tmp.path()).unwrap();
    assert!(dataset.table(TableKind::Stores).is_some());
    assert!(dataset.table(TableKind::Beans).is_none());

    dataset.insert(
        TableKind::Roasteries,
        RawTable::from_rows(&["id", "name", "logo_url", "website_url"], &[&["1", "Default", "", ""]]),
    );

    let script = RelationalExporter::default().render(&dataset).unwrap();

    // Store categories come from menus, not from the "카페" hint
    assert_eq!(script.category_distribution.get(&Category::Latte), Some(&1));
    assert_eq!(script.category_distribution.get(&Category::HandDrip), Some(&1));
    assert!(!script.sql.contains("'카페'"));

    // No dependent block before the tables it references
    let positions: Vec<(TableKind, usize)> = TableKind::EMISSION_ORDER
        .iter()
        .map(|k| (*k, script.sql.find(&format!("-- {}\n", k.title())).unwrap()))
        .collect();
    for (kind, pos) in &positions {
        for dep in kind.depends_on() {
            let dep_pos = positions.iter().find(|(k, _)| k == dep).unwrap().1;
            assert!(dep_pos < *pos, "{} before {}", kind, dep);
        }
    }
    assert!(check_dependency_order(&TableKind::EMISSION_ORDER).is_ok());
}

#[tokio::test]
async fn replay_fixtures_feed_the_collector() {
    let tmp = tempfile::tempdir().unwrap();
    let fetcher = ReplayFetcher::new(tmp.path());

    let dir = fetcher.query_dir("서울 스페셜티 커피");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("0.json"),
        serde_json::to_vec(&cafe_state(
            "1",
            "을지로 커피",
            "서울특별시 중구 을지로 1",
            &[("카푸치노", "5,000")],
        ))
        .unwrap(),
    )
    .unwrap();
    std::fs::write(dir.join("1.json"), "not json").unwrap();

    let outcome = Collector::new(fetcher, test_config(&["서울 스페셜티 커피", "없는 검색어"]))
        .run()
        .await;

    assert_eq!(outcome.stores.len(), 1);
    assert_eq!(outcome.log.queries[0].found, 2);
    assert_eq!(outcome.log.queries[1].found, 0);
    assert!(outcome.log.is_clean());
}

#[test]
fn export_empty_dataset() {
    let script = RelationalExporter::default().render(&Dataset::new()).unwrap();
    assert_eq!(script.total_rows(), 0);
    assert!(script.sql.starts_with("-- "));
}
