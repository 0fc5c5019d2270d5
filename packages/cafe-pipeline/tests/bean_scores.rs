//! Bean score export from CSV inputs.

use cafe_pipeline::pipeline::export::bean_scores;
use cafe_pipeline::{tables, ExportError, RoastLevel};

fn write(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn bean_scores_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let scores = write(
        tmp.path(),
        "scores.csv",
        "bean_id,acidity,body,aroma,flavor,aftertaste,rating\n\
         1,7.6,5.4,8.1,7.9,7.2,8.6\n\
         2,4.0,7.5,6.0,6.2,5.8,7.1\n",
    );
    let beans = write(
        tmp.path(),
        "beans.csv",
        "id,roastery_id,name,roasting_level\n1,1,Yirgacheffe,LIGHT\n2,1,Dark Blend,HEAVY\n",
    );
    let flavors = write(
        tmp.path(),
        "bean_flavor_notes.csv",
        "bean_id,flavor_id\n1,801\n1,80103\n1,80104\n2,50303\n2,503\n2,40201\n",
    );

    let index = bean_scores::bean_index(
        tables::read_bean_roasts(&beans).unwrap(),
        tables::read_flavor_notes(&flavors).unwrap(),
    );
    let prepared = bean_scores::prepare(&tables::read_source_scores(&scores).unwrap(), &index).unwrap();

    assert_eq!(prepared[0].sweetness, 9);
    assert_eq!(prepared[0].bitterness, 2);
    assert_eq!(prepared[0].roast_level, RoastLevel::Light);
    assert_eq!(prepared[1].sweetness, 3);
    assert_eq!(prepared[1].bitterness, 10);

    let out = tmp.path().join(tables::BEAN_SCORES_CSV);
    tables::write_bean_scores(&out, &prepared).unwrap();
    let table = tables::read_table(&out).unwrap();
    assert_eq!(table.len(), 2);
    let tags = table.column_index("flavor_tags").unwrap();
    assert_eq!(table.cell(0, tags), "[801, 80103, 80104]");
    let source = table.column_index("data_source").unwrap();
    assert_eq!(table.cell(1, source), "EXTERNAL_CSV");

    let sql = bean_scores::render_insert(&prepared);
    assert!(sql.contains("'LIGHT', 'EXTERNAL_CSV', 0.9)"));
    assert!(sql.contains("updated_at = CURRENT_TIMESTAMP;"));
}

#[test]
fn bean_scores_reject_bad_source_rows() {
    let tmp = tempfile::tempdir().unwrap();
    let scores = write(
        tmp.path(),
        "scores.csv",
        "bean_id,acidity,body,aroma,flavor,aftertaste,rating\n1,0.2,5,5,5,5,5\n2,5,5,11,5,5,5\n3,5,5,12,5,5,5\n",
    );

    let sources = tables::read_source_scores(&scores).unwrap();
    let err = bean_scores::prepare(&sources, &Default::default()).unwrap_err();

    match err {
        ExportError::DataQuality(violations) => {
            let summary: Vec<_> = violations.iter().map(|v| (v.column.as_str(), v.rows)).collect();
            assert_eq!(summary, vec![("acidity", 1), ("aroma", 2)]);
        }
        other => panic!("unexpected error: {}", other),
    }
}
