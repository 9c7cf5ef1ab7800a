mod common;

use common::{i64s, some_strs, strs};
use tidyframe::expr::{mean, starts_with};
use tidyframe::{DataFrame, JoinOptions, PivotLongerOptions, PivotWiderOptions, Series};

#[test]
fn full_join_keeps_both_sides() {
    let df1 = DataFrame::new(vec![
        Series::utf8("x", ["a", "a", "b"]),
        Series::int64("y", [0_i64, 1, 2]),
    ])
    .unwrap();
    let df2 = DataFrame::new(vec![Series::utf8("x", ["a"]), Series::int64("z", [0_i64])]).unwrap();
    let out = df1.full_join(&df2, &JoinOptions::new()).unwrap();
    assert_eq!(i64s(&out, "y"), vec![Some(0), Some(1), Some(2)]);
    assert_eq!(strs(&out, "x"), some_strs(&["a", "a", "b"]));
    assert_eq!(i64s(&out, "z"), vec![Some(0), Some(0), None]);
}

#[test]
fn summary_joined_back_to_rows() {
    let df = DataFrame::new(vec![
        Series::utf8("g", ["a", "b", "a", "b", "c"]),
        Series::int64("v", [1_i64, 2, 3, 6, 5]),
    ])
    .unwrap();
    let means = df
        .group_by(["g"])
        .unwrap()
        .summarize([mean("v").alias("m")])
        .unwrap();
    let out = df.left_join(&means, &JoinOptions::new().on(["g"])).unwrap();
    assert_eq!(out.names(), vec!["g", "v", "m"]);
    assert_eq!(
        out.column("m").unwrap().f64_values().unwrap(),
        vec![Some(2.0), Some(4.0), Some(2.0), Some(4.0), Some(5.0)]
    );
}

#[test]
fn pivot_wider_then_longer_round_trips() {
    let long = DataFrame::new(vec![
        Series::int64("id", [1_i64, 1, 2, 2]),
        Series::utf8("metric", ["m_a", "m_b", "m_a", "m_b"]),
        Series::int64("value", [10_i64, 20, 30, 40]),
    ])
    .unwrap();
    let wide = long
        .pivot_wider(&PivotWiderOptions::new("metric", "value"))
        .unwrap();
    assert_eq!(wide.names(), vec!["id", "m_a", "m_b"]);
    assert_eq!(i64s(&wide, "m_b"), vec![Some(20), Some(40)]);

    let back = wide
        .pivot_longer(
            &PivotLongerOptions::new()
                .cols([starts_with("m_", false)])
                .names_to("metric"),
        )
        .unwrap()
        .arrange(["id", "metric"])
        .unwrap();
    assert_eq!(back, long);
}

#[test]
fn pivot_wider_honours_explicit_ids_and_fill() {
    let long = DataFrame::new(vec![
        Series::utf8("site", ["n", "n", "s"]),
        Series::int64("year", [2020_i64, 2021, 2020]),
        Series::int64("count", [1_i64, 2, 3]),
        Series::utf8("note", ["p", "q", "r"]),
    ])
    .unwrap();
    let wide = long
        .pivot_wider(
            &PivotWiderOptions::new("year", "count")
                .id_cols(["site"])
                .values_fill(0_i64),
        )
        .unwrap();
    assert_eq!(wide.names(), vec!["site", "2020", "2021"]);
    assert_eq!(i64s(&wide, "2021"), vec![Some(2), Some(0)]);

    let summed = long
        .pivot_wider(
            &PivotWiderOptions::new("site", "count")
                .id_cols(Vec::<String>::new())
                .values_fn("sum"),
        )
        .unwrap();
    assert_eq!(summed.height(), 1);
    assert_eq!(i64s(&summed, "n"), vec![Some(3)]);
}
