mod common;

use std::collections::HashMap;

use common::{f64s, i64s, some_strs, strs};
use tidyframe::expr::{col, mean, n, n_distinct, quantile, sum};
use tidyframe::{DType, DataFrame, Scalar, Series};

fn df() -> DataFrame {
    DataFrame::new(vec![
        Series::utf8("g", ["x", "x", "y", "y", "y"]),
        Series::int64("v", [Some(10_i64), None, Some(3), Some(7), None]),
    ])
    .unwrap()
}

fn by_group<T: Clone>(out: &DataFrame, values: Vec<Option<T>>) -> HashMap<String, Option<T>> {
    strs(out, "g")
        .into_iter()
        .map(|k| k.unwrap_or_default())
        .zip(values)
        .collect()
}

#[test]
fn grouped_summaries_skip_nulls() {
    let out = df()
        .group_by(["g"])
        .unwrap()
        .summarize([
            col("v").sum().alias("sum_v"),
            col("v").mean().alias("mean_v"),
            col("v").min().alias("min_v"),
            col("v").max().alias("max_v"),
            col("v").count().alias("cnt_v"),
            n().alias("rows"),
        ])
        .unwrap();
    assert_eq!(
        out.names(),
        vec!["g", "sum_v", "mean_v", "min_v", "max_v", "cnt_v", "rows"]
    );
    assert_eq!(out.column("mean_v").unwrap().dtype(), DType::Float64);
    assert_eq!(out.column("cnt_v").unwrap().dtype(), DType::Int64);

    let sums = by_group(&out, i64s(&out, "sum_v"));
    let means = by_group(&out, f64s(&out, "mean_v"));
    let counts = by_group(&out, i64s(&out, "cnt_v"));
    let rows = by_group(&out, i64s(&out, "rows"));
    assert_eq!(sums["x"], Some(10));
    assert_eq!(sums["y"], Some(10));
    assert_eq!(means["y"], Some(5.0));
    assert_eq!(counts["y"], Some(2));
    assert_eq!(rows["y"], Some(3));
}

#[test]
fn group_mean_matches_expected_partitions() {
    let df = DataFrame::new(vec![
        Series::int64("x", [0_i64, 1, 2]),
        Series::utf8("y", ["a", "a", "b"]),
    ])
    .unwrap();
    let out = df
        .group_by(["y"])
        .unwrap()
        .summarize([mean("x").alias("avg")])
        .unwrap();
    assert_eq!(strs(&out, "y"), some_strs(&["a", "b"]));
    assert_eq!(f64s(&out, "avg"), vec![Some(0.5), Some(2.0)]);
}

#[test]
fn all_null_group_sums_to_zero_and_means_to_null() {
    let df = DataFrame::new(vec![
        Series::utf8("g", ["a", "b"]),
        Series::int64("v", [None, Some(1_i64)]),
    ])
    .unwrap();
    let out = df
        .group_by(["g"])
        .unwrap()
        .summarize([sum("v").alias("s"), mean("v").alias("m")])
        .unwrap();
    assert_eq!(i64s(&out, "s"), vec![Some(0), Some(1)]);
    assert_eq!(f64s(&out, "m"), vec![None, Some(1.0)]);
}

#[test]
fn null_keys_form_their_own_group() {
    let df = DataFrame::new(vec![
        Series::utf8("g", [Some("a"), None, Some("a"), None]),
        Series::int64("v", [1_i64, 2, 3, 4]),
    ])
    .unwrap();
    let out = df.group_by(["g"]).unwrap().summarize([sum("v")]).unwrap();
    assert_eq!(strs(&out, "g"), vec![Some("a".to_string()), None]);
    assert_eq!(i64s(&out, "v"), vec![Some(4), Some(6)]);
}

#[test]
fn many_groups_match_sequential_reference() {
    let keys: Vec<i64> = (0..1000).map(|i| i % 97).collect();
    let values: Vec<i64> = (0..1000).collect();
    let df = DataFrame::new(vec![
        Series::int64("k", keys.iter().copied()),
        Series::int64("v", values.iter().copied()),
    ])
    .unwrap();
    let grouped = df.group_by(["k"]).unwrap();
    assert_eq!(grouped.n_groups(), 97);
    let out = grouped
        .summarize([sum("v").alias("s"), n_distinct("v").alias("d")])
        .unwrap();
    for (key, total) in i64s(&out, "k").into_iter().zip(i64s(&out, "s")) {
        let key = key.unwrap();
        let expected: i64 = values.iter().filter(|v| *v % 97 == key).sum();
        assert_eq!(total, Some(expected));
    }

    let ranked = grouped.mutate([col("v").sub(col("v").min()).alias("offset")]).unwrap();
    assert_eq!(i64s(&ranked, "v"), values.iter().map(|v| Some(*v)).collect::<Vec<_>>());
    assert_eq!(i64s(&ranked, "offset")[100], Some(97));
}

#[test]
fn quantile_and_rejections() {
    let out = df().summarize([quantile("v", 0.5).alias("q")]).unwrap();
    assert_eq!(out.get_row(0).unwrap(), vec![Scalar::Float64(7.0)]);
    assert!(df().summarize([quantile("v", 2.0)]).is_err());
    assert!(df().summarize([col("v")]).is_err());
}
