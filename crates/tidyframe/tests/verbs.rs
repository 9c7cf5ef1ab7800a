mod common;

use common::{f64s, i64s, init_test_tracing, some_strs, strs};
use tidyframe::expr::{case_when, col, cols, desc, lag, lead, lit, n, row_number, str_c, RoundUnit};
use tidyframe::{DataFrame, Expr, FillDirection, Scalar, Series};

fn df() -> DataFrame {
    DataFrame::new(vec![
        Series::int64("x", [0_i64, 1, 2]),
        Series::utf8("y", ["a", "a", "b"]),
    ])
    .unwrap()
}

#[test]
fn lag_and_lead_shift_rows() {
    init_test_tracing();
    let out = df()
        .mutate([
            lag("x", 1, None).alias("prev"),
            lag("x", 1, Some(Scalar::Int64(1))).alias("prev_or_one"),
            lead("x", 1, None).alias("next"),
        ])
        .unwrap();
    assert_eq!(i64s(&out, "prev"), vec![None, Some(0), Some(1)]);
    assert_eq!(i64s(&out, "prev_or_one"), vec![Some(1), Some(0), Some(1)]);
    assert_eq!(i64s(&out, "next"), vec![Some(1), Some(2), None]);
}

#[test]
fn lag_then_lead_restores_all_but_the_boundary() {
    let out = df()
        .mutate([lead(lag("x", 1, None), 1, None).alias("ll")])
        .unwrap();
    assert_eq!(i64s(&out, "ll"), vec![Some(0), Some(1), None]);
}

#[test]
fn extreme_offsets_leave_every_row_vacant() {
    let out = df()
        .mutate([
            lag("x", i64::MIN, None).alias("lag_min"),
            lead("x", i64::MIN, None).alias("lead_min"),
            lag("x", i64::MAX, Some(Scalar::Int64(7))).alias("lag_max"),
        ])
        .unwrap();
    assert_eq!(i64s(&out, "lag_min"), vec![None, None, None]);
    assert_eq!(i64s(&out, "lead_min"), vec![None, None, None]);
    assert_eq!(i64s(&out, "lag_max"), vec![Some(7); 3]);
}

#[test]
fn select_then_select_back_is_identity() {
    let input = df();
    let swapped = input.select(["y", "x"]).unwrap();
    assert_eq!(swapped.names(), vec!["y", "x"]);
    assert_eq!(swapped.select(["x", "y"]).unwrap(), input);
}

#[test]
fn dates_round_down_to_buckets() {
    let df = DataFrame::new(vec![Series::utf8("d", ["2021-08-19", "2021-01-31"])]).unwrap();
    let out = df
        .mutate([
            col("d").as_date(None).dt_round(RoundUnit::Month, 1).mday().alias("mday"),
            col("d").as_date(None).dt_round(RoundUnit::Week, 1).wday().alias("wday"),
        ])
        .unwrap();
    assert_eq!(i64s(&out, "mday"), vec![Some(1), Some(1)]);
    // Weeks start on Monday (wday 2 with Sunday = 1).
    assert_eq!(i64s(&out, "wday"), vec![Some(2), Some(2)]);
}

#[test]
fn case_when_picks_first_true_branch() {
    let out = df()
        .mutate([case_when(col("x").eq(1)).then(1).otherwise(0).alias("flag")])
        .unwrap();
    assert_eq!(i64s(&out, "flag"), vec![Some(0), Some(1), Some(0)]);

    let unmatched = df()
        .mutate([Expr::from(case_when(col("x").gt(5)).then("big")).alias("size")])
        .unwrap();
    assert_eq!(strs(&unmatched, "size"), vec![None, None, None]);
}

#[test]
fn strings_in_operator_position_are_literals() {
    let out = df().filter([col("y").eq("a")]).unwrap();
    assert_eq!(i64s(&out, "x"), vec![Some(0), Some(1)]);
    let out = df().select(["y"]).unwrap();
    assert_eq!(out.names(), vec!["y"]);
}

#[test]
fn verbs_chain_without_mutating_inputs() {
    let input = df();
    let out = input
        .mutate([col("x").mul(10).alias("z")])
        .unwrap()
        .filter([col("z").ge(10)])
        .unwrap()
        .arrange([desc("z")])
        .unwrap()
        .select([cols(["y", "z"])])
        .unwrap();
    assert_eq!(out.names(), vec!["y", "z"]);
    assert_eq!(i64s(&out, "z"), vec![Some(20), Some(10)]);
    assert_eq!(input.names(), vec!["x", "y"]);
    assert_eq!(input.height(), 3);
}

#[test]
fn window_context_functions() {
    let out = df()
        .mutate([row_number().alias("r"), n().alias("rows"), col("x").sum().alias("total")])
        .unwrap();
    assert_eq!(i64s(&out, "r"), vec![Some(1), Some(2), Some(3)]);
    assert_eq!(i64s(&out, "rows"), vec![Some(3); 3]);
    assert_eq!(i64s(&out, "total"), vec![Some(3); 3]);
    assert_eq!(
        df().summarize([lit(1_i64).sum().alias("s")]).unwrap().get_row(0).unwrap(),
        vec![Scalar::Int64(3)]
    );
}

#[test]
fn string_helpers() {
    let out = df()
        .mutate([
            col("y").str_to_upper().alias("up"),
            str_c([col("y"), col("x")], "-").alias("label"),
            col("y").str_detect("b", false).alias("is_b"),
        ])
        .unwrap();
    assert_eq!(strs(&out, "up"), some_strs(&["A", "A", "B"]));
    assert_eq!(strs(&out, "label"), some_strs(&["a-0", "a-1", "b-2"]));
    assert_eq!(
        out.column("is_b").unwrap().bool_values().unwrap(),
        vec![Some(false), Some(false), Some(true)]
    );
}

#[test]
fn arithmetic_promotes_and_propagates_nulls() {
    let df = DataFrame::new(vec![
        Series::int64("a", [Some(1_i64), None, Some(3)]),
        Series::float64("b", [0.5, 0.5, 0.5]),
    ])
    .unwrap();
    let out = df.mutate([col("a").add(col("b")).alias("c")]).unwrap();
    assert_eq!(f64s(&out, "c"), vec![Some(1.5), None, Some(3.5)]);
}

#[test]
fn fill_and_tidy_helpers() {
    let df = DataFrame::new(vec![
        Series::utf8("g", [Some("a"), None, Some("b"), None]),
        Series::int64("v", [1_i64, 2, 3, 4]),
    ])
    .unwrap();
    let filled = df.fill(["g"], FillDirection::Down).unwrap();
    assert_eq!(strs(&filled, "g"), some_strs(&["a", "a", "b", "b"]));
    let united = filled.unite("gv", ["g", "v"], "_", false).unwrap();
    assert_eq!(united.names(), vec!["gv", "g", "v"]);
    assert_eq!(strs(&united, "gv"), some_strs(&["a_1", "a_2", "b_3", "b_4"]));
    let counts = filled.count(["g"], true, Some("rows")).unwrap();
    assert_eq!(i64s(&counts, "rows"), vec![Some(2), Some(2)]);
}

#[test]
fn bind_rows_and_cols() {
    let stacked = DataFrame::bind_rows([&df(), &df()]).unwrap();
    assert_eq!(stacked.height(), 6);
    let other = DataFrame::new(vec![Series::float64("w", [0.0, 1.0, 2.0])]).unwrap();
    let wide = DataFrame::bind_cols([&df(), &other]).unwrap();
    assert_eq!(wide.names(), vec!["x", "y", "w"]);
}
