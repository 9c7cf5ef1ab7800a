mod common;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use common::{f64s, i64s, strs};
use proptest::prelude::*;
use tidyframe::expr::{desc, lag, lead, mean, starts_with};
use tidyframe::{DataFrame, JoinOptions, PivotLongerOptions, PivotWiderOptions, Series};

fn keyed(keys: &[i64], values: &[i64]) -> DataFrame {
    DataFrame::new(vec![
        Series::int64("k", keys.iter().copied()),
        Series::int64("v", values.iter().copied()),
    ])
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn arrange_is_a_stable_sort(keys in prop::collection::vec(0_i64..5, 0..40)) {
        let rows: Vec<i64> = (0..keys.len() as i64).collect();
        let df = keyed(&keys, &rows);

        let mut expected: Vec<(i64, i64)> = keys.iter().copied().zip(rows.iter().copied()).collect();
        expected.sort_by_key(|(k, _)| *k);
        let out = df.arrange(["k"]).unwrap();
        let got: Vec<(i64, i64)> = i64s(&out, "k")
            .into_iter()
            .zip(i64s(&out, "v"))
            .map(|(k, v)| (k.unwrap(), v.unwrap()))
            .collect();
        prop_assert_eq!(got, expected.clone());

        expected.sort_by_key(|(k, _)| std::cmp::Reverse(*k));
        let down = df.arrange([desc("k")]).unwrap();
        prop_assert_eq!(
            i64s(&down, "v").into_iter().map(Option::unwrap).collect::<Vec<_>>(),
            expected.iter().map(|(_, v)| *v).collect::<Vec<_>>()
        );
    }

    #[test]
    fn inner_join_cardinality(
        left in prop::collection::vec(0_i64..4, 0..20),
        right in prop::collection::vec(0_i64..4, 0..20),
    ) {
        let a = keyed(&left, &left);
        let b = DataFrame::new(vec![Series::int64("k", right.iter().copied())]).unwrap();
        let out = a.inner_join(&b, &JoinOptions::new().on(["k"])).unwrap();

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for k in &right {
            *counts.entry(*k).or_default() += 1;
        }
        let expected: usize = left.iter().map(|k| counts.get(k).copied().unwrap_or(0)).sum();
        prop_assert_eq!(out.height(), expected);

        let full = a.full_join(&b, &JoinOptions::new().on(["k"])).unwrap();
        let unmatched_right = right.iter().filter(|k| !left.contains(k)).count();
        let unmatched_left = left.iter().filter(|k| !right.contains(k)).count();
        prop_assert_eq!(full.height(), expected + unmatched_left + unmatched_right);
    }

    #[test]
    fn group_mean_equals_brute_force(
        rows in prop::collection::vec((0_i64..5, -100_i64..100), 1..60),
    ) {
        let (keys, values): (Vec<i64>, Vec<i64>) = rows.iter().copied().unzip();
        let df = keyed(&keys, &values);
        let means = df.group_by(["k"]).unwrap().summarize([mean("v").alias("m")]).unwrap();
        let joined = df.left_join(&means, &JoinOptions::new()).unwrap();

        for ((k, _), m) in rows.iter().zip(f64s(&joined, "m")) {
            let members: Vec<i64> = rows.iter().filter(|(kk, _)| kk == k).map(|(_, v)| *v).collect();
            let expected = members.iter().sum::<i64>() as f64 / members.len() as f64;
            prop_assert!((m.unwrap() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn pivot_round_trip(
        cells in prop::collection::btree_map((0_i64..6, 0_usize..4), -50_i64..50, 1..16),
    ) {
        let ids: Vec<i64> = cells.keys().map(|(id, _)| *id).collect();
        let names: Vec<String> = cells.keys().map(|(_, n)| format!("c{n}")).collect();
        let values: Vec<i64> = cells.values().copied().collect();
        let long = DataFrame::new(vec![
            Series::int64("id", ids.iter().copied()),
            Series::utf8("name", names.iter().map(String::as_str)),
            Series::int64("value", values.iter().copied()),
        ])
        .unwrap();

        let wide = long.pivot_wider(&PivotWiderOptions::new("name", "value")).unwrap();
        let distinct_ids: BTreeSet<i64> = ids.iter().copied().collect();
        prop_assert_eq!(wide.height(), distinct_ids.len());

        let back = wide
            .pivot_longer(&PivotLongerOptions::new().cols([starts_with("c", false)]))
            .unwrap()
            .drop_null(["value"])
            .unwrap();
        let triples: BTreeMap<(i64, String), i64> = i64s(&back, "id")
            .into_iter()
            .zip(strs(&back, "name"))
            .zip(i64s(&back, "value"))
            .map(|((id, name), value)| ((id.unwrap(), name.unwrap()), value.unwrap()))
            .collect();
        let expected: BTreeMap<(i64, String), i64> = cells
            .iter()
            .map(|((id, n), v)| ((*id, format!("c{n}")), *v))
            .collect();
        prop_assert_eq!(triples, expected);
    }

    #[test]
    fn lag_then_lead_restores_interior_rows(
        values in prop::collection::vec(-50_i64..50, 0..30),
        k in 0_i64..6,
    ) {
        let df = keyed(&vec![0; values.len()], &values);
        let out = df.mutate([lead(lag("v", k, None), k, None).alias("back")]).unwrap();
        let boundary = values.len().saturating_sub(k as usize);
        for (row, got) in i64s(&out, "back").into_iter().enumerate() {
            if row < boundary {
                prop_assert_eq!(got, Some(values[row]));
            } else {
                prop_assert_eq!(got, None);
            }
        }
    }

    #[test]
    fn grouped_lag_matches_per_key_scan(
        rows in prop::collection::vec((0_i64..4, -50_i64..50), 0..40),
    ) {
        let (keys, values): (Vec<i64>, Vec<i64>) = rows.iter().copied().unzip();
        let df = keyed(&keys, &values);
        let out = df.group_by(["k"]).unwrap().mutate([lag("v", 1, None).alias("prev")]).unwrap();

        let mut last: HashMap<i64, i64> = HashMap::new();
        let expected: Vec<Option<i64>> = rows
            .iter()
            .map(|(k, v)| last.insert(*k, *v))
            .collect();
        prop_assert_eq!(i64s(&out, "v"), values.iter().copied().map(Some).collect::<Vec<_>>());
        prop_assert_eq!(i64s(&out, "prev"), expected);
    }
}
