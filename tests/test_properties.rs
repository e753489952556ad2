//! Property-based tests for the verb invariants.

use plyframes::prelude::*;
use proptest::prelude::*;
use std::collections::BTreeMap;

// =========================================================================
// Strategies
// =========================================================================

/// A frame with a low-cardinality string key `k`, an integer key `g`, an
/// integer value `v` and a float `w`.
fn arb_frame() -> impl Strategy<Value = DataFrame> {
    (0usize..40).prop_flat_map(|n| {
        (
            prop::collection::vec("[a-d]", n),
            prop::collection::vec(0i64..3, n),
            prop::collection::vec(-100i64..100, n),
            prop::collection::vec(-1000i32..1000, n),
        )
            .prop_map(|(k, g, v, w)| {
                DataFrame::new(vec![
                    ("k".to_string(), Series::from(k)),
                    ("g".to_string(), Series::from(g)),
                    ("v".to_string(), Series::from(v)),
                    (
                        "w".to_string(),
                        Series::from(w.into_iter().map(|x| f64::from(x) / 4.0).collect::<Vec<_>>()),
                    ),
                ])
                .unwrap()
            })
    })
}

fn arb_keys() -> impl Strategy<Value = Vec<&'static str>> {
    prop_oneof![Just(vec!["k"]), Just(vec!["g"]), Just(vec!["k", "g"]), Just(vec!["g", "k"])]
}

fn dispatcher() -> Dispatcher {
    Dispatcher::new(Options::default())
}

fn run(data: &mut Dataset, verb: Verb) -> Dataset {
    dispatcher().apply(data, &verb).unwrap().into_dataset().unwrap()
}

fn key_tuples(frame: &DataFrame, keys: &[&str]) -> Vec<Vec<Value>> {
    (0..frame.len())
        .map(|row| {
            keys.iter()
                .map(|k| frame.column(k).unwrap().get(row).unwrap())
                .collect()
        })
        .collect()
}

proptest! {
    #[test]
    fn ungroup_restores_content(df in arb_frame(), keys in arb_keys()) {
        let mut data = Dataset::from(df.clone());
        let mut grouped = run(&mut data, group_by(keys, vec![]));
        let plain = run(&mut grouped, ungroup());
        prop_assert!(!plain.is_grouped());
        prop_assert_eq!(plain.frame(), &df);
    }

    #[test]
    fn select_is_idempotent(df in arb_frame(), names in prop::sample::subsequence(vec!["k", "g", "v", "w"], 0..4)) {
        let mut data = Dataset::from(df);
        let mut once = run(&mut data, select(Select::new().names(names.clone())));
        let twice = run(&mut once, select(Select::new().names(names)));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn group_indices_follow_key_order(df in arb_frame(), keys in arb_keys()) {
        let mut data = Dataset::from(df.clone());
        let labels = dispatcher()
            .apply(&mut data, &group_indices(keys.clone(), vec![]))
            .unwrap()
            .into_indices()
            .unwrap();

        let tuples = key_tuples(&df, &keys);
        let mut label_of: BTreeMap<&Vec<Value>, usize> = BTreeMap::new();
        for (tuple, &label) in tuples.iter().zip(&labels) {
            let seen = *label_of.entry(tuple).or_insert(label);
            prop_assert_eq!(seen, label);
        }
        let ordered: Vec<usize> = label_of.values().copied().collect();
        let expected: Vec<usize> = (0..label_of.len()).collect();
        prop_assert_eq!(ordered, expected);
    }

    #[test]
    fn grouped_summarize_has_one_row_per_group(df in arb_frame(), keys in arb_keys()) {
        let mut data = Dataset::from(df.clone()).group_by(&keys).unwrap();
        let out = run(&mut data, summarize([("n", "{n}"), ("total", "sum(v)")]));
        let frame = out.frame();

        let mut groups: BTreeMap<Vec<Value>, (i64, i64)> = BTreeMap::new();
        let values = df.column("v").unwrap();
        for (row, tuple) in key_tuples(&df, &keys).into_iter().enumerate() {
            let entry = groups.entry(tuple).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += values.get(row).and_then(|v| v.as_i64()).unwrap();
        }

        prop_assert_eq!(frame.len(), groups.len());
        for (row, (tuple, (count, total))) in groups.into_iter().enumerate() {
            let got: Vec<Value> = keys.iter().map(|k| frame.column(k).unwrap().get(row).unwrap()).collect();
            prop_assert_eq!(got, tuple);
            prop_assert_eq!(frame.column("n").unwrap().get(row), Some(Value::Int(count)));
            prop_assert_eq!(frame.column("total").unwrap().get(row), Some(Value::Int(total)));
        }
    }

    #[test]
    fn mutate_does_not_cascade(df in arb_frame()) {
        let mut data = Dataset::from(df.clone());
        let out = run(&mut data, mutate([("v", "g"), ("g", "v")]));
        prop_assert_eq!(out.frame().column("v").unwrap(), df.column("g").unwrap());
        prop_assert_eq!(out.frame().column("g").unwrap(), df.column("v").unwrap());
    }

    #[test]
    fn arrange_is_a_stable_permutation(df in arb_frame()) {
        let mut data = Dataset::from(df.clone());
        let out = run(&mut data, arrange(["g"]));
        let frame = out.frame();

        let mut labels = frame.index().to_vec();
        labels.sort_unstable();
        prop_assert_eq!(labels, df.index().to_vec());

        let g = frame.column("g").unwrap();
        for row in 1..frame.len() {
            let (prev, cur) = (g.get(row - 1).unwrap(), g.get(row).unwrap());
            prop_assert!(prev <= cur);
            if prev == cur {
                prop_assert!(frame.index()[row - 1] < frame.index()[row]);
            }
        }
    }

    #[test]
    fn drop_removes_unmatched_group_keys(df in arb_frame()) {
        let mut data = Dataset::from(df).group_by(&["g"]).unwrap();
        let out = run(&mut data, select(Select::new().startswith("k").drop(true)));
        prop_assert!(!out.frame().has_column("g"));
        prop_assert!(!out.frame().has_column("k"));
        prop_assert!(!out.is_grouped());
    }

    #[test]
    fn do_backfills_missing_keys_only(df in arb_frame()) {
        let mut data = Dataset::from(df.clone()).group_by(&["k"]).unwrap();
        let out = run(&mut data, do_single(|part| {
            let mut frame = part.select(&["v".to_string()])?.head(2);
            frame.reset_index();
            Ok(frame)
        }));

        let mut expected_rows = 0;
        for rows in df.group_rows(&["k".to_string()]).unwrap().values() {
            expected_rows += rows.len().min(2);
        }
        prop_assert_eq!(out.len(), expected_rows);
        prop_assert_eq!(out.groups(), &["k".to_string()]);
        if expected_rows > 0 {
            prop_assert_eq!(out.frame().columns(), &["k".to_string(), "v".to_string()]);
        }
    }

    #[test]
    fn copy_mode_never_mutates_input(df in arb_frame()) {
        let mut data = Dataset::from(df.clone());
        let verbs = [
            mutate([("v", "v * 2")]),
            rename([("k", "key")]),
            group_by(["g"], vec![named("h", "v > 0")]),
            distinct(Distinct::new().new_column("m", "g % 2").columns(["m"])),
        ];
        for verb in &verbs {
            dispatcher().apply(&mut data, verb).unwrap();
            prop_assert_eq!(data.frame(), &df);
            prop_assert!(!data.is_grouped());
        }
    }
}
