//! Property tests for facet reconciliation.

use std::collections::BTreeSet;

use proptest::prelude::*;

use media_asset_rs::{reconcile, FacetSet};

const POOL: &[&str] = &[
    "Picture",
    "Video",
    "HasStoryboard",
    "HasVideoPreview",
    "Audio",
    "Custom",
    "Versionable",
    "Folderish",
];

fn subset() -> impl Strategy<Value = Vec<String>> {
    prop::sample::subsequence(POOL, 0..=POOL.len())
        .prop_map(|v| v.into_iter().map(str::to_string).collect())
}

/// Universe plus a desired subset of it.
fn universe_and_desired() -> impl Strategy<Value = (Vec<String>, Vec<String>)> {
    subset().prop_flat_map(|universe| {
        let n = universe.len();
        let desired = prop::sample::subsequence(universe.clone(), 0..=n);
        (Just(universe), desired)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn reconcile_applies_exactly_the_universe(
        initial in subset(),
        (universe, desired) in universe_and_desired(),
    ) {
        let mut entity: BTreeSet<String> = initial.iter().cloned().collect();
        reconcile(&mut entity, &desired, &universe);
        for facet in POOL {
            let facet = facet.to_string();
            let expected = if universe.contains(&facet) {
                desired.contains(&facet)
            } else {
                initial.contains(&facet)
            };
            prop_assert_eq!(entity.contains(&facet), expected, "facet {}", facet);
        }
    }

    #[test]
    fn reconcile_is_idempotent(
        initial in subset(),
        (universe, desired) in universe_and_desired(),
    ) {
        let mut entity: FacetSet = initial.iter().cloned().collect();
        reconcile(&mut entity, &desired, &universe);
        let once = entity.clone();
        let delta = reconcile(&mut entity, &desired, &universe);
        prop_assert!(delta.is_empty());
        prop_assert_eq!(entity, once);
    }

    #[test]
    fn round_trip_restores_universe_membership(
        initial in subset(),
        (universe, d1) in universe_and_desired(),
        d2_mask in prop::collection::vec(any::<bool>(), POOL.len()),
    ) {
        let d2: Vec<String> = universe
            .iter()
            .zip(&d2_mask)
            .filter(|(_, keep)| **keep)
            .map(|(f, _)| f.clone())
            .collect();

        let mut entity: BTreeSet<String> = initial.iter().cloned().collect();
        reconcile(&mut entity, &d1, &universe);
        let after_d1 = entity.clone();
        reconcile(&mut entity, &d2, &universe);
        reconcile(&mut entity, &d1, &universe);
        prop_assert_eq!(entity, after_d1);
    }
}
