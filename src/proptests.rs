use std::collections::BTreeMap;

use proptest::prelude::*;
use proptest_derive::Arbitrary;

use crate::{FixedKey, NibbleMap, NumericOrder, OrderTransform};

/// Actions to run against both the map and a `BTreeMap` model.
#[derive(Arbitrary, Debug, Clone)]
enum Action {
    Insert(i32, u16),
    Remove(i32),
    Get(i32),
    Bump(i32),
    RemoveRange(i32, i32),
}

/// Test harness executing actions on both implementations.
#[derive(Default)]
struct Test {
    map: NibbleMap<i32, u16>,
    model: BTreeMap<i32, u16>,
}

impl Test {
    fn execute(&mut self, action: Action) {
        match action {
            Action::Insert(key, value) => {
                let fresh = !self.model.contains_key(&key);
                assert_eq!(
                    self.map.insert(key, value),
                    fresh,
                    "insert mismatch: key={key}"
                );
                if fresh {
                    self.model.insert(key, value);
                }
            }
            Action::Remove(key) => {
                assert_eq!(
                    self.map.remove(key),
                    self.model.remove(&key),
                    "remove mismatch: key={key}"
                );
            }
            Action::Get(key) => {
                assert_eq!(
                    self.map.get(key),
                    self.model.get(&key),
                    "get mismatch: key={key}"
                );
            }
            Action::Bump(key) => {
                let got = self.map.get_or_insert_default(key);
                *got = got.wrapping_add(1);
                let want = self.model.entry(key).or_default();
                *want = want.wrapping_add(1);
                assert_eq!(*got, *want, "bump mismatch: key={key}");
            }
            Action::RemoveRange(a, b) => {
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                let expected: Vec<i32> = self.model.range(lo..hi).map(|(k, _)| *k).collect();
                for key in &expected {
                    self.model.remove(key);
                }
                assert_eq!(
                    self.map.remove_range(lo..hi),
                    expected.len(),
                    "remove_range mismatch: {lo}..{hi}"
                );
            }
        }
    }

    fn check(&self) {
        assert_eq!(self.map.len(), self.model.len());
        let got: Vec<(i32, u16)> = self.map.iter().map(|(k, v)| (k, *v)).collect();
        let want: Vec<(i32, u16)> = self.model.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(got, want);

        let got_rev: Vec<i32> = self.map.keys().rev().collect();
        let want_rev: Vec<i32> = self.model.keys().rev().copied().collect();
        assert_eq!(got_rev, want_rev);
    }
}

/// Narrow-key actions: a `u8` key space is two trie levels deep and collides
/// constantly, which stresses block pruning and the carry walks.
#[derive(Arbitrary, Debug, Clone)]
enum NarrowAction {
    Insert(u8, u8),
    Remove(u8),
    LowerBound(u8),
    UpperBound(u8),
}

#[derive(Default)]
struct NarrowTest {
    map: NibbleMap<u8, u8>,
    model: BTreeMap<u8, u8>,
}

impl NarrowTest {
    fn execute(&mut self, action: NarrowAction) {
        match action {
            NarrowAction::Insert(key, value) => {
                let fresh = !self.model.contains_key(&key);
                assert_eq!(self.map.insert(key, value), fresh);
                if fresh {
                    self.model.insert(key, value);
                }
            }
            NarrowAction::Remove(key) => {
                assert_eq!(self.map.remove(key), self.model.remove(&key));
            }
            NarrowAction::LowerBound(key) => {
                let want = self.model.range(key..).next().map(|(k, _)| *k);
                assert_eq!(self.map.lower_bound(key).key(), want);
            }
            NarrowAction::UpperBound(key) => {
                let want = self
                    .model
                    .range((std::ops::Bound::Excluded(key), std::ops::Bound::Unbounded))
                    .next()
                    .map(|(k, _)| *k);
                assert_eq!(self.map.upper_bound(key).key(), want);
            }
        }
    }

    fn check(&self) {
        assert_eq!(self.map.len(), self.model.len());
        let got: Vec<(u8, u8)> = self.map.iter().map(|(k, v)| (k, *v)).collect();
        let want: Vec<(u8, u8)> = self.model.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(got, want);
    }
}

/// Key image with the most significant byte first, so plain lexicographic
/// comparison reflects the map's iteration order.
fn image_i64(key: i64) -> [u8; 8] {
    let mut bytes = [0u8; 8];
    NumericOrder::apply(key).write_bytes(&mut bytes);
    bytes.reverse();
    bytes
}

fn image_f64(key: f64) -> [u8; 8] {
    let mut bytes = [0u8; 8];
    NumericOrder::apply(key).write_bytes(&mut bytes);
    bytes.reverse();
    bytes
}

proptest! {
    #[test]
    fn matches_btreemap_i32(actions in prop::collection::vec(any::<Action>(), 1..64)) {
        let mut test = Test::default();
        for action in actions {
            test.execute(action);
        }
        test.check();
    }

    #[test]
    fn matches_btreemap_u8(actions in prop::collection::vec(any::<NarrowAction>(), 1..256)) {
        let mut test = NarrowTest::default();
        for action in actions {
            test.execute(action);
        }
        test.check();
    }

    #[test]
    fn numeric_order_roundtrip_i64(key in any::<i64>()) {
        prop_assert_eq!(NumericOrder::restore(NumericOrder::apply(key)), key);
    }

    #[test]
    fn numeric_order_roundtrip_f64(key in any::<f64>()) {
        let back = NumericOrder::restore(NumericOrder::apply(key));
        prop_assert_eq!(back.to_bits(), key.to_bits());
    }

    #[test]
    fn numeric_order_monotone_i64(a in any::<i64>(), b in any::<i64>()) {
        prop_assert_eq!(a.cmp(&b), image_i64(a).cmp(&image_i64(b)));
    }

    #[test]
    fn numeric_order_monotone_f64(a in any::<f64>(), b in any::<f64>()) {
        prop_assume!(!a.is_nan() && !b.is_nan());
        if a < b {
            prop_assert!(image_f64(a) < image_f64(b));
        }
        if a == b && a.to_bits() == b.to_bits() {
            prop_assert_eq!(image_f64(a), image_f64(b));
        }
    }
}
