//! Model-based checks that drive an [`AvlTree`] and a standard-library collection with the same
//! operations and compare the results.

use std::{cmp::Ordering, collections::BTreeMap};

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::{AvlTree, Compare};

/// A stored element: `key` orders it, `stamp` records which operation inserted it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Stamped {
    pub key: u32,
    pub stamp: usize,
}

/// Orders [`Stamped`] elements by key alone, so re-inserting a key replaces its stamp.
#[derive(Copy, Clone, Debug, Default)]
pub struct ByKey;

impl Compare<Stamped> for ByKey {
    fn compare(&self, a: &Stamped, b: &Stamped) -> Ordering {
        a.key.cmp(&b.key)
    }
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Get(ItemValue),
    Erase(ItemValue),
    First,
    PopFirst,
    Last,
    PopLast,
}

impl Op {
    /// Resolves `Index` values against the keys currently stored, so that lookups and erases
    /// mostly hit.
    fn finalize(self, keys: &BTreeMap<u32, usize>) -> FinalOp {
        fn get_value(keys: &BTreeMap<u32, usize>, i: ItemValue) -> u32 {
            match i {
                ItemValue::Index(idx) => match keys.keys().nth(idx % keys.len().max(1)) {
                    Some(&key) => key,
                    None => idx as u32,
                },
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(keys, item)),
            Op::Get(item) => FinalOp::Get(get_value(keys, item)),
            Op::Erase(item) => FinalOp::Erase(get_value(keys, item)),
            Op::First => FinalOp::First,
            Op::PopFirst => FinalOp::PopFirst,
            Op::Last => FinalOp::Last,
            Op::PopLast => FinalOp::PopLast,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32),
    Get(u32),
    Erase(u32),
    First,
    PopFirst,
    Last,
    PopLast,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Insert),
        value_strategy().prop_map(Op::Get),
        value_strategy().prop_map(Op::Erase),
        Just(Op::First),
        Just(Op::PopFirst),
        Just(Op::Last),
        Just(Op::PopLast),
    ]
}

fn probe(key: u32) -> Stamped {
    Stamped { key, stamp: 0 }
}

fn pair(s: Stamped) -> (u32, usize) {
    (s.key, s.stamp)
}

fn pair_ref(s: &Stamped) -> (u32, usize) {
    (s.key, s.stamp)
}

pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut btree: BTreeMap<u32, usize> = BTreeMap::new();
    let mut avl: AvlTree<Stamped, ByKey> = AvlTree::with_comparator(ByKey);

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&btree);

        match final_op {
            FinalOp::Insert(key) => {
                let from_btree = btree.insert(key, op_id).map(|old| (key, old));
                let from_avl = avl.insert(Stamped { key, stamp: op_id }).map(pair);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Get(key) => {
                let from_btree = btree.get(&key).map(|&stamp| (key, stamp));
                let from_avl = avl.get(&probe(key)).map(pair_ref);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
                assert_eq!(from_btree.is_some(), avl.contains(&probe(key)));
            }

            FinalOp::Erase(key) => {
                let from_btree = btree.remove(&key).map(|stamp| (key, stamp));
                let from_avl = avl.erase(&probe(key)).map(pair);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let from_btree = btree.first_key_value().map(|(&k, &s)| (k, s));
                let from_avl = avl.first().map(pair_ref);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopFirst => {
                let from_btree = btree.pop_first();
                let from_avl = avl.pop_first().map(pair);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                let from_btree = btree.last_key_value().map(|(&k, &s)| (k, s));
                let from_avl = avl.last().map(pair_ref);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopLast => {
                let from_btree = btree.pop_last();
                let from_avl = avl.pop_last().map(pair);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }
        }

        avl.assert_invariants();
        assert_eq!(btree.len(), avl.len());
        assert!(btree
            .iter()
            .map(|(&k, &s)| (k, s))
            .eq(avl.iter().map(pair_ref)));
    }
}

#[derive(Clone, Debug, Arbitrary)]
pub enum CursorOp {
    // The element under the cursor is compared after every step.
    MovePrev,
    MoveNext,
    PeekNext,
    PeekPrev,
    RemoveCurrent,
    RemoveCurrentMovePrev,
}

pub fn cursor_op_strategy() -> impl Strategy<Value = CursorOp> {
    proptest::prop_oneof![
        Just(CursorOp::MovePrev),
        Just(CursorOp::MoveNext),
        Just(CursorOp::PeekNext),
        Just(CursorOp::PeekPrev),
        Just(CursorOp::RemoveCurrent),
        Just(CursorOp::RemoveCurrentMovePrev),
    ]
}

#[derive(Clone, Debug)]
pub struct CursorEquivalenceInput {
    pub values: Vec<u32>,
    pub ops: Vec<CursorOp>,
}

impl<'a> Arbitrary<'a> for CursorEquivalenceInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let num_values = u8::arbitrary(u)? % 100;
        let num_ops = u16::arbitrary(u)? % 1000;

        let mut values = Vec::with_capacity(num_values.into());
        for _ in 0..num_values {
            values.push(u32::arbitrary(u).unwrap_or(0));
        }

        let mut ops = Vec::with_capacity(num_ops.into());
        for _ in 0..num_ops {
            ops.push(CursorOp::arbitrary(u).unwrap_or(CursorOp::MoveNext));
        }

        Ok(CursorEquivalenceInput { values, ops })
    }
}

/// Walks a cursor over an [`AvlTree`] and an index over a sorted `Vec` in lockstep.
pub fn run_cursor_equivalence(values: Vec<u32>, ops: Vec<CursorOp>) {
    let mut avl: AvlTree<u32> = values.iter().copied().collect();

    let mut vec = values;
    vec.sort_unstable();
    vec.dedup();

    fn vec_curs_prev(v: &[u32], curs: Option<usize>) -> Option<usize> {
        match curs {
            Some(i) => i.checked_sub(1),
            None => v.len().checked_sub(1),
        }
    }

    fn vec_curs_next(v: &[u32], curs: Option<usize>) -> Option<usize> {
        match curs {
            Some(i) => i.checked_add(1).filter(|&i| i < v.len()),
            None => (!v.is_empty()).then_some(0),
        }
    }

    let mut vec_curs = vec_curs_next(&vec, None);
    let mut avl_curs = avl.cursor_first_mut();

    assert_eq!(vec_curs.map(|i| &vec[i]), avl_curs.get());

    for op in ops {
        match op {
            CursorOp::MoveNext => {
                vec_curs = vec_curs_next(&vec, vec_curs);
                avl_curs.move_next();
            }

            CursorOp::MovePrev => {
                vec_curs = vec_curs_prev(&vec, vec_curs);
                avl_curs.move_prev();
            }

            CursorOp::PeekNext => {
                let v = vec_curs_next(&vec, vec_curs).map(|i| &vec[i]);
                assert_eq!(v, avl_curs.peek_next());
            }

            CursorOp::PeekPrev => {
                let v = vec_curs_prev(&vec, vec_curs).map(|i| &vec[i]);
                assert_eq!(v, avl_curs.peek_prev());
            }

            CursorOp::RemoveCurrent => {
                let v = vec_curs.map(|i| vec.remove(i));

                if vec_curs == Some(vec.len()) {
                    vec_curs = None;
                }

                assert_eq!(v, avl_curs.remove_current());
            }

            CursorOp::RemoveCurrentMovePrev => {
                let new_v_curs = vec_curs.map(|i| i.checked_sub(1));
                let v = vec_curs.map(|i| vec.remove(i));

                if let Some(vc) = new_v_curs {
                    vec_curs = vc;
                }

                assert_eq!(v, avl_curs.remove_current_and_move_prev());
            }
        }

        assert_eq!(vec_curs.map(|i| &vec[i]), avl_curs.get());
    }

    drop(avl_curs);
    avl.assert_invariants();
    assert!(vec.iter().eq(avl.iter()));
}
