#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]
#![cfg(test)]

use std::{cell::Cell, rc::Rc};

use fixed_pool::{FixedPool, Global, MemoryResource as _};
use forward_list::ForwardList;
use proptest::prelude::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn is_fully_coalesced(pool: &FixedPool) -> bool {
    let blocks = pool.blocks();
    blocks.len() == 1 && blocks[0].is_free() && blocks[0].size() == pool.capacity()
}

#[test]
fn pool_backed_list_keeps_insertion_order() {
    init_logger();
    let pool = FixedPool::new(1024).unwrap();
    let mut list = ForwardList::new_in(&pool);

    list.push_front(3);
    list.push_front(2);
    list.push_front(1);

    assert_eq!(list.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
    assert_eq!(list.front(), Some(&1));
    assert!(list.resource().is_equal(&&pool));
    for value in &list {
        assert!(pool.contains(core::ptr::from_ref(value).cast()));
    }
}

#[test]
fn push_pop_cycle_leaves_pool_coalesced() {
    init_logger();
    let pool = FixedPool::new(64 * 1024).unwrap();
    let mut list = ForwardList::new_in(&pool);

    for i in 0..1000 {
        list.push_front(i);
    }
    assert_eq!(list.len(), 1000);
    for i in (0..1000).rev() {
        assert_eq!(list.pop_front(), Some(i));
    }
    assert!(list.is_empty());
    assert!(is_fully_coalesced(&pool));
}

#[test]
fn default_list_uses_global() {
    let mut list = ForwardList::new();
    list.push_front(42);
    assert_eq!(list.front(), Some(&42));
    assert!(list.resource().is_equal(&Global));
}

#[test]
fn strings_are_dropped_with_the_list() {
    init_logger();
    let pool = FixedPool::new(64 * 1024).unwrap();
    {
        let mut list = ForwardList::new_in(&pool);
        for i in 0..1000 {
            list.push_front(format!("string {i}"));
        }
        assert_eq!(list.front().map(String::as_str), Some("string 999"));
        assert_eq!(pool.stats().used_block_count, 1000);
    }
    assert!(is_fully_coalesced(&pool));
}

#[test]
fn each_value_dropped_once() {
    struct Tracked(Rc<Cell<usize>>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    let drops = Rc::new(Cell::new(0));
    let pool = FixedPool::new(4096).unwrap();
    let mut list = ForwardList::new_in(&pool);
    for _ in 0..8 {
        list.push_front(Tracked(Rc::clone(&drops)));
    }

    drop(list.pop_front());
    assert_eq!(drops.get(), 1);
    list.clear();
    assert_eq!(drops.get(), 8);
    drop(list);
    assert_eq!(drops.get(), 8);
    assert!(is_fully_coalesced(&pool));
}

#[test]
fn memory_is_reused_across_lists() {
    init_logger();
    let pool = FixedPool::new(1024).unwrap();

    let first_addr = {
        let mut list = ForwardList::new_in(&pool);
        list.push_front(1_u64);
        list.front().map(|value| core::ptr::from_ref(value).addr())
    };
    assert!(is_fully_coalesced(&pool));

    let mut list = ForwardList::new_in(&pool);
    list.push_front(2_u64);
    let second_addr = list.front().map(|value| core::ptr::from_ref(value).addr());
    assert_eq!(first_addr, second_addr);
}

#[test]
fn exhausted_pool_rejects_push() {
    init_logger();
    let pool = FixedPool::new(256).unwrap();
    let mut list = ForwardList::new_in(&pool);

    let mut pushed = 0_u32;
    while list.try_push_front(pushed).is_ok() {
        pushed += 1;
    }
    assert!(pushed > 0);
    let before = pool.blocks();
    assert!(list.try_push_front(u32::MAX).is_err());
    assert_eq!(pool.blocks(), before);
    assert_eq!(list.front(), Some(&(pushed - 1)));
}

#[test]
fn splice_between_pools() {
    init_logger();
    let pool1 = FixedPool::new(1024).unwrap();
    let pool2 = FixedPool::new(1024).unwrap();
    let mut list1 = ForwardList::new_in(&pool1);
    let mut list2 = ForwardList::new_in(&pool2);
    list1.push_front('c');
    list2.extend(['b', 'a']);

    list1.splice_front(&mut list2);
    assert_eq!(list1.iter().collect::<String>(), "abc");
    assert!(is_fully_coalesced(&pool2));

    drop(list1);
    assert!(is_fully_coalesced(&pool1));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn list_matches_model(ops in proptest::collection::vec(proptest::option::of(any::<i32>()), 0..300)) {
        let pool = FixedPool::new(16 * 1024).unwrap();
        let mut list = ForwardList::new_in(&pool);
        let mut model = Vec::new();

        for op in ops {
            match op {
                Some(value) => {
                    list.push_front(value);
                    model.push(value);
                }
                None => {
                    prop_assert_eq!(list.pop_front(), model.pop());
                }
            }
            prop_assert_eq!(list.len(), model.len());
            prop_assert_eq!(list.front(), model.last());
            prop_assert_eq!(pool.stats().used_block_count, model.len());
        }

        prop_assert!(list.iter().eq(model.iter().rev()));
        drop(list);
        prop_assert!(is_fully_coalesced(&pool));
    }
}
