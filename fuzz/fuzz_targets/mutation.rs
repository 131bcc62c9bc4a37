#![no_main]

use arbitrary::{Arbitrary, Unstructured};

use libfuzzer_sys::fuzz_target;
use polycross::rank_tree::RankTree;

#[derive(Arbitrary, Debug)]
enum Op {
    Insert { idx: usize, val: i32 },
    Remove { idx: usize },
}

impl Op {
    fn apply_to_vec(&self, vec: &mut Vec<i32>) -> Option<i32> {
        match self {
            Op::Insert { idx, val } => {
                vec.insert(*idx % (vec.len() + 1), *val);
                None
            }
            Op::Remove { idx } => (!vec.is_empty()).then(|| vec.remove(*idx % vec.len())),
        }
    }

    fn apply_to_tree<const B: usize>(&self, tree: &mut RankTree<i32, B>) -> Option<i32> {
        match self {
            Op::Insert { idx, val } => {
                tree.insert(*idx % (tree.len() + 1), *val);
                None
            }
            Op::Remove { idx } => (!tree.is_empty()).then(|| tree.remove(*idx % tree.len())),
        }
    }
}

fn arbitrary_ops(mut u: Unstructured) -> Result<(), arbitrary::Error> {
    let len = u.arbitrary_len::<Op>()?;
    let mut vec = Vec::new();
    let mut tree = RankTree::<_, 4>::new();
    for _ in 0..len {
        let op: Op = u.arbitrary()?;
        assert_eq!(op.apply_to_vec(&mut vec), op.apply_to_tree(&mut tree));
        tree.check_invariants();

        assert_eq!(tree.len(), vec.len());
        assert_eq!(tree.iter().cloned().collect::<Vec<_>>(), vec);
    }
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let u = Unstructured::new(data);
    let _ = arbitrary_ops(u);
});
