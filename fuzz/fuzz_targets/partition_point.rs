#![no_main]

use arbitrary::Unstructured;

use libfuzzer_sys::fuzz_target;
use polycross::rank_tree::RankTree;

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(len) = u.arbitrary_len::<i32>() else {
        return;
    };
    let mut vec: Vec<i32> = std::iter::repeat_with(|| u.arbitrary().unwrap_or_default())
        .take(len)
        .collect();
    vec.sort();

    let tree = vec.iter().copied().collect::<RankTree<i32, 4>>();

    let search: i32 = u.arbitrary().unwrap_or_default();

    assert_eq!(
        vec.partition_point(|x| x <= &search),
        tree.partition_point(|x| x <= &search)
    );
});
