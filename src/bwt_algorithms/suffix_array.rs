use log::trace;

use crate::tools::freq_count::alphabet;
use crate::tools::symbol::Symbol;

/*
Prefix doubling (Manber-Myers style, with a comparison sort at each round). The text is the
input followed by an implicit sentinel that sorts before every real symbol, so the returned
array has one more entry than the input and always starts with the sentinel's position.

Because the sentinel is unique, no two suffixes are equal and the doubling terminates as soon
as every rank is distinct. Sorting suffixes of a sentinel-terminated text gives the same order
as sorting its rotations.
*/

/// Returns the start positions of all suffixes of `data` + sentinel in sorted order.
pub fn suffix_array<S: Symbol>(data: &[S]) -> Vec<u32> {
    let n = data.len() + 1;

    // Dense ranks: the sentinel is 0, real symbols start at 1.
    let alphabet = alphabet(data);
    let mut rank: Vec<u32> = data
        .iter()
        .map(|s| alphabet.binary_search(s).map_or(0, |r| r as u32 + 1))
        .chain(std::iter::once(0))
        .collect();
    let mut next_rank = vec![0_u32; n];
    let mut sa: Vec<u32> = (0..n as u32).collect();

    let mut k = 1_usize;
    let mut rounds = 0;
    loop {
        {
            // Sort key of a suffix: its rank and the rank k places on (0 past the end).
            let key = |i: u32| {
                let i = i as usize;
                let second = if i + k < n { rank[i + k] + 1 } else { 0 };
                (rank[i], second)
            };
            sa.sort_unstable_by_key(|&i| key(i));

            next_rank[sa[0] as usize] = 0;
            for w in 1..n {
                let step = (key(sa[w - 1]) < key(sa[w])) as u32;
                next_rank[sa[w] as usize] = next_rank[sa[w - 1] as usize] + step;
            }
        }
        std::mem::swap(&mut rank, &mut next_rank);
        rounds += 1;

        // All ranks distinct: the order is final.
        if rank[sa[n - 1] as usize] as usize == n - 1 {
            break;
        }
        k *= 2;
    }
    trace!("Suffix array of {} entries in {} rounds", n, rounds);
    sa
}

#[cfg(test)]
mod test {
    use super::suffix_array;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    /// Reference: sort the suffixes directly. A shorter suffix that is a prefix of a longer one
    /// sorts first, which is exactly the sentinel's behaviour.
    fn naive<S: Ord>(data: &[S]) -> Vec<u32> {
        let mut sa: Vec<u32> = (0..=data.len() as u32).collect();
        sa.sort_by(|&a, &b| data[a as usize..].cmp(&data[b as usize..]));
        sa
    }

    #[test]
    fn banana() {
        assert_eq!(suffix_array("banana".as_bytes()), vec![6, 5, 3, 1, 0, 4, 2]);
    }

    #[test]
    fn empty_and_single() {
        assert_eq!(suffix_array::<u8>(&[]), vec![0]);
        assert_eq!(suffix_array(&[42_u32]), vec![1, 0]);
    }

    #[test]
    fn zero_symbols_still_sort_after_sentinel() {
        assert_eq!(suffix_array(&[0_u8, 0, 0]), vec![3, 2, 1, 0]);
    }

    #[test]
    fn matches_naive_sort() {
        let mut rng = StdRng::seed_from_u64(0x5341);
        for _ in 0..100 {
            let len = rng.gen_range(0..300);
            let alphabet_size = rng.gen_range(1..6);
            let data: Vec<u16> = (0..len).map(|_| rng.gen_range(0..alphabet_size)).collect();
            assert_eq!(suffix_array(&data), naive(&data));
        }
    }
}
