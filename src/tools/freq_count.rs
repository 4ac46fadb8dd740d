use rustc_hash::FxHashMap;

use super::symbol::Symbol;

/// Returns the distinct symbols of the input, sorted ascending.
pub fn alphabet<S: Symbol>(data: &[S]) -> Vec<S> {
    let mut alphabet = data.to_vec();
    alphabet.sort_unstable();
    alphabet.dedup();
    alphabet
}

/// Returns a frequency count of the input data.
pub fn freqs<S: Symbol>(data: &[S]) -> FxHashMap<S, u32> {
    let mut freqs = FxHashMap::default();
    data.iter().for_each(|&el| *freqs.entry(el).or_insert(0) += 1);
    freqs
}

/// Returns (symbol, count) pairs in ascending symbol order. This is the common starting point
/// the entropy coders re-sort by frequency, so equal counts keep a reproducible order.
pub fn counted_alphabet<S: Symbol>(data: &[S]) -> Vec<(S, u32)> {
    let freqs = freqs(data);
    let mut counted: Vec<(S, u32)> = freqs.into_iter().collect();
    counted.sort_unstable_by_key(|&(sym, _)| sym);
    counted
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn alphabet_is_sorted_and_distinct() {
        let data = "banana".as_bytes();
        assert_eq!(alphabet(data), b"abn".to_vec());
        assert!(alphabet::<u16>(&[]).is_empty());
    }

    #[test]
    fn alphabet_is_idempotent() {
        let data = [9_u32, 3, 3, 700, 9, 1];
        let once = alphabet(&data);
        let twice = alphabet(&once);
        assert_eq!(once, twice);
        assert_eq!(once, alphabet(&data));
    }

    #[test]
    fn counts() {
        let data = "mississippi".as_bytes();
        let freqs = freqs(data);
        assert_eq!(freqs[&b'i'], 4);
        assert_eq!(freqs[&b's'], 4);
        assert_eq!(freqs[&b'p'], 2);
        assert_eq!(freqs[&b'm'], 1);
        assert_eq!(
            counted_alphabet(data),
            vec![(b'i', 4), (b'm', 1), (b'p', 2), (b's', 4)]
        );
    }
}
