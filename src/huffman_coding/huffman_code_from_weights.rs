//! This helper function is part of the huffman encoding system.
//!
//! The block encoder derives integer frequency counts for the symbols of each block. This helper
//! generates huffman code lengths (depths in the huffman tree) from those counts. Codes must fit
//! the 32 bit accumulator the decoder uses. If the weights supplied create longer codes, the
//! weights are flattened and another attempt is made to generate the codes.
//!

use std::collections::BinaryHeap;

use super::huffman::{Node, NodeData};

/// Longest code the coder will emit.
pub const MAX_CODE_LEN: u8 = 32;

/// Returns a code length for each weight, index for index. Every weight gets a length of at
/// least 1, including the lone symbol of a one-symbol block.
pub fn code_lengths(sym_weight: &[u32]) -> Vec<u8> {
    let mut lengths = vec![0_u8; sym_weight.len()];
    match sym_weight.len() {
        0 => return lengths,
        1 => {
            lengths[0] = 1;
            return lengths;
        }
        _ => {}
    }

    // Weight sits in the upper 24 bits, tree depth in the low 8 (see add_weights).
    // A zero count still needs a code, so it is treated as 1.
    let mut weight = sym_weight
        .iter()
        .enumerate()
        .map(|(i, &f)| ((f.max(1)).min(0x00ff_ffff) << 8, i as u32))
        .collect::<Vec<(u32, u32)>>();

    // We need to make codes of MAX_CODE_LEN bits or less. If we can't, we will adjust the
    // weights and try again.
    loop {
        // Turn the weights into leaves. Node orders lighter nodes as greater, so the heap
        // hands out the two lightest first.
        let mut tree: BinaryHeap<Node> = weight
            .iter()
            .map(|&(f, m)| Node::new(f, 0, m, NodeData::Leaf(m)))
            .collect();

        // ...then pare it down to one single node with child nodes.
        while tree.len() > 1 {
            // Pull off the bottom nodes and make a new parent. The loop guard keeps both pops
            // safe.
            let (Some(right_child), Some(left_child)) = (tree.pop(), tree.pop()) else {
                break;
            };
            tree.push(Node::new(
                add_weights(left_child.weight, right_child.weight),
                left_child.depth.max(right_child.depth).saturating_add(1),
                left_child.syms + right_child.syms,
                NodeData::Kids(Box::new(left_child), Box::new(right_child)),
            ));
        }
        let Some(root) = tree.pop() else {
            return lengths;
        };

        // If the tree is shallow enough copy the depths back into the length table.
        // Otherwise adjust weights and try again.
        if root.depth <= MAX_CODE_LEN {
            let mut leaves = Vec::with_capacity(sym_weight.len());
            return_leaves(&root, 0, &mut leaves);
            for (idx, len) in leaves {
                lengths[idx as usize] = len;
            }
            return lengths;
        }

        // Adjust weights by dividing each weight by 2 and adding 1.
        // This "flattens" the node tree. Then go try this again.
        for item in weight.iter_mut() {
            let mut j = item.0 >> 8;
            j = 1 + (j / 2);
            item.0 = j << 8;
        }
    }
}

/// Recursively walk the tree and return in "leaves" how far (deep) from the root node each leaf is.
/// Depth is the same as the code length, and will be used to create actual codes later.
fn return_leaves(node: &Node, depth: u8, leaves: &mut Vec<(u32, u8)>) {
    match &node.node_data {
        NodeData::Kids(left_child, right_child) => {
            return_leaves(left_child, depth + 1, leaves);
            return_leaves(right_child, depth + 1, leaves);
        }
        NodeData::Leaf(idx) => {
            leaves.push((*idx, depth));
        }
    };
}

/// Julian Seward's weight adding for parent nodes: sum the weights, and carry the deeper
/// child's depth plus one in the low byte so equal weights prefer the shallower subtree.
#[inline(always)]
fn add_weights(a: u32, b: u32) -> u32 {
    let weight_mask: u32 = 0xffffff00;
    let depth_mask: u32 = 0x000000ff;
    ((a & weight_mask).saturating_add(b & weight_mask) & weight_mask)
        | (1 + (a & depth_mask).max(b & depth_mask))
}

#[cfg(test)]
mod test {
    use super::*;

    fn kraft(lengths: &[u8]) -> f64 {
        lengths.iter().map(|&l| 0.5_f64.powi(l as i32)).sum()
    }

    #[test]
    fn two_symbols_get_one_bit_each() {
        assert_eq!(code_lengths(&[1, 1000]), vec![1, 1]);
    }

    #[test]
    fn one_symbol_gets_one_bit() {
        assert_eq!(code_lengths(&[42]), vec![1]);
        assert!(code_lengths(&[]).is_empty());
    }

    #[test]
    fn frequent_symbols_get_shorter_codes() {
        let lengths = code_lengths(&[1, 1, 2, 4, 8]);
        assert_eq!(lengths, vec![4, 4, 3, 2, 1]);
        assert!((kraft(&lengths) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn fibonacci_weights_are_capped() {
        // Fibonacci counts build the deepest possible tree.
        let mut weights = vec![1_u32, 1];
        while weights.len() < 40 {
            let n = weights.len();
            weights.push(weights[n - 1] + weights[n - 2]);
        }
        let lengths = code_lengths(&weights);
        assert!(lengths.iter().all(|&l| (1..=MAX_CODE_LEN).contains(&l)));
        assert!(kraft(&lengths) <= 1.0 + 1e-12);
    }

    #[test]
    fn large_alphabet_builds_a_balanced_tree() {
        // 20_000 equal weights: 2^15 - 20_000 leaves at depth 14, the rest at 15.
        let lengths = code_lengths(&vec![1_u32; 20_000]);
        assert!(lengths.iter().all(|&l| l == 14 || l == 15));
        assert_eq!(lengths.iter().filter(|&&l| l == 14).count(), 32_768 - 20_000);
        assert!((kraft(&lengths) - 1.0).abs() < 1e-9);
    }
}
