// Reciprocal Rank Fusion (RRF)

use std::collections::HashMap;
use std::hash::Hash;

/// Rank offset from Cormack, Clarke & Buettcher (SIGIR 2009).
pub const RRF_K: f64 = 60.0;

/// Fuse ranked lists with `rrf(d) = Σ 1 / (k + rank_L(d))`, ranks 1-based.
///
/// Items absent from a list contribute nothing for it. Output is sorted by
/// descending score; equal scores keep first-appearance order across the
/// lists in the order given (all of list 0, then unseen items of list 1, ...).
pub fn reciprocal_rank_fusion<T: Clone + Eq + Hash>(lists: &[&[T]], k: f64) -> Vec<(T, f64)> {
    let mut slot: HashMap<T, usize> = HashMap::new();
    let mut fused: Vec<(T, f64)> = Vec::new();
    for list in lists {
        for (rank, item) in list.iter().enumerate() {
            let contribution = 1.0 / (k + (rank + 1) as f64);
            match slot.get(item) {
                Some(&i) => fused[i].1 += contribution,
                None => {
                    slot.insert(item.clone(), fused.len());
                    fused.push((item.clone(), contribution));
                }
            }
        }
    }
    // stable: ties stay in first-appearance order
    fused.sort_by(|a, b| b.1.total_cmp(&a.1));
    fused
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_in_both_lists_rise() {
        let vector = [1, 2, 3];
        let lexical = [3, 1, 4];
        let fused = reciprocal_rank_fusion(&[&vector[..], &lexical[..]], RRF_K);
        let ids: Vec<i32> = fused.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, [1, 3, 2, 4]);
        assert!((fused[0].1 - (1.0 / 61.0 + 1.0 / 62.0)).abs() < 1e-12);
    }

    #[test]
    fn single_list_preserves_order() {
        let fused = reciprocal_rank_fusion(&[&[7, 8, 9][..], &[][..]], RRF_K);
        let ids: Vec<i32> = fused.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, [7, 8, 9]);
    }

    #[test]
    fn ties_prefer_first_list_then_second() {
        // 1 and 5 both score 1/61; 2 and 6 both 1/62
        let fused = reciprocal_rank_fusion(&[&[1, 2][..], &[5, 6][..]], RRF_K);
        let ids: Vec<i32> = fused.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, [1, 5, 2, 6]);
    }

    #[test]
    fn uses_ranks_not_scores() {
        let fused = reciprocal_rank_fusion(&[&["a", "b"][..], &["b", "a"][..]], 1.0);
        assert_eq!(fused.len(), 2);
        assert_eq!(fused[0].1, fused[1].1);
        assert_eq!(fused[0].0, "a");
    }

    #[test]
    fn empty_inputs() {
        let fused: Vec<(u8, f64)> = reciprocal_rank_fusion(&[&[][..], &[][..]], RRF_K);
        assert!(fused.is_empty());
    }
}
