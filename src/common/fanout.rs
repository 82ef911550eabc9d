use std::collections::HashSet;

/// Receivers of a notification fan-out: the sender is skipped and every
/// receiver appears once, in first-seen order.
pub fn recipients(sender: i32, candidates: &[i32]) -> Vec<i32> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .iter()
        .copied()
        .filter(|id| *id != sender && seen.insert(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_is_excluded() {
        assert_eq!(recipients(5, &[3, 5, 9]), vec![3, 9]);
    }

    #[test]
    fn test_duplicates_are_collapsed_in_order() {
        assert_eq!(recipients(1, &[4, 2, 4, 2, 7]), vec![4, 2, 7]);
    }

    #[test]
    fn test_only_sender_yields_nobody() {
        assert!(recipients(8, &[8, 8]).is_empty());
    }
}
