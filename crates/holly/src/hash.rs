//! Order-sensitive combining of 32-bit identity hashes.

/// Odd multiplier applied to the accumulator before a new part is mixed in.
///
/// Multiplying first makes the combine non-commutative, so swapping two
/// siblings changes the result. Collisions are still possible; callers are
/// expected to verify candidates structurally after filtering by hash.
const FACTOR: u32 = 0xA555_5529;

/// Folds `new_part` into the accumulator `current`.
#[inline]
pub fn combine(new_part: u32, current: u32) -> u32 {
    current.wrapping_mul(FACTOR).wrapping_add(new_part)
}

/// Combines a kind discriminant with one child identity hash.
#[inline]
pub fn combine1(kind: u32, first: u32) -> u32 {
    combine(first, kind)
}

/// Combines a kind discriminant with two child identity hashes, in order.
#[inline]
pub fn combine2(kind: u32, first: u32, second: u32) -> u32 {
    combine(second, combine(first, kind))
}

/// Combines a kind discriminant with three child identity hashes, in order.
#[inline]
pub fn combine3(kind: u32, first: u32, second: u32, third: u32) -> u32 {
    combine(third, combine(second, combine(first, kind)))
}

/// Folds every value of a sequence into `current`, in iteration order.
pub fn combine_values(values: impl IntoIterator<Item = u32>, current: u32) -> u32 {
    values.into_iter().fold(current, |acc, value| combine(value, acc))
}

/// Like [`combine_values`], but ignores everything past the first
/// `max_items` values so long sequences stay cheap to hash.
pub fn combine_values_bounded(
    values: impl IntoIterator<Item = u32>,
    current: u32,
    max_items: usize,
) -> u32 {
    combine_values(values.into_iter().take(max_items), current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(combine(7, 13), combine(7, 13));
        assert_eq!(combine3(5, 1, 2, 3), combine3(5, 1, 2, 3));
    }

    #[test]
    fn order_sensitive() {
        let ab = combine(2, combine(1, 0));
        let ba = combine(1, combine(2, 0));
        assert_ne!(ab, ba);
    }

    #[test]
    fn low_arity_matches_the_fold() {
        assert_eq!(combine1(9, 1), combine_values([1], 9));
        assert_eq!(combine2(9, 1, 2), combine_values([1, 2], 9));
        assert_eq!(combine3(9, 1, 2, 3), combine_values([1, 2, 3], 9));
    }

    #[test]
    fn bounded_ignores_the_tail() {
        let head = combine_values([1, 2, 3], 0);
        assert_eq!(combine_values_bounded([1, 2, 3, 4, 5], 0, 3), head);
        assert_ne!(combine_values([1, 2, 3, 4, 5], 0), head);
    }

    #[test]
    fn empty_sequence_is_the_seed() {
        assert_eq!(combine_values([], 42), 42);
        assert_eq!(combine_values_bounded([1, 2, 3], 42, 0), 42);
    }
}
