//! Exhaustive enumeration of section-break placements.
//!
//! `all_comb(m, n)` returns every length-`m` boolean vector with exactly `n` `true`
//! entries. The result has `C(m, n)` members, so callers keep `m` small (the dispatcher
//! never calls this with more than 14 split points).

/// Returns every length-`m` boolean vector containing exactly `n` `true` values.
///
/// Built bottom-up: the solutions for `(m, n)` are the `(m-1, n-1)` solutions extended
/// with `true`, followed by the `(m-1, n)` solutions extended with `false`. Cells that
/// would need more than `n` trues or more than `m - n` falses are never filled.
///
/// The output order is deterministic and the exact packer's tie-breaking depends on it.
pub fn all_comb(m: usize, n: usize) -> Vec<Vec<bool>> {
    debug_assert!(n <= m, "all_comb: n ({n}) must not exceed m ({m})");
    if n > m {
        return Vec::new();
    }

    let max_true = n;
    let max_false = m - n;

    // row[k] holds the solutions for (current length, k trues).
    let mut row: Vec<Vec<Vec<bool>>> = vec![vec![Vec::new()]];

    for len in 1..=m {
        let mut next: Vec<Vec<Vec<bool>>> = vec![Vec::new(); len + 1];
        for (k, cell) in next.iter_mut().enumerate() {
            if k > max_true || len - k > max_false {
                continue;
            }

            if k > 0 {
                cell.extend(row[k - 1].iter().map(|prefix| extended(prefix, true)));
            }
            if len > k {
                cell.extend(row[k].iter().map(|prefix| extended(prefix, false)));
            }
        }
        row = next;
    }

    row.swap_remove(n)
}

fn extended(prefix: &[bool], value: bool) -> Vec<bool> {
    let mut v = Vec::with_capacity(prefix.len() + 1);
    v.extend_from_slice(prefix);
    v.push(value);
    v
}
