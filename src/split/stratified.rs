//! Equal-width binning and per-stratum allocation

use crate::error::{PrepError, Result};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Slack for float products such as `0.3 * 10`
const EPS: f64 = 1e-9;

/// Assign each value an equal-width bin label in `0..bins`.
///
/// Intervals are right-closed; the minimum falls in bin 0.
pub fn bin_labels(values: &[f64], bins: usize) -> Vec<usize> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bins as f64;

    values
        .iter()
        .map(|&v| {
            if width <= 0.0 {
                return 0;
            }
            let pos = ((v - min) / width).ceil() as i64 - 1;
            pos.clamp(0, bins as i64 - 1) as usize
        })
        .collect()
}

/// Smallest stratum that still leaves a row on both sides of a split
pub fn min_stratum_size(fraction: f64) -> usize {
    let smaller = fraction.min(1.0 - fraction);
    ((1.0 / smaller) - EPS).ceil().max(2.0) as usize
}

/// Split `rows` into `(kept, held_out)` with `held_out` holding
/// `ceil(fraction * rows.len())` rows drawn proportionally from each stratum.
///
/// Both outputs are sorted so the source row order survives.
pub fn stratified_partition(
    rows: &[usize],
    labels: &[usize],
    fraction: f64,
    rng: &mut ChaCha8Rng,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let mut strata: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for &row in rows {
        strata.entry(labels[row]).or_default().push(row);
    }

    let required = min_stratum_size(fraction);
    for (&bin, members) in &strata {
        if members.len() < required {
            return Err(PrepError::InsufficientStratumSize {
                bin,
                members: members.len(),
                required,
            });
        }
    }

    // Floor allocation first, then hand the shortfall to the largest remainders
    let mut allocation: Vec<(usize, usize, f64)> = strata
        .iter()
        .map(|(&bin, members)| {
            let exact = members.len() as f64 * fraction;
            let base = (exact + EPS).floor();
            (bin, base as usize, exact - base)
        })
        .collect();

    let target = ((fraction * rows.len() as f64) - EPS).ceil() as usize;
    let mut shortfall = target.saturating_sub(allocation.iter().map(|a| a.1).sum());

    let mut order: Vec<usize> = (0..allocation.len()).collect();
    order.sort_by(|&a, &b| {
        allocation[b]
            .2
            .partial_cmp(&allocation[a].2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(allocation[a].0.cmp(&allocation[b].0))
    });
    for i in order {
        if shortfall == 0 {
            break;
        }
        let (bin, count, _) = allocation[i];
        if count + 1 < strata[&bin].len() {
            allocation[i].1 += 1;
            shortfall -= 1;
        }
    }

    let mut kept = Vec::with_capacity(rows.len() - target.min(rows.len()));
    let mut held_out = Vec::with_capacity(target);
    for (bin, count, _) in allocation {
        let mut members = strata[&bin].clone();
        members.shuffle(rng);
        held_out.extend_from_slice(&members[..count]);
        kept.extend_from_slice(&members[count..]);
    }

    kept.sort_unstable();
    held_out.sort_unstable();
    Ok((kept, held_out))
}
