use serde::Serialize;

use crate::blockchain::block_index::BlockIndex;
use crate::error::{MetricsError, Result};

pub const SEC_PER_DAY: i64 = 86400;
/// Longest accepted period: one century of days.
pub const MAX_PERIOD: i64 = 36525 * SEC_PER_DAY;

/// Blocks and transactions whose timestamps fall in
/// `[window_start, window_start + window_size - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VolumeWindow {
    pub window_start: i64,
    pub number_blocks: u64,
    pub tx_volume: u64,
}

/// Column layout of a window series: three parallel arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WindowedTxVolume {
    pub window_start: Vec<i64>,
    pub number_blocks: Vec<u64>,
    pub tx_volume: Vec<u64>,
}

impl FromIterator<VolumeWindow> for WindowedTxVolume {
    fn from_iter<I: IntoIterator<Item = VolumeWindow>>(iter: I) -> Self {
        let mut columns = WindowedTxVolume::default();
        for window in iter {
            columns.window_start.push(window.window_start);
            columns.number_blocks.push(window.number_blocks);
            columns.tx_volume.push(window.tx_volume);
        }
        columns
    }
}

pub fn validate_window_params(period: i64, window_size: i64, granularity: i64) -> Result<()> {
    if period < 1 {
        return Err(MetricsError::invalid("period", "Period should be greater than 0."));
    }
    if period > MAX_PERIOD {
        return Err(MetricsError::invalid("period", "Period should be less than 100 years."));
    }
    if window_size < 1 {
        return Err(MetricsError::invalid("window_size", "Window size should be greater than 0."));
    }
    if window_size > period {
        return Err(MetricsError::invalid("window_size", "Window size should be less than or equal to period."));
    }
    if granularity < 1 {
        return Err(MetricsError::invalid("granularity", "Window spacing should be greater than 0."));
    }
    if granularity > window_size {
        return Err(MetricsError::invalid("granularity", "Window spacing should be less than or equal to window."));
    }
    Ok(())
}

// (time, tx_volume) of every block from `tip` back to the first one older than
// `period_start`, oldest first. The older block itself and genesis are not
// sampled.
fn collect_period(tip: &BlockIndex, period_start: i64) -> Vec<(i64, u32)> {
    let mut samples = Vec::new();
    let mut index = tip;
    while let Some(prev) = index.prev() {
        samples.push((i64::from(index.get_block_time()), index.tx_volume));
        index = prev;
        if i64::from(index.get_block_time()) < period_start {
            break;
        }
    }
    samples.reverse();
    samples
}

/// Transaction volume over trailing windows of `window_size` seconds, spaced
/// `granularity` seconds apart, covering the `period` seconds that end at the
/// tip's timestamp.
///
/// Windows are emitted oldest first while they end strictly before the tip's
/// timestamp. With `granularity < window_size` windows overlap and a block is
/// counted in every window containing its timestamp. Block times are assumed
/// non-decreasing along the chain.
pub fn compute_windowed_volume(
    tip: Option<&BlockIndex>,
    period: i64,
    window_size: i64,
    granularity: i64,
) -> Result<Vec<VolumeWindow>> {
    validate_window_params(period, window_size, granularity)?;
    let tip = tip.ok_or(MetricsError::EmptyChain)?;

    let period_end = i64::from(tip.get_block_time());
    let period_start = period_end - period + 1;
    let samples = collect_period(tip, period_start);

    let mut windows = Vec::new();
    let mut window_start = period_start;
    let mut window_end = window_start + window_size - 1;
    // First sample the current window has to look at.
    let mut cursor = 0usize;

    while window_end < period_end {
        let next_window_start = window_start + granularity;
        // First sample at or after the next window's start, once seen.
        let mut next_cursor: Option<usize> = None;
        let mut number_blocks = 0u64;
        let mut tx_volume = 0u64;
        let mut closed = false;

        for (idx, &(time, volume)) in samples.iter().enumerate().skip(cursor) {
            if time > window_end {
                windows.push(VolumeWindow { window_start, number_blocks, tx_volume });
                cursor = next_cursor.unwrap_or(idx);
                window_start = next_window_start;
                window_end += granularity;
                closed = true;
                break;
            }
            number_blocks += 1;
            tx_volume += u64::from(volume);
            if next_cursor.is_none() && time >= next_window_start {
                next_cursor = Some(idx);
            }
        }

        // Only reachable without samples or with out-of-order block times.
        if !closed {
            log::debug!("Ran out of samples before window ending at {}", window_end);
            break;
        }
    }

    log::debug!(
        "Windowed tx volume: {} sample(s), {} window(s) over [{}, {}]",
        samples.len(),
        windows.len(),
        period_start,
        period_end
    );
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::block_header::BlockHeaderData;
    use std::sync::Arc;

    fn chain(blocks: &[(u32, u32)]) -> Arc<BlockIndex> {
        let mut tip: Option<Arc<BlockIndex>> = None;
        for (i, &(time, txs)) in blocks.iter().enumerate() {
            let header = BlockHeaderData {
                version: 1,
                prev_block_hash: tip.as_ref().map_or([0u8; 32], |t| t.hash),
                merkle_root: [0u8; 32],
                timestamp: time,
                bits: 0x1d00ffff,
                nonce: i as u32,
            };
            let node = match tip {
                Some(ref prev) => BlockIndex::extend(prev, header, false, txs),
                None => BlockIndex::genesis(header, false, txs),
            };
            tip = Some(Arc::new(node));
        }
        tip.unwrap()
    }

    #[test]
    fn parameters_are_checked_before_the_chain() {
        let cases = [
            (0, 1, 1, "period"),
            (-5, 1, 1, "period"),
            (MAX_PERIOD + 1, 1, 1, "period"),
            (100, 0, 1, "window_size"),
            (100, 101, 1, "window_size"),
            (100, 50, 0, "granularity"),
            (100, 50, 51, "granularity"),
        ];
        for (period, window, spacing, field) in cases {
            match compute_windowed_volume(None, period, window, spacing) {
                Err(MetricsError::InvalidParameter { name, .. }) => assert_eq!(name, field),
                other => panic!("expected InvalidParameter for {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn maximum_period_is_accepted() {
        let tip = chain(&[(0, 0), (10, 1)]);
        let windows = compute_windowed_volume(Some(&*tip), MAX_PERIOD, MAX_PERIOD, MAX_PERIOD).unwrap();
        assert!(windows.is_empty());
    }

    #[test]
    fn period_longer_than_chain_history_starts_before_zero() {
        let tip = chain(&[(0, 9), (5, 1), (20, 2), (40, 4)]);
        // period_start = 40 - 100 + 1 = -59; leading windows cover no blocks.
        let windows = compute_windowed_volume(Some(&*tip), 100, 30, 10).unwrap();
        let series: Vec<(i64, u64, u64)> =
            windows.iter().map(|w| (w.window_start, w.number_blocks, w.tx_volume)).collect();
        assert_eq!(
            series,
            vec![(-59, 0, 0), (-49, 0, 0), (-39, 0, 0), (-29, 0, 0), (-19, 1, 1), (-9, 2, 3), (1, 2, 3)]
        );
    }

    #[test]
    fn missing_tip_is_empty_chain() {
        assert!(matches!(compute_windowed_volume(None, 100, 10, 10), Err(MetricsError::EmptyChain)));
    }

    #[test]
    fn collection_stops_after_crossing_period_start() {
        let tip = chain(&[(0, 9), (100, 1), (150, 2), (200, 3), (250, 4)]);
        // period_start = 151: 200 and 250 are sampled; stepping onto 150 ends the scan.
        assert_eq!(collect_period(&tip, 151), vec![(200, 3), (250, 4)]);
        // Genesis is never sampled.
        assert_eq!(collect_period(&tip, -1000), vec![(100, 1), (150, 2), (200, 3), (250, 4)]);
    }

    #[test]
    fn disjoint_windows() {
        // Tip at 1100, period 100 -> [1001, 1100]; windows of 25 ending before 1100.
        let tip = chain(&[(0, 0), (1000, 7), (1001, 1), (1010, 2), (1030, 4), (1080, 8), (1100, 16)]);
        let windows = compute_windowed_volume(Some(&*tip), 100, 25, 25).unwrap();
        assert_eq!(
            windows,
            vec![
                VolumeWindow { window_start: 1001, number_blocks: 2, tx_volume: 3 },
                VolumeWindow { window_start: 1026, number_blocks: 1, tx_volume: 4 },
                VolumeWindow { window_start: 1051, number_blocks: 0, tx_volume: 0 },
            ]
        );
    }

    #[test]
    fn overlapping_windows_recount_samples() {
        let tip = chain(&[(0, 0), (1000, 7), (1001, 1), (1010, 2), (1030, 4), (1080, 8), (1100, 16)]);
        let windows = compute_windowed_volume(Some(&*tip), 100, 50, 25).unwrap();
        assert_eq!(
            windows,
            vec![
                VolumeWindow { window_start: 1001, number_blocks: 3, tx_volume: 7 },
                VolumeWindow { window_start: 1026, number_blocks: 1, tx_volume: 4 },
            ]
        );
    }

    #[test]
    fn window_as_long_as_period_emits_nothing() {
        let tip = chain(&[(0, 0), (50, 3), (100, 5)]);
        assert!(compute_windowed_volume(Some(&*tip), 100, 100, 10).unwrap().is_empty());
    }

    #[test]
    fn genesis_tip_emits_nothing() {
        let tip = chain(&[(500, 3)]);
        assert!(compute_windowed_volume(Some(&*tip), 100, 10, 10).unwrap().is_empty());
    }

    #[test]
    fn columns_follow_records() {
        let records = vec![
            VolumeWindow { window_start: 10, number_blocks: 1, tx_volume: 2 },
            VolumeWindow { window_start: 20, number_blocks: 3, tx_volume: 4 },
        ];
        let columns: WindowedTxVolume = records.into_iter().collect();
        assert_eq!(columns.window_start, vec![10, 20]);
        assert_eq!(columns.number_blocks, vec![1, 3]);
        assert_eq!(columns.tx_volume, vec![2, 4]);
    }
}
