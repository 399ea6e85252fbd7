use crate::blockchain::block_index::BlockIndex;
use crate::metrics::difficulty::decode_difficulty;

// Converts a difficulty ratio into expected kernel hashes (2^32).
const KERNELS_PER_DIFFICULTY: f64 = 4294967296.0;

/// Estimated proof-of-stake kernels tried per second over the last
/// `sample_size` stake blocks ending at `tip`.
///
/// Elapsed time accrues only between consecutive sampled stake blocks, so
/// intervening work blocks are skipped and the first stake block adds no time.
/// Returns 0.0 when no time elapsed (fewer than two stake blocks sampled).
pub fn estimate_kernel_rate(tip: Option<&BlockIndex>, fork_height: u32, sample_size: u32) -> f64 {
    let tip = match tip {
        Some(tip) if sample_size > 0 => tip,
        _ => return 0.0,
    };

    let mut kernels_tried = 0.0;
    let mut elapsed: i64 = 0;
    let mut handled = 0u32;
    let mut prev_stake: Option<&BlockIndex> = None;

    for index in tip.ancestors().filter(|b| b.is_proof_of_stake) {
        kernels_tried += decode_difficulty(Some(index), Some(tip), fork_height) * KERNELS_PER_DIFFICULTY;
        if let Some(later) = prev_stake {
            elapsed += i64::from(later.get_block_time()) - i64::from(index.get_block_time());
        }
        prev_stake = Some(index);
        handled += 1;
        if handled == sample_size {
            break;
        }
    }

    log::debug!("Kernel rate: {} stake block(s) over {}s", handled, elapsed);
    if elapsed > 0 {
        kernels_tried / elapsed as f64
    } else {
        0.0
    }
}
