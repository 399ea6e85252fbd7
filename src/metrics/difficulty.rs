use serde::Serialize;

use crate::blockchain::block_index::BlockIndex;
use crate::blockchain::chain_view::last_block_index;
use crate::util::bits_to_hex;

// Exponent byte at which a compact value is read as a plain ratio.
const REFERENCE_SHIFT: u32 = 29;
const MIN_DIFFICULTY_MANTISSA: f64 = 65535.0;

/// Difficulty as a multiple of the minimum difficulty (minimum = 1.0).
///
/// With no `index`, the last proof-of-work block at or before `tip` is used,
/// and an absent `tip` yields the 1.0 baseline. Blocks at or above
/// `fork_height` report 0.0: classic difficulty no longer applies there.
///
/// The exponent is normalised by repeated multiplication or division by 256
/// so results match historical values bit for bit. A zero mantissa is not
/// valid chain data and produces positive infinity.
pub fn decode_difficulty(index: Option<&BlockIndex>, tip: Option<&BlockIndex>, fork_height: u32) -> f64 {
    let index = match (index, tip) {
        (Some(index), _) => index,
        (None, Some(tip)) => last_block_index(tip, false),
        (None, None) => return 1.0,
    };

    if index.height >= fork_height {
        return 0.0;
    }

    difficulty_from_bits(index.bits())
}

/// Ratio for a raw compact value, without any fork check.
pub fn difficulty_from_bits(bits: u32) -> f64 {
    let mut shift = (bits >> 24) & 0xff;
    let mantissa = bits & 0x00ff_ffff;
    if mantissa == 0 {
        log::warn!("Compact bits {} carry a zero mantissa", bits_to_hex(bits));
    }

    let mut difficulty = MIN_DIFFICULTY_MANTISSA / f64::from(mantissa);
    while shift < REFERENCE_SHIFT {
        difficulty *= 256.0;
        shift += 1;
    }
    while shift > REFERENCE_SHIFT {
        difficulty /= 256.0;
        shift -= 1;
    }
    difficulty
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DifficultySummary {
    #[serde(rename = "proof-of-work")]
    pub proof_of_work: f64,
    #[serde(rename = "proof-of-stake")]
    pub proof_of_stake: f64,
}

/// Current proof-of-work and proof-of-stake difficulties seen from `tip`.
pub fn difficulty_summary(tip: Option<&BlockIndex>, fork_height: u32) -> DifficultySummary {
    let last_stake = tip.map(|t| last_block_index(t, true));
    DifficultySummary {
        proof_of_work: decode_difficulty(None, tip, fork_height),
        proof_of_stake: decode_difficulty(last_stake, tip, fork_height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::block_header::BlockHeaderData;
    use std::sync::Arc;

    fn chain(blocks: &[(u32, bool)]) -> Arc<BlockIndex> {
        let mut tip: Option<Arc<BlockIndex>> = None;
        for (i, &(bits, pos)) in blocks.iter().enumerate() {
            let header = BlockHeaderData {
                version: 1,
                prev_block_hash: tip.as_ref().map_or([0u8; 32], |t| t.hash),
                merkle_root: [0u8; 32],
                timestamp: 1000 + i as u32 * 60,
                bits,
                nonce: i as u32,
            };
            let node = match tip {
                Some(ref prev) => BlockIndex::extend(prev, header, pos, 0),
                None => BlockIndex::genesis(header, pos, 0),
            };
            tip = Some(Arc::new(node));
        }
        tip.unwrap()
    }

    #[test]
    fn minimum_difficulty_is_one() {
        assert_eq!(difficulty_from_bits(0x1d00ffff), 1.0);
    }

    #[test]
    fn bitcoin_style_values() {
        // Exponent below the reference multiplies by 256 per step.
        assert_eq!(difficulty_from_bits(0x1c00ffff), 256.0);
        assert_eq!(difficulty_from_bits(0x1e00ffff), 1.0 / 256.0);
        let expected = 65535.0 / f64::from(0x0ffff0u32) / 256.0;
        assert_eq!(difficulty_from_bits(0x1e0ffff0), expected);
    }

    #[test]
    fn iterative_scaling_matches_stepwise_reference() {
        for &bits in &[0x00000001u32, 0x03123456, 0x1b0404cb, 0x1d00ffff, 0x20ffffff, 0xff7fffff] {
            let shift = (bits >> 24) as i32;
            let mut expected = 65535.0 / f64::from(bits & 0x00ff_ffff);
            for _ in shift..29 {
                expected *= 256.0;
            }
            for _ in 29..shift {
                expected /= 256.0;
            }
            assert_eq!(difficulty_from_bits(bits).to_bits(), expected.to_bits(), "bits {:08x}", bits);
        }
    }

    #[test]
    fn zero_mantissa_is_infinite() {
        assert!(difficulty_from_bits(0x1d000000).is_infinite());
    }

    #[test]
    fn no_chain_defaults_to_one() {
        assert_eq!(decode_difficulty(None, None, 0), 1.0);
        assert_eq!(decode_difficulty(None, None, u32::MAX), 1.0);
    }

    #[test]
    fn post_fork_blocks_report_zero() {
        let tip = chain(&[(0x1d00ffff, false), (0x1c00ffff, false), (0x1c00ffff, true)]);
        assert_eq!(decode_difficulty(Some(&*tip), None, 2), 0.0);
        assert_eq!(decode_difficulty(Some(&*tip), None, 3), 256.0);
    }

    #[test]
    fn missing_index_uses_last_work_block() {
        let tip = chain(&[(0x1d00ffff, false), (0x1c00ffff, false), (0x1b00ffff, true), (0x1b00ffff, true)]);
        assert_eq!(decode_difficulty(None, Some(&*tip), 100), 256.0);
    }

    #[test]
    fn summary_splits_work_and_stake() {
        let tip = chain(&[(0x1d00ffff, false), (0x1c00ffff, true), (0x1e00ffff, false)]);
        let summary = difficulty_summary(Some(&*tip), 100);
        assert_eq!(summary.proof_of_work, 1.0 / 256.0);
        assert_eq!(summary.proof_of_stake, 256.0);

        let empty = difficulty_summary(None, 100);
        assert_eq!(empty, DifficultySummary { proof_of_work: 1.0, proof_of_stake: 1.0 });
    }
}
