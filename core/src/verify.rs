use serde::{Deserialize, Serialize};

use crate::error::TapeError;
use crate::sim::{replay_strict, ReplayResult, ReplayViolation, Viewport};
use crate::tape::{decode_input_byte, parse_tape, FrameInput};

/// Facts established by re-running a tape from its seed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunJournal {
    pub seed: u32,
    pub frame_count: u32,
    pub final_score: u32,
    pub final_coins: u32,
    pub game_over: bool,
    pub viewport_width: u16,
    pub viewport_height: u16,
    pub tape_checksum: u32,
}

pub fn verify_tape(bytes: &[u8], max_frames: u32) -> Result<RunJournal, TapeError> {
    verify_tape_with_replay(bytes, max_frames, replay_strict)
}

fn verify_tape_with_replay<F>(
    bytes: &[u8],
    max_frames: u32,
    replay_fn: F,
) -> Result<RunJournal, TapeError>
where
    F: FnOnce(u32, Viewport, &[FrameInput]) -> Result<ReplayResult, ReplayViolation>,
{
    let tape = parse_tape(bytes, max_frames)?;

    // parse_tape has already rejected undecodable bytes.
    let inputs: Vec<FrameInput> = tape
        .inputs
        .iter()
        .map(|byte| decode_input_byte(*byte).unwrap_or_default())
        .collect();

    let replay_result =
        replay_fn(tape.header.seed, tape.viewport, &inputs).map_err(|violation| {
            match violation {
                ReplayViolation::Rule { frame_count, rule } => TapeError::RuleViolation {
                    frame: frame_count,
                    rule,
                },
                ReplayViolation::InputAfterGameOver { frame_count } => {
                    TapeError::InputAfterGameOver { frame: frame_count }
                }
            }
        })?;

    if replay_result.frame_count != tape.header.frame_count {
        return Err(TapeError::FrameCountMismatch {
            claimed: tape.header.frame_count,
            computed: replay_result.frame_count,
        });
    }

    if replay_result.final_score != tape.footer.final_score {
        return Err(TapeError::ScoreMismatch {
            claimed: tape.footer.final_score,
            computed: replay_result.final_score,
        });
    }

    if replay_result.final_coins != tape.footer.final_coins {
        return Err(TapeError::CoinMismatch {
            claimed: tape.footer.final_coins,
            computed: replay_result.final_coins,
        });
    }

    tracing::debug!(
        seed = tape.header.seed,
        frames = replay_result.frame_count,
        score = replay_result.final_score,
        "tape verified"
    );

    Ok(RunJournal {
        seed: tape.header.seed,
        frame_count: replay_result.frame_count,
        final_score: replay_result.final_score,
        final_coins: replay_result.final_coins,
        game_over: replay_result.game_over,
        viewport_width: tape.header.viewport_width,
        viewport_height: tape.header.viewport_height,
        tape_checksum: tape.footer.checksum,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{TAPE_HEADER_SIZE, TAPE_MAGIC, TAPE_VERSION};
    use crate::error::RuleCode;
    use crate::sim::replay;
    use crate::tape::{crc32, serialize_tape};

    fn viewport() -> Viewport {
        Viewport::new(800, 600).unwrap()
    }

    fn footer_offset(frame_count: usize) -> usize {
        TAPE_HEADER_SIZE + frame_count
    }

    fn valid_tape(seed: u32, inputs: &[u8]) -> Vec<u8> {
        let result = replay(seed, viewport(), inputs);
        serialize_tape(
            seed,
            viewport(),
            inputs,
            result.final_score,
            result.final_coins,
        )
    }

    #[test]
    fn verifies_an_honest_tape() {
        // The first column reaches the fish after 100 ticks, so any short tape survives.
        let inputs: Vec<u8> = (0..100u32).map(|i| ((i / 10) % 3) as u8).collect();
        let tape = valid_tape(0x1234_5678, &inputs);

        let journal = verify_tape(&tape, 10_000).unwrap();
        assert_eq!(journal.seed, 0x1234_5678);
        assert_eq!(journal.viewport_width, 800);
        assert_eq!(journal.viewport_height, 600);
        assert_eq!(journal.tape_checksum, crc32(&tape[..tape.len() - 4]));
    }

    #[test]
    fn verifies_a_tape_that_ends_on_the_crash() {
        let tape = valid_tape(0xDEAD_BEEF, &[0x01u8; 102]);
        let journal = verify_tape(&tape, 10_000).unwrap();
        assert!(journal.game_over);
        assert_eq!(journal.frame_count, 102);
    }

    #[test]
    fn rejects_inputs_past_the_crash() {
        let inputs = [0x01u8; 150];
        let tape = valid_tape(0xDEAD_BEEF, &inputs);
        let err = verify_tape(&tape, 10_000).unwrap_err();
        assert_eq!(err, TapeError::InputAfterGameOver { frame: 102 });
    }

    #[test]
    fn detects_score_tampering() {
        let inputs = [0x00u8; 60];
        let mut tape = valid_tape(0x1234_5678, &inputs);
        let offset = footer_offset(inputs.len());
        tape[offset..offset + 4].copy_from_slice(&7u32.to_le_bytes());
        let checksum = crc32(&tape[..offset + 8]);
        tape[offset + 8..offset + 12].copy_from_slice(&checksum.to_le_bytes());

        let err = verify_tape(&tape, 10_000).unwrap_err();
        assert!(matches!(err, TapeError::ScoreMismatch { claimed: 7, .. }));
    }

    #[test]
    fn detects_coin_tampering() {
        let inputs = [0x00u8; 60];
        let mut tape = valid_tape(0x1234_5678, &inputs);
        let offset = footer_offset(inputs.len());
        tape[offset + 4..offset + 8].copy_from_slice(&3u32.to_le_bytes());
        let checksum = crc32(&tape[..offset + 8]);
        tape[offset + 8..offset + 12].copy_from_slice(&checksum.to_le_bytes());

        let err = verify_tape(&tape, 10_000).unwrap_err();
        assert!(matches!(err, TapeError::CoinMismatch { claimed: 3, .. }));
    }

    #[test]
    fn maps_rule_violation_to_tape_error() {
        let tape = valid_tape(0xDEAD_BEEF, &[0x00u8; 4]);
        let err = verify_tape_with_replay(&tape, 100, |_seed, _viewport, _inputs| {
            Err(ReplayViolation::Rule {
                frame_count: 3,
                rule: RuleCode::PlayerBounds,
            })
        })
        .unwrap_err();

        assert_eq!(
            err,
            TapeError::RuleViolation {
                frame: 3,
                rule: RuleCode::PlayerBounds
            }
        );
    }

    #[test]
    fn detects_frame_count_mismatch_when_replay_disagrees() {
        let inputs = [0x00u8; 4];
        let tape = valid_tape(0xDEAD_BEEF, &inputs);
        let expected = replay(0xDEAD_BEEF, viewport(), &inputs);
        let err = verify_tape_with_replay(&tape, 100, |_seed, _viewport, _inputs| {
            Ok(ReplayResult {
                frame_count: expected.frame_count + 1,
                ..expected
            })
        })
        .unwrap_err();

        assert_eq!(
            err,
            TapeError::FrameCountMismatch {
                claimed: 4,
                computed: 5
            }
        );
    }

    #[test]
    fn replay_sees_the_tape_viewport_and_inputs() {
        let tape = valid_tape(0xFEED_BEEF, &[0x01, 0x02, 0x00]);
        let err = verify_tape_with_replay(&tape, 100, |seed, viewport, inputs| {
            assert_eq!(seed, 0xFEED_BEEF);
            assert_eq!(viewport, Viewport::new(800, 600).unwrap());
            assert_eq!(inputs, &[FrameInput::Up, FrameInput::Down, FrameInput::None]);
            Err(ReplayViolation::InputAfterGameOver { frame_count: 1 })
        })
        .unwrap_err();
        assert_eq!(err, TapeError::InputAfterGameOver { frame: 1 });
    }

    #[test]
    fn single_byte_tampering_is_rejected() {
        let inputs = [0x01u8, 0x02, 0x00, 0x02, 0x01, 0x00, 0x00, 0x01];
        let good_tape = valid_tape(0xFEED_BEEF, &inputs);
        assert!(verify_tape(&good_tape, 100).is_ok());

        for idx in 0..good_tape.len() {
            let mut tampered = good_tape.clone();
            tampered[idx] ^= 0x01;
            assert!(
                verify_tape(&tampered, 100).is_err(),
                "tampering byte index {idx} must fail verification"
            );
        }
    }

    #[test]
    fn parse_checks_happen_before_replay() {
        let mut tape = valid_tape(0xDEAD_BEEF, &[0x00u8; 4]);
        tape[0..4].copy_from_slice(&TAPE_MAGIC.wrapping_add(1).to_le_bytes());
        tape[4] = TAPE_VERSION + 1;

        let err = verify_tape_with_replay(&tape, 10, |_seed, _viewport, _inputs| {
            panic!("replay must not run when parse fails")
        })
        .unwrap_err();

        assert!(matches!(err, TapeError::InvalidMagic { .. }));
    }
}
