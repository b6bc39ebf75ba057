use serde::{Deserialize, Serialize};

use crate::constants::{TAPE_FOOTER_SIZE, TAPE_HEADER_SIZE, TAPE_MAGIC, TAPE_VERSION};
use crate::error::TapeError;
use crate::sim::Viewport;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeHeader {
    pub magic: u32,
    pub version: u8,
    pub seed: u32,
    pub frame_count: u32,
    pub viewport_width: u16,
    pub viewport_height: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeFooter {
    pub final_score: u32,
    pub final_coins: u32,
    pub checksum: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TapeView<'a> {
    pub header: TapeHeader,
    pub viewport: Viewport,
    pub inputs: &'a [u8],
    pub footer: TapeFooter,
}

/// Steering resolved for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameInput {
    #[default]
    None,
    Up,
    Down,
}

const INPUT_UP: u8 = 0x01;
const INPUT_DOWN: u8 = 0x02;

#[inline]
pub fn encode_input_byte(input: FrameInput) -> u8 {
    match input {
        FrameInput::None => 0,
        FrameInput::Up => INPUT_UP,
        FrameInput::Down => INPUT_DOWN,
    }
}

/// Returns `None` for bytes that do not encode a single steering direction.
#[inline]
pub fn decode_input_byte(byte: u8) -> Option<FrameInput> {
    match byte {
        0 => Some(FrameInput::None),
        INPUT_UP => Some(FrameInput::Up),
        INPUT_DOWN => Some(FrameInput::Down),
        _ => None,
    }
}

pub fn parse_tape(bytes: &[u8], max_frames: u32) -> Result<TapeView<'_>, TapeError> {
    let min_len = TAPE_HEADER_SIZE + TAPE_FOOTER_SIZE;
    if bytes.len() < min_len {
        return Err(TapeError::TapeTooShort {
            actual: bytes.len(),
            min: min_len,
        });
    }

    let magic = read_u32_le(bytes, 0);
    if magic != TAPE_MAGIC {
        return Err(TapeError::InvalidMagic { found: magic });
    }

    let version = bytes[4];
    if version != TAPE_VERSION {
        return Err(TapeError::UnsupportedVersion { found: version });
    }
    if bytes[5..8].iter().any(|byte| *byte != 0) {
        return Err(TapeError::HeaderReservedNonZero);
    }

    let seed = read_u32_le(bytes, 8);
    let frame_count = read_u32_le(bytes, 12);
    let viewport_width = read_u16_le(bytes, 16);
    let viewport_height = read_u16_le(bytes, 18);
    let viewport = Viewport::new(viewport_width as i32, viewport_height as i32)
        .map_err(TapeError::InvalidViewport)?;

    if frame_count == 0 || frame_count > max_frames {
        return Err(TapeError::FrameCountOutOfRange {
            frame_count,
            max_frames,
        });
    }

    let expected_len = TAPE_HEADER_SIZE + frame_count as usize + TAPE_FOOTER_SIZE;
    if bytes.len() != expected_len {
        return Err(TapeError::TapeLengthMismatch {
            expected: expected_len,
            actual: bytes.len(),
        });
    }

    let inputs_start = TAPE_HEADER_SIZE;
    let inputs_end = inputs_start + frame_count as usize;
    let inputs = &bytes[inputs_start..inputs_end];

    if let Some((frame, byte)) = inputs
        .iter()
        .enumerate()
        .find(|(_, byte)| decode_input_byte(**byte).is_none())
    {
        return Err(TapeError::InvalidInputByte {
            frame: frame as u32,
            byte: *byte,
        });
    }

    let final_score = read_u32_le(bytes, inputs_end);
    let final_coins = read_u32_le(bytes, inputs_end + 4);
    let checksum = read_u32_le(bytes, inputs_end + 8);

    let computed = crc32(&bytes[..inputs_end + 8]);
    if checksum != computed {
        return Err(TapeError::CrcMismatch {
            stored: checksum,
            computed,
        });
    }

    Ok(TapeView {
        header: TapeHeader {
            magic,
            version,
            seed,
            frame_count,
            viewport_width,
            viewport_height,
        },
        viewport,
        inputs,
        footer: TapeFooter {
            final_score,
            final_coins,
            checksum,
        },
    })
}

pub fn serialize_tape(
    seed: u32,
    viewport: Viewport,
    inputs: &[u8],
    final_score: u32,
    final_coins: u32,
) -> Vec<u8> {
    let total_len = TAPE_HEADER_SIZE + inputs.len() + TAPE_FOOTER_SIZE;
    let mut data = vec![0u8; total_len];

    write_u32_le(&mut data, 0, TAPE_MAGIC);
    data[4] = TAPE_VERSION;
    write_u32_le(&mut data, 8, seed);
    write_u32_le(&mut data, 12, inputs.len() as u32);
    write_u16_le(&mut data, 16, viewport.width() as u16);
    write_u16_le(&mut data, 18, viewport.height() as u16);

    let body_start = TAPE_HEADER_SIZE;
    let body_end = body_start + inputs.len();
    data[body_start..body_end].copy_from_slice(inputs);

    write_u32_le(&mut data, body_end, final_score);
    write_u32_le(&mut data, body_end + 4, final_coins);

    let checksum = crc32(&data[..body_end + 8]);
    write_u32_le(&mut data, body_end + 8, checksum);

    data
}

#[inline]
fn read_u16_le(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

#[inline]
fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[inline]
fn write_u16_le(bytes: &mut [u8], offset: usize, value: u16) {
    bytes[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

#[inline]
fn write_u32_le(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

const CRC_TABLE: [u32; 256] = build_crc_table();

const fn build_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;

    while i < 256 {
        let mut c = i as u32;
        let mut j = 0;

        while j < 8 {
            c = if (c & 1) != 0 {
                0xEDB8_8320u32 ^ (c >> 1)
            } else {
                c >> 1
            };
            j += 1;
        }

        table[i] = c;
        i += 1;
    }

    table
}

pub fn crc32(data: &[u8]) -> u32 {
    let crc = data.iter().fold(0xFFFF_FFFFu32, |crc, byte| {
        CRC_TABLE[((crc ^ *byte as u32) & 0xFF) as usize] ^ (crc >> 8)
    });
    crc ^ 0xFFFF_FFFF
}
