use anyhow::{bail, Context, Result};
use fishdash_core::rng::SeededRng;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Accepts `0x`-prefixed hex or decimal, with optional `_` separators.
pub fn parse_seed(text: &str) -> Result<u32> {
    let trimmed = text.trim();
    let cleaned: String = trimmed.chars().filter(|c| *c != '_').collect();
    let (digits, radix) = match cleaned.get(..2) {
        Some("0x") | Some("0X") => (&cleaned[2..], 16),
        _ => (cleaned.as_str(), 10),
    };
    if digits.is_empty() {
        bail!("seed '{trimmed}' has no digits");
    }
    u32::from_str_radix(digits, radix).with_context(|| format!("seed '{trimmed}' is not a u32"))
}

pub fn seed_to_hex(seed: u32) -> String {
    format!("0x{seed:08x}")
}

/// Seeds separated by commas or whitespace. `#` comments out the rest of a line.
pub fn parse_seed_list(input: &str) -> Result<Vec<u32>> {
    let mut seeds = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let content = line.split_once('#').map_or(line, |(before, _)| before);
        let tokens = content
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty());
        for token in tokens {
            seeds.push(parse_seed(token).with_context(|| format!("line {}", idx + 1))?);
        }
    }
    if seeds.is_empty() {
        bail!("no seeds given");
    }
    Ok(seeds)
}

pub fn read_seed_file(path: &Path) -> Result<Vec<u32>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed reading seed file {}", path.display()))?;
    parse_seed_list(&text).with_context(|| format!("in seed file {}", path.display()))
}

/// `start` followed by successive draws from the game's own generator.
pub fn seed_sequence(start: u32, count: u32) -> Vec<u32> {
    let mut rng = SeededRng::new(start);
    (0..count)
        .map(|idx| if idx == 0 { start } else { rng.next() })
        .collect()
}

/// Writes `bytes`, creating parent directories as needed.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("failed writing {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let encoded = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed encoding {}", path.display()))?;
    write_file(path, &encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_decimal() {
        assert_eq!(parse_seed("0xDEAD_BEEF").unwrap(), 0xDEAD_BEEF);
        assert_eq!(parse_seed(" 0Xff ").unwrap(), 0xFF);
        assert_eq!(parse_seed("1_000").unwrap(), 1_000);
        assert!(parse_seed("").is_err());
        assert!(parse_seed("0x").is_err());
        assert!(parse_seed("0xnope").is_err());
        assert!(parse_seed("-3").is_err());
        assert!(parse_seed("4294967296").is_err());
    }

    #[test]
    fn hex_roundtrip() {
        assert_eq!(seed_to_hex(0xC0FF_EE11), "0xc0ffee11");
        assert_eq!(parse_seed(&seed_to_hex(42)).unwrap(), 42);
    }

    #[test]
    fn list_accepts_commas_spaces_and_comments() {
        assert_eq!(parse_seed_list("1, 0x2,,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(
            parse_seed_list("# smoke set\n0xDEADBEEF 7 # lucky\n\n9\n").unwrap(),
            vec![0xDEAD_BEEF, 7, 9]
        );
        assert!(parse_seed_list(" , ").is_err());
        assert!(parse_seed_list("# only a comment").is_err());

        let err = parse_seed_list("1\n2\nbad").unwrap_err();
        assert!(format!("{err:#}").contains("line 3"), "{err:#}");
    }

    #[test]
    fn seed_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seeds.txt");
        fs::write(&path, "# smoke\n0xDEADBEEF\n\n7\n").unwrap();
        assert_eq!(read_seed_file(&path).unwrap(), vec![0xDEAD_BEEF, 7]);
        assert!(read_seed_file(&dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn sequence_follows_the_game_generator() {
        let seeds = seed_sequence(0xF15D_0001, 4);
        assert_eq!(seeds.len(), 4);
        assert_eq!(seeds[0], 0xF15D_0001);

        let mut rng = SeededRng::new(0xF15D_0001);
        assert_eq!(seeds[1], rng.next());
        assert_eq!(seeds[2], rng.next());
        assert_eq!(seeds, seed_sequence(0xF15D_0001, 4));
        assert!(seed_sequence(1, 0).is_empty());
    }

    #[test]
    fn write_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.bin");
        write_file(&path, &[1, 2, 3]).unwrap();
        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);

        let json = dir.path().join("report.json");
        write_json(&json, &serde_json::json!({ "score": 4 })).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&fs::read(&json).unwrap()).unwrap();
        assert_eq!(value["score"], 4);
    }
}
