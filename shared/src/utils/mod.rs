//! Utility functions and helpers

use anyhow::Result;

/// Convert bytes to a hexadecimal string
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Parse a hexadecimal string into bytes
pub fn hex_to_bytes(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    if s.len() % 2 != 0 {
        anyhow::bail!("Hex string has odd length: {}", s.len());
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            s.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| anyhow::anyhow!("Invalid hex digit at offset {}", i))
        })
        .collect()
}

/// Parse a dotted command index path (e.g. "0.3.12")
pub fn parse_command_indices(s: &str) -> Result<Vec<u64>> {
    let s = s.trim();
    if s.is_empty() {
        anyhow::bail!("Empty command index");
    }
    s.split('.')
        .map(|part| {
            part.parse::<u64>()
                .map_err(|e| anyhow::anyhow!("Invalid command index '{}': {}", part, e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_hex() {
        assert_eq!(bytes_to_hex(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
    }

    #[test]
    fn test_hex_to_bytes() {
        assert_eq!(hex_to_bytes("deadbeef").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(hex_to_bytes("DEADBEEF").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert!(hex_to_bytes("abc").is_err());
        assert!(hex_to_bytes("zz").is_err());
    }

    #[test]
    fn test_parse_command_indices() {
        assert_eq!(parse_command_indices("0.3.12").unwrap(), vec![0, 3, 12]);
        assert_eq!(parse_command_indices("7").unwrap(), vec![7]);
        assert!(parse_command_indices("").is_err());
        assert!(parse_command_indices("1..2").is_err());
        assert!(parse_command_indices("1.x").is_err());
    }
}
