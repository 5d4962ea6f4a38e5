//! c32check encoding for human-readable addresses.
//!
//! Addresses render as `S` + version character + c32(hash160 | checksum),
//! where the checksum is the first four bytes of SHA-256d(version | hash160).

use crate::crypto::sha256d;
use crate::error::CodecError;

const C32_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

fn c32_digit(c: char) -> Option<u8> {
    // Accept lowercase and the commonly confused characters.
    let c = match c.to_ascii_uppercase() {
        'O' => '0',
        'L' | 'I' => '1',
        other => other,
    };
    C32_ALPHABET.iter().position(|b| *b as char == c).map(|i| i as u8)
}

/// Encode bytes as c32, preserving leading zero bytes as `0` digits.
pub fn c32_encode(data: &[u8]) -> String {
    let mut out: Vec<u8> = Vec::with_capacity(data.len() * 8 / 5 + 1);
    let mut carry: u16 = 0;
    let mut carry_bits: u32 = 0;

    for byte in data.iter().rev() {
        carry |= (*byte as u16) << carry_bits;
        carry_bits += 8;
        while carry_bits >= 5 {
            out.push(C32_ALPHABET[(carry & 0x1f) as usize]);
            carry >>= 5;
            carry_bits -= 5;
        }
    }
    if carry_bits > 0 {
        out.push(C32_ALPHABET[(carry & 0x1f) as usize]);
    }

    while out.last() == Some(&b'0') {
        out.pop();
    }
    for byte in data {
        if *byte != 0 {
            break;
        }
        out.push(b'0');
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

/// Decode a c32 string, preserving leading `0` digits as zero bytes.
pub fn c32_decode(input: &str) -> Result<Vec<u8>, CodecError> {
    let digits = input
        .chars()
        .map(|c| c32_digit(c).ok_or_else(|| CodecError::InvalidAddress(format!("invalid c32 character {:?}", c))))
        .collect::<Result<Vec<u8>, _>>()?;

    let mut out: Vec<u8> = Vec::with_capacity(digits.len() * 5 / 8 + 1);
    let mut carry: u16 = 0;
    let mut carry_bits: u32 = 0;
    for digit in digits.iter().rev() {
        carry |= (*digit as u16) << carry_bits;
        carry_bits += 5;
        if carry_bits >= 8 {
            out.push((carry & 0xff) as u8);
            carry >>= 8;
            carry_bits -= 8;
        }
    }
    if carry_bits > 0 && carry != 0 {
        out.push(carry as u8);
    }

    while out.last() == Some(&0) {
        out.pop();
    }
    for digit in &digits {
        if *digit != 0 {
            break;
        }
        out.push(0);
    }
    out.reverse();
    Ok(out)
}

/// Render a version and hash160 as a c32check address.
pub fn c32_address(version: u8, hash160: &[u8; 20]) -> Result<String, CodecError> {
    if version >= 32 {
        return Err(CodecError::InvalidAddress(format!("version {} out of range", version)));
    }
    let mut data = Vec::with_capacity(24);
    data.extend_from_slice(hash160);
    data.extend_from_slice(&checksum(version, hash160));
    Ok(format!("S{}{}", C32_ALPHABET[version as usize] as char, c32_encode(&data)))
}

/// Parse a c32check address into its version and hash160.
pub fn c32_address_decode(address: &str) -> Result<(u8, [u8; 20]), CodecError> {
    let invalid = |why: &str| CodecError::InvalidAddress(format!("{}: {}", why, address));

    if !address.is_ascii() || address.len() < 5 {
        return Err(invalid("too short"));
    }
    let mut chars = address.chars();
    if chars.next() != Some('S') {
        return Err(invalid("missing S prefix"));
    }
    let version = chars
        .next()
        .and_then(c32_digit)
        .ok_or_else(|| invalid("bad version character"))?;

    let data = c32_decode(&address[2..])?;
    if data.len() != 24 {
        return Err(invalid("wrong payload length"));
    }
    let mut hash160 = [0u8; 20];
    hash160.copy_from_slice(&data[..20]);
    if data[20..] != checksum(version, &hash160) {
        return Err(invalid("checksum mismatch"));
    }
    Ok((version, hash160))
}

fn checksum(version: u8, hash160: &[u8; 20]) -> [u8; 4] {
    let mut preimage = Vec::with_capacity(21);
    preimage.push(version);
    preimage.extend_from_slice(hash160);
    let digest = sha256d(&preimage);
    [digest[0], digest[1], digest[2], digest[3]]
}
