use crate::errors::CoreError;
use super::encryption::KdfParams;

/// Magic bytes identifying a Whale Watch database snapshot.
pub const MAGIC: &[u8; 4] = b"WWDB";

pub const CURRENT_VERSION: u16 = 1;

/// magic(4) + version(2) + kdf(12) + salt(16) + nonce(12) + len(8)
pub const HEADER_SIZE: usize = 54;

/// Parsed snapshot header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub version: u16,
    pub kdf_params: KdfParams,
    pub salt: [u8; 16],
    pub nonce: [u8; 12],
    pub ciphertext_len: u64,
}

/// Encode a snapshot file.
///
/// ```text
/// [WWDB] [version u16] [memory_cost u32] [time_cost u32] [parallelism u32]
/// [salt 16B] [nonce 12B] [ciphertext_len u64] [ciphertext]
/// ```
/// Integers are little-endian.
pub fn encode(header: &SnapshotHeader, ciphertext: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&header.version.to_le_bytes());
    buf.extend_from_slice(&header.kdf_params.memory_cost.to_le_bytes());
    buf.extend_from_slice(&header.kdf_params.time_cost.to_le_bytes());
    buf.extend_from_slice(&header.kdf_params.parallelism.to_le_bytes());
    buf.extend_from_slice(&header.salt);
    buf.extend_from_slice(&header.nonce);
    buf.extend_from_slice(&(ciphertext.len() as u64).to_le_bytes());
    buf.extend_from_slice(ciphertext);
    buf
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take<const N: usize>(&mut self, field: &str) -> Result<[u8; N], CoreError> {
        let end = self.pos + N;
        let bytes: [u8; N] = self
            .data
            .get(self.pos..end)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| CoreError::InvalidFileFormat(format!("Truncated header at {field}")))?;
        self.pos = end;
        Ok(bytes)
    }

    fn u16(&mut self, field: &str) -> Result<u16, CoreError> {
        self.take::<2>(field).map(u16::from_le_bytes)
    }

    fn u32(&mut self, field: &str) -> Result<u32, CoreError> {
        self.take::<4>(field).map(u32::from_le_bytes)
    }

    fn u64(&mut self, field: &str) -> Result<u64, CoreError> {
        self.take::<8>(field).map(u64::from_le_bytes)
    }
}

fn check_range(name: &str, value: u32, range: std::ops::RangeInclusive<u32>) -> Result<(), CoreError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::InvalidFileFormat(format!(
            "KDF {name} out of safe range: {value} (expected {}..={})",
            range.start(),
            range.end()
        )))
    }
}

/// Parse a snapshot file into its header and ciphertext.
///
/// KDF costs are bounded so a crafted file cannot make opening it
/// allocate gigabytes or spin for minutes.
pub fn decode(data: &[u8]) -> Result<(SnapshotHeader, &[u8]), CoreError> {
    if data.len() < HEADER_SIZE {
        return Err(CoreError::InvalidFileFormat(
            "File too small to be a Whale Watch snapshot".into(),
        ));
    }

    let mut cur = Cursor { data, pos: 0 };
    if &cur.take::<4>("magic")? != MAGIC {
        return Err(CoreError::InvalidFileFormat(
            "Invalid magic bytes, not a Whale Watch snapshot".into(),
        ));
    }

    let version = cur.u16("version")?;
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let kdf_params = KdfParams {
        memory_cost: cur.u32("memory_cost")?,
        time_cost: cur.u32("time_cost")?,
        parallelism: cur.u32("parallelism")?,
    };
    check_range("memory_cost", kdf_params.memory_cost, 8..=1_048_576)?;
    check_range("time_cost", kdf_params.time_cost, 1..=20)?;
    check_range("parallelism", kdf_params.parallelism, 1..=16)?;

    let salt = cur.take::<16>("salt")?;
    let nonce = cur.take::<12>("nonce")?;
    let ciphertext_len = cur.u64("ciphertext_len")?;

    let body = &data[cur.pos..];
    let len = usize::try_from(ciphertext_len)
        .ok()
        .filter(|&n| n <= body.len())
        .ok_or_else(|| {
            CoreError::InvalidFileFormat(format!(
                "File truncated: expected {ciphertext_len} bytes of ciphertext, got {}",
                body.len()
            ))
        })?;

    Ok((
        SnapshotHeader {
            version,
            kdf_params,
            salt,
            nonce,
            ciphertext_len,
        },
        &body[..len],
    ))
}
