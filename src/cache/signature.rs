use crate::error::RouterError;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "SIGNATURE-HMAC-SHA256: ";

const HEADER_PREFIX: &[u8] = b"SIGNATURE-";
const DIGEST_HEX_LEN: usize = 64;

/// HMAC-SHA256 over the serialized route table.
#[derive(Clone)]
pub struct Signer {
    key: Vec<u8>,
}

impl Signer {
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        Self {
            key: key.as_ref().to_vec(),
        }
    }

    pub fn sign(&self, payload: &[u8]) -> Result<String, RouterError> {
        let mut mac = self.mac()?;
        mac.update(payload);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Constant-time check of a hex digest against `payload`.
    pub fn verify(&self, payload: &[u8], digest: &str) -> Result<(), RouterError> {
        if digest.len() != DIGEST_HEX_LEN {
            return Err(RouterError::InvalidSignature(
                "malformed signature header".into(),
            ));
        }
        let expected = hex::decode(digest)
            .map_err(|_| RouterError::InvalidSignature("malformed signature header".into()))?;
        let mut mac = self.mac()?;
        mac.update(payload);
        mac.verify_slice(&expected)
            .map_err(|_| RouterError::InvalidSignature("signature mismatch".into()))
    }

    fn mac(&self) -> Result<HmacSha256, RouterError> {
        HmacSha256::new_from_slice(&self.key)
            .map_err(|_| RouterError::InvalidSignature("unusable signature key".into()))
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

/// Prepends the signature header line when a signer is configured.
pub(crate) fn seal(signer: Option<&Signer>, payload: Vec<u8>) -> Result<Vec<u8>, RouterError> {
    let signer = match signer {
        Some(s) => s,
        None => return Ok(payload),
    };
    let digest = signer.sign(&payload)?;
    let mut out = Vec::with_capacity(SIGNATURE_HEADER.len() + digest.len() + 1 + payload.len());
    out.extend_from_slice(SIGNATURE_HEADER.as_bytes());
    out.extend_from_slice(digest.as_bytes());
    out.push(b'\n');
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Returns the verified payload. With a signer, a missing or malformed
/// header is an error; nothing is trusted unverified.
pub(crate) fn open<'a>(signer: Option<&Signer>, bytes: &'a [u8]) -> Result<&'a [u8], RouterError> {
    let signer = match signer {
        Some(s) => s,
        None => return Ok(skip_header(bytes)),
    };

    let rest = bytes
        .strip_prefix(SIGNATURE_HEADER.as_bytes())
        .ok_or_else(|| RouterError::InvalidSignature("missing signature header".into()))?;
    let newline = rest
        .iter()
        .position(|&b| b == b'\n')
        .ok_or_else(|| RouterError::InvalidSignature("malformed signature header".into()))?;
    let digest = std::str::from_utf8(&rest[..newline])
        .map_err(|_| RouterError::InvalidSignature("malformed signature header".into()))?;
    let payload = &rest[newline + 1..];

    signer.verify(payload, digest)?;
    Ok(payload)
}

fn skip_header(bytes: &[u8]) -> &[u8] {
    if !bytes.starts_with(HEADER_PREFIX) {
        return bytes;
    }
    match bytes.iter().position(|&b| b == b'\n') {
        Some(i) => &bytes[i + 1..],
        None => &[],
    }
}
