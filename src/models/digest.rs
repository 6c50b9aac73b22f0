//! Content digests and listing fingerprints.

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};

use crate::error::{AppError, Result};

/// Content hash, serialized as lowercase hex.
///
/// New digests are always SHA-256. Stores written by earlier releases hold
/// 128-bit MD5 fingerprints; those load as `Legacy` and are kept verbatim.
/// A legacy fingerprint never equals a SHA-256 one, so those listings stay
/// deduplicated by title alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Digest {
    Legacy([u8; 16]),
    Sha256([u8; 32]),
}

impl Digest {
    /// Hash a byte sequence.
    pub fn of(bytes: &[u8]) -> Self {
        Self::Sha256(Sha256::digest(bytes).into())
    }

    /// Combine per-image digests into one listing fingerprint.
    ///
    /// The inputs are sorted first, so the result does not depend on the
    /// order the images appear on the page. Each digest's hex form is fed
    /// into a single accumulator.
    pub fn combine(digests: &[Digest]) -> Self {
        let mut sorted = digests.to_vec();
        sorted.sort();

        let mut hasher = Sha256::new();
        for digest in &sorted {
            hasher.update(digest.to_hex().as_bytes());
        }
        Self::Sha256(hasher.finalize().into())
    }

    /// A fresh random digest for listings without a thumbnails container.
    ///
    /// Never reproducible, so it never collides with a stored fingerprint.
    pub fn sentinel() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::Sha256(bytes)
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }

    pub fn to_hex(&self) -> String {
        match self {
            Self::Legacy(bytes) => hex::encode(bytes),
            Self::Sha256(bytes) => hex::encode(bytes),
        }
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim()).map_err(|e| AppError::parse("digest", e))?;
        if let Ok(bytes) = <[u8; 32]>::try_from(bytes.as_slice()) {
            return Ok(Self::Sha256(bytes));
        }
        if let Ok(bytes) = <[u8; 16]>::try_from(bytes.as_slice()) {
            return Ok(Self::Legacy(bytes));
        }
        Err(AppError::parse(
            "digest",
            format!("expected 16 or 32 bytes, got {}", bytes.len()),
        ))
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_digests() -> Vec<Digest> {
        let images: [&[u8]; 4] = [b"couch-front", b"couch-side", b"couch-back", b"tag"];
        images.iter().map(|bytes| Digest::of(bytes)).collect()
    }

    /// Heap's algorithm, enough for a handful of items.
    fn permutations(items: &[Digest]) -> Vec<Vec<Digest>> {
        fn heap(k: usize, items: &mut Vec<Digest>, out: &mut Vec<Vec<Digest>>) {
            if k == 1 {
                out.push(items.clone());
                return;
            }
            heap(k - 1, items, out);
            for i in 0..k - 1 {
                if k % 2 == 0 {
                    items.swap(i, k - 1);
                } else {
                    items.swap(0, k - 1);
                }
                heap(k - 1, items, out);
            }
        }

        let mut items = items.to_vec();
        let mut out = Vec::new();
        heap(items.len(), &mut items, &mut out);
        out
    }

    #[test]
    fn test_combine_is_order_independent() {
        let digests = image_digests();
        let expected = Digest::combine(&digests);

        let all = permutations(&digests);
        assert_eq!(all.len(), 24);
        for perm in all {
            assert_eq!(Digest::combine(&perm), expected);
        }
    }

    #[test]
    fn test_combine_distinguishes_image_sets() {
        let digests = image_digests();
        let fewer = &digests[..3];
        assert_ne!(Digest::combine(&digests), Digest::combine(fewer));
    }

    #[test]
    fn test_combine_feeds_hex_forms() {
        let a = Digest::of(b"a");
        let b = Digest::of(b"b");
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };

        let mut text = lo.to_hex();
        text.push_str(&hi.to_hex());
        assert_eq!(Digest::combine(&[hi, lo]), Digest::of(text.as_bytes()));
    }

    #[test]
    fn test_sentinels_never_repeat() {
        assert_ne!(Digest::sentinel(), Digest::sentinel());
    }

    #[test]
    fn test_hex_round_trip_through_json() {
        let digest = Digest::of(b"image bytes");
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", digest.to_hex()));
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
    }

    #[test]
    fn test_from_str_rejects_wrong_length() {
        assert!("abcd".parse::<Digest>().is_err());
        assert!("not hex at all".parse::<Digest>().is_err());
        assert!("00".repeat(20).parse::<Digest>().is_err());
    }

    #[test]
    fn test_md5_hex_loads_as_legacy() {
        let hex = "0cc175b9c0f1b6a831c399e269772661";
        let digest: Digest = serde_json::from_str(&format!("\"{hex}\"")).unwrap();
        assert!(digest.is_legacy());
        assert_eq!(digest.to_hex(), hex);
        assert_eq!(serde_json::to_string(&digest).unwrap(), format!("\"{hex}\""));
        assert_ne!(digest, Digest::of(b"a"));
    }
}
