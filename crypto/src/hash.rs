//! Blake2b hashing for proposals and slates.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use grantfund_types::{ProposalId, SlateHash};

type Blake2b256 = Blake2b<U32>;

/// Domain separators for the two hash kinds.
const PROPOSAL_DOMAIN: &[u8] = b"grantfund/proposal";
const SLATE_DOMAIN: &[u8] = b"grantfund/slate";

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash a canonically encoded proposal payload to produce its `ProposalId`.
pub fn hash_proposal(payload_bytes: &[u8]) -> ProposalId {
    ProposalId::new(blake2b_256_multi(&[PROPOSAL_DOMAIN, payload_bytes]))
}

/// Hash an ordered list of proposal ids to produce a `SlateHash`.
pub fn hash_slate(proposal_ids: &[ProposalId]) -> SlateHash {
    let mut hasher = Blake2b256::new();
    hasher.update(SLATE_DOMAIN);
    for id in proposal_ids {
        hasher.update(id.as_bytes());
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    SlateHash::new(output)
}
