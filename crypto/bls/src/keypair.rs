use crate::{Error, Hash256, PublicKeyBytes, SignatureBytes, DST};
use blst::min_pk::{AggregateSignature, SecretKey, Signature};

/// A BLS secret key and its compressed public key.
#[derive(Clone)]
pub struct Keypair {
    secret: SecretKey,
    pub pk: PublicKeyBytes,
}

impl Keypair {
    /// Derives a keypair from input keying material, which must be at least 32 bytes.
    pub fn from_ikm(ikm: &[u8]) -> Result<Self, Error> {
        let secret = SecretKey::key_gen(ikm, &[])?;
        let pk = PublicKeyBytes::from(secret.sk_to_pk().compress());
        Ok(Self { secret, pk })
    }

    /// Insecure keypair derived from `index`, for tests and local networks.
    pub fn deterministic(index: usize) -> Self {
        let mut ikm = [0; 32];
        ikm[..8].copy_from_slice(&(index as u64).to_le_bytes());
        ikm[31] = 0x42;
        Self::from_ikm(&ikm).expect("32 bytes of ikm is always sufficient")
    }

    pub fn sign(&self, message: Hash256) -> SignatureBytes {
        SignatureBytes::from(self.secret.sign(message.as_slice(), DST, &[]).compress())
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair").field("pk", &self.pk).finish()
    }
}

/// Aggregates compressed signatures into a single compressed signature.
pub fn aggregate_signatures(signatures: &[SignatureBytes]) -> Result<SignatureBytes, Error> {
    if signatures.is_empty() {
        return Err(Error::EmptyAggregate);
    }
    let points = signatures
        .iter()
        .map(|signature| Signature::from_bytes(signature.as_bytes()))
        .collect::<Result<Vec<_>, _>>()?;
    let refs = points.iter().collect::<Vec<_>>();
    let aggregate = AggregateSignature::aggregate(&refs, true)?;
    Ok(SignatureBytes::from(aggregate.to_signature().compress()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_keys_are_stable_and_distinct() {
        assert_eq!(Keypair::deterministic(3).pk, Keypair::deterministic(3).pk);
        assert_ne!(Keypair::deterministic(3).pk, Keypair::deterministic(4).pk);
    }

    #[test]
    fn short_ikm_is_rejected() {
        assert!(Keypair::from_ikm(&[1; 16]).is_err());
    }

    #[test]
    fn aggregate_of_nothing_fails() {
        assert_eq!(aggregate_signatures(&[]), Err(Error::EmptyAggregate));
    }
}
