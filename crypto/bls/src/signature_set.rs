use crate::{Error, Hash256, PublicKeyBytes, SignatureBytes, DST};
use blst::min_pk::{PublicKey, Signature};
use blst::BLST_ERROR;

/// A signature over `message` by the aggregate of `signing_keys`.
#[derive(Clone, Debug)]
pub struct SignatureSet<'a> {
    pub signature: &'a SignatureBytes,
    pub signing_keys: Vec<&'a PublicKeyBytes>,
    pub message: Hash256,
}

impl<'a> SignatureSet<'a> {
    pub fn single_pubkey(
        signature: &'a SignatureBytes,
        signing_key: &'a PublicKeyBytes,
        message: Hash256,
    ) -> Self {
        Self {
            signature,
            signing_keys: vec![signing_key],
            message,
        }
    }

    pub fn multiple_pubkeys(
        signature: &'a SignatureBytes,
        signing_keys: Vec<&'a PublicKeyBytes>,
        message: Hash256,
    ) -> Self {
        Self {
            signature,
            signing_keys,
            message,
        }
    }

    /// Returns `true` if the signature is valid. Malformed points are treated as invalid.
    #[cfg(not(feature = "fake_crypto"))]
    pub fn verify(&self) -> bool {
        self.verify_points().unwrap_or(false)
    }

    #[cfg(feature = "fake_crypto")]
    pub fn verify(&self) -> bool {
        true
    }

    #[cfg_attr(feature = "fake_crypto", allow(dead_code))]
    fn verify_points(&self) -> Result<bool, Error> {
        if self.signing_keys.is_empty() {
            return Ok(false);
        }
        let signature = Signature::from_bytes(self.signature.as_bytes())?;
        let pubkeys = self
            .signing_keys
            .iter()
            .map(|pubkey| PublicKey::key_validate(pubkey.as_bytes()))
            .collect::<Result<Vec<_>, _>>()?;
        let refs = pubkeys.iter().collect::<Vec<_>>();

        let result = signature.fast_aggregate_verify(true, self.message.as_slice(), DST, &refs);
        Ok(result == BLST_ERROR::BLST_SUCCESS)
    }
}

/// Returns `true` if every set verifies.
pub fn verify_signature_sets<'a, 'b>(sets: impl IntoIterator<Item = &'b SignatureSet<'a>>) -> bool
where
    'a: 'b,
{
    sets.into_iter().all(SignatureSet::verify)
}
