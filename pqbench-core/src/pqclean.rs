// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Built-in provider bindings backed by the PQClean `pqcrypto-*` crates.
//!
//! Every binding converts between opaque byte blobs and the typed keys of
//! the underlying crate. Length mismatches surface as
//! [`ProviderError::InvalidInput`] instead of panics.

use crate::adapter::{Encapsulation, KemProvider, KeyPair, SignatureProvider};
use crate::error::{BenchResult, ProviderError};
use crate::registry::ProviderRegistry;
use crate::types::AlgorithmName;

/// Implementation tag for the bindings in this module.
pub const PQCRYPTO: &str = "pqcrypto";

fn invalid(what: &'static str, err: pqcrypto_traits::Error) -> ProviderError {
    ProviderError::InvalidInput {
        what,
        reason: format!("{:?}", err),
    }
}

macro_rules! pqclean_kem {
    ($provider:ident, $krate:ident :: $module:ident) => {
        /// PQClean KEM binding.
        #[derive(Debug, Default)]
        pub struct $provider;

        impl KemProvider for $provider {
            fn keygen(&mut self) -> Result<KeyPair, ProviderError> {
                use pqcrypto_traits::kem::{PublicKey as _, SecretKey as _};

                let (pk, sk) = $krate::$module::keypair();
                Ok(KeyPair {
                    public_key: pk.as_bytes().to_vec(),
                    secret_key: sk.as_bytes().to_vec(),
                })
            }

            fn encapsulate(&mut self, public_key: &[u8]) -> Result<Encapsulation, ProviderError> {
                use pqcrypto_traits::kem::{Ciphertext as _, PublicKey as _, SharedSecret as _};

                let pk = $krate::$module::PublicKey::from_bytes(public_key)
                    .map_err(|e| invalid("public key", e))?;
                let (ss, ct) = $krate::$module::encapsulate(&pk);
                Ok(Encapsulation {
                    ciphertext: ct.as_bytes().to_vec(),
                    shared_secret: ss.as_bytes().to_vec(),
                })
            }

            fn decapsulate(
                &mut self,
                ciphertext: &[u8],
                secret_key: &[u8],
            ) -> Result<Vec<u8>, ProviderError> {
                use pqcrypto_traits::kem::{Ciphertext as _, SecretKey as _, SharedSecret as _};

                let ct = $krate::$module::Ciphertext::from_bytes(ciphertext)
                    .map_err(|e| invalid("ciphertext", e))?;
                let sk = $krate::$module::SecretKey::from_bytes(secret_key)
                    .map_err(|e| invalid("secret key", e))?;
                let ss = $krate::$module::decapsulate(&ct, &sk);
                Ok(ss.as_bytes().to_vec())
            }
        }
    };
}

macro_rules! pqclean_sign {
    ($provider:ident, $krate:ident :: $module:ident) => {
        /// PQClean detached-signature binding.
        #[derive(Debug, Default)]
        pub struct $provider;

        impl SignatureProvider for $provider {
            fn keygen(&mut self) -> Result<KeyPair, ProviderError> {
                use pqcrypto_traits::sign::{PublicKey as _, SecretKey as _};

                let (pk, sk) = $krate::$module::keypair();
                Ok(KeyPair {
                    public_key: pk.as_bytes().to_vec(),
                    secret_key: sk.as_bytes().to_vec(),
                })
            }

            fn sign(&mut self, message: &[u8], secret_key: &[u8]) -> Result<Vec<u8>, ProviderError> {
                use pqcrypto_traits::sign::{DetachedSignature as _, SecretKey as _};

                let sk = $krate::$module::SecretKey::from_bytes(secret_key)
                    .map_err(|e| invalid("secret key", e))?;
                let signature = $krate::$module::detached_sign(message, &sk);
                Ok(signature.as_bytes().to_vec())
            }

            fn verify(&mut self, public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
                use pqcrypto_traits::sign::{DetachedSignature as _, PublicKey as _};

                let Ok(pk) = $krate::$module::PublicKey::from_bytes(public_key) else {
                    return false;
                };
                let Ok(sig) = $krate::$module::DetachedSignature::from_bytes(signature) else {
                    return false;
                };
                $krate::$module::verify_detached_signature(&sig, message, &pk).is_ok()
            }
        }
    };
}

pqclean_kem!(MlKem512, pqcrypto_mlkem::mlkem512);
pqclean_kem!(MlKem768, pqcrypto_mlkem::mlkem768);
pqclean_kem!(MlKem1024, pqcrypto_mlkem::mlkem1024);

pqclean_sign!(MlDsa44, pqcrypto_mldsa::mldsa44);
pqclean_sign!(MlDsa65, pqcrypto_mldsa::mldsa65);
pqclean_sign!(MlDsa87, pqcrypto_mldsa::mldsa87);
pqclean_sign!(Falcon512, pqcrypto_falcon::falcon512);
pqclean_sign!(Falcon1024, pqcrypto_falcon::falcon1024);
pqclean_sign!(SphincsShake128sSimple, pqcrypto_sphincsplus::sphincsshake128ssimple);
pqclean_sign!(SphincsShake128fSimple, pqcrypto_sphincsplus::sphincsshake128fsimple);

/// Register every built-in binding under the `pqcrypto` implementation tag.
pub fn register_builtin(registry: &ProviderRegistry) -> BenchResult<()> {
    let kems: [(&str, fn() -> Box<dyn KemProvider>); 3] = [
        ("ML-KEM-512", || Box::new(MlKem512) as Box<dyn KemProvider>),
        ("ML-KEM-768", || Box::new(MlKem768) as Box<dyn KemProvider>),
        ("ML-KEM-1024", || Box::new(MlKem1024) as Box<dyn KemProvider>),
    ];
    for (name, make) in kems {
        registry.register_kem(AlgorithmName::new(name)?, PQCRYPTO, move || Ok(make()))?;
    }

    let signers: [(&str, fn() -> Box<dyn SignatureProvider>); 8] = [
        ("ML-DSA-44", || Box::new(MlDsa44) as Box<dyn SignatureProvider>),
        ("ML-DSA-65", || Box::new(MlDsa65) as Box<dyn SignatureProvider>),
        ("ML-DSA-87", || Box::new(MlDsa87) as Box<dyn SignatureProvider>),
        ("Falcon-512", || Box::new(Falcon512) as Box<dyn SignatureProvider>),
        ("Falcon-1024", || Box::new(Falcon1024) as Box<dyn SignatureProvider>),
        (
            "SPHINCS+-SHAKE-128s-simple",
            || Box::new(SphincsShake128sSimple) as Box<dyn SignatureProvider>,
        ),
        (
            "SPHINCS+-SHAKE-128f-simple",
            || Box::new(SphincsShake128fSimple) as Box<dyn SignatureProvider>,
        ),
        // Short name used by older configuration files
        ("SPHINCS+-128s-simple", || Box::new(SphincsShake128sSimple) as Box<dyn SignatureProvider>),
    ];
    for (name, make) in signers {
        registry.register_signature(AlgorithmName::new(name)?, PQCRYPTO, move || Ok(make()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mlkem_round_trip() {
        let mut kem = MlKem512;
        let keys = kem.keygen().unwrap();
        let encapsulated = kem.encapsulate(&keys.public_key).unwrap();
        let recovered = kem
            .decapsulate(&encapsulated.ciphertext, &keys.secret_key)
            .unwrap();
        assert_eq!(recovered, encapsulated.shared_secret);
        assert_eq!(keys.secret_key.len(), 1632);
    }

    #[test]
    fn test_kem_rejects_truncated_public_key() {
        let mut kem = MlKem768;
        let err = kem.encapsulate(&[0u8; 7]).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::InvalidInput {
                what: "public key",
                ..
            }
        ));
    }

    #[test]
    fn test_mldsa_sign_and_verify() {
        let mut dsa = MlDsa44;
        let keys = dsa.keygen().unwrap();
        let message = b"benchmark message";
        let signature = dsa.sign(message, &keys.secret_key).unwrap();
        assert!(dsa.verify(&keys.public_key, message, &signature));
        assert!(!dsa.verify(&keys.public_key, b"other message", &signature));
    }

    #[test]
    fn test_verify_malformed_input_is_false() {
        let mut falcon = Falcon512;
        let keys = falcon.keygen().unwrap();
        assert!(!falcon.verify(&keys.public_key, b"msg", &[1, 2, 3]));
        assert!(!falcon.verify(&[0u8; 3], b"msg", &[1, 2, 3]));
    }
}
