// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Uniform capability interface over cryptographic providers.
//!
//! A provider implements [`KemProvider`] or [`SignatureProvider`] on raw byte
//! blobs. The engine never talks to a provider directly: it holds an
//! [`AlgorithmHandle`], which tags the provider with its algorithm name and
//! turns provider failures into [`AdapterError::OperationFailure`].
//!
//! Signatures follow one contract: detached signatures and a boolean verify.

use crate::error::{AdapterError, ProviderError};
use crate::types::{AlgorithmKind, AlgorithmName, Operation};

/// Freshly generated key material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub public_key: Vec<u8>,
    pub secret_key: Vec<u8>,
}

/// Output of a KEM encapsulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encapsulation {
    pub ciphertext: Vec<u8>,
    pub shared_secret: Vec<u8>,
}

/// Key-encapsulation mechanism provider.
///
/// Implementations receive and return opaque blobs; structural validation
/// of keys and ciphertexts is the provider's own business.
pub trait KemProvider {
    fn keygen(&mut self) -> Result<KeyPair, ProviderError>;

    fn encapsulate(&mut self, public_key: &[u8]) -> Result<Encapsulation, ProviderError>;

    fn decapsulate(&mut self, ciphertext: &[u8], secret_key: &[u8])
        -> Result<Vec<u8>, ProviderError>;
}

/// Signature scheme provider producing detached signatures.
pub trait SignatureProvider {
    fn keygen(&mut self) -> Result<KeyPair, ProviderError>;

    fn sign(&mut self, message: &[u8], secret_key: &[u8]) -> Result<Vec<u8>, ProviderError>;

    /// Any internal failure (malformed key, malformed signature, bad
    /// signature) is reported as `false`.
    fn verify(&mut self, public_key: &[u8], message: &[u8], signature: &[u8]) -> bool;
}

/// Live binding of one configured KEM to its provider.
pub struct KemHandle {
    name: AlgorithmName,
    provider: Box<dyn KemProvider>,
}

impl KemHandle {
    pub fn new(name: AlgorithmName, provider: Box<dyn KemProvider>) -> Self {
        Self { name, provider }
    }

    pub fn name(&self) -> &AlgorithmName {
        &self.name
    }

    pub fn keygen(&mut self) -> Result<KeyPair, AdapterError> {
        self.provider
            .keygen()
            .map_err(|e| operation_failure(&self.name, Operation::Keygen, e))
    }

    pub fn encapsulate(&mut self, public_key: &[u8]) -> Result<Encapsulation, AdapterError> {
        self.provider
            .encapsulate(public_key)
            .map_err(|e| operation_failure(&self.name, Operation::Encapsulate, e))
    }

    pub fn decapsulate(
        &mut self,
        ciphertext: &[u8],
        secret_key: &[u8],
    ) -> Result<Vec<u8>, AdapterError> {
        self.provider
            .decapsulate(ciphertext, secret_key)
            .map_err(|e| operation_failure(&self.name, Operation::Decapsulate, e))
    }
}

impl std::fmt::Debug for KemHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KemHandle").field("name", &self.name).finish()
    }
}

/// Live binding of one configured signature scheme to its provider.
pub struct SignatureHandle {
    name: AlgorithmName,
    provider: Box<dyn SignatureProvider>,
}

impl SignatureHandle {
    pub fn new(name: AlgorithmName, provider: Box<dyn SignatureProvider>) -> Self {
        Self { name, provider }
    }

    pub fn name(&self) -> &AlgorithmName {
        &self.name
    }

    pub fn keygen(&mut self) -> Result<KeyPair, AdapterError> {
        self.provider
            .keygen()
            .map_err(|e| operation_failure(&self.name, Operation::Keygen, e))
    }

    pub fn sign(&mut self, message: &[u8], secret_key: &[u8]) -> Result<Vec<u8>, AdapterError> {
        self.provider
            .sign(message, secret_key)
            .map_err(|e| operation_failure(&self.name, Operation::Sign, e))
    }

    /// Never fails. A rejected or malformed signature is timed the same way
    /// as an accepted one and simply yields `false`.
    pub fn verify(&mut self, public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
        self.provider.verify(public_key, message, signature)
    }
}

impl std::fmt::Debug for SignatureHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureHandle")
            .field("name", &self.name)
            .finish()
    }
}

/// A resolved algorithm, tagged by kind.
///
/// Handles are created once per configured algorithm per run and are not
/// meant to be shared between threads.
#[derive(Debug)]
pub enum AlgorithmHandle {
    Kem(KemHandle),
    Signature(SignatureHandle),
}

impl AlgorithmHandle {
    pub fn name(&self) -> &AlgorithmName {
        match self {
            Self::Kem(handle) => handle.name(),
            Self::Signature(handle) => handle.name(),
        }
    }

    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Self::Kem(_) => AlgorithmKind::Kem,
            Self::Signature(_) => AlgorithmKind::Signature,
        }
    }

    pub fn keygen(&mut self) -> Result<KeyPair, AdapterError> {
        match self {
            Self::Kem(handle) => handle.keygen(),
            Self::Signature(handle) => handle.keygen(),
        }
    }

    /// One full operation cycle with fresh keys: keygen, then
    /// encapsulate/decapsulate or sign/verify over `message`.
    ///
    /// Returns whether the cycle round-tripped (shared secrets match, or the
    /// signature verified).
    pub fn run_cycle(&mut self, message: &[u8]) -> Result<bool, AdapterError> {
        match self {
            Self::Kem(handle) => {
                let keys = handle.keygen()?;
                let encapsulated = handle.encapsulate(&keys.public_key)?;
                let recovered = handle.decapsulate(&encapsulated.ciphertext, &keys.secret_key)?;
                Ok(recovered == encapsulated.shared_secret)
            }
            Self::Signature(handle) => {
                let keys = handle.keygen()?;
                let signature = handle.sign(message, &keys.secret_key)?;
                Ok(handle.verify(&keys.public_key, message, &signature))
            }
        }
    }
}

fn operation_failure(
    algorithm: &AlgorithmName,
    operation: Operation,
    source: ProviderError,
) -> AdapterError {
    AdapterError::OperationFailure {
        algorithm: algorithm.clone(),
        operation,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// XOR "KEM": the shared secret is the public key, the ciphertext is the
    /// shared secret XORed with the secret key.
    struct XorKem;

    impl KemProvider for XorKem {
        fn keygen(&mut self) -> Result<KeyPair, ProviderError> {
            Ok(KeyPair {
                public_key: vec![1, 2, 3, 4],
                secret_key: vec![9, 9, 9, 9],
            })
        }

        fn encapsulate(&mut self, public_key: &[u8]) -> Result<Encapsulation, ProviderError> {
            Ok(Encapsulation {
                ciphertext: public_key.iter().map(|b| b ^ 9).collect(),
                shared_secret: public_key.to_vec(),
            })
        }

        fn decapsulate(
            &mut self,
            ciphertext: &[u8],
            secret_key: &[u8],
        ) -> Result<Vec<u8>, ProviderError> {
            if ciphertext.len() != secret_key.len() {
                return Err(ProviderError::InvalidInput {
                    what: "ciphertext",
                    reason: format!("expected {} bytes", secret_key.len()),
                });
            }
            Ok(ciphertext
                .iter()
                .zip(secret_key)
                .map(|(c, k)| c ^ k)
                .collect())
        }
    }

    struct EchoSigner;

    impl SignatureProvider for EchoSigner {
        fn keygen(&mut self) -> Result<KeyPair, ProviderError> {
            Ok(KeyPair {
                public_key: vec![7],
                secret_key: vec![7],
            })
        }

        fn sign(&mut self, message: &[u8], _secret_key: &[u8]) -> Result<Vec<u8>, ProviderError> {
            Ok(message.to_vec())
        }

        fn verify(&mut self, _public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
            message == signature
        }
    }

    fn name(s: &str) -> AlgorithmName {
        AlgorithmName::new(s).unwrap()
    }

    #[test]
    fn test_kem_cycle_round_trips() {
        let mut handle = AlgorithmHandle::Kem(KemHandle::new(name("XOR"), Box::new(XorKem)));
        assert_eq!(handle.kind(), AlgorithmKind::Kem);
        assert!(handle.run_cycle(&[]).unwrap());
    }

    #[test]
    fn test_provider_error_gains_context() {
        let mut handle = KemHandle::new(name("XOR"), Box::new(XorKem));
        let err = handle.decapsulate(&[1, 2], &[1, 2, 3]).unwrap_err();
        match err {
            AdapterError::OperationFailure {
                algorithm,
                operation,
                ..
            } => {
                assert_eq!(algorithm.as_str(), "XOR");
                assert_eq!(operation, Operation::Decapsulate);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_signature_verify_is_boolean() {
        let mut handle = SignatureHandle::new(name("ECHO"), Box::new(EchoSigner));
        let keys = handle.keygen().unwrap();
        let sig = handle.sign(b"hello", &keys.secret_key).unwrap();
        assert!(handle.verify(&keys.public_key, b"hello", &sig));
        assert!(!handle.verify(&keys.public_key, b"hello", b"tampered"));
    }
}
