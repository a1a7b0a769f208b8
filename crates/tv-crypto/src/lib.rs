use anyhow::{Context, Result, anyhow, bail};
use ed25519_dalek::{Signature, Signer as DalekSigner, SigningKey};
use serde_json::Value;
use tv_api_types::Address;
use zeroize::Zeroizing;

pub const KEYPAIR_LEN: usize = 64;
pub const SIGNATURE_LEN: usize = 64;

pub trait Signer {
    fn address(&self) -> Address;
    fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LEN]>;
}

/// Local keypair used as a co-signer (the storage account).
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    /// Solana keypair layout: 32 secret bytes followed by the 32-byte public key.
    pub fn from_keypair_bytes(bytes: &[u8]) -> Result<Self> {
        let keypair: &[u8; KEYPAIR_LEN] = bytes
            .try_into()
            .map_err(|_| anyhow!("keypair must be {KEYPAIR_LEN} bytes, got {}", bytes.len()))?;
        let signing_key = SigningKey::from_keypair_bytes(keypair)
            .map_err(|_| anyhow!("keypair public half does not match its secret"))?;
        Ok(Self { signing_key })
    }

    /// Parses either a `solana-keygen` byte array or the web3 export shape
    /// `{"_keypair":{"secretKey":{"0":..,"63":..}}}`.
    pub fn from_keypair_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json).context("keypair is not valid JSON")?;
        let secret = match &value {
            Value::Array(items) => bytes_from_array(items)?,
            Value::Object(_) => {
                let secret = value
                    .pointer("/_keypair/secretKey")
                    .or_else(|| value.get("secretKey"))
                    .ok_or_else(|| anyhow!("keypair object has no secretKey"))?;
                match secret {
                    Value::Array(items) => bytes_from_array(items)?,
                    Value::Object(map) => {
                        let mut indexed = Vec::with_capacity(map.len());
                        for (key, byte) in map {
                            let index: usize = key
                                .parse()
                                .with_context(|| format!("secretKey index {key:?} is not numeric"))?;
                            indexed.push((index, byte_from_value(byte)?));
                        }
                        indexed.sort_by_key(|(index, _)| *index);
                        if indexed.iter().enumerate().any(|(pos, (index, _))| pos != *index) {
                            bail!("secretKey indices are not contiguous");
                        }
                        Zeroizing::new(indexed.into_iter().map(|(_, byte)| byte).collect())
                    }
                    _ => bail!("secretKey must be an array or an indexed object"),
                }
            }
            _ => bail!("keypair must be an array or an object"),
        };
        Self::from_keypair_bytes(&secret)
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }
}

impl Signer for Ed25519Signer {
    fn address(&self) -> Address {
        Address::new(self.public_key_bytes())
    }

    fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LEN]> {
        if message.is_empty() {
            return Err(anyhow!("message cannot be empty"));
        }
        let signature: Signature = self.signing_key.sign(message);
        Ok(signature.to_bytes())
    }
}

fn bytes_from_array(items: &[Value]) -> Result<Zeroizing<Vec<u8>>> {
    let mut bytes = Zeroizing::new(Vec::with_capacity(items.len()));
    for item in items {
        bytes.push(byte_from_value(item)?);
    }
    Ok(bytes)
}

fn byte_from_value(value: &Value) -> Result<u8> {
    value
        .as_u64()
        .and_then(|n| u8::try_from(n).ok())
        .ok_or_else(|| anyhow!("key byte {value} is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Verifier, VerifyingKey};

    const BUNDLED_KEYPAIR: &str = include_str!("../../../config/keypair.json");
    const BUNDLED_ADDRESS: &str = "8spPVGmwidxe28EYvhzVUB6mJynkV5yWCThdFZvd8ArK";

    #[test]
    fn bundled_web3_export_loads() {
        let signer = Ed25519Signer::from_keypair_json(BUNDLED_KEYPAIR).expect("bundled keypair");
        assert_eq!(signer.address().to_string(), BUNDLED_ADDRESS);
    }

    #[test]
    fn keygen_array_loads() {
        let original = Ed25519Signer {
            signing_key: SigningKey::from_bytes(&[3_u8; 32]),
        };
        let mut bytes = original.signing_key.to_keypair_bytes().to_vec();
        let json = serde_json::to_string(&bytes).expect("json");
        let loaded = Ed25519Signer::from_keypair_json(&json).expect("array keypair");
        assert_eq!(loaded.address(), original.address());

        bytes[40] ^= 0xff;
        let tampered = serde_json::to_string(&bytes).expect("json");
        assert!(Ed25519Signer::from_keypair_json(&tampered).is_err());
    }

    #[test]
    fn rejects_malformed_keypairs() {
        assert!(Ed25519Signer::from_keypair_json("[1,2,3]").is_err());
        assert!(Ed25519Signer::from_keypair_json("[300]").is_err());
        assert!(Ed25519Signer::from_keypair_json(r#"{"_keypair":{}}"#).is_err());
        assert!(Ed25519Signer::from_keypair_json(r#"{"secretKey":{"0":1,"2":3}}"#).is_err());
        assert!(Ed25519Signer::from_keypair_json("\"nope\"").is_err());
    }

    #[test]
    fn signatures_verify_against_address() {
        let signer = Ed25519Signer {
            signing_key: SigningKey::from_bytes(&[7_u8; 32]),
        };
        let message = b"tronverse message";
        let signature = signer.sign(message).expect("sign");

        let verifying = VerifyingKey::from_bytes(signer.address().as_bytes()).expect("key");
        verifying
            .verify(message, &Signature::from_bytes(&signature))
            .expect("signature verifies");

        assert!(signer.sign(&[]).is_err());
    }
}
