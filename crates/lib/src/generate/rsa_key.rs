use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};

use super::{GenerateError, Generator, decode_options};
use crate::value::Value;

pub const DEFAULT_KEY_LENGTH: usize = 2048;

/// Smaller keys are refused by the signing backend.
const MIN_KEY_LENGTH: usize = 2048;
const MAX_KEY_LENGTH: usize = 8192;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub(super) struct KeyOptions {
  pub key_length: usize,
}

impl Default for KeyOptions {
  fn default() -> Self {
    Self {
      key_length: DEFAULT_KEY_LENGTH,
    }
  }
}

#[derive(Serialize)]
struct RsaKeyValue {
  private_key: String,
  public_key: String,
}

/// RSA key pairs as PEM: PKCS#1 private key, SPKI public key.
pub struct RsaGenerator;

impl Generator for RsaGenerator {
  fn generate(&self, options: &Value) -> Result<Value, GenerateError> {
    let options: KeyOptions = decode_options(options)?;
    let key = generate_key(options.key_length)?;

    let value = RsaKeyValue {
      private_key: private_key_pem(&key)?,
      public_key: public_key_pem(&key.to_public_key())?,
    };
    Value::encode(&value).map_err(GenerateError::Encode)
  }
}

pub(super) fn generate_key(bits: usize) -> Result<RsaPrivateKey, GenerateError> {
  if !(MIN_KEY_LENGTH..=MAX_KEY_LENGTH).contains(&bits) {
    return Err(GenerateError::InvalidOption {
      option: "key_length".to_string(),
      reason: format!("must be between {} and {}, got {}", MIN_KEY_LENGTH, MAX_KEY_LENGTH, bits),
    });
  }

  RsaPrivateKey::new(&mut rand::thread_rng(), bits).map_err(|e| GenerateError::Key(e.to_string()))
}

pub(super) fn private_key_pem(key: &RsaPrivateKey) -> Result<String, GenerateError> {
  key
    .to_pkcs1_pem(LineEnding::LF)
    .map(|pem| pem.to_string())
    .map_err(|e| GenerateError::Key(format!("failed to encode private key: {}", e)))
}

fn public_key_pem(key: &RsaPublicKey) -> Result<String, GenerateError> {
  key
    .to_public_key_pem(LineEnding::LF)
    .map_err(|e| GenerateError::Key(format!("failed to encode public key: {}", e)))
}
