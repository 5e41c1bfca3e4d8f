use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use rsa::RsaPublicKey;
use rsa::traits::PublicKeyParts;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::rsa_key::{KeyOptions, generate_key, private_key_pem};
use super::{GenerateError, Generator, decode_options};
use crate::value::Value;

const KEY_TYPE: &str = "ssh-rsa";

#[derive(Serialize)]
struct SshKeyValue {
  private_key: String,
  public_key: String,
  public_key_fingerprint: String,
}

/// RSA keys for SSH: PEM private key, OpenSSH public key line and its
/// SHA256 fingerprint.
pub struct SshGenerator;

impl Generator for SshGenerator {
  fn generate(&self, options: &Value) -> Result<Value, GenerateError> {
    let options: KeyOptions = decode_options(options)?;
    let key = generate_key(options.key_length)?;

    let blob = public_key_blob(&key.to_public_key());
    let value = SshKeyValue {
      private_key: private_key_pem(&key)?,
      public_key: format!("{} {}", KEY_TYPE, STANDARD.encode(&blob)),
      public_key_fingerprint: format!("SHA256:{}", STANDARD_NO_PAD.encode(Sha256::digest(&blob))),
    };
    Value::encode(&value).map_err(GenerateError::Encode)
  }
}

/// RFC 4253 `ssh-rsa` public key encoding.
fn public_key_blob(key: &RsaPublicKey) -> Vec<u8> {
  let mut blob = Vec::new();
  write_string(&mut blob, KEY_TYPE.as_bytes());
  write_mpint(&mut blob, &key.e().to_bytes_be());
  write_mpint(&mut blob, &key.n().to_bytes_be());
  blob
}

fn write_string(buf: &mut Vec<u8>, data: &[u8]) {
  buf.extend_from_slice(&(data.len() as u32).to_be_bytes());
  buf.extend_from_slice(data);
}

/// Positive mpint: no leading zeros, except one when the high bit is set.
fn write_mpint(buf: &mut Vec<u8>, magnitude: &[u8]) {
  let start = magnitude.iter().position(|&b| b != 0).unwrap_or(magnitude.len());
  let trimmed = &magnitude[start..];

  if trimmed.first().is_some_and(|b| b & 0x80 != 0) {
    let mut padded = Vec::with_capacity(trimmed.len() + 1);
    padded.push(0);
    padded.extend_from_slice(trimmed);
    write_string(buf, &padded);
  } else {
    write_string(buf, trimmed);
  }
}
