use rand::Rng;
use serde::Deserialize;

use super::{GenerateError, Generator, decode_options};
use crate::value::Value;

pub const DEFAULT_PASSWORD_LENGTH: usize = 20;

const MAX_PASSWORD_LENGTH: usize = 4096;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Deserialize)]
#[serde(default)]
struct PasswordOptions {
  length: usize,
}

impl Default for PasswordOptions {
  fn default() -> Self {
    Self {
      length: DEFAULT_PASSWORD_LENGTH,
    }
  }
}

/// Random passwords of lowercase letters and digits.
pub struct PasswordGenerator;

impl Generator for PasswordGenerator {
  fn generate(&self, options: &Value) -> Result<Value, GenerateError> {
    let options: PasswordOptions = decode_options(options)?;
    if !(1..=MAX_PASSWORD_LENGTH).contains(&options.length) {
      return Err(GenerateError::InvalidOption {
        option: "length".to_string(),
        reason: format!("must be between 1 and {}, got {}", MAX_PASSWORD_LENGTH, options.length),
      });
    }

    let mut rng = rand::thread_rng();
    let password: String = (0..options.length)
      .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
      .collect();

    Ok(Value::String(password))
  }
}
