use rand::RngCore;
use rcgen::{
  BasicConstraints, DistinguishedName, DnType, ExtendedKeyUsagePurpose, IsCa, Issuer, KeyPair, KeyUsagePurpose,
  SerialNumber,
};
use rsa::RsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use serde::{Deserialize, Serialize};

use super::rsa_key::{DEFAULT_KEY_LENGTH, generate_key, private_key_pem};
use super::{GenerateError, Generator, decode_options};
use crate::certs::CertLoader;
use crate::value::Value;

const DEFAULT_DURATION_DAYS: u32 = 365;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CertificateOptions {
  common_name: String,
  alternative_names: Vec<String>,
  organization: Option<String>,
  is_ca: bool,
  /// Name of the stored CA variable to sign with.
  ca: String,
  extended_key_usage: Vec<String>,
  /// Validity in days.
  duration: u32,
  key_length: usize,
}

impl Default for CertificateOptions {
  fn default() -> Self {
    Self {
      common_name: String::new(),
      alternative_names: Vec::new(),
      organization: None,
      is_ca: false,
      ca: String::new(),
      extended_key_usage: Vec::new(),
      duration: DEFAULT_DURATION_DAYS,
      key_length: DEFAULT_KEY_LENGTH,
    }
  }
}

#[derive(Serialize)]
struct CertificateValue {
  ca: String,
  certificate: String,
  private_key: String,
}

/// X.509 certificates with fresh RSA keys.
///
/// A CA without a `ca` option is self-signed. Anything else is signed by the
/// CA material stored under the `ca` name, which must have been resolved
/// earlier in the same run or a previous one.
pub struct CertificateGenerator {
  loader: CertLoader,
}

impl CertificateGenerator {
  pub fn new(loader: CertLoader) -> Self {
    Self { loader }
  }
}

impl Generator for CertificateGenerator {
  fn generate(&self, options: &Value) -> Result<Value, GenerateError> {
    let options: CertificateOptions = decode_options(options)?;
    if options.duration == 0 {
      return Err(GenerateError::InvalidOption {
        option: "duration".to_string(),
        reason: "must be at least one day".to_string(),
      });
    }
    if !options.is_ca && options.ca.is_empty() {
      return Err(GenerateError::InvalidOptions(
        "a 'ca' is required to sign a non-CA certificate".to_string(),
      ));
    }

    let params = certificate_params(&options)?;
    let private_key = generate_key(options.key_length)?;
    let key_pair = signing_key(&private_key)?;

    let (certificate, ca) = if options.ca.is_empty() {
      let pem = params.self_signed(&key_pair)?.pem();
      (pem.clone(), pem)
    } else {
      let material = self.loader.load_certificate_material(&options.ca)?;
      let ca_pem = material.certificate_pem();
      let issuer = Issuer::from_ca_cert_pem(&ca_pem, signing_key(material.private_key())?)?;
      (params.signed_by(&key_pair, &issuer)?.pem(), ca_pem)
    };

    let value = CertificateValue {
      ca,
      certificate,
      private_key: private_key_pem(&private_key)?,
    };
    Value::encode(&value).map_err(GenerateError::Encode)
  }
}

fn certificate_params(options: &CertificateOptions) -> Result<rcgen::CertificateParams, GenerateError> {
  let mut params = rcgen::CertificateParams::new(options.alternative_names.clone())?;

  params.distinguished_name = DistinguishedName::new();
  if let Some(organization) = &options.organization {
    params.distinguished_name.push(DnType::OrganizationName, organization);
  }
  if !options.common_name.is_empty() {
    params.distinguished_name.push(DnType::CommonName, &options.common_name);
  }

  if options.is_ca {
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![
      KeyUsagePurpose::KeyCertSign,
      KeyUsagePurpose::CrlSign,
      KeyUsagePurpose::DigitalSignature,
    ];
  } else {
    params.is_ca = IsCa::ExplicitNoCa;
    params.key_usages = vec![KeyUsagePurpose::DigitalSignature, KeyUsagePurpose::KeyEncipherment];
  }

  params.extended_key_usages = options
    .extended_key_usage
    .iter()
    .map(|usage| match usage.as_str() {
      "server_auth" => Ok(ExtendedKeyUsagePurpose::ServerAuth),
      "client_auth" => Ok(ExtendedKeyUsagePurpose::ClientAuth),
      other => Err(GenerateError::InvalidOption {
        option: "extended_key_usage".to_string(),
        reason: format!("unsupported usage '{}'", other),
      }),
    })
    .collect::<Result<_, _>>()?;

  let mut serial = [0u8; 16];
  rand::thread_rng().fill_bytes(&mut serial);
  serial[0] &= 0x7f;
  params.serial_number = Some(SerialNumber::from_slice(&serial));

  let now = time::OffsetDateTime::now_utc();
  params.not_before = now;
  params.not_after = now
    .checked_add(time::Duration::days(i64::from(options.duration)))
    .ok_or_else(|| GenerateError::InvalidOption {
      option: "duration".to_string(),
      reason: format!("{} days is past the latest representable date", options.duration),
    })?;

  Ok(params)
}

/// Convert an RSA key into an rcgen signing key.
fn signing_key(key: &RsaPrivateKey) -> Result<KeyPair, GenerateError> {
  let pkcs8 = key
    .to_pkcs8_pem(LineEnding::LF)
    .map_err(|e| GenerateError::Key(format!("failed to encode signing key: {}", e)))?;
  Ok(KeyPair::from_pem(&pkcs8)?)
}
