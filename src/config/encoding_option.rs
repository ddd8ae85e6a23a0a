use std::{fmt::Display, str::FromStr};

use anyhow::{anyhow, Result};
use itertools::Itertools;

/// How the cyphertext on the CLI (and the plaintext produced by `solve`)
/// is textually encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingOption {
    Base64,
    Base64Url,
    Hex,
    Raw,
}

impl EncodingOption {
    fn variants() -> &'static [Self] {
        &[
            Self::Base64,
            Self::Base64Url,
            Self::Hex,
            Self::Raw,
        ]
    }

    pub fn decode(self, input: &str) -> Result<Vec<u8>> {
        match self {
            EncodingOption::Base64 => {
                base64::decode_config(input, base64::STANDARD).context_display("base64")
            }
            EncodingOption::Base64Url => {
                base64::decode_config(input, base64::URL_SAFE).context_display("base64url")
            }
            EncodingOption::Hex => hex::decode(input).context_display("hex"),
            EncodingOption::Raw => Ok(input.as_bytes().to_vec()),
        }
    }

    pub fn encode(self, data: &[u8]) -> String {
        match self {
            EncodingOption::Base64 => base64::encode_config(data, base64::STANDARD),
            EncodingOption::Base64Url => base64::encode_config(data, base64::URL_SAFE),
            EncodingOption::Hex => hex::encode(data),
            EncodingOption::Raw => String::from_utf8_lossy(data).into_owned(),
        }
    }
}

trait ContextDisplay<T> {
    fn context_display(self, format: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> ContextDisplay<T> for std::result::Result<T, E> {
    fn context_display(self, format: &str) -> Result<T> {
        self.map_err(|e| anyhow!("Failed to decode `{}` data: {}", format, e))
    }
}

impl Display for EncodingOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodingOption::Base64 => write!(f, "b64"),
            EncodingOption::Base64Url => write!(f, "b64_urlsafe"),
            EncodingOption::Hex => write!(f, "hex"),
            EncodingOption::Raw => write!(f, "raw"),
        }
    }
}

impl FromStr for EncodingOption {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> Result<Self> {
        match input.to_lowercase().as_str() {
            "b64" | "base64" => Ok(EncodingOption::Base64),
            "b64_urlsafe" | "base64url" => Ok(EncodingOption::Base64Url),
            "hex" => Ok(EncodingOption::Hex),
            "raw" => Ok(EncodingOption::Raw),
            other => Err(anyhow!(
                "`{}` is not a supported format. Expected one of: [{}]",
                other,
                Self::variants().iter().map(|v| v.to_string()).join(", ")
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_encoding() {
        let data = b"Hello, world!".to_vec();
        for encoding in EncodingOption::variants() {
            if *encoding == EncodingOption::Raw {
                continue; // raw is lossy through UTF-8 by design
            }
            let encoded = encoding.encode(&data);
            let decoded = encoding.decode(&encoded).unwrap();
            assert_eq!(decoded, data, "encoding {:?} did not round-trip", encoding);
        }
    }
}
