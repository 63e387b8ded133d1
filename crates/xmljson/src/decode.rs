//! Decode helpers: base64url and URI components
//!
//! Both are pure single-call functions. Malformed input is a
//! [`ErrorKind::Decode`](crate::ErrorKind::Decode) error and is never retried.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use encoding_rs::Encoding;
use tracing::{instrument, trace};

use crate::error::{Error, Result};

/// URL-safe alphabet; trailing `=` padding may be present or absent
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode URL-safe base64 (`-` and `_` in place of `+` and `/`)
#[instrument(level = "trace", skip_all, fields(len = input.len()))]
pub fn base64_url(input: &str) -> Result<Vec<u8>> {
    URL_SAFE_LENIENT
        .decode(input)
        .map_err(|e| Error::decode(format!("input is not a valid base64url value: {e}")))
}

/// Encode as padded URL-safe base64
pub fn encode_base64_url(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE.encode(bytes)
}

/// Decode an `application/x-www-form-urlencoded` component.
///
/// `+` decodes to a space and each run of `%XY` escapes is decoded as bytes
/// in `charset`. Byte sequences invalid in `charset` become U+FFFD.
#[instrument(level = "trace", skip_all, fields(len = value.len(), charset = %charset))]
pub fn uri_component(value: &str, charset: &str) -> Result<String> {
    let charset = Charset::for_label(charset).ok_or_else(|| {
        Error::decode(format!(
            "error occurred while decoding the URI component: unsupported charset `{charset}`"
        ))
    })?;

    let mut out = String::with_capacity(value.len());
    let mut pending = Vec::new();
    let mut rest = value;

    while let Some(ch) = rest.chars().next() {
        if ch == '%' {
            let (byte, tail) = percent_byte(rest)?;
            pending.push(byte);
            rest = tail;
            continue;
        }

        flush(&mut out, &mut pending, charset);
        out.push(if ch == '+' { ' ' } else { ch });
        rest = rest.get(ch.len_utf8()..).unwrap_or_default();
    }
    flush(&mut out, &mut pending, charset);

    trace!(decoded_len = out.len(), "decoded uri component");
    Ok(out)
}

/// Parse the `%XY` escape at the start of `input`
fn percent_byte(input: &str) -> Result<(u8, &str)> {
    let malformed = || {
        Error::decode(format!(
            "error occurred while decoding the URI component: malformed escape near `{}`",
            input.chars().take(3).collect::<String>()
        ))
    };
    let hex = input.get(1..3).ok_or_else(malformed)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(malformed());
    }
    let byte = u8::from_str_radix(hex, 16).map_err(|_| malformed())?;
    let tail = input.get(3..).ok_or_else(malformed)?;
    Ok((byte, tail))
}

fn flush(out: &mut String, pending: &mut Vec<u8>, charset: Charset) {
    if pending.is_empty() {
        return;
    }
    charset.decode_into(pending, out);
    pending.clear();
}

/// Aliases of ISO-8859-1 that must not fall back to windows-1252
const LATIN1_LABELS: &[&str] = &[
    "iso-8859-1",
    "iso8859-1",
    "iso8859_1",
    "iso_8859-1",
    "iso_8859_1",
    "8859_1",
    "latin1",
    "l1",
    "iso-ir-100",
    "cp819",
    "ibm819",
    "ibm-819",
    "819",
    "csisolatin1",
];

/// Aliases of US-ASCII that must not fall back to windows-1252
const ASCII_LABELS: &[&str] = &[
    "us-ascii",
    "ascii",
    "us",
    "ascii7",
    "646",
    "iso646-us",
    "iso_646.irv:1991",
    "ansi_x3.4-1968",
    "ansi_x3.4-1986",
    "cp367",
    "ibm367",
    "csascii",
    "default",
];

/// Charset the escaped bytes of a URI component are read in.
///
/// The WHATWG label table treats ISO-8859-1 and US-ASCII as windows-1252,
/// so those two are decoded here byte by byte.
#[derive(Clone, Copy, Debug)]
enum Charset {
    Latin1,
    Ascii,
    Other(&'static Encoding),
}

impl Charset {
    fn for_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if LATIN1_LABELS.iter().any(|l| l.eq_ignore_ascii_case(label)) {
            Some(Self::Latin1)
        } else if ASCII_LABELS.iter().any(|l| l.eq_ignore_ascii_case(label)) {
            Some(Self::Ascii)
        } else {
            Encoding::for_label(label.as_bytes()).map(Self::Other)
        }
    }

    fn decode_into(self, bytes: &[u8], out: &mut String) {
        match self {
            Self::Latin1 => out.extend(bytes.iter().map(|&b| char::from(b))),
            Self::Ascii => out.extend(bytes.iter().map(|&b| {
                if b.is_ascii() {
                    char::from(b)
                } else {
                    char::REPLACEMENT_CHARACTER
                }
            })),
            Self::Other(encoding) => {
                let (decoded, _had_errors) = encoding.decode_without_bom_handling(bytes);
                out.push_str(&decoded);
            }
        }
    }
}
