//! Hex and CBOR codec for transaction envelopes.
//!
//! Decoding records byte spans instead of re-encoding values: the body,
//! auxiliary data and unknown witness entries are sliced out of the input
//! and emitted again untouched. Only the vkey witnesses are rebuilt, since
//! those are what signing changes.

use minicbor::data::{Tag, Type};
use minicbor::decode::Error as CborError;
use minicbor::{Decoder, Encoder};
use serde::Serialize;
use std::fmt;

use crate::config::MIN_ENVELOPE_BYTES;
use crate::crypto::keys::{PublicKey, Signature};
use crate::transaction::signing::hash_body;
use crate::transaction::types::{
    Certificate, CertificateKind, CertificateSummary, OutputSummary, RawWitnessEntry,
    StakeCredential, StructuralSummary, TransactionBody, TransactionEnvelope, TransactionHash,
    TransactionInput, TransactionOutput, VKeyWitness, Withdrawal, WithdrawalSummary, WitnessSet,
    CBOR_NULL,
};
use crate::transaction::TransactionError;
use crate::wallet::address::{bech32_from_bytes, KeyHash};

/// CBOR tag for mathematical sets (Conway-era inputs, certificates, ...).
const SET_TAG: u64 = 258;

const VKEY_WITNESS_KEY: u64 = 0;

type DecodeResult<T> = Result<T, CborError>;

/// Why an envelope was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum MalformedReason {
    Empty,
    OddLength { len: usize },
    NonHex { position: usize, character: char },
    TooShort { bytes: usize },
    Undecodable { detail: String },
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("input is empty"),
            Self::OddLength { len } => {
                write!(f, "hex string has odd length {len}")
            }
            Self::NonHex {
                position,
                character,
            } => write!(f, "non-hex character {character:?} at position {position}"),
            Self::TooShort { bytes } => write!(
                f,
                "{bytes} bytes is too short for a transaction (minimum {MIN_ENVELOPE_BYTES})"
            ),
            Self::Undecodable { detail } => write!(f, "invalid CBOR: {detail}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a hex-encoded envelope.
///
/// Surrounding whitespace and a `0x` prefix are tolerated. The hex is
/// validated completely before any CBOR is looked at.
pub fn decode(input: &str) -> Result<TransactionEnvelope, TransactionError> {
    let bytes = parse_hex(input)?;
    decode_bytes(&bytes)
}

/// Decode a binary envelope.
pub fn decode_bytes(bytes: &[u8]) -> Result<TransactionEnvelope, TransactionError> {
    if bytes.len() < MIN_ENVELOPE_BYTES {
        return Err(MalformedReason::TooShort { bytes: bytes.len() }.into());
    }
    let envelope = decode_envelope(bytes).map_err(|e| MalformedReason::Undecodable {
        detail: e.to_string(),
    })?;

    tracing::debug!(
        bytes = bytes.len(),
        inputs = envelope.body.inputs.len(),
        outputs = envelope.body.outputs.len(),
        vkey_witnesses = envelope.witness_set.vkey_count(),
        "decoded transaction envelope"
    );
    Ok(envelope)
}

fn parse_hex(input: &str) -> Result<Vec<u8>, MalformedReason> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() {
        return Err(MalformedReason::Empty);
    }
    if let Some((position, character)) = digits.char_indices().find(|(_, c)| !c.is_ascii_hexdigit())
    {
        return Err(MalformedReason::NonHex {
            position,
            character,
        });
    }
    if digits.len() % 2 != 0 {
        return Err(MalformedReason::OddLength { len: digits.len() });
    }
    hex::decode(digits).map_err(|e| MalformedReason::Undecodable {
        detail: e.to_string(),
    })
}

/// Items of a definite or indefinite array or map.
struct Entries {
    remaining: Option<u64>,
}

impl Entries {
    fn array(d: &mut Decoder<'_>) -> DecodeResult<Self> {
        Ok(Self {
            remaining: d.array()?,
        })
    }

    fn map(d: &mut Decoder<'_>) -> DecodeResult<Self> {
        Ok(Self {
            remaining: d.map()?,
        })
    }

    /// Advance to the next item, consuming the break of an indefinite
    /// container at the end.
    fn next(&mut self, d: &mut Decoder<'_>) -> DecodeResult<bool> {
        match &mut self.remaining {
            Some(0) => Ok(false),
            Some(n) => {
                *n -= 1;
                Ok(true)
            }
            None => {
                if d.datatype()? == Type::Break {
                    d.set_position(d.position() + 1);
                    Ok(false)
                } else {
                    Ok(true)
                }
            }
        }
    }

    fn expect(&mut self, d: &mut Decoder<'_>, what: &str) -> DecodeResult<()> {
        if self.next(d)? {
            Ok(())
        } else {
            Err(CborError::message(format!("missing {what}")))
        }
    }

    fn skip_rest(&mut self, d: &mut Decoder<'_>) -> DecodeResult<()> {
        while self.next(d)? {
            d.skip()?;
        }
        Ok(())
    }
}

fn decode_envelope(bytes: &[u8]) -> DecodeResult<TransactionEnvelope> {
    let mut d = Decoder::new(bytes);

    let with_validity = match d.array()? {
        Some(4) => true,
        Some(3) => false,
        Some(n) => {
            return Err(CborError::message(format!(
                "expected a 3 or 4 element transaction array, got {n} elements"
            )))
        }
        None => {
            return Err(CborError::message(
                "indefinite-length transaction arrays are not supported",
            ))
        }
    };

    let body_start = d.position();
    if !matches!(d.datatype()?, Type::Map | Type::MapIndef) {
        return Err(CborError::message("transaction body must be a map"));
    }
    d.skip()?;
    let body = decode_body(&bytes[body_start..d.position()])?;

    let witness_set = decode_witness_set(&mut d, bytes)?;
    let is_valid = if with_validity { Some(d.bool()?) } else { None };

    let aux_start = d.position();
    d.skip()?;
    let auxiliary_data = bytes[aux_start..d.position()].to_vec();

    if d.position() != bytes.len() {
        return Err(CborError::message(format!(
            "{} trailing bytes after the transaction",
            bytes.len() - d.position()
        )));
    }

    Ok(TransactionEnvelope {
        body,
        witness_set,
        is_valid,
        auxiliary_data,
    })
}

fn decode_body(raw: &[u8]) -> DecodeResult<TransactionBody> {
    let mut d = Decoder::new(raw);
    let mut body = TransactionBody {
        raw: raw.to_vec(),
        inputs: Vec::new(),
        outputs: Vec::new(),
        fee: 0,
        ttl: None,
        certificates: Vec::new(),
        withdrawals: Vec::new(),
        required_signers: Vec::new(),
    };
    let (mut saw_inputs, mut saw_outputs, mut saw_fee) = (false, false, false);

    let mut entries = Entries::map(&mut d)?;
    while entries.next(&mut d)? {
        match d.u64()? {
            0 => {
                saw_inputs = true;
                skip_set_tag(&mut d)?;
                let mut items = Entries::array(&mut d)?;
                while items.next(&mut d)? {
                    body.inputs.push(decode_input(&mut d)?);
                }
            }
            1 => {
                saw_outputs = true;
                let mut items = Entries::array(&mut d)?;
                while items.next(&mut d)? {
                    body.outputs.push(decode_output(&mut d)?);
                }
            }
            2 => {
                saw_fee = true;
                body.fee = d.u64()?;
            }
            3 => body.ttl = Some(d.u64()?),
            4 => {
                skip_set_tag(&mut d)?;
                let mut items = Entries::array(&mut d)?;
                while items.next(&mut d)? {
                    body.certificates.push(decode_certificate(&mut d)?);
                }
            }
            5 => {
                let mut items = Entries::map(&mut d)?;
                while items.next(&mut d)? {
                    let reward_address = d.bytes()?.to_vec();
                    let amount = d.u64()?;
                    body.withdrawals.push(Withdrawal {
                        reward_address,
                        amount,
                    });
                }
            }
            14 => {
                skip_set_tag(&mut d)?;
                let mut items = Entries::array(&mut d)?;
                while items.next(&mut d)? {
                    body.required_signers.push(key_hash(d.bytes()?)?);
                }
            }
            _ => d.skip()?,
        }
    }

    if !(saw_inputs && saw_outputs && saw_fee) {
        return Err(CborError::message(
            "transaction body lacks inputs, outputs or fee",
        ));
    }
    Ok(body)
}

fn skip_set_tag(d: &mut Decoder<'_>) -> DecodeResult<bool> {
    if d.datatype()? != Type::Tag {
        return Ok(false);
    }
    let tag = d.tag()?;
    if tag.as_u64() != SET_TAG {
        return Err(CborError::message(format!(
            "unexpected tag {} where a set was expected",
            tag.as_u64()
        )));
    }
    Ok(true)
}

fn key_hash(bytes: &[u8]) -> DecodeResult<KeyHash> {
    KeyHash::try_from_slice(bytes).ok_or_else(|| {
        CborError::message(format!("expected a 28-byte hash, got {} bytes", bytes.len()))
    })
}

fn decode_input(d: &mut Decoder<'_>) -> DecodeResult<TransactionInput> {
    let mut fields = Entries::array(d)?;
    fields.expect(d, "input transaction id")?;
    let id = d.bytes()?;
    let transaction_id = <[u8; 32]>::try_from(id)
        .map(TransactionHash::from_bytes)
        .map_err(|_| CborError::message(format!("input id has {} bytes", id.len())))?;
    fields.expect(d, "input index")?;
    let index = d.u64()?;
    fields.skip_rest(d)?;
    Ok(TransactionInput {
        transaction_id,
        index,
    })
}

fn decode_output(d: &mut Decoder<'_>) -> DecodeResult<TransactionOutput> {
    match d.datatype()? {
        Type::Array | Type::ArrayIndef => {
            let mut fields = Entries::array(d)?;
            fields.expect(d, "output address")?;
            let address = d.bytes()?.to_vec();
            fields.expect(d, "output value")?;
            let (lovelace, has_multi_assets) = decode_value(d)?;
            fields.skip_rest(d)?;
            Ok(TransactionOutput {
                address,
                lovelace,
                has_multi_assets,
            })
        }
        Type::Map | Type::MapIndef => {
            let mut fields = Entries::map(d)?;
            let mut address = None;
            let mut value = None;
            while fields.next(d)? {
                match d.u64()? {
                    0 => address = Some(d.bytes()?.to_vec()),
                    1 => value = Some(decode_value(d)?),
                    _ => d.skip()?,
                }
            }
            match (address, value) {
                (Some(address), Some((lovelace, has_multi_assets))) => Ok(TransactionOutput {
                    address,
                    lovelace,
                    has_multi_assets,
                }),
                _ => Err(CborError::message("output lacks address or value")),
            }
        }
        other => Err(CborError::message(format!(
            "unexpected {other:?} where an output was expected"
        ))),
    }
}

/// `coin` or `[coin, multiasset]`.
fn decode_value(d: &mut Decoder<'_>) -> DecodeResult<(u64, bool)> {
    match d.datatype()? {
        Type::U8 | Type::U16 | Type::U32 | Type::U64 => Ok((d.u64()?, false)),
        Type::Array | Type::ArrayIndef => {
            let mut fields = Entries::array(d)?;
            fields.expect(d, "coin")?;
            let coin = d.u64()?;
            fields.expect(d, "multi-asset map")?;
            let start = d.position();
            let policies = d.map()?;
            d.set_position(start);
            d.skip()?;
            fields.skip_rest(d)?;
            Ok((coin, policies != Some(0)))
        }
        other => Err(CborError::message(format!(
            "unexpected {other:?} where a value was expected"
        ))),
    }
}

fn decode_certificate(d: &mut Decoder<'_>) -> DecodeResult<Certificate> {
    let mut fields = Entries::array(d)?;
    fields.expect(d, "certificate kind")?;
    let kind = CertificateKind::from_code(d.u64()?);
    let stake_credential = if kind.names_stake_credential() {
        fields.expect(d, "stake credential")?;
        Some(decode_stake_credential(d)?)
    } else {
        None
    };
    fields.skip_rest(d)?;
    Ok(Certificate {
        kind,
        stake_credential,
    })
}

fn decode_stake_credential(d: &mut Decoder<'_>) -> DecodeResult<StakeCredential> {
    let mut fields = Entries::array(d)?;
    fields.expect(d, "credential type")?;
    let tag = d.u64()?;
    fields.expect(d, "credential hash")?;
    let hash = key_hash(d.bytes()?)?;
    fields.skip_rest(d)?;
    match tag {
        0 => Ok(StakeCredential::KeyHash(hash)),
        1 => Ok(StakeCredential::ScriptHash(hash)),
        other => Err(CborError::message(format!(
            "unknown credential type {other}"
        ))),
    }
}

fn decode_witness_set(d: &mut Decoder<'_>, input: &[u8]) -> DecodeResult<WitnessSet> {
    if !matches!(d.datatype()?, Type::Map | Type::MapIndef) {
        return Err(CborError::message("witness set must be a map"));
    }
    let mut set = WitnessSet::default();
    let mut entries = Entries::map(d)?;
    while entries.next(d)? {
        let key = d.u64()?;
        if key == VKEY_WITNESS_KEY {
            set.vkey_present = true;
            set.vkey_tagged = skip_set_tag(d)?;
            let mut items = Entries::array(d)?;
            while items.next(d)? {
                set.vkey_witnesses.push(decode_vkey_witness(d)?);
            }
        } else {
            let start = d.position();
            d.skip()?;
            set.others.push(RawWitnessEntry {
                key,
                value: input[start..d.position()].to_vec(),
            });
        }
    }
    Ok(set)
}

fn decode_vkey_witness(d: &mut Decoder<'_>) -> DecodeResult<VKeyWitness> {
    let mut fields = Entries::array(d)?;
    fields.expect(d, "witness vkey")?;
    let vkey = PublicKey::try_from_slice(d.bytes()?).map_err(CborError::message)?;
    fields.expect(d, "witness signature")?;
    let signature = Signature::try_from_slice(d.bytes()?).map_err(CborError::message)?;
    fields.skip_rest(d)?;
    Ok(VKeyWitness { vkey, signature })
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode an envelope to binary.
pub fn encode_bytes(envelope: &TransactionEnvelope) -> Result<Vec<u8>, TransactionError> {
    let mut e = Encoder::new(Vec::new());
    e.array(if envelope.is_valid.is_some() { 4 } else { 3 })?;
    e.writer_mut().extend_from_slice(&envelope.body.raw);
    encode_witness_set(&mut e, &envelope.witness_set)?;
    if let Some(valid) = envelope.is_valid {
        e.bool(valid)?;
    }
    if envelope.auxiliary_data.is_empty() {
        e.writer_mut().push(CBOR_NULL);
    } else {
        e.writer_mut().extend_from_slice(&envelope.auxiliary_data);
    }
    Ok(e.into_writer())
}

/// Encode an envelope to lowercase hex.
pub fn encode(envelope: &TransactionEnvelope) -> Result<String, TransactionError> {
    Ok(hex::encode(encode_bytes(envelope)?))
}

fn encode_witness_set(
    e: &mut Encoder<Vec<u8>>,
    set: &WitnessSet,
) -> Result<(), TransactionError> {
    let emit_vkeys = set.vkey_present || !set.vkey_witnesses.is_empty();
    e.map(emit_vkeys as u64 + set.others.len() as u64)?;

    if emit_vkeys {
        e.u64(VKEY_WITNESS_KEY)?;
        if set.vkey_tagged {
            e.tag(Tag::new(SET_TAG))?;
        }
        e.array(set.vkey_witnesses.len() as u64)?;
        for w in &set.vkey_witnesses {
            e.array(2)?
                .bytes(w.vkey.as_bytes())?
                .bytes(w.signature.as_bytes())?;
        }
    }
    for entry in &set.others {
        e.u64(entry.key)?;
        e.writer_mut().extend_from_slice(&entry.value);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

/// Structural summary of an envelope. Diagnostic only.
pub fn inspect(envelope: &TransactionEnvelope) -> StructuralSummary {
    let body = &envelope.body;
    let render_address =
        |bytes: &[u8]| bech32_from_bytes(bytes).unwrap_or_else(|| hex::encode(bytes));

    StructuralSummary {
        tx_hash: hash_body(body),
        fee: body.fee,
        ttl: body.ttl,
        inputs: body.inputs.clone(),
        outputs: body
            .outputs
            .iter()
            .map(|o| OutputSummary {
                address: render_address(&o.address),
                amount: o.lovelace,
                multi_asset: o.has_multi_assets,
            })
            .collect(),
        certificates: body
            .certificates
            .iter()
            .map(|c| CertificateSummary {
                kind: c.kind.to_string(),
                stake_credential: c.stake_credential,
            })
            .collect(),
        withdrawals: body
            .withdrawals
            .iter()
            .map(|w| WithdrawalSummary {
                address: render_address(&w.reward_address),
                amount: w.amount,
            })
            .collect(),
        required_signers: body.required_signers.clone(),
        auxiliary_data: envelope.has_auxiliary_data(),
        witness_set: !envelope.witness_set.is_empty(),
        vkey_witnesses: envelope.witness_set.vkey_count(),
        is_valid: envelope.is_valid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::fixtures::{self, BodySpec};

    fn malformed(input: &str) -> MalformedReason {
        match decode(input) {
            Err(TransactionError::MalformedEnvelope { reason }) => reason,
            other => panic!("expected a malformed envelope, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_empty_input() {
        assert_eq!(malformed(""), MalformedReason::Empty);
        assert_eq!(malformed("   \n"), MalformedReason::Empty);
        assert_eq!(malformed("0x"), MalformedReason::Empty);
    }

    #[test]
    fn test_rejects_non_hex_before_length() {
        assert_eq!(
            malformed("84a3zz"),
            MalformedReason::NonHex {
                position: 4,
                character: 'z'
            }
        );
        assert!(matches!(malformed("84a"), MalformedReason::OddLength { len: 3 }));
        // Odd length and a bad character: the character is reported.
        assert!(matches!(malformed("84g"), MalformedReason::NonHex { .. }));
    }

    #[test]
    fn test_rejects_odd_length() {
        assert_eq!(malformed("84a30"), MalformedReason::OddLength { len: 5 });
    }

    #[test]
    fn test_rejects_too_short() {
        assert_eq!(malformed("84a0"), MalformedReason::TooShort { bytes: 2 });
    }

    #[test]
    fn test_rejects_undecodable_cbor() {
        // Long enough, valid hex, not a transaction.
        assert!(matches!(
            malformed("ffffffffffffffffffffffff"),
            MalformedReason::Undecodable { .. }
        ));
        // A two-element array.
        assert!(matches!(
            malformed("82a300800180020000a0a0a0"),
            MalformedReason::Undecodable { .. }
        ));
    }

    #[test]
    fn test_minimal_envelope() {
        let env = decode("83a3008001800200a0f6").unwrap();
        assert_eq!(env.body.fee, 0);
        assert!(env.body.inputs.is_empty());
        assert_eq!(env.is_valid, None);
        assert!(!env.has_auxiliary_data());
        assert!(env.witness_set.is_empty());
        assert_eq!(encode(&env).unwrap(), "83a3008001800200a0f6");
    }

    #[test]
    fn test_prefix_and_whitespace_tolerated() {
        let env = decode("  0x83a3008001800200a0f6\n").unwrap();
        assert_eq!(env.body.raw_bytes(), &hex::decode("a3008001800200").unwrap()[..]);
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        assert!(matches!(
            malformed("83a3008001800200a0f600"),
            MalformedReason::Undecodable { .. }
        ));
    }

    #[test]
    fn test_decodes_body_fields() {
        let mut spec = BodySpec::default();
        spec.certificates = vec![(0, [0x55; 28]), (2, [0x55; 28])];
        let mut reward = vec![0xe0];
        reward.extend_from_slice(&[0x55; 28]);
        spec.withdrawals = vec![(reward, 1_234)];
        spec.required_signers = vec![[0x66; 28]];

        let env = decode_bytes(&fixtures::unsigned_envelope(&fixtures::body(&spec))).unwrap();
        let body = &env.body;
        assert_eq!(body.fee, 170_000);
        assert_eq!(body.ttl, Some(50_000_000));
        assert_eq!(body.inputs.len(), 1);
        assert_eq!(body.inputs[0].index, 1);
        assert_eq!(body.outputs.len(), 2);
        assert_eq!(body.outputs[0].lovelace, 2_000_000);
        assert!(!body.outputs[0].has_multi_assets);
        assert_eq!(body.outputs[1].lovelace, 1_500_000);
        assert!(body.outputs[1].has_multi_assets);
        assert_eq!(body.certificates.len(), 2);
        assert_eq!(body.certificates[1].kind, CertificateKind::StakeDelegation);
        assert_eq!(
            body.certificates[1].stake_credential,
            Some(StakeCredential::KeyHash(fixtures::key_hash([0x55; 28])))
        );
        assert_eq!(body.withdrawals[0].amount, 1_234);
        assert_eq!(body.required_signers, vec![fixtures::key_hash([0x66; 28])]);
        assert_eq!(env.is_valid, Some(true));
    }

    #[test]
    fn test_roundtrip_preserves_bytes() {
        let body = fixtures::body(&BodySpec::default());
        let raw = fixtures::unsigned_envelope(&body);
        let env = decode_bytes(&raw).unwrap();
        assert_eq!(encode_bytes(&env).unwrap(), raw);
        assert_eq!(env.body.raw_bytes(), &body[..]);
    }

    #[test]
    fn test_roundtrip_keeps_unknown_witnesses_and_aux() {
        let body = fixtures::body(&BodySpec::default());
        let vkey = PublicKey::from_bytes([0x77; 32]);
        let raw = fixtures::partially_signed_envelope(&body, &vkey, &[0x88; 64]);

        let env = decode_bytes(&raw).unwrap();
        assert_eq!(env.witness_set.vkey_count(), 1);
        assert_eq!(env.witness_set.other_entries().len(), 1);
        assert_eq!(env.witness_set.other_entries()[0].key, 1);
        assert!(env.has_auxiliary_data());

        let again = decode(&encode(&env).unwrap()).unwrap();
        assert_eq!(again, env);
        assert_eq!(encode_bytes(&again).unwrap(), raw);
    }

    #[test]
    fn test_inspect_summary() {
        let mut spec = BodySpec::default();
        spec.certificates = vec![(0, [0x55; 28])];
        let env = decode_bytes(&fixtures::unsigned_envelope(&fixtures::body(&spec))).unwrap();
        let summary = inspect(&env);

        assert_eq!(summary.fee, 170_000);
        assert_eq!(summary.inputs[0].transaction_id.to_hex(), "11".repeat(32));
        assert!(summary.outputs[0].address.starts_with("addr_test1"));
        assert!(summary.outputs[1].multi_asset);
        assert_eq!(summary.certificates[0].kind, "StakeRegistration");
        assert!(!summary.auxiliary_data);
        assert!(!summary.witness_set);
        assert_eq!(summary.vkey_witnesses, 0);
        assert_eq!(summary.tx_hash, hash_body(&env.body));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["fee"], 170_000);
        assert_eq!(json["certificates"][0]["type"], "StakeRegistration");
        assert_eq!(json["inputs"][0]["index"], 1);
    }

    #[test]
    fn test_inspect_falls_back_to_hex_for_byron_outputs() {
        let mut spec = BodySpec::default();
        spec.output_address = vec![0x82, 0xd8, 0x18, 0x41, 0x00];
        let env = decode_bytes(&fixtures::unsigned_envelope(&fixtures::body(&spec))).unwrap();
        assert_eq!(inspect(&env).outputs[0].address, "82d8184100");
    }

    #[test]
    fn test_malformed_reason_messages() {
        assert_eq!(MalformedReason::Empty.to_string(), "input is empty");
        assert!(MalformedReason::TooShort { bytes: 3 }
            .to_string()
            .contains("minimum 10"));
    }
}
