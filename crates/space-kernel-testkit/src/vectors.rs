//! Golden test vectors for canonicalization and event signing bytes.
//!
//! Any conforming implementation must produce these exact strings. If these
//! change, event hashes and signatures from every other implementation stop
//! verifying.

use serde_json::Value;

use space_kernel_core::{canonicalize, AccountAddress, EventHash};
use space_kernel_events::{
    AcceptInvitationTransaction, CreateInvitationTransaction, CreateSpaceTransaction,
    DeleteSpaceTransaction, SpaceTransaction,
};

/// A canonicalization vector: JSON text in, canonical JSON out.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    pub name: &'static str,
    pub description: &'static str,
    pub input: &'static str,
    pub expected: &'static str,
}

/// A transaction vector: a transaction and its exact signing bytes.
#[derive(Debug, Clone)]
pub struct TransactionVector {
    pub name: &'static str,
    pub transaction: SpaceTransaction,
    pub expected: String,
}

/// All canonicalization vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "sorted_keys",
            description: "Object members sorted by key",
            input: r#"{"b":2,"a":1}"#,
            expected: r#"{"a":1,"b":2}"#,
        },
        GoldenVector {
            name: "array_order",
            description: "Arrays keep their order and literals pass through",
            input: r#"[1, null, true, "x"]"#,
            expected: r#"[1,null,true,"x"]"#,
        },
        GoldenVector {
            name: "nested",
            description: "Nested objects sorted at every level, whitespace removed",
            input: r#"{ "z": { "b": [], "a": {} }, "a": "é" }"#,
            expected: "{\"a\":\"\u{e9}\",\"z\":{\"a\":{},\"b\":[]}}",
        },
        GoldenVector {
            name: "numbers",
            description: "Shortest round-trip number formatting",
            input: r#"{"numbers":[1.0,-0.0,0.1,1e21,1e-7,123456789012]}"#,
            expected: r#"{"numbers":[1,0,0.1,1e+21,1e-7,123456789012]}"#,
        },
        GoldenVector {
            name: "escapes",
            description: "Control characters escaped, solidus left alone",
            input: r#"["\u0001\n\"\\\/"]"#,
            expected: r#"["\u0001\n\"\\/"]"#,
        },
        GoldenVector {
            name: "utf16_key_order",
            description: "Keys compared by UTF-16 code units, not code points",
            input: r#"{"\ue000":1,"\ud83d\ude00":2}"#,
            expected: "{\"\u{1f600}\":2,\"\u{e000}\":1}",
        },
        GoldenVector {
            name: "rfc8785_sample",
            description: "Sample object from RFC 8785 section 3.2.2",
            input: r#"{"numbers":[333333333.33333329,1E30,4.50,2e-3,0.000000000000000000000000001],"string":"\u20ac$\u000F\u000aA'\u0042\u0022\u005c\\\"\/","literals":[null,true,false]}"#,
            expected: "{\"literals\":[null,true,false],\"numbers\":[333333333.3333333,1e+30,4.5,0.002,1e-27],\"string\":\"\u{20ac}$\\u000f\\nA'B\\\"\\\\\\\\\\\"/\"}",
        },
    ]
}

/// All transaction signing-byte vectors.
pub fn transaction_vectors() -> Vec<TransactionVector> {
    let tip = EventHash::from_bytes([0xab; 32]);
    let alice = AccountAddress::new("0x1111111111111111111111111111111111111111");
    let bob = AccountAddress::new("0x2222222222222222222222222222222222222222");
    let tip_hex = "abababababababababababababababababababababababababababababababab";

    vec![
        TransactionVector {
            name: "create_space",
            transaction: SpaceTransaction::CreateSpace(CreateSpaceTransaction {
                id: "space-1".into(),
                creator_account_address: alice,
            }),
            expected: r#"{"creatorAccountAddress":"0x1111111111111111111111111111111111111111","id":"space-1","type":"create-space"}"#.into(),
        },
        TransactionVector {
            name: "create_invitation",
            transaction: SpaceTransaction::CreateInvitation(CreateInvitationTransaction {
                id: "invite-1".into(),
                invitee_account_address: bob,
                previous_event_hash: tip,
            }),
            expected: format!(
                r#"{{"id":"invite-1","inviteeAccountAddress":"0x2222222222222222222222222222222222222222","previousEventHash":"{tip_hex}","type":"create-invitation"}}"#
            ),
        },
        TransactionVector {
            name: "accept_invitation",
            transaction: SpaceTransaction::AcceptInvitation(AcceptInvitationTransaction {
                id: "accept-1".into(),
                previous_event_hash: tip,
            }),
            expected: format!(
                r#"{{"id":"accept-1","previousEventHash":"{tip_hex}","type":"accept-invitation"}}"#
            ),
        },
        TransactionVector {
            name: "delete_space",
            transaction: SpaceTransaction::DeleteSpace(DeleteSpaceTransaction {
                id: "space-1".into(),
                previous_event_hash: tip,
            }),
            expected: format!(
                r#"{{"id":"space-1","previousEventHash":"{tip_hex}","type":"delete-space"}}"#
            ),
        },
    ]
}

/// Verify a single canonicalization vector.
pub fn verify_vector(vector: &GoldenVector) -> Result<(), String> {
    let value: Value = serde_json::from_str(vector.input)
        .map_err(|e| format!("{}: input does not parse: {e}", vector.name))?;
    let actual = canonicalize(&value).map_err(|e| format!("{}: {e}", vector.name))?;
    if actual != vector.expected {
        return Err(format!(
            "{}: expected {}, got {}",
            vector.name, vector.expected, actual
        ));
    }
    Ok(())
}

/// Verify a single transaction vector.
pub fn verify_transaction_vector(vector: &TransactionVector) -> Result<(), String> {
    let bytes = vector
        .transaction
        .signing_bytes()
        .map_err(|e| format!("{}: {e}", vector.name))?;
    let actual = String::from_utf8(bytes).map_err(|e| format!("{}: {e}", vector.name))?;
    if actual != vector.expected {
        return Err(format!(
            "{}: expected {}, got {}",
            vector.name, vector.expected, actual
        ));
    }
    Ok(())
}

/// Verify every vector, collecting all failures.
pub fn verify_all_vectors() -> Result<(), Vec<String>> {
    let errors: Vec<String> = all_vectors()
        .iter()
        .filter_map(|v| verify_vector(v).err())
        .chain(
            transaction_vectors()
                .iter()
                .filter_map(|v| verify_transaction_vector(v).err()),
        )
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_pass() {
        if let Err(errors) = verify_all_vectors() {
            panic!("golden vectors failed:\n{}", errors.join("\n"));
        }
    }

    #[test]
    fn test_vector_names_unique() {
        let mut names: Vec<_> = all_vectors().iter().map(|v| v.name).collect();
        names.extend(transaction_vectors().iter().map(|v| v.name));
        let count = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), count);
    }

    #[test]
    fn test_canonical_output_is_stable() {
        for vector in all_vectors() {
            let value: Value = serde_json::from_str(vector.expected).unwrap();
            assert_eq!(canonicalize(&value).unwrap(), vector.expected, "{}", vector.name);
        }
    }
}
