//! ST-014: `Fn::Hash` (BLAKE3) and `Fn::Base64`.

use super::bad_argument;
use crate::core::error::Result;
use crate::core::value::Value;
use base64::Engine;

/// Hash a string. Returns `"blake3:{hex}"`.
pub fn hash_string(s: &str) -> String {
    format!("blake3:{}", blake3::hash(s.as_bytes()).to_hex())
}

/// String → `"blake3:{hex}"`.
pub fn hash(arg: Value) -> Result<Value> {
    let text = arg
        .as_str()
        .ok_or_else(|| bad_argument("Hash", format!("expected a string, got {}", arg.type_name())))?;
    Ok(Value::from(hash_string(text)))
}

/// String → standard base64.
pub fn base64(arg: Value) -> Result<Value> {
    let text = arg.as_str().ok_or_else(|| {
        bad_argument("Base64", format!("expected a string, got {}", arg.type_name()))
    })?;
    Ok(Value::from(
        base64::engine::general_purpose::STANDARD.encode(text.as_bytes()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::core::stack::Stack;

    #[test]
    fn test_st014_hash_deterministic() {
        let a = hash_string("hello");
        let b = hash_string("hello");
        assert_eq!(a, b);
        assert!(a.starts_with("blake3:"));
        assert_eq!(a.len(), 7 + 64);
        assert_ne!(a, hash_string("hello!"));
    }

    #[test]
    fn test_st014_hash_known_vector() {
        assert_eq!(
            hash_string(""),
            "blake3:af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn test_st014_base64() {
        let out = base64(Value::from("hello world")).unwrap();
        assert_eq!(out.as_str(), Some("aGVsbG8gd29ybGQ="));
    }

    #[test]
    fn test_st014_reject_non_string() {
        let err = hash(Value::from(1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::FunctionFailed);
        assert!(err.message.contains("number"));
        assert!(base64(Value::Null).is_err());
    }

    #[test]
    fn test_st014_from_template() {
        let mut stack = Stack::with_builtins();
        stack.register_input("Secret", "hello world");
        stack
            .build_json(r#"{"Outputs":{"b64":{"Fn::Base64":{"Ref":"Secret"}}}}"#)
            .unwrap();
        assert_eq!(stack.output::<String>("b64").as_deref(), Some("aGVsbG8gd29ybGQ="));
    }

    #[test]
    fn test_st014_function_error_carries_resource() {
        let mut stack = Stack::with_builtins();
        let err = stack
            .build_json(
                r#"{"Resources":{"V":{"Type":"Local::Value","Properties":{"Value":{"Fn::Hash":[1]}}}}}"#,
            )
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::FunctionFailed);
        assert_eq!(err.resource.as_deref(), Some("V"));
    }
}
