use anyhow::Context as _;
use erk_core::block::{encode, BlockData};
use erk_core::registry::BlockKind;
use erk_core::schema;

/// Parse `key=value` pairs. Values are read as YAML scalars, so `42` is a
/// number and `true` a bool; quote them to force a string.
fn parse_fields(fields: &[String]) -> anyhow::Result<BlockData> {
    let mut data = BlockData::new();
    for field in fields {
        let (key, raw) = field
            .split_once('=')
            .with_context(|| format!("field '{field}' must be KEY=VALUE"))?;
        let value: serde_yaml::Value = if raw.is_empty() {
            serde_yaml::Value::String(String::new())
        } else {
            serde_yaml::from_str(raw)
                .with_context(|| format!("field '{key}' has an unparseable value"))?
        };
        data.insert(key.to_string(), value);
    }
    Ok(data)
}

pub fn run(kind: &str, fields: &[String]) -> anyhow::Result<()> {
    let data = parse_fields(fields)?;
    if kind.parse::<BlockKind>().is_ok() {
        schema::validate(kind, &data)?;
    } else {
        tracing::warn!(kind, "no schema registered; rendering without validation");
    }
    println!("{}", encode(kind, &data)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_yaml_scalars() {
        let data = parse_fields(&[
            "issue_number=42".to_string(),
            "worktree_name=add-login".to_string(),
            "timestamp='2024-01-01T00:00:00Z'".to_string(),
            "empty=".to_string(),
        ])
        .unwrap();
        assert_eq!(data["issue_number"], serde_yaml::Value::from(42));
        assert_eq!(data["worktree_name"], serde_yaml::Value::from("add-login"));
        assert_eq!(data["timestamp"], serde_yaml::Value::from("2024-01-01T00:00:00Z"));
        assert_eq!(data["empty"], serde_yaml::Value::from(""));
    }

    #[test]
    fn missing_equals_is_rejected() {
        assert!(parse_fields(&["nokey".to_string()]).is_err());
    }
}
