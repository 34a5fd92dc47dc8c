/// Serde helpers for query-string deserialization.
///
/// Clients send `?mes=&anio=` when a filter control is cleared. Empty values
/// are treated as absent so they never turn into a "match nothing" filter.
use serde::{Deserialize, Deserializer};

pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Params {
        #[serde(default, deserialize_with = "super::deserialize_optional_string")]
        mes: Option<String>,
        #[serde(default, deserialize_with = "super::deserialize_optional_string")]
        anio: Option<String>,
    }

    #[test]
    fn test_empty_values_are_absent() {
        let params: Params = serde_json::from_str(r#"{"mes": "", "anio": " 2024 "}"#).unwrap();
        assert_eq!(params.mes, None);
        assert_eq!(params.anio.as_deref(), Some("2024"));
    }

    #[test]
    fn test_missing_values_are_absent() {
        let params: Params = serde_json::from_str("{}").unwrap();
        assert!(params.mes.is_none());
        assert!(params.anio.is_none());
    }
}
