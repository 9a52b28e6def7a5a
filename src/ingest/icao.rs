use log::info;
use serde::Deserialize;
use std::collections::HashMap;

use super::error::IngestError;

#[derive(Debug, Clone, Deserialize)]
pub struct TypeInfo {
    #[serde(default)]
    pub desc: Option<String>,
}

/// ICAO type designator (`A320`) to description (`L2J`).
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    types: HashMap<String, TypeInfo>,
}

impl TypeTable {
    pub fn new(types: HashMap<String, TypeInfo>) -> Self {
        let types = types
            .into_iter()
            .map(|(code, info)| (code.to_uppercase(), info))
            .collect();
        TypeTable { types }
    }

    pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<Self, IngestError> {
        let types: HashMap<String, TypeInfo> = client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let table = TypeTable::new(types);
        table.check()?;
        info!("Loaded {} ICAO aircraft types", table.len());
        Ok(table)
    }

    pub fn describe(&self, icao_type: &str) -> Option<&str> {
        self.types
            .get(&icao_type.trim().to_uppercase())
            .and_then(|info| info.desc.as_deref())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// A table that does not know the A320 is not worth polling with.
    pub fn check(&self) -> Result<(), IngestError> {
        match self.describe("A320") {
            Some("L2J") => Ok(()),
            other => Err(IngestError::TypeTable(format!(
                "A320 resolves to {:?} instead of L2J",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TypeTable {
        let json = r#"{
            "A320": { "desc": "L2J", "wtc": "M" },
            "c172": { "desc": "L1P", "wtc": "L" },
            "ZZZZ": {}
        }"#;
        TypeTable::new(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let table = table();
        assert_eq!(table.describe("a320"), Some("L2J"));
        assert_eq!(table.describe("C172"), Some("L1P"));
        assert_eq!(table.describe("ZZZZ"), None);
        assert_eq!(table.describe("B738"), None);
        assert!(table.check().is_ok());
    }

    #[test]
    fn table_without_a320_is_unusable() {
        assert!(matches!(
            TypeTable::default().check(),
            Err(IngestError::TypeTable(_))
        ));
    }
}
