use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Environment variables handed to a spawned process.
///
/// Serialized as a plain JSON object (`{"KEY": "value"}`).
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Env(BTreeMap<String, String>);

impl Env {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Set a variable, replacing any previous value.
    ///
    /// Returns `self` for chaining.
    pub fn set<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterate variables as `(&str, &str)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Env
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::Env;

    #[test]
    fn new_is_empty() {
        let env = Env::new();
        assert!(env.is_empty());
        assert!(env.get("PORT").is_none());
    }

    #[test]
    fn set_overrides_previous_value() {
        let mut env = Env::new();
        env.set("PORT", "5173").set("HOST", "127.0.0.1").set("PORT", "4173");

        assert_eq!(env.len(), 2);
        assert_eq!(env.get("PORT"), Some("4173"));
        assert_eq!(env.get("HOST"), Some("127.0.0.1"));
    }

    #[test]
    fn iter_is_key_ordered() {
        let env: Env = [("B", "2"), ("A", "1")].into_iter().collect();
        let keys: Vec<&str> = env.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["A", "B"]);
    }

    #[test]
    fn serializes_as_object() {
        let env: Env = [("PORT", "5173")].into_iter().collect();
        let json = serde_json::to_string(&env).unwrap();
        assert_eq!(json, r#"{"PORT":"5173"}"#);

        let back: Env = serde_json::from_str(r#"{"A":"x"}"#).unwrap();
        assert_eq!(back.get("A"), Some("x"));
    }
}
