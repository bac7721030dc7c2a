use crate::types::GestureMap;

/// Resolves a gesture class from a flattened image file stem.
///
/// Keys are tried longest first (ties in lexicographic order), so `a_b_c` is
/// always tested before `b_c` which it contains. Matching is plain substring
/// containment and does not respect `_` boundaries: `b_c` also matches `ab_cd`.
#[derive(Debug, Clone)]
pub struct KeyMatcher {
    keys: Vec<(String, u32)>,
}

impl KeyMatcher {
    pub fn new(map: &GestureMap) -> Self {
        let mut keys: Vec<(String, u32)> = map
            .iter()
            .map(|(key, id)| (key.to_string(), id))
            .collect();
        keys.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Self { keys }
    }

    /// Class id of the longest key contained in `stem`
    pub fn match_stem(&self, stem: &str) -> Option<u32> {
        self.matching_key(stem).map(|(_, id)| id)
    }

    /// Longest key contained in `stem`, together with its class id
    pub fn matching_key(&self, stem: &str) -> Option<(&str, u32)> {
        self.keys
            .iter()
            .find(|(key, _)| stem.contains(key.as_str()))
            .map(|(key, id)| (key.as_str(), *id))
    }

    /// Keys in the order they are tried
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
