use crate::{Id, QualifiedName};
use anyhow::{anyhow, Context, Result};
use std::path::Path;

/// Ordered groups of known names.
///
/// Group order drives every report output; the first name in a group is its
/// canonical identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    groups: Vec<Vec<QualifiedName>>,
}

impl Dictionary {
    pub fn new(groups: Vec<Vec<QualifiedName>>) -> Result<Self> {
        let dictionary = Self { groups };
        dictionary.validate()?;
        Ok(dictionary)
    }

    /// Parse the JSON form: an array of groups, each an array of
    /// `{"Type", "Name", "Hint"}` objects. Hints are accepted and dropped.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let groups: Vec<Vec<Id>> =
            serde_json::from_str(raw).context("dictionary is not a JSON array of name groups")?;
        let groups = groups
            .into_iter()
            .map(|group| group.into_iter().map(|id| id.qualified).collect())
            .collect();
        Self::new(groups)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dictionary {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("invalid dictionary {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        for (idx, group) in self.groups.iter().enumerate() {
            if group.is_empty() {
                return Err(anyhow!(
                    "dictionary group #{} is empty (every group needs a canonical name)",
                    idx + 1
                ));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn groups(&self) -> &[Vec<QualifiedName>] {
        &self.groups
    }

    /// First name of the group at `idx`.
    #[must_use]
    pub fn canonical(&self, idx: usize) -> Option<&QualifiedName> {
        self.groups.get(idx).and_then(|group| group.first())
    }

    /// Every known name in declaration order
    pub fn identities(&self) -> impl Iterator<Item = &QualifiedName> {
        self.groups.iter().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn parses_groups_in_order() {
        let dictionary = Dictionary::from_json_str(
            r#"[
                [{"Type":"впс","Name":"Кодима"},{"Type":"віпс","Name":"Загнітків","Hint":"x"}],
                [{"type":"ГОРВ","name":"ВАК"}]
            ]"#,
        )
        .unwrap();

        assert_eq!(dictionary.len(), 2);
        assert_eq!(
            dictionary.canonical(0),
            Some(&QualifiedName::new("впс", "Кодима"))
        );
        assert_eq!(
            dictionary.canonical(1),
            Some(&QualifiedName::new("ГОРВ", "ВАК"))
        );
        let names: Vec<String> = dictionary.identities().map(|q| q.name.clone()).collect();
        assert_eq!(names, vec!["Кодима", "Загнітків", "ВАК"]);
    }

    #[test]
    fn missing_type_defaults_to_empty() {
        let dictionary = Dictionary::from_json_str(r#"[[{"Name":"Окни"}]]"#).unwrap();
        assert_eq!(dictionary.canonical(0), Some(&QualifiedName::new("", "Окни")));
    }

    #[test]
    fn rejects_empty_group() {
        let err = Dictionary::from_json_str(r#"[[{"Name":"A"}], []]"#).unwrap_err();
        assert!(err.to_string().contains("#2 is empty"), "{err}");
    }

    #[test]
    fn rejects_malformed_json() {
        let err = Dictionary::from_json_str(r#"{"Name":"A"}"#).unwrap_err();
        assert!(format!("{err:#}").contains("JSON array"), "{err:#}");
    }

    #[test]
    fn empty_dictionary_is_valid() {
        let dictionary = Dictionary::from_json_str("[]").unwrap();
        assert!(dictionary.is_empty());
        assert_eq!(dictionary.canonical(0), None);
    }

    #[test]
    fn load_reports_path_on_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = Dictionary::load(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid dictionary"), "{err:#}");
    }
}
