use serde::{Deserialize, Serialize};

/// Three-form noun declension used by East Slavic languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plural {
    pub one: String,
    pub few: String,
    pub many: String,
}

impl Plural {
    pub fn new(one: impl Into<String>, few: impl Into<String>, many: impl Into<String>) -> Self {
        Self {
            one: one.into(),
            few: few.into(),
            many: many.into(),
        }
    }

    /// Word form for `n`: "one" for 1, 21, 31…; "few" for 2-4, 22-24…;
    /// "many" otherwise (11-14 included).
    #[must_use]
    pub fn form(&self, n: usize) -> &str {
        let mod10 = n % 10;
        let mod100 = n % 100;

        if mod10 == 1 && mod100 != 11 {
            &self.one
        } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
            &self.few
        } else {
            &self.many
        }
    }

    /// `"<n> <form>"`
    #[must_use]
    pub fn format(&self, n: usize) -> String {
        format!("{n} {}", self.form(n))
    }
}
