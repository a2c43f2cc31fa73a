use super::stanza::Stanza;

/// A package stanza from the dpkg status database.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    fields: Stanza,
}

impl PackageRecord {
    pub fn new(fields: Stanza) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name)
    }

    /// The identity key. Records without one take part in no set operation.
    pub fn name(&self) -> Option<&str> {
        self.field("Package")
    }

    pub fn status(&self) -> Option<&str> {
        self.field("Status")
    }

    /// True when the status triple ends in the state "installed", as in
    /// "install ok installed". "not-installed" and "half-installed" are
    /// different states and do not count.
    pub fn is_installed(&self) -> bool {
        self.status()
            .is_some_and(|s| s.split_whitespace().next_back() == Some("installed"))
    }

    /// First line of the Description field, or "" when there is none.
    pub fn summary(&self) -> &str {
        self.field("Description")
            .and_then(|d| d.lines().next())
            .unwrap_or("")
    }
}

impl From<Stanza> for PackageRecord {
    fn from(fields: Stanza) -> Self {
        Self::new(fields)
    }
}
