use std::fmt;

/// An API key for the places service. `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct PlacesCredential(String);

impl PlacesCredential {
    /// `None` for an empty or whitespace-only key.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into().trim().to_string();
        (!key.is_empty()).then_some(Self(key))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PlacesCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlacesCredential(***)")
    }
}

/// Whether station lookup may talk to the places service at all.
///
/// Handed to [`crate::StationResolver`] at construction; without a credential the
/// resolver answers "no station" and never touches the network.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlacesAccess {
    #[default]
    Disabled,
    Enabled(PlacesCredential),
}

impl PlacesAccess {
    pub fn from_key(key: Option<String>) -> Self {
        match key.and_then(PlacesCredential::new) {
            Some(c) => PlacesAccess::Enabled(c),
            None => PlacesAccess::Disabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, PlacesAccess::Enabled(_))
    }
}
