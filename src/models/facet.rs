use serde::{Deserialize, Serialize};

/// A filterable dimension of contact metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    /// People or organizations, matched against name, notes and affiliation.
    Names,
    /// Civic focus areas.
    Domains,
    /// Communities served.
    Communities,
    /// Campus affiliation.
    Campus,
    /// Capabilities or expertise.
    Capabilities,
}

impl Facet {
    /// All recognized facets, in key order.
    pub const ALL: [Facet; 5] = [
        Facet::Names,
        Facet::Domains,
        Facet::Communities,
        Facet::Campus,
        Facet::Capabilities,
    ];

    /// Returns the key used for this facet in a filter object.
    pub fn key(self) -> &'static str {
        match self {
            Self::Names => "names",
            Self::Domains => "domains",
            Self::Communities => "communities",
            Self::Campus => "campus",
            Self::Capabilities => "capabilities",
        }
    }

    /// Parses a filter object key. Unknown keys yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "names" => Some(Self::Names),
            "domains" => Some(Self::Domains),
            "communities" => Some(Self::Communities),
            "campus" => Some(Self::Campus),
            "capabilities" => Some(Self::Capabilities),
            _ => None,
        }
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facet_parse_accepts_known_keys() {
        for facet in Facet::ALL {
            assert_eq!(Facet::parse(facet.key()), Some(facet));
        }
        assert_eq!(Facet::parse(" Campus "), Some(Facet::Campus));
        assert_eq!(Facet::parse("roles"), None);
    }

    #[test]
    fn facet_serializes_as_key() {
        let json = serde_json::to_string(&Facet::Communities).unwrap();
        assert_eq!(json, "\"communities\"");
    }
}
