use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account category controlling which pages are reachable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    PartnerSupplier,
    Professional,
    LoveDecoration,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::PartnerSupplier, Role::Professional, Role::LoveDecoration];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::PartnerSupplier => "partnerSupplier",
            Role::Professional => "professional",
            Role::LoveDecoration => "loveDecoration",
        }
    }

    /// Parse the role cookie, which holds a JSON-encoded string
    ///
    /// Cookie values may arrive percent-encoded (`%22professional%22`).
    /// Bare words, numbers and unknown names yield `None`.
    pub fn from_cookie(raw: &str) -> Option<Role> {
        let decoded = urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw));
        serde_json::from_str(decoded.trim()).ok()
    }

    /// Value written to the role cookie
    pub fn to_cookie_value(&self) -> String {
        format!("\"{}\"", self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    /// Accepts the bare role name, for command-line use
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("unknown role '{}', expected one of partnerSupplier, professional, loveDecoration", s))
    }
}
