//! Visibility labels and vendor delivery modes.

use std::fmt;
use std::str::FromStr;

/// Label of the private visibility option.
pub const PRIVATE: &str = "private";

/// Label of the public visibility option.
pub const PUBLIC: &str = "public";

/// Vendor-side access tag for a stored image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryMode {
    /// Publicly fetchable.
    Upload,
    /// Requires a signed URL.
    Authenticated,
}

impl DeliveryMode {
    /// Vendor string for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMode::Upload => "upload",
            DeliveryMode::Authenticated => "authenticated",
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a visibility label to the vendor delivery mode.
///
/// Only `"private"` maps to [`DeliveryMode::Authenticated`]. Every other
/// label, including unknown ones, is delivered as a public upload.
pub fn delivery_mode(label: &str) -> DeliveryMode {
    if label == PRIVATE {
        DeliveryMode::Authenticated
    } else {
        DeliveryMode::Upload
    }
}

/// Domain visibility of a folder or file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only the owner can view.
    Private,
    /// Anyone can view.
    Public,
}

impl Visibility {
    /// Label stored in the visibilities table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => PRIVATE,
            Visibility::Public => PUBLIC,
        }
    }

    /// Delivery mode used at the vendor boundary.
    pub fn delivery_mode(&self) -> DeliveryMode {
        delivery_mode(self.as_str())
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            PRIVATE => Ok(Visibility::Private),
            PUBLIC => Ok(Visibility::Public),
            _ => Err(format!("unknown visibility: {s}")),
        }
    }
}
