use serde::{Deserialize, Serialize};

/// How `scatter_add` treats foreground coordinates that fall outside the image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// Offset coordinates wrap around the opposite edge.
    #[default]
    Wrap,
    /// Destination pixels whose offset coordinate leaves the image keep
    /// the background pixel for that pass.
    Clip,
}

impl BoundaryPolicy {
    pub const ALL: &[BoundaryPolicy] = &[BoundaryPolicy::Wrap, BoundaryPolicy::Clip];

    /// Maps destination coordinate `pos + offset` into `0..len`, or `None`
    /// when the pixel should be left untouched.
    pub fn resolve(&self, pos: u32, offset: u32, len: u32) -> Option<u32> {
        if len == 0 {
            return None;
        }
        let shifted = pos as u64 + offset as u64;
        match self {
            BoundaryPolicy::Wrap => Some((shifted % len as u64) as u32),
            BoundaryPolicy::Clip => (shifted < len as u64).then_some(shifted as u32),
        }
    }
}

impl std::fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryPolicy::Wrap => write!(f, "wrap"),
            BoundaryPolicy::Clip => write!(f, "clip"),
        }
    }
}

impl std::str::FromStr for BoundaryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wrap" => Ok(BoundaryPolicy::Wrap),
            "clip" => Ok(BoundaryPolicy::Clip),
            other => Err(format!("Boundary policy must be 'wrap' or 'clip', got '{other}'")),
        }
    }
}
