use std::fmt;

/// Spatial layout of the generated bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
    Cube,
    Sphere,
    Plummer,
}

impl Distribution {
    pub const ALL: [Distribution; 3] = [
        Distribution::Cube,
        Distribution::Sphere,
        Distribution::Plummer,
    ];

    /// Only the first character is significant: `c`, `s` or `p`.
    pub fn from_discriminator(s: &str) -> Option<Self> {
        match s.chars().next()? {
            'c' => Some(Distribution::Cube),
            's' => Some(Distribution::Sphere),
            'p' => Some(Distribution::Plummer),
            _ => None,
        }
    }
}

impl Default for Distribution {
    fn default() -> Self {
        Self::Cube
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distribution::Cube => write!(f, "cube"),
            Distribution::Sphere => write!(f, "sphere"),
            Distribution::Plummer => write!(f, "plummer"),
        }
    }
}
