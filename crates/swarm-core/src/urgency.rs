//! Urgency levels shared across the leader and follower protocols.
//!
//! Every point of interest carries one of three urgency levels.  The level
//! travels on the wire as its integer value (1–3) and contributes a fixed
//! weight to the mission score when the point is delivered for the first
//! time.

/// Urgency of a point of interest.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "u8", try_from = "u8"))]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    /// Wire-level integer value (1–3).
    #[inline]
    pub fn level(self) -> u8 {
        match self {
            Urgency::Low    => 1,
            Urgency::Medium => 2,
            Urgency::High   => 3,
        }
    }

    /// Mission-score weight: w1 = 0.2, w2 = 0.5, w3 = 1.0.
    #[inline]
    pub fn weight(self) -> f64 {
        match self {
            Urgency::Low    => 0.2,
            Urgency::Medium => 0.5,
            Urgency::High   => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Low    => "low",
            Urgency::Medium => "medium",
            Urgency::High   => "high",
        }
    }
}

impl From<Urgency> for u8 {
    #[inline]
    fn from(u: Urgency) -> u8 {
        u.level()
    }
}

impl TryFrom<u8> for Urgency {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Urgency::Low),
            2 => Ok(Urgency::Medium),
            3 => Ok(Urgency::High),
            other => Err(format!("urgency level out of range: {other}")),
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
