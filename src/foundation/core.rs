pub use kurbo::Point;

/// A point on the simulated millisecond clock.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Millis(pub u64);

impl Millis {
    pub const ZERO: Self = Self(0);

    pub fn after(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` lies in the future.
    pub fn since(self, earlier: Millis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::fmt::Display for Millis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Renderer-provided bounds used to place particles.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::FALLBACK
    }
}

impl Viewport {
    /// Bounding box used when the host cannot report its dimensions.
    pub const FALLBACK: Self = Self {
        width: 1000.0,
        height: 1000.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_usable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Resolve an optional host viewport, substituting [`Viewport::FALLBACK`]
    /// for a missing or degenerate one.
    pub fn resolve(host: Option<Viewport>) -> Self {
        match host {
            Some(v) if v.is_usable() => v,
            Some(v) => {
                tracing::warn!(width = v.width, height = v.height, "unusable viewport, using fallback");
                Self::FALLBACK
            }
            None => {
                tracing::debug!("no viewport reported, using fallback");
                Self::FALLBACK
            }
        }
    }

    /// Half-open containment: `[0, width) x [0, height)`.
    pub fn contains(self, p: Point) -> bool {
        (0.0..self.width).contains(&p.x) && (0.0..self.height).contains(&p.y)
    }
}
