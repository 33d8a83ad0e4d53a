use crate::{
    animation::ease::Ease,
    foundation::error::{ClawError, ClawResult},
};

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

/// Keyed values over normalized progress in `[0, 1]`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframes<T> {
    pub keys: Vec<Keyframe<T>>, // sorted by `at`
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe<T> {
    pub at: f64,
    pub value: T,
    #[serde(default)]
    pub ease: Ease, // applied toward the next key
}

impl<T> Keyframes<T>
where
    T: Lerp + Clone,
{
    /// Spread `values` evenly across the cycle, first at 0 and last at 1.
    /// An empty input gives an empty track, which `validate` rejects.
    pub fn evenly(values: impl IntoIterator<Item = T>, ease: Ease) -> Self {
        let values: Vec<T> = values.into_iter().collect();
        let last = values.len().saturating_sub(1).max(1) as f64;
        let keys = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| Keyframe {
                at: i as f64 / last,
                value,
                ease,
            })
            .collect();
        Self { keys }
    }

    pub fn validate(&self) -> ClawResult<()> {
        if self.keys.is_empty() {
            return Err(ClawError::keyframes("Keyframes must have at least one key"));
        }
        if self
            .keys
            .iter()
            .any(|k| !k.at.is_finite() || !(0.0..=1.0).contains(&k.at))
        {
            return Err(ClawError::keyframes(
                "Keyframes positions must lie within [0, 1]",
            ));
        }
        if !self.keys.windows(2).all(|w| w[0].at <= w[1].at) {
            return Err(ClawError::keyframes("Keyframes keys must be sorted by position"));
        }
        Ok(())
    }

    /// Sample at `progress`; values outside the keyed span hold the nearest key.
    pub fn sample(&self, progress: f64) -> T {
        let p = progress.clamp(0.0, 1.0);
        let idx = self.keys.partition_point(|k| k.at <= p);

        if idx == 0 {
            return self.keys[0].value.clone();
        }
        if idx >= self.keys.len() {
            return self.keys[self.keys.len() - 1].value.clone();
        }

        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        let span = b.at - a.at;
        if span <= 0.0 {
            return a.value.clone();
        }
        let t = a.ease.apply((p - a.at) / span);
        T::lerp(&a.value, &b.value, t)
    }
}
