use std::collections::BTreeMap;

use crate::animation::keyframes::Lerp;

/// A named motion parameter. Values are semantic units, not pixels.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PoseParam {
    Height,
    OffsetY,
    RotateDeg,
    Scale,
    ScaleY,
    Opacity,
}

/// Named numeric parameters describing an element at one instant.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Pose(BTreeMap<PoseParam, f64>);

impl Pose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, param: PoseParam, value: f64) -> Self {
        self.0.insert(param, value);
        self
    }

    pub fn set(&mut self, param: PoseParam, value: f64) {
        self.0.insert(param, value);
    }

    pub fn get(&self, param: PoseParam) -> Option<f64> {
        self.0.get(&param).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoseParam, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(PoseParam, f64)> for Pose {
    fn from_iter<I: IntoIterator<Item = (PoseParam, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// Parameters present on only one side hold their value.
impl Lerp for Pose {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        let mut out = a.clone();
        for (param, to) in b.iter() {
            let v = match a.get(param) {
                Some(from) => <f64 as Lerp>::lerp(&from, &to, t),
                None => to,
            };
            out.set(param, v);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_blends_shared_params() {
        let a = Pose::new().with(PoseParam::RotateDeg, -15.0);
        let b = Pose::new().with(PoseParam::RotateDeg, -30.0);
        let mid = Pose::lerp(&a, &b, 0.5);
        assert_eq!(mid.get(PoseParam::RotateDeg), Some(-22.5));
    }

    #[test]
    fn lerp_holds_one_sided_params() {
        let a = Pose::new()
            .with(PoseParam::Opacity, 0.0)
            .with(PoseParam::Scale, 0.9);
        let b = Pose::new()
            .with(PoseParam::Opacity, 1.0)
            .with(PoseParam::OffsetY, 4.0);
        let mid = Pose::lerp(&a, &b, 0.25);
        assert_eq!(mid.get(PoseParam::Opacity), Some(0.25));
        assert_eq!(mid.get(PoseParam::Scale), Some(0.9));
        assert_eq!(mid.get(PoseParam::OffsetY), Some(4.0));
        assert_eq!(mid.len(), 3);
    }

    #[test]
    fn serializes_as_flat_map() {
        let p = Pose::new().with(PoseParam::ScaleY, 1.1);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"scale_y":1.1}"#);
    }
}
