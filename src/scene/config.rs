use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context as _;

use crate::{
    choreo::element::{ElementKind, MotionSpec},
    choreo::grab_cycle::GrabCycleConfig,
    foundation::core::{Millis, Viewport},
    foundation::error::{ClawError, ClawResult},
    intro::bob::Bob,
    intro::reveal::RevealSection,
    particles::field::ParticleFieldConfig,
};

/// Everything needed to mount a [`crate::Scene`]. Every field has a default,
/// so `{}` is a complete config.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    pub grab: GrabCycleConfig,
    /// Per-element overrides of the stock claw motion.
    pub motions: BTreeMap<ElementKind, MotionSpec>,
    pub particles: ParticleFieldConfig,
    /// Host viewport; `None` places particles in the fallback box.
    pub viewport: Option<Viewport>,
    pub seed: u64,
    /// Play the hero entrance on mount; when false the hero starts settled.
    pub intro: bool,
    /// When each list section scrolls into view, measured from mount.
    pub in_view: BTreeMap<RevealSection, Millis>,
    pub bob: Bob,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            grab: GrabCycleConfig::default(),
            motions: BTreeMap::new(),
            particles: ParticleFieldConfig::default(),
            viewport: None,
            seed: 0,
            intro: true,
            in_view: BTreeMap::new(),
            bob: Bob::default(),
        }
    }
}

impl SceneConfig {
    pub fn from_json_str(s: &str) -> ClawResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| ClawError::config(format!("parse scene config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> ClawResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read scene config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> ClawResult<()> {
        self.grab.validate()?;
        for spec in self.motions.values() {
            spec.validate()?;
        }
        self.particles.validate()?;
        if self.in_view.contains_key(&RevealSection::Hero) {
            return Err(ClawError::validation(
                "in_view.hero: the hero is revealed on mount, not on scroll",
            ));
        }
        self.bob.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let cfg = SceneConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, SceneConfig::default());
        assert_eq!(cfg.particles.count, 20);
        assert_eq!(cfg.grab.cycle_interval_ms, 4000);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = SceneConfig::from_json_str(
            r#"{ "grab": { "grab_hold_ms": 900 }, "viewport": { "width": 320, "height": 240 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.grab.grab_hold_ms, 900);
        assert_eq!(cfg.grab.cycle_interval_ms, 4000);
        assert_eq!(cfg.viewport, Some(Viewport::new(320.0, 240.0)));
    }

    #[test]
    fn unknown_fields_are_config_errors() {
        let err = SceneConfig::from_json_str(r#"{ "speed": 2 }"#).unwrap_err();
        assert!(matches!(err, ClawError::Config(_)));
    }

    #[test]
    fn invalid_values_are_validation_errors() {
        let err = SceneConfig::from_json_str(
            r#"{ "grab": { "cycle_interval_ms": 1000, "grab_hold_ms": 1000 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ClawError::Validation(_)));
    }

    #[test]
    fn motion_overrides_parse_by_element_name() {
        let cfg = SceneConfig::from_json_str(
            r#"{ "motions": { "left_arm": {
                "rest": { "rotate_deg": -10 },
                "active": { "rotate_deg": -40 },
                "delay_ms": 300,
                "transition_ms": 400
            } } }"#,
        )
        .unwrap();
        let spec = &cfg.motions[&ElementKind::LeftArm];
        assert_eq!(spec.delay_ms, 300);
        assert_eq!(spec.ease, crate::animation::ease::Ease::Linear);
    }

    #[test]
    fn in_view_parses_section_names() {
        let cfg = SceneConfig::from_json_str(r#"{ "in_view": { "stats": 2500 } }"#).unwrap();
        assert_eq!(cfg.in_view[&RevealSection::Stats], Millis(2500));
        let err = SceneConfig::from_json_str(r#"{ "in_view": { "hero": 0 } }"#).unwrap_err();
        assert!(matches!(err, ClawError::Validation(_)));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = SceneConfig::from_path(Path::new("does/not/exist.json")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));
    }
}
