pub(crate) mod ease;
pub(crate) mod keyframes;
pub(crate) mod pose;
pub(crate) mod tween;
