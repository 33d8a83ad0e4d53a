pub(crate) mod bob;
pub(crate) mod reveal;
