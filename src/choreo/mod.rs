pub(crate) mod element;
pub(crate) mod grab_cycle;
pub(crate) mod rig;
