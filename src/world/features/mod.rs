//! Feature stages layered on top of the stitched geometry

pub(super) mod biomes;
pub(super) mod heights;
pub(super) mod moisture;
pub(super) mod rivers;
