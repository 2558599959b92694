pub(crate) mod ease;
pub(crate) mod tree;
pub(crate) mod variant;
