/// The `ftl` module writes page templates into the theme layout
pub mod ftl;

/// The `stack` module writes the Maven descriptor and theme manifest
pub mod stack;
