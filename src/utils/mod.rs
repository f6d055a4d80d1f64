/// Recover a JSON object from free-form generation output.
pub mod extract;
/// Coerce heterogeneous list fields into string lists.
pub mod normalize;
/// TOML-based configuration.
pub mod toml_config;
