mod yaml_prefix_source;

pub use yaml_prefix_source::YamlPrefixSource;
