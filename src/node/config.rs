//! Node configuration. Higher layers construct this.

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub app: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self { app: "synapse".to_string() }
    }
}

impl NodeConfig {
    pub fn new(app: impl Into<String>) -> Self {
        Self { app: app.into() }
    }
}
