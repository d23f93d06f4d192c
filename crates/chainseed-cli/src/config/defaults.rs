pub struct DefaultsConfig {
    pub max_attempts: usize,
    pub replicas: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1000,
            replicas: 1,
        }
    }
}
