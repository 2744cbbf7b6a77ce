use std::sync::Arc;

use crate::auth::JwtConfig;
use crate::store::CourseStore;

/// Shared handler state; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CourseStore>,
    pub jwt: Arc<JwtConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn CourseStore>, jwt: JwtConfig) -> Self {
        Self {
            store,
            jwt: Arc::new(jwt),
        }
    }
}
