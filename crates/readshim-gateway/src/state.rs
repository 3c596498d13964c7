use std::sync::Arc;

use readshim_core::Controller;

use crate::resolver::Resolver;

#[derive(Clone)]
pub struct AppState {
    resolver: Resolver,
}

impl AppState {
    pub fn new(controller: Arc<dyn Controller>) -> Self {
        Self {
            resolver: Resolver::new(controller),
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }
}
