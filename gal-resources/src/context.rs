use std::sync::Arc;

use gal_core::{Configuration, Execution};

use crate::registration::Registration;
use crate::source::Sources;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LoaderOptions {
    pub strict_suffix: bool,
}

impl LoaderOptions {
    pub fn from_config(config: &Configuration) -> LoaderOptions {
        LoaderOptions {
            strict_suffix: config.strict_suffix(),
        }
    }
}

#[derive(Debug)]
pub struct Context {
    registration: Arc<Registration>,
    sources: Sources,
    execution: Execution,
    options: LoaderOptions,
}

impl Context {
    pub fn new(
        registration: Arc<Registration>,
        sources: Sources,
        execution: Execution,
        options: LoaderOptions,
    ) -> Arc<Context> {
        Arc::new(Context {
            registration,
            sources,
            execution,
            options,
        })
    }

    pub fn registration(&self) -> &Arc<Registration> {
        &self.registration
    }

    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    pub fn execution(&self) -> &Execution {
        &self.execution
    }

    pub fn options(&self) -> LoaderOptions {
        self.options
    }
}
