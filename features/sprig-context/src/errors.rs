use std::fmt::Display;

use sprig_config::ConfigError;
use thiserror::Error;

use crate::{descriptor::Capability, types::DynError};

/// Errors of the component registry - a name could not be turned into a component
#[derive(Error, Debug)]
pub enum RegistryError {
    /// No descriptor is registered under the name
    #[error("No component named '{0}' is registered")]
    MissingDescriptor(String),
    /// The name is taken and overriding descriptors is disabled
    #[error("A component named '{0}' is already registered and overriding is disabled")]
    DuplicateDescriptor(String),
    /// Abstract descriptors only serve as parents
    #[error("Component '{0}' is abstract and can not be instantiated")]
    AbstractDescriptor(String),
    #[error("Parent '{parent}' of component '{name}' is not registered")]
    MissingParent { name: String, parent: String },
    #[error("The parents of component '{name}' form a cycle: {chain:?}")]
    CircularParent { name: String, chain: Vec<String> },
    /// The component was requested again while it was being created
    #[error("Component '{0}' is currently in creation - is there a circular reference?")]
    CircularReference(String),
    #[error("Component '{name}' is not declared as {capability}")]
    CapabilityMismatch { name: String, capability: Capability },
    /// The supplier of the component failed
    #[error("Creating component '{name}' failed - error: {error}")]
    CreationFailed {
        name: String,
        #[source]
        error: DynError,
    },
    /// A lifecycle processor failed while processing the component
    #[error("Lifecycle processor '{processor}' failed on component '{name}' - error: {error}")]
    LifecycleFailed {
        name: String,
        processor: String,
        #[source]
        error: DynError,
    },
    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}

/// Errors while bootstrapping the container
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A processor callback failed, the error is the one the callback returned
    #[error("Processor '{processor}' failed during {phase} - error: {error}")]
    ProcessorFailed {
        phase: Phase,
        processor: String,
        #[source]
        error: DynError,
    },
}

/// Bootstrap phase in which a processor callback ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Structural mutation of the registry
    RegistryProcessing,
    /// Factory level configuration
    FactoryProcessing,
}
impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::RegistryProcessing => f.write_str("registry processing"),
            Phase::FactoryProcessing => f.write_str("factory processing"),
        }
    }
}
