//! # sentinel-gateway
//!
//! Query/command interface to the GitOps deployment controller.
//!
//! [`DeploymentGateway`] is the seam the scheduler depends on;
//! [`ArgoCdGateway`] implements it against the Argo CD REST API. Raw
//! health/sync strings are mapped into closed enums in [`payload`] so the
//! reconciler never sees them.

pub mod argocd;
pub mod error;
pub mod payload;

pub use argocd::ArgoCdGateway;
pub use error::GatewayError;

use sentinel_core::{AppName, ApplicationObservation, StatusSnapshot};

/// Blocking request/response contract with the deployment controller.
pub trait DeploymentGateway {
    /// Every application the controller manages, in controller order.
    fn list_applications(&self) -> Result<Vec<ApplicationObservation>, GatewayError>;

    /// Ask the controller to re-evaluate an application before it is read.
    fn refresh_application(&self, app: &AppName) -> Result<(), GatewayError>;

    /// Ask the controller to sync an application to its desired state.
    fn request_sync(&self, app: &AppName) -> Result<(), GatewayError>;

    /// Current health, sync state and revision of one application.
    fn application_status(&self, app: &AppName) -> Result<StatusSnapshot, GatewayError>;
}

impl<G: DeploymentGateway + ?Sized> DeploymentGateway for Box<G> {
    fn list_applications(&self) -> Result<Vec<ApplicationObservation>, GatewayError> {
        (**self).list_applications()
    }

    fn refresh_application(&self, app: &AppName) -> Result<(), GatewayError> {
        (**self).refresh_application(app)
    }

    fn request_sync(&self, app: &AppName) -> Result<(), GatewayError> {
        (**self).request_sync(app)
    }

    fn application_status(&self, app: &AppName) -> Result<StatusSnapshot, GatewayError> {
        (**self).application_status(app)
    }
}
