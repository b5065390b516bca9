use crate::conf::ExtensionConf;
use crate::error::{ConfigError, PolicyViolation};
use crate::profile::controls::ExtensionControl;
use crate::profile::resolver::{ExtensionRequest, ExtensionValue};

/// Resolves the profile-specific extensions the built-in kinds do not cover.
///
/// `claims` runs while the profile compiles: an extension nobody claims fails
/// compilation. `resolve` runs per request for every claimed extension still
/// unresolved; `None` leaves it unresolved.
pub trait ExtensionHook: Send + Sync {
    fn claims(&self, control: &ExtensionControl, conf: &ExtensionConf) -> Result<bool, ConfigError>;

    fn resolve(
        &self,
        control: &ExtensionControl,
        conf: &ExtensionConf,
        request: &ExtensionRequest<'_>,
    ) -> Result<Option<ExtensionValue>, PolicyViolation>;
}

/// Claims nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoExtensionHook;

impl ExtensionHook for NoExtensionHook {
    fn claims(&self, _control: &ExtensionControl, _conf: &ExtensionConf) -> Result<bool, ConfigError> {
        Ok(false)
    }

    fn resolve(
        &self,
        _control: &ExtensionControl,
        _conf: &ExtensionConf,
        _request: &ExtensionRequest<'_>,
    ) -> Result<Option<ExtensionValue>, PolicyViolation> {
        Ok(None)
    }
}
