pub mod validity;
pub mod keys;
pub mod controls;
pub mod subject;
pub mod alt_name;
pub mod qc_statements;
pub mod biometric;
pub mod gmt0015;
pub mod admission;
pub mod subject_dir_attrs;
pub mod syntax;
pub mod policy_value;
pub mod hook;
pub mod ca_controls;
pub mod resolver;

pub use alt_name::{GeneralNameMode, GeneralNameModes, SubjectToAltNameRule};
pub use ca_controls::CaControls;
pub use controls::{ExtensionControl, ExtensionKind};
pub use hook::{ExtensionHook, NoExtensionHook};
pub use keys::{KeyAlgorithmControl, KeypairGenControl};
pub use policy_value::PolicyValue;
pub use resolver::{CaInfo, CompiledExtension, ExtensionRequest, ExtensionValue, ExtensionValues};
pub use subject::{RdnControl, SubjectControl};
pub use validity::{NotBeforeOption, Validity};

use crate::conf::{CertLevel, ProfileConf};
use crate::error::{ConfigError, PolicyViolation, ResolveError};
use certprofile_x509::certificate::extensions::BasicConstraints;
use certprofile_x509::certificate::oids::{self, OID_PKCS9_EMAIL_ADDRESS};
use certprofile_x509::certificate::{GeneralNameTag, Name, SignatureAlgorithm, SubjectPublicKeyInfo, X509Version};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{error, info, info_span, warn, Span};
use yasna::models::ObjectIdentifier;

/// Mutable half of the profile. Only `Profile::compile_with_hook` uses it;
/// `build` runs the cross-checks and freezes the result.
struct ProfileBuilder {
    name: Option<String>,
    version: X509Version,
    validity: Option<Validity>,
    not_before: NotBeforeOption,
    cert_level: Option<CertLevel>,
    max_size: Option<u32>,
    ra_only: bool,
    serial_number_in_req: bool,
    signature_algorithms: Vec<SignatureAlgorithm>,
    keypair_generation: KeypairGenControl,
    key_algorithms: Vec<KeyAlgorithmControl>,
    subject: SubjectControl,
    rules: Vec<SubjectToAltNameRule>,
    extensions: Vec<CompiledExtension>,
    ca_controls: CaControls,
    hook: Arc<dyn ExtensionHook>,
}

impl ProfileBuilder {
    fn name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    fn version(mut self, version: X509Version) -> Self {
        self.version = version;
        self
    }

    fn validity(mut self, validity: Validity) -> Self {
        self.validity = Some(validity);
        self
    }

    fn not_before(mut self, not_before: NotBeforeOption) -> Self {
        self.not_before = not_before;
        self
    }

    fn cert_level(mut self, cert_level: Option<CertLevel>) -> Self {
        self.cert_level = cert_level;
        self
    }

    fn limits(mut self, max_size: Option<u32>, ra_only: bool, serial_number_in_req: bool) -> Self {
        self.max_size = max_size;
        self.ra_only = ra_only;
        self.serial_number_in_req = serial_number_in_req;
        self
    }

    fn signature_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        if !self.signature_algorithms.contains(&algorithm) {
            self.signature_algorithms.push(algorithm);
        }
        self
    }

    fn keypair_generation(mut self, keypair_generation: KeypairGenControl) -> Self {
        self.keypair_generation = keypair_generation;
        self
    }

    fn key_algorithm(mut self, control: KeyAlgorithmControl) -> Self {
        self.key_algorithms.push(control);
        self
    }

    fn subject(mut self, subject: SubjectControl) -> Self {
        self.subject = subject;
        self
    }

    fn rule(mut self, rule: SubjectToAltNameRule) -> Self {
        self.rules.push(rule);
        self
    }

    fn hook(mut self, hook: Arc<dyn ExtensionHook>) -> Self {
        self.hook = hook;
        self
    }

    fn extension(mut self, extension: CompiledExtension) -> Result<Self, ConfigError> {
        if self.extensions.iter().any(|existing| existing.control.oid == extension.control.oid) {
            return Err(ConfigError::DuplicateExtension(extension.control.name()));
        }
        if extension.kind.is_ca_owned() {
            self.ca_controls.absorb(&extension.control, &extension.conf)?;
        }
        self.extensions.push(extension);
        Ok(self)
    }

    fn subject_alt_name_modes(&self) -> Option<&GeneralNameModes> {
        self.extensions.iter().find_map(|extension| match &extension.policy {
            PolicyValue::SubjectAltName(modes) => Some(modes),
            _ => None,
        })
    }

    /// emailAddress in the subject must be mirrored as rfc822Name, and every
    /// mirroring rule must land in a declared subjectAltName that accepts it.
    fn check_alt_name_coupling(&self) -> Result<(), ConfigError> {
        let email = oids::oid(OID_PKCS9_EMAIL_ADDRESS);
        if self.subject.control(&email).is_some()
            && !self.rules.iter().any(|rule| rule.source == email && rule.target == GeneralNameTag::Rfc822Name) {
            return Err(ConfigError::MissingAltNameCoupling {
                attribute: oids::display_name(&email),
                expected: GeneralNameTag::Rfc822Name.to_string(),
            });
        }
        let modes = match self.subject_alt_name_modes() {
            Some(modes) => modes,
            None => match self.rules.first() {
                Some(rule) => return Err(ConfigError::MissingAltNameCoupling {
                    attribute: oids::display_name(&rule.source),
                    expected: "a declared subjectAltName extension".to_string(),
                }),
                None => return Ok(()),
            },
        };
        for rule in self.rules.iter() {
            if !alt_name::has_tag(modes, rule.target) {
                return Err(ConfigError::InvalidAltNameTarget {
                    attribute: oids::display_name(&rule.source),
                    target: rule.target.to_string(),
                    details: "not among the general names subjectAltName accepts".to_string(),
                });
            }
        }
        Ok(())
    }

    fn build(mut self) -> Result<Profile, ConfigError> {
        let validity = self.validity.ok_or_else(|| ConfigError::Missing("validity".to_string()))?;
        let cert_level = self.cert_level.ok_or_else(|| ConfigError::Missing("cert_level".to_string()))?;
        self.check_alt_name_coupling()?;
        self.extensions.sort_by_key(|extension| extension.kind);

        let span = info_span!("certprofile", name = self.name.as_deref().unwrap_or("-"));
        Ok(Profile {
            name: self.name,
            span,
            version: self.version,
            validity,
            not_before: self.not_before,
            cert_level,
            max_size: self.max_size,
            ra_only: self.ra_only,
            serial_number_in_req: self.serial_number_in_req,
            signature_algorithms: self.signature_algorithms,
            keypair_generation: self.keypair_generation,
            key_algorithms: self.key_algorithms,
            subject: self.subject,
            rules: self.rules,
            extensions: self.extensions,
            ca_controls: self.ca_controls,
            hook: self.hook,
        })
    }
}

impl Default for ProfileBuilder {
    fn default() -> Self {
        ProfileBuilder {
            name: None,
            version: X509Version::default(),
            validity: None,
            not_before: NotBeforeOption::default(),
            cert_level: None,
            max_size: None,
            ra_only: false,
            serial_number_in_req: false,
            signature_algorithms: Vec::new(),
            keypair_generation: KeypairGenControl::default(),
            key_algorithms: Vec::new(),
            subject: SubjectControl::default(),
            rules: Vec::new(),
            extensions: Vec::new(),
            ca_controls: CaControls::default(),
            hook: Arc::new(NoExtensionHook),
        }
    }
}

/// A compiled certificate profile. Immutable once compiled and safe to share
/// between any number of concurrent requests; reloading means compiling a new
/// one.
pub struct Profile {
    name: Option<String>,
    span: Span,
    version: X509Version,
    validity: Validity,
    not_before: NotBeforeOption,
    cert_level: CertLevel,
    max_size: Option<u32>,
    ra_only: bool,
    serial_number_in_req: bool,
    signature_algorithms: Vec<SignatureAlgorithm>,
    keypair_generation: KeypairGenControl,
    key_algorithms: Vec<KeyAlgorithmControl>,
    subject: SubjectControl,
    rules: Vec<SubjectToAltNameRule>,
    /// In processing order.
    extensions: Vec<CompiledExtension>,
    ca_controls: CaControls,
    hook: Arc<dyn ExtensionHook>,
}

impl Profile {
    fn builder() -> ProfileBuilder {
        ProfileBuilder::default()
    }

    /// Compiles a profile whose extensions all have built-in kinds.
    pub fn compile(conf: &ProfileConf) -> Result<Self, ConfigError> {
        Profile::compile_with_hook(conf, Arc::new(NoExtensionHook))
    }

    /// Compiles a profile, handing every extension without a built-in kind
    /// to `hook`. Fails on the first configuration error; nothing of a failed
    /// compilation is kept.
    pub fn compile_with_hook(conf: &ProfileConf, hook: Arc<dyn ExtensionHook>) -> Result<Self, ConfigError> {
        let version = match &conf.version {
            Some(text) => text.parse::<X509Version>().map_err(|details| ConfigError::InvalidValue {
                field: "version".to_string(),
                value: text.clone(),
                details,
            })?,
            None => X509Version::default(),
        };
        let mut builder = Profile::builder()
            .name(conf.name.clone())
            .version(version)
            .validity(conf.validity.parse::<Validity>()?)
            .not_before(conf.not_before_time.parse::<NotBeforeOption>()?)
            .cert_level(conf.cert_level)
            .limits(conf.max_size, conf.ra_only, conf.serial_number_in_req)
            .keypair_generation(KeypairGenControl::compile(conf.keypair_generation.as_ref())?)
            .subject(SubjectControl::compile(&conf.subject)?)
            .hook(hook.clone());

        for name in conf.signature_algorithms.iter() {
            let algorithm = name.parse::<SignatureAlgorithm>().map_err(|details| ConfigError::InvalidValue {
                field: "signature_algorithms".to_string(),
                value: name.clone(),
                details,
            })?;
            builder = builder.signature_algorithm(algorithm);
        }
        for key_algorithm in conf.key_algorithms.iter() {
            builder = builder.key_algorithm(KeyAlgorithmControl::compile(key_algorithm)?);
        }
        for rule in conf.subject_to_subject_alt_names.iter() {
            builder = builder.rule(SubjectToAltNameRule::compile(rule)?);
        }

        let mut unclaimed = Vec::new();
        for extension_conf in conf.extensions.iter() {
            let control = ExtensionControl::compile(extension_conf)?;
            let kind = match ExtensionKind::of_declaration(&control.oid, extension_conf)? {
                Some(kind) => kind,
                None if hook.claims(&control, extension_conf)? => ExtensionKind::Custom,
                None => {
                    unclaimed.push(control.name());
                    continue;
                },
            };
            let policy = PolicyValue::compile(kind, &control, extension_conf)?;
            builder = builder.extension(CompiledExtension { control, kind, policy, conf: extension_conf.clone() })?;
        }
        if !unclaimed.is_empty() {
            return Err(ConfigError::UnprocessableExtension { extensions: unclaimed });
        }

        let profile = builder.build()?;
        info!(
            parent: &profile.span,
            extensions = profile.extensions.len(),
            subject_attributes = profile.subject.controls.len(),
            "compiled profile"
        );
        Ok(profile)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn version(&self) -> X509Version {
        self.version
    }

    pub fn validity(&self) -> &Validity {
        &self.validity
    }

    pub fn cert_level(&self) -> CertLevel {
        self.cert_level
    }

    pub fn max_size(&self) -> Option<u32> {
        self.max_size
    }

    pub fn ra_only(&self) -> bool {
        self.ra_only
    }

    pub fn serial_number_in_req(&self) -> bool {
        self.serial_number_in_req
    }

    pub fn signature_algorithms(&self) -> &[SignatureAlgorithm] {
        &self.signature_algorithms
    }

    pub fn keypair_generation(&self) -> &KeypairGenControl {
        &self.keypair_generation
    }

    pub fn key_algorithms(&self) -> &[KeyAlgorithmControl] {
        &self.key_algorithms
    }

    pub fn subject_control(&self) -> &SubjectControl {
        &self.subject
    }

    pub fn subject_to_alt_name_rules(&self) -> &[SubjectToAltNameRule] {
        &self.rules
    }

    pub fn ca_controls(&self) -> &CaControls {
        &self.ca_controls
    }

    /// BasicConstraints the CA writes into certificates of this profile.
    pub fn basic_constraints(&self) -> BasicConstraints {
        self.ca_controls.basic_constraints(self.cert_level)
    }

    /// Declared extensions, CA-owned ones included, in processing order.
    pub fn extension_controls(&self) -> impl Iterator<Item = &ExtensionControl> {
        self.extensions.iter().map(|extension| &extension.control)
    }

    pub fn extension_control(&self, oid: &ObjectIdentifier) -> Option<&ExtensionControl> {
        self.extension_controls().find(|control| &control.oid == oid)
    }

    pub fn not_before(&self, requested: Option<OffsetDateTime>, now: OffsetDateTime) -> OffsetDateTime {
        self.not_before.not_before(requested, now)
    }

    /// notAfter for a certificate starting at `not_before`, `None` on
    /// overflow.
    pub fn not_after(&self, not_before: OffsetDateTime) -> Option<OffsetDateTime> {
        self.validity.add_to(not_before)
    }

    fn mirrored_types(&self) -> Vec<ObjectIdentifier> {
        self.rules.iter().map(|rule| rule.source.clone()).collect()
    }

    pub fn validate_subject(&self, requested: &Name) -> Result<(), PolicyViolation> {
        let _entered = self.span.enter();
        self.subject.validate(requested, &self.mirrored_types()).map_err(|violation| {
            warn!(subject = %requested, %violation, "rejected subject");
            violation
        })
    }

    /// Validates `requested` and builds the subject the certificate is
    /// issued with.
    pub fn grant_subject(&self, requested: &Name) -> Result<Name, PolicyViolation> {
        self.validate_subject(requested)?;
        let _entered = self.span.enter();
        self.subject.grant(requested).map_err(|violation| {
            warn!(subject = %requested, %violation, "cannot grant subject");
            violation
        })
    }

    pub fn check_public_key(&self, spki: &SubjectPublicKeyInfo) -> Result<(), PolicyViolation> {
        let _entered = self.span.enter();
        keys::check_public_key(&self.key_algorithms, spki).map_err(|violation| {
            warn!(%violation, "rejected public key");
            violation
        })
    }

    /// Resolves every declared extension the profile emits.
    pub fn resolve_extensions(&self, request: &ExtensionRequest<'_>) -> Result<ExtensionValues, ResolveError> {
        let working: Vec<&CompiledExtension> = self.extensions
            .iter()
            .filter(|extension| !extension.kind.is_ca_owned())
            .collect();
        self.resolve_working_set(&working, request)
    }

    /// Resolves the declared extensions named in `ids`. CA-owned ones are
    /// skipped; an identifier the profile does not declare is an invariant
    /// error.
    pub fn resolve_extensions_for(
        &self,
        ids: &[ObjectIdentifier],
        request: &ExtensionRequest<'_>,
    ) -> Result<ExtensionValues, ResolveError> {
        if let Some(unknown) = ids.iter().find(|oid| self.extension_control(oid).is_none()) {
            return Err(ResolveError::Invariant(format!(
                "extension {} is not declared by the profile",
                oids::display_name(unknown)
            )));
        }
        let working: Vec<&CompiledExtension> = self.extensions
            .iter()
            .filter(|extension| !extension.kind.is_ca_owned() && ids.contains(&extension.control.oid))
            .collect();
        self.resolve_working_set(&working, request)
    }

    fn resolve_working_set(
        &self,
        working: &[&CompiledExtension],
        request: &ExtensionRequest<'_>,
    ) -> Result<ExtensionValues, ResolveError> {
        let _entered = self.span.enter();
        match resolver::resolve(working, &self.rules, self.hook.as_ref(), request) {
            Ok(values) => {
                info!(declared = working.len(), resolved = values.len(), "resolved extensions");
                Ok(values)
            },
            Err(ResolveError::Violation(violation)) => {
                warn!(%violation, "rejected request");
                Err(ResolveError::Violation(violation))
            },
            Err(err) => {
                error!(error = %err, "extension resolution failed");
                Err(err)
            },
        }
    }
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("cert_level", &self.cert_level)
            .field("validity", &self.validity)
            .field("extensions", &self.extensions.iter().map(|e| e.control.name()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::ExtensionConf;
    use bytes::Bytes;
    use certprofile_x509::certificate::extensions::Extensions;
    use certprofile_x509::certificate::oids::*;
    use time::macros::datetime;

    fn conf(json: serde_json::Value) -> ProfileConf {
        serde_json::from_value(json).unwrap()
    }

    fn request<'a>(subject: &'a Name, extensions: &'a Extensions) -> ExtensionRequest<'a> {
        ExtensionRequest {
            requested_subject: subject,
            granted_subject: subject,
            requested_extensions: extensions,
            not_before: datetime!(2024-01-01 0:00 UTC),
            not_after: datetime!(2025-01-01 0:00 UTC),
            ca_info: None,
        }
    }

    struct NullHook;

    impl ExtensionHook for NullHook {
        fn claims(&self, control: &ExtensionControl, _conf: &ExtensionConf) -> Result<bool, ConfigError> {
            Ok(control.oid == oid(&[1,2,3,4]))
        }

        fn resolve(
            &self,
            control: &ExtensionControl,
            _conf: &ExtensionConf,
            _request: &ExtensionRequest<'_>,
        ) -> Result<Option<ExtensionValue>, PolicyViolation> {
            Ok(Some(ExtensionValue { critical: control.critical, value: Bytes::from_static(&[0x05,0x00]) }))
        }
    }

    #[test]
    fn profile_should_be_shareable_between_threads () {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Profile>();
    }

    #[test]
    fn missing_cert_level_should_fail () {
        let conf = conf(serde_json::json!({ "validity": "1y" }));
        assert_eq!(Profile::compile(&conf).unwrap_err(), ConfigError::Missing("cert_level".to_string()));
    }

    #[test]
    fn duplicate_extension_should_fail () {
        let conf = conf(serde_json::json!({
            "validity": "1y",
            "cert_level": "EndEntity",
            "extensions": [
                { "type": "inhibitAnyPolicy", "inhibit_any_policy": { "skip_certs": 0 } },
                { "type": "2.5.29.54", "inhibit_any_policy": { "skip_certs": 1 } },
            ]
        }));
        assert_eq!(
            Profile::compile(&conf).unwrap_err(),
            ConfigError::DuplicateExtension("inhibitAnyPolicy".to_string())
        );
    }

    #[test]
    fn extensions_should_resolve_in_processing_order () {
        let conf = conf(serde_json::json!({
            "validity": "1y",
            "cert_level": "EndEntity",
            "extensions": [
                { "type": "tlsFeature", "tls_feature": [5] },
                { "type": "keyUsage", "critical": true, "key_usage": [ { "value": "digitalSignature", "required": true } ] },
                { "type": "inhibitAnyPolicy", "inhibit_any_policy": { "skip_certs": 0 } },
            ]
        }));
        let profile = Profile::compile(&conf).unwrap();
        let (subject, extensions) = (Name::default(), Extensions::default());
        let values = profile.resolve_extensions(&request(&subject, &extensions)).unwrap();
        let order: Vec<ObjectIdentifier> = values.iter().map(|(oid, _)| oid.clone()).collect();
        assert_eq!(order, vec!(oid(OID_CE_INHIBIT_ANY_POLICY), oid(OID_PE_TLS_FEATURE)));
        assert_eq!(profile.ca_controls().key_usages.len(), 1);
        assert!(profile.extension_control(&oid(OID_CE_KEY_USAGE)).is_some());
    }

    #[test]
    fn unclaimed_extension_should_fail_compilation () {
        let json = serde_json::json!({
            "validity": "1y",
            "cert_level": "EndEntity",
            "extensions": [ { "type": "1.2.3.4" }, { "type": "1.2.3.5" } ]
        });
        assert_eq!(
            Profile::compile_with_hook(&conf(json), Arc::new(NullHook)).unwrap_err(),
            ConfigError::UnprocessableExtension { extensions: vec!("1.2.3.5".to_string()) }
        );
    }

    #[test]
    fn claimed_extension_should_be_resolved_by_hook () {
        let json = serde_json::json!({
            "validity": "1y",
            "cert_level": "EndEntity",
            "extensions": [ { "type": "1.2.3.4", "critical": true } ]
        });
        let profile = Profile::compile_with_hook(&conf(json), Arc::new(NullHook)).unwrap();
        let (subject, extensions) = (Name::default(), Extensions::default());
        let values = profile.resolve_extensions(&request(&subject, &extensions)).unwrap();
        assert_eq!(
            values.get(&oid(&[1,2,3,4])),
            Some(&ExtensionValue { critical: true, value: Bytes::from_static(&[0x05,0x00]) })
        );
    }

    #[test]
    fn undeclared_identifier_should_be_an_invariant_error () {
        let conf = conf(serde_json::json!({
            "validity": "1y",
            "cert_level": "EndEntity",
            "extensions": [ { "type": "inhibitAnyPolicy", "inhibit_any_policy": { "skip_certs": 0 } } ]
        }));
        let profile = Profile::compile(&conf).unwrap();
        let (subject, extensions) = (Name::default(), Extensions::default());
        let request = request(&subject, &extensions);
        assert!(matches!(
            profile.resolve_extensions_for(&[oid(OID_PE_TLS_FEATURE)], &request),
            Err(ResolveError::Invariant(_))
        ));
        let values = profile.resolve_extensions_for(&[oid(OID_CE_INHIBIT_ANY_POLICY)], &request).unwrap();
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn mirroring_without_subject_alt_name_should_fail () {
        let conf = conf(serde_json::json!({
            "validity": "1y",
            "cert_level": "EndEntity",
            "subject": { "rdns": [ { "type": "CN" } ] },
            "subject_to_subject_alt_names": [ { "source": "CN", "target": "dnsName" } ]
        }));
        assert!(matches!(Profile::compile(&conf), Err(ConfigError::MissingAltNameCoupling { .. })));
    }

    #[test]
    fn mirroring_rules_should_be_kept_with_subject_controls () {
        let conf = conf(serde_json::json!({
            "validity": "1y",
            "cert_level": "EndEntity",
            "subject": { "rdns": [ { "type": "CN" } ] },
            "subject_to_subject_alt_names": [ { "source": "CN", "target": "dnsName" } ],
            "extensions": [ { "type": "subjectAltName", "subject_alt_name": { "modes": [ { "tag": "dnsName" } ] } } ]
        }));
        let profile = Profile::compile(&conf).unwrap();
        assert_eq!(profile.subject_control().controls.len(), 1);
        let rules = profile.subject_to_alt_name_rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].source, ObjectIdentifier::from_slice(OID_AT_COMMON_NAME));
        assert_eq!(rules[0].target, GeneralNameTag::DnsName);
    }

    #[test]
    fn ca_levels_should_get_ca_basic_constraints () {
        let conf = conf(serde_json::json!({
            "validity": "10y",
            "cert_level": "SubCA",
            "extensions": [ { "type": "basicConstraints", "critical": true, "basic_constraints": { "path_len": 0 } } ]
        }));
        let profile = Profile::compile(&conf).unwrap();
        assert_eq!(profile.basic_constraints(), BasicConstraints { ca: true, path_length_constraint: Some(0) });
        let (subject, extensions) = (Name::default(), Extensions::default());
        assert!(profile.resolve_extensions(&request(&subject, &extensions)).unwrap().is_empty());
    }
}
