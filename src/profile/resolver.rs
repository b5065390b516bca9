use crate::conf::ExtensionConf;
use crate::error::{PolicyViolation, ResolveError};
use crate::profile::alt_name::{merge_subject_alt_name, SubjectToAltNameRule};
use crate::profile::controls::{ExtensionControl, ExtensionKind};
use crate::profile::hook::ExtensionHook;
use crate::profile::policy_value::PolicyValue;
use crate::profile::validity::Validity;
use crate::profile::{gmt0015, qc_statements, subject_dir_attrs};
use bytes::Bytes;
use certprofile_x509::certificate::extensions::{Extension, Extensions, PrivateKeyUsagePeriod};
use certprofile_x509::certificate::Name;
use std::any::Any;
use time::OffsetDateTime;
use tracing::debug;
use yasna::models::ObjectIdentifier;

/// Issuer context handed through to the extension hook untouched.
pub type CaInfo = dyn Any + Send + Sync;

/// Per-request input of the resolver.
pub struct ExtensionRequest<'a> {
    pub requested_subject: &'a Name,
    /// Subject after granting, may differ from the requested one.
    pub granted_subject: &'a Name,
    pub requested_extensions: &'a Extensions,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
    pub ca_info: Option<&'a CaInfo>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionValue {
    pub critical: bool,
    /// DER of the extension value, without the OCTET STRING wrapper.
    pub value: Bytes,
}

/// Resolved extensions in the order they were resolved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtensionValues(Vec<(ObjectIdentifier, ExtensionValue)>);

impl ExtensionValues {
    pub fn get(&self, oid: &ObjectIdentifier) -> Option<&ExtensionValue> {
        self.0.iter().find(|(id, _)| id == oid).map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ObjectIdentifier, ExtensionValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_extensions(self) -> Vec<Extension> {
        self.0
            .into_iter()
            .map(|(oid, value)| Extension::new(oid, value.critical, value.value.to_vec()))
            .collect()
    }
}

/// One declared extension, compiled.
#[derive(Clone, Debug)]
pub struct CompiledExtension {
    pub control: ExtensionControl,
    pub kind: ExtensionKind,
    pub policy: PolicyValue,
    pub conf: ExtensionConf,
}

fn private_key_usage_period(validity: &Validity, request: &ExtensionRequest<'_>) -> Bytes {
    let end = validity
        .add_to(request.not_before)
        .map_or(request.not_after, |end| end.min(request.not_after));
    Bytes::from(yasna::encode_der(&PrivateKeyUsagePeriod {
        not_before: Some(request.not_before),
        not_after: Some(end),
    }))
}

fn resolve_one(
    extension: &CompiledExtension,
    rules: &[SubjectToAltNameRule],
    hook: &dyn ExtensionHook,
    request: &ExtensionRequest<'_>,
) -> Result<Option<ExtensionValue>, ResolveError> {
    use ExtensionKind as K;
    let control = &extension.control;
    let requested = if control.permitted_in_request {
        request.requested_extensions.get(&control.oid)
    } else {
        None
    };
    let value = match (extension.kind, &extension.policy) {
        (K::Custom, PolicyValue::Custom) => return Ok(hook.resolve(control, &extension.conf, request)?),
        (kind, PolicyValue::Constant(value)) if kind != K::Custom && kind != K::CaOwned => Some(value.clone()),
        (K::PrivateKeyUsagePeriod, PolicyValue::PrivateKeyUsagePeriod(validity)) =>
            Some(private_key_usage_period(validity, request)),
        (K::SubjectAltName, PolicyValue::SubjectAltName(modes)) => merge_subject_alt_name(
            modes,
            rules,
            request.granted_subject,
            request.requested_subject,
            requested,
        )?.map(|names| Bytes::from(yasna::encode_der(&names))),
        (K::SubjectDirectoryAttributes, PolicyValue::SubjectDirectoryAttributes(types)) =>
            subject_dir_attrs::resolve(types, requested)?.map(Bytes::from),
        (K::Admission, PolicyValue::Admission(option)) =>
            Some(Bytes::from(option.resolve(request.requested_subject)?)),
        (K::QcStatements, PolicyValue::QcStatements(options)) =>
            Some(Bytes::from(qc_statements::resolve(options, requested)?)),
        (K::BiometricInfo, PolicyValue::BiometricInfo(option)) => option.resolve(requested)?.map(Bytes::from),
        (K::IdentityCode, PolicyValue::IdentityCode) =>
            gmt0015::resolve_identity_code(requested, request.requested_subject)?.map(Bytes::from),
        (K::Gmt0015Code, PolicyValue::Gmt0015Code) =>
            gmt0015::resolve_code(&control.oid, requested, request.requested_subject)?.map(Bytes::from),
        (K::Syntax, PolicyValue::Syntax(syntax)) =>
            Some(Bytes::from(syntax.resolve(&control.name(), requested.map(Extension::value))?)),
        (kind, policy) => return Err(ResolveError::Invariant(format!(
            "extension {} of kind {:?} was compiled into {:?}",
            control.name(),
            kind,
            policy
        ))),
    };
    Ok(value.map(|value| ExtensionValue { critical: control.critical, value }))
}

/// Resolves `extensions`, which must already be in processing order and free
/// of CA-owned entries. Every required or hook-handled extension left
/// unresolved fails the request.
pub(crate) fn resolve(
    extensions: &[&CompiledExtension],
    rules: &[SubjectToAltNameRule],
    hook: &dyn ExtensionHook,
    request: &ExtensionRequest<'_>,
) -> Result<ExtensionValues, ResolveError> {
    if request.not_after < request.not_before {
        return Err(PolicyViolation::InvalidArgument {
            argument: "not_after".to_string(),
            details: format!("{} is before notBefore {}", request.not_after, request.not_before),
        }.into());
    }

    let mut resolved = Vec::with_capacity(extensions.len());
    let mut unresolved = Vec::new();
    for extension in extensions {
        match resolve_one(extension, rules, hook, request)? {
            Some(value) => {
                debug!(extension = %extension.control.name(), critical = value.critical, "resolved extension");
                resolved.push((extension.control.oid.clone(), value));
            },
            None => unresolved.push(*extension),
        }
    }

    let unprocessable: Vec<String> = unresolved
        .iter()
        .filter(|extension| extension.control.required || extension.kind == ExtensionKind::Custom)
        .map(|extension| extension.control.name())
        .collect();
    if !unprocessable.is_empty() {
        return Err(PolicyViolation::UnprocessableExtension { extensions: unprocessable }.into());
    }
    Ok(ExtensionValues(resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::PrivateKeyUsagePeriodConf;
    use crate::profile::hook::NoExtensionHook;
    use time::macros::datetime;

    fn compiled(conf: ExtensionConf) -> CompiledExtension {
        let control = ExtensionControl::compile(&conf).unwrap();
        let kind = ExtensionKind::of_declaration(&control.oid, &conf).unwrap().unwrap_or(ExtensionKind::Custom);
        let policy = PolicyValue::compile(kind, &control, &conf).unwrap();
        CompiledExtension { control, kind, policy, conf }
    }

    fn request<'a>(subject: &'a Name, extensions: &'a Extensions) -> ExtensionRequest<'a> {
        ExtensionRequest {
            requested_subject: subject,
            granted_subject: subject,
            requested_extensions: extensions,
            not_before: datetime!(2024-01-01 0:00 UTC),
            not_after: datetime!(2024-04-10 0:00 UTC),
            ca_info: None,
        }
    }

    fn pkup(validity: &str) -> CompiledExtension {
        let mut conf = ExtensionConf::new("privateKeyUsagePeriod");
        conf.private_key_usage_period = Some(PrivateKeyUsagePeriodConf { validity: validity.to_string() });
        compiled(conf)
    }

    #[test]
    fn private_key_usage_period_should_end_with_validity () {
        let (subject, extensions) = (Name::default(), Extensions::default());
        let extension = pkup("30d");
        let values = resolve(&[&extension], &[], &NoExtensionHook, &request(&subject, &extensions)).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values.iter().next().unwrap().1.value.to_vec(), vec!(
            0x30,0x22,                                                  // PrivateKeyUsagePeriod
            0x80,0x0f,                                                  // [0] notBefore
            0x32,0x30,0x32,0x34,0x30,0x31,0x30,0x31,                    // 20240101
            0x30,0x30,0x30,0x30,0x30,0x30,0x5a,                         // 000000Z
            0x81,0x0f,                                                  // [1] notAfter
            0x32,0x30,0x32,0x34,0x30,0x31,0x33,0x31,                    // 20240131
            0x30,0x30,0x30,0x30,0x30,0x30,0x5a,                         // 000000Z
        ));
    }

    #[test]
    fn not_after_before_not_before_should_be_rejected () {
        let (subject, extensions) = (Name::default(), Extensions::default());
        let mut request = request(&subject, &extensions);
        request.not_after = datetime!(2023-12-31 0:00 UTC);
        assert!(matches!(
            resolve(&[], &[], &NoExtensionHook, &request),
            Err(ResolveError::Violation(PolicyViolation::InvalidArgument { .. }))
        ));
    }

    #[test]
    fn mismatched_policy_should_be_an_invariant_error () {
        let (subject, extensions) = (Name::default(), Extensions::default());
        let mut extension = pkup("30d");
        extension.policy = PolicyValue::IdentityCode;
        assert!(matches!(
            resolve(&[&extension], &[], &NoExtensionHook, &request(&subject, &extensions)),
            Err(ResolveError::Invariant(_))
        ));
    }

    #[test]
    fn unresolved_required_extension_should_be_named () {
        let (subject, extensions) = (Name::default(), Extensions::default());
        let mut conf = ExtensionConf::new("identityCode");
        conf.required = true;
        let extension = compiled(conf);
        assert_eq!(
            resolve(&[&extension], &[], &NoExtensionHook, &request(&subject, &extensions)),
            Err(ResolveError::Violation(PolicyViolation::UnprocessableExtension {
                extensions: vec!("identityCode".to_string()),
            }))
        );
    }

    #[test]
    fn request_extension_should_be_ignored_unless_permitted () {
        let subject = Name::default();
        let extensions = Extensions(vec!(Extension::new(
            certprofile_x509::certificate::oids::oid(certprofile_x509::certificate::oids::OID_GMT_0015_TAXATION_NUMBER),
            false,
            vec!(0x13,0x01,0x41),
        )));
        let mut conf = ExtensionConf::new("taxationNumber");
        let extension = compiled(conf.clone());
        assert!(resolve(&[&extension], &[], &NoExtensionHook, &request(&subject, &extensions)).unwrap().is_empty());
        conf.permitted_in_request = true;
        let extension = compiled(conf);
        let values = resolve(&[&extension], &[], &NoExtensionHook, &request(&subject, &extensions)).unwrap();
        assert_eq!(values.into_extensions()[0].value(), &[0x13,0x01,0x41]);
    }
}
