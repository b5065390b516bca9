use crate::error::PolicyViolation;
use certprofile_x509::certificate::extensions::{Extension, Gmt0015Code, IdentityCode};
use certprofile_x509::certificate::oids::{self, OID_GMT_0015_IDENTITY_CODE};
use certprofile_x509::certificate::Name;
use yasna::BERDecodable;
use yasna::models::ObjectIdentifier;

fn subject_text<'a>(requested: &'a Name, oid: &ObjectIdentifier) -> Result<Option<&'a str>, PolicyViolation> {
    match requested.first_value_of(oid) {
        None => Ok(None),
        Some(value) => value.as_str().map(|text| Some(text.trim())).ok_or_else(|| PolicyViolation::InvalidAttributeValue {
            attribute: oids::display_name(oid),
            value: String::new(),
            details: "not a directory string".to_string(),
        }),
    }
}

/// IdentityCode from the request extension or, failing that, from the
/// `[tag]code` subject attribute. Always written explicitly tagged.
pub fn resolve_identity_code(
    requested_extension: Option<&Extension>,
    requested: &Name,
) -> Result<Option<Vec<u8>>, PolicyViolation> {
    let oid = oids::oid(OID_GMT_0015_IDENTITY_CODE);
    if let Some(extension) = requested_extension {
        let code = IdentityCode::from_der(extension.value()).map_err(|e| PolicyViolation::MalformedRequestExtension {
            extension: oids::display_name(&oid),
            details: e.to_string(),
        })?;
        return Ok(Some(yasna::encode_der(&code)));
    }
    let text = match subject_text(requested, &oid)? {
        Some(text) if !text.is_empty() => text,
        _ => return Ok(None),
    };
    let code = text.parse::<IdentityCode>().map_err(|details| PolicyViolation::InvalidAttributeValue {
        attribute: oids::display_name(&oid),
        value: text.to_string(),
        details,
    })?;
    Ok(Some(yasna::encode_der(&code)))
}

/// Insurance, IC registration, organization and taxation numbers.
pub fn resolve_code(
    oid: &ObjectIdentifier,
    requested_extension: Option<&Extension>,
    requested: &Name,
) -> Result<Option<Vec<u8>>, PolicyViolation> {
    let code = match requested_extension {
        Some(extension) => yasna::parse_der(extension.value(), Gmt0015Code::decode_ber)
            .map_err(|e| PolicyViolation::MalformedRequestExtension {
                extension: oids::display_name(oid),
                details: e.to_string(),
            })?
            .0,
        None => match subject_text(requested, oid)? {
            Some(text) => text.to_string(),
            None => return Ok(None),
        },
    };
    let code = code.trim();
    if code.is_empty() {
        return Ok(None);
    }
    if !certprofile_x509::certificate::is_printable(code) {
        return Err(PolicyViolation::InvalidAttributeValue {
            attribute: oids::display_name(oid),
            value: code.to_string(),
            details: "not a printable string".to_string(),
        });
    }
    Ok(Some(yasna::encode_der(&Gmt0015Code(code.to_string()))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use certprofile_x509::certificate::oids::*;

    fn identity_extension(der: Vec<u8>) -> Extension {
        Extension::new(oid(OID_GMT_0015_IDENTITY_CODE), false, der)
    }

    #[test]
    fn implicit_request_code_should_be_rewritten_explicitly () {
        let resolved = resolve_identity_code(
            Some(&identity_extension(vec!(0x81,0x01,0x58))),
            &Name::default(),
        ).unwrap();
        assert_eq!(resolved, Some(vec!(
            0xa1,0x03,                // [1] EXPLICIT
            0x0c,0x01,0x58,           // UTF8String "X"
        )));
    }

    #[test]
    fn request_extension_should_win_over_subject () {
        let subject: Name = "CN=a,1.2.156.10260.4.1.1=[0]SUBJECT".parse().unwrap();
        let resolved = resolve_identity_code(
            Some(&identity_extension(vec!(0xa2,0x04,0x13,0x02,0x45,0x31))),
            &subject,
        ).unwrap();
        assert_eq!(resolved, Some(vec!(
            0xa2,0x04,                // [2] EXPLICIT
            0x13,0x02,0x45,0x31,      // PrintableString "E1"
        )));
    }

    #[test]
    fn subject_code_should_be_used_without_request_extension () {
        let subject: Name = "1.2.156.10260.4.1.1=[0]AB".parse().unwrap();
        assert_eq!(resolve_identity_code(None, &subject), Ok(Some(vec!(
            0xa0,0x04,                // [0] EXPLICIT
            0x13,0x02,0x41,0x42,      // PrintableString "AB"
        ))));
    }

    #[test]
    fn out_of_range_tags_should_be_violations () {
        let subject: Name = "1.2.156.10260.4.1.1=[3]AB".parse().unwrap();
        assert!(matches!(
            resolve_identity_code(None, &subject),
            Err(PolicyViolation::InvalidAttributeValue { .. })
        ));
        assert!(matches!(
            resolve_identity_code(Some(&identity_extension(vec!(0x83,0x01,0x41))), &Name::default()),
            Err(PolicyViolation::MalformedRequestExtension { .. })
        ));
    }

    #[test]
    fn non_printable_subject_code_should_be_a_violation () {
        let subject: Name = "1.2.156.10260.4.1.1=[0]a@b".parse().unwrap();
        assert!(matches!(
            resolve_identity_code(None, &subject),
            Err(PolicyViolation::InvalidAttributeValue { .. })
        ));
        let subject: Name = "1.2.156.10260.4.1.1=[1]a@b".parse().unwrap();
        assert_eq!(resolve_identity_code(None, &subject), Ok(Some(vec!(
            0xa1,0x05,                // [1] EXPLICIT
            0x0c,0x03,0x61,0x40,0x62, // UTF8String "a@b"
        ))));
    }

    #[test]
    fn missing_identity_code_should_emit_nothing () {
        assert_eq!(resolve_identity_code(None, &Name::default()), Ok(None));
    }

    #[test]
    fn simple_code_should_be_written_as_printable_string () {
        let tax = oid(OID_GMT_0015_TAXATION_NUMBER);
        let subject: Name = "1.2.156.10260.4.1.5=91A ".parse().unwrap();
        assert_eq!(resolve_code(&tax, None, &subject), Ok(Some(vec!(0x13,0x03,0x39,0x31,0x41))));
        let extension = Extension::new(tax.clone(), false, vec!(0x0c,0x02,0x37,0x37));
        assert_eq!(resolve_code(&tax, Some(&extension), &subject), Ok(Some(vec!(0x13,0x02,0x37,0x37))));
        assert_eq!(resolve_code(&tax, None, &Name::default()), Ok(None));
    }
}
