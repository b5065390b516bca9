use crate::error::{ConfigError, PolicyViolation};
use certprofile_x509::certificate::extensions::{Attribute, Extension, SubjectDirectoryAttributes};
use certprofile_x509::certificate::oids::{self, *};
use certprofile_x509::certificate::AttributeValue;
use time::Time;
use yasna::BERDecodable;
use yasna::models::{GeneralizedTime, ObjectIdentifier};

pub fn compile(types: &[String]) -> Result<Vec<ObjectIdentifier>, ConfigError> {
    if types.is_empty() {
        return Err(ConfigError::Missing("subject_directory_attributes types".to_string()));
    }
    let mut compiled: Vec<ObjectIdentifier> = Vec::with_capacity(types.len());
    for name in types {
        let oid = oids::attribute_type_from_name(name)
            .ok_or_else(|| ConfigError::UnknownAttributeType(name.clone()))?;
        if compiled.contains(&oid) {
            return Err(ConfigError::DuplicateAttribute { attribute: oids::display_name(&oid) });
        }
        compiled.push(oid);
    }
    Ok(compiled)
}

fn date_of_birth(der: &[u8]) -> Result<Vec<u8>, String> {
    let time = yasna::parse_der(der, |reader| reader.read_generalized_time()).map_err(|e| e.to_string())?;
    let noon = time.datetime().replace_time(Time::from_hms(12, 0, 0).map_err(|e| e.to_string())?);
    Ok(yasna::construct_der(|writer| writer.write_generalized_time(&GeneralizedTime::from_datetime(noon))))
}

fn directory_text(der: &[u8]) -> Result<String, String> {
    let value = yasna::parse_der(der, AttributeValue::decode_ber).map_err(|e| e.to_string())?;
    value.as_str().map(str::to_string).ok_or_else(|| "not a directory string".to_string())
}

fn gender(der: &[u8]) -> Result<Vec<u8>, String> {
    let text = directory_text(der)?;
    match text.as_str() {
        "M" | "m" | "F" | "f" => Ok(yasna::construct_der(|writer| writer.write_printable_string(&text))),
        _ => Err(format!("gender '{}' is not one of M, m, F, f", text)),
    }
}

fn country(der: &[u8]) -> Result<Vec<u8>, String> {
    let text = directory_text(der)?;
    if text.len() != 2 || !text.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(format!("'{}' is not a two-letter country code", text));
    }
    Ok(yasna::construct_der(|writer| writer.write_printable_string(&text)))
}

/// Re-emits the request's directory attributes of each configured type, in
/// configured order. Nothing is emitted when the request carries none.
pub fn resolve(types: &[ObjectIdentifier], requested: Option<&Extension>) -> Result<Option<Vec<u8>>, PolicyViolation> {
    let requested = match requested {
        Some(requested) => requested,
        None => return Ok(None),
    };
    let extension = oids::display_name(&oids::oid(OID_CE_SUBJECT_DIRECTORY_ATTRIBUTES));
    let attributes = yasna::parse_der(requested.value(), SubjectDirectoryAttributes::decode_ber)
        .map_err(|e| PolicyViolation::MalformedRequestExtension { extension: extension.clone(), details: e.to_string() })?;

    let mut emitted = Vec::with_capacity(types.len());
    for attr_type in types {
        let values = attributes.values_of(attr_type);
        if values.is_empty() {
            return Err(PolicyViolation::MissingRequestInput {
                extension: extension.clone(),
                details: format!("no {} attribute", oids::display_name(attr_type)),
            });
        }
        let invalid = |value: &[u8], details: String| PolicyViolation::InvalidAttributeValue {
            attribute: oids::display_name(attr_type),
            value: value.iter().map(|b| format!("{:02x}", b)).collect(),
            details,
        };
        let components = attr_type.components().as_slice();
        if components == OID_PDA_COUNTRY_OF_CITIZENSHIP || components == OID_PDA_COUNTRY_OF_RESIDENCE {
            for value in values {
                let value = country(value).map_err(|details| invalid(value, details))?;
                emitted.push(Attribute { attr_type: attr_type.clone(), values: vec!(value) });
            }
            continue;
        }
        let mut converted = Vec::with_capacity(values.len());
        for value in values {
            let result = match components {
                c if c == OID_PDA_DATE_OF_BIRTH => date_of_birth(value),
                c if c == OID_PDA_PLACE_OF_BIRTH => directory_text(value)
                    .map(|text| yasna::construct_der(|writer| writer.write_utf8_string(&text))),
                c if c == OID_PDA_GENDER => gender(value),
                _ => Ok(value.to_vec()),
            };
            converted.push(result.map_err(|details| invalid(value, details))?);
        }
        emitted.push(Attribute { attr_type: attr_type.clone(), values: converted });
    }
    Ok(Some(yasna::encode_der(&SubjectDirectoryAttributes(emitted))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn request(attributes: Vec<Attribute>) -> Extension {
        Extension::from_value(oid(OID_CE_SUBJECT_DIRECTORY_ATTRIBUTES), false, &SubjectDirectoryAttributes(attributes))
    }

    fn printable(text: &str) -> Vec<u8> {
        yasna::construct_der(|writer| writer.write_printable_string(text))
    }

    #[test]
    fn unknown_or_duplicate_types_should_fail () {
        assert!(matches!(compile(&["shoeSize".to_string()]), Err(ConfigError::UnknownAttributeType(_))));
        assert!(matches!(
            compile(&["gender".to_string(), "1.3.6.1.5.5.7.9.3".to_string()]),
            Err(ConfigError::DuplicateAttribute { .. })
        ));
    }

    #[test]
    fn date_of_birth_should_be_set_to_noon () {
        let born = yasna::construct_der(|writer| {
            writer.write_generalized_time(&GeneralizedTime::from_datetime(datetime!(1980-01-02 0:00 UTC)))
        });
        let extension = request(vec!(Attribute { attr_type: oid(OID_PDA_DATE_OF_BIRTH), values: vec!(born) }));
        let types = compile(&["dateOfBirth".to_string()]).unwrap();
        assert_eq!(resolve(&types, Some(&extension)), Ok(Some(vec!(
            0x30,0x1f,                                      // SubjectDirectoryAttributes
            0x30,0x1d,                                      // Attribute
            0x06,0x08,0x2b,0x06,0x01,0x05,0x05,0x07,0x09,0x01, // dateOfBirth
            0x31,0x11,                                      // SET
            0x18,0x0f,                                      // GeneralizedTime
            0x31,0x39,0x38,0x30,0x30,0x31,0x30,0x32,        // 19800102
            0x31,0x32,0x30,0x30,0x30,0x30,0x5a,             // 120000Z
        ))));
    }

    #[test]
    fn countries_should_get_one_attribute_each () {
        let residence = oid(OID_PDA_COUNTRY_OF_RESIDENCE);
        let extension = request(vec!(Attribute {
            attr_type: residence.clone(),
            values: vec!(printable("DE"), printable("FR")),
        }));
        let resolved = resolve(&[residence.clone()], Some(&extension)).unwrap().unwrap();
        let attributes = yasna::parse_der(&resolved, SubjectDirectoryAttributes::decode_ber).unwrap();
        assert_eq!(attributes.0.len(), 2);
        assert_eq!(attributes.values_of(&residence), vec!(printable("DE").as_slice(), printable("FR").as_slice()));
    }

    #[test]
    fn bad_values_should_be_rejected () {
        let gender = oid(OID_PDA_GENDER);
        let extension = request(vec!(Attribute { attr_type: gender.clone(), values: vec!(printable("X")) }));
        assert!(matches!(resolve(&[gender], Some(&extension)), Err(PolicyViolation::InvalidAttributeValue { .. })));

        let residence = oid(OID_PDA_COUNTRY_OF_RESIDENCE);
        let extension = request(vec!(Attribute { attr_type: residence.clone(), values: vec!(printable("de")) }));
        assert!(matches!(resolve(&[residence], Some(&extension)), Err(PolicyViolation::InvalidAttributeValue { .. })));
    }

    #[test]
    fn configured_type_missing_from_request_should_be_a_violation () {
        let extension = request(vec!(Attribute { attr_type: oid(OID_PDA_GENDER), values: vec!(printable("f")) }));
        let types = compile(&["gender".to_string(), "placeOfBirth".to_string()]).unwrap();
        assert!(matches!(resolve(&types, Some(&extension)), Err(PolicyViolation::MissingRequestInput { .. })));
        assert_eq!(resolve(&types, None), Ok(None));
    }
}
