use time::{OffsetDateTime, UtcOffset};
use yasna::{DERWriter, DEREncodable, Tag};
use yasna::models::GeneralizedTime;

/// UTC, whole seconds, as DER requires of GeneralizedTime.
pub fn to_generalized_time(instant: OffsetDateTime) -> GeneralizedTime {
    let utc = instant.to_offset(UtcOffset::UTC);
    GeneralizedTime::from_datetime(utc.replace_nanosecond(0).unwrap_or(utc))
}

//  PrivateKeyUsagePeriod ::= SEQUENCE {
//       notBefore       [0]     GeneralizedTime OPTIONAL,
//       notAfter        [1]     GeneralizedTime OPTIONAL }
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivateKeyUsagePeriod {
    pub not_before: Option<OffsetDateTime>,
    pub not_after: Option<OffsetDateTime>,
}

impl DEREncodable for PrivateKeyUsagePeriod {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            if let Some(not_before) = self.not_before {
                writer.next().write_tagged_implicit(Tag::context(0), |writer| {
                    writer.write_generalized_time(&to_generalized_time(not_before))
                });
            }
            if let Some(not_after) = self.not_after {
                writer.next().write_tagged_implicit(Tag::context(1), |writer| {
                    writer.write_generalized_time(&to_generalized_time(not_after))
                });
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn private_key_usage_period_should_encode_correctly () {
        let expected = vec!(0x30,0x22, // SEQUENCE, 34 bytes
            0x80,0x0f, // [0] IMPLICIT GeneralizedTime, 15 bytes
                0x32,0x30,0x32,0x34, // YYYY - 2024
                0x30,0x31, // MM - 01
                0x30,0x32, // DD - 02
                0x30,0x33, // HH - 03
                0x30,0x34, // mm - 04
                0x30,0x35, // ss - 05
                0x5a, // Z
            0x81,0x0f, // [1] IMPLICIT GeneralizedTime, 15 bytes
                0x32,0x30,0x32,0x34, // YYYY - 2024
                0x30,0x32, // MM - 02
                0x30,0x31, // DD - 01
                0x30,0x33, // HH - 03
                0x30,0x34, // mm - 04
                0x30,0x35, // ss - 05
                0x5a); // Z
        let period = PrivateKeyUsagePeriod {
            not_before: Some(datetime!(2024-01-02 3:04:05.678 UTC)),
            not_after: Some(datetime!(2024-02-01 4:04:05 +1)),
        };
        assert_eq!(yasna::encode_der(&period), expected);
    }
}
