use crate::certificate::general_name::GeneralName;
use std::net::IpAddr;
use yasna::{DERWriter, DEREncodable, Tag};

//  NameConstraints ::= SEQUENCE {
//       permittedSubtrees       [0]     GeneralSubtrees OPTIONAL,
//       excludedSubtrees        [1]     GeneralSubtrees OPTIONAL }
//
//  GeneralSubtrees ::= SEQUENCE SIZE (1..MAX) OF GeneralSubtree
//
//  GeneralSubtree ::= SEQUENCE {
//       base                    GeneralName,
//       minimum         [0]     BaseDistance DEFAULT 0,
//       maximum         [1]     BaseDistance OPTIONAL }
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct NameConstraints {
    pub permitted_subtrees: Vec<GeneralName>,
    pub excluded_subtrees: Vec<GeneralName>,
}

fn write_general_subtrees(writer: DERWriter, tag: Tag, subtrees: &[GeneralName]) {
    writer.write_tagged_implicit(tag, |writer| {
        writer.write_sequence(|writer| {
            for base in subtrees {
                writer.next().write_sequence(|writer| {
                    base.encode_der(writer.next());
                });
            }
        });
    });
}

impl DEREncodable for NameConstraints {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            if !self.permitted_subtrees.is_empty() {
                write_general_subtrees(writer.next(), Tag::context(0), &self.permitted_subtrees);
            }
            if !self.excluded_subtrees.is_empty() {
                write_general_subtrees(writer.next(), Tag::context(1), &self.excluded_subtrees);
            }
        })
    }
}

/// Parses `192.168.0.0/16` or `2001:db8::/32` into the address-and-mask form
/// of an iPAddress subtree.
pub fn ip_subtree_from_cidr(cidr: &str) -> Option<GeneralName> {
    let (address, prefix) = cidr.trim().split_once('/')?;
    let address: IpAddr = address.parse().ok()?;
    let prefix: usize = prefix.parse().ok()?;
    let mut octets = match address {
        IpAddr::V4(v4_addr) => v4_addr.octets().to_vec(),
        IpAddr::V6(v6_addr) => v6_addr.octets().to_vec(),
    };
    if prefix > octets.len() * 8 {
        return None;
    }
    let mut mask = vec![0u8; octets.len()];
    for bit in 0..prefix {
        mask[bit / 8] |= 0x80 >> (bit % 8);
    }
    for (octet, mask_octet) in octets.iter_mut().zip(mask.iter()) {
        *octet &= *mask_octet;
    }
    octets.extend_from_slice(&mask);
    Some(GeneralName::IpAddress(octets))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_constraints_should_encode_correctly () {
        let expected = vec!(0x30,0x1a, // SEQUENCE, 26 bytes
            0xa0,0x0f, // [0] IMPLICIT SEQUENCE, 15 bytes -- permittedSubtrees
                0x30,0x0d, // SEQUENCE, 13 bytes -- GeneralSubtree
                    0x82,0x0b, // [2] dNSName, 11 bytes
                        0x65,0x78,0x61,0x6d,0x70,0x6c,0x65,0x2e,0x63,0x6f,0x6d, // "example.com"
            0xa1,0x07, // [1] IMPLICIT SEQUENCE, 7 bytes -- excludedSubtrees
                0x30,0x05, // SEQUENCE, 5 bytes -- GeneralSubtree
                    0x81,0x03, // [1] rfc822Name, 3 bytes
                        0x61,0x2e,0x62); // "a.b"
        let constraints = NameConstraints {
            permitted_subtrees: vec!(GeneralName::DnsName("example.com".to_string())),
            excluded_subtrees: vec!(GeneralName::Rfc822Name("a.b".to_string())),
        };
        assert_eq!(yasna::encode_der(&constraints), expected);
    }

    #[test]
    fn ipv4_cidr_should_become_address_and_mask () {
        assert_eq!(
            ip_subtree_from_cidr("192.168.1.7/16"),
            Some(GeneralName::IpAddress(vec!(192,168,0,0,255,255,0,0))));
        assert_eq!(
            ip_subtree_from_cidr("10.0.0.0/9"),
            Some(GeneralName::IpAddress(vec!(10,0,0,0,255,128,0,0))));
    }

    #[test]
    fn malformed_cidr_should_fail () {
        assert_eq!(ip_subtree_from_cidr("10.0.0.0"), None);
        assert_eq!(ip_subtree_from_cidr("10.0.0.0/33"), None);
        assert_eq!(ip_subtree_from_cidr("nope/8"), None);
    }
}
