use crate::certificate::name::Name;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use yasna::{
    ASN1Error,
    ASN1ErrorKind,
    ASN1Result,
    DERWriter,
    DEREncodable,
    BERReader,
    BERDecodable,
    Tag,
    TagClass,
    models::ObjectIdentifier,
};

//  GeneralName ::= CHOICE {
//       otherName                       [0]     OtherName,
//       rfc822Name                      [1]     IA5String,
//       dNSName                         [2]     IA5String,
//       x400Address                     [3]     ORAddress,
//       directoryName                   [4]     Name,
//       ediPartyName                    [5]     EDIPartyName,
//       uniformResourceIdentifier       [6]     IA5String,
//       iPAddress                       [7]     OCTET STRING,
//       registeredID                    [8]     OBJECT IDENTIFIER }
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeneralNameTag {
    OtherName = 0,
    Rfc822Name = 1,
    DnsName = 2,
    X400Address = 3,
    DirectoryName = 4,
    EdiPartyName = 5,
    UniformResourceIdentifier = 6,
    IpAddress = 7,
    RegisteredId = 8,
}

impl GeneralNameTag {
    pub fn from_number(number: u64) -> Option<Self> {
        use GeneralNameTag::*;
        Some(match number {
            0 => OtherName,
            1 => Rfc822Name,
            2 => DnsName,
            3 => X400Address,
            4 => DirectoryName,
            5 => EdiPartyName,
            6 => UniformResourceIdentifier,
            7 => IpAddress,
            8 => RegisteredId,
            _ => return None,
        })
    }
}

impl FromStr for GeneralNameTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use GeneralNameTag::*;
        match s.to_ascii_lowercase().as_str() {
            "othername" => Ok(OtherName),
            "rfc822name" | "rfc822" | "email" => Ok(Rfc822Name),
            "dnsname" | "dns" => Ok(DnsName),
            "x400address" | "x400name" => Ok(X400Address),
            "directoryname" | "dirname" => Ok(DirectoryName),
            "edipartyname" => Ok(EdiPartyName),
            "uniformresourceidentifier" | "uri" => Ok(UniformResourceIdentifier),
            "ipaddress" | "ip" => Ok(IpAddress),
            "registeredid" | "rid" => Ok(RegisteredId),
            other => Err(format!("unknown general name type '{}'", other)),
        }
    }
}

impl fmt::Display for GeneralNameTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use GeneralNameTag::*;
        let name = match self {
            OtherName => "otherName",
            Rfc822Name => "rfc822Name",
            DnsName => "dNSName",
            X400Address => "x400Address",
            DirectoryName => "directoryName",
            EdiPartyName => "ediPartyName",
            UniformResourceIdentifier => "uniformResourceIdentifier",
            IpAddress => "iPAddress",
            RegisteredId => "registeredID",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GeneralName {
    /// `value` is the DER of the explicitly tagged inner value.
    OtherName { type_id: ObjectIdentifier, value: Vec<u8> },
    Rfc822Name(String),
    DnsName(String),
    /// Whole DER element, tag included.
    X400Address(Vec<u8>),
    DirectoryName(Name),
    /// Whole DER element, tag included.
    EdiPartyName(Vec<u8>),
    UniformResourceIdentifier(String),
    /// 4 or 16 octets for an address, 8 or 32 for an address and mask.
    IpAddress(Vec<u8>),
    RegisteredId(ObjectIdentifier),
}

impl From<IpAddr> for GeneralName {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4_addr) => GeneralName::IpAddress(v4_addr.octets().to_vec()),
            IpAddr::V6(v6_addr) => GeneralName::IpAddress(v6_addr.octets().to_vec()),
        }
    }
}

impl GeneralName {
    pub fn tag(&self) -> GeneralNameTag {
        use GeneralName::*;
        match self {
            OtherName { .. } => GeneralNameTag::OtherName,
            Rfc822Name(_) => GeneralNameTag::Rfc822Name,
            DnsName(_) => GeneralNameTag::DnsName,
            X400Address(_) => GeneralNameTag::X400Address,
            DirectoryName(_) => GeneralNameTag::DirectoryName,
            EdiPartyName(_) => GeneralNameTag::EdiPartyName,
            UniformResourceIdentifier(_) => GeneralNameTag::UniformResourceIdentifier,
            IpAddress(_) => GeneralNameTag::IpAddress,
            RegisteredId(_) => GeneralNameTag::RegisteredId,
        }
    }

    /// Rejects text the IA5String forms cannot carry.
    pub fn check_charset(&self) -> Result<(), String> {
        use GeneralName::*;
        match self {
            Rfc822Name(text) | DnsName(text) | UniformResourceIdentifier(text) if !text.is_ascii() =>
                Err(format!("'{}' is not an IA5String {}", text, self.tag())),
            _ => Ok(()),
        }
    }
}

impl DEREncodable for GeneralName {
    fn encode_der(&self, writer: DERWriter) {
        match self {
            GeneralName::OtherName { type_id, value } => {
                writer.write_tagged_implicit(Tag::context(0), |writer| {
                    writer.write_sequence(|writer| {
                        writer.next().write_oid(type_id);
                        writer.next().write_tagged(Tag::context(0), |writer| {
                            writer.write_der(value)
                        });
                    })
                })
            },
            GeneralName::Rfc822Name(mailbox) => {
                writer.write_tagged_implicit(Tag::context(1), |writer| {
                    writer.write_ia5_string(mailbox)
                })
            },
            GeneralName::DnsName(dns_name) => {
                writer.write_tagged_implicit(Tag::context(2), |writer| {
                    writer.write_ia5_string(dns_name)
                })
            },
            GeneralName::X400Address(der) | GeneralName::EdiPartyName(der) => {
                writer.write_der(der)
            },
            GeneralName::DirectoryName(name) => {
                writer.write_tagged(Tag::context(4), |writer| {
                    name.encode_der(writer)
                })
            },
            GeneralName::UniformResourceIdentifier(uri) => {
                writer.write_tagged_implicit(Tag::context(6), |writer| {
                    writer.write_ia5_string(uri)
                })
            },
            GeneralName::IpAddress(octets) => {
                writer.write_tagged_implicit(Tag::context(7), |writer| {
                    writer.write_bytes(octets)
                })
            },
            GeneralName::RegisteredId(oid) => {
                writer.write_tagged_implicit(Tag::context(8), |writer| {
                    writer.write_oid(oid)
                })
            },
        }
    }
}

impl BERDecodable for GeneralName {
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        let tag = reader.lookahead_tag()?;
        if tag.tag_class != TagClass::ContextSpecific {
            return Err(ASN1Error::new(ASN1ErrorKind::Invalid))
        }
        let general_name_tag = GeneralNameTag::from_number(tag.tag_number)
            .ok_or(ASN1Error::new(ASN1ErrorKind::Invalid))?;
        match general_name_tag {
            GeneralNameTag::OtherName => {
                reader.read_tagged_implicit(Tag::context(0), |reader| {
                    reader.read_sequence(|reader| {
                        let type_id = reader.next().read_oid()?;
                        let value = reader.next().read_tagged(Tag::context(0), |reader| {
                            reader.read_der()
                        })?;
                        Ok(GeneralName::OtherName { type_id, value })
                    })
                })
            },
            GeneralNameTag::Rfc822Name => reader
                .read_tagged_implicit(tag, |reader| reader.read_ia5_string())
                .map(GeneralName::Rfc822Name),
            GeneralNameTag::DnsName => reader
                .read_tagged_implicit(tag, |reader| reader.read_ia5_string())
                .map(GeneralName::DnsName),
            GeneralNameTag::X400Address => reader.read_der().map(GeneralName::X400Address),
            GeneralNameTag::DirectoryName => reader
                .read_tagged(tag, Name::decode_ber)
                .map(GeneralName::DirectoryName),
            GeneralNameTag::EdiPartyName => reader.read_der().map(GeneralName::EdiPartyName),
            GeneralNameTag::UniformResourceIdentifier => reader
                .read_tagged_implicit(tag, |reader| reader.read_ia5_string())
                .map(GeneralName::UniformResourceIdentifier),
            GeneralNameTag::IpAddress => reader
                .read_tagged_implicit(tag, |reader| reader.read_bytes())
                .map(GeneralName::IpAddress),
            GeneralNameTag::RegisteredId => reader
                .read_tagged_implicit(tag, |reader| reader.read_oid())
                .map(GeneralName::RegisteredId),
        }
    }
}

//  GeneralNames ::= SEQUENCE SIZE (1..MAX) OF GeneralName
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct GeneralNames(pub Vec<GeneralName>);

impl DEREncodable for GeneralNames {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            for name in self.0.iter() {
                name.encode_der(writer.next());
            }
        })
    }
}

impl BERDecodable for GeneralNames {
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        let names = reader.collect_sequence_of(GeneralName::decode_ber)?;
        if names.is_empty() {
            return Err(ASN1Error::new(ASN1ErrorKind::Invalid))
        }
        Ok(GeneralNames(names))
    }
}
