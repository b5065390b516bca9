use num_bigint::BigInt;
use std::fmt;
use std::str::FromStr;
use yasna::{
    ASN1Error,
    ASN1ErrorKind,
    ASN1Result,
    DERWriter,
    DEREncodable,
    BERReader,
    BERDecodable,
    models::ObjectIdentifier,
    tags::{TAG_PRINTABLESTRING, TAG_INTEGER},
};

//  QCStatements ::= SEQUENCE OF QCStatement
//  QCStatement ::= SEQUENCE {
//      statementId   QC-STATEMENT.&id({SupportedStatements}),
//      statementInfo QC-STATEMENT.&Type
//      ({SupportedStatements}{@statementId}) OPTIONAL }
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QcStatement {
    pub statement_id: ObjectIdentifier,
    /// DER of the statement info, when present.
    pub statement_info: Option<Vec<u8>>,
}

impl QcStatement {
    pub fn new(statement_id: ObjectIdentifier, statement_info: Option<Vec<u8>>) -> Self {
        QcStatement { statement_id, statement_info }
    }
}

impl DEREncodable for QcStatement {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            writer.next().write_oid(&self.statement_id);
            if let Some(info) = &self.statement_info {
                writer.next().write_der(info);
            }
        })
    }
}

impl BERDecodable for QcStatement {
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        reader.read_sequence(|reader| {
            let statement_id = reader.next().read_oid()?;
            let statement_info = reader.read_optional(|reader| reader.read_der())?;
            Ok(QcStatement { statement_id, statement_info })
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct QcStatements(pub Vec<QcStatement>);

impl QcStatements {
    pub fn find(&self, statement_id: &ObjectIdentifier) -> Option<&QcStatement> {
        self.0.iter().find(|statement| &statement.statement_id == statement_id)
    }
}

impl DEREncodable for QcStatements {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            for statement in self.0.iter() {
                statement.encode_der(writer.next());
            }
        })
    }
}

impl BERDecodable for QcStatements {
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        Ok(QcStatements(reader.collect_sequence_of(QcStatement::decode_ber)?))
    }
}

const CURRENCIES : &'static [(&'static str, u16)] = &[
    ("AUD", 36), ("BGN", 975), ("BRL", 986), ("CAD", 124), ("CHF", 756),
    ("CNY", 156), ("CZK", 203), ("DKK", 208), ("EUR", 978), ("GBP", 826),
    ("HKD", 344), ("HUF", 348), ("INR", 356), ("ISK", 352), ("JPY", 392),
    ("KRW", 410), ("MXN", 484), ("NOK", 578), ("NZD", 554), ("PLN", 985),
    ("RON", 946), ("RUB", 643), ("SEK", 752), ("SGD", 702), ("TRY", 949),
    ("USD", 840), ("ZAR", 710),
];

//  Iso4217CurrencyCode ::= CHOICE {
//      alphabetic PrintableString (SIZE (3)), -- Recommended
//      numeric INTEGER (1..999) }
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Iso4217CurrencyCode {
    Alphabetic(String),
    Numeric(u16),
}

impl Iso4217CurrencyCode {
    /// Numeric code, translating the alphabetic codes this crate knows.
    pub fn numeric(&self) -> Option<u16> {
        match self {
            Iso4217CurrencyCode::Numeric(code) => Some(*code),
            Iso4217CurrencyCode::Alphabetic(code) => CURRENCIES
                .iter()
                .find(|(alpha, _)| *alpha == code.as_str())
                .map(|(_, numeric)| *numeric),
        }
    }

    /// Whether both denote the same currency, whichever form each is in.
    pub fn same_currency(&self, other: &Iso4217CurrencyCode) -> bool {
        if self == other {
            return true
        }
        match (self.numeric(), other.numeric()) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        }
    }
}

/// Three upper-case letters, or a number in `1..=999`.
impl FromStr for Iso4217CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == 3 && s.bytes().all(|b| b.is_ascii_uppercase()) {
            return Ok(Iso4217CurrencyCode::Alphabetic(s.to_string()))
        }
        if !s.is_empty() && s.len() <= 3 && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(code) = s.parse::<u16>() {
                if (1..=999).contains(&code) {
                    return Ok(Iso4217CurrencyCode::Numeric(code))
                }
            }
        }
        Err(format!("'{}' is not an ISO 4217 currency code", s))
    }
}

impl fmt::Display for Iso4217CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Iso4217CurrencyCode::Alphabetic(code) => write!(f, "{}", code),
            Iso4217CurrencyCode::Numeric(code) => write!(f, "{:03}", code),
        }
    }
}

impl DEREncodable for Iso4217CurrencyCode {
    fn encode_der(&self, writer: DERWriter) {
        match self {
            Iso4217CurrencyCode::Alphabetic(code) => writer.write_printable_string(code),
            Iso4217CurrencyCode::Numeric(code) => writer.write_u16(*code),
        }
    }
}

impl BERDecodable for Iso4217CurrencyCode {
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        let tag = reader.lookahead_tag()?;
        if tag == TAG_PRINTABLESTRING {
            return Ok(Iso4217CurrencyCode::Alphabetic(reader.read_printable_string()?))
        }
        if tag == TAG_INTEGER {
            return Ok(Iso4217CurrencyCode::Numeric(reader.read_u16()?))
        }
        Err(ASN1Error::new(ASN1ErrorKind::Invalid))
    }
}

//  MonetaryValue ::= SEQUENCE {
//      currency Iso4217CurrencyCode,
//      amount INTEGER,
//      exponent INTEGER }
//  -- value = amount * 10^exponent
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonetaryValue {
    pub currency: Iso4217CurrencyCode,
    pub amount: BigInt,
    pub exponent: BigInt,
}

impl DEREncodable for MonetaryValue {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            self.currency.encode_der(writer.next());
            writer.next().write_bigint(&self.amount);
            writer.next().write_bigint(&self.exponent);
        })
    }
}

impl BERDecodable for MonetaryValue {
    fn decode_ber(reader: BERReader) -> ASN1Result<Self> {
        reader.read_sequence(|reader| {
            let currency = Iso4217CurrencyCode::decode_ber(reader.next())?;
            let amount = reader.next().read_bigint()?;
            let exponent = reader.next().read_bigint()?;
            Ok(MonetaryValue { currency, amount, exponent })
        })
    }
}

//  PdsLocations ::= SEQUENCE SIZE (1..MAX) OF PdsLocation
//  PdsLocation ::= SEQUENCE {
//      url IA5String,
//      language PrintableString (SIZE(2))} --ISO 639-1 language code
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PdsLocation {
    pub url: String,
    pub language: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PdsLocations(pub Vec<PdsLocation>);

impl DEREncodable for PdsLocations {
    fn encode_der(&self, writer: DERWriter) {
        writer.write_sequence(|writer| {
            for location in self.0.iter() {
                writer.next().write_sequence(|writer| {
                    writer.next().write_ia5_string(&location.url);
                    writer.next().write_printable_string(&location.language);
                });
            }
        })
    }
}
