use crate::conf::QcStatementConf;
use crate::error::{ConfigError, PolicyViolation};
use crate::profile::controls::parse_oid;
use certprofile_x509::certificate::extensions::{
    Extension,
    Iso4217CurrencyCode,
    MonetaryValue,
    PdsLocation,
    PdsLocations,
    QcStatement,
    QcStatements,
};
use certprofile_x509::certificate::oids::{self, *};
use num_bigint::BigInt;
use yasna::BERDecodable;
use yasna::models::ObjectIdentifier;

/// Inclusive range of a request-supplied integer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Range {
    pub min: i64,
    pub max: i64,
}

impl Range {
    fn compile(field: &str, min: i64, max: i64) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvalidRange { field: field.to_string(), min, max });
        }
        Ok(Range { min, max })
    }

    fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Limit value whose amount and exponent come from the request, within the
/// configured ranges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonetaryValueOption {
    pub currency: Iso4217CurrencyCode,
    pub amount: Range,
    pub exponent: Range,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QcStatementOption {
    Fixed(QcStatement),
    LimitValue { statement_id: ObjectIdentifier, option: MonetaryValueOption },
}

/// Either the finished extension value or the statements still waiting on
/// request input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompiledQcStatements {
    Constant(Vec<u8>),
    Options(Vec<QcStatementOption>),
}

fn invalid(field: &str, value: &str, details: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        details: details.to_string(),
    }
}

/// `currencies` collects the currency of every limit value, fixed or not.
fn compile_statement(conf: &QcStatementConf, currencies: &mut Vec<Iso4217CurrencyCode>) -> Result<QcStatementOption, ConfigError> {
    let statement_id = parse_oid(&conf.statement_id)?;
    let value = match &conf.statement_value {
        None => return Ok(QcStatementOption::Fixed(QcStatement::new(statement_id, None))),
        Some(value) => value,
    };
    let members = [
        value.qc_retention_period.is_some(),
        value.constant.is_some(),
        value.qc_eu_limit_value.is_some(),
        value.pds_locations.is_some(),
    ].iter().filter(|present| **present).count();
    if members != 1 {
        return Err(invalid("qcStatements statement_value", &conf.statement_id,
            "exactly one of qc_retention_period, constant, qc_eu_limit_value, pds_locations is expected"));
    }

    if let Some(years) = value.qc_retention_period {
        let info = yasna::construct_der(|writer| writer.write_u32(years));
        return Ok(QcStatementOption::Fixed(QcStatement::new(statement_id, Some(info))));
    }
    if let Some(der) = &value.constant {
        if yasna::parse_der(der, |reader| reader.read_der()).is_err() {
            return Err(invalid("qcStatements constant", &conf.statement_id, "not a single DER element"));
        }
        return Ok(QcStatementOption::Fixed(QcStatement::new(statement_id, Some(der.clone()))));
    }
    if let Some(locations) = &value.pds_locations {
        let mut pds = Vec::with_capacity(locations.len());
        for location in locations {
            if location.language.len() != 2 || !location.language.bytes().all(|b| b.is_ascii_alphabetic()) {
                return Err(invalid("qcStatements pds language", &location.language, "two letters expected"));
            }
            if !location.url.is_ascii() {
                return Err(invalid("qcStatements pds url", &location.url, "not an IA5String"));
            }
            pds.push(PdsLocation { url: location.url.clone(), language: location.language.clone() });
        }
        let info = yasna::encode_der(&PdsLocations(pds));
        return Ok(QcStatementOption::Fixed(QcStatement::new(statement_id, Some(info))));
    }
    match &value.qc_eu_limit_value {
        Some(limit) => {
            let code = limit.currency.trim().to_ascii_uppercase();
            let currency = code
                .parse::<Iso4217CurrencyCode>()
                .map_err(|_| ConfigError::InvalidCurrency(limit.currency.clone()))?;
            if currencies.iter().any(|seen| seen.same_currency(&currency)) {
                return Err(ConfigError::DuplicateCurrency(currency.to_string()));
            }
            currencies.push(currency.clone());
            let option = MonetaryValueOption {
                currency,
                amount: Range::compile("qcEuLimitValue amount", limit.amount.min, limit.amount.max)?,
                exponent: Range::compile("qcEuLimitValue exponent", limit.exponent.min, limit.exponent.max)?,
            };
            if option.amount.is_degenerate() && option.exponent.is_degenerate() {
                let info = yasna::encode_der(&MonetaryValue {
                    currency: option.currency,
                    amount: BigInt::from(option.amount.min),
                    exponent: BigInt::from(option.exponent.min),
                });
                return Ok(QcStatementOption::Fixed(QcStatement::new(statement_id, Some(info))));
            }
            Ok(QcStatementOption::LimitValue { statement_id, option })
        },
        None => Err(invalid("qcStatements statement_value", &conf.statement_id, "empty statement value")),
    }
}

/// Compiles the configured statements. Statements that need nothing from the
/// request collapse into a constant value.
pub fn compile(confs: &[QcStatementConf]) -> Result<CompiledQcStatements, ConfigError> {
    if confs.is_empty() {
        return Err(ConfigError::Missing("qcStatements statements".to_string()));
    }
    let mut options = Vec::with_capacity(confs.len());
    let mut currencies: Vec<Iso4217CurrencyCode> = Vec::new();
    for conf in confs {
        options.push(compile_statement(conf, &mut currencies)?);
    }

    if options.iter().any(|option| matches!(option, QcStatementOption::LimitValue { .. })) {
        return Ok(CompiledQcStatements::Options(options));
    }
    let fixed = options
        .into_iter()
        .filter_map(|option| match option {
            QcStatementOption::Fixed(statement) => Some(statement),
            QcStatementOption::LimitValue { .. } => None,
        })
        .collect();
    Ok(CompiledQcStatements::Constant(yasna::encode_der(&QcStatements(fixed))))
}

fn within(field: &str, value: &BigInt, range: &Range) -> Result<(), PolicyViolation> {
    let extension = oids::display_name(&oids::oid(OID_PE_QC_STATEMENTS));
    let out_of_range = || PolicyViolation::OutOfRange {
        extension: extension.clone(),
        field: field.to_string(),
        value: value.to_string(),
        min: range.min,
        max: range.max,
    };
    let value = i64::try_from(value).map_err(|_| out_of_range())?;
    if !range.contains(value) {
        return Err(out_of_range());
    }
    Ok(())
}

/// Completes the limit values from the request's qcStatements extension and
/// returns the encoded statements in configured order.
pub fn resolve(options: &[QcStatementOption], requested: Option<&Extension>) -> Result<Vec<u8>, PolicyViolation> {
    let extension_name = oids::display_name(&oids::oid(OID_PE_QC_STATEMENTS));
    let requested = requested.ok_or_else(|| PolicyViolation::MissingRequestInput {
        extension: extension_name.clone(),
        details: "the request carries no qcStatements".to_string(),
    })?;
    let malformed = |details: String| PolicyViolation::MalformedRequestExtension {
        extension: extension_name.clone(),
        details,
    };
    let requested = yasna::parse_der(requested.value(), QcStatements::decode_ber)
        .map_err(|e| malformed(e.to_string()))?;

    let mut limits: Vec<MonetaryValue> = Vec::new();
    for statement in requested.0.iter() {
        if statement.statement_id.components().as_slice() != OID_ETSI_QCS_QC_LIMIT_VALUE {
            continue;
        }
        let info = statement.statement_info.as_ref()
            .ok_or_else(|| malformed("qcLimitValue without a value".to_string()))?;
        limits.push(yasna::parse_der(info, MonetaryValue::decode_ber).map_err(|e| malformed(e.to_string()))?);
    }

    let mut statements = Vec::with_capacity(options.len());
    for option in options {
        match option {
            QcStatementOption::Fixed(statement) => statements.push(statement.clone()),
            QcStatementOption::LimitValue { statement_id, option } => {
                let limit = limits
                    .iter()
                    .rev()
                    .find(|limit| limit.currency.same_currency(&option.currency))
                    .ok_or_else(|| PolicyViolation::MissingRequestInput {
                        extension: extension_name.clone(),
                        details: format!("no qcLimitValue for currency {}", option.currency),
                    })?;
                within("amount", &limit.amount, &option.amount)?;
                within("exponent", &limit.exponent, &option.exponent)?;
                let info = yasna::encode_der(&MonetaryValue {
                    currency: option.currency.clone(),
                    amount: limit.amount.clone(),
                    exponent: limit.exponent.clone(),
                });
                statements.push(QcStatement::new(statement_id.clone(), Some(info)));
            },
        }
    }
    Ok(yasna::encode_der(&QcStatements(statements)))
}
