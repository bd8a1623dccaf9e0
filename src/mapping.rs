//! Column-role inference ("field mapping guessing").
//!
//! Given one representative record, each semantic role (date, amount, product, ...)
//! is resolved to a column name by evaluating a fixed, ranked rule list:
//!
//! 1. **Exact tier**: for each candidate term in order, the first column whose
//!    trimmed, lower-cased name equals the term.
//! 2. **Substring tier**: the first column, in record order, whose lower-cased name
//!    contains any candidate term.
//!
//! The first hit wins, even when a later column would be a better semantic fit.
//! A role with no hit resolves to the empty string, which downstream aggregation
//! reads as "not enough data".

use std::fmt;

use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::record::{Record, SYNTHETIC_ID_COLUMN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[value(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    Sales,
    Timekeeping,
    Personnel,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Domain::Sales => "sales",
            Domain::Timekeeping => "timekeeping",
            Domain::Personnel => "personnel",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Date,
    Amount,
    Product,
    Quantity,
    Employee,
    Hours,
    Name,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Date => "date",
            Role::Amount => "amount",
            Role::Product => "product",
            Role::Quantity => "quantity",
            Role::Employee => "employee",
            Role::Hours => "hours",
            Role::Name => "name",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn terms(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesCandidates {
    pub date: Vec<String>,
    pub amount: Vec<String>,
    pub product: Vec<String>,
    pub quantity: Vec<String>,
}

impl Default for SalesCandidates {
    fn default() -> Self {
        Self {
            date: terms(&["ngày", "date", "time"]),
            amount: terms(&["thành tiền", "thanh tien", "amount", "total", "tổng"]),
            product: terms(&["tên hàng", "ten hang", "product", "item", "mặt hàng"]),
            quantity: terms(&["số lượng", "so luong", "qty", "quantity", "sl"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimekeepingCandidates {
    pub employee: Vec<String>,
    pub date: Vec<String>,
    pub hours: Vec<String>,
}

impl Default for TimekeepingCandidates {
    fn default() -> Self {
        Self {
            employee: terms(&[
                "nhân sự",
                "nhân sựu",
                "tên nhân viên",
                "nhân viên",
                "employee",
                "name",
                "họ tên",
                "người làm",
            ]),
            date: terms(&["ngày", "date", "time", "checkin", "giờ"]),
            hours: terms(&[
                "số giờ",
                "so gio",
                "giờ công",
                "gio cong",
                "tổng giờ",
                "hours",
                "total hours",
                "worked hours",
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonnelCandidates {
    pub name: Vec<String>,
}

impl Default for PersonnelCandidates {
    fn default() -> Self {
        Self {
            name: terms(&[
                "tên nhân viên",
                "tên",
                "họ tên",
                "nhân viên",
                "employee",
                "name",
                "full name",
            ]),
        }
    }
}

/// Candidate terms for every domain, covering Vietnamese with and without
/// diacritics plus English synonyms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingRules {
    pub sales: SalesCandidates,
    pub timekeeping: TimekeepingCandidates,
    pub personnel: PersonnelCandidates,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesMapping {
    pub date_field: String,
    pub amount_field: String,
    pub product_field: String,
    pub quantity_field: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimekeepingMapping {
    pub employee_field: String,
    pub date_field: String,
    pub hours_field: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonnelMapping {
    pub name_field: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "kebab-case")]
pub enum FieldMapping {
    Sales(SalesMapping),
    Timekeeping(TimekeepingMapping),
    Personnel(PersonnelMapping),
}

impl FieldMapping {
    /// Role/column pairs in a stable order; unresolved roles carry `""`.
    pub fn entries(&self) -> Vec<(Role, &str)> {
        match self {
            FieldMapping::Sales(m) => vec![
                (Role::Date, m.date_field.as_str()),
                (Role::Amount, m.amount_field.as_str()),
                (Role::Product, m.product_field.as_str()),
                (Role::Quantity, m.quantity_field.as_str()),
            ],
            FieldMapping::Timekeeping(m) => vec![
                (Role::Employee, m.employee_field.as_str()),
                (Role::Date, m.date_field.as_str()),
                (Role::Hours, m.hours_field.as_str()),
            ],
            FieldMapping::Personnel(m) => vec![(Role::Name, m.name_field.as_str())],
        }
    }
}

/// Matcher over the non-identifier columns of one sample record.
struct ColumnMatcher<'a> {
    columns: Vec<(&'a str, String)>,
}

impl<'a> ColumnMatcher<'a> {
    fn new(sample: &'a Record) -> Self {
        let columns = sample
            .columns()
            .filter(|name| *name != SYNTHETIC_ID_COLUMN)
            .map(|name| (name, name.trim().to_lowercase()))
            .collect();
        Self { columns }
    }

    fn exact(&self, candidates: &[String]) -> Option<&'a str> {
        candidates.iter().find_map(|candidate| {
            let wanted = candidate.trim().to_lowercase();
            self.columns
                .iter()
                .find(|(_, lowered)| *lowered == wanted)
                .map(|(name, _)| *name)
        })
    }

    fn substring(&self, candidates: &[String]) -> Option<&'a str> {
        let needles = candidates
            .iter()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>();
        self.columns
            .iter()
            .find(|(_, lowered)| needles.iter().any(|needle| lowered.contains(needle.as_str())))
            .map(|(name, _)| *name)
    }

    fn resolve(&self, role: Role, candidates: &[String]) -> String {
        if let Some(column) = self.exact(candidates) {
            debug!("Role '{role}' resolved to '{column}' by exact match");
            return column.to_string();
        }
        if let Some(column) = self.substring(candidates) {
            debug!("Role '{role}' resolved to '{column}' by substring match");
            return column.to_string();
        }
        debug!("Role '{role}' left unresolved");
        String::new()
    }
}

/// Resolves one role against `sample`; `""` when nothing matches.
pub fn guess_column(sample: &Record, role: Role, candidates: &[String]) -> String {
    ColumnMatcher::new(sample).resolve(role, candidates)
}

pub fn guess_sales_mapping(sample: &Record, candidates: &SalesCandidates) -> SalesMapping {
    let matcher = ColumnMatcher::new(sample);
    SalesMapping {
        date_field: matcher.resolve(Role::Date, &candidates.date),
        amount_field: matcher.resolve(Role::Amount, &candidates.amount),
        product_field: matcher.resolve(Role::Product, &candidates.product),
        quantity_field: matcher.resolve(Role::Quantity, &candidates.quantity),
    }
}

pub fn guess_timekeeping_mapping(
    sample: &Record,
    candidates: &TimekeepingCandidates,
) -> TimekeepingMapping {
    let matcher = ColumnMatcher::new(sample);
    TimekeepingMapping {
        employee_field: matcher.resolve(Role::Employee, &candidates.employee),
        date_field: matcher.resolve(Role::Date, &candidates.date),
        hours_field: matcher.resolve(Role::Hours, &candidates.hours),
    }
}

pub fn guess_personnel_mapping(
    sample: &Record,
    candidates: &PersonnelCandidates,
) -> PersonnelMapping {
    let matcher = ColumnMatcher::new(sample);
    PersonnelMapping {
        name_field: matcher.resolve(Role::Name, &candidates.name),
    }
}

/// Guesses the mapping for `domain` from a representative sample record.
pub fn guess_mapping(sample: &Record, domain: Domain, rules: &MappingRules) -> FieldMapping {
    match domain {
        Domain::Sales => FieldMapping::Sales(guess_sales_mapping(sample, &rules.sales)),
        Domain::Timekeeping => {
            FieldMapping::Timekeeping(guess_timekeeping_mapping(sample, &rules.timekeeping))
        }
        Domain::Personnel => {
            FieldMapping::Personnel(guess_personnel_mapping(sample, &rules.personnel))
        }
    }
}
