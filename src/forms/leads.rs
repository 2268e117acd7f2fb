use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::lead::{NewLead, UpdateLead};
use crate::domain::query::{
    DEFAULT_LIMIT, DEFAULT_PAGE, LeadFilter, LeadListQuery, LeadSort, MAX_LIMIT, PageRequest,
    Range, SortDirection, SortField,
};
use crate::domain::types::{
    CityName, CompanyName, FirstName, LastName, LeadEmail, LeadNotes, LeadScore, LeadSource,
    LeadStatus, LeadValue, PhoneNumber, StateName, TypeConstraintError, UserId,
};
use crate::forms::rejected;

const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Raw listing parameters exactly as they arrive in the query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub is_qualified: Option<String>,
    pub score_min: Option<String>,
    pub score_max: Option<String>,
    pub value_min: Option<String>,
    pub value_max: Option<String>,
    pub created_after: Option<String>,
    pub created_before: Option<String>,
    pub activity_after: Option<String>,
    pub activity_before: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Reads the leading integer of `raw`, ignoring whatever follows it.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate instead of failing on absurdly long digit runs.
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// Reads the longest numeric prefix of `raw` as a finite float.
fn parse_leading_float(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let end = trimmed
        .find(|c: char| !matches!(c, '0'..='9' | '+' | '-' | '.' | 'e' | 'E'))
        .unwrap_or(trimmed.len());
    (1..=end)
        .rev()
        .find_map(|len| trimmed[..len].parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD[T ]HH:MM:SS[.f]` and bare dates (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_utc());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Treats empty strings as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn substring(value: &Option<String>) -> Option<String> {
    present(value).map(|v| v.trim().to_string())
}

fn int_bound(value: &Option<String>) -> Option<i32> {
    present(value)
        .and_then(parse_leading_int)
        .and_then(|v| i32::try_from(v).ok())
}

fn float_bound(value: &Option<String>) -> Option<f64> {
    present(value).and_then(parse_leading_float)
}

fn date_bound(value: &Option<String>) -> Option<NaiveDateTime> {
    present(value).and_then(parse_timestamp)
}

impl LeadListParams {
    /// Collects raw query pairs. When a key repeats, its first value wins;
    /// unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut params.page,
                "limit" => &mut params.limit,
                "status" => &mut params.status,
                "source" => &mut params.source,
                "email" => &mut params.email,
                "company" => &mut params.company,
                "city" => &mut params.city,
                "state" => &mut params.state,
                "isQualified" => &mut params.is_qualified,
                "scoreMin" => &mut params.score_min,
                "scoreMax" => &mut params.score_max,
                "valueMin" => &mut params.value_min,
                "valueMax" => &mut params.value_max,
                "createdAfter" => &mut params.created_after,
                "createdBefore" => &mut params.created_before,
                "activityAfter" => &mut params.activity_after,
                "activityBefore" => &mut params.activity_before,
                "sortBy" => &mut params.sort_by,
                "sortOrder" => &mut params.sort_order,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }

    /// Resolves the page request. Missing, zero or garbled values fall back
    /// to the defaults; everything else is clamped into range.
    pub fn page_request(&self) -> PageRequest {
        let page = match present(&self.page).and_then(parse_leading_int) {
            None | Some(0) => DEFAULT_PAGE,
            Some(n) => usize::try_from(n).unwrap_or(DEFAULT_PAGE),
        };
        let limit = match present(&self.limit).and_then(parse_leading_int) {
            None | Some(0) => DEFAULT_LIMIT,
            Some(n) if n < 0 => 1,
            Some(n) => usize::try_from(n).unwrap_or(MAX_LIMIT),
        };
        PageRequest::new(page, limit)
    }

    /// Resolves the ordering. Unknown or missing fields mean newest first.
    pub fn sort(&self) -> LeadSort {
        match present(&self.sort_by).and_then(SortField::from_param) {
            Some(field) => {
                let direction = match present(&self.sort_order) {
                    Some("asc") => SortDirection::Asc,
                    _ => SortDirection::Desc,
                };
                LeadSort::new(field, direction)
            }
            None => LeadSort::default(),
        }
    }

    /// Builds the filter from the supplied parameters. Unparseable values
    /// impose no constraint. Ownership is never taken from the request.
    pub fn filter(&self) -> LeadFilter {
        LeadFilter {
            email: substring(&self.email),
            company: substring(&self.company),
            city: substring(&self.city),
            state: substring(&self.state),
            status: present(&self.status).and_then(|v| v.parse::<LeadStatus>().ok()),
            source: present(&self.source).and_then(|v| v.parse::<LeadSource>().ok()),
            is_qualified: present(&self.is_qualified).and_then(parse_bool),
            score: Range {
                min: int_bound(&self.score_min),
                max: int_bound(&self.score_max),
            },
            lead_value: Range {
                min: float_bound(&self.value_min),
                max: float_bound(&self.value_max),
            },
            created_at: Range {
                min: date_bound(&self.created_after),
                max: date_bound(&self.created_before),
            },
            last_activity_at: Range {
                min: date_bound(&self.activity_after),
                max: date_bound(&self.activity_before),
            },
            created_by: None,
        }
    }

    /// Converts the raw parameters into a typed listing request. Never fails.
    pub fn normalize(&self) -> LeadListQuery {
        LeadListQuery {
            filter: self.filter(),
            sort: self.sort(),
            page: self.page_request(),
        }
    }
}

fn check_status(raw: &str) -> Result<(), ValidationError> {
    raw.parse::<LeadStatus>()
        .map(|_| ())
        .map_err(|_| rejected("status", "Invalid status value", raw))
}

fn check_source(raw: &str) -> Result<(), ValidationError> {
    raw.parse::<LeadSource>()
        .map(|_| ())
        .map_err(|_| rejected("source", "Invalid source value", raw))
}

fn check_score_bound(raw: &str, message: &'static str) -> Result<(), ValidationError> {
    match raw.trim().parse::<i32>() {
        Ok(score) if LeadScore::new(score).is_ok() => Ok(()),
        _ => Err(rejected("range", message, raw)),
    }
}

fn check_value_bound(raw: &str, message: &'static str) -> Result<(), ValidationError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if LeadValue::new(value).is_ok() => Ok(()),
        _ => Err(rejected("range", message, raw)),
    }
}

fn check_date(raw: &str) -> Result<(), ValidationError> {
    parse_timestamp(raw)
        .map(|_| ())
        .ok_or_else(|| rejected("date", "Invalid date value", raw))
}

fn check_bool(raw: &str) -> Result<(), ValidationError> {
    parse_bool(raw)
        .map(|_| ())
        .ok_or_else(|| rejected("boolean", "isQualified must be a boolean value", raw))
}

/// Runs `check` against a non-empty value and records a failure under `field`.
fn check_field<F>(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &Option<String>,
    check: F,
) where
    F: Fn(&str) -> Result<(), ValidationError>,
{
    if let Some(raw) = present(value) {
        if let Err(err) = check(raw) {
            errors.add(field, err);
        }
    }
}

impl Validate for LeadListParams {
    /// Rejects filter values the normalizer would otherwise silently drop.
    /// `page` and `limit` are never rejected.
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        check_field(&mut errors, "status", &self.status, check_status);
        check_field(&mut errors, "source", &self.source, check_source);
        check_field(&mut errors, "is_qualified", &self.is_qualified, check_bool);
        check_field(&mut errors, "score_min", &self.score_min, |raw| {
            check_score_bound(raw, "Score minimum must be between 0 and 100")
        });
        check_field(&mut errors, "score_max", &self.score_max, |raw| {
            check_score_bound(raw, "Score maximum must be between 0 and 100")
        });
        check_field(&mut errors, "value_min", &self.value_min, |raw| {
            check_value_bound(raw, "Value minimum must be a positive number")
        });
        check_field(&mut errors, "value_max", &self.value_max, |raw| {
            check_value_bound(raw, "Value maximum must be a positive number")
        });
        check_field(&mut errors, "created_after", &self.created_after, check_date);
        check_field(&mut errors, "created_before", &self.created_before, check_date);
        check_field(&mut errors, "activity_after", &self.activity_after, check_date);
        check_field(&mut errors, "activity_before", &self.activity_before, check_date);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    PhoneNumber::new(value)
        .map(|_| ())
        .map_err(|_| rejected("phone", "Please provide a valid phone number", value))
}

fn validate_source(value: &str) -> Result<(), ValidationError> {
    value.parse::<LeadSource>().map(|_| ()).map_err(|_| {
        rejected(
            "source",
            "Source must be one of: website, facebook_ads, google_ads, referral, events, other",
            value,
        )
    })
}

fn validate_status(value: &str) -> Result<(), ValidationError> {
    value.parse::<LeadStatus>().map(|_| ()).map_err(|_| {
        rejected(
            "status",
            "Status must be one of: new, contacted, qualified, lost, won",
            value,
        )
    })
}

fn trim(value: &mut Option<String>) {
    if let Some(inner) = value {
        let trimmed = inner.trim();
        if trimmed.len() != inner.len() {
            *inner = trimmed.to_string();
        }
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, TypeConstraintError> {
    value.ok_or_else(|| TypeConstraintError::InvalidValue(format!("{field} is required")))
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
/// Body of a create request. `createdBy` is never read from it.
pub struct CreateLeadForm {
    #[validate(
        required(message = "First name is required"),
        length(min = 2, max = 50, message = "First name must be between 2 and 50 characters")
    )]
    pub first_name: Option<String>,
    #[validate(
        required(message = "Last name is required"),
        length(min = 2, max = 50, message = "Last name must be between 2 and 50 characters")
    )]
    pub last_name: Option<String>,
    #[validate(
        required(message = "Email is required"),
        email(message = "Please provide a valid email")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "Phone is required"),
        custom(function = "validate_phone")
    )]
    pub phone: Option<String>,
    #[validate(
        required(message = "Company is required"),
        length(min = 1, max = 100, message = "Company name must be between 1 and 100 characters")
    )]
    pub company: Option<String>,
    #[validate(
        required(message = "City is required"),
        length(min = 1, max = 50, message = "City name must be between 1 and 50 characters")
    )]
    pub city: Option<String>,
    #[validate(
        required(message = "State is required"),
        length(min = 1, max = 50, message = "State name must be between 1 and 50 characters")
    )]
    pub state: Option<String>,
    #[validate(
        required(message = "Source is required"),
        custom(function = "validate_source")
    )]
    pub source: Option<String>,
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
    #[validate(range(min = 0, max = 100, message = "Score must be between 0 and 100"))]
    pub score: Option<i32>,
    #[validate(range(min = 0.0, message = "Lead value must be a positive number"))]
    pub lead_value: Option<f64>,
    pub is_qualified: Option<bool>,
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}

impl CreateLeadForm {
    /// Strips surrounding whitespace from every text field.
    pub fn trimmed(mut self) -> Self {
        for field in [
            &mut self.first_name,
            &mut self.last_name,
            &mut self.email,
            &mut self.phone,
            &mut self.company,
            &mut self.city,
            &mut self.state,
            &mut self.source,
            &mut self.status,
            &mut self.notes,
        ] {
            trim(field);
        }
        self
    }

    /// Builds the insert payload owned by `created_by`.
    pub fn to_new_lead(&self, created_by: UserId) -> Result<NewLead, TypeConstraintError> {
        Ok(NewLead {
            first_name: FirstName::new(required(self.first_name.clone(), "firstName")?)?,
            last_name: LastName::new(required(self.last_name.clone(), "lastName")?)?,
            email: LeadEmail::new(required(self.email.clone(), "email")?)?,
            phone: PhoneNumber::new(required(self.phone.clone(), "phone")?)?,
            company: CompanyName::new(required(self.company.clone(), "company")?)?,
            city: CityName::new(required(self.city.clone(), "city")?)?,
            state: StateName::new(required(self.state.clone(), "state")?)?,
            source: required(self.source.as_deref(), "source")?.parse::<LeadSource>()?,
            status: match self.status.as_deref() {
                Some(status) => status.parse()?,
                None => LeadStatus::default(),
            },
            score: LeadScore::new(self.score.unwrap_or(0))?,
            lead_value: LeadValue::new(self.lead_value.unwrap_or(0.0))?,
            is_qualified: self.is_qualified.unwrap_or(false),
            notes: LeadNotes::new(self.notes.clone().unwrap_or_default())?,
            created_by,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
/// Body of an update request. Identity, ownership and timestamps have no
/// field here and are dropped if a client sends them.
pub struct UpdateLeadForm {
    #[validate(length(
        min = 2,
        max = 50,
        message = "First name must be between 2 and 50 characters"
    ))]
    pub first_name: Option<String>,
    #[validate(length(
        min = 2,
        max = 50,
        message = "Last name must be between 2 and 50 characters"
    ))]
    pub last_name: Option<String>,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Company name must be between 1 and 100 characters"
    ))]
    pub company: Option<String>,
    #[validate(length(
        min = 1,
        max = 50,
        message = "City name must be between 1 and 50 characters"
    ))]
    pub city: Option<String>,
    #[validate(length(
        min = 1,
        max = 50,
        message = "State name must be between 1 and 50 characters"
    ))]
    pub state: Option<String>,
    #[validate(custom(function = "validate_source"))]
    pub source: Option<String>,
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
    #[validate(range(min = 0, max = 100, message = "Score must be between 0 and 100"))]
    pub score: Option<i32>,
    #[validate(range(min = 0.0, message = "Lead value must be a positive number"))]
    pub lead_value: Option<f64>,
    pub is_qualified: Option<bool>,
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}

impl UpdateLeadForm {
    /// Strips surrounding whitespace from every text field.
    pub fn trimmed(mut self) -> Self {
        for field in [
            &mut self.first_name,
            &mut self.last_name,
            &mut self.email,
            &mut self.phone,
            &mut self.company,
            &mut self.city,
            &mut self.state,
            &mut self.source,
            &mut self.status,
            &mut self.notes,
        ] {
            trim(field);
        }
        self
    }

    /// Builds the patch holding only the fields present in the body.
    pub fn to_patch(&self) -> Result<UpdateLead, TypeConstraintError> {
        Ok(UpdateLead {
            first_name: self.first_name.clone().map(FirstName::new).transpose()?,
            last_name: self.last_name.clone().map(LastName::new).transpose()?,
            email: self.email.clone().map(LeadEmail::new).transpose()?,
            phone: self.phone.clone().map(PhoneNumber::new).transpose()?,
            company: self.company.clone().map(CompanyName::new).transpose()?,
            city: self.city.clone().map(CityName::new).transpose()?,
            state: self.state.clone().map(StateName::new).transpose()?,
            source: self.source.as_deref().map(str::parse::<LeadSource>).transpose()?,
            status: self.status.as_deref().map(str::parse::<LeadStatus>).transpose()?,
            score: self.score.map(LeadScore::new).transpose()?,
            lead_value: self.lead_value.map(LeadValue::new).transpose()?,
            is_qualified: self.is_qualified,
            notes: self.notes.clone().map(LeadNotes::new).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::forms::field_errors;

    fn params(pairs: &[(&str, &str)]) -> LeadListParams {
        let query = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        serde_html_form::from_str(&query).unwrap()
    }

    #[test]
    fn empty_params_use_defaults() {
        let query = LeadListParams::default().normalize();
        assert_eq!(query.page, PageRequest::new(1, 20));
        assert_eq!(query.sort, LeadSort::default());
        assert_eq!(query.filter, LeadFilter::default());
    }

    #[test]
    fn page_and_limit_are_clamped_or_defaulted() {
        let page = params(&[("page", "3"), ("limit", "500")]).page_request();
        assert_eq!((page.page(), page.limit()), (3, 100));

        let page = params(&[("page", "abc"), ("limit", "0")]).page_request();
        assert_eq!((page.page(), page.limit()), (1, 20));

        let page = params(&[("page", "-4"), ("limit", "-7")]).page_request();
        assert_eq!((page.page(), page.limit()), (1, 1));

        let page = params(&[("page", "2x"), ("limit", "15.9")]).page_request();
        assert_eq!((page.page(), page.limit()), (2, 15));
    }

    #[test]
    fn unknown_sort_field_falls_back_to_newest_first() {
        let sort = params(&[("sortBy", "bogusField"), ("sortOrder", "asc")]).sort();
        assert_eq!(sort, LeadSort::new(SortField::CreatedAt, SortDirection::Desc));

        let sort = params(&[("sortBy", "score"), ("sortOrder", "asc")]).sort();
        assert_eq!(sort, LeadSort::new(SortField::Score, SortDirection::Asc));

        let sort = params(&[("sortBy", "lastName"), ("sortOrder", "sideways")]).sort();
        assert_eq!(sort, LeadSort::new(SortField::LastName, SortDirection::Desc));
    }

    #[test]
    fn filter_is_built_from_independent_bounds() {
        let filter = params(&[
            ("status", "won"),
            ("source", "referral"),
            ("company", " Acme "),
            ("isQualified", "1"),
            ("scoreMin", "80"),
            ("valueMax", "2500.5"),
            ("createdAfter", "2024-01-15"),
        ])
        .filter();

        assert_eq!(filter.status, Some(LeadStatus::Won));
        assert_eq!(filter.source, Some(LeadSource::Referral));
        assert_eq!(filter.company.as_deref(), Some("Acme"));
        assert_eq!(filter.is_qualified, Some(true));
        assert_eq!(filter.score, Range { min: Some(80), max: None });
        assert_eq!(filter.lead_value, Range { min: None, max: Some(2500.5) });
        assert_eq!(
            filter.created_at.min,
            NaiveDate::from_ymd_opt(2024, 1, 15).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert!(filter.last_activity_at.is_unbounded());
        assert_eq!(filter.created_by, None);
    }

    #[test]
    fn garbage_filter_values_impose_nothing() {
        let filter = params(&[
            ("status", "closed"),
            ("isQualified", "maybe"),
            ("scoreMin", "high"),
            ("createdBefore", "yesterday"),
            ("email", ""),
        ])
        .filter();
        assert_eq!(filter, LeadFilter::default());
    }

    #[test]
    fn request_cannot_supply_owner() {
        let parsed: LeadListParams = serde_html_form::from_str("createdBy=7&status=new").unwrap();
        assert_eq!(parsed.normalize().filter.created_by, None);
    }

    #[test]
    fn repeated_keys_keep_the_first_value() {
        let pairs = [
            ("page", "1"),
            ("page", "2"),
            ("limit", "abc"),
            ("sortBy", "score"),
            ("createdBy", "7"),
            ("sortBy", "email"),
        ]
        .map(|(k, v)| (k.to_string(), v.to_string()));
        let parsed = LeadListParams::from_pairs(pairs);
        assert_eq!(parsed.page.as_deref(), Some("1"));
        assert_eq!(parsed.sort_by.as_deref(), Some("score"));

        let query = parsed.normalize();
        assert_eq!(query.page, PageRequest::new(1, 20));
        assert_eq!(query.sort.field, SortField::Score);
        assert_eq!(query.filter.created_by, None);
    }

    #[test]
    fn timestamps_parse_in_common_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(12, 30, 0))
            .unwrap();
        assert_eq!(parse_timestamp("2024-03-01T12:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T14:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T12:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01 12:30:00.000"), Some(expected));
        assert_eq!(parse_timestamp("03/01/2024"), None);
    }

    #[test]
    fn leading_number_parsing() {
        assert_eq!(parse_leading_int("42abc"), Some(42));
        assert_eq!(parse_leading_int("  -3"), Some(-3));
        assert_eq!(parse_leading_int("x1"), None);
        assert_eq!(parse_leading_float("12.5kg"), Some(12.5));
        assert_eq!(parse_leading_float("1e3"), Some(1000.0));
        assert_eq!(parse_leading_float("."), None);
    }

    #[test]
    fn list_validation_reports_each_bad_field() {
        let bad = params(&[
            ("status", "closed"),
            ("scoreMin", "150"),
            ("valueMin", "-1"),
            ("isQualified", "yes"),
            ("createdAfter", "soon"),
            ("limit", "500"),
        ]);
        let errors = field_errors(&bad.validate().unwrap_err());
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["createdAfter", "isQualified", "scoreMin", "status", "valueMin"]
        );
        assert_eq!(errors[2].message, "Score minimum must be between 0 and 100");
        assert_eq!(errors[2].value, serde_json::json!("150"));

        assert!(params(&[("status", "won"), ("scoreMin", "80")]).validate().is_ok());
    }

    fn valid_create() -> CreateLeadForm {
        CreateLeadForm {
            first_name: Some(" Ada ".to_string()),
            last_name: Some("Lovelace".to_string()),
            email: Some("Ada@Example.com".to_string()),
            phone: Some("+15551234567".to_string()),
            company: Some("Analytical Engines".to_string()),
            city: Some("London".to_string()),
            state: Some("England".to_string()),
            source: Some("referral".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn create_form_applies_defaults() {
        let form = valid_create().trimmed();
        assert!(form.validate().is_ok());

        let owner = UserId::new(5).unwrap();
        let lead = form.to_new_lead(owner).unwrap();
        assert_eq!(lead.first_name.as_str(), "Ada");
        assert_eq!(lead.email.as_str(), "ada@example.com");
        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(lead.score.get(), 0);
        assert_eq!(lead.lead_value.get(), 0.0);
        assert!(!lead.is_qualified);
        assert_eq!(lead.created_by, owner);
    }

    #[test]
    fn create_form_keeps_notes_as_plain_text() {
        let mut form = valid_create();
        form.notes = Some("a < b & c".to_string());
        let lead = form.trimmed().to_new_lead(UserId::new(5).unwrap()).unwrap();
        assert_eq!(lead.notes.as_str(), "a < b & c");

        let mut form = valid_create();
        form.notes = Some("&".repeat(1000));
        let form = form.trimmed();
        assert!(form.validate().is_ok());
        let lead = form.to_new_lead(UserId::new(5).unwrap()).unwrap();
        assert_eq!(lead.notes.as_str().chars().count(), 1000);

        let mut form = valid_create();
        form.notes = Some("&".repeat(1001));
        let errors = field_errors(&form.trimmed().validate().unwrap_err());
        assert_eq!(errors[0].field, "notes");
        assert_eq!(errors[0].message, "Notes cannot exceed 1000 characters");
    }

    #[test]
    fn create_form_rejects_missing_and_invalid_fields() {
        let form = CreateLeadForm {
            first_name: Some("A".to_string()),
            email: Some("not-an-email".to_string()),
            phone: Some("0123".to_string()),
            source: Some("billboard".to_string()),
            score: Some(101),
            lead_value: Some(-5.0),
            ..valid_create()
        }
        .trimmed();

        let errors = field_errors(&form.validate().unwrap_err());
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["email", "firstName", "leadValue", "phone", "score", "source"]
        );

        let missing = CreateLeadForm::default();
        let errors = field_errors(&missing.validate().unwrap_err());
        assert!(
            errors
                .iter()
                .any(|e| e.field == "lastName" && e.message == "Last name is required")
        );
    }

    #[test]
    fn update_form_ignores_protected_fields() {
        let form: UpdateLeadForm = serde_json::from_value(serde_json::json!({
            "status": "won",
            "score": 90,
            "id": 99,
            "createdBy": 42,
            "createdAt": "2020-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(form.validate().is_ok());

        let patch = form.to_patch().unwrap();
        assert_eq!(patch.status, Some(LeadStatus::Won));
        assert_eq!(patch.score.map(LeadScore::get), Some(90));
        assert_eq!(patch.first_name, None);
        assert!(!patch.is_empty());
    }

    #[test]
    fn empty_update_form_yields_empty_patch() {
        let form: UpdateLeadForm = serde_json::from_str("{}").unwrap();
        assert!(form.validate().is_ok());
        assert!(form.to_patch().unwrap().is_empty());
    }

    #[test]
    fn update_form_rejects_blank_company() {
        let form = UpdateLeadForm {
            company: Some("   ".to_string()),
            ..Default::default()
        }
        .trimmed();
        let errors = field_errors(&form.validate().unwrap_err());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "company");
    }
}
