//! Typed API payloads.
//!
//! Responses are decoded with serde and then checked by `validate` before
//! they are handed to callers; a payload that decodes but violates an
//! invariant is reported as [`ApiError::DataFormat`].

use std::fmt;

use chrono::NaiveDate;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// Date format used by the API for query parameters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Default number of campaigns per page.
pub const DEFAULT_PAGE_SIZE: u32 = 5;

/// Largest page the API will serve.
pub const MAX_PAGE_SIZE: u32 = 100;

// ============================================================================
// Users
// ============================================================================

/// Role of a user within their company.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Role {
    Owner,
    Admin,
    Viewer,
    /// Missing, null or unrecognised role.
    #[default]
    Unset,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Viewer => "viewer",
            Self::Unset => "unset",
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, Self::Owner)
    }
}

impl From<Option<String>> for Role {
    fn from(value: Option<String>) -> Self {
        match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("owner") => Self::Owner,
            Some("admin") => Self::Admin,
            Some("viewer") => Self::Viewer,
            _ => Self::Unset,
        }
    }
}

impl From<Role> for Option<String> {
    fn from(role: Role) -> Self {
        match role {
            Role::Unset => None,
            other => Some(other.as_str().to_string()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roles an owner may grant when creating a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignableRole {
    Admin,
    #[default]
    Viewer,
}

impl AssignableRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Viewer => "viewer",
        }
    }
}

impl fmt::Display for AssignableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated user as returned by who-am-i.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl User {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            return Err(ApiError::DataFormat("user email is empty".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// Tokens
// ============================================================================

/// Token issued by the token exchange or a refresh.
pub struct TokenResponse {
    pub access_token: SecretString,
    pub token_type: String,
    pub refresh_token: Option<SecretString>,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}

/// Token payload as it appears on the wire.
#[derive(Deserialize)]
pub(crate) struct TokenPayload {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl TryFrom<TokenPayload> for TokenResponse {
    type Error = ApiError;

    fn try_from(payload: TokenPayload) -> Result<Self> {
        let access_token = payload
            .access_token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                ApiError::DataFormat("token response has no access_token".to_string())
            })?;

        let token_type = payload.token_type.unwrap_or_else(|| "bearer".to_string());
        if !token_type.eq_ignore_ascii_case("bearer") {
            return Err(ApiError::DataFormat(format!(
                "unsupported token type: {token_type}"
            )));
        }

        Ok(Self {
            access_token: SecretString::from(access_token),
            token_type,
            refresh_token: payload
                .refresh_token
                .filter(|token| !token.is_empty())
                .map(SecretString::from),
        })
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Account creation payload.
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("company_name", &self.company_name)
            .finish_non_exhaustive()
    }
}

/// Payload for an owner creating a user in their company.
#[derive(Clone, Serialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub role: AssignableRole,
}

impl fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Campaigns
// ============================================================================

/// Campaign summary with audience metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub name: String,
    #[serde(default)]
    pub company_id: Option<i64>,
    pub tipo_campania: String,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    pub universo_zona_metro: i64,
    pub impactos_personas: i64,
    pub impactos_vehiculos: i64,
    pub frecuencia_calculada: f64,
    pub frecuencia_promedio: f64,
    pub alcance: i64,
    pub nse_ab: f64,
    pub nse_c: f64,
    pub nse_cmas: f64,
    pub nse_d: f64,
    pub nse_dmas: f64,
    pub nse_e: f64,
    pub edad_0a14: f64,
    pub edad_15a19: f64,
    pub edad_20a24: f64,
    pub edad_25a34: f64,
    pub edad_35a44: f64,
    pub edad_45a64: f64,
    pub edad_65mas: f64,
    pub hombres: f64,
    pub mujeres: f64,
}

impl Campaign {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ApiError::DataFormat("campaign name is empty".to_string()));
        }
        if self.fecha_inicio > self.fecha_fin {
            return Err(ApiError::DataFormat(format!(
                "campaign {} ends ({}) before it starts ({})",
                self.name, self.fecha_fin, self.fecha_inicio
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignPeriod {
    pub id: i64,
    pub campaign_name: String,
    pub period: String,
    pub impactos_periodo_personas: i64,
    pub impactos_periodo_vehiculos: i64,
}

/// A single advertising site of a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSite {
    pub id: i64,
    pub campaign_name: String,
    pub codigo_del_sitio: String,
    pub tipo_de_mueble: String,
    pub tipo_de_anuncio: String,
    pub estado: String,
    pub municipio: String,
    pub zm: String,
    pub frecuencia_catorcenal: f64,
    pub frecuencia_mensual: f64,
    pub impactos_catorcenal: i64,
    pub impactos_mensuales: i64,
    pub alcance_mensual: f64,
}

/// Campaign with its per-period impacts and sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub campaign: Campaign,
    #[serde(default)]
    pub periods: Vec<CampaignPeriod>,
    #[serde(default)]
    pub sites: Vec<CampaignSite>,
}

impl CampaignDetail {
    pub(crate) fn validate(&self) -> Result<()> {
        self.campaign.validate()
    }
}

/// One page of the campaign listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignPage {
    pub data: Vec<Campaign>,
    pub total: u64,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default, rename = "pageSize")]
    pub page_size: Option<u64>,
}

impl CampaignPage {
    pub(crate) fn validate(&self) -> Result<()> {
        if (self.data.len() as u64) > self.total {
            return Err(ApiError::DataFormat(format!(
                "page holds {} campaigns but total is {}",
                self.data.len(),
                self.total
            )));
        }
        self.data.iter().try_for_each(Campaign::validate)
    }

    /// Number of pages needed to show `total` campaigns.
    pub fn page_count(&self, page_size: u32) -> u64 {
        let page_size = u64::from(page_size.max(1));
        self.total.div_ceil(page_size)
    }
}

/// Inclusive date interval with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ApiError::Validation(
                "Start date must be before end date".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Parse a range from two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub(crate) fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("start_date", self.start.format(DATE_FORMAT).to_string()),
            ("end_date", self.end.format(DATE_FORMAT).to_string()),
        ]
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        ApiError::Validation(format!("Invalid date '{value}', expected YYYY-MM-DD"))
    })
}

/// Filters and paging for the campaign listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignQuery {
    page: u32,
    page_size: u32,
    tipo_campania: Option<String>,
    date_range: Option<DateRange>,
}

impl Default for CampaignQuery {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            tipo_campania: None,
            date_range: None,
        }
    }
}

impl CampaignQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero-based page index.
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Result<Self> {
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ApiError::Validation(format!(
                "Page size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        self.page_size = page_size;
        Ok(self)
    }

    /// Filter by campaign type. Blank values are ignored.
    pub fn tipo_campania(mut self, tipo: impl Into<String>) -> Self {
        let tipo = tipo.into();
        self.tipo_campania = (!tipo.trim().is_empty()).then_some(tipo);
        self
    }

    pub fn date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn current_page(&self) -> u32 {
        self.page
    }

    pub fn current_page_size(&self) -> u32 {
        self.page_size
    }

    /// Offset of the first campaign on this page.
    pub fn skip(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("skip", self.skip().to_string()),
            ("limit", self.page_size.to_string()),
        ];
        if let Some(tipo) = &self.tipo_campania {
            pairs.push(("tipo_campania", tipo.clone()));
        }
        if let Some(range) = &self.date_range {
            pairs.extend(range.query_pairs());
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;
    use serde_json::json;

    fn campaign_json(name: &str) -> serde_json::Value {
        json!({
            "name": name,
            "company_id": 1,
            "tipo_campania": "Exterior",
            "fecha_inicio": "2024-01-01",
            "fecha_fin": "2024-03-31",
            "universo_zona_metro": 21000000,
            "impactos_personas": 1500000,
            "impactos_vehiculos": 320000,
            "frecuencia_calculada": 4.2,
            "frecuencia_promedio": 3.8,
            "alcance": 900000,
            "nse_ab": 0.1, "nse_c": 0.2, "nse_cmas": 0.15,
            "nse_d": 0.25, "nse_dmas": 0.2, "nse_e": 0.1,
            "edad_0a14": 0.1, "edad_15a19": 0.1, "edad_20a24": 0.1,
            "edad_25a34": 0.2, "edad_35a44": 0.2, "edad_45a64": 0.2,
            "edad_65mas": 0.1,
            "hombres": 0.48, "mujeres": 0.52
        })
    }

    #[test]
    fn test_role_decoding() {
        let user: User =
            serde_json::from_value(json!({"id": 1, "email": "a@b.com", "role": "viewer"}))
                .unwrap();
        assert_eq!(user.role, Role::Viewer);
        assert!(user.is_active);
        assert_eq!(user.company_id, None);

        let user: User =
            serde_json::from_value(json!({"id": 2, "email": "o@b.com", "role": null})).unwrap();
        assert_eq!(user.role, Role::Unset);

        let user: User = serde_json::from_value(json!({"id": 3, "email": "x@b.com"})).unwrap();
        assert_eq!(user.role, Role::Unset);

        let user: User =
            serde_json::from_value(json!({"id": 4, "email": "x@b.com", "role": "superuser"}))
                .unwrap();
        assert_eq!(user.role, Role::Unset);
    }

    #[test]
    fn test_role_serializes_as_string() {
        assert_eq!(serde_json::to_value(Role::Owner).unwrap(), json!("owner"));
        assert_eq!(serde_json::to_value(Role::Unset).unwrap(), json!(null));
    }

    #[test]
    fn test_token_payload_validation() {
        let payload: TokenPayload =
            serde_json::from_value(json!({"access_token": "T1", "token_type": "bearer"}))
                .unwrap();
        let token = TokenResponse::try_from(payload).unwrap();
        assert_eq!(token.access_token.expose_secret(), "T1");
        assert!(token.refresh_token.is_none());

        let payload: TokenPayload =
            serde_json::from_value(json!({"access_token": "", "token_type": "bearer"})).unwrap();
        assert!(matches!(
            TokenResponse::try_from(payload),
            Err(ApiError::DataFormat(_))
        ));

        let payload: TokenPayload = serde_json::from_value(json!({"token_type": "bearer"})).unwrap();
        assert!(TokenResponse::try_from(payload).is_err());

        let payload: TokenPayload =
            serde_json::from_value(json!({"access_token": "T1", "token_type": "mac"})).unwrap();
        assert!(TokenResponse::try_from(payload).is_err());
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let payload: TokenPayload =
            serde_json::from_value(json!({"access_token": "secret-token"})).unwrap();
        let token = TokenResponse::try_from(payload).unwrap();
        assert!(!format!("{token:?}").contains("secret-token"));
    }

    #[test]
    fn test_register_request_skips_empty_company() {
        let request = RegisterRequest {
            email: "a@b.com".to_string(),
            password: "s3cret".to_string(),
            company_name: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"email": "a@b.com", "password": "s3cret"})
        );
        assert!(!format!("{request:?}").contains("s3cret"));
    }

    #[test]
    fn test_create_user_request_role() {
        let request = CreateUserRequest {
            email: "new@b.com".to_string(),
            password: "pw".to_string(),
            role: AssignableRole::Admin,
        };
        assert_eq!(serde_json::to_value(&request).unwrap()["role"], json!("admin"));
    }

    #[test]
    fn test_campaign_detail_decoding() {
        let mut value = campaign_json("Verano");
        value["periods"] = json!([{
            "id": 1, "campaign_name": "Verano", "period": "2024-01",
            "impactos_periodo_personas": 100, "impactos_periodo_vehiculos": 20
        }]);
        value["sites"] = json!([]);

        let detail: CampaignDetail = serde_json::from_value(value).unwrap();
        assert_eq!(detail.campaign.name, "Verano");
        assert_eq!(detail.periods.len(), 1);
        assert!(detail.sites.is_empty());
        detail.validate().unwrap();
    }

    #[test]
    fn test_campaign_with_inverted_dates_is_rejected() {
        let mut value = campaign_json("Invertida");
        value["fecha_fin"] = json!("2023-12-31");
        let campaign: Campaign = serde_json::from_value(value).unwrap();
        assert!(matches!(campaign.validate(), Err(ApiError::DataFormat(_))));
    }

    #[test]
    fn test_page_validation() {
        let page: CampaignPage = serde_json::from_value(json!({
            "data": [campaign_json("A"), campaign_json("B")],
            "total": 12,
            "page": 0,
            "pageSize": 5
        }))
        .unwrap();
        page.validate().unwrap();
        assert_eq!(page.page_size, Some(5));
        assert_eq!(page.page_count(5), 3);

        let short: CampaignPage = serde_json::from_value(json!({
            "data": [campaign_json("A"), campaign_json("B")],
            "total": 1
        }))
        .unwrap();
        assert!(short.validate().is_err());

        let negative = serde_json::from_value::<CampaignPage>(json!({"data": [], "total": -1}));
        assert!(negative.is_err());
    }

    #[test]
    fn test_date_range() {
        let range = DateRange::parse("2024-01-01", "2024-02-01").unwrap();
        assert_eq!(range.start(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        DateRange::parse("2024-01-01", "2024-01-01").unwrap();

        assert_eq!(
            DateRange::parse("2024-02-01", "2024-01-01"),
            Err(ApiError::Validation(
                "Start date must be before end date".to_string()
            ))
        );
        assert!(matches!(
            DateRange::parse("01/02/2024", "2024-01-01"),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_query_pairs() {
        let query = CampaignQuery::new()
            .page(2)
            .page_size(10)
            .unwrap()
            .tipo_campania("Exterior")
            .date_range(DateRange::parse("2024-01-01", "2024-06-30").unwrap());

        assert_eq!(query.skip(), 20);
        assert_eq!(
            query.query_pairs(),
            vec![
                ("skip", "20".to_string()),
                ("limit", "10".to_string()),
                ("tipo_campania", "Exterior".to_string()),
                ("start_date", "2024-01-01".to_string()),
                ("end_date", "2024-06-30".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_defaults_and_bounds() {
        let query = CampaignQuery::new().tipo_campania("  ");
        assert_eq!(
            query.query_pairs(),
            vec![("skip", "0".to_string()), ("limit", "5".to_string())]
        );
        assert!(CampaignQuery::new().page_size(0).is_err());
        assert!(CampaignQuery::new().page_size(101).is_err());
        assert!(CampaignQuery::new().page_size(100).is_ok());
    }
}
