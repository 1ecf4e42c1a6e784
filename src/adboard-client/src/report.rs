//! Aggregations behind the campaign detail views.
//!
//! Pure functions over decoded payloads; nothing here touches the network.

use indexmap::IndexMap;

use crate::models::{Campaign, CampaignDetail, CampaignPeriod, CampaignSite};

/// Number of states shown in the per-state breakdown.
pub const MAX_STATES: usize = 8;

/// Number of sites in the top-sites ranking.
pub const TOP_SITES: usize = 10;

/// Period impacts in chronological order with their totals.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSummary<'a> {
    pub periods: Vec<&'a CampaignPeriod>,
    pub total_personas: i64,
    pub total_vehiculos: i64,
}

/// Sort periods by their label (`YYYY-MM` labels sort chronologically).
pub fn period_summary(periods: &[CampaignPeriod]) -> PeriodSummary<'_> {
    let mut sorted: Vec<&CampaignPeriod> = periods.iter().collect();
    sorted.sort_by(|a, b| a.period.cmp(&b.period));
    PeriodSummary {
        total_personas: sorted.iter().map(|p| p.impactos_periodo_personas).sum(),
        total_vehiculos: sorted.iter().map(|p| p.impactos_periodo_vehiculos).sum(),
        periods: sorted,
    }
}

/// Sites sharing a label, with summed monthly metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteGroup {
    pub label: String,
    pub count: usize,
    pub impactos: i64,
    pub alcance: f64,
}

/// Group sites by `key`, keeping groups in first-seen order.
fn group_sites<F>(sites: &[CampaignSite], key: F) -> Vec<SiteGroup>
where
    F: Fn(&CampaignSite) -> &str,
{
    let mut groups: IndexMap<&str, SiteGroup> = IndexMap::new();
    for site in sites {
        let label = key(site);
        let group = groups.entry(label).or_insert_with(|| SiteGroup {
            label: label.to_string(),
            count: 0,
            impactos: 0,
            alcance: 0.0,
        });
        group.count += 1;
        group.impactos += site.impactos_mensuales;
        group.alcance += site.alcance_mensual;
    }
    groups.into_values().collect()
}

/// Sites grouped by furniture type (`tipo_de_mueble`).
pub fn sites_by_furniture(sites: &[CampaignSite]) -> Vec<SiteGroup> {
    group_sites(sites, |site| site.tipo_de_mueble.as_str())
}

/// Sites grouped by state, first [`MAX_STATES`] states in first-seen order.
pub fn sites_by_state(sites: &[CampaignSite]) -> Vec<SiteGroup> {
    let mut groups = group_sites(sites, |site| site.estado.as_str());
    groups.truncate(MAX_STATES);
    groups
}

/// The [`TOP_SITES`] sites with the most monthly impacts.
///
/// Ties keep their original order.
pub fn top_sites(sites: &[CampaignSite]) -> Vec<&CampaignSite> {
    let mut ranked: Vec<&CampaignSite> = sites.iter().collect();
    ranked.sort_by(|a, b| b.impactos_mensuales.cmp(&a.impactos_mensuales));
    ranked.truncate(TOP_SITES);
    ranked
}

/// A labelled audience share.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Share {
    pub label: &'static str,
    pub value: f64,
}

const fn share(label: &'static str, value: f64) -> Share {
    Share { label, value }
}

/// Headline reach metrics of a campaign.
pub fn headline_metrics(campaign: &Campaign) -> [(&'static str, i64); 3] {
    [
        ("Impactos Personas", campaign.impactos_personas),
        ("Impactos Vehículos", campaign.impactos_vehiculos),
        ("Alcance", campaign.alcance),
    ]
}

/// Socioeconomic level (NSE) distribution.
pub fn nse_breakdown(campaign: &Campaign) -> [Share; 6] {
    [
        share("NSE AB", campaign.nse_ab),
        share("NSE C", campaign.nse_c),
        share("NSE C+", campaign.nse_cmas),
        share("NSE D", campaign.nse_d),
        share("NSE D+", campaign.nse_dmas),
        share("NSE E", campaign.nse_e),
    ]
}

/// Age distribution.
pub fn age_breakdown(campaign: &Campaign) -> [Share; 7] {
    [
        share("0-14", campaign.edad_0a14),
        share("15-19", campaign.edad_15a19),
        share("20-24", campaign.edad_20a24),
        share("25-34", campaign.edad_25a34),
        share("35-44", campaign.edad_35a44),
        share("45-64", campaign.edad_45a64),
        share("65+", campaign.edad_65mas),
    ]
}

/// Gender distribution.
pub fn gender_breakdown(campaign: &Campaign) -> [Share; 2] {
    [
        share("Hombres", campaign.hombres),
        share("Mujeres", campaign.mujeres),
    ]
}

/// Everything the detail view renders, computed once.
#[derive(Debug, Clone)]
pub struct CampaignReport<'a> {
    pub campaign: &'a Campaign,
    pub periods: PeriodSummary<'a>,
    pub by_furniture: Vec<SiteGroup>,
    pub by_state: Vec<SiteGroup>,
    pub top_sites: Vec<&'a CampaignSite>,
}

impl<'a> CampaignReport<'a> {
    pub fn new(detail: &'a CampaignDetail) -> Self {
        Self {
            campaign: &detail.campaign,
            periods: period_summary(&detail.periods),
            by_furniture: sites_by_furniture(&detail.sites),
            by_state: sites_by_state(&detail.sites),
            top_sites: top_sites(&detail.sites),
        }
    }
}
