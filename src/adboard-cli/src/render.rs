//! Text rendering of API payloads.
//!
//! Every function returns the rendered text; callers decide where it goes.

use adboard_client::models::{Campaign, CampaignDetail, CampaignPage, CampaignQuery, User};
use adboard_client::report::{
    self, CampaignReport, SiteGroup, age_breakdown, gender_breakdown, headline_metrics,
    nse_breakdown,
};
use adboard_session::{SessionState, SessionStatus};

use crate::config::Config;
use crate::styled_output::{MessageType, heading, styled_label};

const RULE_WIDTH: usize = 96;

// ============================================================================
// NUMBERS
// ============================================================================

/// Formats a number with thousand separators.
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        result.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Formats a fractional value with two decimals and thousand separators.
pub fn format_decimal(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let whole = rounded.trunc() as i64;
    let cents = ((rounded.fract().abs() * 100.0).round() as i64).min(99);
    let sign = if rounded < 0.0 && whole == 0 { "-" } else { "" };
    format!("{sign}{}.{cents:02}", format_number(whole))
}

/// Shorten `text` to `max` characters, marking the cut with `...`.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{keep}...")
}

// ============================================================================
// USERS AND SESSION
// ============================================================================

pub fn format_user(user: &User) -> String {
    let mut lines = vec![
        format!("Email:    {}", user.email),
        format!("User ID:  {}", user.id),
        format!("Role:     {}", user.role),
    ];
    match user.company_id {
        Some(company) => lines.push(format!("Company:  {company}")),
        None => lines.push("Company:  (none)".to_string()),
    }
    if !user.is_active {
        lines.push("Status:   inactive".to_string());
    }
    lines.join("\n")
}

fn status_style(status: SessionStatus) -> MessageType {
    match status {
        SessionStatus::Authenticated => MessageType::Success,
        SessionStatus::Expired => MessageType::Warning,
        SessionStatus::Checking | SessionStatus::Uninitialized => MessageType::Info,
        SessionStatus::Anonymous => MessageType::Dim,
    }
}

/// Session and configuration summary. `token` is the already masked token.
pub fn format_status(state: &SessionState, config: &Config, token: Option<&str>) -> String {
    let mut lines = vec![
        format!("API:      {}", config.api_url),
        format!("Timeout:  {}s", config.timeout.as_secs()),
        format!(
            "Session:  {}",
            styled_label(status_style(state.status), &state.status.to_string())
        ),
    ];
    if let Some(user) = &state.user {
        lines.push(format!("User:     {} ({})", user.email, user.role));
    }
    lines.push(format!("Token:    {}", token.unwrap_or("(none)")));
    lines.push(format!("Home:     {}", config.dirs.home.display()));
    lines.join("\n")
}

// ============================================================================
// CAMPAIGN LISTS
// ============================================================================

fn campaign_table(campaigns: &[Campaign]) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{:<30} {:<14} {:<10} {:<10} {:>14} {:>12}",
            "Campaign", "Type", "Start", "End", "Impacts", "Reach"
        ),
        "-".repeat(RULE_WIDTH),
    ];
    for campaign in campaigns {
        lines.push(format!(
            "{:<30} {:<14} {:<10} {:<10} {:>14} {:>12}",
            truncate(&campaign.name, 30),
            truncate(&campaign.tipo_campania, 14),
            campaign.fecha_inicio,
            campaign.fecha_fin,
            format_number(campaign.impactos_personas),
            format_number(campaign.alcance),
        ));
    }
    lines
}

/// A page of campaigns with a "page X of Y" footer.
pub fn format_campaign_page(page: &CampaignPage, query: &CampaignQuery) -> String {
    if page.data.is_empty() {
        return "No campaigns found.".to_string();
    }

    let mut lines = campaign_table(&page.data);
    let first = query.skip() + 1;
    let last = query.skip() + page.data.len() as u64;
    lines.push(String::new());
    lines.push(format!(
        "Showing {}-{} of {} (page {} of {})",
        first,
        last,
        page.total,
        query.current_page() + 1,
        page.page_count(query.current_page_size()).max(1)
    ));
    lines.join("\n")
}

pub fn format_campaign_list(campaigns: &[Campaign]) -> String {
    if campaigns.is_empty() {
        return "No campaigns found.".to_string();
    }
    let mut lines = campaign_table(campaigns);
    lines.push(String::new());
    lines.push(format!("{} campaign(s)", campaigns.len()));
    lines.join("\n")
}

// ============================================================================
// CAMPAIGN DETAIL
// ============================================================================

fn push_section(lines: &mut Vec<String>, title: &str) {
    lines.push(String::new());
    lines.push(heading(title));
    lines.push("-".repeat(RULE_WIDTH));
}

fn push_groups(lines: &mut Vec<String>, groups: &[SiteGroup], with_reach: bool) {
    lines.push(format!(
        "{:<30} {:>8} {:>16} {:>16}",
        "",
        "Sites",
        "Impacts/month",
        if with_reach { "Reach/month" } else { "" }
    ));
    for group in groups {
        let reach = if with_reach {
            format_decimal(group.alcance)
        } else {
            String::new()
        };
        lines.push(format!(
            "{:<30} {:>8} {:>16} {:>16}",
            truncate(&group.label, 30),
            group.count,
            format_number(group.impactos),
            reach
        ));
    }
}

/// Full campaign detail: headline metrics, audience breakdowns, periods and
/// sites. Period and site tables show at most `rows` rows.
pub fn format_campaign_detail(detail: &CampaignDetail, rows: usize) -> String {
    let report = CampaignReport::new(detail);
    let campaign = report.campaign;
    let mut lines = vec![
        heading(&campaign.name),
        format!(
            "{} | {} to {}",
            campaign.tipo_campania, campaign.fecha_inicio, campaign.fecha_fin
        ),
        format!(
            "Metro universe: {}   Frequency: {} calculated, {} average",
            format_number(campaign.universo_zona_metro),
            format_decimal(campaign.frecuencia_calculada),
            format_decimal(campaign.frecuencia_promedio)
        ),
    ];

    push_section(&mut lines, "Summary");
    for (label, value) in headline_metrics(campaign) {
        lines.push(format!("{:<24} {:>16}", label, format_number(value)));
    }

    push_section(&mut lines, "Audience");
    let shares = nse_breakdown(campaign)
        .into_iter()
        .chain(age_breakdown(campaign))
        .chain(gender_breakdown(campaign));
    for share in shares {
        lines.push(format!("{:<24} {:>16}", share.label, format_decimal(share.value)));
    }

    push_section(&mut lines, "Periods");
    if report.periods.periods.is_empty() {
        lines.push("No period data.".to_string());
    } else {
        lines.push(format!(
            "{:<16} {:>18} {:>18}",
            "Period", "Impacts (people)", "Impacts (vehicles)"
        ));
        for period in report.periods.periods.iter().take(rows) {
            lines.push(format!(
                "{:<16} {:>18} {:>18}",
                truncate(&period.period, 16),
                format_number(period.impactos_periodo_personas),
                format_number(period.impactos_periodo_vehiculos)
            ));
        }
        if report.periods.periods.len() > rows {
            lines.push(format!(
                "... {} more",
                report.periods.periods.len() - rows
            ));
        }
        lines.push(format!(
            "{:<16} {:>18} {:>18}",
            "TOTAL",
            format_number(report.periods.total_personas),
            format_number(report.periods.total_vehiculos)
        ));
    }

    if detail.sites.is_empty() {
        push_section(&mut lines, "Sites");
        lines.push("No site data.".to_string());
        return lines.join("\n");
    }

    push_section(&mut lines, "Sites by furniture type");
    push_groups(&mut lines, &report.by_furniture, true);

    push_section(
        &mut lines,
        &format!("Sites by state (first {})", report::MAX_STATES),
    );
    push_groups(&mut lines, &report.by_state, false);

    push_section(
        &mut lines,
        &format!("Top {} sites by monthly impacts", report::TOP_SITES),
    );
    for site in &report.top_sites {
        lines.push(format!(
            "{:<16} {:<20} {:<20} {:>16}",
            truncate(&site.codigo_del_sitio, 16),
            truncate(&site.tipo_de_mueble, 20),
            truncate(&site.municipio, 20),
            format_number(site.impactos_mensuales)
        ));
    }

    push_section(&mut lines, "Sites");
    lines.push(format!(
        "{:<16} {:<18} {:<16} {:<16} {:>14} {:>12}",
        "Code", "Furniture", "Ad type", "State", "Impacts/month", "Reach/month"
    ));
    for site in detail.sites.iter().take(rows) {
        lines.push(format!(
            "{:<16} {:<18} {:<16} {:<16} {:>14} {:>12}",
            truncate(&site.codigo_del_sitio, 16),
            truncate(&site.tipo_de_mueble, 18),
            truncate(&site.tipo_de_anuncio, 16),
            truncate(&site.estado, 16),
            format_number(site.impactos_mensuales),
            format_decimal(site.alcance_mensual)
        ));
    }
    if detail.sites.len() > rows {
        lines.push(format!("... {} more", detail.sites.len() - rows));
    }

    lines.join("\n")
}
