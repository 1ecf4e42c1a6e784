//! Campaign endpoints.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{Campaign, CampaignDetail, CampaignPage, CampaignQuery, DateRange};
use crate::request::ApiRequest;

pub const CAMPAIGNS_PATH: &str = "/campaigns/";
pub const SEARCH_BY_DATE_PATH: &str = "/campaigns/search-by-date/";

impl ApiClient {
    /// Fetch one page of campaigns.
    pub async fn list_campaigns(&self, query: &CampaignQuery) -> Result<CampaignPage> {
        let request = query
            .query_pairs()
            .into_iter()
            .fold(ApiRequest::get(CAMPAIGNS_PATH), |request, (key, value)| {
                request.with_query(key, value)
            });

        let page: CampaignPage = self.execute_json(request).await?;
        page.validate()?;
        debug!(
            returned = page.data.len(),
            total = page.total,
            "Fetched campaign page"
        );
        Ok(page)
    }

    /// Fetch a campaign with its periods and sites.
    ///
    /// Campaigns are addressed by name.
    pub async fn campaign_detail(&self, name: &str) -> Result<CampaignDetail> {
        let path = format!("{CAMPAIGNS_PATH}{}", urlencoding::encode(name));
        let detail: CampaignDetail = self.execute_json(ApiRequest::get(path)).await?;
        detail.validate()?;
        debug!(
            campaign = %detail.campaign.name,
            periods = detail.periods.len(),
            sites = detail.sites.len(),
            "Fetched campaign detail"
        );
        Ok(detail)
    }

    /// Campaigns overlapping `range`.
    pub async fn search_campaigns_by_date(&self, range: &DateRange) -> Result<Vec<Campaign>> {
        let request = range
            .query_pairs()
            .into_iter()
            .fold(ApiRequest::get(SEARCH_BY_DATE_PATH), |request, (key, value)| {
                request.with_query(key, value)
            });

        let campaigns: Vec<Campaign> = self.execute_json(request).await?;
        campaigns.iter().try_for_each(Campaign::validate)?;
        Ok(campaigns)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use adboard_login::MemoryCredentialStore;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::ClientConfig;
    use crate::error::ApiError;

    fn client_for(server: &MockServer) -> ApiClient {
        let config = ClientConfig {
            base_url: server.uri(),
            ..ClientConfig::default()
        };
        ApiClient::new(config, Arc::new(MemoryCredentialStore::with_access_token("T1"))).unwrap()
    }

    fn campaign(name: &str) -> serde_json::Value {
        json!({
            "name": name,
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

    #[tokio::test]
    async fn test_list_campaigns_sends_paging_and_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CAMPAIGNS_PATH))
            .and(query_param("skip", "10"))
            .and(query_param("limit", "5"))
            .and(query_param("tipo_campania", "Exterior"))
            .and(query_param("start_date", "2024-01-01"))
            .and(query_param("end_date", "2024-12-31"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [campaign("Verano"), campaign("Invierno")],
                "total": 12,
                "page": 2,
                "pageSize": 5
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = CampaignQuery::new()
            .page(2)
            .tipo_campania("Exterior")
            .date_range(DateRange::parse("2024-01-01", "2024-12-31").unwrap());
        let page = client_for(&server).list_campaigns(&query).await.unwrap();

        assert_eq!(page.total, 12);
        assert_eq!(page.page, Some(2));
        let names: Vec<&str> = page.data.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Verano", "Invierno"]);
    }

    #[tokio::test]
    async fn test_list_campaigns_rejects_bad_schema() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CAMPAIGNS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([campaign("A")])))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .list_campaigns(&CampaignQuery::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DataFormat(_)));
    }

    #[tokio::test]
    async fn test_campaign_detail_encodes_name() {
        let server = MockServer::start().await;
        let mut body = campaign("Verano 2024/Norte");
        body["periods"] = json!([]);
        body["sites"] = json!([]);
        Mock::given(method("GET"))
            .and(path("/campaigns/Verano%202024%2FNorte"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let detail = client_for(&server)
            .campaign_detail("Verano 2024/Norte")
            .await
            .unwrap();
        assert_eq!(detail.campaign.name, "Verano 2024/Norte");
    }

    #[tokio::test]
    async fn test_campaign_detail_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/campaigns/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"detail": "Campaign not found"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .campaign_detail("missing")
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::NotFound("Campaign not found".to_string()));
    }

    #[tokio::test]
    async fn test_search_by_date() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SEARCH_BY_DATE_PATH))
            .and(query_param("start_date", "2024-01-01"))
            .and(query_param("end_date", "2024-02-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([campaign("Verano")])))
            .expect(1)
            .mount(&server)
            .await;

        let range = DateRange::parse("2024-01-01", "2024-02-01").unwrap();
        let campaigns = client_for(&server)
            .search_campaigns_by_date(&range)
            .await
            .unwrap();
        assert_eq!(campaigns.len(), 1);
    }
}
