//! Integration tests for the RDS client using wiremock
//!
//! These tests drive the reqwest transport through the server, catalog and
//! data product hierarchy against mocked endpoints, covering the urls each
//! operation requests and how failures surface.

use rds_sdk::models::{CommonQueryParameters, Format, SelectParameters, TabulateParameters};
use rds_sdk::rds::{http, ReqwestTransport, Server};
use rds_sdk::{AsyncResource, RdsError};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CATALOG_ID: &str = "covid19";
const DATA_PRODUCT_ID: &str = "us_jhu_ccse_country";

fn rds_server(mock: &MockServer) -> Server {
    Server::new(&format!("{}/rds/", mock.uri())).expect("mock uri should parse")
}

/// Query string of the single request the mock server received
async fn only_query(mock: &MockServer) -> Option<String> {
    let requests = mock.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1, "expected exactly one request");
    requests[0].url.query().map(str::to_string)
}

mod server_tests {
    use super::*;

    #[tokio::test]
    async fn test_api_url_keeps_port_and_drops_trailing_slash() {
        let mock = MockServer::start().await;
        let server = rds_server(&mock);

        assert_eq!(server.api_url(), format!("{}/rds", mock.uri()));
        assert_eq!(server.parsed_url().port, Some(mock.address().port()));
    }

    #[tokio::test]
    async fn test_resolve_reads_server_info() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rds/api/server/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Rich Data Services",
                "version": "1.0.2",
                "released": "2020-05-28"
            })))
            .expect(1)
            .mount(&mock)
            .await;

        let server = rds_server(&mock);
        server.resolve().await.unwrap();

        assert!(server.is_resolved());
        assert_eq!(server.info().name.as_deref(), Some("Rich Data Services"));
    }

    #[tokio::test]
    async fn test_changelog_decodes_versions() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rds/api/server/changelog"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"version": "1.0.1", "released": "2020-05-01", "fixed": ["count on empty products"]},
                {"version": "1.0.0", "released": "2020-04-01"}
            ])))
            .mount(&mock)
            .await;

        let response = rds_server(&mock).get_changelog().await.unwrap();

        assert_eq!(response.status, 200);
        let versions = response.into_body();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].fixed, vec!["count on empty products"]);
        assert!(versions[1].added.is_empty());
    }

    #[tokio::test]
    async fn test_root_catalog_lists_catalogs() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rds/api/catalog"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "root",
                "catalogCount": 1,
                "catalogs": [{"id": "covid19", "name": "COVID-19"}]
            })))
            .mount(&mock)
            .await;

        let root = rds_server(&mock).get_root_catalog().await.unwrap().into_body();

        assert_eq!(root.catalog_count, Some(1));
        let catalogs = root.catalogs.unwrap_or_default();
        assert_eq!(catalogs[0].id.as_deref(), Some("covid19"));
    }
}

mod hierarchy_tests {
    use super::*;

    #[tokio::test]
    async fn test_catalog_resolves_from_catalog_endpoint() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rds/api/catalog/covid19"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "covid19",
                "catalogCount": 10,
                "description": "fake description"
            })))
            .expect(1)
            .mount(&mock)
            .await;

        let catalog = rds_server(&mock).get_catalog(CATALOG_ID);
        catalog.resolve().await.unwrap();

        assert!(catalog.is_resolved());
        assert_eq!(catalog.catalog_count(), Some(10));
        assert_eq!(catalog.details().description.as_deref(), Some("fake description"));
    }

    #[tokio::test]
    async fn test_catalog_metadata() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rds/api/catalog/covid19/metadata"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"dataProducts": []})))
            .expect(1)
            .mount(&mock)
            .await;

        let metadata: Value = rds_server(&mock)
            .get_catalog(CATALOG_ID)
            .get_metadata()
            .await
            .unwrap()
            .into_body();

        assert_eq!(metadata["dataProducts"], json!([]));
    }

    #[tokio::test]
    async fn test_data_product_resolves_under_its_catalog() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rds/api/catalog/covid19/us_jhu_ccse_country"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": DATA_PRODUCT_ID,
                "name": "US by country",
                "recordCount": 120
            })))
            .expect(1)
            .mount(&mock)
            .await;

        let product = rds_server(&mock)
            .get_catalog(CATALOG_ID)
            .get_data_product(DATA_PRODUCT_ID);
        product.resolve().await.unwrap();

        let details = product.details();
        assert_eq!(details.name.as_deref(), Some("US by country"));
        assert_eq!(details.record_count, Some(120));
    }
}

mod query_tests {
    use super::*;

    #[tokio::test]
    async fn test_count_returns_number() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rds/api/query/covid19/us_jhu_ccse_country/count"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(2489)))
            .expect(1)
            .mount(&mock)
            .await;

        let count = rds_server(&mock)
            .get_catalog(CATALOG_ID)
            .get_data_product(DATA_PRODUCT_ID)
            .count()
            .await
            .unwrap();

        assert_eq!(count.into_body(), 2489);
    }

    #[tokio::test]
    async fn test_select_without_parameters_sends_empty_query() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rds/api/query/covid19/us_jhu_ccse_country/select"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
            .mount(&mock)
            .await;

        let product = rds_server(&mock)
            .get_catalog(CATALOG_ID)
            .get_data_product(DATA_PRODUCT_ID);
        let body: Value = product.select(None).await.unwrap().into_body();

        assert_eq!(body["records"], json!([]));
        assert_eq!(only_query(&mock).await.unwrap_or_default(), "");
    }

    #[tokio::test]
    async fn test_select_sends_encoded_parameters() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rds/api/query/covid19/us_jhu_ccse_country/select"))
            .and(query_param("limit", "10"))
            .and(query_param("cols", "V1,V2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": [[1, 2]]})))
            .expect(1)
            .mount(&mock)
            .await;

        let params = SelectParameters {
            common: CommonQueryParameters {
                limit: Some(10),
                ..Default::default()
            },
            cols: Some("V1,V2".into()),
            ..Default::default()
        };
        let body: Value = rds_server(&mock)
            .get_catalog(CATALOG_ID)
            .get_data_product(DATA_PRODUCT_ID)
            .select(Some(&params))
            .await
            .unwrap()
            .into_body();

        assert_eq!(body["records"][0], json!([1, 2]));
        let raw_query = only_query(&mock).await.unwrap();
        assert!(raw_query.contains("cols=V1%2CV2"), "raw query: {}", raw_query);
    }

    #[tokio::test]
    async fn test_tabulate_sends_lists_and_filter() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rds/api/query/covid19/us_jhu_ccse_country/tabulate"))
            .and(query_param("dims", "date_stamp"))
            .and(query_param("groupby", "a,b"))
            .and(query_param("where", "cnt>0"))
            .and(query_param("format", "gcharts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cols": [], "rows": []})))
            .expect(1)
            .mount(&mock)
            .await;

        let params = TabulateParameters {
            common: CommonQueryParameters {
                format: Some(Format::Gcharts),
                groupby: Some(vec!["a".into(), "b".into()]),
                filter: Some("cnt>0".into()),
                ..Default::default()
            },
            dims: Some("date_stamp".into()),
            ..Default::default()
        };
        let body: Value = rds_server(&mock)
            .get_catalog(CATALOG_ID)
            .get_data_product(DATA_PRODUCT_ID)
            .tabulate(Some(&params))
            .await
            .unwrap()
            .into_body();

        assert_eq!(body["rows"], json!([]));
    }
}

mod transport_tests {
    use super::*;

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rds/api/echo"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"cols": ["V1", "V2"]})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"accepted": true})))
            .expect(1)
            .mount(&mock)
            .await;

        let transport = ReqwestTransport::with_timeout(None).unwrap();
        let url = format!("{}/rds/api/echo", mock.uri());
        let response = http::post::<Value>(&transport, &url, json!({"cols": ["V1", "V2"]}))
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.into_body()["accepted"], json!(true));
    }
}

mod error_tests {
    use super::*;

    #[tokio::test]
    async fn test_404_with_json_body_returns_http_status() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rds/api/catalog/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "catalog not found"})),
            )
            .mount(&mock)
            .await;

        let catalog = rds_server(&mock).get_catalog("missing");
        let err = catalog.resolve().await.unwrap_err();

        assert_eq!(
            err,
            RdsError::HttpStatus {
                status: 404,
                status_text: "Not Found".into()
            }
        );
        assert!(!catalog.is_resolved());
    }

    #[tokio::test]
    async fn test_500_with_json_body_returns_http_status() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rds/api/server/info"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
            .mount(&mock)
            .await;

        let err = rds_server(&mock).get_info().await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "API request failed: 500 Internal Server Error");
    }

    #[tokio::test]
    async fn test_500_with_html_body_returns_decode_error() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rds/api/server/info"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .mount(&mock)
            .await;

        let err = rds_server(&mock).get_info().await.unwrap_err();

        assert!(matches!(err, RdsError::Decode(_)), "got {:?}", err);
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_404_with_empty_body_returns_decode_error() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rds/api/catalog/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock)
            .await;

        let catalog = rds_server(&mock).get_catalog("missing");
        let err = catalog.resolve().await.unwrap_err();

        assert!(matches!(err, RdsError::Decode(_)), "got {:?}", err);
        assert!(!catalog.is_resolved());
    }

    #[tokio::test]
    async fn test_non_json_success_returns_decode_error() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rds/api/query/covid19/us_jhu_ccse_country/count"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock)
            .await;

        let err = rds_server(&mock)
            .get_catalog(CATALOG_ID)
            .get_data_product(DATA_PRODUCT_ID)
            .count()
            .await
            .unwrap_err();

        assert!(matches!(err, RdsError::Decode(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_wrong_shape_returns_decode_error() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rds/api/query/covid19/us_jhu_ccse_country/count"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 1})))
            .mount(&mock)
            .await;

        let err = rds_server(&mock)
            .get_catalog(CATALOG_ID)
            .get_data_product(DATA_PRODUCT_ID)
            .count()
            .await
            .unwrap_err();

        assert!(matches!(err, RdsError::Decode(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_connection_refused_returns_transport_error() {
        // bind then release a port so nothing is listening on it
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let server = Server::new(&format!("http://127.0.0.1:{}/rds", port)).unwrap();

        let err = server.get_info().await.unwrap_err();

        assert!(matches!(err, RdsError::Transport(_)), "got {:?}", err);
        assert_eq!(err.status(), None);
    }
}
