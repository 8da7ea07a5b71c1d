//! Integration tests for the tool listing, direct tool calls and health check.

mod common;

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};

use common::{app_state, MockModel};
use ipb_chat_server::tools::{SearchDocResponse, ToolDescriptor};
use ipb_chat_server::{configure, ErrorResponse};

macro_rules! init_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(app_state(MockModel::Text("unused".to_string()))))
                .configure(configure),
        )
        .await
    };
}

#[actix_web::test]
async fn test_list_tools() {
    let app = init_app!();

    let req = test::TestRequest::get().uri("/api/tools").to_request();
    let tools: Vec<ToolDescriptor> = test::call_and_read_body_json(&app, req).await;

    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "searchDocIPB");
    assert_eq!(
        tools[0].description,
        "Busca documentos oficiais da Igreja Presbiteriana do Brasil."
    );
    assert_eq!(tools[0].input_schema["required"], json!(["termo"]));
}

#[actix_web::test]
async fn test_call_search_doc_confissao() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/tools/searchDocIPB")
        .set_json(json!({ "termo": "confissão" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: SearchDocResponse = test::read_body_json(resp).await;
    assert_eq!(
        body.resultado,
        "**Confissão de Fé de Westminster**\n\n 📄 [Abrir documento](https://www.executivaipb.com.br/arquivos/confissao_de_westminster.pdf)"
    );
}

#[actix_web::test]
async fn test_call_search_doc_not_found() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/tools/searchDocIPB")
        .set_json(json!({ "termo": "hinário" }))
        .to_request();
    let body: SearchDocResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(
        body.resultado,
        "Nenhum documento encontrado com o termo \"hinário\"."
    );
}

#[actix_web::test]
async fn test_call_search_doc_empty_term_matches_all() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/tools/searchDocIPB")
        .set_json(json!({ "termo": "" }))
        .to_request();
    let body: SearchDocResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.resultado.matches("[Abrir documento]").count(), 3);
}

#[actix_web::test]
async fn test_call_unknown_tool_is_not_found() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/tools/searchHinario")
        .set_json(json!({ "termo": "x" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert!(body.message.contains("searchDocIPB"));
}

#[actix_web::test]
async fn test_call_tool_invalid_arguments() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/tools/searchDocIPB")
        .set_json(json!({ "term": "manual" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/tools/searchDocIPB")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/tools/searchDocIPB")
        .set_payload("{ broken")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_health() {
    let app = init_app!();

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "gemini-test");
    assert_eq!(body["documents"], 3);
}

#[actix_web::test]
async fn test_openapi_lists_chat_paths() {
    use utoipa::OpenApi;

    let doc = ipb_chat_server::ApiDoc::openapi();
    let paths: Vec<&String> = doc.paths.paths.keys().collect();
    for expected in ["/api/chat", "/api/chat/stream", "/api/tools", "/api/tools/{name}", "/health"] {
        assert!(
            paths.iter().any(|p| p.as_str() == expected),
            "missing {expected} in {paths:?}"
        );
    }
}
