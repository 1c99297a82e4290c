#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use medibot_agent::AgentClient;
use medibot_core::MediResult;
use medibot_gateway::GatewayServer;
use medibot_meds::{
    InMemorySearchLogStore, Medication, MedicationCatalog, MedicationService, SearchLogStore,
};
use medibot_metrics::{InMemoryMetricsStore, MetricsAggregator};
use medibot_session::{InMemorySessionStore, InMemoryTranscriptStore, SessionManager};
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

struct StubAgent;

#[async_trait]
impl AgentClient for StubAgent {
    async fn invoke(&self, _session_id: Uuid, _input_text: &str) -> MediResult<String> {
        Ok("Claro, puedo ayudarte con eso".to_string())
    }
}

fn catalog() -> MedicationCatalog {
    MedicationCatalog::from_entries(vec![
        Medication {
            commercial_name: "Advil".into(),
            generic_name: "ibuprofeno".into(),
            description: "Antiinflamatorio no esteroideo".into(),
            common_uses: vec!["dolor de cabeza".into(), "fiebre".into()],
            recommended_dose: "400 mg cada 8 horas".into(),
            requires_prescription: false,
            warning: "No exceder 1200 mg al día".into(),
        },
        Medication {
            commercial_name: String::new(),
            generic_name: "amoxicilina".into(),
            description: "Antibiótico de amplio espectro".into(),
            common_uses: vec!["infección".into()],
            recommended_dose: "500 mg cada 8 horas".into(),
            requires_prescription: true,
            warning: "Completar el tratamiento indicado".into(),
        },
    ])
}

/// Helper: build a test server on a random port, returning its base URL.
async fn start_test_server() -> String {
    let metrics = Arc::new(MetricsAggregator::with_default_zone(Arc::new(
        InMemoryMetricsStore::new(),
    )));
    let manager = Arc::new(SessionManager::new(
        Arc::new(InMemorySessionStore::new()),
        Arc::new(InMemoryTranscriptStore::new()),
        Arc::new(StubAgent),
        metrics.clone(),
    ));
    let search_log: Arc<dyn SearchLogStore> = Arc::new(InMemorySearchLogStore::new());
    let meds = Arc::new(MedicationService::new(
        Arc::new(catalog()),
        search_log.clone(),
    ));

    let app = GatewayServer::build(manager, metrics, meds, search_log);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Small yield to let the server task start
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{}", addr.port())
}

async fn open_session(client: &reqwest::Client, base: &str, symptom: &str) -> String {
    let resp = client
        .post(format!("{base}/api/sala/crearSala"))
        .json(&serde_json::json!({
            "userId": "u-1",
            "dolor": symptom,
            "nombre": "Ana"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "OK");
    assert_eq!(body["data"]["respuesta"], "Claro, puedo ayudarte con eso");
    body["data"]["sessionId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let base = start_test_server().await;
    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "medibot");
}

#[tokio::test]
async fn test_crear_sala_missing_fields_is_400() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/sala/crearSala"))
        .json(&serde_json::json!({"userId": "u-1", "dolor": "  ", "nombre": "Ana"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "Error");
    assert_eq!(body["message"], "Faltan campos requeridos");
}

#[tokio::test]
async fn test_full_conversation_flow() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    let session_id = open_session(&client, &base, "cabeza").await;

    let resp = client
        .post(format!("{base}/api/sala/mensaje"))
        .json(&serde_json::json!({
            "sessionId": session_id,
            "userId": "u-1",
            "message": "me sigue doliendo"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["respuesta"], "Claro, puedo ayudarte con eso");

    // Transcript: opening pair plus the follow-up pair, user before bot.
    let resp = client
        .get(format!("{base}/api/sala/conversacion"))
        .query(&[("sessionId", session_id.as_str())])
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    let messages = body["data"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "bot");
    assert_eq!(messages[2]["role"], "user");
    assert_eq!(messages[2]["text"], "me sigue doliendo");
    assert_eq!(messages[3]["role"], "bot");

    // Only the follow-up turn is metered; the opening turn never is.
    let resp = client
        .get(format!("{base}/api/sala/metrica"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    let days = body["data"]["dias"].as_array().unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0]["total_consultas"], 1);
    assert_eq!(body["data"]["resumen"]["total_consultas"], 1);

    // The reported symptom shows up in the frequency ranking.
    let resp = client
        .get(format!("{base}/api/sala/getDolorFrecuentes"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    let ranked = body["data"].as_array().unwrap();
    assert!(ranked
        .iter()
        .any(|r| r["dolor"] == "cabeza" && r["veces_reportado"].as_u64().unwrap() >= 1));
}

#[tokio::test]
async fn test_dolor_frecuentes_default_limit_is_ten() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    let symptoms = [
        "cabeza", "espalda", "rodilla", "cuello", "hombro", "estomago", "garganta",
    ];
    for symptom in symptoms {
        open_session(&client, &base, symptom).await;
    }

    // All seven distinct symptoms fit under the default cut of ten.
    let resp = client
        .get(format!("{base}/api/sala/getDolorFrecuentes"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), symptoms.len());

    // An explicit limit still truncates.
    let resp = client
        .get(format!("{base}/api/sala/getDolorFrecuentes"))
        .query(&[("limite", "3")])
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_mensaje_unknown_session_is_404() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/sala/mensaje"))
        .json(&serde_json::json!({
            "sessionId": Uuid::new_v4(),
            "userId": "u-1",
            "message": "hola"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "Error");
}

#[tokio::test]
async fn test_missing_or_malformed_session_id_keeps_error_envelope() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    // Absent sessionId still answers with the JSON envelope, not a bare
    // extractor rejection.
    let resp = client
        .get(format!("{base}/api/sala/conversacion"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "Error");
    assert_eq!(body["message"], "El parámetro sessionId es obligatorio");

    let resp = client
        .get(format!("{base}/api/sala/conversacion"))
        .query(&[("sessionId", "no-un-uuid")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "Error");

    let resp = client
        .post(format!("{base}/api/sala/mensaje"))
        .json(&serde_json::json!({"userId": "u-1", "message": "hola"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "Error");

    let resp = client
        .post(format!("{base}/api/sala/cerrar"))
        .json(&serde_json::json!({"sessionId": "tampoco"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "Error");
}

#[tokio::test]
async fn test_sesiones_usuario_lists_only_that_user() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    open_session(&client, &base, "espalda").await;

    let resp = client
        .get(format!("{base}/api/sala/sesionesUsuario"))
        .query(&[("userId", "u-1")])
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let resp = client
        .get(format!("{base}/api/sala/sesionesUsuario"))
        .query(&[("userId", "otro")])
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_metrica_without_data_is_404() {
    let base = start_test_server().await;
    let resp = reqwest::get(format!("{base}/api/sala/metrica")).await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_metrica_bad_date_is_400() {
    let base = start_test_server().await;
    let resp = reqwest::get(format!("{base}/api/sala/metrica?fecha=15-01-2024"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_feedback_flow() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    // Non-numeric score is rejected before touching the store.
    let resp = client
        .post(format!("{base}/api/sala/feedback"))
        .json(&serde_json::json!({"feedback": "muy útil", "satisfaccion": "cinco"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // No bucket yet for today: valid feedback has nowhere to land.
    let resp = client
        .post(format!("{base}/api/sala/feedback"))
        .json(&serde_json::json!({"feedback": "muy útil", "satisfaccion": 5}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // One metered turn creates the bucket, then feedback folds in.
    let session_id = open_session(&client, &base, "cabeza").await;
    client
        .post(format!("{base}/api/sala/mensaje"))
        .json(&serde_json::json!({
            "sessionId": session_id,
            "userId": "u-1",
            "message": "gracias"
        }))
        .send()
        .await
        .unwrap();

    let resp = client
        .post(format!("{base}/api/sala/feedback"))
        .json(&serde_json::json!({"feedback": "muy útil", "satisfaccion": 4}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["porcentaje_satisfaccion"], 4.0);
}

#[tokio::test]
async fn test_medication_lookups_and_search_ranking() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    // Two common-use searches hit ibuprofeno, one misses entirely.
    for term in ["dolor de cabeza", "fiebre", "insomnio"] {
        let resp = client
            .get(format!("{base}/api/MediBot/getUsoComun"))
            .query(&[("uso_comun", term)])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let resp = client
        .get(format!("{base}/api/sala/getMedicamentosBuscados"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    let ranked = body["data"].as_array().unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0]["medicamento"], "Advil");
    assert_eq!(ranked[0]["veces_recomendado"], 2);

    // Name lookup works on the generic name too.
    let resp = client
        .get(format!("{base}/api/MediBot/medicamento"))
        .query(&[("nombre", "ibuprofeno")])
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["nombre_comercial"], "Advil");

    let resp = client
        .get(format!("{base}/api/MediBot/receta"))
        .query(&[("nombre", "amoxicilina")])
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["requiere_receta"], true);

    let resp = client
        .get(format!("{base}/api/MediBot/medicamento"))
        .query(&[("nombre", "aspirina")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
