use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use return_freight::build_router;
use return_freight::config::environment::EnvironmentConfig;
use return_freight::repositories::Repositories;
use return_freight::state::AppState;

const BOUNDARY: &str = "----return-freight-boundary";

struct TestApp {
    router: Router,
    uploads: TempDir,
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl TestApp {
    fn new() -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let config = EnvironmentConfig {
            upload_dir: uploads.path().to_path_buf(),
            bcrypt_cost: 4,
            ..Default::default()
        };
        let state = AppState::new(Repositories::in_memory(), config);
        Self {
            router: build_router(state),
            uploads,
        }
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            body,
        }
    }

    async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.call(Method::GET, uri, token, None).await
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.call(Method::POST, uri, token, Some(body)).await
    }

    async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.call(Method::PATCH, uri, token, Some(body)).await
    }

    /// Registra un usuario y devuelve su token
    async fn register_and_login(&self, email: &str, role: &str) -> String {
        let mut payload = json!({
            "email": email,
            "password": "123456",
            "name": "Usuário Teste",
            "role": role,
        });
        if role == "DRIVER" {
            payload["driverLicense"] = json!("12345678901");
        }
        let registered = self.post("/api/auth/register", None, payload).await;
        assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.body);

        let login = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": email, "password": "123456" }),
            )
            .await;
        assert_eq!(login.status, StatusCode::OK, "{}", login.body);
        login.body["token"].as_str().unwrap().to_string()
    }

    async fn create_vehicle(&self, token: &str, plate: &str) -> String {
        let response = self
            .post(
                "/api/vehicles",
                Some(token),
                json!({
                    "type": "TRUCK_LARGE",
                    "brand": "Scania",
                    "model": "R 450",
                    "year": 2020,
                    "plate": plate,
                    "capacity": 25
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["vehicle"]["id"].as_str().unwrap().to_string()
    }

    async fn create_availability(&self, token: &str, vehicle_id: &str, origin: &str, date: &str, capacity: Value) -> String {
        let response = self
            .post(
                "/api/availabilities",
                Some(token),
                json!({
                    "vehicleId": vehicle_id,
                    "originCity": origin,
                    "originState": "SP",
                    "destinationCity": "Curitiba",
                    "destinationState": "PR",
                    "availableDate": date,
                    "availableCapacity": capacity
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["availability"]["id"].as_str().unwrap().to_string()
    }

    async fn upload(&self, token: &str, vehicle_id: &str, content_type: &str, data: &[u8], is_primary: bool) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/upload")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(vehicle_id, content_type, data, is_primary)))
            .unwrap();
        self.send(request).await
    }
}

fn multipart_body(vehicle_id: &str, content_type: &str, data: &[u8], is_primary: bool) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"vehicleId\"\r\n\r\n{id}\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"isPrimary\"\r\n\r\n{primary}\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"truck.jpg\"\r\n\
             Content-Type: {ct}\r\n\r\n",
            b = BOUNDARY,
            id = vehicle_id,
            primary = is_primary,
            ct = content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn tomorrow() -> String {
    days_from_now(1)
}

fn days_from_now(days: i64) -> String {
    (Utc::now() + Duration::days(days)).format("%Y-%m-%d").to_string()
}

fn origins(response: &TestResponse) -> Vec<String> {
    response.body["availabilities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["originCity"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_driver_registration_requires_license() {
    let app = TestApp::new();
    let response = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "email": "joao@example.com",
                "password": "123456",
                "name": "João Silva",
                "role": "DRIVER"
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "VALIDATION_ERROR");
    assert!(response.body["details"]["driverLicense"].is_array());
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let app = TestApp::new();
    app.register_and_login("cliente@example.com", "CLIENT").await;

    let response = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "email": "cliente@example.com",
                "password": "654321",
                "name": "Outro Cliente",
                "role": "CLIENT"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Email já cadastrado");
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app = TestApp::new();
    app.register_and_login("cliente@example.com", "CLIENT").await;

    let response = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "cliente@example.com", "password": "errada" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "Credenciais inválidas");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_protected_endpoints_require_session() {
    let app = TestApp::new();

    let response = app.get("/api/vehicles", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["code"], "UNAUTHORIZED");

    let response = app.get("/api/users/profile", Some("token-invalido")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_cookie_login_and_logout() {
    let app = TestApp::new();
    app.register_and_login("cliente@example.com", "CLIENT").await;

    let login = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "cliente@example.com", "password": "123456" }),
        )
        .await;
    let set_cookie = login.headers[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(set_cookie.starts_with("session-token="));
    assert!(set_cookie.contains("HttpOnly"));

    let session = set_cookie.split(';').next().unwrap().to_string();
    let request = Request::builder()
        .uri("/api/users/profile")
        .header(header::COOKIE, &session)
        .body(Body::empty())
        .unwrap();
    let profile = app.send(request).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["email"], "cliente@example.com");
    assert!(profile.body.get("passwordHash").is_none());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/logout")
        .header(header::COOKIE, &session)
        .body(Body::empty())
        .unwrap();
    let logout = app.send(request).await;
    assert_eq!(logout.status, StatusCode::OK);
    let cleared = logout.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cleared.starts_with("session-token="));
}

#[tokio::test]
async fn test_dashboard_gate_redirects_without_cookie() {
    let app = TestApp::new();
    let response = app.get("/dashboard/vehicles", None).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers[header::LOCATION],
        "/login?from=%2Fdashboard%2Fvehicles"
    );
}

#[tokio::test]
async fn test_clients_cannot_create_vehicles() {
    let app = TestApp::new();
    let client = app.register_and_login("cliente@example.com", "CLIENT").await;

    let response = app
        .post(
            "/api/vehicles",
            Some(&client),
            json!({
                "type": "VAN",
                "brand": "Fiat",
                "model": "Ducato",
                "year": 2021,
                "plate": "XYZ9A87",
                "capacity": 3
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_duplicate_plate_is_rejected() {
    let app = TestApp::new();
    let driver = app.register_and_login("motorista@example.com", "DRIVER").await;
    app.create_vehicle(&driver, "ABC1D23").await;

    let response = app
        .post(
            "/api/vehicles",
            Some(&driver),
            json!({
                "type": "TRUCK_SMALL",
                "brand": "VW",
                "model": "Delivery",
                "year": 2019,
                "plate": "abc1d23",
                "capacity": 4
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Placa já cadastrada");
}

#[tokio::test]
async fn test_driver_cannot_patch_foreign_vehicle() {
    let app = TestApp::new();
    let owner = app.register_and_login("dono@example.com", "DRIVER").await;
    let other = app.register_and_login("outro@example.com", "DRIVER").await;
    let vehicle_id = app.create_vehicle(&owner, "ABC1D23").await;

    let response = app
        .patch(
            &format!("/api/vehicles/{}", vehicle_id),
            Some(&other),
            json!({ "brand": "Volvo" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let vehicle = app.get(&format!("/api/vehicles/{}", vehicle_id), None).await;
    assert_eq!(vehicle.body["vehicle"]["brand"], "Scania");
}

#[tokio::test]
async fn test_invalid_path_id_is_bad_request() {
    let app = TestApp::new();
    let response = app.get("/api/vehicles/nao-e-uuid", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_photo_upload_rules() {
    let app = TestApp::new();
    let driver = app.register_and_login("motorista@example.com", "DRIVER").await;
    let vehicle_id = app.create_vehicle(&driver, "ABC1D23").await;

    // Demasiado grande: 400 y ningún registro
    let too_big = vec![0u8; 6 * 1024 * 1024];
    let response = app.upload(&driver, &vehicle_id, "image/jpeg", &too_big, true).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Tipo no permitido
    let response = app.upload(&driver, &vehicle_id, "image/gif", b"GIF89a", false).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let vehicle = app.get(&format!("/api/vehicles/{}", vehicle_id), None).await;
    assert_eq!(vehicle.body["vehicle"]["photos"].as_array().unwrap().len(), 0);

    // Vehículo de otro motorista
    let other = app.register_and_login("outro@example.com", "DRIVER").await;
    let response = app.upload(&other, &vehicle_id, "image/jpeg", b"jpeg", false).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_primary_photo_is_unique() {
    let app = TestApp::new();
    let driver = app.register_and_login("motorista@example.com", "DRIVER").await;
    let vehicle_id = app.create_vehicle(&driver, "ABC1D23").await;

    let first = app.upload(&driver, &vehicle_id, "image/jpeg", b"first", true).await;
    assert_eq!(first.status, StatusCode::CREATED, "{}", first.body);
    let first_url = first.body["photo"]["url"].as_str().unwrap().to_string();
    assert!(first_url.starts_with("/uploads/vehicles/"));
    assert!(first_url.ends_with(".jpg"));

    let second = app.upload(&driver, &vehicle_id, "image/png", b"second", true).await;
    assert_eq!(second.status, StatusCode::CREATED);
    let second_id = second.body["photo"]["id"].as_str().unwrap().to_string();

    let vehicle = app.get(&format!("/api/vehicles/{}", vehicle_id), None).await;
    let photos = vehicle.body["vehicle"]["photos"].as_array().unwrap().clone();
    assert_eq!(photos.len(), 2);
    let primaries: Vec<_> = photos.iter().filter(|p| p["isPrimary"] == true).collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0]["id"], second_id.as_str());

    // El archivo se sirve bajo /uploads
    let file = app
        .send(Request::builder().uri(&first_url).body(Body::empty()).unwrap())
        .await;
    assert_eq!(file.status, StatusCode::OK);

    // Borrar la foto elimina registro y archivo
    let first_id = first.body["photo"]["id"].as_str().unwrap();
    let deleted = app
        .call(
            Method::DELETE,
            &format!("/api/upload?id={}", first_id),
            Some(&driver),
            None,
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    let file_name = first_url.trim_start_matches("/uploads/");
    assert!(!app.uploads.path().join(file_name).exists());

    let missing = app.call(Method::DELETE, "/api/upload", Some(&driver), None).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["error"], "ID da foto é obrigatório");
}

#[tokio::test]
async fn test_search_by_origin_city() {
    let app = TestApp::new();
    let driver = app.register_and_login("motorista@example.com", "DRIVER").await;
    let vehicle_id = app.create_vehicle(&driver, "ABC1D23").await;

    for (city, state) in [("São Paulo", "SP"), ("Campinas", "SP"), ("Rio de Janeiro", "RJ")] {
        let response = app
            .post(
                "/api/availabilities",
                Some(&driver),
                json!({
                    "vehicleId": vehicle_id,
                    "originCity": city,
                    "originState": state,
                    "destinationCity": "Curitiba",
                    "destinationState": "pr",
                    "availableDate": tomorrow(),
                    "availableCapacity": 10
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        assert_eq!(response.body["availability"]["destinationState"], "PR");
    }

    let response = app
        .get("/api/availabilities/search?originCity=S%C3%A3o%20Paulo", None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let items = response.body["availabilities"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["originCity"], "São Paulo");
    assert_eq!(response.body["pagination"]["total"], 1);
    assert_eq!(response.body["pagination"]["totalPages"], 1);

    let bad = app.get("/api/availabilities/search?limit=0", None).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_availability_on_foreign_vehicle_is_forbidden() {
    let app = TestApp::new();
    let owner = app.register_and_login("dono@example.com", "DRIVER").await;
    let other = app.register_and_login("outro@example.com", "DRIVER").await;
    let vehicle_id = app.create_vehicle(&owner, "ABC1D23").await;

    let response = app
        .post(
            "/api/availabilities",
            Some(&other),
            json!({
                "vehicleId": vehicle_id,
                "originCity": "Rio de Janeiro",
                "originState": "RJ",
                "destinationCity": "São Paulo",
                "destinationState": "SP",
                "availableDate": tomorrow(),
                "availableCapacity": 10
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "Veículo não encontrado ou sem permissão");
}

#[tokio::test]
async fn test_chat_is_shared_by_the_pair() {
    let app = TestApp::new();
    let client = app.register_and_login("cliente@example.com", "CLIENT").await;
    let driver = app.register_and_login("motorista@example.com", "DRIVER").await;

    let driver_id = app.get("/api/users/profile", Some(&driver)).await.body["id"].clone();
    let client_id = app.get("/api/users/profile", Some(&client)).await.body["id"].clone();

    let first = app
        .post("/api/chats", Some(&client), json!({ "participantId": driver_id }))
        .await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app
        .post("/api/chats", Some(&driver), json!({ "participantId": client_id }))
        .await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(first.body["chat"]["id"], second.body["chat"]["id"]);

    let own = app
        .post("/api/chats", Some(&client), json!({ "participantId": client_id }))
        .await;
    assert_eq!(own.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_end_to_end_return_freight_flow() {
    let app = TestApp::new();

    // Motorista con vehículo y disponibilidad RJ → SP para mañana
    let driver = app.register_and_login("motorista@example.com", "DRIVER").await;
    let vehicle_id = app.create_vehicle(&driver, "ABC1D23").await;
    let created = app
        .post(
            "/api/availabilities",
            Some(&driver),
            json!({
                "vehicleId": vehicle_id,
                "originCity": "Rio de Janeiro",
                "originState": "RJ",
                "destinationCity": "São Paulo",
                "destinationState": "SP",
                "availableDate": tomorrow(),
                "availableCapacity": 20,
                "priceEstimate": 1500
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    let availability_id = created.body["availability"]["id"].clone();
    let driver_id = created.body["availability"]["userId"].clone();

    // Cliente encuentra la oferta
    let client = app.register_and_login("cliente@example.com", "CLIENT").await;
    let search = app
        .get("/api/availabilities/search?destinationState=SP", Some(&client))
        .await;
    assert_eq!(search.status, StatusCode::OK);
    let found = search.body["availabilities"]
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["id"] == availability_id)
        .cloned()
        .unwrap();
    assert_eq!(found["user"]["id"], driver_id);
    assert_eq!(found["vehicle"]["type"], "TRUCK_LARGE");

    // El listado del cliente también la muestra
    let listed = app.get("/api/availabilities", Some(&client)).await;
    assert_eq!(listed.body["availabilities"].as_array().unwrap().len(), 1);

    // Chat y mensaje
    let chat = app
        .post("/api/chats", Some(&client), json!({ "participantId": driver_id }))
        .await;
    let chat_id = chat.body["chat"]["id"].as_str().unwrap().to_string();

    let sent = app
        .post(
            "/api/messages",
            Some(&client),
            json!({ "chatId": chat_id, "content": "Interessado" }),
        )
        .await;
    assert_eq!(sent.status, StatusCode::CREATED);
    assert_eq!(sent.body["data"]["read"], false);

    let chats = app.get("/api/chats", Some(&driver)).await;
    assert_eq!(chats.body["chats"][0]["unreadCount"], 1);
    assert_eq!(chats.body["chats"][0]["lastMessage"]["content"], "Interessado");

    // Abrir el chat marca los mensajes como leídos
    let opened = app.get(&format!("/api/chats/{}", chat_id), Some(&driver)).await;
    assert_eq!(opened.status, StatusCode::OK);
    assert_eq!(opened.body["chat"]["messages"][0]["content"], "Interessado");

    let chats = app.get("/api/chats", Some(&driver)).await;
    assert_eq!(chats.body["chats"][0]["unreadCount"], 0);

    // Tercero no ve el chat
    let outsider = app.register_and_login("outro@example.com", "CLIENT").await;
    let hidden = app.get(&format!("/api/chats/{}", chat_id), Some(&outsider)).await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);

    // El motorista cierra la oferta y deja de aparecer en la búsqueda
    let completed = app
        .patch(
            &format!("/api/availabilities/{}", availability_id.as_str().unwrap()),
            Some(&driver),
            json!({ "status": "COMPLETED" }),
        )
        .await;
    assert_eq!(completed.status, StatusCode::OK);
    let search = app.get("/api/availabilities/search?destinationState=SP", None).await;
    assert_eq!(search.body["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_availability_list_depends_on_role() {
    let app = TestApp::new();
    let driver = app.register_and_login("motorista@example.com", "DRIVER").await;
    let other = app.register_and_login("outro@example.com", "DRIVER").await;
    let client = app.register_and_login("cliente@example.com", "CLIENT").await;
    let vehicle_id = app.create_vehicle(&driver, "ABC1D23").await;
    let other_vehicle = app.create_vehicle(&other, "XYZ9A87").await;

    app.create_availability(&driver, &vehicle_id, "Santos", &days_from_now(3), json!(10)).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    app.create_availability(&driver, &vehicle_id, "Sorocaba", &days_from_now(-2), json!(10)).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let paused = app
        .create_availability(&driver, &vehicle_id, "Jundiaí", &days_from_now(2), json!(10))
        .await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    app.create_availability(&other, &other_vehicle, "Campinas", &days_from_now(1), json!(10)).await;

    let response = app
        .patch(
            &format!("/api/availabilities/{}", paused),
            Some(&driver),
            json!({ "status": "INACTIVE" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // Motorista: todas sus ofertas, la más reciente primero
    let mine = app.get("/api/availabilities", Some(&driver)).await;
    assert_eq!(mine.status, StatusCode::OK);
    assert_eq!(origins(&mine), vec!["Jundiaí", "Sorocaba", "Santos"]);

    // Cliente: sólo activas y futuras, fecha más próxima primero
    let listed = app.get("/api/availabilities", Some(&client)).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(origins(&listed), vec!["Campinas", "Santos"]);

    let anonymous = app.get("/api/availabilities", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_client_availability_list_is_capped() {
    let app = TestApp::new();
    let driver = app.register_and_login("motorista@example.com", "DRIVER").await;
    let client = app.register_and_login("cliente@example.com", "CLIENT").await;
    let vehicle_id = app.create_vehicle(&driver, "ABC1D23").await;

    for i in 0..55 {
        app.create_availability(&driver, &vehicle_id, &format!("Cidade {}", i), &tomorrow(), json!(5))
            .await;
    }

    let listed = app.get("/api/availabilities", Some(&client)).await;
    assert_eq!(listed.body["availabilities"].as_array().unwrap().len(), 50);

    let mine = app.get("/api/availabilities", Some(&driver)).await;
    assert_eq!(mine.body["availabilities"].as_array().unwrap().len(), 55);
}

#[tokio::test]
async fn test_foreign_availability_cannot_be_changed() {
    let app = TestApp::new();
    let owner = app.register_and_login("dono@example.com", "DRIVER").await;
    let other = app.register_and_login("outro@example.com", "DRIVER").await;
    let vehicle_id = app.create_vehicle(&owner, "ABC1D23").await;
    let availability_id = app
        .create_availability(&owner, &vehicle_id, "Santos", &tomorrow(), json!(10))
        .await;
    let uri = format!("/api/availabilities/{}", availability_id);

    let patched = app
        .patch(&uri, Some(&other), json!({ "originCity": "Guarujá", "status": "COMPLETED" }))
        .await;
    assert_eq!(patched.status, StatusCode::FORBIDDEN);

    let deleted = app.call(Method::DELETE, &uri, Some(&other), None).await;
    assert_eq!(deleted.status, StatusCode::FORBIDDEN);

    let current = app.get(&uri, None).await;
    assert_eq!(current.status, StatusCode::OK);
    assert_eq!(current.body["availability"]["originCity"], "Santos");
    assert_eq!(current.body["availability"]["status"], "ACTIVE");

    let deleted = app.call(Method::DELETE, &uri, Some(&owner), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(app.get(&uri, None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_primary_photo_switches_primary() {
    let app = TestApp::new();
    let driver = app.register_and_login("motorista@example.com", "DRIVER").await;
    let vehicle_id = app.create_vehicle(&driver, "ABC1D23").await;

    let first = app.upload(&driver, &vehicle_id, "image/jpeg", b"first", true).await;
    let first_id = first.body["photo"]["id"].as_str().unwrap().to_string();
    let second = app.upload(&driver, &vehicle_id, "image/webp", b"second", false).await;
    let second_id = second.body["photo"]["id"].as_str().unwrap().to_string();
    assert_eq!(second.body["photo"]["isPrimary"], false);

    // Otro motorista no puede cambiar la principal
    let other = app.register_and_login("outro@example.com", "DRIVER").await;
    let uri = format!("/api/photos/{}/primary", second_id);
    let forbidden = app.patch(&uri, Some(&other), json!({})).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let vehicle = app.get(&format!("/api/vehicles/{}", vehicle_id), None).await;
    let primary: Vec<_> = vehicle.body["vehicle"]["photos"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| p["isPrimary"] == true)
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(primary, vec![first_id.clone()]);

    let switched = app.patch(&uri, Some(&driver), json!({})).await;
    assert_eq!(switched.status, StatusCode::OK, "{}", switched.body);
    assert_eq!(switched.body["photo"]["isPrimary"], true);

    let vehicle = app.get(&format!("/api/vehicles/{}", vehicle_id), None).await;
    let photos = vehicle.body["vehicle"]["photos"].as_array().unwrap().clone();
    let primary: Vec<_> = photos
        .iter()
        .filter(|p| p["isPrimary"] == true)
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(primary, vec![second_id]);
    assert!(photos
        .iter()
        .any(|p| p["id"] == first_id.as_str() && p["isPrimary"] == false));
}

#[tokio::test]
async fn test_search_min_capacity_includes_the_bound() {
    let app = TestApp::new();
    let driver = app.register_and_login("motorista@example.com", "DRIVER").await;
    let vehicle_id = app.create_vehicle(&driver, "ABC1D23").await;
    app.create_availability(&driver, &vehicle_id, "Santos", &tomorrow(), json!(0.1)).await;
    app.create_availability(&driver, &vehicle_id, "Campinas", &tomorrow(), json!(0.05)).await;

    let response = app.get("/api/availabilities/search?minCapacity=0.1", None).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(origins(&response), vec!["Santos"]);

    let far = app
        .get("/api/availabilities/search?page=9223372036854775807&limit=100", None)
        .await;
    assert_eq!(far.status, StatusCode::OK);
    assert!(far.body["availabilities"].as_array().unwrap().is_empty());
    assert_eq!(far.body["pagination"]["total"], 2);
}
