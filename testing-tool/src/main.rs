use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use colored::*;
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};

/// Recorre el flujo completo contra un servidor en marcha:
/// motorista publica un retorno, cliente lo encuentra y conversa con él.
#[tokio::main]
async fn main() -> Result<()> {
    let base_url = std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    println!("{}", "🚚 Return Freight Testing Tool".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());
    println!("{} {}", "🌐 Servidor:".bright_cyan(), base_url);
    println!();

    let runner = Runner::new(base_url)?;
    match runner.run().await {
        Ok(()) => {
            println!();
            println!("{}", "✅ Flujo completo OK".bright_green().bold());
            Ok(())
        }
        Err(e) => {
            println!();
            println!("{} {:#}", "❌ Flujo falló:".bright_red().bold(), e);
            Err(e)
        }
    }
}

struct Runner {
    client: Client,
    base_url: String,
    suffix: i64,
}

impl Runner {
    fn new(base_url: String) -> Result<Self> {
        let suffix = Utc::now().timestamp_millis();
        Ok(Self {
            client: Client::builder().build()?,
            base_url,
            suffix,
        })
    }

    async fn run(&self) -> Result<()> {
        self.step("Health check");
        let health = self.client.get(self.url("/health")).send().await?;
        expect_status(health, StatusCode::OK).await?;

        self.step("Registrar motorista");
        let driver_email = format!("motorista+{}@example.com", self.suffix);
        self.register(&driver_email, "DRIVER", Some("12345678901")).await?;
        let driver = self.login(&driver_email).await?;

        self.step("Cadastrar veículo");
        let plate = format!("T{:06}", self.suffix % 1_000_000);
        let vehicle = self
            .post(
                "/api/vehicles",
                &driver,
                json!({
                    "type": "TRUCK_LARGE",
                    "brand": "Scania",
                    "model": "R 450",
                    "year": 2020,
                    "plate": plate,
                    "capacity": 25
                }),
                StatusCode::CREATED,
            )
            .await?;
        let vehicle_id = field(&vehicle, &["vehicle", "id"])?;

        self.step("Publicar disponibilidade RJ → SP");
        let availability = self
            .post(
                "/api/availabilities",
                &driver,
                json!({
                    "vehicleId": vehicle_id,
                    "originCity": "Rio de Janeiro",
                    "originState": "RJ",
                    "destinationCity": "São Paulo",
                    "destinationState": "SP",
                    "availableDate": tomorrow(),
                    "availableCapacity": 20
                }),
                StatusCode::CREATED,
            )
            .await?;
        let availability_id = field(&availability, &["availability", "id"])?;
        let driver_id = field(&availability, &["availability", "userId"])?;

        self.step("Registrar cliente e buscar");
        let client_email = format!("cliente+{}@example.com", self.suffix);
        self.register(&client_email, "CLIENT", None).await?;
        let client = self.login(&client_email).await?;

        let search = self
            .get("/api/availabilities/search?originCity=Rio%20de%20Janeiro&destinationState=SP&limit=100", &client)
            .await?;
        let found = search["availabilities"]
            .as_array()
            .map(|items| items.iter().any(|item| item["id"] == availability_id.as_str()))
            .unwrap_or(false);
        if !found {
            bail!("la disponibilidad {} no aparece en la búsqueda", availability_id);
        }
        self.ok(&format!("{} resultados", search["pagination"]["total"]));

        self.step("Abrir chat e enviar mensagem");
        let chat = self
            .post("/api/chats", &client, json!({ "participantId": driver_id }), StatusCode::CREATED)
            .await?;
        let chat_id = field(&chat, &["chat", "id"])?;
        self.post(
            "/api/messages",
            &client,
            json!({ "chatId": chat_id, "content": "Interessado" }),
            StatusCode::CREATED,
        )
        .await?;

        self.step("Conferir não lidas do motorista");
        let unread = self.unread(&driver).await?;
        if unread != 1 {
            bail!("se esperaba 1 mensaje no leído, hay {}", unread);
        }
        self.get(&format!("/api/chats/{}", chat_id), &driver).await?;
        let unread = self.unread(&driver).await?;
        if unread != 0 {
            bail!("se esperaban 0 mensajes no leídos, hay {}", unread);
        }
        self.ok("unread 1 → 0");

        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn step(&self, name: &str) {
        println!("{} {}", "▶".bright_yellow(), name.bold());
    }

    fn ok(&self, detail: &str) {
        println!("  {} {}", "✔".bright_green(), detail);
    }

    async fn register(&self, email: &str, role: &str, driver_license: Option<&str>) -> Result<()> {
        let response = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "email": email,
                "password": "123456",
                "name": "Smoke Test",
                "role": role,
                "driverLicense": driver_license,
            }))
            .send()
            .await?;
        expect_status(response, StatusCode::CREATED).await?;
        self.ok(email);
        Ok(())
    }

    async fn login(&self, email: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": "123456" }))
            .send()
            .await?;
        let body = expect_status(response, StatusCode::OK).await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("login sin token")
    }

    async fn get(&self, path: &str, token: &str) -> Result<Value> {
        let response = self.client.get(self.url(path)).bearer_auth(token).send().await?;
        expect_status(response, StatusCode::OK).await
    }

    async fn post(&self, path: &str, token: &str, body: Value, expected: StatusCode) -> Result<Value> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        expect_status(response, expected).await
    }

    async fn unread(&self, token: &str) -> Result<i64> {
        let chats = self.get("/api/chats", token).await?;
        chats["chats"][0]["unreadCount"]
            .as_i64()
            .context("listado de chats sin unreadCount")
    }
}

async fn expect_status(response: Response, expected: StatusCode) -> Result<Value> {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    if status != expected {
        bail!("esperado {} y recibido {}: {}", expected, status, body);
    }
    Ok(body)
}

fn field(body: &Value, path: &[&str]) -> Result<String> {
    let value = path.iter().fold(body, |value, key| &value[*key]);
    value
        .as_str()
        .map(str::to_string)
        .with_context(|| format!("campo {} ausente en {}", path.join("."), body))
}

fn tomorrow() -> String {
    (Utc::now() + Duration::days(1)).format("%Y-%m-%d").to_string()
}
