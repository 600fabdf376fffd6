use reqwest::multipart::Form;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use gymfinder::config::Config;
use gymfinder::flash::Flash;

pub const PASSWORD: &str = "password123";

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: std::net::SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
    pub upload_dir: std::path::PathBuf,
}

/// Minimal gym fields for the multipart add/edit form.
pub struct GymInput<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub address: &'a str,
    pub lng: &'a str,
    pub lat: &'a str,
    pub tags: &'a [&'a str],
}

impl<'a> GymInput<'a> {
    pub fn named(name: &'a str) -> Self {
        Self {
            name,
            description: "Squat racks and chalk",
            address: "1 Main St, Hamilton",
            lng: "-79.8711",
            lat: "43.2557",
            tags: &[],
        }
    }

    pub fn form(&self) -> Form {
        let mut form = Form::new()
            .text("name", self.name.to_string())
            .text("description", self.description.to_string())
            .text("address", self.address.to_string())
            .text("lng", self.lng.to_string())
            .text("lat", self.lat.to_string());
        for tag in self.tags {
            form = form.text("tags", tag.to_string());
        }
        form
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str, session: Option<&str>) -> Response {
        let mut req = self.client.get(self.url(path));
        if let Some(session) = session {
            req = req.header("cookie", format!("session={session}"));
        }
        req.send().await.expect("get request failed")
    }

    pub async fn post_form(
        &self,
        path: &str,
        session: Option<&str>,
        data: &[(&str, &str)],
    ) -> Response {
        let mut req = self.client.post(self.url(path)).form(data);
        if let Some(session) = session {
            req = req.header("cookie", format!("session={session}"));
        }
        req.send().await.expect("post request failed")
    }

    pub async fn post_multipart(&self, path: &str, session: &str, form: Form) -> Response {
        self.client
            .post(self.url(path))
            .header("cookie", format!("session={session}"))
            .multipart(form)
            .send()
            .await
            .expect("multipart request failed")
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Response {
        self.post_form(
            "/register",
            None,
            &[
                ("name", name),
                ("email", email),
                ("password", password),
                ("password-confirm", password),
            ],
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.post_form("/login", None, &[("email", email), ("password", password)])
            .await
    }

    /// Register a user and return their session token.
    pub async fn signup(&self, name: &str, email: &str) -> String {
        let resp = self.register(name, email, PASSWORD).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "register failed");
        session_cookie(&resp).expect("register did not start a session")
    }

    /// Submit the add-gym form.
    pub async fn create_gym(&self, session: &str, input: GymInput<'_>) -> Response {
        self.post_multipart("/add", session, input.form()).await
    }

    pub async fn user_id(&self, email: &str) -> Uuid {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .expect("user lookup failed")
    }

    pub async fn gym_id(&self, slug: &str) -> Uuid {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM gyms WHERE slug = $1")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .expect("gym lookup failed")
    }

    /// File names currently in the upload directory, sorted.
    pub fn uploaded_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.upload_dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    pub async fn heart(&self, session: Option<&str>, gym_id: Uuid) -> (Value, StatusCode) {
        let mut req = self
            .client
            .post(self.url(&format!("/api/gyms/{gym_id}/heart")));
        if let Some(session) = session {
            req = req.header("cookie", format!("session={session}"));
        }
        let resp = req.send().await.expect("heart request failed");
        let status = resp.status();
        (resp.json().await.unwrap_or(Value::Null), status)
    }
}

/// Value of a cookie set by the response, if any.
pub fn set_cookie(resp: &Response, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    resp.headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.strip_prefix(&prefix))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
        .find(|v| !v.is_empty())
}

pub fn session_cookie(resp: &Response) -> Option<String> {
    set_cookie(resp, "session")
}

/// Flash messages queued by the response.
pub fn flashes(resp: &Response) -> Vec<Flash> {
    set_cookie(resp, "flash")
        .and_then(|v| hex::decode(v).ok())
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

pub fn flash_messages(resp: &Response) -> Vec<String> {
    flashes(resp).into_iter().map(|f| f.message).collect()
}

pub fn location(resp: &Response) -> String {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn admin_url(base_url: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    // Create a unique test database
    let db_name = format!(
        "gymfinder_test_{}",
        Uuid::now_v7().to_string().replace('-', "")
    );

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let upload_dir = std::env::temp_dir().join(&db_name);

    let config = Config {
        database_url: test_url,
        session_secret: "test-session-secret-that-is-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        base_url: "http://localhost:0".to_string(),
        upload_dir: upload_dir.clone(),
        max_body_size: 10_485_760,
        secure_cookies: false,
        log_level: "warn".to_string(),
        smtp: None,
    };

    let (app, _state) = gymfinder::build_app(pool.clone(), config);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        db_name,
        upload_dir,
    }
}

/// Drop the test database and upload dir after a test completes.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;
    let _ = std::fs::remove_dir_all(&app.upload_dir);

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!(
        "DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"
    ))
    .execute(&admin_pool)
    .await;

    admin_pool.close().await;
}
