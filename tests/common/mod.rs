use std::net::SocketAddr;

use reqwest::{Client, StatusCode};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use preventa::config::Config;

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Provision an ADMIN account through the bootstrap form.
    pub async fn create_admin(&self, username: &str, password: &str) -> StatusCode {
        self.client
            .post(self.url("/create_admin"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("create_admin request failed")
            .status()
    }

    /// Provision a USER account via the admin page form.
    pub async fn create_user(&self, admin_session: &str, username: &str, password: &str) -> StatusCode {
        self.client
            .post(self.url("/admin/users"))
            .header("cookie", format!("session={admin_session}"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("create_user request failed")
            .status()
    }

    /// Login and return the raw response (status + body + any session token).
    pub async fn login_raw(
        &self,
        username: &str,
        password: &str,
    ) -> (StatusCode, String, Option<String>) {
        let resp = self
            .client
            .post(self.url("/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("login request failed");

        let status = resp.status();
        let token = session_token(&resp);
        let body = resp.text().await.unwrap_or_default();
        (status, body, token)
    }

    /// Login, asserting success, and return the session token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body, token) = self.login_raw(username, password).await;
        assert_eq!(status, StatusCode::SEE_OTHER, "login failed: {body}");
        token.expect("login response carried no session cookie")
    }

    /// GET with a session cookie, returning the raw response.
    pub async fn get_auth(&self, path: &str, session: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header("cookie", format!("session={session}"))
            .send()
            .await
            .expect("get request failed")
    }

    /// POST a form with a session cookie, returning the raw response.
    pub async fn post_form_auth(
        &self,
        path: &str,
        session: &str,
        fields: &[(&str, &str)],
    ) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("cookie", format!("session={session}"))
            .form(fields)
            .send()
            .await
            .expect("post request failed")
    }

    /// Submit a new opportunity with sensible defaults.
    pub async fn register_opportunity(&self, session: &str, name: &str) -> StatusCode {
        self.post_form_auth(
            "/registro",
            session,
            &[
                ("name", name),
                ("client", "Acme"),
                ("salesperson", "Vendedor 1"),
                ("product", "Widget"),
                ("requested_date", "2025-01-01"),
                ("delivery_date", "2025-02-01"),
            ],
        )
        .await
        .status()
    }

    /// Download the CSV export for the given session.
    pub async fn export_csv(&self, session: &str) -> String {
        let resp = self.get_auth("/exportar", session).await;
        assert_eq!(resp.status(), StatusCode::OK, "export non-200");
        resp.text().await.unwrap()
    }

    /// Look up an opportunity id by name, straight from the database.
    pub async fn opportunity_id(&self, name: &str) -> i64 {
        sqlx::query_scalar("SELECT id FROM opportunities WHERE name = $1")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .expect("opportunity not found")
    }
}

/// Extract the session token from a response's Set-Cookie headers.
pub fn session_token(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| {
            let rest = v.strip_prefix("session=")?;
            let token = rest.split(';').next()?;
            if token.is_empty() {
                None
            } else {
                Some(token.to_string())
            }
        })
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    // Create a unique test database
    let db_name = format!("preventa_test_{}", Uuid::now_v7().to_string().replace('-', ""));

    // Connect to default postgres DB to create test DB
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    // Connect to test DB and run migrations
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

    let config = Config {
        database_url: test_url,
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        session_ttl_hours: 12,
        display_tz: "America/Mexico_City".parse().unwrap(),
        log_level: "warn".to_string(),
    };

    let app = preventa::build_app(pool.clone(), config);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
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
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
