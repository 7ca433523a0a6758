use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use chrono::Utc;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use access_control::{Role, RouteGuard, RouteRequirement, SessionResolver};
use db_pool::{create_pool as create_pg_pool, DbConfig as DbPoolConfig};
use portfolio_service::services::{AuthService, PgSessionResolver};
use portfolio_service::{handlers, metrics};

struct HealthState {
    db_pool: sqlx::Pool<sqlx::Postgres>,
}

#[derive(serde::Serialize, Clone)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(serde::Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
}

#[derive(serde::Serialize)]
struct ReadinessResponse {
    ready: bool,
    checks: HashMap<String, ComponentCheck>,
    timestamp: String,
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match db_pool::health_check(&state.db_pool).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "portfolio-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "portfolio-service"
        })),
    }
}

async fn readiness_summary(state: web::Data<HealthState>) -> HttpResponse {
    let mut checks = HashMap::new();

    let start = Instant::now();
    let pg_result = db_pool::health_check(&state.db_pool).await;
    let pg_latency = Some(start.elapsed().as_millis() as u64);

    let ready = pg_result.is_ok();
    let postgres_check = match pg_result {
        Ok(_) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "PostgreSQL connection successful".to_string(),
            latency_ms: pg_latency,
        },
        Err(e) => ComponentCheck {
            status: ComponentStatus::Unhealthy,
            message: format!("PostgreSQL connection failed: {}", e),
            latency_ms: pg_latency,
        },
    };
    checks.insert("postgresql".to_string(), postgres_check);

    let response = ReadinessResponse {
        ready,
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match portfolio_service::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting portfolio-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // JWT keys (RS256). This service both signs (auth endpoints) and
    // validates (route guard).
    match crypto_core::jwt::load_signing_keys() {
        Ok((private_key, public_key)) => {
            if let Err(err) = crypto_core::jwt::initialize_jwt_keys(&private_key, &public_key) {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("Failed to initialize JWT keys: {err}"),
                ));
            }
            tracing::info!("JWT keys initialized");
        }
        Err(err) => {
            tracing::error!("JWT keys not configured: {err}");
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("JWT keys required: {err}"),
            ));
        }
    }

    // Database connection pool
    let mut db_cfg = DbPoolConfig::from_env("portfolio-service").unwrap_or_default();
    if db_cfg.database_url.is_empty() {
        db_cfg.database_url = config.database.url.clone();
    }
    if db_cfg.max_connections < config.database.max_connections {
        db_cfg.max_connections = config.database.max_connections;
    }

    db_cfg.log_config();
    let db_pool = match create_pg_pool(db_cfg).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    // Run database migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .map_err(|e| {
            io::Error::new(io::ErrorKind::Other, format!("Migrations failed: {e}"))
        })?;
    tracing::info!("Database migrations completed");

    let resolver: Arc<dyn SessionResolver> = Arc::new(PgSessionResolver::new(db_pool.clone()));
    let auth_service = Arc::new(AuthService::new(db_pool.clone(), &config.auth));
    let health_state = web::Data::new(HealthState {
        db_pool: db_pool.clone(),
    });

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let login_path = config.auth.login_path.clone();
    let allowed_origins = config.cors.allowed_origins.clone();

    HttpServer::new(move || {
        // Build CORS configuration
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        let guard = |requirement: RouteRequirement| {
            RouteGuard::new(resolver.clone(), requirement).with_login_path(login_path.clone())
        };

        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(health_state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(metrics::serve_metrics))
            // Health check endpoints
            .route("/api/v1/health", web::get().to(health_summary))
            .route("/api/v1/health/ready", web::get().to(readiness_summary))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .service(
                web::scope("/api/v1")
                    .wrap(metrics::RequestMetrics)
                    .service(
                        web::scope("/auth")
                            .route("/login", web::post().to(handlers::login))
                            .route("/refresh", web::post().to(handlers::refresh))
                            .service(
                                web::scope("")
                                    .wrap(guard(RouteRequirement::roles(Role::ALL)))
                                    .route("/logout", web::post().to(handlers::logout))
                                    .route("/me", web::get().to(handlers::me)),
                            ),
                    )
                    .service(
                        web::scope("/admin")
                            .wrap(guard(RouteRequirement::roles([Role::Admin])))
                            .route("/users", web::get().to(handlers::list_users))
                            .route("/users", web::post().to(handlers::create_user))
                            .route(
                                "/users/{user_id}/role",
                                web::patch().to(handlers::update_user_role),
                            )
                            .route(
                                "/users/{user_id}",
                                web::delete().to(handlers::deactivate_user),
                            ),
                    )
                    .service(
                        web::scope("/companies")
                            .wrap(guard(RouteRequirement::roles([Role::Admin, Role::Partner])))
                            .service(
                                web::resource("")
                                    .route(web::get().to(handlers::list_companies))
                                    .route(web::post().to(handlers::create_company)),
                            )
                            .service(
                                web::resource("/{company_id}")
                                    .route(web::get().to(handlers::get_company))
                                    .route(web::patch().to(handlers::update_company))
                                    .route(web::delete().to(handlers::delete_company)),
                            )
                            .service(
                                web::resource("/{company_id}/metrics")
                                    .route(web::get().to(handlers::company_metrics))
                                    .route(web::post().to(handlers::record_company_metrics)),
                            ),
                    )
                    .service(
                        web::scope("/deals")
                            .wrap(guard(RouteRequirement::roles([Role::Admin, Role::Partner])))
                            .service(
                                web::resource("")
                                    .route(web::get().to(handlers::list_deals))
                                    .route(web::post().to(handlers::create_deal)),
                            )
                            .service(
                                web::resource("/{deal_id}")
                                    .route(web::get().to(handlers::get_deal))
                                    .route(web::patch().to(handlers::update_deal))
                                    .route(web::delete().to(handlers::delete_deal)),
                            )
                            .route(
                                "/{deal_id}/stage",
                                web::patch().to(handlers::update_deal_stage),
                            ),
                    )
                    .service(
                        web::scope("/leads")
                            .wrap(guard(RouteRequirement::roles([Role::Admin, Role::Partner])))
                            .service(
                                web::resource("")
                                    .route(web::get().to(handlers::list_leads))
                                    .route(web::post().to(handlers::create_lead)),
                            )
                            .service(
                                web::resource("/{lead_id}")
                                    .route(web::get().to(handlers::get_lead))
                                    .route(web::patch().to(handlers::update_lead))
                                    .route(web::delete().to(handlers::delete_lead)),
                            ),
                    )
                    .service(
                        web::scope("/meetings")
                            .wrap(guard(RouteRequirement::roles([Role::Admin, Role::Partner])))
                            .service(
                                web::resource("")
                                    .route(web::get().to(handlers::list_meetings))
                                    .route(web::post().to(handlers::create_meeting)),
                            )
                            .route(
                                "/{meeting_id}",
                                web::delete().to(handlers::cancel_meeting),
                            ),
                    )
                    .service(
                        web::scope("/notes")
                            .wrap(guard(RouteRequirement::roles([Role::Admin, Role::Partner])))
                            .service(
                                web::resource("")
                                    .route(web::get().to(handlers::list_notes))
                                    .route(web::post().to(handlers::create_note)),
                            )
                            .service(
                                web::resource("/{note_id}")
                                    .route(web::patch().to(handlers::update_note))
                                    .route(web::delete().to(handlers::delete_note)),
                            ),
                    )
                    .service(
                        web::scope("/my/{company_id}")
                            .wrap(guard(
                                RouteRequirement::roles([Role::Founder])
                                    .with_owner_param("company_id"),
                            ))
                            .service(
                                web::resource("")
                                    .route(web::get().to(handlers::my_company))
                                    .route(web::patch().to(handlers::update_my_company)),
                            )
                            .service(
                                web::resource("/metrics")
                                    .route(web::get().to(handlers::my_metrics))
                                    .route(web::post().to(handlers::submit_my_metrics)),
                            )
                            .route("/deals", web::get().to(handlers::my_deals)),
                    ),
            )
    })
    .bind(&bind_address)?
    .workers(4)
    .run()
    .await?;

    tracing::info!("Portfolio-service shutting down");

    Ok(())
}
