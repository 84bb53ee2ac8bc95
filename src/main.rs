use actix_web::{App, HttpServer, middleware::Logger};
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use chrono::Local;  // timestamp in log lines
use std::sync::Arc;

use lovepage_backend::{
    AppServices,
    config::Config,
    configure_app,
    database::{DbDiscountStore, DbPageStore, DiscountStore, PageStore, create_pool, run_migrations},
    external::{Mailer, PaymentGateway, SmtpMailer, StripeService, WebhookVerifier},
    middlewares::create_cors,
    services::*,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置，缺少凭据时直接退出
    let config = Config::from_toml().map_err(|e| std::io::Error::other(e.to_string()))?;
    config.validate().map_err(std::io::Error::other)?;

    // 创建数据库连接池并运行迁移
    let pool = create_pool(&config.database)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to connect to database: {e}")))?;
    run_migrations(&pool)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to run database migrations: {e}")))?;

    // 创建外部服务
    let stripe_service = StripeService::new(&config.stripe)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let smtp_mailer = SmtpMailer::connect(&config.email)
        .await
        .map_err(|e| std::io::Error::other(format!("SMTP setup failed: {e}")))?;

    let gateway: Arc<dyn PaymentGateway> = Arc::new(stripe_service);
    let mailer: Arc<dyn Mailer> = Arc::new(smtp_mailer);
    let page_store: Arc<dyn PageStore> = Arc::new(DbPageStore::new(pool.clone()));
    let discount_store: Arc<dyn DiscountStore> = Arc::new(DbDiscountStore::new(pool.clone()));

    // 创建服务
    let base_url = config.app.base_url().to_string();
    let discount_code_service = DiscountCodeService::new(discount_store, gateway.clone());
    let services = AppServices {
        checkout: CheckoutService::new(
            page_store.clone(),
            gateway,
            discount_code_service.clone(),
            base_url.clone(),
        ),
        pages: PageService::new(page_store.clone()),
        discounts: discount_code_service,
        fulfillment: FulfillmentService::new(page_store, mailer, base_url, &config.fulfillment),
        webhook_verifier: WebhookVerifier::from_config(&config.stripe),
    };

    if config.admin.api_key.is_empty() {
        log::warn!("ADMIN_API_KEY is not set, admin endpoints are disabled");
    }

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let json_limit = config.server.json_limit_bytes;
    let admin_key = config.admin.api_key.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .configure(configure_app(services.clone(), json_limit, admin_key.clone()))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
